//! Document state and logic (UI-agnostic).

mod io;
mod ops;
mod selection;
mod state;

pub use selection::{FormulaBar, Selection};
pub use state::{DEFAULT_COLS, DEFAULT_ROWS, Document};
