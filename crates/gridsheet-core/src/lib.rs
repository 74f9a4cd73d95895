//! gridsheet-core - UI-agnostic sheet document.
//!
//! The grid held by [`Document`] is the only copy of the sheet's contents;
//! values are computed from it on demand rather than mirrored elsewhere.

pub mod document;
pub mod error;

pub use document::{Document, FormulaBar, Selection};
pub use error::{GridsheetError, Result};

pub use gridsheet_engine::engine::{CellRange, CellRef};
