//! Spreadsheet engine API.
//!
//! - [`CellRef`], [`CellRange`] - A1 notation codec (addresses, column labels, ranges)
//! - [`Aggregate`] - SUM / AVERAGE / MAX / MIN / COUNT reducers
//! - [`Cell`], [`CellType`], [`Grid`] - Data structures for cell storage
//! - [`detect_cycle`] - Circular dependency detection
//! - [`preprocess_formula`] - Rewrite A1 references for Rhai evaluation
//! - [`create_engine`] - Create a Rhai engine with built-in functions
//! - [`format_dynamic`] - Format values for display
//! - [`MAX_EVAL_DEPTH`] - Limit on nested evaluations

mod aggregate;
mod cell;
mod cell_ref;
mod cycle;
mod error;
pub(crate) mod eval;
mod format;
mod preprocess;
mod range;
pub(crate) mod value_cache;

pub use aggregate::{AGGREGATES, Aggregate, AggregateBuiltin, numeric_operands};
pub use cell::{Cell, CellType, Grid};
pub use cell_ref::{CellRef, cell_address, col_to_letters, column_headers, letters_to_col};
pub use cycle::detect_cycle;
pub use error::NotationError;
pub use eval::{create_engine, create_engine_with_functions, eval_formula};
pub use format::{format_dynamic, format_number};
pub use preprocess::{
    REF_ERROR, ShiftOperation, extract_dependencies, preprocess_formula, shift_formula_references,
};
pub use range::{CellRange, format_range, parse_range};

pub use value_cache::MAX_EVAL_DEPTH;

pub use crate::builtins::{register_aggregates, register_builtins, register_builtins_with_functions};
pub use rhai::{AST, Dynamic};
