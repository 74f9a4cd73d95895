//! Error types for Gridsheet core.

use thiserror::Error;

use gridsheet_engine::engine::NotationError;
use rhai::EvalAltResult;

/// Errors that can occur while editing or evaluating a sheet
#[derive(Error, Debug)]
pub enum GridsheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Notation(#[from] NotationError),

    #[error("Circular dependency detected")]
    CircularDependency,

    #[error("No functions file loaded")]
    NoFunctionsLoaded,

    #[error("{what} {index} is outside the sheet ({limit} available)")]
    OutOfBounds {
        what: &'static str,
        index: usize,
        limit: usize,
    },

    #[error("Rhai error: {0}")]
    Rhai(
        #[from]
        #[source]
        Box<EvalAltResult>,
    ),

    #[error("Rhai compile error: {0}")]
    RhaiCompile(String),
}

pub type Result<T> = std::result::Result<T, GridsheetError>;
