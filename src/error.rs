//! Error types for the gridsheet command line

use thiserror::Error;

/// Errors in the command line arguments
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgsError {
    #[error("{0} requires a value")]
    MissingValue(&'static str),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("--set expects CELL=INPUT, got {0:?}")]
    BadAssignment(String),

    #[error("--headers expects a column count, got {0:?}")]
    BadCount(String),
}

pub type Result<T> = std::result::Result<T, ArgsError>;
