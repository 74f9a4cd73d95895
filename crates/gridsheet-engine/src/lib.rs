//! gridsheet_engine - A1 notation, aggregate functions, Rhai integration.

pub(crate) mod builtins;
pub mod engine;
