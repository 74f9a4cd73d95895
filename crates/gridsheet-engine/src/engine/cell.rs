//! Cell data structures for the spreadsheet grid.
//!
//! - [`CellType`] - The type of content in a cell (empty, text, number, or formula)
//! - [`Cell`] - A cell with its content and the cells its formula reads
//! - [`Grid`] - Thread-safe sparse storage for cells (backed by `DashMap`)

use dashmap::DashMap;
use rhai::Dynamic;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::cell_ref::CellRef;
use super::preprocess::extract_dependencies;

/// The type of content stored in a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    Empty,
    Text(String),
    Number(f64),
    /// Formula source without the leading '='.
    Formula(String),
}

/// A cell in the spreadsheet grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub contents: CellType,
    pub depends_on: Vec<CellRef>,
}

impl Cell {
    pub fn new_empty() -> Cell {
        Cell {
            contents: CellType::Empty,
            depends_on: vec![],
        }
    }

    pub fn new_text(text: &str) -> Cell {
        Cell {
            contents: CellType::Text(text.to_string()),
            depends_on: vec![],
        }
    }

    pub fn new_number(n: f64) -> Cell {
        Cell {
            contents: CellType::Number(n),
            depends_on: vec![],
        }
    }

    /// Create a new cell containing a formula.
    /// Dependencies are automatically extracted from the formula.
    pub fn new_formula(formula: &str) -> Cell {
        Cell {
            depends_on: extract_dependencies(formula),
            contents: CellType::Formula(formula.to_string()),
        }
    }

    /// Parse user input and create appropriate cell type.
    /// - Empty string or whitespace -> Empty
    /// - Starts with '=' -> Formula (without the '=')
    /// - Quoted string -> Text (without quotes)
    /// - Valid number -> Number
    /// - Otherwise -> Text
    pub fn from_input(input: &str) -> Cell {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Cell::new_empty();
        }

        if let Some(formula) = trimmed.strip_prefix('=') {
            return Cell::new_formula(formula);
        }

        if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
            let text = &trimmed[1..trimmed.len() - 1];
            return Cell::new_text(text);
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            return Cell::new_number(n);
        }

        Cell::new_text(trimmed)
    }

    /// The text a user would edit for this cell (formula bar contents).
    pub fn to_input_string(&self) -> String {
        match &self.contents {
            CellType::Empty => String::new(),
            CellType::Text(s) => s.clone(),
            CellType::Number(n) => n.to_string(),
            CellType::Formula(s) => format!("={}", s),
        }
    }

    /// The literal value of a non-formula cell. Blank cells are `()`.
    pub fn literal_value(&self) -> Option<Dynamic> {
        match &self.contents {
            CellType::Empty => Some(Dynamic::UNIT),
            CellType::Number(n) => Some(Dynamic::from(*n)),
            CellType::Text(s) => Some(Dynamic::from(s.clone())),
            CellType::Formula(_) => None,
        }
    }
}

/// Thread-safe sparse grid storage.
pub type Grid = Arc<DashMap<CellRef, Cell>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_input_classifies_content() {
        assert_eq!(Cell::from_input("   ").contents, CellType::Empty);
        assert_eq!(Cell::from_input("42").contents, CellType::Number(42.0));
        assert_eq!(Cell::from_input("-1.5").contents, CellType::Number(-1.5));
        assert_eq!(
            Cell::from_input("\"42\"").contents,
            CellType::Text("42".to_string())
        );
        assert_eq!(
            Cell::from_input("hello").contents,
            CellType::Text("hello".to_string())
        );
        assert_eq!(
            Cell::from_input("=SUM(A1:A3)").contents,
            CellType::Formula("SUM(A1:A3)".to_string())
        );
    }

    #[test]
    fn test_formula_cells_track_dependencies() {
        let cell = Cell::from_input("=A1 + B2");
        assert_eq!(cell.depends_on, vec![CellRef::new(0, 0), CellRef::new(1, 1)]);
    }

    #[test]
    fn test_input_string_round_trip() {
        for input in ["=A1*2", "hello", "3.5"] {
            assert_eq!(Cell::from_input(input).to_input_string(), input);
        }
        assert_eq!(Cell::new_empty().to_input_string(), "");
    }
}
