use super::Document;
use crate::error::Result;
use gridsheet_engine::engine::{CellRange, CellRef, format_range};

/// A rectangular selection. `anchor` is where the selection started and is
/// the active cell; `head` follows the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub anchor: CellRef,
    pub head: CellRef,
}

impl Selection {
    pub fn new(anchor: CellRef, head: CellRef) -> Self {
        Selection { anchor, head }
    }

    pub fn single(cell: CellRef) -> Self {
        Selection::new(cell, cell)
    }

    /// The normalized range covered by the selection.
    pub fn range(&self) -> CellRange {
        CellRange::new(self.anchor, self.head)
    }

    pub fn active_cell(&self) -> CellRef {
        self.anchor
    }

    /// Address of the active cell, e.g. "B3".
    pub fn address_label(&self) -> String {
        self.anchor.to_string()
    }

    /// "A1:C3" for the selected block; a single cell renders as "B2:B2".
    pub fn range_label(&self) -> String {
        format_range(self.anchor.row, self.anchor.col, self.head.row, self.head.col)
    }
}

/// What the formula bar shows for a selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormulaBar {
    pub address: String,
    pub input: String,
}

impl Document {
    pub fn formula_bar(&self, selection: &Selection) -> FormulaBar {
        FormulaBar {
            address: selection.address_label(),
            input: self.cell_input(&selection.active_cell()),
        }
    }

    /// Commit formula bar text to the active cell of the selection.
    pub fn apply_formula_bar(&mut self, selection: &Selection, input: &str) -> Result<()> {
        self.set_cell_from_input(selection.active_cell(), input)
    }
}
