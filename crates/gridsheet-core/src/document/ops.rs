use super::{Document, Selection};
use crate::error::{GridsheetError, Result};
use gridsheet_engine::engine::{
    Cell, CellRef, CellType, Dynamic, REF_ERROR, ShiftOperation, detect_cycle, eval_formula,
    format_dynamic, shift_formula_references,
};

/// Dimension for row/column operations
#[derive(Copy, Clone)]
enum Dimension {
    Row,
    Column,
}

impl Dimension {
    /// Get the coordinate value from a CellRef for this dimension
    fn get_coord(&self, cell_ref: &CellRef) -> usize {
        match self {
            Dimension::Row => cell_ref.row,
            Dimension::Column => cell_ref.col,
        }
    }

    /// Create a new CellRef with modified coordinate in this dimension
    fn new_cell_ref(&self, cell_ref: &CellRef, new_coord: usize) -> CellRef {
        match self {
            Dimension::Row => CellRef::new(new_coord, cell_ref.col),
            Dimension::Column => CellRef::new(cell_ref.row, new_coord),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Dimension::Row => "row",
            Dimension::Column => "column",
        }
    }
}

impl Document {
    fn check_bounds(&self, cell_ref: &CellRef) -> Result<()> {
        if cell_ref.row >= self.rows {
            return Err(GridsheetError::OutOfBounds {
                what: "row",
                index: cell_ref.row,
                limit: self.rows,
            });
        }
        if cell_ref.col >= self.cols {
            return Err(GridsheetError::OutOfBounds {
                what: "column",
                index: cell_ref.col,
                limit: self.cols,
            });
        }
        Ok(())
    }

    fn extent(&self, dim: Dimension) -> usize {
        match dim {
            Dimension::Row => self.rows,
            Dimension::Column => self.cols,
        }
    }

    fn set_extent(&mut self, dim: Dimension, value: usize) {
        match dim {
            Dimension::Row => self.rows = value,
            Dimension::Column => self.cols = value,
        }
    }

    /// Set cell contents from input string.
    ///
    /// A formula that would make the cell depend on itself is rejected and
    /// the previous contents are kept.
    pub fn set_cell_from_input(&mut self, cell_ref: CellRef, input: &str) -> Result<()> {
        self.check_bounds(&cell_ref)?;
        let cell = Cell::from_input(input);

        if matches!(cell.contents, CellType::Empty) {
            self.clear_cell(&cell_ref);
            return Ok(());
        }

        if let CellType::Formula(_) = &cell.contents {
            // Temporarily insert to check for cycles
            let old_cell = self.grid.insert(cell_ref, cell.clone());
            if detect_cycle(&cell_ref, &self.grid).is_some() {
                match old_cell {
                    Some(c) => {
                        self.grid.insert(cell_ref, c);
                    }
                    None => {
                        self.grid.remove(&cell_ref);
                    }
                }
                tracing::debug!(cell = %cell_ref, "rejected circular formula");
                return Err(GridsheetError::CircularDependency);
            }
        } else {
            self.grid.insert(cell_ref, cell);
        }

        tracing::debug!(cell = %cell_ref, input, "cell updated");
        self.modified = true;
        Ok(())
    }

    /// Clear the specified cell
    pub fn clear_cell(&mut self, cell_ref: &CellRef) {
        if self.grid.remove(cell_ref).is_some() {
            self.modified = true;
        }
    }

    /// The editable text of a cell ("=SUM(A1:A3)", "42", or "" for blanks).
    pub fn cell_input(&self, cell_ref: &CellRef) -> String {
        self.grid
            .get(cell_ref)
            .map(|entry| entry.to_input_string())
            .unwrap_or_default()
    }

    /// Evaluate a formula (without the leading '=') against this sheet.
    pub fn evaluate_formula(&self, formula: &str) -> Result<Dynamic> {
        Ok(eval_formula(&self.engine, formula, self.custom_ast.as_ref())?)
    }

    /// Current value of a cell, computing formulas from the grid.
    pub fn evaluate_cell(&self, cell_ref: &CellRef) -> Result<Dynamic> {
        let formula = {
            let Some(entry) = self.grid.get(cell_ref) else {
                return Ok(Dynamic::UNIT);
            };
            match &entry.contents {
                CellType::Formula(f) => f.clone(),
                _ => return Ok(entry.literal_value().unwrap_or(Dynamic::UNIT)),
            }
        };
        self.evaluate_formula(&formula)
    }

    /// Display string for a cell; evaluation failures show as `#ERR!`.
    pub fn display_value(&self, cell_ref: &CellRef) -> String {
        match self.evaluate_cell(cell_ref) {
            Ok(value) => format_dynamic(&value),
            Err(e) => {
                tracing::warn!(cell = %cell_ref, error = %e, "formula evaluation failed");
                "#ERR!".to_string()
            }
        }
    }

    /// Rewrite every formula in the grid and move cells for a structural edit.
    fn shift_cells(&mut self, dim: Dimension, op: ShiftOperation) {
        let cells: Vec<(CellRef, Cell)> = self
            .grid
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        self.grid.clear();

        for (cell_ref, cell) in cells {
            let coord = dim.get_coord(&cell_ref);
            let new_ref = match op {
                ShiftOperation::InsertRow(at) | ShiftOperation::InsertColumn(at) if coord >= at => {
                    dim.new_cell_ref(&cell_ref, coord + 1)
                }
                ShiftOperation::DeleteRow(at) | ShiftOperation::DeleteColumn(at) if coord == at => {
                    continue;
                }
                ShiftOperation::DeleteRow(at) | ShiftOperation::DeleteColumn(at) if coord > at => {
                    dim.new_cell_ref(&cell_ref, coord - 1)
                }
                _ => cell_ref,
            };

            let new_cell = match &cell.contents {
                CellType::Formula(formula) => {
                    let shifted = shift_formula_references(formula, op);
                    if shifted == *formula {
                        cell
                    } else if shifted.contains(REF_ERROR) {
                        Cell::new_text(&format!("={}", shifted))
                    } else {
                        Cell::new_formula(&shifted)
                    }
                }
                _ => cell,
            };
            self.grid.insert(new_ref, new_cell);
        }
        self.modified = true;
    }

    /// Generic insert operation for row or column
    fn insert_dimension(&mut self, dim: Dimension, at: usize) -> Result<()> {
        let extent = self.extent(dim);
        if at > extent {
            return Err(GridsheetError::OutOfBounds {
                what: dim.label(),
                index: at,
                limit: extent,
            });
        }
        let op = match dim {
            Dimension::Row => ShiftOperation::InsertRow(at),
            Dimension::Column => ShiftOperation::InsertColumn(at),
        };
        self.shift_cells(dim, op);
        self.set_extent(dim, extent + 1);
        tracing::debug!(dimension = dim.label(), at, "inserted");
        Ok(())
    }

    /// Generic delete operation for `count` rows or columns starting at `start`
    fn delete_dimension(&mut self, dim: Dimension, start: usize, count: usize) -> Result<()> {
        let extent = self.extent(dim);
        let end = start.checked_add(count).unwrap_or(usize::MAX);
        if end > extent {
            return Err(GridsheetError::OutOfBounds {
                what: dim.label(),
                index: end.saturating_sub(1),
                limit: extent,
            });
        }
        let op = match dim {
            Dimension::Row => ShiftOperation::DeleteRow(start),
            Dimension::Column => ShiftOperation::DeleteColumn(start),
        };
        for _ in 0..count {
            self.shift_cells(dim, op);
        }
        self.set_extent(dim, extent - count);
        tracing::debug!(dimension = dim.label(), start, count, "deleted");
        Ok(())
    }

    /// Append an empty row at the bottom of the sheet
    pub fn add_row(&mut self) {
        self.rows += 1;
        self.modified = true;
    }

    /// Append an empty column at the right edge of the sheet
    pub fn add_column(&mut self) {
        self.cols += 1;
        self.modified = true;
    }

    /// Insert a row above the specified row
    pub fn insert_row(&mut self, at_row: usize) -> Result<()> {
        self.insert_dimension(Dimension::Row, at_row)
    }

    /// Insert a column left of the specified column
    pub fn insert_column(&mut self, at_col: usize) -> Result<()> {
        self.insert_dimension(Dimension::Column, at_col)
    }

    /// Delete `count` rows starting at `start`
    pub fn delete_rows(&mut self, start: usize, count: usize) -> Result<()> {
        self.delete_dimension(Dimension::Row, start, count)
    }

    /// Delete `count` columns starting at `start`
    pub fn delete_columns(&mut self, start: usize, count: usize) -> Result<()> {
        self.delete_dimension(Dimension::Column, start, count)
    }

    /// Delete every row the selection touches
    pub fn delete_selected_rows(&mut self, selection: &Selection) -> Result<()> {
        let range = selection.range();
        self.delete_rows(range.start.row, range.rows())
    }

    /// Delete every column the selection touches
    pub fn delete_selected_columns(&mut self, selection: &Selection) -> Result<()> {
        let range = selection.range();
        self.delete_columns(range.start.col, range.cols())
    }
}
