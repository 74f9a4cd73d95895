//! Rectangular cell ranges ("A1:C3").
//!
//! A [`CellRange`] is always normalized: `start` holds the component-wise
//! minimum of the two corners and `end` the maximum, whichever order the
//! corners were given in.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::cell_ref::CellRef;
use super::error::{NotationError, Result};

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Build a range from two arbitrary corners.
    pub fn new(a: CellRef, b: CellRef) -> CellRange {
        CellRange {
            start: CellRef::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellRef::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Parse "A1:C3" (corners in any order). A lone address is rejected.
    pub fn parse(range: &str) -> Result<CellRange> {
        let (a, b) = range
            .split_once(':')
            .ok_or_else(|| NotationError::InvalidAddress(range.to_string()))?;
        Ok(CellRange::new(CellRef::parse(a)?, CellRef::parse(b)?))
    }

    pub fn rows(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row)
            && (self.start.col..=self.end.col).contains(&cell.col)
    }

    /// Cells of the range in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellRef::new(row, col)))
    }
}

impl std::str::FromStr for CellRange {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Format the range spanned by two corners, e.g. `(0, 0, 2, 2)` -> "A1:C3".
///
/// A single cell still renders as "A1:A1".
pub fn format_range(row_a: usize, col_a: usize, row_b: usize, col_b: usize) -> String {
    CellRange::new(CellRef::new(row_a, col_a), CellRef::new(row_b, col_b)).to_string()
}

/// Parse a range like "A1:B5" into a normalized [`CellRange`].
pub fn parse_range(range: &str) -> Result<CellRange> {
    CellRange::parse(range)
}
