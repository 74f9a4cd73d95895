//! Formula text rewriting.
//!
//! Formulas are written with A1 references (`A1 * 2`, `SUM(A1:C3)`) but are
//! evaluated by Rhai, which knows nothing about cells. Before evaluation every
//! reference outside a string literal is replaced by an accessor call:
//!
//! - `B2` becomes `CELL(1, 1)` (row, col)
//! - `A1:C3` becomes `RANGE(0, 0, 2, 2)`
//!
//! The same scanner extracts the dependencies of a formula and shifts its
//! references when rows or columns are inserted or deleted.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::cell_ref::CellRef;
use super::range::CellRange;

const MAX_DEPENDENCY_RANGE_CELLS: usize = 1_000_000;

/// Marker left in a formula whose reference was deleted.
pub const REF_ERROR: &str = "#REF!";

/// A reference found in formula text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RefToken {
    Cell(CellRef),
    Range(CellRef, CellRef),
}

/// Structural edit applied to every reference in a formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftOperation {
    InsertRow(usize),
    DeleteRow(usize),
    InsertColumn(usize),
    DeleteColumn(usize),
}

fn ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z]+[0-9]+)(?::([A-Za-z]+[0-9]+))?\b")
            .expect("reference regex must compile")
    })
}

fn parse_token(caps: &Captures) -> Option<RefToken> {
    let first = CellRef::parse(&caps[1]).ok()?;
    match caps.get(2) {
        Some(second) => Some(RefToken::Range(first, CellRef::parse(second.as_str()).ok()?)),
        None => Some(RefToken::Cell(first)),
    }
}

/// Rewrite each reference outside string literals with `f`.
/// `f` returning `None` keeps the original text.
fn rewrite_refs<F>(script: &str, mut f: F) -> String
where
    F: FnMut(RefToken) -> Option<String>,
{
    let mut rewrite_segment = |seg: &str| -> String {
        ref_re()
            .replace_all(seg, |caps: &Captures| {
                let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                let end = caps.get(0).map(|m| m.end()).unwrap_or_default();
                // `LOG10(` is a function call, not a cell.
                if seg[end..].starts_with('(') {
                    return whole.to_string();
                }
                parse_token(caps)
                    .and_then(&mut f)
                    .unwrap_or_else(|| whole.to_string())
            })
            .to_string()
    };

    let bytes = script.as_bytes();
    let mut out = String::with_capacity(script.len());
    let mut seg_start = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                out.push_str(&script[seg_start..=i]);
                seg_start = i + 1;
                in_string = false;
            }
        } else if b == b'"' {
            out.push_str(&rewrite_segment(&script[seg_start..i]));
            seg_start = i;
            in_string = true;
        }
    }

    if in_string {
        // Unterminated literal: leave the tail untouched.
        out.push_str(&script[seg_start..]);
    } else {
        out.push_str(&rewrite_segment(&script[seg_start..]));
    }
    out
}

/// Replace A1 references with Rhai accessor calls.
pub fn preprocess_formula(formula: &str) -> String {
    rewrite_refs(formula, |token| {
        Some(match token {
            RefToken::Cell(cell) => format!("CELL({}, {})", cell.row, cell.col),
            RefToken::Range(a, b) => {
                let range = CellRange::new(a, b);
                format!(
                    "RANGE({}, {}, {}, {})",
                    range.start.row, range.start.col, range.end.row, range.end.col
                )
            }
        })
    })
}

/// Extract all cell references from a formula as dependencies.
/// Ranges contribute each of their cells; oversized ranges are skipped.
pub fn extract_dependencies(formula: &str) -> Vec<CellRef> {
    let mut deps = Vec::new();
    rewrite_refs(formula, |token| {
        match token {
            RefToken::Cell(cell) => deps.push(cell),
            RefToken::Range(a, b) => {
                let range = CellRange::new(a, b);
                let within_limit = range
                    .rows()
                    .checked_mul(range.cols())
                    .is_some_and(|n| n <= MAX_DEPENDENCY_RANGE_CELLS);
                if within_limit {
                    deps.extend(range.cells());
                }
            }
        }
        None
    });
    deps
}

/// Shift references in a formula to follow an inserted or deleted row/column.
///
/// References to a deleted row/column become `#REF!`. Ranges that span the
/// deleted line shrink instead, unless it was their only row/column.
pub fn shift_formula_references(formula: &str, op: ShiftOperation) -> String {
    rewrite_refs(formula, |token| match token {
        RefToken::Cell(cell) => {
            let shifted = shift_cell(cell, op);
            (shifted != Some(cell))
                .then(|| shifted.map_or_else(|| REF_ERROR.to_string(), |c| c.to_string()))
        }
        RefToken::Range(a, b) => {
            let range = CellRange::new(a, b);
            let shifted = shift_range(range, op);
            (shifted != Some(range))
                .then(|| shifted.map_or_else(|| REF_ERROR.to_string(), |r| r.to_string()))
        }
    })
}

fn shift_cell(cell: CellRef, op: ShiftOperation) -> Option<CellRef> {
    match op {
        ShiftOperation::InsertRow(at) if cell.row >= at => Some(CellRef::new(cell.row + 1, cell.col)),
        ShiftOperation::InsertColumn(at) if cell.col >= at => {
            Some(CellRef::new(cell.row, cell.col + 1))
        }
        ShiftOperation::DeleteRow(at) if cell.row == at => None,
        ShiftOperation::DeleteRow(at) if cell.row > at => Some(CellRef::new(cell.row - 1, cell.col)),
        ShiftOperation::DeleteColumn(at) if cell.col == at => None,
        ShiftOperation::DeleteColumn(at) if cell.col > at => {
            Some(CellRef::new(cell.row, cell.col - 1))
        }
        _ => Some(cell),
    }
}

fn shift_range(range: CellRange, op: ShiftOperation) -> Option<CellRange> {
    let (start, end) = (range.start, range.end);
    let shifted = match op {
        ShiftOperation::InsertRow(at) => CellRange {
            start: CellRef::new(start.row + usize::from(start.row >= at), start.col),
            end: CellRef::new(end.row + usize::from(end.row >= at), end.col),
        },
        ShiftOperation::InsertColumn(at) => CellRange {
            start: CellRef::new(start.row, start.col + usize::from(start.col >= at)),
            end: CellRef::new(end.row, end.col + usize::from(end.col >= at)),
        },
        ShiftOperation::DeleteRow(at) => {
            if start.row == at && end.row == at {
                return None;
            }
            CellRange {
                start: CellRef::new(start.row - usize::from(start.row > at), start.col),
                end: CellRef::new(end.row - usize::from(end.row >= at), end.col),
            }
        }
        ShiftOperation::DeleteColumn(at) => {
            if start.col == at && end.col == at {
                return None;
            }
            CellRange {
                start: CellRef::new(start.row, start.col - usize::from(start.col > at)),
                end: CellRef::new(end.row, end.col - usize::from(end.col >= at)),
            }
        }
    };
    Some(shifted)
}
