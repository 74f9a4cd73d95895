//! Cell reference parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style cell references
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.
//!
//! Column labels are bijective base-26: there is no zero digit, so index 26
//! is "AA" rather than "BA".
//!
//! # Examples
//!
//! ```
//! use gridsheet_engine::engine::CellRef;
//!
//! let cell = CellRef::parse("B3").unwrap();
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.col, 1); // 0-indexed
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::{NotationError, Result};

/// A reference to a cell by row and column indices (0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("A1 regex must compile")
    })
}

impl CellRef {
    pub fn new(row: usize, col: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a cell reference from A1 notation (e.g., "A1", "b2", "AA10").
    ///
    /// The letters and digits must each form one contiguous run, and the row
    /// number must be a positive integer without leading zeros.
    pub fn parse(address: &str) -> Result<CellRef> {
        let invalid = || NotationError::InvalidAddress(address.to_string());

        let caps = a1_re().captures(address).ok_or_else(invalid)?;
        let numbers = &caps["numbers"];
        if numbers.starts_with('0') {
            return Err(invalid());
        }

        let col = letters_to_col(&caps["letters"]).map_err(|_| invalid())?;
        let row = numbers
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .ok_or_else(invalid)?;

        Ok(CellRef::new(row, col))
    }
}

impl std::str::FromStr for CellRef {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row as u128 + 1)
    }
}

/// Convert a column index to its label (0 -> A, 25 -> Z, 26 -> AA).
pub fn col_to_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    // Only ASCII uppercase bytes were pushed.
    String::from_utf8(letters).unwrap_or_default()
}

/// Convert a column label back to its index ("A" -> 0, "aa" -> 26).
pub fn letters_to_col(label: &str) -> Result<usize> {
    let invalid = || NotationError::InvalidAddress(label.to_string());
    if label.is_empty() {
        return Err(invalid());
    }

    let mut acc = 0usize;
    for c in label.bytes() {
        if !c.is_ascii_alphabetic() {
            return Err(invalid());
        }
        let digit = (c.to_ascii_uppercase() - b'A') as usize + 1;
        acc = acc
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(invalid)?;
    }
    Ok(acc - 1)
}

/// Format zero-indexed coordinates as an A1 address (`(0, 0)` -> "A1").
pub fn cell_address(row: usize, col: usize) -> String {
    CellRef::new(row, col).to_string()
}

/// Labels for the first `count` columns: A, B, ..., Z, AA, AB, ...
pub fn column_headers(count: usize) -> Vec<String> {
    (0..count).map(col_to_letters).collect()
}
