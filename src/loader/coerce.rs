//! Cell values and numeric coercion.
//!
//! Both CSV and workbook sources are normalized to [`Cell`] before the
//! table is built, so the coercion rules below apply to every format.

use std::fmt;

/// A single source cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Build a cell from raw text. Whitespace-only text is empty.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// Whether the cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Finite numeric value of the cell, parsing text if needed.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            Cell::Empty => return None,
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Coerce a cell to a medal count, defaulting to `0.0`.
///
/// Never fails: blank, non-numeric, non-finite and negative values all
/// yield `0.0`. Used for the aggregate group column.
pub fn coerce_or_zero(cell: &Cell) -> f64 {
    cell.as_number().filter(|n| *n >= 0.0).unwrap_or(0.0)
}

/// Parse a country medal count.
///
/// Blank cells count as `0.0`. Returns `None` for text that is not a
/// number and for negative values.
pub fn parse_count(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => Some(0.0),
        other => other.as_number().filter(|n| *n >= 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        assert_eq!(Cell::from_text("  "), Cell::Empty);
        assert_eq!(Cell::from_text(" 3 "), Cell::Text("3".to_string()));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Cell::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Cell::Text("0.15".to_string()).as_number(), Some(0.15));
        assert_eq!(Cell::Text("n/a".to_string()).as_number(), None);
        assert_eq!(Cell::Text("NaN".to_string()).as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn test_coerce_or_zero_defaults() {
        assert_eq!(coerce_or_zero(&Cell::Number(4.0)), 4.0);
        assert_eq!(coerce_or_zero(&Cell::Text("7".to_string())), 7.0);
        assert_eq!(coerce_or_zero(&Cell::Text("-".to_string())), 0.0);
        assert_eq!(coerce_or_zero(&Cell::Text("unknown".to_string())), 0.0);
        assert_eq!(coerce_or_zero(&Cell::Number(-2.0)), 0.0);
        assert_eq!(coerce_or_zero(&Cell::Number(f64::INFINITY)), 0.0);
        assert_eq!(coerce_or_zero(&Cell::Empty), 0.0);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(&Cell::Empty), Some(0.0));
        assert_eq!(parse_count(&Cell::Number(3.0)), Some(3.0));
        assert_eq!(parse_count(&Cell::Text("12".to_string())), Some(12.0));
        assert_eq!(parse_count(&Cell::Text("twelve".to_string())), None);
        assert_eq!(parse_count(&Cell::Number(-1.0)), None);
    }
}
