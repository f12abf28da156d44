//! A1-style cell addresses.
//!
//! Converts between textual addresses (`"C5"`, `"AA100"`) and 1-based
//! `(column, row)` coordinates. Columns use bijective base-26 letters
//! (`A` = 1, `Z` = 26, `AA` = 27), so there is no zero digit.
use regex::Regex;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static ADDRESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("Hardcode regex pattern"));

/// Errors related to A1-style address decoding and coordinate arithmetic.
#[derive(Error, Debug, PartialEq)]
pub enum ReferenceError {
    #[error("Malformed cell address '{0}'")]
    MalformedAddress(String),

    #[error("Cannot shift {coordinate} by {columns} column(s) and {rows} row(s): position leaves the grid")]
    OutOfGrid { coordinate: String, columns: isize, rows: isize },
}

/// A 1-based `(column, row)` grid position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    column: usize,
    row: usize,
}

impl Coordinate {
    /// Creates a coordinate; both indices must be at least 1.
    pub fn new(column: usize, row: usize) -> Result<Self, ReferenceError> {
        if column == 0 || row == 0 {
            Err(ReferenceError::MalformedAddress(format!("column {column}, row {row}")))
        } else {
            Ok(Coordinate { column, row })
        }
    }

    /// Decodes an A1-style address. Letters are case-insensitive.
    pub fn parse(text: &str) -> Result<Self, ReferenceError> {
        let malformed = || ReferenceError::MalformedAddress(text.to_owned());
        let captures = ADDRESS_PATTERN.captures(text).ok_or_else(malformed)?;
        let column = letters_to_column(&captures[1]).ok_or_else(malformed)?;
        let row = captures[2].parse::<usize>().map_err(|_| malformed())?;
        Coordinate::new(column, row).map_err(|_| malformed())
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Translates by the given number of columns and rows (positive = right/down).
    pub fn offset(&self, columns: isize, rows: isize) -> Result<Self, ReferenceError> {
        let out_of_grid = || ReferenceError::OutOfGrid {
            coordinate: self.to_string(),
            columns,
            rows,
        };
        let column = self.column.checked_add_signed(columns).filter(|column| *column > 0);
        let row = self.row.checked_add_signed(rows).filter(|row| *row > 0);
        match column.zip(row) {
            Some((column, row)) => Ok(Coordinate { column, row }),
            None => Err(out_of_grid()),
        }
    }
}

impl FromStr for Coordinate {
    type Err = ReferenceError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Coordinate::parse(text)
    }
}

impl TryFrom<&str> for Coordinate {
    type Error = ReferenceError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Coordinate::parse(text)
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.column), self.row)
    }
}

/// Decodes column letters into a 1-based column index.
/// Returns `None` for empty input, non-letters, or overflow.
pub fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters.bytes().try_fold(0usize, |column, letter| {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let digit = (letter.to_ascii_uppercase() - b'A') as usize + 1;
        column.checked_mul(26)?.checked_add(digit)
    })
}

/// Encodes a 1-based column index as letters (1 -> A, 26 -> Z, 27 -> AA).
/// Column 0 has no letters and encodes as the empty string.
pub fn column_to_letters(column: usize) -> String {
    let mut letters = Vec::new();
    let mut column = column;
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.iter().rev().map(|letter| *letter as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_single_and_double_letters() {
        assert_eq!(Coordinate::parse("A1"), Coordinate::new(1, 1));
        assert_eq!(Coordinate::parse("Z26"), Coordinate::new(26, 26));
        assert_eq!(Coordinate::parse("AA100"), Coordinate::new(27, 100));
        assert_eq!(Coordinate::parse("AZ3"), Coordinate::new(52, 3));
        assert_eq!(Coordinate::parse("XFD1048576"), Coordinate::new(16_384, 1_048_576));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Coordinate::parse("c5"), Coordinate::parse("C5"));
        assert_eq!("aB7".parse::<Coordinate>(), Coordinate::new(28, 7));
    }

    #[test]
    fn parse_rejects_malformed_addresses() {
        for text in ["", "A", "12", "1A", "A1B", "A 1", "$A$1", "A0", "A-1", "Ä1"] {
            assert_eq!(
                Coordinate::parse(text),
                Err(ReferenceError::MalformedAddress(text.to_owned())),
                "{text}"
            );
        }
    }

    #[test]
    fn parse_overflow_is_malformed() {
        let huge = format!("{}1", "Z".repeat(40));
        assert!(matches!(Coordinate::parse(&huge), Err(ReferenceError::MalformedAddress(_))));
        let huge_row = format!("A{}", "9".repeat(40));
        assert!(matches!(Coordinate::parse(&huge_row), Err(ReferenceError::MalformedAddress(_))));
    }

    #[test]
    fn format_encodes_letters() {
        assert_eq!(Coordinate::new(1, 1).unwrap().to_string(), "A1");
        assert_eq!(Coordinate::new(26, 9).unwrap().to_string(), "Z9");
        assert_eq!(Coordinate::new(27, 10).unwrap().to_string(), "AA10");
        assert_eq!(Coordinate::new(702, 1).unwrap().to_string(), "ZZ1");
        assert_eq!(Coordinate::new(703, 1).unwrap().to_string(), "AAA1");
    }

    #[test]
    fn new_rejects_zero() {
        assert!(Coordinate::new(0, 1).is_err());
        assert!(Coordinate::new(1, 0).is_err());
    }

    #[test]
    fn offset_stays_on_grid() {
        let c5 = Coordinate::parse("C5").unwrap();
        assert_eq!(c5.offset(2, -4).unwrap().to_string(), "E1");
        assert_eq!(c5.offset(-2, 0).unwrap().to_string(), "A5");
        assert!(matches!(c5.offset(-3, 0), Err(ReferenceError::OutOfGrid { .. })));
        assert!(matches!(c5.offset(0, -5), Err(ReferenceError::OutOfGrid { .. })));
    }

    proptest! {
        #[test]
        fn parse_inverts_format(column in 1usize..=1_000_000, row in 1usize..=10_000_000) {
            let coordinate = Coordinate::new(column, row).unwrap();
            prop_assert_eq!(Coordinate::parse(&coordinate.to_string()), Ok(coordinate));
        }

        #[test]
        fn letters_inverts_column(column in 1usize..=1_000_000) {
            prop_assert_eq!(letters_to_column(&column_to_letters(column)), Some(column));
        }
    }
}
