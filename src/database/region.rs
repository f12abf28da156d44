use crate::error::RustyTableError;
use crate::spreadsheet::reference::column_to_letters;
use crate::spreadsheet::reference::Coordinate;
use crate::spreadsheet::reference::ReferenceError;
use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Errors related to `"<from>:<to>"` region text and region invariants.
#[derive(Error, Debug, PartialEq)]
pub enum RegionError {
    #[error("Invalid region format '{0}'")]
    FormatError(String),

    #[error("Invalid region '{region}': left boundary {left} is beyond right boundary {right}")]
    ColumnsInverted { region: String, left: String, right: String },

    #[error("Invalid region '{region}': upper boundary {upper} is below lower boundary {lower}")]
    RowsInverted { region: String, upper: usize, lower: usize },
}

/// A rectangular grid area given by its top-left and bottom-right corners.
///
/// A region may be built with inverted corners; such a region is reported by
/// [`Region::validate`] and should not be used for table scans.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    from: Coordinate,
    to: Coordinate,
}

impl Region {
    pub fn of_boundaries(from: Coordinate, to: Coordinate) -> Self {
        Region { from, to }
    }

    pub fn to_boundaries(&self) -> (Coordinate, Coordinate) {
        (self.from, self.to)
    }

    /// Parses `"<from>:<to>"` without checking the corner order.
    pub fn parse(text: &str) -> Result<Self, RustyTableError> {
        let (from, to) = text
            .split_once(':')
            .ok_or_else(|| RegionError::FormatError(text.to_owned()))?;
        Ok(Region {
            from: Coordinate::parse(from)?,
            to: Coordinate::parse(to)?,
        })
    }

    /// First column.
    pub fn left(&self) -> usize {
        self.from.column()
    }

    /// Last column.
    pub fn right(&self) -> usize {
        self.to.column()
    }

    /// First row.
    pub fn upper(&self) -> usize {
        self.from.row()
    }

    /// Last row.
    pub fn lower(&self) -> usize {
        self.to.row()
    }

    /// Number of columns, zero for an inverted region.
    pub fn width(&self) -> usize {
        self.right()
            .checked_sub(self.left())
            .map_or(0, |span| span.saturating_add(1))
    }

    /// Number of rows below the first one, clamped to zero.
    pub fn rows_below_upper(&self) -> usize {
        self.lower().saturating_sub(self.upper())
    }

    /// Translates both corners by `delta` columns (positive = right).
    pub fn move_horizontal(&self, delta: isize) -> Result<Self, RustyTableError> {
        Ok(Region {
            from: self.from.offset(delta, 0)?,
            to: self.to.offset(delta, 0)?,
        })
    }

    /// Translates both corners by `delta` rows (positive = down).
    pub fn move_vertical(&self, delta: isize) -> Result<Self, RustyTableError> {
        Ok(Region {
            from: self.from.offset(0, delta)?,
            to: self.to.offset(0, delta)?,
        })
    }

    /// Moves the right boundary by `delta` columns; the top-left corner stays.
    pub fn extend_right(&self, delta: isize) -> Result<Self, RustyTableError> {
        Ok(Region {
            from: self.from,
            to: self.to.offset(delta, 0)?,
        })
    }

    /// Moves the left boundary `delta` columns further left; the bottom-right corner stays.
    pub fn extend_left(&self, delta: isize) -> Result<Self, RustyTableError> {
        let delta = delta.checked_neg().ok_or_else(|| ReferenceError::OutOfGrid {
            coordinate: self.from.to_string(),
            columns: delta,
            rows: 0,
        })?;
        Ok(Region {
            from: self.from.offset(delta, 0)?,
            to: self.to,
        })
    }

    pub fn exceeds_right(&self, coordinate: Coordinate) -> bool {
        coordinate.column() > self.right()
    }

    pub fn exceeds_left(&self, coordinate: Coordinate) -> bool {
        coordinate.column() < self.left()
    }

    pub fn exceeds_above(&self, coordinate: Coordinate) -> bool {
        coordinate.row() < self.upper()
    }

    pub fn exceeds_below(&self, coordinate: Coordinate) -> bool {
        coordinate.row() > self.lower()
    }

    /// True iff the coordinate lies outside the rectangle.
    pub fn exceeds_area(&self, coordinate: Coordinate) -> bool {
        self.exceeds_right(coordinate)
            || self.exceeds_left(coordinate)
            || self.exceeds_above(coordinate)
            || self.exceeds_below(coordinate)
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        !self.exceeds_area(coordinate)
    }

    /// Checks `left <= right` and `upper <= lower`, naming the first invariant that fails.
    pub fn validate(&self) -> Result<(), RegionError> {
        if self.left() > self.right() {
            Err(RegionError::ColumnsInverted {
                region: self.to_string(),
                left: column_to_letters(self.left()),
                right: column_to_letters(self.right()),
            })
        } else if self.upper() > self.lower() {
            Err(RegionError::RowsInverted {
                region: self.to_string(),
                upper: self.upper(),
                lower: self.lower(),
            })
        } else {
            Ok(())
        }
    }

    pub fn is_correct(&self) -> bool {
        self.validate().is_ok()
    }
}

impl TryFrom<&str> for Region {
    type Error = RustyTableError;

    /// Parses `"<from>:<to>"` (e.g. `"B2:D10"`) and checks the corner order.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let region = Region::parse(value)?;
        region.validate()?;
        Ok(region)
    }
}

impl FromStr for Region {
    type Err = RustyTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::try_from(s)
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}
