use crate::database::table::Table;
use crate::error::RustyTableError;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::reference::Coordinate;
use std::collections::BTreeMap;

/// Read access to a sparse two-dimensional grid of cell values.
///
/// Rows and columns are 1-based. A position without a value yields `Ok(None)`;
/// `Err` is reserved for stored data that cannot be resolved into a value.
/// Reads are side-effect free and independent of each other, though the table
/// scans always consult rows in increasing order.
pub trait Grid {
    fn read_cell(&self, row: usize, column: usize) -> Result<Option<CellValue>, RustyTableError>;

    /// Reads the cell at an A1-style coordinate.
    fn read(&self, coordinate: Coordinate) -> Result<Option<CellValue>, RustyTableError> {
        self.read_cell(coordinate.row(), coordinate.column())
    }
}

/// The tables defined on a worksheet.
pub trait TableDirectory {
    fn tables(&self) -> &[Table];

    /// First table satisfying the predicate, in definition order.
    fn find_table_by<P>(&self, mut predicate: P) -> Option<&Table>
    where
        P: FnMut(&Table) -> bool,
    {
        self.tables().iter().find(|table| predicate(table))
    }

    fn find_table_by_name(&self, name: &str) -> Option<&Table> {
        self.find_table_by(|table| table.name() == name)
    }
}

/// In-memory grid holding only the populated cells, ordered by row then column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseGrid {
    cells: BTreeMap<(usize, usize), CellValue>,
}

impl SparseGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, returning the one it replaced.
    pub fn insert(&mut self, coordinate: Coordinate, value: impl Into<CellValue>) -> Option<CellValue> {
        self.cells.insert((coordinate.row(), coordinate.column()), value.into())
    }

    pub fn remove(&mut self, coordinate: Coordinate) -> Option<CellValue> {
        self.cells.remove(&(coordinate.row(), coordinate.column()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Populated cells as `(row, column, value)`, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &CellValue)> + '_ {
        self.cells.iter().map(|((row, column), value)| (*row, *column, value))
    }
}

impl Grid for SparseGrid {
    fn read_cell(&self, row: usize, column: usize) -> Result<Option<CellValue>, RustyTableError> {
        Ok(self.cells.get(&(row, column)).cloned())
    }
}

impl<V: Into<CellValue>> FromIterator<(Coordinate, V)> for SparseGrid {
    fn from_iter<I: IntoIterator<Item = (Coordinate, V)>>(iter: I) -> Self {
        let mut grid = SparseGrid::new();
        for (coordinate, value) in iter {
            grid.insert(coordinate, value);
        }
        grid
    }
}
