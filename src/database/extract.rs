//! Structured views over the values a table covers.
//!
//! All scans read the grid row by row in increasing order and never modify
//! the table. Row offsets in the results are 0-based from the first data row.
use crate::database::table::Table;
use crate::database::table::TableError;
use crate::error::RustyTableError;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::grid::Grid;
use std::collections::BTreeMap;

/// Present cell values keyed by `(header, row offset)`.
pub type SparseMatrix = BTreeMap<(String, usize), CellValue>;

impl Table {
    /// Present values of the named column in row order; absent cells are skipped,
    /// so the result may be shorter than the number of data rows.
    ///
    /// Returns `Ok(None)` when the table has no such column.
    pub fn column_values_by_header<G>(&self, grid: &G, header: &str) -> Result<Option<Vec<CellValue>>, RustyTableError>
    where
        G: Grid + ?Sized,
    {
        let values = self.indexed_column_values_by_header(grid, header)?;
        Ok(values.map(|values| values.into_iter().map(|(_, value)| value).collect()))
    }

    /// Present values of the named column paired with their row offset.
    ///
    /// Returns `Ok(None)` when the table has no such column.
    pub fn indexed_column_values_by_header<G>(
        &self,
        grid: &G,
        header: &str,
    ) -> Result<Option<Vec<(usize, CellValue)>>, RustyTableError>
    where
        G: Grid + ?Sized,
    {
        let column = match self.grid_column(header) {
            Ok(column) => column,
            Err(TableError::MissingHeader { .. }) => return Ok(None),
            Err(error) => Err(error)?,
        };
        let mut values = Vec::new();
        for (offset, row) in self.data_rows() {
            if let Some(value) = grid.read_cell(row, column)? {
                values.push((offset, value));
            }
        }
        Ok(Some(values))
    }

    /// One `(key, value)` pair per data row.
    ///
    /// Every key cell must be present; a missing value cell is replaced by
    /// `default_value`. Returns `Ok(None)` when either header is unknown.
    pub fn key_values_by_headers<G>(
        &self,
        grid: &G,
        key_header: &str,
        value_header: &str,
        default_value: &CellValue,
    ) -> Result<Option<Vec<(CellValue, CellValue)>>, RustyTableError>
    where
        G: Grid + ?Sized,
    {
        let (key_column, value_column) = match (self.grid_column(key_header), self.grid_column(value_header)) {
            (Ok(key_column), Ok(value_column)) => (key_column, value_column),
            _ => return Ok(None),
        };
        let mut pairs = Vec::new();
        for (_, row) in self.data_rows() {
            let key = grid
                .read_cell(row, key_column)?
                .ok_or_else(|| self.missing_value(row, key_column))?;
            let value = grid
                .read_cell(row, value_column)?
                .unwrap_or_else(|| default_value.clone());
            pairs.push((key, value));
        }
        Ok(Some(pairs))
    }

    /// Every present body cell keyed by its column's header text and row offset.
    ///
    /// Headers are read from the grid's header row; a missing header cell fails
    /// the whole operation. When two columns share a header, the leftmost one
    /// provides the entry. A table without data rows yields an empty matrix.
    pub fn to_sparse_matrix<G>(&self, grid: &G) -> Result<SparseMatrix, RustyTableError>
    where
        G: Grid + ?Sized,
    {
        let region = self.region();
        let mut matrix = SparseMatrix::new();
        for column in region.left()..=region.right() {
            let header = grid
                .read_cell(region.upper(), column)?
                .ok_or_else(|| self.missing_value(region.upper(), column))?
                .to_string();
            for (offset, row) in self.data_rows() {
                if let Some(value) = grid.read_cell(row, column)? {
                    // first column wins when headers repeat
                    matrix.entry((header.to_owned(), offset)).or_insert(value);
                }
            }
        }
        Ok(matrix)
    }
}
