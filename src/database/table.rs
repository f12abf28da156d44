use crate::database::column::Column;
use crate::database::region::Region;
use crate::error::RustyTableError;
use crate::spreadsheet::grid::Grid;
use crate::spreadsheet::reference::Coordinate;
use thiserror::Error;

/// Errors raised by table column lookups and value extraction.
#[derive(Error, Debug, PartialEq)]
pub enum TableError {
    #[error("Missing column header '{header}' in table '{table}'")]
    MissingHeader { table: String, header: String },

    #[error("Missing required value at '{reference}' in table '{table}'")]
    MissingRequiredValue { table: String, reference: String },
}

/// A named region of a worksheet whose first row holds the column headers.
///
/// The table does not hold any cell values; they are read on demand from a
/// [`Grid`]. The header row is the region's upper row and data rows run from
/// the next row down to the lower boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    region: Region,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table from explicit columns.
    ///
    /// The column count is expected to match the region width but is not
    /// checked; columns beyond the region simply read cells outside it.
    pub fn new(name: impl Into<String>, region: Region, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            region,
            columns,
        }
    }

    /// Creates a table whose columns are named after the header row cells of `region`.
    pub fn with_headers<G>(grid: &G, name: &str, region: Region) -> Result<Self, RustyTableError>
    where
        G: Grid + ?Sized,
    {
        region.validate()?;
        let upper = region.upper();
        let mut columns = Vec::new();
        for column in region.left()..=region.right() {
            let header = grid.read_cell(upper, column)?.ok_or_else(|| TableError::MissingRequiredValue {
                table: name.to_owned(),
                reference: cell_reference(upper, column),
            })?;
            columns.push(Column::new(column - region.left() + 1, header.to_string()));
        }
        Ok(Table::new(name, region, columns))
    }

    /// Like [`Table::with_headers`], but logs the failure and returns `None`.
    pub fn try_with_headers<G>(grid: &G, name: &str, region: Region) -> Option<Self>
    where
        G: Grid + ?Sized,
    {
        match Table::with_headers(grid, name, region) {
            Ok(table) => Some(table),
            Err(error) => {
                log::warn!("Cannot create table '{name}' over {region}: {error}");
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in ordinal order.
    pub fn column_headers(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// First column with the given name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_by(|column| column.name == name)
    }

    /// First column satisfying the predicate.
    pub fn column_by<P>(&self, mut predicate: P) -> Option<&Column>
    where
        P: FnMut(&Column) -> bool,
    {
        self.columns.iter().find(|column| predicate(column))
    }

    /// Number of data rows below the header row.
    pub fn data_row_count(&self) -> usize {
        self.region.rows_below_upper()
    }

    /// Data rows as `(offset, row)` pairs, where `offset` counts from 0 at the
    /// first data row.
    pub(crate) fn data_rows(&self) -> impl Iterator<Item = (usize, usize)> {
        let first = self.region.upper().saturating_add(1);
        (0..self.data_row_count()).map(move |offset| (offset, first + offset))
    }

    /// Grid column of the named header.
    pub(crate) fn grid_column(&self, header: &str) -> Result<usize, TableError> {
        self.column_by_name(header)
            .map(|column| self.region.left().saturating_add(column.offset()))
            .ok_or_else(|| TableError::MissingHeader {
                table: self.name.to_owned(),
                header: header.to_owned(),
            })
    }

    pub(crate) fn missing_value(&self, row: usize, column: usize) -> TableError {
        TableError::MissingRequiredValue {
            table: self.name.to_owned(),
            reference: cell_reference(row, column),
        }
    }
}

fn cell_reference(row: usize, column: usize) -> String {
    Coordinate::new(column, row)
        .map(|coordinate| coordinate.to_string())
        .unwrap_or_else(|_| format!("R{row}C{column}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellValue;
    use crate::spreadsheet::grid::SparseGrid;
    use pretty_assertions::assert_eq;

    fn at(text: &str) -> Coordinate {
        Coordinate::parse(text).unwrap()
    }

    fn region(text: &str) -> Region {
        Region::try_from(text).unwrap()
    }

    #[test]
    fn headers_become_columns() {
        let grid: SparseGrid = [(at("A2"), "Name"), (at("B2"), "Age")].into_iter().collect();
        let table = Table::try_with_headers(&grid, "People", region("A2:B2")).unwrap();
        assert_eq!(table.name(), "People");
        assert_eq!(table.columns(), &[Column::new(1, "Name"), Column::new(2, "Age")]);
        assert_eq!(table.column_headers(), vec!["Name", "Age"]);
        assert_eq!(table.data_row_count(), 0);
    }

    #[test]
    fn header_ordinals_are_relative_to_left_boundary() {
        let grid: SparseGrid = [(at("C4"), CellValue::from("Id")), (at("D4"), CellValue::Number(2024.0))]
            .into_iter()
            .collect();
        let table = Table::with_headers(&grid, "T", region("C4:D9")).unwrap();
        assert_eq!(table.columns(), &[Column::new(1, "Id"), Column::new(2, "2024")]);
        assert_eq!(table.data_row_count(), 5);
    }

    #[test]
    fn missing_header_cell_fails() {
        let grid: SparseGrid = [(at("A1"), "Name")].into_iter().collect();
        assert_eq!(Table::try_with_headers(&grid, "T", region("A1:B3")), None);
        let error = Table::with_headers(&grid, "T", region("A1:B3")).unwrap_err();
        assert!(matches!(
            error,
            RustyTableError::TableError(TableError::MissingRequiredValue { ref reference, .. }) if reference == "B1"
        ));
    }

    #[test]
    fn inverted_region_fails() {
        let grid: SparseGrid = [(at("A1"), "Name"), (at("B1"), "Age")].into_iter().collect();
        let inverted = Region::parse("B1:A3").unwrap();
        assert_eq!(Table::try_with_headers(&grid, "T", inverted), None);
        assert!(matches!(
            Table::with_headers(&grid, "T", inverted),
            Err(RustyTableError::RegionError(_))
        ));
    }

    #[test]
    fn column_lookup_takes_first_match() {
        let table = Table::new(
            "T",
            region("A1:C5"),
            vec![Column::new(1, "Key"), Column::new(2, "Value"), Column::new(3, "Key")],
        );
        assert_eq!(table.column_by_name("Key"), Some(&Column::new(1, "Key")));
        assert_eq!(table.column_by_name("Value").map(|column| column.id), Some(2));
        assert_eq!(table.column_by_name("Other"), None);
        assert_eq!(table.column_by(|column| column.id > 1), Some(&Column::new(2, "Value")));
        assert_eq!(table.grid_column("Key"), Ok(1));
        assert_eq!(
            table.grid_column("Other"),
            Err(TableError::MissingHeader {
                table: "T".to_owned(),
                header: "Other".to_owned(),
            })
        );
    }

    #[test]
    fn data_rows_follow_header() {
        let table = Table::new("T", region("B3:B6"), vec![Column::new(1, "X")]);
        assert_eq!(table.data_rows().collect::<Vec<_>>(), vec![(0, 4), (1, 5), (2, 6)]);
        assert_eq!(table.grid_column("X"), Ok(2));
    }
}
