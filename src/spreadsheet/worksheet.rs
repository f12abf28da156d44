use crate::database::region::Region;
use crate::database::table::Table;
use crate::error::RustyTableError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::grid::Grid;
use crate::spreadsheet::grid::TableDirectory;
use crate::spreadsheet::reference::Coordinate;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A worksheet loaded from a workbook: raw cells, the workbook's shared
/// strings, and the tables defined on the sheet.
///
/// Cells keep their stored form and are resolved when read, so a malformed
/// stored value only fails the reads that touch it.
#[derive(Clone, Debug)]
pub struct Worksheet {
    name: String,
    cells: BTreeMap<(usize, usize), Cell>,
    shared_strings: Arc<[String]>,
    tables: Vec<Table>,
    /// Actual data range (determined from cell data)
    row_lower_bound: Option<usize>,
    row_upper_bound: Option<usize>,
    col_lower_bound: Option<usize>,
    col_upper_bound: Option<usize>,
}

impl Worksheet {
    pub fn new(name: &str, shared_strings: Arc<[String]>) -> Self {
        Worksheet {
            name: name.to_owned(),
            cells: BTreeMap::new(),
            shared_strings,
            tables: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
            col_upper_bound: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Stores a raw cell at a 1-based position, replacing any earlier one.
    pub fn push(&mut self, row: usize, col: usize, cell: Cell) {
        self.update_bound(row, col);
        self.cells.insert((row, col), cell);
    }

    pub fn push_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Smallest region holding every stored cell, `None` for an empty sheet.
    pub fn used_region(&self) -> Option<Region> {
        let from = Coordinate::new(self.col_lower_bound?, self.row_lower_bound?).ok()?;
        let to = Coordinate::new(self.col_upper_bound?, self.row_upper_bound?).ok()?;
        Some(Region::of_boundaries(from, to))
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        fn lower(bound: &mut Option<usize>, value: usize) {
            if bound.map(|bound| value < bound).unwrap_or(true) {
                *bound = Some(value);
            }
        }
        fn upper(bound: &mut Option<usize>, value: usize) {
            if bound.map(|bound| bound < value).unwrap_or(true) {
                *bound = Some(value);
            }
        }
        lower(&mut self.row_lower_bound, row);
        upper(&mut self.row_upper_bound, row);
        lower(&mut self.col_lower_bound, col);
        upper(&mut self.col_upper_bound, col);
    }
}

impl Grid for Worksheet {
    fn read_cell(&self, row: usize, column: usize) -> Result<Option<CellValue>, RustyTableError> {
        match self.cells.get(&(row, column)) {
            Some(cell) => {
                let reference = Coordinate::new(column, row)?.to_string();
                Ok(Some(cell.resolve(&reference, &self.shared_strings)?))
            }
            None => Ok(None),
        }
    }
}

impl TableDirectory for Worksheet {
    fn tables(&self) -> &[Table] {
        &self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            kind,
            value: value.to_owned(),
        }
    }

    fn sheet() -> Worksheet {
        let shared: Arc<[String]> = vec!["Name".to_owned(), "Ann".to_owned()].into();
        let mut sheet = Worksheet::new("Sheet1", shared);
        sheet.push(2, 2, cell(CellType::SharedString, "0"));
        sheet.push(3, 2, cell(CellType::SharedString, "1"));
        sheet.push(3, 4, cell(CellType::Number, "7"));
        sheet
    }

    #[test]
    fn sheet_initial() {
        let sheet = Worksheet::new("Empty", Arc::from(Vec::new()));
        assert!(sheet.is_empty());
        assert_eq!(sheet.used_region(), None);
        assert!(sheet.tables().is_empty());
    }

    #[test]
    fn sheet_update_bounds() {
        let sheet = sheet();
        assert_eq!(sheet.len(), 3);
        assert_eq!(sheet.used_region().map(|region| region.to_string()), Some("B2:D3".to_owned()));
    }

    #[test]
    fn reads_resolve_shared_strings() {
        let sheet = sheet();
        assert_eq!(sheet.read_cell(2, 2).unwrap(), Some(CellValue::from("Name")));
        assert_eq!(sheet.read_cell(3, 2).unwrap(), Some(CellValue::from("Ann")));
        assert_eq!(sheet.read_cell(3, 4).unwrap(), Some(CellValue::Number(7.0)));
        assert_eq!(sheet.read_cell(3, 3).unwrap(), None);
    }

    #[test]
    fn malformed_cell_only_fails_its_own_read() {
        let mut sheet = sheet();
        sheet.push(5, 1, cell(CellType::SharedString, "9"));
        assert!(sheet.read_cell(5, 1).is_err());
        assert!(sheet.read_cell(2, 2).is_ok());
    }

    #[test]
    fn tables_are_listed_in_order() {
        let mut sheet = sheet();
        let region = Region::try_from("B2:B3").unwrap();
        sheet.push_table(Table::try_with_headers(&sheet, "People", region).unwrap());
        sheet.push_table(Table::new("Other", region, vec![]));
        let names: Vec<&str> = sheet.tables().iter().map(|table| table.name()).collect();
        assert_eq!(names, vec!["People", "Other"]);
        let people = sheet.find_table_by_name("People").unwrap();
        assert_eq!(people.column_values_by_header(&sheet, "Name").unwrap(), Some(vec![CellValue::from("Ann")]));
    }
}
