//! # Rusty Table
//!
//! Named, header-bearing rectangular tables over sparse spreadsheet grids.
//!
//! ## Features
//!
//! - **Cell addressing**: 1-based coordinates parsed from and rendered as `A1` references
//! - **Regions**: rectangular areas with movement, extension and containment queries
//! - **Tables**: a region whose first row holds the column headers, built from any [`Grid`]
//! - **Extraction**: column values, indexed column values, key/value pairs and sparse matrices
//! - **xlsx reader**: worksheets with their cells and table definitions, selected by [`Criteria`]
//!
//! ## Example
//!
//! ```no_run
//! use rusty_table::{CellValue, TableDirectory, XlsxWorkbook};
//!
//! # fn main() -> Result<(), rusty_table::RustyTableError> {
//! let mut workbook = XlsxWorkbook::open("people.xlsx")?;
//! let sheet = workbook.read_worksheet("People")?;
//! if let Some(table) = sheet.find_table_by_name("People") {
//!     let scores = table.key_values_by_headers(&sheet, "Name", "Score", &CellValue::Number(0.0))?;
//!     println!("{scores:?}");
//! }
//! # Ok(())
//! # }
//! ```
pub mod database;
pub mod error;
mod helpers;
pub mod spreadsheet;

pub use crate::database::column::Column;
pub use crate::database::extract::SparseMatrix;
pub use crate::database::region::Region;
pub use crate::database::region::RegionError;
pub use crate::database::table::Table;
pub use crate::database::table::TableError;
pub use crate::error::RustyTableError;
pub use crate::helpers::xml::XmlError;
pub use crate::spreadsheet::cell::Cell;
pub use crate::spreadsheet::cell::CellType;
pub use crate::spreadsheet::cell::CellValue;
pub use crate::spreadsheet::criteria::Criteria;
pub use crate::spreadsheet::grid::Grid;
pub use crate::spreadsheet::grid::SparseGrid;
pub use crate::spreadsheet::grid::TableDirectory;
pub use crate::spreadsheet::reference::Coordinate;
pub use crate::spreadsheet::reference::ReferenceError;
pub use crate::spreadsheet::worksheet::Worksheet;
pub use crate::spreadsheet::xlsx::XlsxWorkbook;
pub use crate::spreadsheet::SpreadsheetError;
