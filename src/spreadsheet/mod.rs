//! # Spreadsheet Module
//!
//! Cell addressing, cell values, the grid access contract and the xlsx
//! workbook reader that produces worksheets with their tables.
pub mod cell;
pub mod criteria;
pub(crate) mod excel;
pub mod grid;
pub mod reference;
pub mod worksheet;
pub mod xlsx;

use thiserror::Error;

/// Errors raised while reading workbook packages and resolving stored cells.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A required package part is missing
    #[error("Missing workbook part '{0}'")]
    FileError(String),

    /// The workbook declares no worksheets
    #[error("Spreadsheet '{0}' contains no worksheets")]
    SpreadsheetEmptyError(String),

    /// Requested sheet is not part of the workbook
    #[error("Sheet '{0}' not found")]
    SheetNotFound(String),

    /// A table part without a name or a cell reference
    #[error("Invalid table definition in '{0}'")]
    TableDefinitionError(String),

    /// A stored value that cannot be converted to its declared kind
    #[error("Invalid cell value '{value}' at '{reference}': {message}")]
    CellValueError {
        reference: String,
        value: String,
        message: String,
    },

    /// A shared string reference beyond the shared string table
    #[error("Shared string index {index} at '{reference}' is out of range ({count} strings)")]
    SharedStringOutOfRange {
        reference: String,
        index: usize,
        count: usize,
    },
}
