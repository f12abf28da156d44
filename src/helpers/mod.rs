//! Package-level reading helpers shared by the workbook reader.
pub(crate) mod xml;
pub(crate) mod zip;
