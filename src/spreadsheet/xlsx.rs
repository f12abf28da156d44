use crate::database::column::Column;
use crate::database::region::Region;
use crate::database::table::Table;
use crate::error::ResultMessage;
use crate::error::RustyTableError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::excel::relationships_path;
use crate::spreadsheet::reference::Coordinate;
use crate::spreadsheet::worksheet::Worksheet;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr"); // Workbook properties
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content
const TAG_TABLE_PART: QName = QName(b"tablePart");    // Reference from a worksheet to a table part
const TAG_TABLE: QName = QName(b"table");             // Table definition root
const TAG_TABLE_COLUMN: QName = QName(b"tableColumn"); // Table column definition

const PATH_WORKBOOK: &str = "xl/workbook.xml";
const PATH_WORKBOOK_RELATIONSHIPS: &str = "xl/_rels/workbook.xml.rels";
const PATH_STYLES: &str = "xl/styles.xml";
const PATH_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// An xlsx workbook opened for reading worksheets and their tables.
pub struct XlsxWorkbook<RS: Read + Seek> {
    /// File name of the workbook
    name: String,
    /// ZIP archive containing the package parts
    zip: ZipArchive<RS>,
    /// Cell types indexed by style ID
    number_formats: Vec<CellType>,
    /// Shared string table, handed to every worksheet read
    shared_strings: Arc<[String]>,
    /// List of worksheets with (name, zip_path) pairs
    sheets: Vec<(String, String)>,
}

impl XlsxWorkbook<BufReader<File>> {
    /// Opens an xlsx file from the local file system.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RustyTableError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        XlsxWorkbook::from_reader(&path.display().to_string(), BufReader::new(file))
    }
}

impl<RS: Read + Seek> XlsxWorkbook<RS> {
    /// Reads the workbook structure, number formats and shared strings of an
    /// xlsx package. `name` identifies the workbook in messages.
    pub fn from_reader(name: &str, reader: RS) -> Result<Self, RustyTableError> {
        let mut zip = ZipArchive::new(reader)?;
        let (sheets, is_1904) = load_workbook(&mut zip)?;
        if sheets.is_empty() {
            Err(SpreadsheetError::SpreadsheetEmptyError(name.to_owned()))?
        }
        let number_formats = load_number_formats(&mut zip, is_1904)?;
        let shared_strings = load_shared_strings(&mut zip)?;
        log::debug!(
            "Opened '{name}': {} sheet(s), {} shared string(s), 1904 dates: {is_1904}",
            sheets.len(),
            shared_strings.len()
        );
        Ok(XlsxWorkbook {
            name: name.to_owned(),
            zip,
            number_formats,
            shared_strings: shared_strings.into(),
            sheets,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Worksheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Reads every cell and table of the named worksheet.
    pub fn read_worksheet(&mut self, sheet_name: &str) -> Result<Worksheet, RustyTableError> {
        let zip_path = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, zip_path)| zip_path.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFound(sheet_name.to_owned()))?;
        self.load_worksheet(sheet_name, &zip_path, &Criteria::default())
    }

    /// Reads the worksheets accepted by the criteria, in workbook order.
    pub fn read_worksheets(&mut self, criteria: &Criteria) -> Result<Vec<Worksheet>, RustyTableError> {
        let selected: Vec<(String, String)> = self
            .sheets
            .iter()
            .filter(|(name, _)| criteria.accept(name))
            .take(criteria.sheet_limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        let mut worksheets = Vec::with_capacity(selected.len());
        for (sheet_name, zip_path) in selected {
            worksheets.push(self.load_worksheet(&sheet_name, &zip_path, criteria)?);
        }
        Ok(worksheets)
    }

    fn load_worksheet(&mut self, sheet_name: &str, zip_path: &str, criteria: &Criteria) -> Result<Worksheet, RustyTableError> {
        let mut sheet = Worksheet::new(sheet_name, Arc::clone(&self.shared_strings));
        let table_ids = load_cells(&mut self.zip, &self.number_formats, &mut sheet, zip_path, criteria)
            .with_prefix(&format!("Read sheet '{sheet_name}' of '{}'", self.name))?;

        if !table_ids.is_empty() {
            let relationships = load_relationships(&mut self.zip, &relationships_path(zip_path), excel::RELATIONSHIP_TABLE)?
                .unwrap_or_default();
            for id in table_ids {
                match relationships.get(&id) {
                    Some(table_path) => {
                        let table = load_table(&mut self.zip, table_path)
                            .with_prefix(&format!("Read table part '{table_path}'"))?;
                        if let Some(table) = table {
                            log::debug!("Loaded table '{}' over {} on sheet '{sheet_name}'", table.name(), table.region());
                            sheet.push_table(table);
                        }
                    }
                    None => log::warn!("Sheet '{sheet_name}' references unknown table relationship '{id}'"),
                }
            }
        }
        Ok(sheet)
    }
}

/// Parses a worksheet part into `sheet`, returning the relationship ids of its table parts.
fn load_cells<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    number_formats: &[CellType],
    sheet: &mut Worksheet,
    zip_path: &str,
    criteria: &Criteria,
) -> Result<Vec<String>, RustyTableError> {
    let mut reader = zip
        .xml_reader(zip_path)?
        .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
    let mut table_ids = Vec::<String>::new();
    let mut row = 0usize;
    let mut col = 0usize;
    let mut kind = CellType::default();
    let mut value = String::new();
    // rows below the criteria range are skipped, table parts still follow them
    let mut rows_exhausted = false;
    match_xml_events!(reader => {
        Event::Start(event) if !rows_exhausted && event.name() == TAG_ROW => {
            row = match event.get_attribute_value("r")? {
                Some(index) => index.parse::<usize>()?,
                None => row + 1,
            };
            col = 0;
            rows_exhausted = criteria.after_row_upper_bound(row);
        }
        Event::Start(event) if !rows_exhausted && event.name() == TAG_CELL => {
            value.clear();
            match event.get_attribute_value("r")? {
                Some(reference) => {
                    let coordinate = Coordinate::parse(&reference)?;
                    row = coordinate.row();
                    col = coordinate.column();
                }
                None => col += 1,
            }
            kind = if criteria.contains(row, col) {
                match event.get_attribute_value("t")?.as_deref() {
                    Some("inlineStr") | Some("str") => CellType::InlineString,
                    Some("s") => CellType::SharedString,
                    Some("d") => CellType::IsoDateTime,
                    Some("b") => CellType::Boolean,
                    Some("e") if criteria.error_as_null => CellType::Empty,
                    Some("e") => CellType::Error,
                    _ => match event.get_attribute_value("s")? {
                        Some(style) if !style.is_empty() => {
                            let index = style.parse::<usize>()?;
                            number_formats.get(index).copied().unwrap_or(CellType::Number)
                        }
                        _ => CellType::Number,
                    },
                }
            } else {
                CellType::Empty
            };
        }
        Event::Start(event) if kind != CellType::Empty && event.name() == TAG_INLINE_STRING => {
            value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
        }
        Event::Start(event) if kind != CellType::Empty && event.name() == TAG_VALUE => {
            value = read_string_value(&mut reader, TAG_VALUE, true)?;
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if kind != CellType::Empty && !value.is_empty() {
                sheet.push(row, col, Cell {
                    kind,
                    value: std::mem::take(&mut value),
                });
            }
            kind = CellType::Empty;
        }
        Event::Start(event) if event.name() == TAG_TABLE_PART => {
            if let Some(id) = event.get_local_attribute_value("id")? {
                table_ids.push(id.to_string());
            }
        }
    });
    Ok(table_ids)
}

/// Parses a table part into a [`Table`] named after its display name.
///
/// Column ordinals follow the order of `tableColumn` entries. Tables without
/// a header row are skipped.
fn load_table<RS: Read + Seek>(zip: &mut ZipArchive<RS>, zip_path: &str) -> Result<Option<Table>, RustyTableError> {
    let mut reader = zip
        .xml_reader(zip_path)?
        .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
    let mut name = None::<String>;
    let mut region = None::<Region>;
    let mut has_header_row = true;
    let mut columns = Vec::<Column>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_TABLE => {
            name = match event.get_attribute_value("displayName")? {
                Some(display_name) => Some(display_name.to_string()),
                None => event.get_attribute_value("name")?.map(|name| name.to_string()),
            };
            region = event
                .get_attribute_value("ref")?
                .map(|reference| Region::try_from(reference.as_ref()))
                .transpose()?;
            has_header_row = event
                .get_attribute_value("headerRowCount")?
                .map(|count| count != "0")
                .unwrap_or(true);
        }
        Event::Start(event) if event.name() == TAG_TABLE_COLUMN => {
            let column_name = event.get_attribute_value("name")?.unwrap_or_default();
            columns.push(Column::new(columns.len() + 1, column_name));
        }
    });

    let (name, region) = name
        .zip(region)
        .ok_or_else(|| SpreadsheetError::TableDefinitionError(zip_path.to_owned()))?;
    if !has_header_row {
        log::warn!("Skipping table '{name}' in '{zip_path}': it has no header row");
        return Ok(None);
    }
    Ok(Some(Table::new(name, region, columns)))
}

/// Loads worksheet names and paths and the date system from the workbook part.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(Vec<(String, String)>, bool), RustyTableError> {
    let relationships = load_relationships(zip, PATH_WORKBOOK_RELATIONSHIPS, excel::RELATIONSHIP_WORKSHEET)?
        .ok_or_else(|| SpreadsheetError::FileError(PATH_WORKBOOK_RELATIONSHIPS.to_owned()))?;
    let mut reader = zip
        .xml_reader(PATH_WORKBOOK)?
        .ok_or_else(|| SpreadsheetError::FileError(PATH_WORKBOOK.to_owned()))?;
    let mut sheets = Vec::<(String, String)>::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let name = event.get_attribute_value("name")?;
            let id = event.get_local_attribute_value("id")?;
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(id.as_ref()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event
                .get_attribute_value("date1904")?
                .map(|value| value == "1" || value == "true")
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Loads the cell types indexed by style ID from the styles part.
fn load_number_formats<RS: Read + Seek>(zip: &mut ZipArchive<RS>, is_1904: bool) -> Result<Vec<CellType>, RustyTableError> {
    let mut reader = match zip.xml_reader(PATH_STYLES)? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format, is_1904));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => {
            format_indexes_context = false;
            break;
        }
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?;
            format_indexes.push(id.map(|id| id.to_string()).unwrap_or_else(|| "0".to_owned()));
        }
    });

    Ok(excel::load_number_formats(format_indexes, custom_formats, is_1904))
}

/// Loads the shared string table; a package without one has no shared strings.
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, RustyTableError> {
    let mut reader = match zip.xml_reader(PATH_SHARED_STRINGS)? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };
    let mut shared_strings = Vec::<String>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

/// Reads the text of an element up to `end_tag`, skipping phonetic runs.
///
/// With `is_text_content` the element's own text counts; otherwise only
/// text inside `<t>` children does.
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, RustyTableError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
