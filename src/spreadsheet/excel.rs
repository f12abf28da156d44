//! Package-level helpers for Office Open XML workbooks.
use crate::error::RustyTableError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Relationship type suffixes
pub(super) const RELATIONSHIP_WORKSHEET: &str = "/worksheet";
pub(super) const RELATIONSHIP_TABLE: &str = "/table";

/// Loads the relationships of a package part whose type ends with `kind`.
///
/// Returns `None` when the relationships part does not exist. Targets are
/// resolved to package paths relative to the directory owning `path`.
pub(super) fn load_relationships<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
    kind: &str,
) -> Result<Option<HashMap<String, String>>, RustyTableError> {
    let base = source_directory(path);
    let mut reader = match zip.xml_reader(path)? {
        Some(reader) => reader,
        None => return Ok(None),
    };
    let mut relationships = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let relationship_type = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if relationship_type.map(|it| it.ends_with(kind)).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), resolve_target(&base, &target));
                }
            }
        }
    });
    Ok(Some(relationships))
}

/// Maps `cellXfs` format ids to cell types using custom and built-in formats.
pub(super) fn load_number_formats(
    format_indexes: Vec<String>,
    custom_formats: HashMap<String, CellType>,
    is_1904: bool,
) -> Vec<CellType> {
    format_indexes
        .iter()
        .map(|id| {
            custom_formats
                .get(id)
                .copied()
                .or_else(|| CellType::parse_builtin_number_format_id(id, is_1904))
                .unwrap_or(CellType::Number)
        })
        .collect()
}

/// Relationships part for a package part:
/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`.
pub(super) fn relationships_path(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((directory, file)) => format!("{directory}/_rels/{file}.rels"),
        None => format!("_rels/{path}.rels"),
    }
}

/// Directory that relative targets of a relationships part resolve against:
/// `xl/_rels/workbook.xml.rels` -> `xl/`.
fn source_directory(relationships_path: &str) -> String {
    let owner = relationships_path.trim_end_matches(".rels").replace("_rels/", "");
    match owner.rsplit_once('/') {
        Some((directory, _)) => format!("{directory}/"),
        None => String::new(),
    }
}

/// Resolves a relationship target into a package path, collapsing `.` and `..`.
/// Targets starting with `/` are absolute from the package root.
pub(crate) fn resolve_target(base: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_owned(),
        None => format!("{base}{target}"),
    };
    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => (),
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute_targets() {
        assert_eq!(resolve_target("xl/", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("xl/worksheets/", "../tables/table1.xml"), "xl/tables/table1.xml");
        assert_eq!(resolve_target("xl/worksheets/", "/xl/tables/table2.xml"), "xl/tables/table2.xml");
        assert_eq!(resolve_target("xl/", "./sharedStrings.xml"), "xl/sharedStrings.xml");
    }

    #[test]
    fn relationship_part_paths() {
        assert_eq!(relationships_path("xl/worksheets/sheet1.xml"), "xl/worksheets/_rels/sheet1.xml.rels");
        assert_eq!(relationships_path("xl/workbook.xml"), "xl/_rels/workbook.xml.rels");
        assert_eq!(source_directory("xl/worksheets/_rels/sheet1.xml.rels"), "xl/worksheets/");
        assert_eq!(source_directory("xl/_rels/workbook.xml.rels"), "xl/");
    }

    #[test]
    fn number_formats_prefer_custom() {
        let custom = HashMap::from([("164".to_owned(), CellType::NumberDate1900)]);
        let formats = load_number_formats(vec!["0".to_owned(), "164".to_owned(), "22".to_owned()], custom, false);
        assert_eq!(formats, vec![CellType::Number, CellType::NumberDate1900, CellType::NumberDateTime1900]);
    }
}
