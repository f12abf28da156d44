use crate::error::RustyTableError;
use crate::spreadsheet::SpreadsheetError;
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use std::fmt;
use std::fmt::Display;

/// Storage kinds of raw cell data as written in the workbook.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `1` / `0`
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error literals such as `#N/A`
    Error,
}

impl CellType {
    /// Maps built-in number format IDs to date/time cell types.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => {
                Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 })
            }
            _ => None,
        }
    }

    /// Classifies a custom number format code by the date and time tokens it
    /// contains outside quoted literals, escapes and bracketed sections.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A resolved scalar cell value, with any shared string indirection removed.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Error literal such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(number) => Some(*number),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Boolean(value) => write!(f, "{value}"),
            CellValue::Number(value) => write!(f, "{value}"),
            CellValue::Text(value) | CellValue::Error(value) => f.write_str(value),
            CellValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            CellValue::Time(value) => write!(f, "{}", value.format("%H:%M:%S%.f")),
            CellValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

/// A raw cell as stored in a worksheet part: storage kind plus raw text.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub kind: CellType,
    pub value: String,
}

impl Cell {
    /// Resolves the raw text into a [`CellValue`].
    ///
    /// `reference` names the cell in error messages. Shared string indexes are
    /// looked up in `shared_strings`.
    pub fn resolve(&self, reference: &str, shared_strings: &[String]) -> Result<CellValue, RustyTableError> {
        let invalid = |message: String| SpreadsheetError::CellValueError {
            reference: reference.to_owned(),
            value: self.value.to_owned(),
            message,
        };
        let value = match self.kind {
            CellType::Empty => Err(invalid("cell is empty".to_owned()))?,
            CellType::Boolean => CellValue::Boolean(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => CellValue::Number(self.to_double().map_err(invalid)?),
            CellType::NumberDate1900 | CellType::NumberDate1904 => {
                let serial = self.to_double().map_err(invalid)?;
                let datetime = serial_to_datetime(serial, self.kind == CellType::NumberDate1904)
                    .ok_or_else(|| invalid("serial date out of range".to_owned()))?;
                CellValue::Date(datetime.date())
            }
            CellType::NumberDateTime1900 | CellType::NumberDateTime1904 => {
                let serial = self.to_double().map_err(invalid)?;
                let datetime = serial_to_datetime(serial, self.kind == CellType::NumberDateTime1904)
                    .ok_or_else(|| invalid("serial date out of range".to_owned()))?;
                CellValue::DateTime(datetime)
            }
            CellType::NumberTime1900 | CellType::NumberTime1904 => {
                let serial = self.to_double().map_err(invalid)?;
                CellValue::Time(serial_to_time(serial))
            }
            CellType::IsoDateTime => {
                if self.value.contains('T') {
                    CellValue::DateTime(NaiveDateTime::parse_from_str(&self.value, "%Y-%m-%dT%H:%M:%S%.f")?)
                } else {
                    CellValue::Date(NaiveDate::parse_from_str(&self.value, "%Y-%m-%d")?)
                }
            }
            CellType::InlineString => CellValue::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self.value.parse::<usize>()?;
                let text = shared_strings.get(index).ok_or(SpreadsheetError::SharedStringOutOfRange {
                    reference: reference.to_owned(),
                    index,
                    count: shared_strings.len(),
                })?;
                CellValue::Text(text.to_owned())
            }
            CellType::Error => CellValue::Error(self.value.to_owned()),
        };
        Ok(value)
    }

    fn to_double(&self) -> Result<f64, String> {
        self.value
            .parse::<f64>()
            .map_err(|_| format!("parse '{}' to double failed", self.value))
    }
}

/// Converts a serial date number into a timestamp.
///
/// The 1900 system counts 1900-02-29 as a real day (serial 60), so serials
/// below 60 are shifted one day forward. The 1904 system starts 1462 days later.
pub(crate) fn serial_to_datetime(serial: f64, is_1904: bool) -> Option<NaiveDateTime> {
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1_462
    } else if days < 60 {
        1
    } else {
        0
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let milliseconds = (serial.fract() * 86_400_000f64).round() as i64;
    epoch
        .checked_add_signed(Duration::try_days(days + offset)?)?
        .checked_add_signed(Duration::milliseconds(milliseconds))
}

/// Converts the fractional part of a serial number into a time of day.
pub(crate) fn serial_to_time(serial: f64) -> NaiveTime {
    let milliseconds = (serial.fract().abs() * 86_400_000f64).round() as i64;
    NaiveTime::MIN + Duration::milliseconds(milliseconds % 86_400_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell {
            kind,
            value: value.to_owned(),
        }
    }

    #[test]
    fn custom_number_format_detection() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", false), CellType::NumberTime1900);
        assert_eq!(CellType::parse_custom_number_format("0.00\"days\"", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
    }

    #[test]
    fn builtin_number_format_detection() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("0", false), None);
    }

    #[test]
    fn resolve_scalars() {
        assert_eq!(cell(CellType::Boolean, "1").resolve("A1", &[]).unwrap(), CellValue::Boolean(true));
        assert_eq!(cell(CellType::Boolean, "0").resolve("A1", &[]).unwrap(), CellValue::Boolean(false));
        assert_eq!(cell(CellType::Number, "42.5").resolve("A1", &[]).unwrap(), CellValue::Number(42.5));
        assert_eq!(cell(CellType::InlineString, "x").resolve("A1", &[]).unwrap(), CellValue::from("x"));
        assert_eq!(cell(CellType::Error, "#N/A").resolve("A1", &[]).unwrap(), CellValue::Error("#N/A".to_owned()));
    }

    #[test]
    fn resolve_shared_strings() {
        let shared = vec!["first".to_owned(), "second".to_owned()];
        assert_eq!(cell(CellType::SharedString, "1").resolve("B2", &shared).unwrap(), CellValue::from("second"));
        let error = cell(CellType::SharedString, "2").resolve("B2", &shared).unwrap_err();
        assert!(matches!(
            error,
            RustyTableError::SpreadsheetError(SpreadsheetError::SharedStringOutOfRange { index: 2, count: 2, .. })
        ));
    }

    #[test]
    fn resolve_malformed_number_fails() {
        let error = cell(CellType::Number, "abc").resolve("C3", &[]).unwrap_err();
        assert!(error.to_string().contains("C3"));
    }

    #[test]
    fn resolve_serial_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(cell(CellType::NumberDate1900, "45292").resolve("A1", &[]).unwrap(), CellValue::Date(date));
        assert_eq!(cell(CellType::NumberDate1904, "43830").resolve("A1", &[]).unwrap(), CellValue::Date(date));
        assert_eq!(
            cell(CellType::NumberDate1900, "1").resolve("A1", &[]).unwrap(),
            CellValue::Date(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap())
        );
        assert_eq!(
            cell(CellType::NumberDateTime1900, "45292.5").resolve("A1", &[]).unwrap(),
            CellValue::DateTime(date.and_hms_opt(12, 0, 0).unwrap())
        );
        assert_eq!(
            cell(CellType::NumberTime1900, "0.75").resolve("A1", &[]).unwrap(),
            CellValue::Time(NaiveTime::from_hms_opt(18, 0, 0).unwrap())
        );
    }

    #[test]
    fn resolve_iso_dates() {
        assert_eq!(
            cell(CellType::IsoDateTime, "2024-03-05").resolve("A1", &[]).unwrap(),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
        );
        assert_eq!(
            cell(CellType::IsoDateTime, "2024-03-05T10:20:30").resolve("A1", &[]).unwrap(),
            CellValue::DateTime(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(10, 20, 30).unwrap())
        );
    }

    #[test]
    fn display_values() {
        assert_eq!(CellValue::Number(3.0).to_string(), "3");
        assert_eq!(CellValue::Boolean(true).to_string(), "true");
        assert_eq!(CellValue::from("Name").to_string(), "Name");
        assert_eq!(CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).to_string(), "2024-01-02");
    }
}
