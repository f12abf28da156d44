use crate::database::region::Region;
use crate::error::RustyTableError;
use crate::spreadsheet::reference::Coordinate;
use glob::Pattern;

/// Criteria for selecting which sheets and cells a workbook read loads.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns for filtering which sheets to load.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of sheets to load.
    pub sheet_limit: Option<usize>,

    /// Only cells inside this region are kept.
    pub range: Option<Region>,

    /// Drop error cells (`#N/A`, `#REF!`, ...) instead of keeping them as values.
    pub error_as_null: bool,
}

impl Criteria {
    /// Builds criteria matching the given glob patterns against sheet names.
    pub fn with_sheet_names(patterns: &[&str]) -> Result<Self, RustyTableError> {
        let patterns = patterns
            .iter()
            .map(|pattern| Pattern::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Criteria {
            sheet_name_patterns: Some(patterns),
            ..Criteria::default()
        })
    }

    /// Checks if a sheet name matches the criteria patterns.
    /// Returns true if no patterns are specified or if name matches any pattern.
    pub fn accept(&self, sheet_name: &str) -> bool {
        match &self.sheet_name_patterns {
            Some(patterns) => patterns.iter().any(|pattern| pattern.matches(sheet_name)),
            None => true,
        }
    }

    /// Whether a cell at the given 1-based position should be kept.
    pub(crate) fn contains(&self, row: usize, col: usize) -> bool {
        match self.range {
            Some(range) => Coordinate::new(col, row)
                .map(|coordinate| range.contains(coordinate))
                .unwrap_or(false),
            None => true,
        }
    }

    /// Whether every remaining row of a sheet lies below the range.
    pub(crate) fn after_row_upper_bound(&self, row: usize) -> bool {
        self.range.map(|range| range.lower() < row).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_without_patterns() {
        assert!(Criteria::default().accept("anything"));
    }

    #[test]
    fn accept_with_patterns() {
        let criteria = Criteria::with_sheet_names(&["Data*", "Summary"]).unwrap();
        assert!(criteria.accept("Data 2024"));
        assert!(criteria.accept("Summary"));
        assert!(!criteria.accept("Notes"));
    }

    #[test]
    fn invalid_pattern_fails() {
        assert!(matches!(
            Criteria::with_sheet_names(&["[a"]),
            Err(RustyTableError::PatternError(_))
        ));
    }

    #[test]
    fn range_filter() {
        let criteria = Criteria {
            range: Some(Region::try_from("B2:C3").unwrap()),
            ..Criteria::default()
        };
        assert!(criteria.contains(2, 2));
        assert!(criteria.contains(3, 3));
        assert!(!criteria.contains(1, 2));
        assert!(!criteria.contains(2, 4));
        assert!(!criteria.contains(0, 2));
        assert!(!criteria.after_row_upper_bound(3));
        assert!(criteria.after_row_upper_bound(4));
    }
}
