//! Batch import results and progress

use fleetops_common::Locale;
use serde::{Deserialize, Serialize};

/// One rejected row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Spreadsheet row number (header is row 1)
    pub row: usize,
    pub message: String,
}

/// Terminal report for a whole file
///
/// `successful + failed == total` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Data rows in the file (header and blank lines excluded)
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Failures in file order
    pub errors: Vec<RowError>,
    /// Set when the run stopped early; unattempted rows are listed in `errors`
    #[serde(default)]
    pub cancelled: bool,
}

impl ImportOutcome {
    /// Outcome for a file without data rows
    pub fn empty() -> Self {
        Self {
            total: 0,
            successful: 0,
            failed: 0,
            errors: Vec::new(),
            cancelled: false,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `"Fila {row}: {message}"` lines for the error list
    pub fn error_lines(&self, locale: Locale) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| locale.row_error_line(e.row, &e.message))
            .collect()
    }

    /// Full plain-text report: counters, then the error list when non-empty
    pub fn report_lines(&self, locale: Locale) -> Vec<String> {
        let (total, successful, failed) = locale.summary_labels();
        let mut lines = vec![
            format!("{}: {}", total, self.total),
            format!("{}: {}", successful, self.successful),
            format!("{}: {}", failed, self.failed),
        ];
        if self.cancelled {
            lines.push(locale.cancelled().to_string());
        }
        lines.extend(self.error_lines(locale));
        lines
    }
}

impl Default for ImportOutcome {
    fn default() -> Self {
        Self::empty()
    }
}

/// Rows processed so far, reported after every row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportProgress {
    pub processed: usize,
    pub total: usize,
}

impl ImportProgress {
    pub fn new(processed: usize, total: usize) -> Self {
        Self { processed, total }
    }

    /// Percentage complete (0.0 - 100.0); an empty file counts as complete
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f32 / self.total as f32 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome_with_failure() -> ImportOutcome {
        ImportOutcome {
            total: 4,
            successful: 3,
            failed: 1,
            errors: vec![RowError {
                row: 3,
                message: "duplicate".to_string(),
            }],
            cancelled: false,
        }
    }

    #[test]
    fn test_report_lines_spanish() {
        let lines = outcome_with_failure().report_lines(Locale::Es);
        assert_eq!(
            lines,
            vec![
                "Total de filas: 4",
                "Exitosas: 3",
                "Fallidas: 1",
                "Fila 3: duplicate",
            ]
        );
    }

    #[test]
    fn test_clean_run_has_no_error_list() {
        let outcome = ImportOutcome {
            total: 2,
            successful: 2,
            ..ImportOutcome::empty()
        };
        assert!(!outcome.has_errors());
        assert_eq!(outcome.report_lines(Locale::En).len(), 3);
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(ImportProgress::new(1, 4).percentage(), 25.0);
        assert_eq!(ImportProgress::new(0, 0).percentage(), 100.0);
    }
}
