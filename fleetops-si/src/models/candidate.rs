//! Validated records ready for the remote store
//!
//! A row becomes a [`ParsedRow`]: either a typed [`CandidateRecord`] or the
//! first [`RowIssue`] found while validating it.

use chrono::NaiveDate;
use fleetops_common::Locale;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shift definition (`shifts` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    pub branch_id: String,
    pub name: String,
    /// Start of day, `HH:MM`
    pub start_time: String,
    /// End of day, `HH:MM`
    pub end_time: String,
    /// Day off, 1 = Monday … 7 = Sunday
    pub free_day: u8,
}

/// Driver-to-shift assignment (`shift_assignments` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub driver_id: String,
    pub shift_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 1 (highest) … 5 (lowest)
    pub priority: u8,
}

/// Record submitted to the remote store, serialized as the bare entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CandidateRecord {
    Shift(ShiftRecord),
    Assignment(AssignmentRecord),
}

/// Outcome of validating one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedRow {
    Valid(CandidateRecord),
    Invalid(RowIssue),
}

/// Why a row was rejected before reaching the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIssue {
    Missing {
        column: &'static str,
    },
    InvalidTime {
        column: &'static str,
        value: String,
    },
    InvalidDate {
        column: &'static str,
        value: String,
    },
    NotInteger {
        column: &'static str,
        value: String,
    },
    OutOfRange {
        column: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    EndBeforeStart {
        start_column: &'static str,
        end_column: &'static str,
    },
    UnknownReference {
        column: &'static str,
        value: String,
    },
    AmbiguousReference {
        column: &'static str,
        value: String,
        matches: usize,
    },
}

impl ParsedRow {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedRow::Valid(_))
    }
}

impl RowIssue {
    /// Operator-facing description in the given locale
    pub fn describe(&self, locale: Locale) -> String {
        match (locale, self) {
            (Locale::Es, RowIssue::Missing { column }) => {
                format!("{}: campo obligatorio", column)
            }
            (Locale::En, RowIssue::Missing { column }) => {
                format!("{}: required field", column)
            }
            (Locale::Es, RowIssue::InvalidTime { column, value }) => {
                format!("{}: hora inválida '{}' (formato HH:MM)", column, value)
            }
            (Locale::En, RowIssue::InvalidTime { column, value }) => {
                format!("{}: invalid time '{}' (expected HH:MM)", column, value)
            }
            (Locale::Es, RowIssue::InvalidDate { column, value }) => {
                format!("{}: fecha inválida '{}' (formato AAAA-MM-DD)", column, value)
            }
            (Locale::En, RowIssue::InvalidDate { column, value }) => {
                format!("{}: invalid date '{}' (expected YYYY-MM-DD)", column, value)
            }
            (Locale::Es, RowIssue::NotInteger { column, value }) => {
                format!("{}: '{}' no es un número entero", column, value)
            }
            (Locale::En, RowIssue::NotInteger { column, value }) => {
                format!("{}: '{}' is not an integer", column, value)
            }
            (Locale::Es, RowIssue::OutOfRange { column, value, min, max }) => {
                format!("{}: {} fuera de rango ({}-{})", column, value, min, max)
            }
            (Locale::En, RowIssue::OutOfRange { column, value, min, max }) => {
                format!("{}: {} out of range ({}-{})", column, value, min, max)
            }
            (Locale::Es, RowIssue::EndBeforeStart { start_column, end_column }) => {
                format!("{} es anterior a {}", end_column, start_column)
            }
            (Locale::En, RowIssue::EndBeforeStart { start_column, end_column }) => {
                format!("{} is before {}", end_column, start_column)
            }
            (Locale::Es, RowIssue::UnknownReference { column, value }) => {
                format!("{}: '{}' no existe", column, value)
            }
            (Locale::En, RowIssue::UnknownReference { column, value }) => {
                format!("{}: '{}' not found", column, value)
            }
            (Locale::Es, RowIssue::AmbiguousReference { column, value, matches }) => {
                format!("{}: '{}' es ambiguo ({} coincidencias)", column, value, matches)
            }
            (Locale::En, RowIssue::AmbiguousReference { column, value, matches }) => {
                format!("{}: '{}' is ambiguous ({} matches)", column, value, matches)
            }
        }
    }
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(Locale::En))
    }
}
