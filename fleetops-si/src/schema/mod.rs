//! Row schemas for the bulk-upload flows
//!
//! Each schema fixes the column order of its CSV file, the table rows are
//! created in, the conflict key used in upsert mode, and how a raw row is
//! turned into a [`ParsedRow`]. Parsing is pure: the same row and context
//! always give the same verdict.

pub mod assignments;
pub mod fields;
pub mod shifts;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{ImportContext, ImportRow, ParsedRow};

pub use assignments::AssignmentSchema;
pub use shifts::ShiftSchema;

/// Which bulk-upload flow a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// Shift definitions per branch
    Shifts,
    /// Driver shift assignments over a date range
    Assignments,
}

/// Column layout and validation for one import kind
pub trait RowSchema: Send + Sync {
    fn kind(&self) -> ImportKind;

    /// Target table in the remote store
    fn table(&self) -> &'static str;

    /// Expected header cells, in column order
    fn header(&self) -> &'static [&'static str];

    /// Columns identifying an existing row, for upsert mode
    fn conflict_key(&self) -> &'static str;

    /// Validate a row and resolve its references
    fn parse(&self, row: &ImportRow, context: &ImportContext) -> ParsedRow;

    /// True when `header` matches the expected columns (case-insensitive)
    fn header_matches(&self, header: &[String]) -> bool {
        let expected = self.header();
        header.len() >= expected.len()
            && expected
                .iter()
                .zip(header)
                .all(|(e, h)| e.to_lowercase() == h.trim().to_lowercase())
    }
}

impl ImportKind {
    pub const ALL: [ImportKind; 2] = [ImportKind::Shifts, ImportKind::Assignments];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Shifts => "shifts",
            ImportKind::Assignments => "assignments",
        }
    }

    pub fn schema(&self) -> &'static dyn RowSchema {
        match self {
            ImportKind::Shifts => &ShiftSchema,
            ImportKind::Assignments => &AssignmentSchema,
        }
    }
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "shifts" | "turnos" => Ok(ImportKind::Shifts),
            "assignments" | "asignaciones" => Ok(ImportKind::Assignments),
            other => Err(format!(
                "Unknown import kind '{}' (expected 'shifts' or 'assignments')",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("shifts".parse::<ImportKind>().unwrap(), ImportKind::Shifts);
        assert_eq!("Turnos".parse::<ImportKind>().unwrap(), ImportKind::Shifts);
        assert_eq!(
            "asignaciones".parse::<ImportKind>().unwrap(),
            ImportKind::Assignments
        );
        assert!("drivers".parse::<ImportKind>().is_err());
    }

    #[test]
    fn test_schema_lookup() {
        for kind in ImportKind::ALL {
            assert_eq!(kind.schema().kind(), kind);
        }
        assert_eq!(ImportKind::Shifts.schema().table(), "shifts");
        assert_eq!(ImportKind::Assignments.schema().table(), "shift_assignments");
    }

    #[test]
    fn test_header_matches_ignores_case() {
        let header: Vec<String> = ["sucursal", "NOMBRE", "Hora Inicio", "Hora Fin", "Día Libre"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(ShiftSchema.header_matches(&header));
        assert!(!AssignmentSchema.header_matches(&header));
    }
}
