//! Shift definitions
//!
//! ```text
//! Sucursal,Nombre,Hora Inicio,Hora Fin,Día Libre
//! Santiago,Turno AM,08:00,16:00,1
//! ```

use super::fields;
use super::{ImportKind, RowSchema};
use crate::models::{CandidateRecord, ImportContext, ImportRow, ParsedRow, RowIssue, ShiftRecord};

const BRANCH: &str = "Sucursal";
const NAME: &str = "Nombre";
const START: &str = "Hora Inicio";
const END: &str = "Hora Fin";
const FREE_DAY: &str = "Día Libre";

const HEADER: [&str; 5] = [BRANCH, NAME, START, END, FREE_DAY];

/// Day-of-week codes, 1 = Monday … 7 = Sunday
const FIRST_DAY: u8 = 1;
const LAST_DAY: u8 = 7;

#[derive(Debug, Clone, Copy, Default)]
pub struct ShiftSchema;

impl ShiftSchema {
    fn validate(&self, row: &ImportRow, context: &ImportContext) -> Result<ShiftRecord, RowIssue> {
        let branch = fields::required(row, 0, BRANCH)?;
        let name = fields::required(row, 1, NAME)?;
        let start = fields::time(row, 2, START)?;
        let end = fields::time(row, 3, END)?;
        let free_day = fields::int_in_range(row, 4, FREE_DAY, FIRST_DAY, LAST_DAY)?;

        if end < start {
            return Err(RowIssue::EndBeforeStart {
                start_column: START,
                end_column: END,
            });
        }

        // Shape is valid; only now resolve the branch name
        let branch_id = fields::reference(context.lookup_branch(branch), BRANCH, branch)?;

        Ok(ShiftRecord {
            branch_id: branch_id.to_string(),
            name: name.to_string(),
            start_time: fields::format_time(start),
            end_time: fields::format_time(end),
            free_day,
        })
    }
}

impl RowSchema for ShiftSchema {
    fn kind(&self) -> ImportKind {
        ImportKind::Shifts
    }

    fn table(&self) -> &'static str {
        "shifts"
    }

    fn header(&self) -> &'static [&'static str] {
        &HEADER
    }

    fn conflict_key(&self) -> &'static str {
        "branch_id,name"
    }

    fn parse(&self, row: &ImportRow, context: &ImportContext) -> ParsedRow {
        match self.validate(row, context) {
            Ok(record) => ParsedRow::Valid(CandidateRecord::Shift(record)),
            Err(issue) => ParsedRow::Invalid(issue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ImportContext {
        ImportContext::new().with_branch("Santiago", "b1")
    }

    fn row(line: &str) -> ImportRow {
        ImportRow::new(2, line.split(',').map(|c| c.trim().to_string()).collect())
    }

    #[test]
    fn test_valid_row() {
        let parsed = ShiftSchema.parse(&row("Santiago,Turno AM,08:00,16:00,1"), &context());
        assert_eq!(
            parsed,
            ParsedRow::Valid(CandidateRecord::Shift(ShiftRecord {
                branch_id: "b1".into(),
                name: "Turno AM".into(),
                start_time: "08:00".into(),
                end_time: "16:00".into(),
                free_day: 1,
            }))
        );
    }

    #[test]
    fn test_day_out_of_range() {
        let parsed = ShiftSchema.parse(&row("Santiago,Turno AM,08:00,16:00,9"), &context());
        assert_eq!(
            parsed,
            ParsedRow::Invalid(RowIssue::OutOfRange {
                column: FREE_DAY,
                value: 9,
                min: 1,
                max: 7,
            })
        );
    }

    #[test]
    fn test_unknown_branch() {
        let parsed = ShiftSchema.parse(&row("Concepción,Turno AM,08:00,16:00,1"), &context());
        assert!(matches!(
            parsed,
            ParsedRow::Invalid(RowIssue::UnknownReference { column: BRANCH, .. })
        ));
    }

    #[test]
    fn test_shape_checked_before_reference() {
        // Unknown branch and a bad time: the shape problem is reported
        let parsed = ShiftSchema.parse(&row("Concepción,Turno AM,8am,16:00,1"), &context());
        assert!(matches!(parsed, ParsedRow::Invalid(RowIssue::InvalidTime { .. })));
    }

    #[test]
    fn test_end_before_start() {
        let parsed = ShiftSchema.parse(&row("Santiago,Turno Noche,22:00,06:00,7"), &context());
        assert!(matches!(parsed, ParsedRow::Invalid(RowIssue::EndBeforeStart { .. })));
    }

    #[test]
    fn test_short_row() {
        let parsed = ShiftSchema.parse(&row("Santiago,Turno AM,08:00"), &context());
        assert_eq!(parsed, ParsedRow::Invalid(RowIssue::Missing { column: END }));
    }

    #[test]
    fn test_validation_is_repeatable() {
        let context = context();
        let r = row("Santiago,Turno AM,08:00,16:00,3");
        assert_eq!(ShiftSchema.parse(&r, &context), ShiftSchema.parse(&r, &context));
    }
}
