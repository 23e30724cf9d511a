//! Driver shift assignments
//!
//! ```text
//! Conductor,Turno,Fecha Inicio,Fecha Fin,Prioridad
//! drv-001,Turno AM,2024-03-01,2024-03-31,2
//! ```

use super::fields;
use super::{ImportKind, RowSchema};
use crate::models::{
    AssignmentRecord, CandidateRecord, ImportContext, ImportRow, ParsedRow, RowIssue,
};

const DRIVER: &str = "Conductor";
const SHIFT: &str = "Turno";
const START: &str = "Fecha Inicio";
const END: &str = "Fecha Fin";
const PRIORITY: &str = "Prioridad";

const HEADER: [&str; 5] = [DRIVER, SHIFT, START, END, PRIORITY];

const HIGHEST_PRIORITY: u8 = 1;
const LOWEST_PRIORITY: u8 = 5;

#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentSchema;

impl AssignmentSchema {
    fn validate(
        &self,
        row: &ImportRow,
        context: &ImportContext,
    ) -> Result<AssignmentRecord, RowIssue> {
        let driver = fields::required(row, 0, DRIVER)?;
        let shift = fields::required(row, 1, SHIFT)?;
        let start_date = fields::date(row, 2, START)?;
        let end_date = fields::date(row, 3, END)?;
        let priority = fields::int_in_range(row, 4, PRIORITY, HIGHEST_PRIORITY, LOWEST_PRIORITY)?;

        if end_date < start_date {
            return Err(RowIssue::EndBeforeStart {
                start_column: START,
                end_column: END,
            });
        }

        // Shift names repeat across branches; only a unique match is usable
        let shift_id = fields::reference(context.lookup_shift(shift), SHIFT, shift)?;

        Ok(AssignmentRecord {
            driver_id: driver.to_string(),
            shift_id: shift_id.to_string(),
            start_date,
            end_date,
            priority,
        })
    }
}

impl RowSchema for AssignmentSchema {
    fn kind(&self) -> ImportKind {
        ImportKind::Assignments
    }

    fn table(&self) -> &'static str {
        "shift_assignments"
    }

    fn header(&self) -> &'static [&'static str] {
        &HEADER
    }

    fn conflict_key(&self) -> &'static str {
        "driver_id,shift_id,start_date"
    }

    fn parse(&self, row: &ImportRow, context: &ImportContext) -> ParsedRow {
        match self.validate(row, context) {
            Ok(record) => ParsedRow::Valid(CandidateRecord::Assignment(record)),
            Err(issue) => ParsedRow::Invalid(issue),
        }
    }
}
