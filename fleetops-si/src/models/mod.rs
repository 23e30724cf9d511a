//! Data models for fleetops-si (Schedule Import service)

pub mod candidate;
pub mod import_context;
pub mod import_job;
pub mod import_outcome;
pub mod import_row;

pub use candidate::{AssignmentRecord, CandidateRecord, ParsedRow, RowIssue, ShiftRecord};
pub use import_context::{ImportContext, Lookup};
pub use import_job::{ImportJob, JobState};
pub use import_outcome::{ImportOutcome, ImportProgress, RowError};
pub use import_row::ImportRow;
