//! Server-side record of one import run
//!
//! RUNNING → COMPLETED | CANCELLED | FAILED

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ImportOutcome, ImportProgress};
use crate::schema::ImportKind;

/// Import job state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    /// Rows are being processed
    Running,
    /// Every row was processed (row failures are part of the outcome)
    Completed,
    /// Stopped by the operator between rows
    Cancelled,
    /// Aborted before processing rows (unreadable file, references unavailable)
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub job_id: Uuid,
    pub kind: ImportKind,
    pub file_name: String,
    pub state: JobState,
    pub progress: ImportProgress,
    /// Final report, present once the job is COMPLETED or CANCELLED
    pub outcome: Option<ImportOutcome>,
    /// Fatal error, present when the job FAILED
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ImportJob {
    pub fn new(kind: ImportKind, file_name: String) -> Self {
        Self {
            job_id: Uuid::new_v4(),
            kind,
            file_name,
            state: JobState::Running,
            progress: ImportProgress::new(0, 0),
            outcome: None,
            error_message: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn update_progress(&mut self, progress: ImportProgress) {
        self.progress = progress;
    }

    /// Record the outcome; the state follows the outcome's cancelled flag
    ///
    /// A cancelled job keeps the last reported processed count.
    pub fn finish(&mut self, outcome: ImportOutcome) {
        if outcome.cancelled {
            self.state = JobState::Cancelled;
            self.progress.total = outcome.total;
        } else {
            self.state = JobState::Completed;
            self.progress = ImportProgress::new(outcome.total, outcome.total);
        }
        self.outcome = Some(outcome);
        self.ended_at = Some(Utc::now());
    }

    pub fn fail(&mut self, error_message: String) {
        self.state = JobState::Failed;
        self.error_message = Some(error_message);
        self.ended_at = Some(Utc::now());
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.state, JobState::Running)
    }

    pub fn duration_ms(&self) -> u64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds().max(0) as u64
    }
}
