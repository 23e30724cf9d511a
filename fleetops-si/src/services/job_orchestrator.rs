//! Background execution of server-side import jobs
//!
//! Wraps one [`CsvBatchImporter`] run with job bookkeeping:
//!
//! 1. Emit `ImportJobStarted`
//! 2. Load reference data (fatal on failure)
//! 3. Run the importer, emitting `ImportProgressUpdate` per row
//! 4. Persist the final job and emit `ImportJobCompleted` / `ImportJobCancelled`
//!
//! Fatal errors end in the FAILED state with `ImportJobFailed`.

use chrono::Utc;
use fleetops_common::events::{EventBus, FleetEvent};
use fleetops_common::Result;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::batch_importer::{CsvBatchImporter, ImportError, ImportOptions, ProgressSink};
use super::reference_loader;
use super::remote_store::RemoteStore;
use crate::models::{ImportJob, ImportProgress, JobState};

/// Forwards importer progress to the event bus
struct JobProgress {
    job_id: Uuid,
    event_bus: EventBus,
    processed: AtomicUsize,
    total: AtomicUsize,
}

impl JobProgress {
    fn new(job_id: Uuid, event_bus: EventBus) -> Self {
        Self {
            job_id,
            event_bus,
            processed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
        }
    }

    fn last(&self) -> ImportProgress {
        ImportProgress::new(
            self.processed.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

impl ProgressSink for JobProgress {
    fn on_progress(&self, progress: ImportProgress) {
        self.processed.store(progress.processed, Ordering::Relaxed);
        self.total.store(progress.total, Ordering::Relaxed);

        self.event_bus.emit_lossy(FleetEvent::ImportProgressUpdate {
            job_id: self.job_id,
            processed: progress.processed,
            total: progress.total,
            percentage: progress.percentage(),
            timestamp: Utc::now(),
        });
    }
}

/// Runs import jobs and records their lifecycle
pub struct ImportJobOrchestrator {
    db: SqlitePool,
    event_bus: EventBus,
    store: Arc<dyn RemoteStore>,
    options: ImportOptions,
}

impl ImportJobOrchestrator {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        store: Arc<dyn RemoteStore>,
        options: ImportOptions,
    ) -> Self {
        Self {
            db,
            event_bus,
            store,
            options,
        }
    }

    /// Run `job` to a terminal state
    ///
    /// Import failures are recorded on the job, not returned. `Err` means the
    /// job could not be persisted.
    pub async fn execute(
        &self,
        mut job: ImportJob,
        bytes: Vec<u8>,
        cancel: CancellationToken,
    ) -> Result<ImportJob> {
        let job_id = job.job_id;

        self.event_bus.emit_lossy(FleetEvent::ImportJobStarted {
            job_id,
            kind: job.kind.to_string(),
            file_name: job.file_name.clone(),
            timestamp: job.started_at,
        });

        let progress = JobProgress::new(job_id, self.event_bus.clone());

        match self.run_import(&job, &bytes, &progress, &cancel).await {
            Ok(outcome) => {
                job.update_progress(progress.last());
                job.finish(outcome);
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Import job failed");
                job.update_progress(progress.last());
                job.fail(e.to_string());
            }
        }

        crate::db::import_jobs::save_job(&self.db, &job).await?;
        self.emit_terminal(&job);

        Ok(job)
    }

    async fn run_import(
        &self,
        job: &ImportJob,
        bytes: &[u8],
        progress: &JobProgress,
        cancel: &CancellationToken,
    ) -> std::result::Result<crate::models::ImportOutcome, ImportError> {
        let context = reference_loader::load_context(self.store.as_ref()).await?;

        let importer = CsvBatchImporter::new(self.store.clone(), self.options.clone());
        importer
            .import_with(job.kind, bytes, &context, progress, cancel)
            .await
    }

    fn emit_terminal(&self, job: &ImportJob) {
        let timestamp = job.ended_at.unwrap_or_else(Utc::now);

        let event = match (job.state, job.outcome.as_ref()) {
            (JobState::Completed, Some(outcome)) => FleetEvent::ImportJobCompleted {
                job_id: job.job_id,
                total: outcome.total,
                successful: outcome.successful,
                failed: outcome.failed,
                duration_ms: job.duration_ms(),
                timestamp,
            },
            (JobState::Cancelled, _) => FleetEvent::ImportJobCancelled {
                job_id: job.job_id,
                processed: job.progress.processed,
                total: job.progress.total,
                timestamp,
            },
            _ => FleetEvent::ImportJobFailed {
                job_id: job.job_id,
                error_message: job
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Import failed".to_string()),
                timestamp,
            },
        };

        tracing::info!(
            job_id = %job.job_id,
            state = ?job.state,
            duration_ms = job.duration_ms(),
            "Import job finished"
        );

        self.event_bus.emit_lossy(event);
    }
}
