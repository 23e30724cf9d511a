//! CSV batch importer
//!
//! Validates each data row of an uploaded file against its [`RowSchema`],
//! resolves branch and shift names through the [`ImportContext`], and creates
//! one record per valid row in the remote store.
//!
//! Row failures never abort the run. A row that fails validation is recorded
//! with the generic invalid-data message and never reaches the store; a row
//! the store rejects is recorded with the store's message. Only an unreadable
//! file is an error for the whole call.
//!
//! # Concurrency
//!
//! With `max_in_flight = 1` (default) rows are strictly sequential: each
//! create call is awaited before the next row starts. Larger values keep up
//! to N calls in flight, but rows are still reported in file order.
//!
//! The importer holds no state between calls. Concurrent imports share
//! nothing and are not deduplicated against each other.

use fleetops_common::config::ImportConfig;
use fleetops_common::Locale;
use futures::future::FutureExt;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::csv_reader::CsvReader;
use super::remote_store::{RemoteStore, StoreError};
use crate::models::{
    ImportContext, ImportOutcome, ImportProgress, ImportRow, ParsedRow, RowError, RowIssue,
};
use crate::schema::{ImportKind, RowSchema};

/// Errors that abort a whole import
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input could not be read as text
    #[error("Failed to read file: {0}")]
    FileRead(String),

    /// Reference data needed to resolve rows is unavailable
    #[error("Failed to load reference data: {0}")]
    References(#[from] StoreError),
}

/// Per-run behaviour
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub locale: Locale,
    pub max_in_flight: usize,
    pub upsert: bool,
    pub detailed_errors: bool,
    pub latin1_fallback: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            locale: config.locale,
            max_in_flight: config.max_in_flight.max(1),
            upsert: config.upsert,
            detailed_errors: config.detailed_errors,
            latin1_fallback: config.latin1_fallback,
        }
    }
}

/// Receives `(processed, total)` after every row, in file order
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: ImportProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(ImportProgress) + Send + Sync,
{
    fn on_progress(&self, progress: ImportProgress) {
        self(progress)
    }
}

/// What happened to one row
#[derive(Debug)]
enum RowResult {
    Created,
    Invalid(RowIssue),
    Rejected(StoreError),
    /// Not attempted because the run was cancelled first
    Skipped,
}

/// Counters for one `import` call
struct Tally {
    total: usize,
    successful: usize,
    skipped: usize,
    errors: Vec<RowError>,
}

impl Tally {
    fn new(total: usize) -> Self {
        Self {
            total,
            successful: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    /// Rows attempted so far; skipped rows are not counted
    fn processed(&self) -> usize {
        self.successful + self.errors.len() - self.skipped
    }

    fn record_success(&mut self) {
        self.successful += 1;
    }

    fn record_failure(&mut self, row: usize, message: String) {
        self.errors.push(RowError { row, message });
    }

    fn into_outcome(self) -> ImportOutcome {
        ImportOutcome {
            total: self.total,
            successful: self.successful,
            failed: self.total - self.successful,
            errors: self.errors,
            cancelled: self.skipped > 0,
        }
    }
}

/// Imports one CSV file per call
pub struct CsvBatchImporter {
    store: Arc<dyn RemoteStore>,
    options: ImportOptions,
}

impl CsvBatchImporter {
    pub fn new(store: Arc<dyn RemoteStore>, options: ImportOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Import a whole file without progress reporting or cancellation
    pub async fn import(
        &self,
        kind: ImportKind,
        bytes: &[u8],
        context: &ImportContext,
    ) -> Result<ImportOutcome, ImportError> {
        let never_cancelled = CancellationToken::new();
        self.import_with(kind, bytes, context, &|_: ImportProgress| {}, &never_cancelled)
            .await
    }

    /// Import a whole file, reporting progress after each row
    ///
    /// `cancel` is checked before each row starts. Rows not yet started when
    /// it fires are recorded as failed with the locale's cancelled message and
    /// produce no progress report.
    pub async fn import_with(
        &self,
        kind: ImportKind,
        bytes: &[u8],
        context: &ImportContext,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome, ImportError> {
        let schema = kind.schema();
        let document = CsvReader::new()
            .with_latin1_fallback(self.options.latin1_fallback)
            .read(bytes)?;

        if !document.header.is_empty() && !schema.header_matches(&document.header) {
            tracing::warn!(
                kind = %kind,
                header = ?document.header,
                expected = ?schema.header(),
                "Unexpected CSV header, columns are read by position"
            );
        }

        let total = document.rows.len();
        if total == 0 {
            tracing::info!(kind = %kind, "No data rows in file");
            return Ok(ImportOutcome::empty());
        }

        tracing::info!(
            kind = %kind,
            rows = total,
            max_in_flight = self.options.max_in_flight,
            upsert = self.options.upsert,
            "Starting batch import"
        );

        let mut tally = Tally::new(total);
        let locale = self.options.locale;

        // Row futures are built up front so the spawned job stays Send.
        // `buffered` yields in input order regardless of completion order.
        let pending: Vec<_> = document
            .rows
            .iter()
            .map(|row| {
                async move { (row.row, self.process_row(schema, row, context, cancel).await) }
                    .boxed()
            })
            .collect();
        let mut results = stream::iter(pending).buffered(self.options.max_in_flight.max(1));

        while let Some((row, result)) = results.next().await {
            match result {
                RowResult::Created => tally.record_success(),
                RowResult::Invalid(issue) => {
                    tracing::debug!(row, reason = %issue, "Row failed validation");
                    tally.record_failure(row, self.invalid_message(&issue));
                }
                RowResult::Rejected(e) => {
                    tracing::warn!(row, error = %e, "Remote store rejected row");
                    tally.record_failure(row, e.operator_message(locale));
                }
                RowResult::Skipped => {
                    tally.skipped += 1;
                    tally.record_failure(row, locale.cancelled().to_string());
                    continue;
                }
            }
            progress.on_progress(ImportProgress::new(tally.processed(), total));
        }

        let outcome = tally.into_outcome();
        tracing::info!(
            kind = %kind,
            total = outcome.total,
            successful = outcome.successful,
            failed = outcome.failed,
            cancelled = outcome.cancelled,
            "Batch import finished"
        );

        Ok(outcome)
    }

    async fn process_row(
        &self,
        schema: &dyn RowSchema,
        row: &ImportRow,
        context: &ImportContext,
        cancel: &CancellationToken,
    ) -> RowResult {
        if cancel.is_cancelled() {
            return RowResult::Skipped;
        }

        let record = match schema.parse(row, context) {
            ParsedRow::Valid(record) => record,
            ParsedRow::Invalid(issue) => return RowResult::Invalid(issue),
        };

        let on_conflict = self.options.upsert.then(|| schema.conflict_key());
        match self.store.create(schema.table(), &record, on_conflict).await {
            Ok(_) => RowResult::Created,
            Err(e) => RowResult::Rejected(e),
        }
    }

    fn invalid_message(&self, issue: &RowIssue) -> String {
        if self.options.detailed_errors {
            issue.describe(self.options.locale)
        } else {
            self.options.locale.invalid_data().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_config() {
        let config = ImportConfig {
            locale: Locale::En,
            max_in_flight: 0,
            upsert: true,
            detailed_errors: true,
            latin1_fallback: false,
        };
        let options = ImportOptions::from(&config);

        assert_eq!(options.locale, Locale::En);
        assert_eq!(options.max_in_flight, 1);
        assert!(options.upsert);
        assert!(!options.latin1_fallback);
    }

    #[test]
    fn test_default_options_are_sequential() {
        let options = ImportOptions::default();
        assert_eq!(options.max_in_flight, 1);
        assert_eq!(options.locale, Locale::Es);
        assert!(!options.detailed_errors);
    }

    #[test]
    fn test_tally_keeps_sum_invariant() {
        let mut tally = Tally::new(3);
        tally.record_success();
        tally.record_failure(3, "duplicate".into());
        tally.skipped += 1;
        tally.record_failure(4, "Importación cancelada".into());
        assert_eq!(tally.processed(), 2);

        let outcome = tally.into_outcome();
        assert_eq!(outcome.successful + outcome.failed, outcome.total);
        assert!(outcome.cancelled);
    }
}
