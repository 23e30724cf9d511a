//! Event system for FleetOps services
//!
//! Provides shared event definitions and the EventBus used to feed
//! Server-Sent Events to the dashboard.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// FleetOps event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FleetEvent {
    /// Import job accepted and started
    ///
    /// Triggers:
    /// - SSE: Open the progress dialog
    ImportJobStarted {
        /// Import job UUID
        job_id: Uuid,
        /// Import kind ("shifts", "assignments")
        kind: String,
        /// Uploaded file name
        file_name: String,
        /// When the job started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Row-level progress
    ///
    /// Emitted once per processed row, in file order
    ImportProgressUpdate {
        /// Import job UUID
        job_id: Uuid,
        /// Rows processed so far
        processed: usize,
        /// Total data rows in the file
        total: usize,
        /// Progress percentage (0.0-100.0)
        percentage: f32,
        /// When progress updated
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Import job finished (possibly with row failures)
    ///
    /// Triggers:
    /// - SSE: Show the outcome summary
    ImportJobCompleted {
        /// Import job UUID
        job_id: Uuid,
        /// Total data rows
        total: usize,
        /// Rows created in the remote store
        successful: usize,
        /// Rows rejected by validation or by the store
        failed: usize,
        /// Job duration in milliseconds
        duration_ms: u64,
        /// When the job completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Import job cancelled by the operator
    ImportJobCancelled {
        /// Import job UUID
        job_id: Uuid,
        /// Rows processed before cancellation took effect
        processed: usize,
        /// Total data rows
        total: usize,
        /// When the job was cancelled
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Import job aborted before processing rows
    ///
    /// Only fatal errors end here (unreadable file, reference data unavailable)
    ImportJobFailed {
        /// Import job UUID
        job_id: Uuid,
        /// Error message details
        error_message: String,
        /// When the job failed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl FleetEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            FleetEvent::ImportJobStarted { .. } => "ImportJobStarted",
            FleetEvent::ImportProgressUpdate { .. } => "ImportProgressUpdate",
            FleetEvent::ImportJobCompleted { .. } => "ImportJobCompleted",
            FleetEvent::ImportJobCancelled { .. } => "ImportJobCancelled",
            FleetEvent::ImportJobFailed { .. } => "ImportJobFailed",
        }
    }

    /// Job the event belongs to
    pub fn job_id(&self) -> Uuid {
        match self {
            FleetEvent::ImportJobStarted { job_id, .. }
            | FleetEvent::ImportProgressUpdate { job_id, .. }
            | FleetEvent::ImportJobCompleted { job_id, .. }
            | FleetEvent::ImportJobCancelled { job_id, .. }
            | FleetEvent::ImportJobFailed { job_id, .. } => *job_id,
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use fleetops_common::events::{EventBus, FleetEvent};
/// use uuid::Uuid;
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(FleetEvent::ImportProgressUpdate {
///     job_id: Uuid::new_v4(),
///     processed: 1,
///     total: 4,
///     percentage: 25.0,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<FleetEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered before the oldest are
    /// dropped for lagging subscribers.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<FleetEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: FleetEvent,
    ) -> Result<usize, broadcast::error::SendError<FleetEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: FleetEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
