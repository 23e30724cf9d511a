//! fleetops-si library interface
//!
//! Bulk CSV import of shift definitions and driver shift assignments into
//! the fleet database. Exposes the importer for the CLI and the router for
//! the HTTP service and integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod services;

pub use crate::error::{ApiError, ApiResult};
pub use crate::schema::ImportKind;
pub use crate::services::{CsvBatchImporter, ImportError, ImportOptions, RemoteStore};

use axum::Router;
use chrono::{DateTime, Utc};
use fleetops_common::events::EventBus;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Job history database
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Remote store rows are created in
    pub store: Arc<dyn RemoteStore>,
    /// Options applied to every job started through the API
    pub options: ImportOptions,
    /// Cancellation tokens for running jobs
    pub cancellation_tokens: Arc<RwLock<HashMap<Uuid, CancellationToken>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
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
            cancellation_tokens: Arc::new(RwLock::new(HashMap::new())),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::import_routes())
        .route("/import/events", get(api::import_event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
