//! Router and database builders for API tests

use fleetops_common::events::EventBus;
use fleetops_si::{AppState, ImportOptions, RemoteStore};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

/// In-memory job database with tables created
///
/// One connection so every query sees the same in-memory database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    fleetops_si::db::init_tables(&pool)
        .await
        .expect("Failed to initialize database schema");

    pool
}

/// Test app backed by `store`, plus its state for inspection
pub async fn create_test_app(store: Arc<dyn RemoteStore>) -> (axum::Router, AppState) {
    let pool = create_test_pool().await;
    let state = AppState::new(pool, EventBus::new(100), store, ImportOptions::default());
    let app = fleetops_si::build_router(state.clone());
    (app, state)
}
