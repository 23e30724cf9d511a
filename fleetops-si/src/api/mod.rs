//! HTTP API handlers for fleetops-si

pub mod health;
pub mod import;
pub mod sse;

pub use health::health_routes;
pub use import::import_routes;
pub use sse::import_event_stream;
