//! docusense-server library
//!
//! Ingests support tickets from CSV uploads, classifies each one, stores it
//! in SQLite, and serves query endpoints. Exposed as a library so
//! integration tests can build the router against their own state.

pub mod api;
pub mod classifier;
pub mod csv_input;
pub mod db;
pub mod error;
pub mod ingest;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::classifier::TicketClassifier;
use crate::ingest::IngestSettings;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Fitted classifier, shared read-only
    pub classifier: Arc<dyn TicketClassifier>,
    /// Transaction boundary and response shape for uploads
    pub ingest: IngestSettings,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        classifier: Arc<dyn TicketClassifier>,
        ingest: IngestSettings,
    ) -> Self {
        Self {
            db,
            classifier,
            ingest,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// `max_upload_bytes` caps request bodies (multipart uploads included).
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(api::ingest_routes())
        .merge(api::ticket_routes())
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
