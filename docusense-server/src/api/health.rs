//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::db::tickets::count_tickets;
use crate::error::ApiResult;
use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    /// Labels the loaded classifier can assign
    pub categories: Vec<String>,
    /// Tickets stored so far
    pub tickets: i64,
    pub uptime_seconds: i64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let tickets = count_tickets(&state.db).await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        module: "docusense-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        categories: state.classifier.labels().to_vec(),
        tickets,
        uptime_seconds: (Utc::now() - state.startup_time).num_seconds(),
    }))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
