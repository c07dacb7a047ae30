//! Ticket query endpoints
//!
//! GET /tickets and GET /tickets/:id

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use docusense_common::db::Ticket;

use crate::db::tickets::{get_ticket, list_tickets, TicketFilter, DEFAULT_LIST_LIMIT};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsQuery {
    /// Maximum tickets returned; no upper bound is enforced
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Exact-match category filter; empty means no filter
    pub category: Option<String>,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

impl From<ListTicketsQuery> for TicketFilter {
    fn from(query: ListTicketsQuery) -> Self {
        Self {
            limit: query.limit,
            category: query.category.filter(|c| !c.is_empty()),
        }
    }
}

/// GET /tickets
///
/// Newest id first.
pub async fn list_tickets_handler(
    State(state): State<AppState>,
    query: Result<Query<ListTicketsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Ticket>>> {
    let Query(query) = query?;
    let filter = TicketFilter::from(query);
    let tickets = list_tickets(&state.db, &filter).await?;

    tracing::debug!(
        limit = filter.limit,
        category = ?filter.category,
        returned = tickets.len(),
        "Ticket list query"
    );

    Ok(Json(tickets))
}

/// GET /tickets/:id
pub async fn get_ticket_handler(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Ticket>> {
    let Path(id) = id?;
    get_ticket(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Ticket not found".to_string()))
}

/// Build ticket query routes
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(list_tickets_handler))
        .route("/tickets/:id", get(get_ticket_handler))
}
