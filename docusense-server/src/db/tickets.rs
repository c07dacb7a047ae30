//! Ticket persistence
//!
//! Inserts take any SQLite executor so the ingest can run them either inside
//! one upload-wide transaction or directly on the pool (one commit per row).

use docusense_common::db::{NewTicket, Ticket};
use sqlx::{Sqlite, SqlitePool};

/// Default page size for `GET /tickets`
pub const DEFAULT_LIST_LIMIT: i64 = 50;

const SELECT_TICKET: &str =
    "SELECT id, subject, body, combined_text, predicted_category, created_at FROM tickets";

/// Filter for listing tickets, newest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketFilter {
    /// Maximum rows; negative means unlimited (SQLite `LIMIT` semantics)
    pub limit: i64,
    /// Exact-match category
    pub category: Option<String>,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            category: None,
        }
    }
}

/// Insert one ticket and return its assigned id
pub async fn insert_ticket<'e, E>(executor: E, ticket: &NewTicket) -> sqlx::Result<i64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO tickets (subject, body, combined_text, predicted_category, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&ticket.subject)
    .bind(&ticket.body)
    .bind(&ticket.combined_text)
    .bind(&ticket.predicted_category)
    .bind(ticket.created_at)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Load a ticket by id
pub async fn get_ticket(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Ticket>> {
    sqlx::query_as::<_, Ticket>(&format!("{} WHERE id = ?", SELECT_TICKET))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// List tickets ordered by id descending
pub async fn list_tickets(pool: &SqlitePool, filter: &TicketFilter) -> sqlx::Result<Vec<Ticket>> {
    match &filter.category {
        Some(category) => {
            sqlx::query_as::<_, Ticket>(&format!(
                "{} WHERE predicted_category = ? ORDER BY id DESC LIMIT ?",
                SELECT_TICKET
            ))
            .bind(category)
            .bind(filter.limit)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Ticket>(&format!("{} ORDER BY id DESC LIMIT ?", SELECT_TICKET))
                .bind(filter.limit)
                .fetch_all(pool)
                .await
        }
    }
}

/// Total number of stored tickets
pub async fn count_tickets(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM tickets")
        .fetch_one(pool)
        .await
}
