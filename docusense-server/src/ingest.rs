//! Ingest orchestration: normalize → classify → persist, in file order
//!
//! The transaction boundary is chosen by [`IngestAtomicity`]:
//! - `Batch`: one transaction for the upload; any failure leaves nothing persisted
//! - `PerRow`: each insert commits on its own; a failure stops the loop and the
//!   error reports how many rows were committed before it

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, warn};

use docusense_common::config::IngestAtomicity;
use docusense_common::db::NewTicket;

use crate::classifier::TicketClassifier;
use crate::csv_input::TicketRow;
use crate::db::tickets::insert_ticket;
use crate::error::{ApiError, ApiResult};

/// Ingest behaviour taken from configuration
#[derive(Debug, Clone, Copy)]
pub struct IngestSettings {
    pub atomicity: IngestAtomicity,
    /// How many ids the summary lists
    pub ticket_id_preview: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            atomicity: IngestAtomicity::Batch,
            ticket_id_preview: docusense_common::config::DEFAULT_TICKET_ID_PREVIEW,
        }
    }
}

impl From<&docusense_common::config::IngestConfig> for IngestSettings {
    fn from(config: &docusense_common::config::IngestConfig) -> Self {
        Self {
            atomicity: config.atomicity,
            ticket_id_preview: config.ticket_id_preview,
        }
    }
}

/// POST /ingest/csv response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub ingested: usize,
    /// First ids assigned, in insertion order
    pub ticket_ids: Vec<i64>,
}

impl IngestSummary {
    fn from_ids(ids: &[i64], preview: usize) -> Self {
        Self {
            ingested: ids.len(),
            ticket_ids: ids.iter().take(preview).copied().collect(),
        }
    }
}

/// Classify one row into a ticket ready for insert
fn classify_row(classifier: &dyn TicketClassifier, row: &TicketRow) -> ApiResult<NewTicket> {
    let combined = row.combined_text();
    let category = classifier.predict(&combined)?;
    Ok(NewTicket::new(
        row.subject.clone(),
        row.body.clone(),
        combined,
        category,
    ))
}

/// Classify and persist `rows` in order
pub async fn ingest_rows(
    pool: &SqlitePool,
    classifier: &dyn TicketClassifier,
    rows: &[TicketRow],
    settings: IngestSettings,
) -> ApiResult<IngestSummary> {
    let summary = match settings.atomicity {
        IngestAtomicity::Batch => ingest_batch(pool, classifier, rows, settings).await?,
        IngestAtomicity::PerRow => ingest_per_row(pool, classifier, rows, settings).await?,
    };

    info!(
        rows = rows.len(),
        ingested = summary.ingested,
        atomicity = ?settings.atomicity,
        "CSV ingest complete"
    );

    Ok(summary)
}

async fn ingest_batch(
    pool: &SqlitePool,
    classifier: &dyn TicketClassifier,
    rows: &[TicketRow],
    settings: IngestSettings,
) -> ApiResult<IngestSummary> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(rows.len());

    for row in rows {
        // Dropping `tx` on early return rolls the whole upload back
        let ticket = classify_row(classifier, row)?;
        ids.push(insert_ticket(&mut *tx, &ticket).await?);
    }

    tx.commit().await?;
    Ok(IngestSummary::from_ids(&ids, settings.ticket_id_preview))
}

async fn ingest_per_row(
    pool: &SqlitePool,
    classifier: &dyn TicketClassifier,
    rows: &[TicketRow],
    settings: IngestSettings,
) -> ApiResult<IngestSummary> {
    let mut ids = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let inserted = match classify_row(classifier, row) {
            Ok(ticket) => insert_ticket(pool, &ticket).await.map_err(ApiError::from),
            Err(e) => Err(e),
        };

        match inserted {
            Ok(id) => ids.push(id),
            Err(e) => {
                warn!(
                    row = index + 1,
                    committed = ids.len(),
                    error = %e,
                    "Per-row ingest stopped"
                );
                let partial = IngestSummary::from_ids(&ids, settings.ticket_id_preview);
                return Err(ApiError::PartialIngest {
                    ingested: partial.ingested,
                    ticket_ids: partial.ticket_ids,
                    message: format!("row {}: {}", index + 1, e),
                });
            }
        }
    }

    Ok(IngestSummary::from_ids(&ids, settings.ticket_id_preview))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_caps_preview() {
        let ids: Vec<i64> = (1..=25).collect();
        let summary = IngestSummary::from_ids(&ids, 20);
        assert_eq!(summary.ingested, 25);
        assert_eq!(summary.ticket_ids, (1..=20).collect::<Vec<i64>>());
    }

    #[test]
    fn test_summary_short_list() {
        let summary = IngestSummary::from_ids(&[7, 8], 20);
        assert_eq!(summary.ingested, 2);
        assert_eq!(summary.ticket_ids, vec![7, 8]);
    }
}
