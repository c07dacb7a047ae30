//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted support ticket
///
/// Immutable once inserted; `predicted_category` is always set because
/// classification runs before the insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ticket {
    pub id: i64,
    pub subject: String,
    pub body: String,
    pub combined_text: String,
    pub predicted_category: String,
    pub created_at: DateTime<Utc>,
}

/// Ticket fields known before the insert assigns an id
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub subject: String,
    pub body: String,
    pub combined_text: String,
    pub predicted_category: String,
    pub created_at: DateTime<Utc>,
}

impl NewTicket {
    /// Build a ticket stamped with the current time
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        combined_text: impl Into<String>,
        predicted_category: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            combined_text: combined_text.into(),
            predicted_category: predicted_category.into(),
            created_at: Utc::now(),
        }
    }

    /// Attach the id assigned by the database
    pub fn with_id(self, id: i64) -> Ticket {
        Ticket {
            id,
            subject: self.subject,
            body: self.body,
            combined_text: self.combined_text,
            predicted_category: self.predicted_category,
            created_at: self.created_at,
        }
    }
}
