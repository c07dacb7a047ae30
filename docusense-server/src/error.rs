//! Error types for docusense-server
//!
//! Every error renders as `{"detail": <message>, "code": <CODE>}`; partial
//! per-row ingests also report what was committed before the failure.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::csv_input::CsvInputError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Upload exceeds the configured body limit (413)
    #[error("{0}")]
    PayloadTooLarge(String),

    /// Upload content could not be parsed as CSV (500)
    #[error("{0}")]
    MalformedCsv(String),

    /// Per-row ingest stopped partway; earlier rows stay committed (500)
    #[error("Ingest stopped after {ingested} rows: {message}")]
    PartialIngest {
        ingested: usize,
        ticket_ids: Vec<i64>,
        message: String,
    },

    /// Classifier failure (500)
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Database failure (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CsvInputError> for ApiError {
    fn from(err: CsvInputError) -> Self {
        match err {
            CsvInputError::MissingColumns { .. } => ApiError::BadRequest(err.to_string()),
            CsvInputError::Malformed(_) | CsvInputError::TooManyFields { .. } => {
                ApiError::MalformedCsv(err.to_string())
            }
        }
    }
}

// Extractor rejections would otherwise reach the client as plain text
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            ApiError::MalformedCsv(_) => (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_CSV"),
            ApiError::PartialIngest { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PARTIAL_INGEST")
            }
            ApiError::Classifier(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CLASSIFIER_ERROR"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        }

        let body = match &self {
            ApiError::PartialIngest {
                ingested,
                ticket_ids,
                ..
            } => json!({
                "detail": self.to_string(),
                "code": code,
                "ingested": ingested,
                "ticket_ids": ticket_ids,
            }),
            _ => json!({
                "detail": self.to_string(),
                "code": code,
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_is_bad_request() {
        let err: ApiError = CsvInputError::MissingColumns {
            missing: vec!["body".to_string()],
        }
        .into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "CSV must include columns: subject, body");
    }

    #[test]
    fn test_too_many_fields_is_malformed() {
        let err: ApiError = CsvInputError::TooManyFields {
            line: 2,
            expected: 2,
            found: 3,
        }
        .into();
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_CSV")
        );
    }

    #[test]
    fn test_not_found_status() {
        let response = ApiError::NotFound("Ticket not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
