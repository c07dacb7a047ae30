//! CSV ingest endpoint
//!
//! POST /ingest/csv: multipart upload with a `file` field

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};

use crate::csv_input::{decode_lossy, has_csv_extension, parse_ticket_rows};
use crate::error::{ApiError, ApiResult};
use crate::ingest::{ingest_rows, IngestSummary};
use crate::AppState;

/// Multipart field carrying the CSV file
pub const UPLOAD_FIELD: &str = "file";

struct Upload {
    filename: String,
    bytes: Bytes,
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("Upload too large: {}", err.body_text()))
    } else {
        ApiError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Pull the `file` field out of the form, rejecting non-CSV filenames early
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Upload> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        if !has_csv_extension(&filename) {
            return Err(ApiError::BadRequest("Please upload a .csv file".to_string()));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(Upload { filename, bytes });
    }

    Err(ApiError::BadRequest(format!(
        "Missing multipart field: {}",
        UPLOAD_FIELD
    )))
}

/// POST /ingest/csv
///
/// Validates the upload, then classifies and stores every row in file order.
pub async fn ingest_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<IngestSummary>> {
    let mut multipart = multipart?;
    let upload = read_upload(&mut multipart).await?;

    let text = decode_lossy(&upload.bytes);
    let rows = parse_ticket_rows(&text)?;

    tracing::info!(
        filename = %upload.filename,
        bytes = upload.bytes.len(),
        rows = rows.len(),
        "CSV upload accepted"
    );

    let summary = ingest_rows(&state.db, state.classifier.as_ref(), &rows, state.ingest).await?;
    Ok(Json(summary))
}

/// Build ingest routes
pub fn ingest_routes() -> Router<AppState> {
    Router::new().route("/ingest/csv", post(ingest_csv))
}
