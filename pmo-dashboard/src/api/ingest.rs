//! Reprocess and upload endpoints
//!
//! Both rebuild the whole model from the fixed input paths and replace the
//! persisted one.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use pmo_common::api::ApiResponse;
use std::path::Path;
use tracing::{info, warn};

use crate::{ApiError, ApiResult, AppState, ReprocessSummary};

/// MIME types browsers send for CSV files
const CSV_MIME_TYPES: &[&str] = &["text/csv", "application/csv", "application/vnd.ms-excel"];

/// Generic type some clients send for any text file; needs a `.csv` name
const PLAIN_TEXT_MIME: &str = "text/plain";

/// Multipart framing overhead allowed on top of the two files
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// POST /api/reprocessar
///
/// Re-reads the input files already on disk.
pub async fn reprocess(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<ReprocessSummary>>> {
    if !tokio::fs::try_exists(&state.inputs.tasks)
        .await
        .unwrap_or(false)
    {
        return Err(ApiError::NotFound(format!(
            "Input file {} not found",
            state.inputs.tasks.display()
        )));
    }

    let summary = state.reprocess().await?;
    Ok(Json(ApiResponse::ok_with_message(
        summary,
        "Data reprocessed",
    )))
}

/// A declared content type must be a CSV type (or plain text with a `.csv`
/// name); without one, the file name decides
fn is_csv(file_name: Option<&str>, content_type: Option<&str>) -> bool {
    let csv_name = file_name
        .map(|n| n.trim().to_lowercase().ends_with(".csv"))
        .unwrap_or(false);

    match content_type {
        Some(ct) => {
            let essence = ct.split(';').next().unwrap_or("").trim().to_lowercase();
            CSV_MIME_TYPES.contains(&essence.as_str())
                || (essence == PLAIN_TEXT_MIME && csv_name)
        }
        None => csv_name,
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    }
}

async fn write_input(path: &Path, bytes: &[u8]) -> ApiResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// POST /api/upload
///
/// Multipart form with a required `file` field (the timesheet export) and an
/// optional `roster` field. Both are validated before either is written.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ApiResponse<ReprocessSummary>>> {
    let mut multipart =
        multipart.map_err(|e| ApiError::BadRequest(format!("Expected multipart form: {}", e)))?;

    let mut tasks: Option<Vec<u8>> = None;
    let mut roster: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != "roster" {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        if !is_csv(file_name.as_deref(), field.content_type()) {
            return Err(ApiError::BadRequest(format!(
                "Field {} must be a CSV file (got {})",
                name,
                field.content_type().unwrap_or("no content type")
            )));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.len() > state.max_upload_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "{} is {} bytes, limit is {}",
                file_name.unwrap_or(name.clone()),
                bytes.len(),
                state.max_upload_bytes
            )));
        }

        if name == "file" {
            tasks = Some(bytes.to_vec());
        } else {
            roster = Some(bytes.to_vec());
        }
    }

    let tasks = tasks.ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;
    if tasks.is_empty() {
        warn!("Uploaded export is empty");
    }

    write_input(&state.inputs.tasks, &tasks).await?;
    if let Some(roster) = &roster {
        write_input(&state.inputs.roster, roster).await?;
    }
    info!(
        tasks_bytes = tasks.len(),
        roster_bytes = roster.as_ref().map_or(0, Vec::len),
        "Stored uploaded input files"
    );

    let summary = state.reprocess().await?;
    Ok(Json(ApiResponse::ok_with_message(
        summary,
        "Upload processed",
    )))
}

/// Build ingestion routes; the body limit covers both files
pub fn ingest_routes(max_upload_bytes: usize) -> Router<AppState> {
    let body_limit = max_upload_bytes
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/api/reprocessar", post(reprocess))
        .route(
            "/api/upload",
            post(upload).layer(DefaultBodyLimit::max(body_limit)),
        )
}
