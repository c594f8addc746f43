//! Whole-model, role grouping and storage status endpoints

use axum::{extract::State, routing::get, Json, Router};
use pmo_common::api::ApiResponse;
use pmo_common::{Analyst, DashboardModel};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{ApiError, ApiResult, AppState};

/// Storage probe result
#[derive(Debug, Serialize)]
pub struct StorageStatus {
    #[serde(rename = "armazenamento")]
    pub backend: &'static str,
    #[serde(rename = "disponivel")]
    pub available: bool,
}

/// GET /api/dados
///
/// The persisted model as-is; 404 before the first ingestion.
pub async fn get_model(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<DashboardModel>>> {
    let model = state
        .store
        .load()
        .await?
        .ok_or_else(|| ApiError::NotFound("No data has been processed yet".to_string()))?;

    Ok(Json(ApiResponse::ok(model)))
}

/// GET /api/funcoes
pub async fn get_roles(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<BTreeMap<String, Vec<Analyst>>>>> {
    let model = state.model_or_empty().await?;
    Ok(Json(ApiResponse::ok(model.analysts_by_role)))
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<StorageStatus>> {
    let status = StorageStatus {
        backend: state.store.name(),
        available: state.store.is_available().await,
    };

    let message = if status.available {
        "Storage available"
    } else {
        "Storage unavailable"
    };
    Json(ApiResponse::ok_with_message(status, message))
}

pub fn model_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dados", get(get_model))
        .route("/api/funcoes", get(get_roles))
        .route("/api/status", get(get_status))
}
