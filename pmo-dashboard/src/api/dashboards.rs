//! Indicator and weekly planning dashboards

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use pmo_common::api::ApiResponse;
use serde::Deserialize;

use crate::reports::{indicators, weekly_plan, Indicators, WeekPlan};
use crate::{ApiError, ApiResult, AppState};

/// GET /api/indicadores
pub async fn get_indicators(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Indicators>>> {
    let model = state.model_or_empty().await?;
    Ok(Json(ApiResponse::ok(indicators(&model, state.today()))))
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanningQuery {
    /// Any day of the wanted week, `YYYY-MM-DD`; defaults to today
    pub inicio: Option<String>,
}

/// GET /api/planejamento
pub async fn get_planning(
    State(state): State<AppState>,
    query: Result<Query<PlanningQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<WeekPlan>>> {
    let Query(query) = query?;
    let day = match query.inicio.as_deref().map(str::trim) {
        None | Some("") => state.today(),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
            ApiError::BadRequest(format!("Invalid date for inicio: {}", value))
        })?,
    };

    let model = state.model_or_empty().await?;
    Ok(Json(ApiResponse::ok(weekly_plan(&model.tasks, day))))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/api/indicadores", get(get_indicators))
        .route("/api/planejamento", get(get_planning))
}
