//! Category endpoint

use axum::{extract::State, routing::get, Json, Router};
use pmo_common::api::ApiResponse;
use pmo_common::Category;

use crate::{ApiResult, AppState};

/// GET /api/categorias
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<Category>>>> {
    let model = state.model_or_empty().await?;
    Ok(Json(ApiResponse::ok(
        model.categories.into_values().collect(),
    )))
}

pub fn category_routes() -> Router<AppState> {
    Router::new().route("/api/categorias", get(list_categories))
}
