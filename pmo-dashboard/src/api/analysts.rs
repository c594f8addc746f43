//! Analyst capacity endpoints

use axum::{
    extract::{rejection::{PathRejection, QueryRejection}, Path, Query, State},
    routing::get,
    Json, Router,
};
use pmo_common::api::ApiResponse;
use serde::Deserialize;

use super::{matches_filter, matches_search, parse_flag};
use crate::reports::{analyst_view, AnalystView};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct AnalystFilter {
    pub categoria: Option<String>,
    pub squad: Option<String>,
    /// Role name, matched against any of the analyst's roles
    pub funcao: Option<String>,
    /// `true` keeps analysts free today, `false` keeps busy ones
    pub disponivel: Option<String>,
    pub busca: Option<String>,
}

/// GET /api/analistas
pub async fn list_analysts(
    State(state): State<AppState>,
    query: Result<Query<AnalystFilter>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<AnalystView>>>> {
    let Query(filter) = query?;
    let available = parse_flag("disponivel", &filter.disponivel)?;
    let model = state.model_or_empty().await?;
    let today = state.today();

    let analysts = model
        .analysts
        .values()
        .filter(|a| matches_filter(&filter.categoria, &a.category))
        .filter(|a| matches_filter(&filter.squad, &a.squad))
        .filter(|a| match filter.funcao.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(role) => a.roles.iter().any(|r| r.to_lowercase() == role.to_lowercase()),
        })
        .filter(|a| {
            let mut fields = vec![a.name.as_str()];
            fields.extend(a.stacks.iter().map(String::as_str));
            matches_search(&filter.busca, &fields)
        })
        .map(|a| analyst_view(a, today))
        .filter(|view| available.map_or(true, |wanted| view.available == wanted))
        .collect();

    Ok(Json(ApiResponse::ok(analysts)))
}

/// GET /api/analistas/:nome (case-insensitive)
pub async fn get_analyst(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ApiResponse<AnalystView>>> {
    let Path(name) = path?;
    let model = state.model_or_empty().await?;
    let analyst = model
        .find_analyst(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Analyst {}", name)))?;

    Ok(Json(ApiResponse::ok(analyst_view(analyst, state.today()))))
}

pub fn analyst_routes() -> Router<AppState> {
    Router::new()
        .route("/api/analistas", get(list_analysts))
        .route("/api/analistas/:nome", get(get_analyst))
}
