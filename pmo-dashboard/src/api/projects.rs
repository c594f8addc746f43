//! Project and sustainment endpoints
//!
//! Both collections share the same shape and filters.

use axum::{
    extract::{rejection::{PathRejection, QueryRejection}, Path, Query, State},
    routing::get,
    Json, Router,
};
use pmo_common::api::ApiResponse;
use pmo_common::Project;
use serde::Deserialize;
use std::collections::BTreeMap;

use super::{matches_filter, matches_search};
use crate::reports::{project_view, ProjectView};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for project listings
#[derive(Debug, Default, Deserialize)]
pub struct ProjectFilter {
    /// Only projects this analyst worked on
    pub analista: Option<String>,
    pub status: Option<String>,
    pub squad: Option<String>,
    /// Substring of name or owner
    pub busca: Option<String>,
}

impl ProjectFilter {
    fn accepts(&self, project: &Project) -> bool {
        let analyst_ok = match self.analista.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => project
                .analysts
                .iter()
                .any(|a| a.to_lowercase() == wanted.to_lowercase()),
        };

        analyst_ok
            && matches_filter(&self.status, &project.status)
            && matches_filter(&self.squad, &project.squad)
            && matches_search(
                &self.busca,
                &[project.name.as_str(), project.owner.as_str()],
            )
    }
}

fn list(
    items: &BTreeMap<String, Project>,
    filter: &ProjectFilter,
    state: &AppState,
) -> Vec<ProjectView> {
    let today = state.today();
    items
        .values()
        .filter(|p| filter.accepts(p))
        .map(|p| project_view(p, today))
        .collect()
}

/// GET /api/projetos
pub async fn list_projects(
    State(state): State<AppState>,
    query: Result<Query<ProjectFilter>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<ProjectView>>>> {
    let Query(filter) = query?;
    let model = state.model_or_empty().await?;
    Ok(Json(ApiResponse::ok(list(&model.projects, &filter, &state))))
}

/// GET /api/projetos/:nome
pub async fn get_project(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ApiResponse<ProjectView>>> {
    let Path(name) = path?;
    let model = state.model_or_empty().await?;
    let project = model
        .projects
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Project {}", name)))?;

    Ok(Json(ApiResponse::ok(project_view(project, state.today()))))
}

/// GET /api/sustentacoes
pub async fn list_sustainment(
    State(state): State<AppState>,
    query: Result<Query<ProjectFilter>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<ProjectView>>>> {
    let Query(filter) = query?;
    let model = state.model_or_empty().await?;
    Ok(Json(ApiResponse::ok(list(
        &model.sustainment,
        &filter,
        &state,
    ))))
}

/// GET /api/sustentacoes/:nome
pub async fn get_sustainment(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ApiResponse<ProjectView>>> {
    let Path(name) = path?;
    let model = state.model_or_empty().await?;
    let item = model
        .sustainment
        .get(&name)
        .ok_or_else(|| ApiError::NotFound(format!("Sustainment item {}", name)))?;

    Ok(Json(ApiResponse::ok(project_view(item, state.today()))))
}

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/api/projetos", get(list_projects))
        .route("/api/projetos/:nome", get(get_project))
        .route("/api/sustentacoes", get(list_sustainment))
        .route("/api/sustentacoes/:nome", get(get_sustainment))
}
