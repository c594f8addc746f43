//! Task listing with filters and pagination

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use pmo_common::api::ApiResponse;
use pmo_common::{DemandType, Task};
use serde::{Deserialize, Serialize};

use super::{matches_filter, matches_search, parse_flag};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::{ApiError, ApiResult, AppState};

/// Query parameters for task listing
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub projeto: Option<String>,
    /// Assignee or reporter
    pub analista: Option<String>,
    pub status: Option<String>,
    pub categoria: Option<String>,
    /// `projeto` or `sustentacao`
    pub tipo: Option<String>,
    pub atrasada: Option<String>,
    #[serde(rename = "mesAtual")]
    pub mes_atual: Option<String>,
    pub busca: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// One page of tasks
#[derive(Debug, Serialize)]
pub struct TaskPage {
    pub total: usize,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    #[serde(rename = "tarefas")]
    pub tasks: Vec<Task>,
}

/// GET /api/tarefas
pub async fn list_tasks(
    State(state): State<AppState>,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<TaskPage>>> {
    let Query(filter) = query?;
    let overdue = parse_flag("atrasada", &filter.atrasada)?;
    let current_month = parse_flag("mesAtual", &filter.mes_atual)?;
    let demand = match filter.tipo.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(DemandType::from_query(value).ok_or_else(|| {
            ApiError::BadRequest(format!("Invalid value for tipo: {}", value))
        })?),
    };

    let model = state.model_or_empty().await?;

    let matching: Vec<Task> = model
        .tasks
        .into_iter()
        .filter(|t| matches_filter(&filter.projeto, &t.project))
        .filter(|t| {
            matches_filter(&filter.analista, &t.assignee)
                || matches_filter(&filter.analista, &t.reporter)
        })
        .filter(|t| matches_filter(&filter.status, &t.status))
        .filter(|t| matches_filter(&filter.categoria, &t.category))
        .filter(|t| demand.map_or(true, |d| t.demand_type == d))
        .filter(|t| overdue.map_or(true, |o| t.overdue == o))
        .filter(|t| current_month.map_or(true, |m| t.current_month == m))
        .filter(|t| {
            matches_search(
                &filter.busca,
                &[t.key.as_str(), t.summary.as_str(), t.project.as_str()],
            )
        })
        .collect();

    let pagination = calculate_pagination(matching.len() as i64, filter.page);

    Ok(Json(ApiResponse::ok(TaskPage {
        total: matching.len(),
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        tasks: pagination.slice(&matching).to_vec(),
    })))
}

pub fn task_routes() -> Router<AppState> {
    Router::new().route("/api/tarefas", get(list_tasks))
}
