//! Project comment endpoints

use axum::{
    extract::{rejection::{JsonRejection, PathRejection}, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pmo_common::api::ApiResponse;
use serde::Deserialize;

use crate::comments::Comment;
use crate::{ApiResult, AppState};

/// POST body for a new comment
#[derive(Debug, Deserialize)]
pub struct NewComment {
    #[serde(default)]
    pub autor: String,
    pub texto: String,
}

/// GET /api/comentarios/:projeto
pub async fn list_comments(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<ApiResponse<Vec<Comment>>>> {
    let Path(project) = path?;
    let comments = state.comments.list(&project).await?;
    Ok(Json(ApiResponse::ok(comments)))
}

/// POST /api/comentarios/:projeto
///
/// Comments may target names not present in the current model; they
/// outlive re-ingestion.
pub async fn add_comment(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    json: Result<Json<NewComment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Comment>>)> {
    let Path(project) = path?;
    let Json(body) = json?;
    let comment = state
        .comments
        .append(&project, &body.autor, &body.texto)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(comment, "Comment added")),
    ))
}

pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/api/comentarios/:projeto",
        get(list_comments).post(add_comment),
    )
}
