//! services/api/src/web/task_tags.rs
//!
//! Task-tag association endpoints.

use crate::error::HttpResult;
use crate::web::rest::{collection_route, MessageResponse};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use mastertask_core::domain::TaskTag;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskTagRequest {
    pub task_id: i64,
    pub tag_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TaskTagResponse {
    pub task_id: i64,
    pub tag_id: i64,
}

impl From<TaskTag> for TaskTagResponse {
    fn from(link: TaskTag) -> Self {
        Self {
            task_id: link.task_id,
            tag_id: link.tag_id,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskTagQuery {
    /// Only associations of this task.
    pub task_id: Option<i64>,
}

pub fn routes() -> Router<Arc<AppState>> {
    collection_route(
        Router::new(),
        "/task-tags",
        get(list_task_tags_handler).post(create_task_tag_handler),
    )
    .route(
        "/task-tags/{task_id}/{tag_id}",
        get(get_task_tag_handler).delete(delete_task_tag_handler),
    )
}

/// Attach a tag to a task. Attaching an already attached tag is a no-op.
#[utoipa::path(
    post,
    path = "/task-tags",
    request_body = CreateTaskTagRequest,
    responses(
        (status = 200, description = "The association", body = TaskTagResponse),
        (status = 404, description = "Task or tag not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "task-tags"
)]
pub async fn create_task_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateTaskTagRequest>,
) -> HttpResult<Json<TaskTagResponse>> {
    let link = app_state
        .db
        .create_or_get_task_tag(req.task_id, req.tag_id)
        .await?;
    Ok(Json(link.into()))
}

#[utoipa::path(
    get,
    path = "/task-tags",
    params(TaskTagQuery),
    responses((status = 200, description = "Associations", body = [TaskTagResponse])),
    tag = "task-tags"
)]
pub async fn list_task_tags_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<TaskTagQuery>,
) -> HttpResult<Json<Vec<TaskTagResponse>>> {
    let links = app_state.db.list_task_tags(query.task_id).await?;
    Ok(Json(links.into_iter().map(TaskTagResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/task-tags/{task_id}/{tag_id}",
    params(
        ("task_id" = i64, Path, description = "Task id"),
        ("tag_id" = i64, Path, description = "Tag id")
    ),
    responses(
        (status = 200, description = "The association", body = TaskTagResponse),
        (status = 404, description = "Association not found")
    ),
    tag = "task-tags"
)]
pub async fn get_task_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Path((task_id, tag_id)): Path<(i64, i64)>,
) -> HttpResult<Json<TaskTagResponse>> {
    let link = app_state.db.get_task_tag(task_id, tag_id).await?;
    Ok(Json(link.into()))
}

#[utoipa::path(
    delete,
    path = "/task-tags/{task_id}/{tag_id}",
    params(
        ("task_id" = i64, Path, description = "Task id"),
        ("tag_id" = i64, Path, description = "Tag id")
    ),
    responses(
        (status = 200, description = "Association removed", body = MessageResponse),
        (status = 404, description = "Association not found")
    ),
    tag = "task-tags"
)]
pub async fn delete_task_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Path((task_id, tag_id)): Path<(i64, i64)>,
) -> HttpResult<Json<MessageResponse>> {
    app_state.db.delete_task_tag(task_id, tag_id).await?;
    Ok(Json(MessageResponse::new("Task-Tag association deleted")))
}
