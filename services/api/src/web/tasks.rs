//! services/api/src/web/tasks.rs
//!
//! Task endpoints. Every route is scoped by the `user_id` query parameter,
//! which defaults to user 1.

use crate::error::HttpResult;
use crate::web::rest::{collection_route, double_option, MessageResponse, OwnerQuery};
use crate::web::state::AppState;
use crate::web::tags::TagSummaryResponse;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use mastertask_core::domain::{NewTask, Priority, TaskPatch, TaskStatus, TaskWithTags};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_repeating: bool,
    pub repeat_interval: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(req: CreateTaskRequest) -> Self {
        NewTask {
            title: req.title,
            description: req.description,
            category_id: req.category_id,
            priority: req.priority,
            deadline: req.deadline,
            is_repeating: req.is_repeating,
            repeat_interval: req.repeat_interval,
            is_favorite: req.is_favorite,
        }
    }
}

/// Only the fields present in the body are applied. `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i64>)]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Priority>)]
    pub priority: Option<Option<Priority>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub is_repeating: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub repeat_interval: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub is_favorite: Option<bool>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        TaskPatch {
            title: req.title,
            description: req.description,
            category_id: req.category_id,
            priority: req.priority,
            deadline: req.deadline,
            is_repeating: req.is_repeating,
            repeat_interval: req.repeat_interval,
            status: req.status,
            is_favorite: req.is_favorite,
        }
    }
}

/// A task as returned by the API, with its tags inlined.
#[derive(Debug, Serialize, ToSchema)]
pub struct TaskResponse {
    pub task_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_repeating: bool,
    pub repeat_interval: Option<String>,
    pub status: TaskStatus,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub tags: Vec<TagSummaryResponse>,
}

impl From<TaskWithTags> for TaskResponse {
    fn from(TaskWithTags { task, tags }: TaskWithTags) -> Self {
        Self {
            task_id: task.task_id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            category_id: task.category_id,
            priority: task.priority,
            deadline: task.deadline,
            is_repeating: task.is_repeating,
            repeat_interval: task.repeat_interval,
            status: task.status,
            is_favorite: task.is_favorite,
            created_at: task.created_at,
            updated_at: task.updated_at,
            completed_at: task.completed_at,
            tags: tags.into_iter().map(TagSummaryResponse::from).collect(),
        }
    }
}

//=========================================================================================
// Routes and Handlers
//=========================================================================================

pub fn routes() -> Router<Arc<AppState>> {
    collection_route(
        Router::new(),
        "/tasks",
        get(list_tasks_handler).post(create_task_handler),
    )
    .route(
        "/tasks/{task_id}",
        get(get_task_handler)
            .put(update_task_handler)
            .delete(delete_task_handler),
    )
}

/// Create a task for a user. The status always starts as `active`.
#[utoipa::path(
    post,
    path = "/tasks",
    params(OwnerQuery),
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskResponse),
        (status = 400, description = "Blank title"),
        (status = 404, description = "User or category not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "tasks"
)]
pub async fn create_task_handler(
    State(app_state): State<Arc<AppState>>,
    Query(owner): Query<OwnerQuery>,
    Json(req): Json<CreateTaskRequest>,
) -> HttpResult<Json<TaskResponse>> {
    let task = app_state.db.create_task(owner.user_id, req.into()).await?;
    Ok(Json(task.into()))
}

/// List the tasks owned by a user.
#[utoipa::path(
    get,
    path = "/tasks",
    params(OwnerQuery),
    responses((status = 200, description = "Tasks owned by the user", body = [TaskResponse])),
    tag = "tasks"
)]
pub async fn list_tasks_handler(
    State(app_state): State<Arc<AppState>>,
    Query(owner): Query<OwnerQuery>,
) -> HttpResult<Json<Vec<TaskResponse>>> {
    let tasks = app_state.db.list_tasks(owner.user_id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/tasks/{task_id}",
    params(("task_id" = i64, Path, description = "Task id"), OwnerQuery),
    responses(
        (status = 200, description = "The task", body = TaskResponse),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn get_task_handler(
    State(app_state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Query(owner): Query<OwnerQuery>,
) -> HttpResult<Json<TaskResponse>> {
    let task = app_state.db.get_task(owner.user_id, task_id).await?;
    Ok(Json(task.into()))
}

/// Partially update a task.
///
/// Moving into `completed` stamps `completed_at`; moving out clears it.
#[utoipa::path(
    put,
    path = "/tasks/{task_id}",
    params(("task_id" = i64, Path, description = "Task id"), OwnerQuery),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 404, description = "Task or category not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "tasks"
)]
pub async fn update_task_handler(
    State(app_state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Query(owner): Query<OwnerQuery>,
    Json(req): Json<UpdateTaskRequest>,
) -> HttpResult<Json<TaskResponse>> {
    let task = app_state
        .db
        .update_task(owner.user_id, task_id, req.into())
        .await?;
    Ok(Json(task.into()))
}

#[utoipa::path(
    delete,
    path = "/tasks/{task_id}",
    params(("task_id" = i64, Path, description = "Task id"), OwnerQuery),
    responses(
        (status = 200, description = "Task deleted", body = MessageResponse),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks"
)]
pub async fn delete_task_handler(
    State(app_state): State<Arc<AppState>>,
    Path(task_id): Path<i64>,
    Query(owner): Query<OwnerQuery>,
) -> HttpResult<Json<MessageResponse>> {
    app_state.db.delete_task(owner.user_id, task_id).await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}
