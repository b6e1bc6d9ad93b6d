//! services/api/src/web/rest.rs
//!
//! Shared REST pieces: the master OpenAPI definition, the common payloads
//! and the root endpoint.

use crate::web::state::AppState;
use crate::web::{analytics, auth, categories, notifications, tags, task_tags, tasks, users};
use axum::{routing::MethodRouter, Json, Router};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        root_handler,
        users::create_user_handler,
        users::list_users_handler,
        users::get_user_handler,
        users::update_user_handler,
        users::delete_user_handler,
        users::get_preferences_handler,
        users::update_preferences_handler,
        auth::login_handler,
        categories::create_category_handler,
        categories::list_categories_handler,
        categories::get_category_handler,
        categories::update_category_handler,
        categories::delete_category_handler,
        tags::create_tag_handler,
        tags::list_tags_handler,
        tags::get_tag_handler,
        tasks::create_task_handler,
        tasks::list_tasks_handler,
        tasks::get_task_handler,
        tasks::update_task_handler,
        tasks::delete_task_handler,
        task_tags::create_task_tag_handler,
        task_tags::list_task_tags_handler,
        task_tags::get_task_tag_handler,
        task_tags::delete_task_tag_handler,
        notifications::create_notification_handler,
        notifications::list_notifications_handler,
        notifications::get_notification_handler,
        notifications::update_notification_handler,
        notifications::delete_notification_handler,
        analytics::list_analytics_logs_handler,
        analytics::get_analytics_log_handler,
        analytics::analytics_stats_handler,
    ),
    components(
        schemas(
            MessageResponse,
            mastertask_core::domain::Priority,
            mastertask_core::domain::TaskStatus,
            mastertask_core::domain::NotificationType,
            mastertask_core::domain::AnalyticsAction,
        )
    ),
    tags(
        (name = "users", description = "User accounts and preferences."),
        (name = "auth", description = "Credential checks."),
        (name = "categories", description = "Per-user task categories."),
        (name = "tags", description = "Global, normalized tags."),
        (name = "tasks", description = "Tasks scoped to their owner."),
        (name = "task-tags", description = "Task and tag associations."),
        (name = "notifications", description = "Overdue and reminder notifications."),
        (name = "analytics", description = "Task activity log and statistics.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payloads
//=========================================================================================

/// The body of every successful delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// The acting user for task endpoints. There is no session layer, so the
/// owner is passed explicitly and falls back to the first user.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OwnerQuery {
    #[serde(default = "default_user_id")]
    pub user_id: i64,
}

fn default_user_id() -> i64 {
    1
}

/// Keeps "field absent" (`None`) apart from "field is null" (`Some(None)`)
/// in partial updates. Use together with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Routes a collection at both `/name` and `/name/`. Browser clients call
/// the list and create endpoints with a trailing slash.
pub(crate) fn collection_route(
    router: Router<Arc<AppState>>,
    path: &str,
    methods: MethodRouter<Arc<AppState>>,
) -> Router<Arc<AppState>> {
    router
        .route(path, methods.clone())
        .route(&format!("{path}/"), methods)
}

//=========================================================================================
// Root
//=========================================================================================

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = MessageResponse))
)]
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse::new("MasterTask API"))
}
