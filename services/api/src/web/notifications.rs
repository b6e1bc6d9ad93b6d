//! services/api/src/web/notifications.rs
//!
//! Notification endpoints. Overdue notifications are produced by the
//! `overdue_sweep` binary; reminders are posted by clients.

use crate::error::HttpResult;
use crate::web::rest::{collection_route, MessageResponse};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use mastertask_core::domain::{NewNotification, Notification, NotificationFilter, NotificationType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNotificationRequest {
    pub task_id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
}

/// The read flag is the only mutable field of a notification.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNotificationRequest {
    pub is_read: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub notification_id: i64,
    pub task_id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            notification_id: notification.notification_id,
            task_id: notification.task_id,
            user_id: notification.user_id,
            notification_type: notification.notification_type,
            message: notification.message,
            sent_at: notification.sent_at,
            is_read: notification.is_read,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    pub user_id: Option<i64>,
    pub is_read: Option<bool>,
}

pub fn routes() -> Router<Arc<AppState>> {
    collection_route(
        Router::new(),
        "/notifications",
        get(list_notifications_handler).post(create_notification_handler),
    )
    .route(
        "/notifications/{notification_id}",
        get(get_notification_handler)
            .put(update_notification_handler)
            .delete(delete_notification_handler),
    )
}

#[utoipa::path(
    post,
    path = "/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 200, description = "Notification created", body = NotificationResponse),
        (status = 404, description = "Task or user not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "notifications"
)]
pub async fn create_notification_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateNotificationRequest>,
) -> HttpResult<Json<NotificationResponse>> {
    let notification = app_state
        .db
        .create_notification(NewNotification {
            task_id: req.task_id,
            user_id: req.user_id,
            notification_type: req.notification_type,
            message: req.message,
        })
        .await?;
    Ok(Json(notification.into()))
}

/// List notifications, newest first.
#[utoipa::path(
    get,
    path = "/notifications",
    params(NotificationQuery),
    responses((status = 200, description = "Notifications", body = [NotificationResponse])),
    tag = "notifications"
)]
pub async fn list_notifications_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<NotificationQuery>,
) -> HttpResult<Json<Vec<NotificationResponse>>> {
    let filter = NotificationFilter {
        user_id: query.user_id,
        is_read: query.is_read,
    };
    let notifications = app_state.db.list_notifications(filter).await?;
    Ok(Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/notifications/{notification_id}",
    params(("notification_id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "The notification", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications"
)]
pub async fn get_notification_handler(
    State(app_state): State<Arc<AppState>>,
    Path(notification_id): Path<i64>,
) -> HttpResult<Json<NotificationResponse>> {
    let notification = app_state.db.get_notification(notification_id).await?;
    Ok(Json(notification.into()))
}

#[utoipa::path(
    put,
    path = "/notifications/{notification_id}",
    params(("notification_id" = i64, Path, description = "Notification id")),
    request_body = UpdateNotificationRequest,
    responses(
        (status = 200, description = "Read flag updated", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications"
)]
pub async fn update_notification_handler(
    State(app_state): State<Arc<AppState>>,
    Path(notification_id): Path<i64>,
    Json(req): Json<UpdateNotificationRequest>,
) -> HttpResult<Json<NotificationResponse>> {
    let notification = app_state
        .db
        .set_notification_read(notification_id, req.is_read)
        .await?;
    Ok(Json(notification.into()))
}

#[utoipa::path(
    delete,
    path = "/notifications/{notification_id}",
    params(("notification_id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted", body = MessageResponse),
        (status = 404, description = "Notification not found")
    ),
    tag = "notifications"
)]
pub async fn delete_notification_handler(
    State(app_state): State<Arc<AppState>>,
    Path(notification_id): Path<i64>,
) -> HttpResult<Json<MessageResponse>> {
    app_state.db.delete_notification(notification_id).await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}
