//! services/api/src/web/users.rs
//!
//! User account endpoints and the preferences sub-resource.

use crate::error::HttpResult;
use crate::web::rest::{collection_route, double_option, MessageResponse};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use mastertask_core::domain::{JsonMap, NewUser, User, UserPatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// Registration payload. The client sends the hex SHA-256 digest of the password.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password_hash: String,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<JsonMap>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            email: req.email,
            password_hash: req.password_hash,
            preferences: req.preferences,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<Option<JsonMap>>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        UserPatch {
            email: req.email,
            password_hash: req.password_hash,
            preferences: req.preferences,
        }
    }
}

/// A user as returned by the API. The password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<JsonMap>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            email: user.email,
            created_at: user.created_at,
            last_login: user.last_login,
            preferences: user.preferences,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PreferencesPayload {
    #[schema(value_type = Object)]
    pub preferences: JsonMap,
}

//=========================================================================================
// Routes & Handlers
//=========================================================================================

pub fn routes() -> Router<Arc<AppState>> {
    collection_route(
        Router::new(),
        "/users",
        get(list_users_handler).post(create_user_handler),
    )
    .route(
        "/users/{user_id}",
        get(get_user_handler)
            .put(update_user_handler)
            .delete(delete_user_handler),
    )
    .route(
        "/users/{user_id}/preferences",
        get(get_preferences_handler).put(update_preferences_handler),
    )
}

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User registered", body = UserResponse),
        (status = 400, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn create_user_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> HttpResult<Json<UserResponse>> {
    let user = app_state.db.create_user(req.into()).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "All users", body = [UserResponse])),
    tag = "users"
)]
pub async fn list_users_handler(
    State(app_state): State<Arc<AppState>>,
) -> HttpResult<Json<Vec<UserResponse>>> {
    let users = app_state.db.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> HttpResult<Json<UserResponse>> {
    let user = app_state.db.get_user(user_id).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Email already registered"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn update_user_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> HttpResult<Json<UserResponse>> {
    let user = app_state.db.update_user(user_id, req.into()).await?;
    Ok(Json(user.into()))
}

/// Delete a user together with everything they own.
#[utoipa::path(
    delete,
    path = "/users/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn delete_user_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> HttpResult<Json<MessageResponse>> {
    app_state.db.delete_user(user_id).await?;
    Ok(Json(MessageResponse::new("User deleted")))
}

/// Read a user's preferences. A user without preferences gets `{}`.
#[utoipa::path(
    get,
    path = "/users/{user_id}/preferences",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Stored preferences", body = PreferencesPayload),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_preferences_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> HttpResult<Json<PreferencesPayload>> {
    let user = app_state.db.get_user(user_id).await?;
    Ok(Json(PreferencesPayload {
        preferences: user.preferences.unwrap_or_default(),
    }))
}

/// Shallow-merge the given keys into the stored preferences and return the user.
#[utoipa::path(
    put,
    path = "/users/{user_id}/preferences",
    params(("user_id" = i64, Path, description = "User id")),
    request_body = PreferencesPayload,
    responses(
        (status = 200, description = "User with merged preferences", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn update_preferences_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Json(req): Json<PreferencesPayload>,
) -> HttpResult<Json<UserResponse>> {
    let user = app_state
        .db
        .merge_preferences(user_id, req.preferences)
        .await?;
    Ok(Json(user.into()))
}
