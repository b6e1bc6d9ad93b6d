//! services/api/src/web/auth.rs
//!
//! Credential check. There are no sessions or tokens: a successful login
//! only stamps `last_login` and returns the user.

use crate::error::HttpResult;
use crate::web::state::AppState;
use crate::web::users::UserResponse;
use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/login", post(login_handler))
}

/// POST /users/login - Check an email and plaintext password
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = UserResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> HttpResult<Json<UserResponse>> {
    let user = app_state.db.login(&req.email, &req.password).await?;
    info!("User {} logged in", user.user_id);
    Ok(Json(user.into()))
}
