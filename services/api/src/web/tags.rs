//! services/api/src/web/tags.rs
//!
//! Tag endpoints. Creating a tag is create-or-get on the normalized name.

use crate::error::HttpResult;
use crate::web::rest::collection_route;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use mastertask_core::domain::{Tag, TagSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TagResponse {
    pub tag_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            tag_id: tag.tag_id,
            name: tag.name,
            created_at: tag.created_at,
        }
    }
}

/// The `{tag_id, name}` pair embedded in task responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct TagSummaryResponse {
    pub tag_id: i64,
    pub name: String,
}

impl From<TagSummary> for TagSummaryResponse {
    fn from(tag: TagSummary) -> Self {
        Self {
            tag_id: tag.tag_id,
            name: tag.name,
        }
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    collection_route(
        Router::new(),
        "/tags",
        get(list_tags_handler).post(create_tag_handler),
    )
    .route("/tags/{tag_id}", get(get_tag_handler))
}

/// Create a tag, or return the existing one with the same normalized name.
#[utoipa::path(
    post,
    path = "/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 200, description = "The new or existing tag", body = TagResponse),
        (status = 400, description = "Tag name is empty"),
        (status = 500, description = "Internal server error")
    ),
    tag = "tags"
)]
pub async fn create_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateTagRequest>,
) -> HttpResult<Json<TagResponse>> {
    let tag = app_state.db.create_or_get_tag(&req.name).await?;
    Ok(Json(tag.into()))
}

#[utoipa::path(
    get,
    path = "/tags",
    responses((status = 200, description = "All tags", body = [TagResponse])),
    tag = "tags"
)]
pub async fn list_tags_handler(
    State(app_state): State<Arc<AppState>>,
) -> HttpResult<Json<Vec<TagResponse>>> {
    let tags = app_state.db.list_tags().await?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/tags/{tag_id}",
    params(("tag_id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "The tag", body = TagResponse),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags"
)]
pub async fn get_tag_handler(
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<i64>,
) -> HttpResult<Json<TagResponse>> {
    let tag = app_state.db.get_tag(tag_id).await?;
    Ok(Json(tag.into()))
}
