//! services/api/src/web/categories.rs
//!
//! Category endpoints. Names are unique per owning user.

use crate::error::HttpResult;
use crate::web::rest::{collection_route, double_option, MessageResponse};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use mastertask_core::domain::{Category, CategoryPatch, NewCategory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub user_id: i64,
    pub name: String,
    pub color: Option<String>,
}

impl From<CreateCategoryRequest> for NewCategory {
    fn from(req: CreateCategoryRequest) -> Self {
        NewCategory {
            user_id: req.user_id,
            name: req.name,
            color: req.color,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub color: Option<Option<String>>,
}

impl From<UpdateCategoryRequest> for CategoryPatch {
    fn from(req: UpdateCategoryRequest) -> Self {
        CategoryPatch {
            name: req.name,
            color: req.color,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub category_id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            category_id: category.category_id,
            user_id: category.user_id,
            name: category.name,
            color: category.color,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    /// Only categories owned by this user.
    pub user_id: Option<i64>,
}

pub fn routes() -> Router<Arc<AppState>> {
    collection_route(
        Router::new(),
        "/categories",
        get(list_categories_handler).post(create_category_handler),
    )
    .route(
        "/categories/{category_id}",
        get(get_category_handler)
            .put(update_category_handler)
            .delete(delete_category_handler),
    )
}

#[utoipa::path(
    post,
    path = "/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 200, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Duplicate or empty name"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "categories"
)]
pub async fn create_category_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> HttpResult<Json<CategoryResponse>> {
    let category = app_state.db.create_category(req.into()).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    get,
    path = "/categories",
    params(CategoryQuery),
    responses((status = 200, description = "Categories", body = [CategoryResponse])),
    tag = "categories"
)]
pub async fn list_categories_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> HttpResult<Json<Vec<CategoryResponse>>> {
    let categories = app_state.db.list_categories(query.user_id).await?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/categories/{category_id}",
    params(("category_id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "The category", body = CategoryResponse),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category_handler(
    State(app_state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> HttpResult<Json<CategoryResponse>> {
    let category = app_state.db.get_category(category_id).await?;
    Ok(Json(category.into()))
}

#[utoipa::path(
    put,
    path = "/categories/{category_id}",
    params(("category_id" = i64, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Duplicate or empty name"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn update_category_handler(
    State(app_state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
    Json(req): Json<UpdateCategoryRequest>,
) -> HttpResult<Json<CategoryResponse>> {
    let category = app_state
        .db
        .update_category(category_id, req.into())
        .await?;
    Ok(Json(category.into()))
}

/// Delete a category. Its tasks stay, with no category.
#[utoipa::path(
    delete,
    path = "/categories/{category_id}",
    params(("category_id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn delete_category_handler(
    State(app_state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> HttpResult<Json<MessageResponse>> {
    app_state.db.delete_category(category_id).await?;
    Ok(Json(MessageResponse::new("Category deleted")))
}
