//! services/api/src/web/analytics.rs
//!
//! Read-only analytics endpoints. Rows are written by the task store.

use crate::error::HttpResult;
use crate::web::rest::collection_route;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use mastertask_core::domain::{AnalyticsAction, AnalyticsLog, AnalyticsStats, JsonMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsLogResponse {
    pub log_id: i64,
    pub user_id: i64,
    pub task_id: i64,
    pub action: AnalyticsAction,
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Option<Object>)]
    pub details: Option<JsonMap>,
}

impl From<AnalyticsLog> for AnalyticsLogResponse {
    fn from(log: AnalyticsLog) -> Self {
        Self {
            log_id: log.log_id,
            user_id: log.user_id,
            task_id: log.task_id,
            action: log.action,
            timestamp: log.timestamp,
            details: log.details,
        }
    }
}

/// Per-action counts. Actions the user never performed are left out.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsStatsResponse {
    pub user_id: i64,
    pub total_actions: i64,
    pub by_action: BTreeMap<String, i64>,
}

impl From<AnalyticsStats> for AnalyticsStatsResponse {
    fn from(stats: AnalyticsStats) -> Self {
        Self {
            user_id: stats.user_id,
            total_actions: stats.total_actions,
            by_action: stats
                .by_action
                .into_iter()
                .map(|(action, count)| (action.as_str().to_string(), count))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQuery {
    pub user_id: Option<i64>,
}

pub fn routes() -> Router<Arc<AppState>> {
    collection_route(
        Router::new(),
        "/analytics-logs",
        get(list_analytics_logs_handler),
    )
    .route("/analytics-logs/{log_id}", get(get_analytics_log_handler))
    .route(
        "/analytics-logs/stats/{user_id}",
        get(analytics_stats_handler),
    )
}

#[utoipa::path(
    get,
    path = "/analytics-logs",
    params(AnalyticsQuery),
    responses((status = 200, description = "Analytics entries", body = [AnalyticsLogResponse])),
    tag = "analytics"
)]
pub async fn list_analytics_logs_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> HttpResult<Json<Vec<AnalyticsLogResponse>>> {
    let logs = app_state.db.list_analytics_logs(query.user_id).await?;
    Ok(Json(logs.into_iter().map(AnalyticsLogResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/analytics-logs/{log_id}",
    params(("log_id" = i64, Path, description = "Analytics entry id")),
    responses(
        (status = 200, description = "The entry", body = AnalyticsLogResponse),
        (status = 404, description = "Analytics log not found")
    ),
    tag = "analytics"
)]
pub async fn get_analytics_log_handler(
    State(app_state): State<Arc<AppState>>,
    Path(log_id): Path<i64>,
) -> HttpResult<Json<AnalyticsLogResponse>> {
    let log = app_state.db.get_analytics_log(log_id).await?;
    Ok(Json(log.into()))
}

#[utoipa::path(
    get,
    path = "/analytics-logs/stats/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses((status = 200, description = "Action counts", body = AnalyticsStatsResponse)),
    tag = "analytics"
)]
pub async fn analytics_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> HttpResult<Json<AnalyticsStatsResponse>> {
    let stats = app_state.db.analytics_stats(user_id).await?;
    Ok(Json(stats.into()))
}
