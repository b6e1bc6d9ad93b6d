//! services/api/src/adapters/db/analytics.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mastertask_core::domain::{AnalyticsAction, AnalyticsLog, AnalyticsStats, JsonMap};
use mastertask_core::ports::{AnalyticsStore, PortError, PortResult};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection};

use super::{parse_column, unexpected, DbAdapter};

#[derive(FromRow)]
struct AnalyticsLogRecord {
    log_id: i64,
    user_id: i64,
    task_id: i64,
    action: String,
    timestamp: DateTime<Utc>,
    details: Option<Json<JsonMap>>,
}

impl AnalyticsLogRecord {
    fn to_domain(self) -> PortResult<AnalyticsLog> {
        Ok(AnalyticsLog {
            log_id: self.log_id,
            user_id: self.user_id,
            task_id: self.task_id,
            action: parse_column(&self.action)?,
            timestamp: self.timestamp,
            details: self.details.map(|Json(map)| map),
        })
    }
}

/// Appends one analytics row. Called from inside the task transactions.
pub(super) async fn record_action(
    conn: &mut PgConnection,
    user_id: i64,
    task_id: i64,
    action: AnalyticsAction,
    details: JsonMap,
    at: DateTime<Utc>,
) -> PortResult<()> {
    sqlx::query(
        "INSERT INTO analytics_logs (user_id, task_id, action, timestamp, details)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(task_id)
    .bind(action.as_str())
    .bind(at)
    .bind(Json(details))
    .execute(conn)
    .await
    .map_err(unexpected)?;
    Ok(())
}

#[async_trait]
impl AnalyticsStore for DbAdapter {
    async fn list_analytics_logs(&self, user_id: Option<i64>) -> PortResult<Vec<AnalyticsLog>> {
        sqlx::query_as::<_, AnalyticsLogRecord>(
            "SELECT log_id, user_id, task_id, action, timestamp, details
             FROM analytics_logs
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
             ORDER BY log_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(AnalyticsLogRecord::to_domain)
        .collect()
    }

    async fn get_analytics_log(&self, log_id: i64) -> PortResult<AnalyticsLog> {
        sqlx::query_as::<_, AnalyticsLogRecord>(
            "SELECT log_id, user_id, task_id, action, timestamp, details
             FROM analytics_logs WHERE log_id = $1",
        )
        .bind(log_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::not_found("Analytics log"))?
        .to_domain()
    }

    async fn analytics_stats(&self, user_id: i64) -> PortResult<AnalyticsStats> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT action, COUNT(*) FROM analytics_logs WHERE user_id = $1 GROUP BY action",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let counts = rows
            .into_iter()
            .map(|(action, count)| -> PortResult<_> {
                Ok((parse_column::<AnalyticsAction>(&action)?, count))
            })
            .collect::<PortResult<Vec<_>>>()?;
        Ok(AnalyticsStats::from_counts(user_id, counts))
    }
}
