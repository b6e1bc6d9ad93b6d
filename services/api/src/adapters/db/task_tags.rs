//! services/api/src/adapters/db/task_tags.rs

use async_trait::async_trait;
use mastertask_core::domain::TaskTag;
use mastertask_core::ports::{PortError, PortResult, TaskTagStore};
use sqlx::FromRow;
use tracing::debug;

use super::{ensure_tag_exists, ensure_task_exists, unexpected, DbAdapter};

#[derive(FromRow)]
struct TaskTagRecord {
    task_id: i64,
    tag_id: i64,
}

impl TaskTagRecord {
    fn to_domain(self) -> TaskTag {
        TaskTag {
            task_id: self.task_id,
            tag_id: self.tag_id,
        }
    }
}

#[async_trait]
impl TaskTagStore for DbAdapter {
    async fn create_or_get_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<TaskTag> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        ensure_task_exists(&mut tx, task_id).await?;
        ensure_tag_exists(&mut tx, tag_id).await?;

        let result = sqlx::query(
            "INSERT INTO task_tags (task_id, tag_id) VALUES ($1, $2)
             ON CONFLICT (task_id, tag_id) DO NOTHING",
        )
        .bind(task_id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await
        .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            debug!("Task {} already carries tag {}", task_id, tag_id);
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(TaskTag { task_id, tag_id })
    }

    async fn list_task_tags(&self, task_id: Option<i64>) -> PortResult<Vec<TaskTag>> {
        let records = sqlx::query_as::<_, TaskTagRecord>(
            "SELECT task_id, tag_id FROM task_tags
             WHERE ($1::BIGINT IS NULL OR task_id = $1)
             ORDER BY task_id, tag_id",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(TaskTagRecord::to_domain).collect())
    }

    async fn get_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<TaskTag> {
        let record = sqlx::query_as::<_, TaskTagRecord>(
            "SELECT task_id, tag_id FROM task_tags WHERE task_id = $1 AND tag_id = $2",
        )
        .bind(task_id)
        .bind(tag_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::not_found("Task-Tag association"))?;
        Ok(record.to_domain())
    }

    async fn delete_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM task_tags WHERE task_id = $1 AND tag_id = $2")
            .bind(task_id)
            .bind(tag_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Task-Tag association"));
        }
        Ok(())
    }
}
