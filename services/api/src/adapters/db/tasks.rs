//! services/api/src/adapters/db/tasks.rs
//!
//! Task persistence. Creating and updating a task also appends its analytics
//! entry inside the same transaction; reads attach tag summaries by joining
//! through `task_tags`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mastertask_core::domain::{
    AnalyticsAction, NewNotification, NewTask, Notification, NotificationType, Priority,
    TagSummary, Task, TaskPatch, TaskWithTags, INITIAL_TASK_STATUS,
};
use mastertask_core::ports::{PortError, PortResult, TaskStore};
use sqlx::{FromRow, PgConnection};
use std::collections::HashMap;
use tracing::info;

use super::analytics::record_action;
use super::notifications::insert_notification;
use super::{ensure_category_exists, ensure_user_exists, parse_column, unexpected, DbAdapter};

const TASK_COLUMNS: &str = "task_id, user_id, title, description, category_id, priority, \
    deadline, is_repeating, repeat_interval, status, is_favorite, created_at, updated_at, \
    completed_at";

#[derive(FromRow)]
struct TaskRecord {
    task_id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    category_id: Option<i64>,
    priority: Option<String>,
    deadline: Option<DateTime<Utc>>,
    is_repeating: bool,
    repeat_interval: Option<String>,
    status: String,
    is_favorite: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    fn to_domain(self) -> PortResult<Task> {
        let priority = match self.priority.as_deref() {
            Some(raw) => Some(parse_column::<Priority>(raw)?),
            None => None,
        };
        Ok(Task {
            task_id: self.task_id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            category_id: self.category_id,
            priority,
            deadline: self.deadline,
            is_repeating: self.is_repeating,
            repeat_interval: self.repeat_interval,
            status: parse_column(&self.status)?,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

#[derive(FromRow)]
struct TaskTagRow {
    task_id: i64,
    tag_id: i64,
    name: String,
}

/// Loads the tag summaries for a batch of tasks in one query.
async fn load_tags(
    conn: &mut PgConnection,
    task_ids: &[i64],
) -> PortResult<HashMap<i64, Vec<TagSummary>>> {
    let rows = sqlx::query_as::<_, TaskTagRow>(
        "SELECT tt.task_id, t.tag_id, t.name
         FROM task_tags tt
         JOIN tags t ON t.tag_id = tt.tag_id
         WHERE tt.task_id = ANY($1)
         ORDER BY t.name",
    )
    .bind(task_ids)
    .fetch_all(conn)
    .await
    .map_err(unexpected)?;

    let mut by_task: HashMap<i64, Vec<TagSummary>> = HashMap::new();
    for row in rows {
        by_task.entry(row.task_id).or_default().push(TagSummary {
            tag_id: row.tag_id,
            name: row.name,
        });
    }
    Ok(by_task)
}

async fn with_tags(conn: &mut PgConnection, tasks: Vec<Task>) -> PortResult<Vec<TaskWithTags>> {
    let ids: Vec<i64> = tasks.iter().map(|task| task.task_id).collect();
    let mut tags = load_tags(conn, &ids).await?;
    Ok(tasks
        .into_iter()
        .map(|task| TaskWithTags {
            tags: tags.remove(&task.task_id).unwrap_or_default(),
            task,
        })
        .collect())
}

async fn fetch_owned_task(conn: &mut PgConnection, user_id: i64, task_id: i64) -> PortResult<Task> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE task_id = $1 AND user_id = $2");
    sqlx::query_as::<_, TaskRecord>(&sql)
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::not_found("Task"))?
        .to_domain()
}

#[async_trait]
impl TaskStore for DbAdapter {
    async fn create_task(&self, user_id: i64, new_task: NewTask) -> PortResult<TaskWithTags> {
        new_task.validate()?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        ensure_user_exists(&mut tx, user_id).await?;
        if let Some(category_id) = new_task.category_id {
            ensure_category_exists(&mut tx, category_id).await?;
        }

        let sql = format!(
            "INSERT INTO tasks (user_id, title, description, category_id, priority, deadline,
                                is_repeating, repeat_interval, status, is_favorite,
                                created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(user_id)
            .bind(&new_task.title)
            .bind(&new_task.description)
            .bind(new_task.category_id)
            .bind(new_task.priority.map(|p| p.as_str()))
            .bind(new_task.deadline)
            .bind(new_task.is_repeating)
            .bind(&new_task.repeat_interval)
            .bind(INITIAL_TASK_STATUS.as_str())
            .bind(new_task.is_favorite)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?
            .to_domain()?;

        record_action(
            &mut tx,
            user_id,
            task.task_id,
            AnalyticsAction::Created,
            new_task.analytics_details(),
            now,
        )
        .await?;

        tx.commit().await.map_err(unexpected)?;
        info!("Created task {} for user {}", task.task_id, user_id);
        Ok(TaskWithTags {
            task,
            tags: Vec::new(),
        })
    }

    async fn list_tasks(&self, user_id: i64) -> PortResult<Vec<TaskWithTags>> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY task_id");
        let tasks = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(unexpected)?
            .into_iter()
            .map(TaskRecord::to_domain)
            .collect::<PortResult<Vec<_>>>()?;
        let tasks = with_tags(&mut tx, tasks).await?;

        tx.commit().await.map_err(unexpected)?;
        Ok(tasks)
    }

    async fn get_task(&self, user_id: i64, task_id: i64) -> PortResult<TaskWithTags> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let task = fetch_owned_task(&mut tx, user_id, task_id).await?;
        let mut tasks = with_tags(&mut tx, vec![task]).await?;

        tx.commit().await.map_err(unexpected)?;
        tasks.pop().ok_or_else(|| PortError::not_found("Task"))
    }

    async fn update_task(
        &self,
        user_id: i64,
        task_id: i64,
        patch: TaskPatch,
    ) -> PortResult<TaskWithTags> {
        patch.validate()?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let mut task = fetch_owned_task(&mut tx, user_id, task_id).await?;
        if let Some(category_id) = patch.referenced_category() {
            ensure_category_exists(&mut tx, category_id).await?;
        }
        let change = patch.apply(&mut task, now);

        let sql = format!(
            "UPDATE tasks
             SET title = $1, description = $2, category_id = $3, priority = $4, deadline = $5,
                 is_repeating = $6, repeat_interval = $7, status = $8, is_favorite = $9,
                 updated_at = $10, completed_at = $11
             WHERE task_id = $12 AND user_id = $13
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.category_id)
            .bind(task.priority.map(|p| p.as_str()))
            .bind(task.deadline)
            .bind(task.is_repeating)
            .bind(&task.repeat_interval)
            .bind(task.status.as_str())
            .bind(task.is_favorite)
            .bind(task.updated_at)
            .bind(task.completed_at)
            .bind(task_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?
            .to_domain()?;

        record_action(
            &mut tx,
            user_id,
            task_id,
            change.action(),
            change.analytics_details(),
            now,
        )
        .await?;

        let mut tasks = with_tags(&mut tx, vec![task]).await?;
        tx.commit().await.map_err(unexpected)?;
        tasks.pop().ok_or_else(|| PortError::not_found("Task"))
    }

    async fn delete_task(&self, user_id: i64, task_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE task_id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Task"));
        }
        Ok(())
    }

    async fn sweep_overdue(&self, now: DateTime<Utc>) -> PortResult<Vec<Notification>> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let sql = format!(
            "UPDATE tasks SET status = 'overdue', updated_at = $1
             WHERE status IN ('active', 'in_progress') AND deadline < $1
             RETURNING {TASK_COLUMNS}"
        );
        let overdue = sqlx::query_as::<_, TaskRecord>(&sql)
            .bind(now)
            .fetch_all(&mut *tx)
            .await
            .map_err(unexpected)?;

        let mut notifications = Vec::with_capacity(overdue.len());
        for record in overdue {
            let task = record.to_domain()?;
            let notification = insert_notification(
                &mut tx,
                NewNotification {
                    task_id: task.task_id,
                    user_id: task.user_id,
                    notification_type: NotificationType::Overdue,
                    message: task.overdue_message(),
                },
                now,
            )
            .await?;
            notifications.push(notification);
        }

        tx.commit().await.map_err(unexpected)?;
        info!("Marked {} task(s) overdue", notifications.len());
        Ok(notifications)
    }
}
