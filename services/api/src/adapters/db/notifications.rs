//! services/api/src/adapters/db/notifications.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mastertask_core::domain::{NewNotification, Notification, NotificationFilter};
use mastertask_core::ports::{NotificationStore, PortError, PortResult};
use sqlx::{FromRow, PgConnection};

use super::{ensure_task_exists, ensure_user_exists, parse_column, unexpected, DbAdapter};

#[derive(FromRow)]
struct NotificationRecord {
    notification_id: i64,
    task_id: i64,
    user_id: i64,
    #[sqlx(rename = "type")]
    notification_type: String,
    message: String,
    sent_at: DateTime<Utc>,
    is_read: bool,
}

impl NotificationRecord {
    fn to_domain(self) -> PortResult<Notification> {
        Ok(Notification {
            notification_id: self.notification_id,
            task_id: self.task_id,
            user_id: self.user_id,
            notification_type: parse_column(&self.notification_type)?,
            message: self.message,
            sent_at: self.sent_at,
            is_read: self.is_read,
        })
    }
}

/// Inserts a notification without existence checks; callers hold the references.
pub(super) async fn insert_notification(
    conn: &mut PgConnection,
    new_notification: NewNotification,
    sent_at: DateTime<Utc>,
) -> PortResult<Notification> {
    sqlx::query_as::<_, NotificationRecord>(
        "INSERT INTO notifications (task_id, user_id, type, message, sent_at)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING notification_id, task_id, user_id, type, message, sent_at, is_read",
    )
    .bind(new_notification.task_id)
    .bind(new_notification.user_id)
    .bind(new_notification.notification_type.as_str())
    .bind(&new_notification.message)
    .bind(sent_at)
    .fetch_one(conn)
    .await
    .map_err(unexpected)?
    .to_domain()
}

#[async_trait]
impl NotificationStore for DbAdapter {
    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> PortResult<Notification> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        ensure_task_exists(&mut tx, new_notification.task_id).await?;
        ensure_user_exists(&mut tx, new_notification.user_id).await?;
        let notification = insert_notification(&mut tx, new_notification, Utc::now()).await?;

        tx.commit().await.map_err(unexpected)?;
        Ok(notification)
    }

    async fn list_notifications(
        &self,
        filter: NotificationFilter,
    ) -> PortResult<Vec<Notification>> {
        sqlx::query_as::<_, NotificationRecord>(
            "SELECT notification_id, task_id, user_id, type, message, sent_at, is_read
             FROM notifications
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
               AND ($2::BOOLEAN IS NULL OR is_read = $2)
             ORDER BY sent_at DESC, notification_id DESC",
        )
        .bind(filter.user_id)
        .bind(filter.is_read)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?
        .into_iter()
        .map(NotificationRecord::to_domain)
        .collect()
    }

    async fn get_notification(&self, notification_id: i64) -> PortResult<Notification> {
        sqlx::query_as::<_, NotificationRecord>(
            "SELECT notification_id, task_id, user_id, type, message, sent_at, is_read
             FROM notifications WHERE notification_id = $1",
        )
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::not_found("Notification"))?
        .to_domain()
    }

    async fn set_notification_read(
        &self,
        notification_id: i64,
        is_read: bool,
    ) -> PortResult<Notification> {
        sqlx::query_as::<_, NotificationRecord>(
            "UPDATE notifications SET is_read = $1
             WHERE notification_id = $2
             RETURNING notification_id, task_id, user_id, type, message, sent_at, is_read",
        )
        .bind(is_read)
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::not_found("Notification"))?
        .to_domain()
    }

    async fn delete_notification(&self, notification_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE notification_id = $1")
            .bind(notification_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Notification"));
        }
        Ok(())
    }
}
