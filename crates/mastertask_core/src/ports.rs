//! crates/mastertask_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! There is one store per entity; the persistence adapter implements all of
//! them and every mutating call runs in a single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AnalyticsLog, AnalyticsStats, Category, CategoryPatch, JsonMap, NewCategory, NewNotification,
    NewTask, NewUser, Notification, NotificationFilter, Tag, TaskPatch, TaskTag, TaskWithTags,
    User, UserPatch,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the database driver.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    /// Deliberately carries no detail about which credential was wrong.
    #[error("Invalid email or password")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// `PortError::not_found("Task")` reads as "Task not found".
    pub fn not_found(entity: &str) -> Self {
        PortError::NotFound(format!("{entity} not found"))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Entity Stores (Traits)
//=========================================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Validation` when the email is already registered.
    async fn create_user(&self, new_user: NewUser) -> PortResult<User>;

    async fn list_users(&self) -> PortResult<Vec<User>>;

    async fn get_user(&self, user_id: i64) -> PortResult<User>;

    async fn update_user(&self, user_id: i64, patch: UserPatch) -> PortResult<User>;

    /// Tasks, categories, notifications and analytics rows go with the user.
    async fn delete_user(&self, user_id: i64) -> PortResult<()>;

    /// Checks the password and stamps `last_login`. Unknown email and wrong
    /// password both yield `Unauthorized`.
    async fn login(&self, email: &str, password: &str) -> PortResult<User>;

    async fn merge_preferences(&self, user_id: i64, preferences: JsonMap) -> PortResult<User>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn create_category(&self, new_category: NewCategory) -> PortResult<Category>;

    async fn list_categories(&self, user_id: Option<i64>) -> PortResult<Vec<Category>>;

    async fn get_category(&self, category_id: i64) -> PortResult<Category>;

    async fn update_category(&self, category_id: i64, patch: CategoryPatch)
        -> PortResult<Category>;

    /// Tasks in the category keep existing with `category_id = NULL`.
    async fn delete_category(&self, category_id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait TagStore: Send + Sync {
    /// Normalizes `name` and returns the existing tag if one already has it.
    async fn create_or_get_tag(&self, name: &str) -> PortResult<Tag>;

    async fn list_tags(&self) -> PortResult<Vec<Tag>>;

    async fn get_tag(&self, tag_id: i64) -> PortResult<Tag>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, user_id: i64, new_task: NewTask) -> PortResult<TaskWithTags>;

    async fn list_tasks(&self, user_id: i64) -> PortResult<Vec<TaskWithTags>>;

    async fn get_task(&self, user_id: i64, task_id: i64) -> PortResult<TaskWithTags>;

    async fn update_task(
        &self,
        user_id: i64,
        task_id: i64,
        patch: TaskPatch,
    ) -> PortResult<TaskWithTags>;

    async fn delete_task(&self, user_id: i64, task_id: i64) -> PortResult<()>;

    /// Marks open tasks whose deadline is before `now` as overdue and writes
    /// one overdue notification for each. Returns the notifications created.
    async fn sweep_overdue(&self, now: DateTime<Utc>) -> PortResult<Vec<Notification>>;
}

#[async_trait]
pub trait TaskTagStore: Send + Sync {
    /// Returns the existing association if the pair is already linked.
    async fn create_or_get_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<TaskTag>;

    async fn list_task_tags(&self, task_id: Option<i64>) -> PortResult<Vec<TaskTag>>;

    async fn get_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<TaskTag>;

    async fn delete_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create_notification(&self, new_notification: NewNotification)
        -> PortResult<Notification>;

    /// Newest first.
    async fn list_notifications(&self, filter: NotificationFilter)
        -> PortResult<Vec<Notification>>;

    async fn get_notification(&self, notification_id: i64) -> PortResult<Notification>;

    async fn set_notification_read(
        &self,
        notification_id: i64,
        is_read: bool,
    ) -> PortResult<Notification>;

    async fn delete_notification(&self, notification_id: i64) -> PortResult<()>;
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn list_analytics_logs(&self, user_id: Option<i64>) -> PortResult<Vec<AnalyticsLog>>;

    async fn get_analytics_log(&self, log_id: i64) -> PortResult<AnalyticsLog>;

    async fn analytics_stats(&self, user_id: i64) -> PortResult<AnalyticsStats>;
}

/// Everything the HTTP layer needs from persistence, as one trait object.
pub trait DatabaseService:
    UserStore + CategoryStore + TagStore + TaskStore + TaskTagStore + NotificationStore + AnalyticsStore
{
}

impl<T> DatabaseService for T where
    T: UserStore
        + CategoryStore
        + TagStore
        + TaskStore
        + TaskTagStore
        + NotificationStore
        + AnalyticsStore
{
}
