//! In-memory stand-in for the Postgres adapter, plus request helpers.
//!
//! The fake applies the same domain rules as the real adapter and emulates
//! the schema's cascades, so handler behavior can be tested without a database.

#![allow(dead_code)]

use api_lib::config::{Config, CorsOrigins};
use api_lib::web::{router, state::AppState};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use mastertask_core::domain::{
    self, normalize_tag_name, AnalyticsAction, AnalyticsLog, AnalyticsStats, Category,
    CategoryPatch, JsonMap, NewCategory, NewNotification, NewTask, NewUser, Notification,
    NotificationFilter, NotificationType, Tag, TagSummary, Task, TaskPatch, TaskTag,
    TaskWithTags, User, UserPatch, INITIAL_TASK_STATUS,
};
use mastertask_core::ports::{
    AnalyticsStore, CategoryStore, NotificationStore, PortError, PortResult, TagStore,
    TaskStore, TaskTagStore, UserStore,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceExt;

/// sha256("password")
pub const PASSWORD_HASH: &str =
    "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

//=========================================================================================
// In-Memory Store
//=========================================================================================

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    categories: BTreeMap<i64, Category>,
    tags: BTreeMap<i64, Tag>,
    tasks: BTreeMap<i64, Task>,
    task_tags: BTreeSet<(i64, i64)>,
    notifications: BTreeMap<i64, Notification>,
    analytics: BTreeMap<i64, AnalyticsLog>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn user(&self, user_id: i64) -> PortResult<&User> {
        self.users
            .get(&user_id)
            .ok_or_else(|| PortError::not_found("User"))
    }

    fn ensure_category(&self, category_id: i64) -> PortResult<()> {
        if self.categories.contains_key(&category_id) {
            Ok(())
        } else {
            Err(PortError::not_found("Category"))
        }
    }

    fn owned_task(&self, user_id: i64, task_id: i64) -> PortResult<&Task> {
        self.tasks
            .get(&task_id)
            .filter(|task| task.user_id == user_id)
            .ok_or_else(|| PortError::not_found("Task"))
    }

    fn email_in_use(&self, email: &str) -> bool {
        self.users.values().any(|user| user.email == email)
    }

    fn category_name_in_use(&self, user_id: i64, name: &str) -> bool {
        self.categories
            .values()
            .any(|category| category.user_id == user_id && category.name == name)
    }

    fn with_tags(&self, task: Task) -> TaskWithTags {
        let mut tags: Vec<TagSummary> = self
            .task_tags
            .iter()
            .filter(|(task_id, _)| *task_id == task.task_id)
            .filter_map(|(_, tag_id)| self.tags.get(tag_id))
            .map(|tag| TagSummary {
                tag_id: tag.tag_id,
                name: tag.name.clone(),
            })
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        TaskWithTags { task, tags }
    }

    fn record_action(
        &mut self,
        user_id: i64,
        task_id: i64,
        action: AnalyticsAction,
        details: JsonMap,
        at: DateTime<Utc>,
    ) {
        let log_id = self.next_id();
        self.analytics.insert(
            log_id,
            AnalyticsLog {
                log_id,
                user_id,
                task_id,
                action,
                timestamp: at,
                details: Some(details),
            },
        );
    }

    fn insert_notification(&mut self, new: NewNotification, sent_at: DateTime<Utc>) -> Notification {
        let notification = Notification {
            notification_id: self.next_id(),
            task_id: new.task_id,
            user_id: new.user_id,
            notification_type: new.notification_type,
            message: new.message,
            sent_at,
            is_read: false,
        };
        self.notifications
            .insert(notification.notification_id, notification.clone());
        notification
    }

    fn remove_task_rows(&mut self, task_id: i64) {
        self.tasks.remove(&task_id);
        self.task_tags.retain(|(id, _)| *id != task_id);
        self.notifications.retain(|_, n| n.task_id != task_id);
        self.analytics.retain(|_, log| log.task_id != task_id);
    }
}

#[derive(Default, Clone)]
pub struct InMemoryDb {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDb {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("in-memory store poisoned")
    }
}

#[async_trait]
impl UserStore for InMemoryDb {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tables = self.lock();
        if tables.email_in_use(&new_user.email) {
            return Err(PortError::Validation("Email already registered".to_string()));
        }
        let user = User {
            user_id: tables.next_id(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
            last_login: None,
            preferences: new_user.preferences,
        };
        tables.users.insert(user.user_id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        Ok(self.lock().users.values().cloned().collect())
    }

    async fn get_user(&self, user_id: i64) -> PortResult<User> {
        self.lock().user(user_id).cloned()
    }

    async fn update_user(&self, user_id: i64, patch: UserPatch) -> PortResult<User> {
        let mut tables = self.lock();
        let mut user = tables.user(user_id)?.clone();
        if let Some(email) = patch.email_change(&user) {
            if tables.email_in_use(email) {
                return Err(PortError::Validation("Email already registered".to_string()));
            }
        }
        patch.apply(&mut user);
        tables.users.insert(user_id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> PortResult<()> {
        let mut tables = self.lock();
        tables.user(user_id)?;
        tables.users.remove(&user_id);
        tables.categories.retain(|_, c| c.user_id != user_id);
        let owned: Vec<i64> = tables
            .tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .map(|task| task.task_id)
            .collect();
        for task_id in owned {
            tables.remove_task_rows(task_id);
        }
        tables.notifications.retain(|_, n| n.user_id != user_id);
        tables.analytics.retain(|_, log| log.user_id != user_id);
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> PortResult<User> {
        let mut tables = self.lock();
        let user = tables
            .users
            .values_mut()
            .find(|user| user.email == email)
            .ok_or(PortError::Unauthorized)?;
        if !domain::verify_password(password, &user.password_hash) {
            return Err(PortError::Unauthorized);
        }
        user.last_login = Some(Utc::now());
        Ok(user.clone())
    }

    async fn merge_preferences(&self, user_id: i64, preferences: JsonMap) -> PortResult<User> {
        let mut tables = self.lock();
        let mut user = tables.user(user_id)?.clone();
        user.preferences = Some(domain::merge_preferences(
            user.preferences.take(),
            preferences,
        ));
        tables.users.insert(user_id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl CategoryStore for InMemoryDb {
    async fn create_category(&self, new_category: NewCategory) -> PortResult<Category> {
        new_category.validate()?;
        let mut tables = self.lock();
        tables.user(new_category.user_id)?;
        if tables.category_name_in_use(new_category.user_id, &new_category.name) {
            return Err(PortError::Validation(
                "Category with this name already exists".to_string(),
            ));
        }
        let category = Category {
            category_id: tables.next_id(),
            user_id: new_category.user_id,
            name: new_category.name,
            color: new_category.color,
            created_at: Utc::now(),
        };
        tables
            .categories
            .insert(category.category_id, category.clone());
        Ok(category)
    }

    async fn list_categories(&self, user_id: Option<i64>) -> PortResult<Vec<Category>> {
        Ok(self
            .lock()
            .categories
            .values()
            .filter(|c| user_id.map_or(true, |id| c.user_id == id))
            .cloned()
            .collect())
    }

    async fn get_category(&self, category_id: i64) -> PortResult<Category> {
        self.lock()
            .categories
            .get(&category_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Category"))
    }

    async fn update_category(
        &self,
        category_id: i64,
        patch: CategoryPatch,
    ) -> PortResult<Category> {
        patch.validate()?;
        let mut tables = self.lock();
        let mut category = tables
            .categories
            .get(&category_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Category"))?;
        if let Some(name) = patch.rename(&category) {
            if tables.category_name_in_use(category.user_id, name) {
                return Err(PortError::Validation(
                    "Category with this name already exists".to_string(),
                ));
            }
        }
        patch.apply(&mut category);
        tables.categories.insert(category_id, category.clone());
        Ok(category)
    }

    async fn delete_category(&self, category_id: i64) -> PortResult<()> {
        let mut tables = self.lock();
        tables
            .categories
            .remove(&category_id)
            .ok_or_else(|| PortError::not_found("Category"))?;
        for task in tables.tasks.values_mut() {
            if task.category_id == Some(category_id) {
                task.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TagStore for InMemoryDb {
    async fn create_or_get_tag(&self, name: &str) -> PortResult<Tag> {
        let name = normalize_tag_name(name)?;
        let mut tables = self.lock();
        if let Some(tag) = tables.tags.values().find(|tag| tag.name == name) {
            return Ok(tag.clone());
        }
        let tag = Tag {
            tag_id: tables.next_id(),
            name,
            created_at: Utc::now(),
        };
        tables.tags.insert(tag.tag_id, tag.clone());
        Ok(tag)
    }

    async fn list_tags(&self) -> PortResult<Vec<Tag>> {
        let mut tags: Vec<Tag> = self.lock().tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn get_tag(&self, tag_id: i64) -> PortResult<Tag> {
        self.lock()
            .tags
            .get(&tag_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Tag"))
    }
}

#[async_trait]
impl TaskStore for InMemoryDb {
    async fn create_task(&self, user_id: i64, new_task: NewTask) -> PortResult<TaskWithTags> {
        new_task.validate()?;
        let now = Utc::now();
        let mut tables = self.lock();
        tables.user(user_id)?;
        if let Some(category_id) = new_task.category_id {
            tables.ensure_category(category_id)?;
        }
        let details = new_task.analytics_details();
        let task = Task {
            task_id: tables.next_id(),
            user_id,
            title: new_task.title,
            description: new_task.description,
            category_id: new_task.category_id,
            priority: new_task.priority,
            deadline: new_task.deadline,
            is_repeating: new_task.is_repeating,
            repeat_interval: new_task.repeat_interval,
            status: INITIAL_TASK_STATUS,
            is_favorite: new_task.is_favorite,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        tables.tasks.insert(task.task_id, task.clone());
        tables.record_action(user_id, task.task_id, AnalyticsAction::Created, details, now);
        Ok(tables.with_tags(task))
    }

    async fn list_tasks(&self, user_id: i64) -> PortResult<Vec<TaskWithTags>> {
        let tables = self.lock();
        Ok(tables
            .tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .map(|task| tables.with_tags(task))
            .collect())
    }

    async fn get_task(&self, user_id: i64, task_id: i64) -> PortResult<TaskWithTags> {
        let tables = self.lock();
        let task = tables.owned_task(user_id, task_id)?.clone();
        Ok(tables.with_tags(task))
    }

    async fn update_task(
        &self,
        user_id: i64,
        task_id: i64,
        patch: TaskPatch,
    ) -> PortResult<TaskWithTags> {
        patch.validate()?;
        let now = Utc::now();
        let mut tables = self.lock();
        let mut task = tables.owned_task(user_id, task_id)?.clone();
        if let Some(category_id) = patch.referenced_category() {
            tables.ensure_category(category_id)?;
        }
        let change = patch.apply(&mut task, now);
        tables.tasks.insert(task_id, task.clone());
        tables.record_action(
            user_id,
            task_id,
            change.action(),
            change.analytics_details(),
            now,
        );
        Ok(tables.with_tags(task))
    }

    async fn delete_task(&self, user_id: i64, task_id: i64) -> PortResult<()> {
        let mut tables = self.lock();
        tables.owned_task(user_id, task_id)?;
        tables.remove_task_rows(task_id);
        Ok(())
    }

    async fn sweep_overdue(&self, now: DateTime<Utc>) -> PortResult<Vec<Notification>> {
        let mut tables = self.lock();
        let overdue: Vec<Task> = tables
            .tasks
            .values_mut()
            .filter(|task| task.is_overdue_at(now))
            .map(|task| {
                task.status = mastertask_core::domain::TaskStatus::Overdue;
                task.updated_at = now;
                task.clone()
            })
            .collect();
        Ok(overdue
            .into_iter()
            .map(|task| {
                tables.insert_notification(
                    NewNotification {
                        task_id: task.task_id,
                        user_id: task.user_id,
                        notification_type: NotificationType::Overdue,
                        message: task.overdue_message(),
                    },
                    now,
                )
            })
            .collect())
    }
}

#[async_trait]
impl TaskTagStore for InMemoryDb {
    async fn create_or_get_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<TaskTag> {
        let mut tables = self.lock();
        if !tables.tasks.contains_key(&task_id) {
            return Err(PortError::not_found("Task"));
        }
        if !tables.tags.contains_key(&tag_id) {
            return Err(PortError::not_found("Tag"));
        }
        tables.task_tags.insert((task_id, tag_id));
        Ok(TaskTag { task_id, tag_id })
    }

    async fn list_task_tags(&self, task_id: Option<i64>) -> PortResult<Vec<TaskTag>> {
        Ok(self
            .lock()
            .task_tags
            .iter()
            .filter(|(id, _)| task_id.map_or(true, |wanted| *id == wanted))
            .map(|&(task_id, tag_id)| TaskTag { task_id, tag_id })
            .collect())
    }

    async fn get_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<TaskTag> {
        if self.lock().task_tags.contains(&(task_id, tag_id)) {
            Ok(TaskTag { task_id, tag_id })
        } else {
            Err(PortError::not_found("Task-Tag association"))
        }
    }

    async fn delete_task_tag(&self, task_id: i64, tag_id: i64) -> PortResult<()> {
        if self.lock().task_tags.remove(&(task_id, tag_id)) {
            Ok(())
        } else {
            Err(PortError::not_found("Task-Tag association"))
        }
    }
}

#[async_trait]
impl NotificationStore for InMemoryDb {
    async fn create_notification(
        &self,
        new_notification: NewNotification,
    ) -> PortResult<Notification> {
        let mut tables = self.lock();
        if !tables.tasks.contains_key(&new_notification.task_id) {
            return Err(PortError::not_found("Task"));
        }
        tables.user(new_notification.user_id)?;
        Ok(tables.insert_notification(new_notification, Utc::now()))
    }

    async fn list_notifications(
        &self,
        filter: NotificationFilter,
    ) -> PortResult<Vec<Notification>> {
        let mut notifications: Vec<Notification> = self
            .lock()
            .notifications
            .values()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        notifications.sort_by(|a, b| {
            b.sent_at
                .cmp(&a.sent_at)
                .then(b.notification_id.cmp(&a.notification_id))
        });
        Ok(notifications)
    }

    async fn get_notification(&self, notification_id: i64) -> PortResult<Notification> {
        self.lock()
            .notifications
            .get(&notification_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Notification"))
    }

    async fn set_notification_read(
        &self,
        notification_id: i64,
        is_read: bool,
    ) -> PortResult<Notification> {
        let mut tables = self.lock();
        let notification = tables
            .notifications
            .get_mut(&notification_id)
            .ok_or_else(|| PortError::not_found("Notification"))?;
        notification.is_read = is_read;
        Ok(notification.clone())
    }

    async fn delete_notification(&self, notification_id: i64) -> PortResult<()> {
        self.lock()
            .notifications
            .remove(&notification_id)
            .map(|_| ())
            .ok_or_else(|| PortError::not_found("Notification"))
    }
}

#[async_trait]
impl AnalyticsStore for InMemoryDb {
    async fn list_analytics_logs(&self, user_id: Option<i64>) -> PortResult<Vec<AnalyticsLog>> {
        Ok(self
            .lock()
            .analytics
            .values()
            .filter(|log| user_id.map_or(true, |id| log.user_id == id))
            .cloned()
            .collect())
    }

    async fn get_analytics_log(&self, log_id: i64) -> PortResult<AnalyticsLog> {
        self.lock()
            .analytics
            .get(&log_id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Analytics log"))
    }

    async fn analytics_stats(&self, user_id: i64) -> PortResult<AnalyticsStats> {
        let tables = self.lock();
        let counts = tables
            .analytics
            .values()
            .filter(|log| log.user_id == user_id)
            .map(|log| (log.action, 1));
        Ok(AnalyticsStats::from_counts(user_id, counts))
    }
}

//=========================================================================================
// Request Helpers
//=========================================================================================

pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().expect("valid socket address"),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        cors_origins: CorsOrigins::Any,
        db_max_connections: 1,
    }
}

/// A router over a fresh in-memory store, plus a handle on that store.
pub fn test_app() -> (Router, InMemoryDb) {
    let db = InMemoryDb::default();
    let state = Arc::new(AppState::new(Arc::new(db.clone()), Arc::new(test_config())));
    (router(state), db)
}

/// Sends one request and returns the status with the decoded JSON body
/// (`Value::Null` when the body is empty or not JSON).
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");

    let response = app.clone().oneshot(request).await.expect("infallible router");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Registers a user whose password is "password" and returns its id.
pub async fn register(app: &Router, email: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/users",
        Some(serde_json::json!({ "email": email, "password_hash": PASSWORD_HASH })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["user_id"].as_i64().expect("user_id in response")
}
