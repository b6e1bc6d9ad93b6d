//! crates/mastertask_core/src/domain.rs
//!
//! Defines the core data structures for the task manager, together with the
//! rules that keep them consistent (partial-update merges, derived timestamps,
//! tag normalization, preference merging).
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::ports::{PortError, PortResult};

/// A free-form JSON object, used for user preferences and analytics details.
pub type JsonMap = Map<String, Value>;

//=========================================================================================
// Enumerations
//=========================================================================================

/// Returned when a stored string does not name a known enum variant.
#[derive(Debug, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(UnknownVariant {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
        }
    }

    /// Statuses the overdue sweep is allowed to move to `Overdue`.
    pub fn is_open(&self) -> bool {
        matches!(self, TaskStatus::Active | TaskStatus::InProgress)
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(TaskStatus::Active),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "overdue" => Ok(TaskStatus::Overdue),
            other => Err(UnknownVariant {
                kind: "task status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Overdue,
    Reminder,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Overdue => "overdue",
            NotificationType::Reminder => "reminder",
        }
    }
}

impl FromStr for NotificationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overdue" => Ok(NotificationType::Overdue),
            "reminder" => Ok(NotificationType::Reminder),
            other => Err(UnknownVariant {
                kind: "notification type",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsAction {
    Created,
    Completed,
    Updated,
}

impl AnalyticsAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsAction::Created => "created",
            AnalyticsAction::Completed => "completed",
            AnalyticsAction::Updated => "updated",
        }
    }
}

impl FromStr for AnalyticsAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(AnalyticsAction::Created),
            "completed" => Ok(AnalyticsAction::Completed),
            "updated" => Ok(AnalyticsAction::Updated),
            other => Err(UnknownVariant {
                kind: "analytics action",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AnalyticsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// Represents a registered user. `password_hash` never leaves the service.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub preferences: Option<JsonMap>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub preferences: Option<JsonMap>,
}

/// Fields a user update may touch. `None` means "leave as is".
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub preferences: Option<Option<JsonMap>>,
}

impl UserPatch {
    /// The new email, if this patch actually changes it.
    pub fn email_change<'a>(&'a self, current: &User) -> Option<&'a str> {
        self.email
            .as_deref()
            .filter(|email| *email != current.email.as_str())
    }

    pub fn apply(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(preferences) = self.preferences {
            user.preferences = preferences;
        }
    }
}

/// Shallow-merges `incoming` into the stored preferences; incoming keys win.
pub fn merge_preferences(existing: Option<JsonMap>, incoming: JsonMap) -> JsonMap {
    let mut merged = existing.unwrap_or_default();
    merged.extend(incoming);
    merged
}

/// Hex-encoded SHA-256 digest, the same scheme clients use at registration.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password).eq_ignore_ascii_case(stored_hash.trim())
}

//=========================================================================================
// Categories
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Category {
    pub category_id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub user_id: i64,
    pub name: String,
    pub color: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> PortResult<()> {
        validate_category_name(&self.name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<Option<String>>,
}

impl CategoryPatch {
    pub fn validate(&self) -> PortResult<()> {
        match &self.name {
            Some(name) => validate_category_name(name),
            None => Ok(()),
        }
    }

    /// The new name, if this patch renames the category. Comparison is exact.
    pub fn rename<'a>(&'a self, current: &Category) -> Option<&'a str> {
        self.name
            .as_deref()
            .filter(|name| *name != current.name.as_str())
    }

    pub fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(color) = self.color {
            category.color = color;
        }
    }
}

fn validate_category_name(name: &str) -> PortResult<()> {
    if name.trim().is_empty() {
        return Err(PortError::Validation(
            "Category name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

//=========================================================================================
// Tags
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Tag {
    pub tag_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// The slice of a tag embedded in task responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSummary {
    pub tag_id: i64,
    pub name: String,
}

/// Tag names are stored trimmed and lowercased; an empty result is rejected.
pub fn normalize_tag_name(raw: &str) -> PortResult<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err(PortError::Validation("Tag name cannot be empty".to_string()));
    }
    Ok(name)
}

/// An association between a task and a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskTag {
    pub task_id: i64,
    pub tag_id: i64,
}

//=========================================================================================
// Tasks
//=========================================================================================

/// Every task starts here, whatever the caller asked for.
pub const INITIAL_TASK_STATUS: TaskStatus = TaskStatus::Active;

#[derive(Debug, Clone)]
pub struct Task {
    pub task_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_repeating: bool,
    pub repeat_interval: Option<String>,
    pub status: TaskStatus,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// True when the deadline has passed and the task is still open.
    ///
    /// The Postgres sweep applies the same rule in SQL; keep the two in step.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status.is_open() && self.deadline.is_some_and(|deadline| deadline < now)
    }

    pub fn overdue_message(&self) -> String {
        format!("Task \"{}\" is overdue", self.title)
    }
}

/// A task together with the tags attached to it through `task_tags`.
#[derive(Debug, Clone)]
pub struct TaskWithTags {
    pub task: Task,
    pub tags: Vec<TagSummary>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub priority: Option<Priority>,
    pub deadline: Option<DateTime<Utc>>,
    pub is_repeating: bool,
    pub repeat_interval: Option<String>,
    pub is_favorite: bool,
}

impl NewTask {
    pub fn validate(&self) -> PortResult<()> {
        validate_title(&self.title)
    }

    /// Details recorded with the `created` analytics entry.
    pub fn analytics_details(&self) -> JsonMap {
        let mut details = JsonMap::new();
        details.insert("title".into(), Value::from(self.title.clone()));
        details.insert(
            "priority".into(),
            self.priority
                .map_or(Value::Null, |p| Value::from(p.as_str())),
        );
        details.insert(
            "deadline".into(),
            self.deadline
                .map_or(Value::Null, |d| Value::from(d.to_rfc3339())),
        );
        details
    }
}

/// Fields a task update may touch.
///
/// The outer `Option` says whether the field was sent at all; for nullable
/// columns the inner `Option` carries an explicit `null`.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Option<i64>>,
    pub priority: Option<Option<Priority>>,
    pub deadline: Option<Option<DateTime<Utc>>>,
    pub is_repeating: Option<bool>,
    pub repeat_interval: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub is_favorite: Option<bool>,
}

impl TaskPatch {
    pub fn validate(&self) -> PortResult<()> {
        match &self.title {
            Some(title) => validate_title(title),
            None => Ok(()),
        }
    }

    /// The category this patch points the task at, if it sets a non-null one.
    pub fn referenced_category(&self) -> Option<i64> {
        self.category_id.flatten()
    }

    /// Applies the present fields to `task`, keeps `completed_at` in step with
    /// the status, and refreshes `updated_at`.
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) -> TaskChange {
        let old_status = task.status;
        let mut changed_fields = Vec::new();

        assign(&mut task.title, self.title, "title", &mut changed_fields);
        assign(&mut task.description, self.description, "description", &mut changed_fields);
        assign(&mut task.category_id, self.category_id, "category_id", &mut changed_fields);
        assign(&mut task.priority, self.priority, "priority", &mut changed_fields);
        assign(&mut task.deadline, self.deadline, "deadline", &mut changed_fields);
        assign(&mut task.is_repeating, self.is_repeating, "is_repeating", &mut changed_fields);
        assign(
            &mut task.repeat_interval,
            self.repeat_interval,
            "repeat_interval",
            &mut changed_fields,
        );
        assign(&mut task.status, self.status, "status", &mut changed_fields);
        assign(&mut task.is_favorite, self.is_favorite, "is_favorite", &mut changed_fields);

        let was_completed = old_status == TaskStatus::Completed;
        let is_completed = task.status == TaskStatus::Completed;
        if is_completed && !was_completed {
            task.completed_at = Some(now);
        } else if was_completed && !is_completed {
            task.completed_at = None;
        }
        task.updated_at = now;

        TaskChange {
            changed_fields,
            old_status,
            new_status: task.status,
        }
    }
}

fn assign<T: PartialEq>(
    field: &mut T,
    value: Option<T>,
    name: &'static str,
    changed: &mut Vec<&'static str>,
) {
    if let Some(value) = value {
        if *field != value {
            *field = value;
            changed.push(name);
        }
    }
}

fn validate_title(title: &str) -> PortResult<()> {
    if title.trim().is_empty() {
        return Err(PortError::Validation("Task title cannot be empty".to_string()));
    }
    Ok(())
}

/// The outcome of applying a `TaskPatch`, used to write the analytics entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChange {
    pub changed_fields: Vec<&'static str>,
    pub old_status: TaskStatus,
    pub new_status: TaskStatus,
}

impl TaskChange {
    pub fn action(&self) -> AnalyticsAction {
        if self.new_status == TaskStatus::Completed && self.old_status != TaskStatus::Completed {
            AnalyticsAction::Completed
        } else {
            AnalyticsAction::Updated
        }
    }

    pub fn analytics_details(&self) -> JsonMap {
        let mut details = JsonMap::new();
        details.insert(
            "changed_fields".into(),
            Value::from(self.changed_fields.clone()),
        );
        details.insert("old_status".into(), Value::from(self.old_status.as_str()));
        details.insert("new_status".into(), Value::from(self.new_status.as_str()));
        details
    }
}

//=========================================================================================
// Notifications
//=========================================================================================

#[derive(Debug, Clone)]
pub struct Notification {
    pub notification_id: i64,
    pub task_id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub task_id: i64,
    pub user_id: i64,
    pub notification_type: NotificationType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationFilter {
    pub user_id: Option<i64>,
    pub is_read: Option<bool>,
}

impl NotificationFilter {
    /// In-memory form of the `WHERE` clause used by the Postgres notification
    /// listing. Both must accept the same rows.
    pub fn matches(&self, notification: &Notification) -> bool {
        self.user_id.map_or(true, |id| notification.user_id == id)
            && self.is_read.map_or(true, |read| notification.is_read == read)
    }
}

//=========================================================================================
// Analytics
//=========================================================================================

#[derive(Debug, Clone)]
pub struct AnalyticsLog {
    pub log_id: i64,
    pub user_id: i64,
    pub task_id: i64,
    pub action: AnalyticsAction,
    pub timestamp: DateTime<Utc>,
    pub details: Option<JsonMap>,
}

/// Per-user action counts. Actions with no rows are absent from `by_action`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsStats {
    pub user_id: i64,
    pub total_actions: i64,
    pub by_action: BTreeMap<AnalyticsAction, i64>,
}

impl AnalyticsStats {
    pub fn from_counts(
        user_id: i64,
        counts: impl IntoIterator<Item = (AnalyticsAction, i64)>,
    ) -> Self {
        let mut by_action = BTreeMap::new();
        for (action, count) in counts {
            *by_action.entry(action).or_insert(0) += count;
        }
        let total_actions = by_action.values().sum();
        Self {
            user_id,
            total_actions,
            by_action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn sample_task(now: DateTime<Utc>) -> Task {
        Task {
            task_id: 1,
            user_id: 1,
            title: "Buy milk".to_string(),
            description: None,
            category_id: Some(3),
            priority: Some(Priority::High),
            deadline: None,
            is_repeating: false,
            repeat_interval: None,
            status: TaskStatus::Active,
            is_favorite: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    fn as_map(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn enum_strings_match_the_stored_values() {
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        assert_eq!("reminder".parse::<NotificationType>().unwrap(), NotificationType::Reminder);
        assert_eq!("completed".parse::<AnalyticsAction>().unwrap(), AnalyticsAction::Completed);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("in_progress")
        );
    }

    #[test]
    fn tag_names_are_trimmed_and_lowercased() {
        assert_eq!(normalize_tag_name("  Work ").unwrap(), "work");
        assert_eq!(normalize_tag_name("WORK").unwrap(), "work");
        assert!(matches!(
            normalize_tag_name("   "),
            Err(PortError::Validation(_))
        ));
    }

    #[test]
    fn completing_a_task_sets_completed_at_and_reports_completed() {
        let created = Utc::now();
        let mut task = sample_task(created);
        let later = created + Duration::minutes(5);

        let change = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .apply(&mut task, later);

        assert_eq!(task.completed_at, Some(later));
        assert!(task.completed_at.unwrap() >= task.created_at);
        assert_eq!(task.updated_at, later);
        assert_eq!(change.action(), AnalyticsAction::Completed);
        assert_eq!(change.changed_fields, vec!["status"]);
    }

    #[test]
    fn leaving_completed_clears_completed_at() {
        let now = Utc::now();
        let mut task = sample_task(now);
        TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .apply(&mut task, now);

        let change = TaskPatch {
            status: Some(TaskStatus::InProgress),
            ..Default::default()
        }
        .apply(&mut task, now + Duration::seconds(1));

        assert_eq!(task.completed_at, None);
        assert_eq!(change.action(), AnalyticsAction::Updated);
        assert_eq!(change.old_status, TaskStatus::Completed);
        assert_eq!(change.new_status, TaskStatus::InProgress);
    }

    #[test]
    fn recompleting_keeps_the_original_completion_time() {
        let now = Utc::now();
        let mut task = sample_task(now);
        TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        }
        .apply(&mut task, now);

        let change = TaskPatch {
            status: Some(TaskStatus::Completed),
            title: Some("Buy oat milk".to_string()),
            ..Default::default()
        }
        .apply(&mut task, now + Duration::hours(1));

        assert_eq!(task.completed_at, Some(now));
        assert_eq!(change.action(), AnalyticsAction::Updated);
        assert_eq!(change.changed_fields, vec!["title"]);
    }

    #[test]
    fn patch_touches_only_present_fields_and_honours_explicit_null() {
        let now = Utc::now();
        let mut task = sample_task(now);

        let change = TaskPatch {
            category_id: Some(None),
            is_favorite: Some(true),
            ..Default::default()
        }
        .apply(&mut task, now);

        assert_eq!(task.category_id, None);
        assert!(task.is_favorite);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(change.changed_fields, vec!["category_id", "is_favorite"]);

        let details = change.analytics_details();
        assert_eq!(details["old_status"], json!("active"));
        assert_eq!(details["new_status"], json!("active"));
    }

    #[test]
    fn blank_titles_are_rejected() {
        let patch = TaskPatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(matches!(patch.validate(), Err(PortError::Validation(_))));
    }

    #[test]
    fn created_details_capture_title_priority_and_deadline() {
        let new_task = NewTask {
            title: "Buy milk".to_string(),
            description: None,
            category_id: None,
            priority: Some(Priority::High),
            deadline: None,
            is_repeating: false,
            repeat_interval: None,
            is_favorite: false,
        };

        let details = new_task.analytics_details();
        assert_eq!(details["title"], json!("Buy milk"));
        assert_eq!(details["priority"], json!("high"));
        assert_eq!(details["deadline"], Value::Null);
    }

    #[test]
    fn preferences_merge_with_later_keys_winning() {
        let first = as_map(json!({"theme": "dark", "language": "ru"}));
        let second = as_map(json!({"theme": "light", "week_start": "monday"}));

        let merged = merge_preferences(None, first);
        let merged = merge_preferences(Some(merged), second);

        assert_eq!(
            Value::Object(merged),
            json!({"theme": "light", "language": "ru", "week_start": "monday"})
        );
    }

    #[test]
    fn password_hash_is_lowercase_sha256_hex() {
        let hash = hash_password("password");
        assert_eq!(
            hash,
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
        assert!(verify_password("password", &hash.to_uppercase()));
        assert!(!verify_password("Password", &hash));
    }

    #[test]
    fn category_rename_is_exact_match() {
        let category = Category {
            category_id: 1,
            user_id: 1,
            name: "Work".to_string(),
            color: None,
            created_at: Utc::now(),
        };

        let same = CategoryPatch {
            name: Some("Work".to_string()),
            color: None,
        };
        let recased = CategoryPatch {
            name: Some("work".to_string()),
            color: None,
        };

        assert_eq!(same.rename(&category), None);
        assert_eq!(recased.rename(&category), Some("work"));
    }

    #[test]
    fn overdue_applies_only_to_open_tasks_past_deadline() {
        let now = Utc::now();
        let mut task = sample_task(now);
        task.deadline = Some(now - Duration::hours(1));
        assert!(task.is_overdue_at(now));

        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue_at(now));

        task.status = TaskStatus::InProgress;
        task.deadline = Some(now + Duration::hours(1));
        assert!(!task.is_overdue_at(now));
    }

    #[test]
    fn notification_filter_combines_owner_and_read_flag() {
        let notification = Notification {
            notification_id: 1,
            task_id: 2,
            user_id: 7,
            notification_type: NotificationType::Reminder,
            message: "Buy milk".to_string(),
            sent_at: Utc::now(),
            is_read: false,
        };
        let filter = |user_id, is_read| NotificationFilter { user_id, is_read };

        assert!(filter(None, None).matches(&notification));
        assert!(filter(Some(7), Some(false)).matches(&notification));
        assert!(!filter(Some(8), None).matches(&notification));
        assert!(!filter(Some(7), Some(true)).matches(&notification));
    }

    #[test]
    fn stats_total_is_sum_of_groups() {
        let stats = AnalyticsStats::from_counts(
            7,
            [(AnalyticsAction::Created, 3), (AnalyticsAction::Updated, 2)],
        );
        assert_eq!(stats.total_actions, 5);
        assert_eq!(stats.by_action.get(&AnalyticsAction::Completed), None);
        assert_eq!(stats.by_action[&AnalyticsAction::Created], 3);
    }
}
