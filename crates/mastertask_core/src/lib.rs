pub mod domain;
pub mod ports;

pub use domain::{
    AnalyticsAction, AnalyticsLog, AnalyticsStats, Category, CategoryPatch, JsonMap,
    NewCategory, NewNotification, NewTask, NewUser, Notification, NotificationFilter,
    NotificationType, Priority, Tag, TagSummary, Task, TaskChange, TaskPatch, TaskStatus,
    TaskTag, TaskWithTags, User, UserPatch,
};
pub use ports::{
    AnalyticsStore, CategoryStore, DatabaseService, NotificationStore, PortError, PortResult,
    TagStore, TaskStore, TaskTagStore, UserStore,
};
