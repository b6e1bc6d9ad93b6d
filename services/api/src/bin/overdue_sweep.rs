//! services/api/src/bin/overdue_sweep.rs
//!
//! One-shot overdue check, meant to be run on a schedule (cron, a k8s
//! CronJob). Every open task whose deadline has passed is marked overdue
//! and its owner gets an overdue notification, all in one transaction.

use api_lib::{adapters::DbAdapter, config::Config, error::ApiError};
use chrono::Utc;
use mastertask_core::ports::TaskStore;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.database_url)
        .await?;
    let db = DbAdapter::new(db_pool);
    db.run_migrations().await?;

    let notifications = db.sweep_overdue(Utc::now()).await?;
    for notification in &notifications {
        info!(
            task_id = notification.task_id,
            user_id = notification.user_id,
            "{}",
            notification.message
        );
    }
    info!("Overdue sweep finished: {} notification(s) sent", notifications.len());

    Ok(())
}
