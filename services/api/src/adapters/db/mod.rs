//! services/api/src/adapters/db/mod.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the entity stores from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`, one submodule per entity.
//!
//! Every mutating operation opens a transaction and commits it only at the end;
//! an early `?` drops the transaction, which rolls it back.

mod analytics;
mod categories;
mod notifications;
mod tags;
mod task_tags;
mod tasks;
mod users;

use mastertask_core::ports::{PortError, PortResult};
use sqlx::{PgConnection, PgPool};
use std::str::FromStr;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every entity store.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Shared Helpers
//=========================================================================================

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Parses an enum column; a bad value means the CHECK constraints were bypassed.
fn parse_column<T>(value: &str) -> PortResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| PortError::Unexpected(e.to_string()))
}

async fn row_exists(conn: &mut PgConnection, sql: &str, id: i64) -> PortResult<bool> {
    sqlx::query_scalar::<_, bool>(sql)
        .bind(id)
        .fetch_one(conn)
        .await
        .map_err(unexpected)
}

async fn ensure_user_exists(conn: &mut PgConnection, user_id: i64) -> PortResult<()> {
    if row_exists(conn, "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)", user_id).await? {
        Ok(())
    } else {
        Err(PortError::not_found("User"))
    }
}

async fn ensure_category_exists(conn: &mut PgConnection, category_id: i64) -> PortResult<()> {
    let sql = "SELECT EXISTS(SELECT 1 FROM categories WHERE category_id = $1)";
    if row_exists(conn, sql, category_id).await? {
        Ok(())
    } else {
        Err(PortError::not_found("Category"))
    }
}

async fn ensure_task_exists(conn: &mut PgConnection, task_id: i64) -> PortResult<()> {
    if row_exists(conn, "SELECT EXISTS(SELECT 1 FROM tasks WHERE task_id = $1)", task_id).await? {
        Ok(())
    } else {
        Err(PortError::not_found("Task"))
    }
}

async fn ensure_tag_exists(conn: &mut PgConnection, tag_id: i64) -> PortResult<()> {
    if row_exists(conn, "SELECT EXISTS(SELECT 1 FROM tags WHERE tag_id = $1)", tag_id).await? {
        Ok(())
    } else {
        Err(PortError::not_found("Tag"))
    }
}
