//! services/api/src/adapters/db/users.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mastertask_core::domain::{self, verify_password, JsonMap, NewUser, User, UserPatch};
use mastertask_core::ports::{PortError, PortResult, UserStore};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection};
use tracing::info;

use super::{is_unique_violation, unexpected, DbAdapter};

#[derive(FromRow)]
struct UserRecord {
    user_id: i64,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
    preferences: Option<Json<JsonMap>>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            last_login: self.last_login,
            preferences: self.preferences.map(|Json(map)| map),
        }
    }
}

fn email_taken() -> PortError {
    PortError::Validation("Email already registered".to_string())
}

async fn fetch_user(conn: &mut PgConnection, user_id: i64) -> PortResult<User> {
    let record = sqlx::query_as::<_, UserRecord>(
        "SELECT user_id, email, password_hash, created_at, last_login, preferences
         FROM users WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await
    .map_err(unexpected)?
    .ok_or_else(|| PortError::not_found("User"))?;
    Ok(record.to_domain())
}

async fn email_in_use(conn: &mut PgConnection, email: &str) -> PortResult<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(conn)
        .await
        .map_err(unexpected)
}

/// Writes every mutable column of `user` back and returns the stored row.
async fn store_user(conn: &mut PgConnection, user: User) -> PortResult<User> {
    let record = sqlx::query_as::<_, UserRecord>(
        "UPDATE users
         SET email = $1, password_hash = $2, last_login = $3, preferences = $4
         WHERE user_id = $5
         RETURNING user_id, email, password_hash, created_at, last_login, preferences",
    )
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.last_login)
    .bind(user.preferences.map(Json))
    .bind(user.user_id)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            email_taken()
        } else {
            unexpected(e)
        }
    })?;
    Ok(record.to_domain())
}

#[async_trait]
impl UserStore for DbAdapter {
    async fn create_user(&self, new_user: NewUser) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        if email_in_use(&mut tx, &new_user.email).await? {
            return Err(email_taken());
        }

        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (email, password_hash, created_at, preferences)
             VALUES ($1, $2, $3, $4)
             RETURNING user_id, email, password_hash, created_at, last_login, preferences",
        )
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(Utc::now())
        .bind(new_user.preferences.map(Json))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                email_taken()
            } else {
                unexpected(e)
            }
        })?;

        tx.commit().await.map_err(unexpected)?;
        info!("Registered user {}", record.user_id);
        Ok(record.to_domain())
    }

    async fn list_users(&self) -> PortResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, password_hash, created_at, last_login, preferences
             FROM users ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(UserRecord::to_domain).collect())
    }

    async fn get_user(&self, user_id: i64) -> PortResult<User> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        fetch_user(&mut conn, user_id).await
    }

    async fn update_user(&self, user_id: i64, patch: UserPatch) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let mut user = fetch_user(&mut tx, user_id).await?;
        if let Some(email) = patch.email_change(&user) {
            if email_in_use(&mut tx, email).await? {
                return Err(email_taken());
            }
        }
        patch.apply(&mut user);
        let user = store_user(&mut tx, user).await?;

        tx.commit().await.map_err(unexpected)?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("User"));
        }
        info!("Deleted user {} and everything it owned", user_id);
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT user_id, email, password_hash, created_at, last_login, preferences
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;

        let mut user = match record {
            Some(record) => record.to_domain(),
            None => return Err(PortError::Unauthorized),
        };
        if !verify_password(password, &user.password_hash) {
            return Err(PortError::Unauthorized);
        }

        user.last_login = Some(Utc::now());
        let user = store_user(&mut tx, user).await?;

        tx.commit().await.map_err(unexpected)?;
        Ok(user)
    }

    async fn merge_preferences(&self, user_id: i64, preferences: JsonMap) -> PortResult<User> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let mut user = fetch_user(&mut tx, user_id).await?;
        user.preferences = Some(domain::merge_preferences(
            user.preferences.take(),
            preferences,
        ));
        let user = store_user(&mut tx, user).await?;

        tx.commit().await.map_err(unexpected)?;
        Ok(user)
    }
}
