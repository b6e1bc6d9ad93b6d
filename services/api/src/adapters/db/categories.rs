//! services/api/src/adapters/db/categories.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mastertask_core::domain::{Category, CategoryPatch, NewCategory};
use mastertask_core::ports::{CategoryStore, PortError, PortResult};
use sqlx::{FromRow, PgConnection};

use super::{ensure_user_exists, is_unique_violation, unexpected, DbAdapter};

#[derive(FromRow)]
struct CategoryRecord {
    category_id: i64,
    user_id: i64,
    name: String,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl CategoryRecord {
    fn to_domain(self) -> Category {
        Category {
            category_id: self.category_id,
            user_id: self.user_id,
            name: self.name,
            color: self.color,
            created_at: self.created_at,
        }
    }
}

fn duplicate_name() -> PortError {
    PortError::Validation("Category with this name already exists".to_string())
}

fn map_write_error(e: sqlx::Error) -> PortError {
    if is_unique_violation(&e) {
        duplicate_name()
    } else {
        unexpected(e)
    }
}

async fn name_in_use(conn: &mut PgConnection, user_id: i64, name: &str) -> PortResult<bool> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE user_id = $1 AND name = $2)",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(conn)
    .await
    .map_err(unexpected)
}

async fn fetch_category(conn: &mut PgConnection, category_id: i64) -> PortResult<Category> {
    let record = sqlx::query_as::<_, CategoryRecord>(
        "SELECT category_id, user_id, name, color, created_at
         FROM categories WHERE category_id = $1",
    )
    .bind(category_id)
    .fetch_optional(conn)
    .await
    .map_err(unexpected)?
    .ok_or_else(|| PortError::not_found("Category"))?;
    Ok(record.to_domain())
}

#[async_trait]
impl CategoryStore for DbAdapter {
    async fn create_category(&self, new_category: NewCategory) -> PortResult<Category> {
        new_category.validate()?;
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        ensure_user_exists(&mut tx, new_category.user_id).await?;
        if name_in_use(&mut tx, new_category.user_id, &new_category.name).await? {
            return Err(duplicate_name());
        }

        let record = sqlx::query_as::<_, CategoryRecord>(
            "INSERT INTO categories (user_id, name, color, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING category_id, user_id, name, color, created_at",
        )
        .bind(new_category.user_id)
        .bind(&new_category.name)
        .bind(&new_category.color)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_categories(&self, user_id: Option<i64>) -> PortResult<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT category_id, user_id, name, color, created_at
             FROM categories
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
             ORDER BY category_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(CategoryRecord::to_domain).collect())
    }

    async fn get_category(&self, category_id: i64) -> PortResult<Category> {
        let mut conn = self.pool.acquire().await.map_err(unexpected)?;
        fetch_category(&mut conn, category_id).await
    }

    async fn update_category(
        &self,
        category_id: i64,
        patch: CategoryPatch,
    ) -> PortResult<Category> {
        patch.validate()?;
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let mut category = fetch_category(&mut tx, category_id).await?;
        if let Some(name) = patch.rename(&category) {
            if name_in_use(&mut tx, category.user_id, name).await? {
                return Err(duplicate_name());
            }
        }
        patch.apply(&mut category);

        let record = sqlx::query_as::<_, CategoryRecord>(
            "UPDATE categories SET name = $1, color = $2
             WHERE category_id = $3
             RETURNING category_id, user_id, name, color, created_at",
        )
        .bind(&category.name)
        .bind(&category.color)
        .bind(category_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn delete_category(&self, category_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE category_id = $1")
            .bind(category_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::not_found("Category"));
        }
        Ok(())
    }
}
