//! services/api/src/adapters/db/tags.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mastertask_core::domain::{normalize_tag_name, Tag};
use mastertask_core::ports::{PortError, PortResult, TagStore};
use sqlx::{FromRow, PgConnection};
use tracing::debug;

use super::{unexpected, DbAdapter};

#[derive(FromRow)]
struct TagRecord {
    tag_id: i64,
    name: String,
    created_at: DateTime<Utc>,
}

impl TagRecord {
    fn to_domain(self) -> Tag {
        Tag {
            tag_id: self.tag_id,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

async fn find_by_name(conn: &mut PgConnection, name: &str) -> PortResult<Option<Tag>> {
    let record = sqlx::query_as::<_, TagRecord>(
        "SELECT tag_id, name, created_at FROM tags WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(conn)
    .await
    .map_err(unexpected)?;
    Ok(record.map(TagRecord::to_domain))
}

#[async_trait]
impl TagStore for DbAdapter {
    async fn create_or_get_tag(&self, name: &str) -> PortResult<Tag> {
        let name = normalize_tag_name(name)?;
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        if let Some(existing) = find_by_name(&mut tx, &name).await? {
            debug!("Tag '{}' already exists as {}", name, existing.tag_id);
            return Ok(existing);
        }

        // A concurrent request may insert the same name between the lookup and here.
        let inserted = sqlx::query_as::<_, TagRecord>(
            "INSERT INTO tags (name, created_at) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING
             RETURNING tag_id, name, created_at",
        )
        .bind(&name)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await
        .map_err(unexpected)?;

        let tag = match inserted {
            Some(record) => record.to_domain(),
            None => find_by_name(&mut tx, &name)
                .await?
                .ok_or_else(|| PortError::Unexpected(format!("Tag '{}' vanished", name)))?,
        };

        tx.commit().await.map_err(unexpected)?;
        Ok(tag)
    }

    async fn list_tags(&self) -> PortResult<Vec<Tag>> {
        let records = sqlx::query_as::<_, TagRecord>(
            "SELECT tag_id, name, created_at FROM tags ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(TagRecord::to_domain).collect())
    }

    async fn get_tag(&self, tag_id: i64) -> PortResult<Tag> {
        let record = sqlx::query_as::<_, TagRecord>(
            "SELECT tag_id, name, created_at FROM tags WHERE tag_id = $1",
        )
        .bind(tag_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::not_found("Tag"))?;
        Ok(record.to_domain())
    }
}
