//! PostgreSQL implementation of the short link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ResolveTarget, ShortLink};
use crate::domain::repositories::ShortLinkRepository;
use crate::error::AppError;

/// Columns selected whenever a full entity is materialized.
const SHORT_LINK_COLUMNS: &str =
    "id, code, original_url, owner_id, clicks, created_at, updated_at, deleted_at";

/// PostgreSQL repository for short link storage and retrieval.
///
/// Uses SQLx prepared statements; uniqueness of `code` and of active
/// `(owner_id, original_url)` pairs is enforced by the unique indexes
/// created in `migrations/`, and surfaces as [`AppError::Conflict`]
/// through the crate's `sqlx::Error` conversion.
pub struct PgShortLinkRepository {
    pool: Arc<PgPool>,
}

impl PgShortLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShortLinkRow {
    id: i64,
    code: String,
    original_url: String,
    owner_id: Option<String>,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(row: ShortLinkRow) -> Self {
        ShortLink {
            id: row.id,
            code: row.code,
            original_url: row.original_url,
            owner_id: row.owner_id,
            clicks: row.clicks,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[async_trait]
impl ShortLinkRepository for PgShortLinkRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(&format!(
            r#"
            INSERT INTO short_links (code, original_url, owner_id)
            VALUES ($1, $2, $3)
            RETURNING {SHORT_LINK_COLUMNS}
            "#
        ))
        .bind(&new_link.code)
        .bind(&new_link.original_url)
        .bind(&new_link.owner_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: &str,
        original_url: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(&format!(
            r#"
            SELECT {SHORT_LINK_COLUMNS}
            FROM short_links
            WHERE owner_id = $1 AND original_url = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(owner_id)
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_target_by_code(&self, code: &str) -> Result<Option<ResolveTarget>, AppError> {
        // Minimal projection: a redirect only needs the id and the target.
        let row = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, original_url
            FROM short_links
            WHERE code = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(|(id, original_url)| ResolveTarget { id, original_url }))
    }

    async fn find_by_id_and_owner(
        &self,
        id: i64,
        owner_id: &str,
    ) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(&format!(
            r#"
            SELECT {SHORT_LINK_COLUMNS}
            FROM short_links
            WHERE id = $1 AND owner_id = $2 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError> {
        let rows = sqlx::query_as::<_, ShortLinkRow>(&format!(
            r#"
            SELECT {SHORT_LINK_COLUMNS}
            FROM short_links
            WHERE owner_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_url(&self, id: i64, original_url: &str) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(&format!(
            r#"
            UPDATE short_links
            SET original_url = $2, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {SHORT_LINK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Into::into).ok_or(AppError::NotFoundOrNotOwned)
    }

    async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET deleted_at = now(), updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFoundOrNotOwned);
        }

        Ok(())
    }

    async fn increment_clicks(&self, id: i64) -> Result<(), AppError> {
        // Single store-side update; concurrent resolutions must not lose
        // increments, so the addition never happens application-side.
        sqlx::query(
            r#"
            UPDATE short_links
            SET clicks = clicks + 1
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }
}
