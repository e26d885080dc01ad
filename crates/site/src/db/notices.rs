//! Notice repository.
//!
//! Popup ordering is applied by the popup engine, so
//! [`NoticeRepository::list_popup_eligible`] only filters.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hans_institute_core::{NoticeId, NoticeKind, Priority};

use super::RepositoryError;
use crate::models::{Notice, NoticeInput};

const NOTICE_COLUMNS: &str =
    "id, title, content, kind, priority, show_as_popup, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct NoticeRow {
    id: NoticeId,
    title: String,
    content: String,
    kind: NoticeKind,
    priority: Priority,
    show_as_popup: bool,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoticeRow> for Notice {
    fn from(row: NoticeRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            kind: row.kind,
            priority: row.priority,
            show_as_popup: row.show_as_popup,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for notice database operations.
pub struct NoticeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NoticeRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active notices, newest first, optionally limited to one kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(
        &self,
        kind: Option<NoticeKind>,
    ) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices \
             WHERE is_active AND ($1::notice_type IS NULL OR kind = $1) \
             ORDER BY created_at DESC"
        ))
        .bind(kind)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Active notices flagged to appear as a popup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_popup_eligible(&self) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices WHERE is_active AND show_as_popup"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every notice, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: NoticeId) -> Result<Option<Notice>, RepositoryError> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &NoticeInput) -> Result<Notice, RepositoryError> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "INSERT INTO notices (title, content, kind, priority, show_as_popup, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.kind)
        .bind(input.priority)
        .bind(input.show_as_popup)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notice does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(&self, id: NoticeId, input: &NoticeInput) -> Result<Notice, RepositoryError> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "UPDATE notices SET \
                 title = $2, content = $3, kind = $4, priority = $5, show_as_popup = $6, \
                 is_active = $7, updated_at = now() \
             WHERE id = $1 \
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.kind)
        .bind(input.priority)
        .bind(input.show_as_popup)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notice does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: NoticeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notices")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
