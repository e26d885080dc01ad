//! Founder message repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hans_institute_core::FounderMessageId;

use super::RepositoryError;
use crate::models::{FounderMessage, FounderMessageInput};

const FOUNDER_COLUMNS: &str =
    "id, name, designation, message, image, display_order, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct FounderRow {
    id: FounderMessageId,
    name: String,
    designation: String,
    message: String,
    image: Option<String>,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FounderRow> for FounderMessage {
    fn from(row: FounderRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            designation: row.designation,
            message: row.message,
            image: row.image,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for founder message database operations.
pub struct FounderMessageRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FounderMessageRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The most recently created active founder message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_active(&self) -> Result<Option<FounderMessage>, RepositoryError> {
        let row = sqlx::query_as::<_, FounderRow>(&format!(
            "SELECT {FOUNDER_COLUMNS} FROM founder_message WHERE is_active \
             ORDER BY created_at DESC LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<FounderMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, FounderRow>(&format!(
            "SELECT {FOUNDER_COLUMNS} FROM founder_message ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FounderMessageId) -> Result<Option<FounderMessage>, RepositoryError> {
        let row = sqlx::query_as::<_, FounderRow>(&format!(
            "SELECT {FOUNDER_COLUMNS} FROM founder_message WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        input: &FounderMessageInput,
    ) -> Result<FounderMessage, RepositoryError> {
        let row = sqlx::query_as::<_, FounderRow>(&format!(
            "INSERT INTO founder_message \
                 (name, designation, message, image, display_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {FOUNDER_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.designation)
        .bind(&input.message)
        .bind(&input.image)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: FounderMessageId,
        input: &FounderMessageInput,
    ) -> Result<FounderMessage, RepositoryError> {
        let row = sqlx::query_as::<_, FounderRow>(&format!(
            "UPDATE founder_message SET \
                 name = $2, designation = $3, message = $4, image = $5, display_order = $6, \
                 is_active = $7, updated_at = now() \
             WHERE id = $1 \
             RETURNING {FOUNDER_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.designation)
        .bind(&input.message)
        .bind(&input.image)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the message does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: FounderMessageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM founder_message WHERE id = $1")
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
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM founder_message")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
