//! Inquiry repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hans_institute_core::InquiryId;
use hans_institute_core::inquiry::InquiryDraft;

use super::{RepositoryError, parse_stored_email};
use crate::models::Inquiry;

const INQUIRY_COLUMNS: &str = "id, name, email, phone, subject, message, is_read, created_at";

#[derive(Debug, sqlx::FromRow)]
struct InquiryRow {
    id: InquiryId,
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<InquiryRow> for Inquiry {
    type Error = RepositoryError;

    fn try_from(row: InquiryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: parse_stored_email(&row.email)?,
            phone: row.phone,
            subject: row.subject,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

/// Repository for inquiry database operations.
pub struct InquiryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InquiryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every inquiry, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_all(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        let rows = sqlx::query_as::<_, InquiryRow>(&format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        let row = sqlx::query_as::<_, InquiryRow>(&format!(
            "SELECT {INQUIRY_COLUMNS} FROM inquiries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Store a validated inquiry as unread.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, draft: &InquiryDraft) -> Result<Inquiry, RepositoryError> {
        let row = sqlx::query_as::<_, InquiryRow>(&format!(
            "INSERT INTO inquiries (name, email, phone, subject, message, is_read) \
             VALUES ($1, $2, $3, $4, $5, FALSE) \
             RETURNING {INQUIRY_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(draft.email.as_str())
        .bind(&draft.phone)
        .bind(&draft.subject)
        .bind(&draft.message)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Set the read flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the inquiry does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_read(&self, id: InquiryId, is_read: bool) -> Result<Inquiry, RepositoryError> {
        let row = sqlx::query_as::<_, InquiryRow>(&format!(
            "UPDATE inquiries SET is_read = $2 WHERE id = $1 RETURNING {INQUIRY_COLUMNS}"
        ))
        .bind(id)
        .bind(is_read)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the inquiry does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: InquiryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM inquiries WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of unread inquiries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn unread_count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inquiries WHERE NOT is_read")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM inquiries")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
