//! Faculty repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hans_institute_core::FacultyId;

use super::RepositoryError;
use crate::models::{FacultyInput, FacultyMember};

const FACULTY_COLUMNS: &str = "id, name, designation, qualification, specialization, image, \
                               display_order, is_active, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct FacultyRow {
    id: FacultyId,
    name: String,
    designation: String,
    qualification: String,
    specialization: String,
    image: Option<String>,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FacultyRow> for FacultyMember {
    fn from(row: FacultyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            designation: row.designation,
            qualification: row.qualification,
            specialization: row.specialization,
            image: row.image,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for faculty database operations.
pub struct FacultyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> FacultyRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active faculty members in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<FacultyMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, FacultyRow>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty WHERE is_active \
             ORDER BY display_order, created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every faculty member, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<FacultyMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, FacultyRow>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: FacultyId) -> Result<Option<FacultyMember>, RepositoryError> {
        let row = sqlx::query_as::<_, FacultyRow>(&format!(
            "SELECT {FACULTY_COLUMNS} FROM faculty WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &FacultyInput) -> Result<FacultyMember, RepositoryError> {
        let row = sqlx::query_as::<_, FacultyRow>(&format!(
            "INSERT INTO faculty \
                 (name, designation, qualification, specialization, image, display_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {FACULTY_COLUMNS}"
        ))
        .bind(&input.name)
        .bind(&input.designation)
        .bind(&input.qualification)
        .bind(&input.specialization)
        .bind(&input.image)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the member does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: FacultyId,
        input: &FacultyInput,
    ) -> Result<FacultyMember, RepositoryError> {
        let row = sqlx::query_as::<_, FacultyRow>(&format!(
            "UPDATE faculty SET \
                 name = $2, designation = $3, qualification = $4, specialization = $5, \
                 image = $6, display_order = $7, is_active = $8, updated_at = now() \
             WHERE id = $1 \
             RETURNING {FACULTY_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.designation)
        .bind(&input.qualification)
        .bind(&input.specialization)
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
    /// Returns `RepositoryError::NotFound` if the member does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: FacultyId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM faculty WHERE id = $1")
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
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM faculty")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
