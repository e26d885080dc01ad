//! Course repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hans_institute_core::CourseId;

use super::RepositoryError;
use crate::models::{Course, CourseInput};

const COURSE_COLUMNS: &str = "id, title, description, duration, level, image, price, \
                              display_order, is_active, created_at, updated_at";

/// Internal row type for course queries.
#[derive(Debug, sqlx::FromRow)]
struct CourseRow {
    id: CourseId,
    title: String,
    description: String,
    duration: String,
    level: String,
    image: Option<String>,
    price: Option<String>,
    display_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            duration: row.duration,
            level: row.level,
            image: row.image,
            price: row.price,
            display_order: row.display_order,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for course database operations.
pub struct CourseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CourseRepository<'a> {
    /// Create a new course repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Active courses in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<Course>, RepositoryError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_active \
             ORDER BY display_order, created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every course, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Course>, RepositoryError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a course by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CourseId) -> Result<Option<Course>, RepositoryError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert a course and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, input: &CourseInput) -> Result<Course, RepositoryError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "INSERT INTO courses \
                 (title, description, duration, level, image, price, display_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.duration)
        .bind(&input.level)
        .bind(&input.image)
        .bind(&input.price)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Replace the editable fields of a course.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the course does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(&self, id: CourseId, input: &CourseInput) -> Result<Course, RepositoryError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "UPDATE courses SET \
                 title = $2, description = $3, duration = $4, level = $5, image = $6, \
                 price = $7, display_order = $8, is_active = $9, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.duration)
        .bind(&input.level)
        .bind(&input.image)
        .bind(&input.price)
        .bind(input.display_order)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete a course.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the course does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CourseId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Number of courses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
