//! Activity log repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use hans_institute_core::{ActivityId, UserId};

use super::RepositoryError;
use crate::models::ActivityEntry;

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: ActivityId,
    user_id: UserId,
    actor_email: Option<String>,
    action: String,
    details: Option<Json<serde_json::Value>>,
    created_at: DateTime<Utc>,
}

impl From<ActivityRow> for ActivityEntry {
    fn from(row: ActivityRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            actor_email: row.actor_email,
            action: row.action,
            details: row.details.map(|Json(v)| v),
            created_at: row.created_at,
        }
    }
}

/// Repository for the admin activity log.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn record(
        &self,
        user_id: UserId,
        action: &str,
        details: Option<&serde_json::Value>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO user_activity_log (user_id, action, details) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(action)
            .bind(details.map(Json))
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Most recent entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            "SELECT a.id, a.user_id, u.email AS actor_email, a.action, a.details, a.created_at \
             FROM user_activity_log a \
             LEFT JOIN users u ON u.id = a.user_id \
             ORDER BY a.created_at DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
