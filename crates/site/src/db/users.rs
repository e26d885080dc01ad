//! Staff user repository.
//!
//! A staff user spans three tables: `users` (login), `profiles` (name and
//! active flag) and `user_roles` (at most one role). Multi-table writes run
//! in a transaction.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hans_institute_core::{Email, ProfileId, Role, UserId};

use super::{RepositoryError, conflict_on_unique, parse_stored_email};
use crate::models::{StaffAccess, StaffUser};

const STAFF_SELECT: &str = "SELECT p.user_id, p.id AS profile_id, p.full_name, p.email, \
                                   p.is_active, r.role, p.created_at, p.updated_at \
                            FROM profiles p \
                            LEFT JOIN user_roles r ON r.user_id = p.user_id";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    user_id: UserId,
    profile_id: ProfileId,
    full_name: String,
    email: String,
    is_active: bool,
    role: Option<Role>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StaffRow> for StaffUser {
    type Error = RepositoryError;

    fn try_from(row: StaffRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            profile_id: row.profile_id,
            full_name: row.full_name,
            email: parse_stored_email(&row.email)?,
            is_active: row.is_active,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AccessRow {
    user_id: UserId,
    email: String,
    full_name: Option<String>,
    is_active: Option<bool>,
    role: Option<Role>,
}

impl TryFrom<AccessRow> for StaffAccess {
    type Error = RepositoryError;

    fn try_from(row: AccessRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            email: parse_stored_email(&row.email)?,
            full_name: row.full_name.unwrap_or_default(),
            // No profile means no access
            is_active: row.is_active.unwrap_or(false),
            role: row.role,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LoginRow {
    id: UserId,
    email: String,
    password_hash: String,
}

/// Fields for creating a staff user.
#[derive(Debug, Clone)]
pub struct NewStaffUser<'a> {
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub full_name: &'a str,
    pub role: Option<Role>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for staff user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All profiles with their role, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list_with_roles(&self) -> Result<Vec<StaffUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, StaffRow>(&format!(
            "{STAFF_SELECT} ORDER BY p.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get one staff user by user ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<StaffUser>, RepositoryError> {
        let row = sqlx::query_as::<_, StaffRow>(&format!("{STAFF_SELECT} WHERE p.user_id = $1"))
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create the login account, an active profile and the role together.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_profile(
        &self,
        new_user: &NewStaffUser<'_>,
    ) -> Result<StaffUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let (user_id,): (UserId,) = sqlx::query_as(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(new_user.email.as_str())
        .bind(new_user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        sqlx::query("INSERT INTO profiles (user_id, full_name, email, is_active) VALUES ($1, $2, $3, TRUE)")
            .bind(user_id)
            .bind(new_user.full_name)
            .bind(new_user.email.as_str())
            .execute(&mut *tx)
            .await?;

        if let Some(role) = new_user.role {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(user_id)
                .bind(role)
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, StaffRow>(&format!("{STAFF_SELECT} WHERE p.user_id = $1"))
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Change a user's display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        full_name: &str,
    ) -> Result<StaffUser, RepositoryError> {
        let result = sqlx::query(
            "UPDATE profiles SET full_name = $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(full_name)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(user_id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Change login email and/or password hash. The profile email follows
    /// the login email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    pub async fn update_credentials(
        &self,
        user_id: UserId,
        email: Option<&Email>,
        password_hash: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 password_hash = COALESCE($3, password_hash) \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(email.map(Email::as_str))
        .bind(password_hash)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "email"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        if let Some(email) = email {
            sqlx::query("UPDATE profiles SET email = $2, updated_at = now() WHERE user_id = $1")
                .bind(user_id)
                .bind(email.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Replace the user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_role(&self, user_id: UserId, role: Role) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    RepositoryError::NotFound
                }
                other => RepositoryError::Database(other),
            })?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove the user's role, revoking all access.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_role(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Activate or deactivate a user's profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile does not exist.
    pub async fn set_active(&self, user_id: UserId, is_active: bool) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE profiles SET is_active = $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(is_active)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete the account. Profile, role and activity rows cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete(&self, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Emails of active profiles holding `admin` or `super_admin`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_staff_emails(&self) -> Result<Vec<Email>, RepositoryError> {
        let rows: Vec<(String, Role)> = sqlx::query_as(
            "SELECT p.email, r.role \
             FROM profiles p \
             JOIN user_roles r ON r.user_id = p.user_id \
             WHERE p.is_active AND r.role IN ('admin', 'super_admin') \
             ORDER BY p.created_at",
        )
        .fetch_all(self.pool)
        .await?;

        let mut emails = Vec::with_capacity(rows.len());
        for (raw, role) in rows {
            if !role.receives_inquiry_alerts() {
                continue;
            }
            match Email::parse(&raw) {
                Ok(email) => emails.push(email),
                Err(e) => tracing::warn!(email = %raw, error = %e, "Skipping invalid staff email"),
            }
        }
        Ok(emails)
    }

    /// Current role and active flag for a signed-in user.
    ///
    /// Returns `None` if the account no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn access_for(&self, user_id: UserId) -> Result<Option<StaffAccess>, RepositoryError> {
        let row = sqlx::query_as::<_, AccessRow>(
            "SELECT u.id AS user_id, u.email, p.full_name, p.is_active, r.role \
             FROM users u \
             LEFT JOIN profiles p ON p.user_id = u.id \
             LEFT JOIN user_roles r ON r.user_id = u.id \
             WHERE u.id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look up the login record for an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, Email, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, LoginRow>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| Ok((r.id, parse_stored_email(&r.email)?, r.password_hash)))
            .transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_id_by_email(&self, email: &Email) -> Result<Option<UserId>, RepositoryError> {
        let row: Option<(UserId,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(|(id,)| id))
    }

    /// Number of profiles.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
