//! Staff login, logout and identity.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use hans_institute_core::{Capabilities, Email, Role, UserId};

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, StaffAccess, session_keys};
use crate::services::AuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in user as the admin panel sees them.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: UserId,
    pub email: Email,
    pub full_name: String,
    pub role: Option<Role>,
    pub is_active: bool,
    pub capabilities: Capabilities,
}

impl From<StaffAccess> for MeResponse {
    fn from(access: StaffAccess) -> Self {
        Self {
            capabilities: access.capabilities(),
            id: access.user_id,
            email: access.email,
            full_name: access.full_name,
            role: access.role,
            is_active: access.is_active,
        }
    }
}

/// Sign in with email and password.
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<MeResponse>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let (user, access) = AuthService::new(state.pool())
        .login_with_password(body.email.trim(), &body.password)
        .await?;

    set_current_user(&session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, role = ?access.role, "Staff signed in");

    Ok(Json(access.into()))
}

/// Sign out.
#[tracing::instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user with their current role and capabilities.
#[tracing::instrument(skip_all)]
pub async fn me(State(state): State<AppState>, session: Session) -> Result<Json<MeResponse>> {
    let user = session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;

    let access = UserRepository::new(state.pool())
        .access_for(user.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(access.into()))
}
