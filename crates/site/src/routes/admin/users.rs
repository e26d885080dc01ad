//! Admin user management. Super admin only.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use hans_institute_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::Result;
use crate::middleware::RequireSuperAdmin;
use crate::models::StaffUser;
use crate::services::{CreateUserRequest, UpdateCredentialsRequest, UserService, record_activity};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub is_active: bool,
}

/// Every staff profile with its role.
#[tracing::instrument(skip_all)]
pub async fn list(
    RequireSuperAdmin(_staff): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<StaffUser>>> {
    Ok(Json(UserRepository::new(state.pool()).list_with_roles().await?))
}

#[tracing::instrument(skip_all)]
pub async fn create(
    RequireSuperAdmin(staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<StaffUser>)> {
    let user = UserService::new(state.pool()).create(body).await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "create_user",
        Some(json!({ "user_id": user.user_id, "email": user.email, "role": user.role })),
    )
    .await;
    Ok((StatusCode::CREATED, Json(user)))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn update_profile(
    RequireSuperAdmin(staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<StaffUser>> {
    let user = UserService::new(state.pool())
        .update_profile(user_id, &body.full_name)
        .await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "update_user_profile",
        Some(json!({ "user_id": user_id })),
    )
    .await;
    Ok(Json(user))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn update_credentials(
    RequireSuperAdmin(staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<UpdateCredentialsRequest>,
) -> Result<StatusCode> {
    let email_changed = body.email.as_deref().is_some_and(|e| !e.trim().is_empty());
    let password_changed = body.password.as_deref().is_some_and(|p| !p.is_empty());

    UserService::new(state.pool())
        .update_credentials(user_id, body)
        .await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "update_user_credentials",
        Some(json!({
            "user_id": user_id,
            "email_changed": email_changed,
            "password_changed": password_changed,
        })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn set_role(
    RequireSuperAdmin(staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<SetRoleRequest>,
) -> Result<StatusCode> {
    UserService::new(state.pool())
        .set_role(staff.user.id, user_id, Some(body.role))
        .await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "set_user_role",
        Some(json!({ "user_id": user_id, "role": body.role })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn remove_role(
    RequireSuperAdmin(staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode> {
    UserService::new(state.pool())
        .set_role(staff.user.id, user_id, None)
        .await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "remove_user_role",
        Some(json!({ "user_id": user_id })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn set_status(
    RequireSuperAdmin(staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<SetStatusRequest>,
) -> Result<StatusCode> {
    UserService::new(state.pool())
        .set_active(staff.user.id, user_id, body.is_active)
        .await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "set_user_status",
        Some(json!({ "user_id": user_id, "is_active": body.is_active })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn delete(
    RequireSuperAdmin(staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<StatusCode> {
    UserService::new(state.pool())
        .delete(staff.user.id, user_id)
        .await?;

    // The deleted user's own log rows cascade away; this entry belongs to the actor.
    record_activity(
        state.pool(),
        staff.user.id,
        "delete_user",
        Some(json!({ "user_id": user_id })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
