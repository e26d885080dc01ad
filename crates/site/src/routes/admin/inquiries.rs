//! Admin inquiry inbox.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use hans_institute_core::{Capability, InquiryId};

use crate::db::InquiryRepository;
use crate::error::Result;
use crate::middleware::RequireStaff;
use crate::models::Inquiry;
use crate::services::record_activity;
use crate::state::AppState;

/// Every inquiry, newest first.
#[tracing::instrument(skip_all)]
pub async fn list(
    RequireStaff(_staff): RequireStaff,
    State(state): State<AppState>,
) -> Result<Json<Vec<Inquiry>>> {
    Ok(Json(InquiryRepository::new(state.pool()).list_all().await?))
}

/// Mark an inquiry as read.
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn mark_read(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<InquiryId>,
) -> Result<Json<Inquiry>> {
    staff.require(Capability::Edit)?;

    let inquiry = InquiryRepository::new(state.pool())
        .set_read(id, true)
        .await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "mark_inquiry_read",
        Some(json!({ "id": id })),
    )
    .await;
    Ok(Json(inquiry))
}

#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn delete(
    RequireStaff(staff): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<InquiryId>,
) -> Result<StatusCode> {
    staff.require(Capability::Delete)?;

    InquiryRepository::new(state.pool()).delete(id).await?;

    record_activity(
        state.pool(),
        staff.user.id,
        "delete_inquiry",
        Some(json!({ "id": id })),
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
