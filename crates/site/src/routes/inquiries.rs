//! Public contact form.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::{Value, json};

use hans_institute_core::inquiry::ContactSubmission;

use crate::db::{InquiryRepository, UserRepository};
use crate::error::Result;
use crate::services::{IntakeService, SmtpNotifier};
use crate::state::AppState;

/// Accept a contact form submission.
///
/// Returns `201 {success: true, id}`, or `422 {success: false, errors}`
/// with one message per invalid field. A body that is not a JSON object
/// is a `400 {error}`.
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(submission) = payload?;
    let intake = IntakeService::new(
        InquiryRepository::new(state.pool()),
        UserRepository::new(state.pool()),
        SmtpNotifier(state.email()),
    );

    let receipt = intake.submit(&submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "id": receipt.id })),
    ))
}
