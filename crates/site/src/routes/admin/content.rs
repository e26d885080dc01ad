//! Admin CRUD for site content.
//!
//! Every resource has the same four handlers. Listing needs any staff role,
//! create/update need `edit` and delete needs `delete`. Writes are recorded
//! in the activity log.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;

use hans_institute_core::{Capability, CourseId, FacultyId, FounderMessageId, NoticeId};

use crate::db::{CourseRepository, FacultyRepository, FounderMessageRepository, NoticeRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::models::{
    Course, CourseInput, FacultyInput, FacultyMember, FounderMessage, FounderMessageInput, Notice,
    NoticeInput,
};
use crate::services::record_activity;
use crate::state::AppState;

macro_rules! content_handlers {
    ($module:ident, $repo:ident, $id:ty, $input:ty, $model:ty, $resource:literal) => {
        pub mod $module {
            use super::*;

            #[tracing::instrument(skip_all)]
            pub async fn list(
                RequireStaff(_staff): RequireStaff,
                State(state): State<AppState>,
            ) -> Result<Json<Vec<$model>>> {
                Ok(Json($repo::new(state.pool()).list_all().await?))
            }

            #[tracing::instrument(skip_all)]
            pub async fn create(
                RequireStaff(staff): RequireStaff,
                State(state): State<AppState>,
                Json(input): Json<$input>,
            ) -> Result<(StatusCode, Json<$model>)> {
                staff.require(Capability::Edit)?;
                let input = input.normalized().map_err(AppError::BadRequest)?;

                let created = $repo::new(state.pool()).create(&input).await?;

                record_activity(
                    state.pool(),
                    staff.user.id,
                    concat!("create_", $resource),
                    Some(json!({ "id": created.id })),
                )
                .await;
                Ok((StatusCode::CREATED, Json(created)))
            }

            #[tracing::instrument(skip_all, fields(id = %id))]
            pub async fn update(
                RequireStaff(staff): RequireStaff,
                State(state): State<AppState>,
                Path(id): Path<$id>,
                Json(input): Json<$input>,
            ) -> Result<Json<$model>> {
                staff.require(Capability::Edit)?;
                let input = input.normalized().map_err(AppError::BadRequest)?;

                let updated = $repo::new(state.pool()).update(id, &input).await?;

                record_activity(
                    state.pool(),
                    staff.user.id,
                    concat!("update_", $resource),
                    Some(json!({ "id": id })),
                )
                .await;
                Ok(Json(updated))
            }

            #[tracing::instrument(skip_all, fields(id = %id))]
            pub async fn delete(
                RequireStaff(staff): RequireStaff,
                State(state): State<AppState>,
                Path(id): Path<$id>,
            ) -> Result<StatusCode> {
                staff.require(Capability::Delete)?;

                $repo::new(state.pool()).delete(id).await?;

                record_activity(
                    state.pool(),
                    staff.user.id,
                    concat!("delete_", $resource),
                    Some(json!({ "id": id })),
                )
                .await;
                Ok(StatusCode::NO_CONTENT)
            }
        }
    };
}

content_handlers!(courses, CourseRepository, CourseId, CourseInput, Course, "course");
content_handlers!(faculty, FacultyRepository, FacultyId, FacultyInput, FacultyMember, "faculty");
content_handlers!(notices, NoticeRepository, NoticeId, NoticeInput, Notice, "notice");
content_handlers!(
    founders,
    FounderMessageRepository,
    FounderMessageId,
    FounderMessageInput,
    FounderMessage,
    "founder_message"
);
