//! Public content reads.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use hans_institute_core::NoticeKind;

use crate::db::{CourseRepository, FacultyRepository, FounderMessageRepository, NoticeRepository};
use crate::error::Result;
use crate::models::{Course, FacultyMember, FounderMessage, Notice};
use crate::state::AppState;

/// Query parameters for the notice board.
#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    #[serde(rename = "type")]
    pub kind: Option<NoticeKind>,
}

/// Active courses in display order.
#[tracing::instrument(skip_all)]
pub async fn courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>> {
    Ok(Json(CourseRepository::new(state.pool()).list_active().await?))
}

/// Active faculty in display order.
#[tracing::instrument(skip_all)]
pub async fn faculty(State(state): State<AppState>) -> Result<Json<Vec<FacultyMember>>> {
    Ok(Json(FacultyRepository::new(state.pool()).list_active().await?))
}

/// Active notices, newest first. `?type=news` or `?type=notice` filters.
#[tracing::instrument(skip_all)]
pub async fn notices(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Json<Vec<Notice>>> {
    Ok(Json(
        NoticeRepository::new(state.pool())
            .list_active(query.kind)
            .await?,
    ))
}

/// The newest active founder message, or `null`.
#[tracing::instrument(skip_all)]
pub async fn founder(State(state): State<AppState>) -> Result<Json<Option<FounderMessage>>> {
    Ok(Json(
        FounderMessageRepository::new(state.pool())
            .latest_active()
            .await?,
    ))
}
