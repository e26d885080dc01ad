//! Admin activity log.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::db::ActivityRepository;
use crate::error::Result;
use crate::middleware::RequireSuperAdmin;
use crate::models::ActivityEntry;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// Most recent activity, newest first.
#[tracing::instrument(skip_all)]
pub async fn list(
    RequireSuperAdmin(_staff): RequireSuperAdmin,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    Ok(Json(
        ActivityRepository::new(state.pool())
            .list_recent(limit)
            .await?,
    ))
}
