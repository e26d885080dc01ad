//! Notice popup endpoints.
//!
//! `GET /api/popup` starts the queue on page load. The client waits
//! `delay_ms` before showing it, then calls `next` or `dismiss-all`.

use axum::{Json, extract::State};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::Result;
use crate::services::popup::{self, PopupView};
use crate::state::AppState;

/// Body of a dismissal.
#[derive(Debug, Default, Deserialize)]
pub struct DismissRequest {
    #[serde(default)]
    pub dont_show_today: bool,
}

#[tracing::instrument(skip_all)]
pub async fn open(State(state): State<AppState>, session: Session) -> Result<Json<PopupView>> {
    Ok(Json(popup::open(state.pool(), &session, state.clock()).await?))
}

#[tracing::instrument(skip_all, fields(dont_show_today = body.dont_show_today))]
pub async fn next(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<DismissRequest>,
) -> Result<Json<PopupView>> {
    Ok(Json(
        popup::next(&session, state.clock(), body.dont_show_today).await?,
    ))
}

#[tracing::instrument(skip_all, fields(dont_show_today = body.dont_show_today))]
pub async fn dismiss_all(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<DismissRequest>,
) -> Result<Json<PopupView>> {
    Ok(Json(
        popup::dismiss_all(&session, state.clock(), body.dont_show_today).await?,
    ))
}
