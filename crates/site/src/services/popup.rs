//! Notice popup over HTTP.
//!
//! Each visitor's dismissal record and popup queue live in their cookie
//! session. A page load starts a fresh queue; "next" and "dismiss all"
//! resume it from the session.

use std::time::Duration;

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::Session;

use hans_institute_core::popup::{
    Clock, KeyValueStore, PopupEngine, PopupNotice, PopupSnapshot, PopupState, StoreError,
};

use crate::db::{NoticeRepository, RepositoryError};
use crate::models::session_keys;

/// Errors from driving the popup.
#[derive(Debug, Error)]
pub enum PopupError {
    /// Eligible notices could not be loaded.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The visitor's session could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// [`KeyValueStore`] backed by the visitor's session.
#[derive(Clone)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

fn backend(e: &tower_sessions::session::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl KeyValueStore for SessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.session.get::<String>(key).await.map_err(|e| backend(&e))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.session.insert(key, value).await.map_err(|e| backend(&e))
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.session
            .remove::<String>(key)
            .await
            .map(|_| ())
            .map_err(|e| backend(&e))
    }
}

/// What the client renders.
#[derive(Debug, Clone, Serialize)]
pub struct PopupView {
    #[serde(flatten)]
    pub state: PopupState,
    /// The notice on screen, if any.
    pub notice: Option<PopupNotice>,
    /// 1-based position of `notice` in the queue, 0 when hidden.
    pub position: usize,
    pub total: usize,
    /// How long the client waits before showing the popup.
    pub delay_ms: u64,
}

impl PopupView {
    fn of<S: KeyValueStore, C: Clock>(engine: &PopupEngine<S, C>, delay: Duration) -> Self {
        let position = match engine.state() {
            PopupState::Showing { index } => index + 1,
            PopupState::Hidden => 0,
        };
        Self {
            state: engine.state(),
            notice: engine.current().cloned(),
            position,
            total: engine.notices().len(),
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

async fn save_snapshot(session: &Session, snapshot: &PopupSnapshot) -> Result<(), StoreError> {
    session
        .insert(session_keys::POPUP, snapshot)
        .await
        .map_err(|e| backend(&e))
}

async fn load_snapshot(session: &Session) -> Result<PopupSnapshot, StoreError> {
    Ok(session
        .get::<PopupSnapshot>(session_keys::POPUP)
        .await
        .map_err(|e| backend(&e))?
        .unwrap_or_default())
}

/// Start the popup for a page load.
///
/// # Errors
///
/// Returns `PopupError::Repository` if notices cannot be loaded and
/// `PopupError::Store` if the session cannot be written.
pub async fn open<C: Clock>(pool: &PgPool, session: &Session, clock: C) -> Result<PopupView, PopupError> {
    let eligible: Vec<PopupNotice> = NoticeRepository::new(pool)
        .list_popup_eligible()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(start(session, clock, eligible).await?)
}

/// Queue `eligible` for this visit and save the queue in the session.
///
/// An empty queue reports no delay.
async fn start<C: Clock>(
    session: &Session,
    clock: C,
    eligible: Vec<PopupNotice>,
) -> Result<PopupView, StoreError> {
    let mut engine = PopupEngine::new(SessionStore::new(session.clone()), clock);
    let delay = engine.load(eligible).await;
    engine.reveal();

    save_snapshot(session, &engine.snapshot()).await?;
    Ok(PopupView::of(&engine, delay.unwrap_or(Duration::ZERO)))
}

/// Dismiss the notice on screen and move on.
///
/// The queue advances even if recording the dismissal fails; the failure is
/// still returned.
///
/// # Errors
///
/// Returns `PopupError::Store` if the session cannot be read or written.
pub async fn next<C: Clock>(session: &Session, clock: C, dont_show_today: bool) -> Result<PopupView, PopupError> {
    let snapshot = load_snapshot(session).await?;
    let mut engine = PopupEngine::resume(SessionStore::new(session.clone()), clock, snapshot);

    let dismissed = engine.dismiss_current(dont_show_today).await;
    save_snapshot(session, &engine.snapshot()).await?;
    dismissed?;

    Ok(PopupView::of(&engine, Duration::ZERO))
}

/// Close the popup, dismissing every queued notice.
///
/// # Errors
///
/// Returns `PopupError::Store` if the session cannot be read or written.
pub async fn dismiss_all<C: Clock>(
    session: &Session,
    clock: C,
    dont_show_today: bool,
) -> Result<PopupView, PopupError> {
    let snapshot = load_snapshot(session).await?;
    let mut engine = PopupEngine::resume(SessionStore::new(session.clone()), clock, snapshot);

    let dismissed = engine.dismiss_all(dont_show_today).await;
    save_snapshot(session, &engine.snapshot()).await?;
    dismissed?;

    Ok(PopupView::of(&engine, Duration::ZERO))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};
    use hans_institute_core::popup::{DISMISSED_NOTICES_KEY, FixedClock, MemoryStore};
    use hans_institute_core::{NoticeId, Priority};

    use super::*;

    fn notice(title: &str) -> PopupNotice {
        notice_with(title, Priority::Urgent)
    }

    fn notice_with(title: &str, priority: Priority) -> PopupNotice {
        PopupNotice {
            id: NoticeId::generate(),
            title: title.to_owned(),
            content: String::new(),
            priority,
            created_at: Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap(),
        }
    }

    fn visitor_session() -> Session {
        Session::new(None, Arc::new(tower_sessions::MemoryStore::default()), None)
    }

    fn on_day() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    fn title(view: &PopupView) -> Option<&str> {
        view.notice.as_ref().map(|n| n.title.as_str())
    }

    #[tokio::test]
    async fn test_session_store_get_set_remove() {
        let store = SessionStore::new(visitor_session());
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v".to_owned()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_dont_show_today_survives_reload_through_session() {
        let session = visitor_session();
        let eligible = vec![
            notice_with("B", Priority::Important),
            notice_with("A", Priority::Urgent),
        ];

        let view = start(&session, on_day(), eligible.clone()).await.unwrap();
        assert_eq!(title(&view), Some("A"));
        assert_eq!((view.position, view.total), (1, 2));
        assert_eq!(view.delay_ms, 1000);

        let view = next(&session, on_day(), true).await.unwrap();
        assert_eq!(title(&view), Some("B"));
        assert_eq!((view.position, view.total), (2, 2));

        let view = dismiss_all(&session, on_day(), false).await.unwrap();
        assert_eq!(view.state, PopupState::Hidden);
        assert!(view.notice.is_none());

        let stored = session.get::<String>(DISMISSED_NOTICES_KEY).await.unwrap();
        assert!(stored.is_some_and(|record| record.contains("2026-10-18")));

        let reload = start(&session, on_day(), eligible).await.unwrap();
        assert_eq!(title(&reload), Some("B"));
        assert_eq!(reload.total, 1);
    }

    #[tokio::test]
    async fn test_next_without_open_is_hidden() {
        let session = visitor_session();
        let view = next(&session, on_day(), true).await.unwrap();
        assert_eq!(view.state, PopupState::Hidden);
        assert_eq!(view.total, 0);
    }

    #[tokio::test]
    async fn test_empty_queue_reports_no_delay() {
        let view = start(&visitor_session(), on_day(), Vec::new()).await.unwrap();
        assert_eq!(view.state, PopupState::Hidden);
        assert_eq!(view.delay_ms, 0);
    }

    #[tokio::test]
    async fn test_view_positions_are_one_based() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let mut engine = PopupEngine::new(MemoryStore::new(), clock);
        let delay = engine.load(vec![notice("A"), notice("B")]).await;
        engine.reveal();

        let view = PopupView::of(&engine, delay.unwrap());
        assert_eq!(view.position, 1);
        assert_eq!(view.total, 2);
        assert_eq!(view.delay_ms, 1000);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "showing");
        assert_eq!(json["index"], 0);
        assert_eq!(json["notice"]["title"], "A");
    }

    #[tokio::test]
    async fn test_hidden_view_has_no_notice() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        let engine = PopupEngine::new(MemoryStore::new(), clock);

        let view = PopupView::of(&engine, Duration::ZERO);
        assert_eq!(view.position, 0);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["state"], "hidden");
        assert!(json["notice"].is_null());
    }
}
