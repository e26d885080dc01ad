//! The notice popup state machine.
//!
//! ```text
//!            load (non-empty)          reveal
//!  Hidden ──────────────────▶ pending ─────────▶ Showing(0)
//!                                                    │ dismiss current
//!                                                    ▼
//!                                  Showing(i+1) ◀── i < len-1 ?
//!                                                    │ otherwise / dismiss all
//!                                                    ▼
//!                                                  Hidden
//! ```
//!
//! `load` filters out notices dismissed today and orders the rest; the caller
//! waits [`PRESENTATION_DELAY`] and then calls [`PopupEngine::reveal`].

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::store::{DismissalLedger, KeyValueStore, StoreError};
use crate::types::{NoticeId, Priority, presentation_order};

/// Delay between page load and showing the first popup.
pub const PRESENTATION_DELAY: Duration = Duration::from_millis(1000);

/// The fields of a notice that the popup presents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupNotice {
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
}

/// Visible state of the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PopupState {
    #[default]
    Hidden,
    Showing {
        index: usize,
    },
}

/// Serializable engine state, for carrying a popup across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupSnapshot {
    pub notices: Vec<PopupNotice>,
    pub state: PopupState,
    pub pending_reveal: bool,
}

/// Drives which notice is on screen and records dismissals.
pub struct PopupEngine<S, C> {
    ledger: DismissalLedger<S>,
    clock: C,
    notices: Vec<PopupNotice>,
    state: PopupState,
    pending_reveal: bool,
}

impl<S: KeyValueStore, C: Clock> PopupEngine<S, C> {
    /// Create an engine in the initial `Hidden` state.
    pub const fn new(store: S, clock: C) -> Self {
        Self {
            ledger: DismissalLedger::new(store),
            clock,
            notices: Vec::new(),
            state: PopupState::Hidden,
            pending_reveal: false,
        }
    }

    /// Rebuild an engine from a snapshot taken earlier in the same visit.
    pub fn resume(store: S, clock: C, snapshot: PopupSnapshot) -> Self {
        let mut engine = Self::new(store, clock);
        engine.notices = snapshot.notices;
        engine.pending_reveal = snapshot.pending_reveal && !engine.notices.is_empty();
        engine.state = match snapshot.state {
            PopupState::Showing { index } if index < engine.notices.len() => snapshot.state,
            _ => PopupState::Hidden,
        };
        engine
    }

    #[must_use]
    pub fn snapshot(&self) -> PopupSnapshot {
        PopupSnapshot {
            notices: self.notices.clone(),
            state: self.state,
            pending_reveal: self.pending_reveal,
        }
    }

    #[must_use]
    pub const fn state(&self) -> PopupState {
        self.state
    }

    /// The queue of notices loaded for this visit.
    #[must_use]
    pub fn notices(&self) -> &[PopupNotice] {
        &self.notices
    }

    /// The notice currently on screen.
    #[must_use]
    pub fn current(&self) -> Option<&PopupNotice> {
        match self.state {
            PopupState::Showing { index } => self.notices.get(index),
            PopupState::Hidden => None,
        }
    }

    /// Whether the current notice is the last one in the queue.
    #[must_use]
    pub fn is_last(&self) -> bool {
        match self.state {
            PopupState::Showing { index } => index + 1 >= self.notices.len(),
            PopupState::Hidden => true,
        }
    }

    /// Load the eligible notices for this visit.
    ///
    /// Notices dismissed today are removed and the remainder is ordered by
    /// priority, then newest first. Returns the delay to wait before calling
    /// [`Self::reveal`], or `None` when there is nothing to show.
    ///
    /// An unreadable dismissal store is treated as "nothing dismissed".
    pub async fn load(&mut self, eligible: Vec<PopupNotice>) -> Option<Duration> {
        let today = self.clock.today();
        let dismissed = match self.ledger.dismissed_on(today).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read dismissed notices");
                Default::default()
            }
        };

        let mut notices: Vec<PopupNotice> = eligible
            .into_iter()
            .filter(|n| !dismissed.contains(&n.id))
            .collect();
        notices.sort_by(|a, b| presentation_order((a.priority, a.created_at), (b.priority, b.created_at)));

        self.notices = notices;
        self.state = PopupState::Hidden;
        self.pending_reveal = !self.notices.is_empty();

        self.pending_reveal.then_some(PRESENTATION_DELAY)
    }

    /// Show the first notice once the presentation delay has elapsed.
    pub const fn reveal(&mut self) -> PopupState {
        if self.pending_reveal {
            self.pending_reveal = false;
            self.state = PopupState::Showing { index: 0 };
        }
        self.state
    }

    /// Dismiss the notice on screen and advance to the next one.
    ///
    /// With `dont_show_today`, the notice is added to today's dismissal
    /// record first. The state advances even if persisting fails.
    ///
    /// # Errors
    ///
    /// Returns the store error after advancing, if the record could not be
    /// written.
    pub async fn dismiss_current(&mut self, dont_show_today: bool) -> Result<PopupState, StoreError> {
        let PopupState::Showing { index } = self.state else {
            return Ok(self.state);
        };

        let persisted = match self.notices.get(index) {
            Some(notice) if dont_show_today => {
                let today = self.clock.today();
                self.ledger.dismiss(today, [notice.id]).await
            }
            _ => Ok(()),
        };

        self.state = if index + 1 < self.notices.len() {
            PopupState::Showing { index: index + 1 }
        } else {
            PopupState::Hidden
        };

        persisted.map(|()| self.state)
    }

    /// Close the popup for the rest of this visit.
    ///
    /// With `dont_show_today`, every notice loaded for this visit is added
    /// to today's dismissal record.
    ///
    /// # Errors
    ///
    /// Returns the store error after hiding, if the record could not be
    /// written.
    pub async fn dismiss_all(&mut self, dont_show_today: bool) -> Result<PopupState, StoreError> {
        let persisted = if dont_show_today && !self.notices.is_empty() {
            let today = self.clock.today();
            let ids: Vec<NoticeId> = self.notices.iter().map(|n| n.id).collect();
            self.ledger.dismiss(today, ids).await
        } else {
            Ok(())
        };

        self.state = PopupState::Hidden;
        self.pending_reveal = false;

        persisted.map(|()| self.state)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone};

    use super::*;
    use crate::popup::clock::FixedClock;
    use crate::popup::store::{DISMISSED_NOTICES_KEY, MemoryStore};

    fn today() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    fn notice(title: &str, priority: Priority, day: u32) -> PopupNotice {
        PopupNotice {
            id: NoticeId::generate(),
            title: title.to_owned(),
            content: format!("{title} body"),
            priority,
            created_at: Utc.with_ymd_and_hms(2026, 10, day, 9, 0, 0).unwrap(),
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Backend("offline".to_owned()))
        }

        async fn set(&self, _key: &str, _value: String) -> Result<(), StoreError> {
            Err(StoreError::Backend("offline".to_owned()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Backend("offline".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_starts_hidden() {
        let engine = PopupEngine::new(MemoryStore::new(), today());
        assert_eq!(engine.state(), PopupState::Hidden);
        assert!(engine.current().is_none());
    }

    #[tokio::test]
    async fn test_empty_load_stays_hidden() {
        let mut engine = PopupEngine::new(MemoryStore::new(), today());
        assert_eq!(engine.load(Vec::new()).await, None);
        assert_eq!(engine.reveal(), PopupState::Hidden);
    }

    #[tokio::test]
    async fn test_load_orders_by_priority_then_recency() {
        let mut engine = PopupEngine::new(MemoryStore::new(), today());
        let regular = notice("regular", Priority::Regular, 17);
        let old_urgent = notice("old urgent", Priority::Urgent, 1);
        let new_urgent = notice("new urgent", Priority::Urgent, 10);
        let important = notice("important", Priority::Important, 15);

        let delay = engine
            .load(vec![regular, old_urgent, important, new_urgent])
            .await;
        assert_eq!(delay, Some(PRESENTATION_DELAY));

        let titles: Vec<&str> = engine.notices().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["new urgent", "old urgent", "important", "regular"]);
    }

    #[tokio::test]
    async fn test_nothing_shown_before_reveal() {
        let mut engine = PopupEngine::new(MemoryStore::new(), today());
        engine.load(vec![notice("a", Priority::Urgent, 1)]).await;

        assert_eq!(engine.state(), PopupState::Hidden);
        assert_eq!(engine.reveal(), PopupState::Showing { index: 0 });
        // A second reveal is a no-op
        assert_eq!(engine.reveal(), PopupState::Showing { index: 0 });
    }

    #[tokio::test]
    async fn test_two_notices_without_checkbox_come_back_on_reload() {
        let store = MemoryStore::new();
        let a = notice("A", Priority::Urgent, 1);
        let b = notice("B", Priority::Important, 2);

        let mut engine = PopupEngine::new(&store, today());
        engine.load(vec![b.clone(), a.clone()]).await;
        engine.reveal();
        assert_eq!(engine.current(), Some(&a));
        assert!(!engine.is_last());

        let state = engine.dismiss_current(false).await.unwrap();
        assert_eq!(state, PopupState::Showing { index: 1 });
        assert_eq!(engine.current(), Some(&b));
        assert!(engine.is_last());

        let state = engine.dismiss_current(false).await.unwrap();
        assert_eq!(state, PopupState::Hidden);

        // Reload: both shown again
        let mut reloaded = PopupEngine::new(&store, today());
        reloaded.load(vec![a.clone(), b.clone()]).await;
        assert_eq!(reloaded.notices(), [a, b]);
        assert_eq!(store.raw(DISMISSED_NOTICES_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_dont_show_today_excludes_on_reload() {
        let store = MemoryStore::new();
        let n = notice("N", Priority::Regular, 3);
        let other = notice("other", Priority::Regular, 2);

        let mut engine = PopupEngine::new(&store, today());
        engine.load(vec![n.clone(), other.clone()]).await;
        engine.reveal();
        assert_eq!(engine.current(), Some(&n));
        engine.dismiss_current(true).await.unwrap();

        let mut reloaded = PopupEngine::new(&store, today());
        reloaded.load(vec![n, other.clone()]).await;
        assert_eq!(reloaded.notices(), [other]);
    }

    #[tokio::test]
    async fn test_dismissal_expires_the_next_day() {
        let store = MemoryStore::new();
        let n = notice("N", Priority::Regular, 3);

        let mut engine = PopupEngine::new(&store, today());
        engine.load(vec![n.clone()]).await;
        engine.reveal();
        engine.dismiss_current(true).await.unwrap();

        let tomorrow = FixedClock(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        let mut next_day = PopupEngine::new(&store, tomorrow);
        next_day.load(vec![n.clone()]).await;
        assert_eq!(next_day.notices(), [n]);
        assert_eq!(store.raw(DISMISSED_NOTICES_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_dismiss_all_with_checkbox_persists_every_notice() {
        let store = MemoryStore::new();
        let a = notice("A", Priority::Urgent, 1);
        let b = notice("B", Priority::Important, 2);
        let c = notice("C", Priority::Regular, 3);

        let mut engine = PopupEngine::new(&store, today());
        engine.load(vec![a.clone(), b.clone(), c.clone()]).await;
        engine.reveal();

        assert_eq!(engine.dismiss_all(true).await.unwrap(), PopupState::Hidden);

        let mut reloaded = PopupEngine::new(&store, today());
        assert_eq!(reloaded.load(vec![a, b, c]).await, None);
    }

    #[tokio::test]
    async fn test_dismiss_all_keeps_earlier_dismissals() {
        let store = MemoryStore::new();
        let a = notice("A", Priority::Urgent, 1);
        let b = notice("B", Priority::Important, 2);

        let mut first = PopupEngine::new(&store, today());
        first.load(vec![a.clone(), b.clone()]).await;
        first.reveal();
        first.dismiss_current(true).await.unwrap();

        let mut second = PopupEngine::new(&store, today());
        second.load(vec![a.clone(), b.clone()]).await;
        second.reveal();
        second.dismiss_all(true).await.unwrap();

        let mut third = PopupEngine::new(&store, today());
        assert_eq!(third.load(vec![a, b]).await, None);
    }

    #[tokio::test]
    async fn test_dismiss_all_without_checkbox_only_hides() {
        let store = MemoryStore::new();
        let a = notice("A", Priority::Urgent, 1);

        let mut engine = PopupEngine::new(&store, today());
        engine.load(vec![a.clone()]).await;
        engine.reveal();
        assert_eq!(engine.dismiss_all(false).await.unwrap(), PopupState::Hidden);

        let mut reloaded = PopupEngine::new(&store, today());
        reloaded.load(vec![a]).await;
        assert_eq!(reloaded.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_dismiss_while_hidden_is_a_no_op() {
        let store = MemoryStore::new();
        let mut engine = PopupEngine::new(&store, today());
        assert_eq!(
            engine.dismiss_current(true).await.unwrap(),
            PopupState::Hidden
        );
        assert_eq!(store.raw(DISMISSED_NOTICES_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_failure_still_advances() {
        let mut engine = PopupEngine::new(FailingStore, today());
        // Unreadable store loads as "nothing dismissed"
        engine
            .load(vec![
                notice("A", Priority::Urgent, 1),
                notice("B", Priority::Urgent, 2),
            ])
            .await;
        engine.reveal();

        assert!(engine.dismiss_current(true).await.is_err());
        assert_eq!(engine.state(), PopupState::Showing { index: 1 });

        assert!(engine.dismiss_all(true).await.is_err());
        assert_eq!(engine.state(), PopupState::Hidden);
    }

    #[tokio::test]
    async fn test_snapshot_resume_round_trip() {
        let store = MemoryStore::new();
        let mut engine = PopupEngine::new(&store, today());
        engine
            .load(vec![
                notice("A", Priority::Urgent, 1),
                notice("B", Priority::Regular, 2),
            ])
            .await;
        engine.reveal();
        engine.dismiss_current(false).await.unwrap();

        let json = serde_json::to_string(&engine.snapshot()).unwrap();
        let snapshot: PopupSnapshot = serde_json::from_str(&json).unwrap();
        let resumed = PopupEngine::resume(&store, today(), snapshot);

        assert_eq!(resumed.state(), PopupState::Showing { index: 1 });
        assert_eq!(resumed.current().map(|n| n.title.as_str()), Some("B"));
    }

    #[tokio::test]
    async fn test_resume_clamps_out_of_range_index() {
        let snapshot = PopupSnapshot {
            notices: vec![notice("A", Priority::Urgent, 1)],
            state: PopupState::Showing { index: 5 },
            pending_reveal: false,
        };
        let resumed = PopupEngine::resume(MemoryStore::new(), today(), snapshot);
        assert_eq!(resumed.state(), PopupState::Hidden);
    }

    #[test]
    fn test_state_wire_format() {
        assert_eq!(
            serde_json::to_string(&PopupState::Showing { index: 2 }).unwrap(),
            r#"{"state":"showing","index":2}"#
        );
        assert_eq!(
            serde_json::to_string(&PopupState::Hidden).unwrap(),
            r#"{"state":"hidden"}"#
        );
    }
}
