//! Key-value persistence for per-visitor popup state.
//!
//! The engine never touches ambient global state. It receives a
//! [`KeyValueStore`] and keeps a single JSON blob under
//! [`DISMISSED_NOTICES_KEY`].

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::NoticeId;

/// Storage key of the dismissal record. Namespaced to avoid collisions with
/// other per-visitor state.
pub const DISMISSED_NOTICES_KEY: &str = "hans.dismissed_notices";

/// Errors raised by a [`KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend failed to read or write.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A value could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Minimal string key-value persistence.
///
/// Mirrors the browser storage API the popup was designed around, but is
/// injected so that it can be backed by a session, a file, or memory.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Remove `key` if present.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<T: KeyValueStore> KeyValueStore for &T {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: String,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).remove(key)
    }
}

/// In-process store, used by tests and by callers without a session.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_owned()))
    }

    /// Synchronous read of a raw value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the lock is poisoned.
    pub fn raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.raw(key)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// The persisted dismissal record: which notices were dismissed on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DismissalRecord {
    pub date: NaiveDate,
    pub ids: BTreeSet<NoticeId>,
}

/// Reads and writes the dismissal record in a [`KeyValueStore`].
///
/// A record dated any day other than `today` is purged when read. Writes
/// always stamp `today`, so the stored record is either absent or current.
#[derive(Debug)]
pub struct DismissalLedger<S> {
    store: S,
}

impl<S: KeyValueStore> DismissalLedger<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Notice ids dismissed today.
    ///
    /// A stale or unreadable record is removed and reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself fails.
    pub async fn dismissed_on(&self, today: NaiveDate) -> Result<BTreeSet<NoticeId>, StoreError> {
        let Some(raw) = self.store.get(DISMISSED_NOTICES_KEY).await? else {
            return Ok(BTreeSet::new());
        };

        match serde_json::from_str::<DismissalRecord>(&raw) {
            Ok(record) if record.date == today => Ok(record.ids),
            Ok(record) => {
                tracing::debug!(stored = %record.date, %today, "Purging stale dismissal record");
                self.store.remove(DISMISSED_NOTICES_KEY).await?;
                Ok(BTreeSet::new())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable dismissal record");
                self.store.remove(DISMISSED_NOTICES_KEY).await?;
                Ok(BTreeSet::new())
            }
        }
    }

    /// Add `ids` to today's record, creating or resetting it as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to read or write.
    pub async fn dismiss(
        &self,
        today: NaiveDate,
        ids: impl IntoIterator<Item = NoticeId> + Send,
    ) -> Result<(), StoreError> {
        let mut dismissed = self.dismissed_on(today).await?;
        dismissed.extend(ids);

        let record = DismissalRecord {
            date: today,
            ids: dismissed,
        };
        let encoded = serde_json::to_string(&record)?;
        self.store.set(DISMISSED_NOTICES_KEY, encoded).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[tokio::test]
    async fn test_absent_record_is_empty() {
        let ledger = DismissalLedger::new(MemoryStore::new());
        assert!(ledger.dismissed_on(day(18)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dismiss_then_read_same_day() {
        let ledger = DismissalLedger::new(MemoryStore::new());
        let id = NoticeId::generate();

        ledger.dismiss(day(18), [id]).await.unwrap();

        let ids = ledger.dismissed_on(day(18)).await.unwrap();
        assert!(ids.contains(&id));
    }

    #[tokio::test]
    async fn test_stale_record_reads_empty_and_is_purged() {
        let store = MemoryStore::new();
        let stale = DismissalRecord {
            date: day(17),
            ids: [NoticeId::generate(), NoticeId::generate()].into(),
        };
        store
            .set(DISMISSED_NOTICES_KEY, serde_json::to_string(&stale).unwrap())
            .await
            .unwrap();

        let ledger = DismissalLedger::new(&store);
        assert!(ledger.dismissed_on(day(18)).await.unwrap().is_empty());
        assert_eq!(store.raw(DISMISSED_NOTICES_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn test_dismiss_resets_stale_record() {
        let store = MemoryStore::new();
        let ledger = DismissalLedger::new(&store);
        let yesterday_id = NoticeId::generate();
        let today_id = NoticeId::generate();

        ledger.dismiss(day(17), [yesterday_id]).await.unwrap();
        ledger.dismiss(day(18), [today_id]).await.unwrap();

        let raw = store.raw(DISMISSED_NOTICES_KEY).unwrap().unwrap();
        let record: DismissalRecord = serde_json::from_str(&raw).unwrap();
        assert_eq!(record.date, day(18));
        assert_eq!(record.ids, [today_id].into());
    }

    #[tokio::test]
    async fn test_dismiss_appends_within_a_day() {
        let ledger = DismissalLedger::new(MemoryStore::new());
        let a = NoticeId::generate();
        let b = NoticeId::generate();

        ledger.dismiss(day(18), [a]).await.unwrap();
        ledger.dismiss(day(18), [b]).await.unwrap();

        assert_eq!(ledger.dismissed_on(day(18)).await.unwrap(), [a, b].into());
    }

    #[tokio::test]
    async fn test_garbage_record_reads_empty() {
        let store = MemoryStore::new();
        store
            .set(DISMISSED_NOTICES_KEY, "{not json".to_owned())
            .await
            .unwrap();

        let ledger = DismissalLedger::new(&store);
        assert!(ledger.dismissed_on(day(18)).await.unwrap().is_empty());
        assert_eq!(store.raw(DISMISSED_NOTICES_KEY).unwrap(), None);
    }

    #[test]
    fn test_record_wire_format() {
        let record = DismissalRecord {
            date: day(18),
            ids: BTreeSet::new(),
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"date":"2026-10-18","ids":[]}"#
        );
    }
}
