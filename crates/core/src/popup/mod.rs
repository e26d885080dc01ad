//! Notice popup engine.
//!
//! Shows active popup notices one at a time on page load and remembers, per
//! visitor and per calendar day, which ones were dismissed with
//! "don't show again today".

pub mod clock;
pub mod engine;
pub mod store;

pub use clock::{Clock, FixedClock, OffsetClock};
pub use engine::{PRESENTATION_DELAY, PopupEngine, PopupNotice, PopupSnapshot, PopupState};
pub use store::{DISMISSED_NOTICES_KEY, DismissalLedger, DismissalRecord, KeyValueStore, MemoryStore, StoreError};
