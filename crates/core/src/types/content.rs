//! Enums shared by the content tables.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a notice is a news item or a formal notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "notice_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    News,
    #[default]
    Notice,
}

/// How prominently a notice should be presented.
///
/// The derived `Ord` follows presentation order: `Urgent` sorts first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "notice_priority", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    Important,
    #[default]
    Regular,
}

impl Priority {
    /// Stable wire name of the priority.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Important => "important",
            Self::Regular => "regular",
        }
    }
}

/// Presentation order for notices: priority first, then newest first.
#[must_use]
pub fn presentation_order(
    a: (Priority, DateTime<Utc>),
    b: (Priority, DateTime<Utc>),
) -> Ordering {
    a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_priority_order() {
        assert!(Priority::Urgent < Priority::Important);
        assert!(Priority::Important < Priority::Regular);
    }

    #[test]
    fn test_presentation_order_prefers_priority_over_recency() {
        let old = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let new = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).single();
        let (Some(old), Some(new)) = (old, new) else {
            panic!("valid timestamps");
        };

        assert_eq!(
            presentation_order((Priority::Urgent, old), (Priority::Regular, new)),
            Ordering::Less
        );
        assert_eq!(
            presentation_order((Priority::Important, new), (Priority::Important, old)),
            Ordering::Less
        );
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&NoticeKind::News).ok().as_deref(),
            Some("\"news\"")
        );
        assert_eq!(
            serde_json::from_str::<NoticeKind>("\"notice\"").ok(),
            Some(NoticeKind::Notice)
        );
    }
}
