//! Calendar-day source for dismissal records.

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

/// Supplies the current calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock shifted to the site's local UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock {
    offset: FixedOffset,
}

impl OffsetClock {
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Clock on UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }
}

impl Clock for OffsetClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// A clock stuck on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_offset_clock_tracks_local_day() {
        let Some(ahead) = FixedOffset::east_opt(14 * 3600) else {
            panic!("valid offset");
        };
        let Some(behind) = FixedOffset::west_opt(12 * 3600) else {
            panic!("valid offset");
        };

        let east = OffsetClock::new(ahead).today();
        let west = OffsetClock::new(behind).today();

        // 26 hours apart
        let gap = east - west;
        assert!(gap >= Duration::days(1) && gap <= Duration::days(2));
    }

    #[test]
    fn test_fixed_clock() {
        let Some(day) = NaiveDate::from_ymd_opt(2026, 10, 18) else {
            panic!("valid date");
        };
        assert_eq!(FixedClock(day).today(), day);
        assert_eq!((&FixedClock(day)).today(), day);
    }
}
