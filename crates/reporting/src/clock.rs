//! Source of "today" for retention and window cut-offs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    /// Defaults to midnight UTC of `today`.
    fn now(&self) -> DateTime<Utc> {
        self.today().and_time(NaiveTime::MIN).and_utc()
    }
}

/// Wall clock, UTC calendar day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one calendar day. Used for replaying a feed as of a past
/// date and in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
