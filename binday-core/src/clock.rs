//! Wall clock abstraction so date-dependent logic can be pinned in tests.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant with its local offset.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Current calendar day in the clock's offset.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
