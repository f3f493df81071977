//! Process-wide modification clock.
//!
//! Every `TimeStamp::now()` call returns a value strictly greater than any
//! value handed out before it, across all executives, algorithms and data
//! objects. Comparing two stamps therefore answers "which changed last"
//! without wall-clock time.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static CLOCK: AtomicU64 = AtomicU64::new(0);

/// A point on the modification clock. `TimeStamp::ZERO` predates everything.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeStamp(u64);

impl TimeStamp {
    pub const ZERO: TimeStamp = TimeStamp(0);

    /// Take the next tick of the clock.
    pub fn now() -> Self {
        Self(CLOCK.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Advance this stamp to the current clock value.
    #[inline]
    pub fn modified(&mut self) {
        *self = Self::now();
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Whether this stamp was ever set.
    #[inline]
    pub fn is_set(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Debug for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for TimeStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
