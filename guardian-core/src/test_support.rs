//! Deterministic helpers for unit, behaviour and downstream crate tests.
//!
//! Compiled only for this crate's tests and under the `test-support`
//! feature.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::{Clock, Incident, IncidentId, Location, Severity, Timestamp};

/// Settable clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Start the clock at `now`.
    #[must_use]
    pub const fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `seconds`.
    pub fn advance(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

/// Non-expiring incident value for feeding weighting and evaluation code
/// without going through a store.
#[must_use]
pub fn incident(id: IncidentId, location: Location, severity: Severity) -> Incident {
    Incident {
        id,
        location,
        description: format!("test incident {id}"),
        severity,
        created_at: 0,
        expires_at: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now(), 100);
        clock.advance(5);
        assert_eq!(clock.now(), 105);
        clock.set(7);
        assert_eq!(clock.now(), 7);
    }
}
