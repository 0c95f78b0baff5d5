//! Serialisable exports of the delay statistics.

use serde::{Deserialize, Serialize};

use crate::{Location, Minutes, Severity, Timestamp};

/// One observed delay, kept forever in the audit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRecord {
    /// Location the delay was attributed to.
    pub location: Location,
    /// Severity of the attributed incident.
    pub severity: Severity,
    /// Extra minutes observed.
    pub delay: Minutes,
    /// Observation time in epoch seconds.
    pub timestamp: Timestamp,
}

/// Aggregated statistics for one location across all severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSummary {
    /// Location the statistics describe.
    pub location: Location,
    /// Mean of the retained observations, rounded down.
    pub avg_delay: Minutes,
    /// Number of retained observations.
    pub samples: usize,
}

/// Per-location summary ordered by location.
///
/// Serialises as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DnaSummary {
    /// Entries in ascending location order.
    pub locations: Vec<LocationSummary>,
}

impl DnaSummary {
    /// Summary entry for `location`, if any observation exists.
    #[must_use]
    pub fn get(&self, location: Location) -> Option<&LocationSummary> {
        self.locations
            .binary_search_by_key(&location, |entry| entry.location)
            .ok()
            .and_then(|index| self.locations.get(index))
    }

    /// Whether no location has been observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
