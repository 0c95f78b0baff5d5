//! Incidents, trips, and the severity scale shared across the engine.

use serde::{Deserialize, Serialize};

use crate::{SeverityError, Timestamp};

/// Identifier assigned to an incident by the store.
pub type IncidentId = u64;

/// Identifier assigned to a trip by the store.
pub type TripId = u64;

/// Raw location reference carried by reports.
///
/// Locations are node ids of the demo network, but reports are accepted for
/// any integer; consumers ignore locations that do not name a graph node.
pub type Location = i64;

/// How strongly an incident slows travel near its location.
///
/// # Examples
///
/// ```
/// use guardian_core::Severity;
///
/// assert_eq!(Severity::try_from(2), Ok(Severity::Moderate));
/// assert!(Severity::try_from(4).is_err());
/// assert_eq!(Severity::from_level(9), Severity::Major);
/// assert_eq!(Severity::Major.level(), 3);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Severity {
    /// Minor disruption.
    #[default]
    Minor,
    /// Moderate disruption.
    Moderate,
    /// Major disruption.
    Major,
}

impl Severity {
    /// Every severity in ascending order.
    pub const ALL: [Self; 3] = [Self::Minor, Self::Moderate, Self::Major];

    /// Numeric level: `1`, `2` or `3`.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::Minor => 1,
            Self::Moderate => 2,
            Self::Major => 3,
        }
    }

    /// Map any raw level onto the scale: `<= 1` is minor, `>= 3` is major.
    #[must_use]
    pub const fn from_level(level: i64) -> Self {
        if level <= 1 {
            Self::Minor
        } else if level == 2 {
            Self::Moderate
        } else {
            Self::Major
        }
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.level()
    }
}

impl TryFrom<u8> for Severity {
    type Error = SeverityError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Self::Minor),
            2 => Ok(Self::Moderate),
            3 => Ok(Self::Major),
            other => Err(SeverityError::OutOfRange(other)),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Major => "major",
        })
    }
}

/// An incident owned by the [`IncidentStore`](crate::IncidentStore).
///
/// Callers only ever receive copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    /// Store-assigned identifier.
    pub id: IncidentId,
    /// Affected location.
    pub location: Location,
    /// Free-form description.
    pub description: String,
    /// Impact level.
    pub severity: Severity,
    /// Creation time in epoch seconds.
    pub created_at: Timestamp,
    /// Expiry time in epoch seconds; `0` never expires.
    pub expires_at: Timestamp,
}

impl Incident {
    /// Whether the incident is still visible at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::{Incident, Severity};
    ///
    /// let incident = Incident {
    ///     id: 1,
    ///     location: 2,
    ///     description: "signal failure".into(),
    ///     severity: Severity::Major,
    ///     created_at: 100,
    ///     expires_at: 160,
    /// };
    /// assert!(incident.is_active_at(159));
    /// assert!(!incident.is_active_at(160));
    /// ```
    #[must_use]
    pub const fn is_active_at(&self, now: Timestamp) -> bool {
        self.expires_at == 0 || self.expires_at > now
    }
}

/// Caller-supplied incident awaiting an identifier.
///
/// # Examples
///
/// ```
/// use guardian_core::{NewIncident, Severity};
///
/// let draft = NewIncident::new(1, "bridge closed", Severity::Major).expiring_at(500);
/// assert_eq!(draft.created_at, 0);
/// assert_eq!(draft.expires_at, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIncident {
    /// Affected location.
    pub location: Location,
    /// Free-form description.
    pub description: String,
    /// Impact level.
    pub severity: Severity,
    /// Creation time; `0` lets the store stamp the insertion time.
    pub created_at: Timestamp,
    /// Expiry time; `0` never expires.
    pub expires_at: Timestamp,
}

impl NewIncident {
    /// Draft a non-expiring incident stamped at insertion.
    pub fn new(location: Location, description: impl Into<String>, severity: Severity) -> Self {
        Self {
            location,
            description: description.into(),
            severity,
            created_at: 0,
            expires_at: 0,
        }
    }

    /// Set an explicit creation time.
    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the expiry time.
    #[must_use]
    pub fn expiring_at(mut self, expires_at: Timestamp) -> Self {
        self.expires_at = expires_at;
        self
    }
}

/// Serialisable incident view handed to external consumers.
///
/// Field names follow the established wire format, where the location is
/// published as `node_or_edge` and the creation time as `timestamp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentView {
    /// Store-assigned identifier.
    pub id: IncidentId,
    /// Affected location.
    #[serde(rename = "node_or_edge")]
    pub location: Location,
    /// Free-form description.
    pub description: String,
    /// Creation time in epoch seconds.
    #[serde(rename = "timestamp")]
    pub created_at: Timestamp,
    /// Impact level (`1..=3`).
    pub severity: Severity,
    /// Expiry time in epoch seconds; `0` never expires.
    pub expires_at: Timestamp,
}

impl From<&Incident> for IncidentView {
    fn from(incident: &Incident) -> Self {
        Self {
            id: incident.id,
            location: incident.location,
            description: incident.description.clone(),
            created_at: incident.created_at,
            severity: incident.severity,
            expires_at: incident.expires_at,
        }
    }
}

impl From<Incident> for IncidentView {
    fn from(incident: Incident) -> Self {
        Self {
            id: incident.id,
            location: incident.location,
            description: incident.description,
            created_at: incident.created_at,
            severity: incident.severity,
            expires_at: incident.expires_at,
        }
    }
}

/// A trip registered by a rider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    /// Store-assigned identifier.
    pub id: TripId,
    /// Origin location.
    pub source: Location,
    /// Destination location.
    pub destination: Location,
    /// Rider label.
    pub user: String,
    /// Start time in epoch seconds.
    pub start_time: Timestamp,
    /// Whether the trip is in progress.
    pub active: bool,
}

/// Caller-supplied trip awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrip {
    /// Origin location.
    pub source: Location,
    /// Destination location.
    pub destination: Location,
    /// Rider label.
    pub user: String,
    /// Start time; `0` lets the store stamp the insertion time.
    pub start_time: Timestamp,
}

impl NewTrip {
    /// Draft an active trip stamped at insertion.
    pub fn new(source: Location, destination: Location, user: impl Into<String>) -> Self {
        Self {
            source,
            destination,
            user: user.into(),
            start_time: 0,
        }
    }
}
