//! Deduplicated push updates for live subscribers.
//!
//! Each subscriber owns a [`SubscriberState`]: the serialised incident
//! snapshot it last received and a count of cycles since then. A cycle
//! whose snapshot matches the last one sent produces nothing, except that
//! every `heartbeat_every`-th unchanged cycle produces a small heartbeat so
//! idle connections stay alive. State is never shared between subscribers.
//!
//! Frames use Server-Sent-Events text framing.

mod sink;

use guardian_core::{DnaSummary, IncidentView};
use serde::{Deserialize, Serialize};

use crate::Alert;

pub use sink::{ChannelSink, LiveSink, WriterSink};

/// Frame sent once when a subscriber attaches.
pub const GREETING: &str = "event: connected\ndata: {\"status\":\"ok\"}\n\n";

/// Full state pushed when the incident snapshot changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivePayload {
    /// Incidents visible at evaluation time, ordered by identifier.
    pub incidents: Vec<IncidentView>,
    /// Per-location delay statistics.
    pub dna_summary: DnaSummary,
    /// Alerts from the latest monitor cycle; omitted when there are none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub monitor_alerts: Vec<Alert>,
}

/// Keep-alive sent after a run of unchanged cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Always `true`; lets clients tell heartbeats from full payloads.
    pub heartbeat: bool,
    /// Unchanged cycles since the last full payload.
    pub unchanged_cycles: u32,
}

/// Something to send to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Update {
    /// The incident snapshot changed.
    Full(LivePayload),
    /// Nothing changed for a while.
    Heartbeat(Heartbeat),
}

impl Update {
    /// Encode as a `data:` frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialised.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_live::{Heartbeat, Update};
    ///
    /// let update = Update::Heartbeat(Heartbeat {
    ///     heartbeat: true,
    ///     unchanged_cycles: 5,
    /// });
    /// assert_eq!(
    ///     update.to_frame().unwrap(),
    ///     "data: {\"heartbeat\":true,\"unchanged_cycles\":5}\n\n"
    /// );
    /// ```
    pub fn to_frame(&self) -> serde_json::Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("data: {json}\n\n"))
    }
}

/// Per-subscriber deduplication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberState {
    last_sent: Option<String>,
    unchanged_cycles: u32,
    heartbeat_every: u32,
}

impl SubscriberState {
    /// Fresh state; `heartbeat_every == 0` disables heartbeats.
    #[must_use]
    pub const fn new(heartbeat_every: u32) -> Self {
        Self {
            last_sent: None,
            unchanged_cycles: 0,
            heartbeat_every,
        }
    }

    /// Decide what, if anything, this cycle sends.
    ///
    /// The incidents are serialised and compared with the last snapshot
    /// sent. On a change, `extras` supplies the DNA summary and alerts for a
    /// full payload and the unchanged counter resets.
    ///
    /// # Errors
    ///
    /// Returns an error if the incidents cannot be serialised.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::DnaSummary;
    /// use guardian_live::{SubscriberState, Update};
    ///
    /// let mut state = SubscriberState::new(2);
    /// let extras = || (DnaSummary::default(), Vec::new());
    /// assert!(matches!(state.next_update(Vec::new(), extras).unwrap(), Some(Update::Full(_))));
    /// assert_eq!(state.next_update(Vec::new(), extras).unwrap(), None);
    /// assert!(matches!(
    ///     state.next_update(Vec::new(), extras).unwrap(),
    ///     Some(Update::Heartbeat(_))
    /// ));
    /// ```
    pub fn next_update<F>(
        &mut self,
        incidents: Vec<IncidentView>,
        extras: F,
    ) -> serde_json::Result<Option<Update>>
    where
        F: FnOnce() -> (DnaSummary, Vec<Alert>),
    {
        let fingerprint = serde_json::to_string(&incidents)?;
        if self.last_sent.as_deref() != Some(fingerprint.as_str()) {
            self.last_sent = Some(fingerprint);
            self.unchanged_cycles = 0;
            let (dna_summary, monitor_alerts) = extras();
            return Ok(Some(Update::Full(LivePayload {
                incidents,
                dna_summary,
                monitor_alerts,
            })));
        }
        self.unchanged_cycles = self.unchanged_cycles.saturating_add(1);
        let due = self
            .unchanged_cycles
            .checked_rem(self.heartbeat_every)
            .is_some_and(|remainder| remainder == 0);
        Ok(due.then_some(Update::Heartbeat(Heartbeat {
            heartbeat: true,
            unchanged_cycles: self.unchanged_cycles,
        })))
    }
}
