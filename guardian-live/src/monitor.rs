//! Standing route watches and the alerts they raise.
//!
//! Monitors are evaluated on a fixed cadence rather than per request. Each
//! cycle builds one adjusted graph with [`WeightPolicy::Additive`] and
//! compares every monitor's baseline and adjusted travel time. Alerts are
//! not de-duplicated: a condition that keeps holding re-fires every cycle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use guardian_core::{
    Clock, Graph, Incident, Minutes, NodeId, Timestamp, WeightPolicy, shortest_paths,
};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a monitor by the registry.
pub type MonitorId = u64;

/// A standing watch over one origin and destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monitor {
    /// Registry-assigned identifier.
    pub id: MonitorId,
    /// Origin node.
    pub source: NodeId,
    /// Destination node.
    pub destination: NodeId,
    /// Alert when the adjusted route is at least this many minutes slower.
    pub threshold_minutes: Minutes,
    /// Registration time in epoch seconds.
    pub created_at: Timestamp,
}

/// A monitor whose adjusted travel time crossed its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Monitor that fired.
    pub monitor_id: MonitorId,
    /// Origin node.
    pub source: NodeId,
    /// Destination node.
    pub destination: NodeId,
    /// Travel time over the unmodified network.
    pub eta_base: Minutes,
    /// Travel time over the incident-adjusted network.
    pub eta_adj: Minutes,
    /// `eta_adj - eta_base`.
    pub delta: Minutes,
    /// Evaluation time in epoch seconds.
    pub timestamp: Timestamp,
}

#[derive(Debug)]
struct Registrations {
    next_id: MonitorId,
    monitors: Vec<Monitor>,
}

impl Default for Registrations {
    fn default() -> Self {
        Self {
            next_id: 1,
            monitors: Vec::new(),
        }
    }
}

/// Thread-safe list of monitors plus the alerts of the latest cycle.
///
/// Registrations and alerts sit behind separate locks, independent of the
/// incident store and delay statistics.
#[derive(Debug)]
pub struct MonitorRegistry {
    registrations: Mutex<Registrations>,
    alerts: Mutex<Vec<Alert>>,
    clock: Arc<dyn Clock>,
}

impl MonitorRegistry {
    /// Build an empty registry stamping registrations with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            registrations: Mutex::new(Registrations::default()),
            alerts: Mutex::new(Vec::new()),
            clock,
        }
    }

    fn registrations(&self) -> MutexGuard<'_, Registrations> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn alerts(&self) -> MutexGuard<'_, Vec<Alert>> {
        self.alerts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a monitor and return its identifier.
    ///
    /// Node ids are not checked here; callers validate against the network.
    pub fn register(
        &self,
        source: NodeId,
        destination: NodeId,
        threshold_minutes: Minutes,
    ) -> MonitorId {
        let created_at = self.clock.now();
        let mut registrations = self.registrations();
        let id = registrations.next_id;
        registrations.next_id += 1;
        registrations.monitors.push(Monitor {
            id,
            source,
            destination,
            threshold_minutes,
            created_at,
        });
        id
    }

    /// Copies of every registered monitor in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<Monitor> {
        self.registrations().monitors.clone()
    }

    /// Alerts raised by the most recent evaluation cycle.
    #[must_use]
    pub fn latest_alerts(&self) -> Vec<Alert> {
        self.alerts().clone()
    }

    /// Replace the latest alerts with those of a new cycle.
    pub fn publish_alerts(&self, alerts: Vec<Alert>) {
        *self.alerts() = alerts;
    }
}

/// Pure evaluation of monitors against an incident snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorEvaluator;

impl MonitorEvaluator {
    /// Alerts for every monitor whose delay meets its threshold.
    ///
    /// Monitors naming nodes outside `graph`, or whose destination is
    /// unreachable on either graph, are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::{Graph, Incident, Severity};
    /// use guardian_live::{Monitor, MonitorEvaluator};
    ///
    /// let monitor = Monitor {
    ///     id: 1,
    ///     source: 0,
    ///     destination: 5,
    ///     threshold_minutes: 2,
    ///     created_at: 0,
    /// };
    /// let incident = Incident {
    ///     id: 1,
    ///     location: 1,
    ///     description: "stalled train".into(),
    ///     severity: Severity::Major,
    ///     created_at: 0,
    ///     expires_at: 0,
    /// };
    /// let alerts = MonitorEvaluator::evaluate_all(&Graph::demo(), &[monitor], &[incident], 60);
    /// assert_eq!(alerts.len(), 1);
    /// assert_eq!((alerts[0].eta_base, alerts[0].eta_adj), (17, 19));
    /// ```
    #[must_use]
    pub fn evaluate_all(
        graph: &Graph,
        monitors: &[Monitor],
        incidents: &[Incident],
        now: Timestamp,
    ) -> Vec<Alert> {
        if monitors.is_empty() {
            return Vec::new();
        }
        let adjusted = WeightPolicy::Additive.adjust(graph, incidents);
        monitors
            .iter()
            .filter_map(|monitor| evaluate_one(graph, &adjusted, monitor, now))
            .collect()
    }
}

fn evaluate_one(
    graph: &Graph,
    adjusted: &Graph,
    monitor: &Monitor,
    now: Timestamp,
) -> Option<Alert> {
    if !(graph.contains(monitor.source) && graph.contains(monitor.destination)) {
        log::debug!("monitor {} names an unknown node; skipped", monitor.id);
        return None;
    }
    let eta_base = shortest_paths(graph, monitor.source).distance(monitor.destination)?;
    let eta_adj = shortest_paths(adjusted, monitor.source).distance(monitor.destination)?;
    let delta = eta_adj.saturating_sub(eta_base);
    (delta >= monitor.threshold_minutes).then_some(Alert {
        monitor_id: monitor.id,
        source: monitor.source,
        destination: monitor.destination,
        eta_base,
        eta_adj,
        delta,
        timestamp: now,
    })
}
