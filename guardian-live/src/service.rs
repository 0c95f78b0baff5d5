//! The service object composing every subsystem.
//!
//! [`GuardianService`] owns shared handles to the network, the incident
//! store, the delay statistics, the monitor registry and the change
//! notifier. It is cheap to clone; clones share the same state. Request
//! operations validate their input first and touch nothing on failure.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use guardian_core::{
    Clock, DnaSummary, Graph, IncidentId, IncidentStore, IncidentView, Location, NewIncident,
    NewTrip, NodeId, Severity, SystemClock, TransitDna, TripId,
};
use serde::{Deserialize, Serialize};

use crate::broadcast::{GREETING, LiveSink, SubscriberState, Update};
use crate::{
    Alert, ChangeNotifier, Monitor, MonitorEvaluator, MonitorId, MonitorRegistry, RequestError,
    RouteEvaluator, RouteReport, ServiceConfig,
};

/// Description given to reports that omit one.
pub const DEFAULT_REPORT_DESCRIPTION: &str = "reported incident";

/// Description given to simulations that omit one.
pub const DEFAULT_SIMULATION_DESCRIPTION: &str = "simulated incident";

/// Rider label given to trips that omit one.
pub const DEFAULT_TRIP_USER: &str = "demo";

/// Liveness document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Always `"ok"` while the service exists.
    pub status: &'static str,
}

/// An incident reported by a rider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentReport {
    /// Affected location; not required to be a network node.
    pub location: Location,
    /// Description, defaulting to [`DEFAULT_REPORT_DESCRIPTION`].
    pub description: Option<String>,
    /// Severity level `1..=3`, defaulting to minor.
    pub severity: Option<u8>,
}

/// A request to inject an incident after a delay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationRequest {
    /// Affected location; not required to be a network node.
    pub location: Location,
    /// Description, defaulting to [`DEFAULT_SIMULATION_DESCRIPTION`].
    pub description: Option<String>,
    /// Severity level `1..=3`, defaulting to minor.
    pub severity: Option<u8>,
    /// Wait before injection; the configured minimum applies when absent
    /// or zero.
    pub delay: Option<Duration>,
    /// Lifetime in seconds; non-positive values never expire.
    pub duration_secs: Option<i64>,
}

/// Immediate acknowledgement of a scheduled simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationAck {
    /// Always `true`.
    pub scheduled: bool,
    /// Location the incident will be injected at.
    pub node: Location,
    /// Requested delay in milliseconds.
    pub delay_ms: u64,
    /// Severity of the injected incident.
    pub severity: Severity,
    /// Requested lifetime in seconds.
    pub duration_s: i64,
}

/// Handles to the sweeper and monitor loops started by
/// [`GuardianService::start`].
#[derive(Debug)]
#[must_use = "background tasks run until shut down"]
pub struct BackgroundTasks {
    notifier: Arc<ChangeNotifier>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Stop every background loop and subscriber, then wait for the loops.
    pub fn shutdown(self) {
        self.notifier.shutdown();
        for handle in self.handles {
            if handle.join().is_err() {
                log::warn!("background task panicked before shutdown");
            }
        }
    }
}

/// Incident-aware routing service.
///
/// # Examples
///
/// ```
/// use guardian_core::Graph;
/// use guardian_live::{GuardianService, IncidentReport, Recommendation, ServiceConfig};
///
/// let service = GuardianService::new(Graph::demo(), ServiceConfig::default());
/// service
///     .report_incident(IncidentReport {
///         location: 1,
///         severity: Some(3),
///         ..IncidentReport::default()
///     })
///     .unwrap();
/// let report = service.evaluate_route(0, 5).unwrap();
/// assert_eq!(report.evaluation.adjusted.path, vec![0, 3, 4, 5]);
/// assert_eq!(report.evaluation.recommendation, Recommendation::BaselineFaster);
/// ```
#[derive(Debug, Clone)]
pub struct GuardianService {
    graph: Arc<Graph>,
    store: Arc<IncidentStore>,
    dna: Arc<TransitDna>,
    monitors: Arc<MonitorRegistry>,
    notifier: Arc<ChangeNotifier>,
    routes: RouteEvaluator,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl GuardianService {
    /// Build a service over `graph` using the system clock.
    #[must_use]
    pub fn new(graph: Graph, config: ServiceConfig) -> Self {
        Self::with_clock(graph, config, Arc::new(SystemClock))
    }

    /// Build a service whose store, statistics and monitors read `clock`.
    #[must_use]
    pub fn with_clock(graph: Graph, config: ServiceConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(IncidentStore::with_clock(Arc::clone(&clock)));
        let dna = Arc::new(TransitDna::with_clock(Arc::clone(&clock)));
        let routes = RouteEvaluator::new(Arc::clone(&store), Arc::clone(&dna));
        Self {
            graph: Arc::new(graph),
            monitors: Arc::new(MonitorRegistry::new(Arc::clone(&clock))),
            notifier: Arc::new(ChangeNotifier::new()),
            store,
            dna,
            routes,
            clock,
            config,
        }
    }

    /// The network routes are computed over.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Shared delay statistics.
    #[must_use]
    pub fn dna(&self) -> &TransitDna {
        &self.dna
    }

    /// Shared incident store.
    #[must_use]
    pub fn store(&self) -> &IncidentStore {
        &self.store
    }

    /// Notifier woken by every state change.
    #[must_use]
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Liveness probe.
    #[must_use]
    pub const fn status(&self) -> Status {
        Status { status: "ok" }
    }

    /// Record a trip and return its identifier.
    pub fn submit_trip(
        &self,
        source: Location,
        destination: Location,
        user: Option<String>,
    ) -> TripId {
        let label = user.unwrap_or_else(|| DEFAULT_TRIP_USER.to_owned());
        let id = self.store.add_trip(NewTrip::new(source, destination, label));
        log::info!("trip {id} registered from {source} to {destination}");
        self.notifier.notify();
        id
    }

    /// Record an incident immediately.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidSeverity`] when the severity level is
    /// outside `1..=3`.
    pub fn report_incident(&self, report: IncidentReport) -> Result<IncidentId, RequestError> {
        let severity = parse_severity(report.severity)?;
        let description = report
            .description
            .unwrap_or_else(|| DEFAULT_REPORT_DESCRIPTION.to_owned());
        let id = self
            .store
            .add_incident(NewIncident::new(report.location, description, severity));
        log::info!(
            "incident {id} reported at location {} ({severity})",
            report.location
        );
        self.notifier.notify();
        Ok(id)
    }

    /// Schedule an incident for injection on a background thread.
    ///
    /// Returns as soon as the injection is scheduled. The injection is
    /// skipped if the service shuts down first.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidSeverity`] when the severity level is
    /// outside `1..=3`.
    pub fn simulate_incident(
        &self,
        request: SimulationRequest,
    ) -> Result<SimulationAck, RequestError> {
        let severity = parse_severity(request.severity)?;
        let requested_delay = request.delay.unwrap_or_default();
        let duration_s = request
            .duration_secs
            .unwrap_or(self.config.default_incident_duration_secs);
        let ack = SimulationAck {
            scheduled: true,
            node: request.location,
            delay_ms: u64::try_from(requested_delay.as_millis()).unwrap_or(u64::MAX),
            severity,
            duration_s,
        };
        let wait = if requested_delay.is_zero() {
            self.config.simulate_min_delay
        } else {
            requested_delay
        };
        let description = request
            .description
            .unwrap_or_else(|| DEFAULT_SIMULATION_DESCRIPTION.to_owned());
        let service = self.clone();
        thread::spawn(move || {
            if !service.notifier.sleep(wait) {
                log::debug!("simulation at location {} cancelled", ack.node);
                return;
            }
            service.inject(ack, description);
        });
        Ok(ack)
    }

    fn inject(&self, ack: SimulationAck, description: String) {
        let now = self.clock.now();
        let mut incident = NewIncident::new(ack.node, description, ack.severity).created_at(now);
        if ack.duration_s > 0 {
            incident = incident.expiring_at(now.saturating_add(ack.duration_s));
        }
        let expires_at = incident.expires_at;
        let id = self.store.add_incident(incident);
        log::info!(
            "simulated incident {id} injected at location {} ({}), expires at {expires_at}",
            ack.node,
            ack.severity
        );
        self.notifier.notify();
    }

    /// Incidents visible now, ordered by identifier.
    #[must_use]
    pub fn list_incidents(&self) -> Vec<IncidentView> {
        let mut incidents = self.store.list_active_incidents();
        incidents.sort_by_key(|incident| incident.id);
        incidents
    }

    /// Compare baseline and incident-adjusted routes.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NodeOutOfRange`] when either endpoint is not
    /// a node of the network.
    pub fn evaluate_route(
        &self,
        source: Location,
        destination: Location,
    ) -> Result<RouteReport, RequestError> {
        let from = self.node("source", source)?;
        let to = self.node("destination", destination)?;
        let evaluation = self.routes.evaluate(&self.graph, from, to);
        let predicted_leg = if evaluation.adjusted.path.is_empty() {
            &evaluation.baseline
        } else {
            &evaluation.adjusted
        };
        let dna_prediction = self.dna.predict_delay_for_path(predicted_leg.locations());
        let report = RouteReport {
            dna_prediction,
            dna_summary: self.dna.summary_short(),
            evaluation,
        };
        self.notifier.notify();
        Ok(report)
    }

    /// Register a standing watch.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NodeOutOfRange`] for unknown endpoints and
    /// [`RequestError::InvalidThreshold`] for negative thresholds.
    pub fn register_monitor(
        &self,
        source: Location,
        destination: Location,
        threshold_minutes: i64,
    ) -> Result<MonitorId, RequestError> {
        let from = self.node("source", source)?;
        let to = self.node("destination", destination)?;
        let threshold = u64::try_from(threshold_minutes)
            .map_err(|_| RequestError::InvalidThreshold(threshold_minutes))?;
        let id = self.monitors.register(from, to, threshold);
        log::info!("monitor {id} watching {from} -> {to} (threshold {threshold} min)");
        self.notifier.notify();
        Ok(id)
    }

    /// Every registered monitor.
    #[must_use]
    pub fn list_monitors(&self) -> Vec<Monitor> {
        self.monitors.list()
    }

    /// Alerts from the latest monitor cycle.
    #[must_use]
    pub fn latest_alerts(&self) -> Vec<Alert> {
        self.monitors.latest_alerts()
    }

    /// Per-location delay statistics.
    #[must_use]
    pub fn dna_summary(&self) -> DnaSummary {
        self.dna.export_summary()
    }

    /// Run one monitor cycle, publish its alerts and return them.
    pub fn evaluate_monitors(&self) -> Vec<Alert> {
        let monitors = self.monitors.list();
        let incidents = self.store.snapshot_active_incidents();
        let alerts =
            MonitorEvaluator::evaluate_all(&self.graph, &monitors, &incidents, self.clock.now());
        for alert in &alerts {
            log::info!(
                "monitor {} alert: {} -> {} is {} min slower ({} vs {})",
                alert.monitor_id,
                alert.source,
                alert.destination,
                alert.delta,
                alert.eta_adj,
                alert.eta_base
            );
        }
        self.monitors.publish_alerts(alerts.clone());
        alerts
    }

    /// Start the expiry sweeper and the monitor loop.
    pub fn start(&self) -> BackgroundTasks {
        let sweeper = {
            let service = self.clone();
            thread::spawn(move || service.run_sweeper())
        };
        let monitor = {
            let service = self.clone();
            thread::spawn(move || service.run_monitor_loop())
        };
        BackgroundTasks {
            notifier: Arc::clone(&self.notifier),
            handles: vec![sweeper, monitor],
        }
    }

    fn run_sweeper(&self) {
        log::debug!("expiry sweeper started");
        while self.notifier.sleep(self.config.sweep_interval) {
            if self.store.purge_expired() > 0 {
                self.notifier.notify();
            }
        }
        log::debug!("expiry sweeper stopped");
    }

    fn run_monitor_loop(&self) {
        log::debug!("monitor loop started");
        while self.notifier.sleep(self.config.monitor_interval) {
            self.evaluate_monitors();
        }
        log::debug!("monitor loop stopped");
    }

    /// Stream live updates to `sink` on a dedicated thread.
    ///
    /// The thread ends when the sink fails or the service shuts down.
    #[must_use = "join the handle to wait for the stream to close"]
    pub fn subscribe<S>(&self, mut sink: S) -> JoinHandle<()>
    where
        S: LiveSink + Send + 'static,
    {
        let service = self.clone();
        thread::spawn(move || service.run_subscriber(&mut sink))
    }

    fn run_subscriber(&self, sink: &mut impl LiveSink) {
        if let Err(err) = sink.send(GREETING) {
            log::info!("subscriber detached before greeting: {err}");
            return;
        }
        log::info!("subscriber attached");
        let mut state = SubscriberState::new(self.config.heartbeat_every);
        let mut seen = self.notifier.generation();
        loop {
            let update = state.next_update(self.list_incidents(), || {
                (self.dna.export_summary(), self.monitors.latest_alerts())
            });
            let encoded = update.and_then(|next| next.as_ref().map(Update::to_frame).transpose());
            let frame = match encoded {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("failed to encode live update: {err}");
                    break;
                }
            };
            if let Some(text) = frame
                && let Err(err) = sink.send(&text)
            {
                log::info!("subscriber detached: {err}");
                return;
            }
            match self
                .notifier
                .wait_for_change(seen, self.config.broadcast_interval)
            {
                Some(generation) => seen = generation,
                None => break,
            }
        }
        log::info!("subscriber stream closed");
    }

    fn node(&self, field: &'static str, location: Location) -> Result<NodeId, RequestError> {
        NodeId::try_from(location)
            .ok()
            .filter(|&node| self.graph.contains(node))
            .ok_or_else(|| RequestError::NodeOutOfRange {
                field,
                node: location,
                node_count: self.graph.node_count(),
            })
    }
}

fn parse_severity(level: Option<u8>) -> Result<Severity, RequestError> {
    level.map_or(Ok(Severity::Minor), |raw| {
        Severity::try_from(raw).map_err(RequestError::from)
    })
}
