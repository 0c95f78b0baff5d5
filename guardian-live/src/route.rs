//! Baseline versus incident-adjusted route comparison.

use std::sync::Arc;

use guardian_core::{
    Graph, Incident, IncidentStore, Location, Minutes, NodeId, ShortestPaths, TransitDna,
    WeightPolicy, reconstruct_path, shortest_paths,
};
use serde::{Deserialize, Serialize};

/// A path and its travel time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Nodes from source to destination; empty when unreachable.
    pub path: Vec<NodeId>,
    /// Travel time in minutes, or `-1` when unreachable.
    #[serde(rename = "eta_minutes")]
    pub eta: i64,
}

impl RouteLeg {
    fn from_paths(paths: &ShortestPaths, source: NodeId, destination: NodeId) -> Self {
        Self {
            path: reconstruct_path(paths, source, destination),
            eta: paths.eta(destination),
        }
    }

    /// Whether the destination was reached.
    #[must_use]
    pub const fn is_reachable(&self) -> bool {
        self.eta >= 0
    }

    /// Path nodes as raw locations.
    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.path
            .iter()
            .filter_map(|&node| Location::try_from(node).ok())
    }
}

/// Which side of a comparison a rider should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Both reachable and the baseline is quicker.
    BaselineFaster,
    /// Both reachable and the adjusted route is quicker.
    AdjustedFaster,
    /// Both reachable in the same time.
    Equal,
    /// Only the baseline reaches the destination.
    BaselineAvailable,
    /// Only the adjusted route reaches the destination.
    AdjustedAvailable,
    /// Neither reaches the destination.
    NoPath,
}

impl Recommendation {
    /// Compare two ETAs using `-1` as "unreachable".
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_live::Recommendation;
    ///
    /// assert_eq!(Recommendation::compare(17, 19), Recommendation::BaselineFaster);
    /// assert_eq!(Recommendation::compare(-1, 19), Recommendation::AdjustedAvailable);
    /// assert_eq!(Recommendation::compare(-1, -1), Recommendation::NoPath);
    /// ```
    #[must_use]
    pub const fn compare(baseline: i64, adjusted: i64) -> Self {
        match (baseline >= 0, adjusted >= 0) {
            (true, true) if adjusted > baseline => Self::BaselineFaster,
            (true, true) if adjusted < baseline => Self::AdjustedFaster,
            (true, true) => Self::Equal,
            (true, false) => Self::BaselineAvailable,
            (false, true) => Self::AdjustedAvailable,
            (false, false) => Self::NoPath,
        }
    }
}

/// Outcome of comparing the baseline and incident-adjusted routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEvaluation {
    /// Route over the unmodified network.
    pub baseline: RouteLeg,
    /// Route over the network adjusted for active incidents.
    pub adjusted: RouteLeg,
    /// Preferred side.
    pub recommendation: Recommendation,
}

/// Route evaluation enriched with delay predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    /// Underlying comparison.
    #[serde(flatten)]
    pub evaluation: RouteEvaluation,
    /// Predicted extra minutes along the recommended path.
    pub dna_prediction: f64,
    /// One-line description of the delay statistics.
    pub dna_summary: String,
}

/// Compares routes over a base network and its incident-adjusted copy.
///
/// Adjusted graphs use [`WeightPolicy::Multiplicative`]. When both routes
/// are reachable and the adjusted one is slower, the extra minutes are
/// recorded against the first active incident, ordered by identifier.
#[derive(Debug, Clone)]
pub struct RouteEvaluator {
    store: Arc<IncidentStore>,
    dna: Arc<TransitDna>,
}

impl RouteEvaluator {
    /// Build an evaluator reading incidents from `store` and feeding `dna`.
    #[must_use]
    pub const fn new(store: Arc<IncidentStore>, dna: Arc<TransitDna>) -> Self {
        Self { store, dna }
    }

    /// Compare routes from `source` to `destination`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use guardian_core::{Graph, IncidentStore, NewIncident, Severity, TransitDna};
    /// use guardian_live::{Recommendation, RouteEvaluator};
    ///
    /// let store = Arc::new(IncidentStore::new());
    /// let dna = Arc::new(TransitDna::new());
    /// store.add_incident(NewIncident::new(1, "stalled train", Severity::Major));
    ///
    /// let evaluator = RouteEvaluator::new(store, Arc::clone(&dna));
    /// let evaluation = evaluator.evaluate(&Graph::demo(), 0, 5);
    /// assert_eq!(evaluation.baseline.eta, 17);
    /// assert_eq!(evaluation.adjusted.path, vec![0, 3, 4, 5]);
    /// assert_eq!(evaluation.recommendation, Recommendation::BaselineFaster);
    /// assert_eq!(dna.predict_delay(1, Severity::Major), 2);
    /// ```
    #[must_use]
    pub fn evaluate(&self, graph: &Graph, source: NodeId, destination: NodeId) -> RouteEvaluation {
        let mut incidents = self.store.snapshot_active_incidents();
        incidents.sort_by_key(|incident| incident.id);
        let evaluation = compare_routes(graph, &incidents, source, destination);
        if let Some(delta) = extra_minutes(&evaluation)
            && let Some(first) = incidents.first()
        {
            self.dna.record_impact(first.location, first.severity, delta);
        }
        evaluation
    }
}

fn compare_routes(
    graph: &Graph,
    incidents: &[Incident],
    source: NodeId,
    destination: NodeId,
) -> RouteEvaluation {
    let adjusted_graph = WeightPolicy::Multiplicative.adjust(graph, incidents);
    let baseline = RouteLeg::from_paths(&shortest_paths(graph, source), source, destination);
    let adjusted = RouteLeg::from_paths(
        &shortest_paths(&adjusted_graph, source),
        source,
        destination,
    );
    let recommendation = Recommendation::compare(baseline.eta, adjusted.eta);
    RouteEvaluation {
        baseline,
        adjusted,
        recommendation,
    }
}

fn extra_minutes(evaluation: &RouteEvaluation) -> Option<Minutes> {
    if !(evaluation.baseline.is_reachable() && evaluation.adjusted.is_reachable()) {
        return None;
    }
    let delta = evaluation.adjusted.eta.checked_sub(evaluation.baseline.eta)?;
    Minutes::try_from(delta).ok().filter(|&minutes| minutes > 0)
}

#[cfg(test)]
mod tests {
    //! Unit coverage for route comparison.

    use super::*;
    use guardian_core::test_support::ManualClock;
    use guardian_core::{NewIncident, Severity};
    use rstest::{fixture, rstest};

    struct Harness {
        store: Arc<IncidentStore>,
        dna: Arc<TransitDna>,
        evaluator: RouteEvaluator,
    }

    #[fixture]
    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = Arc::new(IncidentStore::with_clock(clock.clone()));
        let dna = Arc::new(TransitDna::with_clock(clock));
        let evaluator = RouteEvaluator::new(Arc::clone(&store), Arc::clone(&dna));
        Harness {
            store,
            dna,
            evaluator,
        }
    }

    #[rstest]
    fn no_incidents_keeps_routes_equal(harness: Harness) {
        let evaluation = harness.evaluator.evaluate(&Graph::demo(), 0, 5);
        assert_eq!(evaluation.baseline.path, vec![0, 1, 2, 5]);
        assert_eq!(evaluation.baseline, evaluation.adjusted);
        assert_eq!(evaluation.recommendation, Recommendation::Equal);
        assert!(harness.dna.history().is_empty());
    }

    #[rstest]
    fn major_incident_reroutes_and_records_delay(harness: Harness) {
        harness
            .store
            .add_incident(NewIncident::new(1, "signal failure", Severity::Major));
        let evaluation = harness.evaluator.evaluate(&Graph::demo(), 0, 5);
        assert_eq!(evaluation.adjusted.path, vec![0, 3, 4, 5]);
        assert_eq!(evaluation.adjusted.eta, 19);
        assert!(evaluation.adjusted.eta >= evaluation.baseline.eta);
        assert_eq!(harness.dna.bucket(1, Severity::Major), vec![2]);
    }

    #[rstest]
    fn delay_is_credited_to_lowest_incident_id(harness: Harness) {
        harness
            .store
            .add_incident(NewIncident::new(2, "flooding", Severity::Minor));
        harness
            .store
            .add_incident(NewIncident::new(1, "signal failure", Severity::Major));
        harness.evaluator.evaluate(&Graph::demo(), 0, 5);
        let history = harness.dna.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].location, 2);
        assert_eq!(history[0].severity, Severity::Minor);
    }

    #[rstest]
    fn unaffected_route_records_nothing(harness: Harness) {
        harness
            .store
            .add_incident(NewIncident::new(3, "works", Severity::Major));
        let evaluation = harness.evaluator.evaluate(&Graph::demo(), 0, 5);
        assert_eq!(evaluation.recommendation, Recommendation::Equal);
        assert!(harness.dna.history().is_empty());
    }

    #[rstest]
    fn unreachable_destination_reports_no_path(harness: Harness) {
        let mut graph = Graph::new(3);
        graph.add_link(0, 1, 4);
        let evaluation = harness.evaluator.evaluate(&graph, 0, 2);
        assert_eq!(evaluation.baseline.eta, -1);
        assert!(evaluation.adjusted.path.is_empty());
        assert_eq!(evaluation.recommendation, Recommendation::NoPath);
    }

    #[rstest]
    #[case(10, 10, Recommendation::Equal)]
    #[case(12, 10, Recommendation::AdjustedFaster)]
    #[case(10, -1, Recommendation::BaselineAvailable)]
    fn recommendation_table(
        #[case] baseline: i64,
        #[case] adjusted: i64,
        #[case] expected: Recommendation,
    ) {
        assert_eq!(Recommendation::compare(baseline, adjusted), expected);
    }

    #[rstest]
    fn legs_serialise_with_eta_minutes() {
        let leg = RouteLeg {
            path: vec![0, 1],
            eta: 5,
        };
        let json = serde_json::to_value(&leg).expect("serialise leg");
        assert_eq!(json["eta_minutes"], 5);
        let recommendation =
            serde_json::to_value(Recommendation::BaselineAvailable).expect("serialise tag");
        assert_eq!(recommendation, "baseline_available");
    }
}
