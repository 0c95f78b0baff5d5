//! Incident-driven edge weight adjustment.
//!
//! Two policies coexist and are selected by the caller: route comparisons
//! scale weights proportionally, while monitor evaluation adds a flat
//! penalty so threshold deltas stay comparable across edge lengths. The two
//! are not numerically equivalent.
//!
//! Each incident is applied in turn to every edge leaving or entering its
//! location, so several incidents at one location compound, and a self-loop
//! on an affected node is adjusted twice per incident.

use crate::{Graph, Incident, Minutes, NodeId, Severity};

/// Strategy used to derive an adjusted graph from active incidents.
///
/// # Examples
///
/// ```
/// use guardian_core::{Severity, WeightPolicy};
///
/// assert_eq!(WeightPolicy::Multiplicative.adjust_weight(5, Severity::Major), 15);
/// assert_eq!(WeightPolicy::Multiplicative.adjust_weight(5, Severity::Minor), 8);
/// assert_eq!(WeightPolicy::Additive.adjust_weight(5, Severity::Major), 15);
/// assert_eq!(WeightPolicy::Additive.adjust_weight(5, Severity::Moderate), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeightPolicy {
    /// Scale by 1.5, 2.2 or 3.0 by severity, rounding up.
    Multiplicative,
    /// Add 2, 5 or 10 minutes by severity.
    Additive,
}

impl WeightPolicy {
    /// Adjusted weight of a single edge touching an incident of `severity`.
    ///
    /// Never returns less than `weight`; results saturate at
    /// [`Minutes::MAX`].
    ///
    /// Multiplicative scaling uses exact integer ratios (3/2, 11/5, 3/1)
    /// rounded up, not floating-point products, so `25` at moderate
    /// severity becomes exactly `55`.
    #[must_use]
    pub fn adjust_weight(self, weight: Minutes, severity: Severity) -> Minutes {
        match self {
            Self::Multiplicative => {
                let (numerator, denominator) = multiplier(severity);
                let scaled = (u128::from(weight) * numerator).div_ceil(denominator);
                Minutes::try_from(scaled).unwrap_or(Minutes::MAX)
            }
            Self::Additive => weight.saturating_add(penalty(severity)),
        }
    }

    /// Copy `graph` with every incident applied to the edges around its
    /// location.
    ///
    /// Incidents whose location is negative or outside the graph are
    /// ignored. The input graph is never modified.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::{Graph, Incident, Severity, WeightPolicy};
    ///
    /// let incident = Incident {
    ///     id: 1,
    ///     location: 1,
    ///     description: "points failure".into(),
    ///     severity: Severity::Major,
    ///     created_at: 0,
    ///     expires_at: 0,
    /// };
    /// let adjusted = WeightPolicy::Multiplicative.adjust(&Graph::demo(), &[incident]);
    /// assert!(adjusted.edges(1).iter().all(|edge| edge.weight == 15));
    /// assert_eq!(adjusted.edges(0)[0].weight, 15);
    /// assert_eq!(adjusted.edges(0)[1].weight, 10);
    /// ```
    #[must_use]
    pub fn adjust(self, graph: &Graph, incidents: &[Incident]) -> Graph {
        let mut adjusted = graph.clone();
        for incident in incidents {
            let Some(node) = affected_node(graph, incident) else {
                log::debug!(
                    "incident {} at location {} is not a graph node; skipped",
                    incident.id,
                    incident.location
                );
                continue;
            };
            for (from, edge) in adjusted.edges_mut() {
                if from == node {
                    edge.weight = self.adjust_weight(edge.weight, incident.severity);
                }
                if edge.to == node {
                    edge.weight = self.adjust_weight(edge.weight, incident.severity);
                }
            }
        }
        adjusted
    }
}

const fn multiplier(severity: Severity) -> (u128, u128) {
    match severity {
        Severity::Minor => (3, 2),
        Severity::Moderate => (11, 5),
        Severity::Major => (3, 1),
    }
}

const fn penalty(severity: Severity) -> Minutes {
    match severity {
        Severity::Minor => 2,
        Severity::Moderate => 5,
        Severity::Major => 10,
    }
}

fn affected_node(graph: &Graph, incident: &Incident) -> Option<NodeId> {
    NodeId::try_from(incident.location)
        .ok()
        .filter(|&node| graph.contains(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::incident;
    use crate::{Edge, reconstruct_path, shortest_paths};
    use rstest::rstest;

    #[rstest]
    #[case(WeightPolicy::Multiplicative, 7, Severity::Minor, 11)]
    #[case(WeightPolicy::Multiplicative, 10, Severity::Minor, 15)]
    #[case(WeightPolicy::Multiplicative, 5, Severity::Moderate, 11)]
    #[case(WeightPolicy::Multiplicative, 3, Severity::Moderate, 7)]
    #[case(WeightPolicy::Multiplicative, 25, Severity::Moderate, 55)]
    #[case(WeightPolicy::Multiplicative, 50, Severity::Moderate, 110)]
    #[case(WeightPolicy::Multiplicative, 0, Severity::Major, 0)]
    #[case(WeightPolicy::Additive, 0, Severity::Minor, 2)]
    #[case(WeightPolicy::Additive, 7, Severity::Major, 17)]
    fn adjusts_single_weights(
        #[case] policy: WeightPolicy,
        #[case] weight: Minutes,
        #[case] severity: Severity,
        #[case] expected: Minutes,
    ) {
        assert_eq!(policy.adjust_weight(weight, severity), expected);
    }

    #[rstest]
    #[case(WeightPolicy::Multiplicative)]
    #[case(WeightPolicy::Additive)]
    fn huge_weights_saturate(#[case] policy: WeightPolicy) {
        for severity in Severity::ALL {
            assert_eq!(policy.adjust_weight(Minutes::MAX - 1, severity), Minutes::MAX);
        }
    }

    #[rstest]
    fn major_incident_at_node_one_reroutes_demo_trip() {
        let graph = Graph::demo();
        let adjusted =
            WeightPolicy::Multiplicative.adjust(&graph, &[incident(1, 1, Severity::Major)]);

        assert!(adjusted.edges(0).contains(&Edge { to: 1, weight: 15 }));
        assert!(adjusted.edges(2).contains(&Edge { to: 1, weight: 15 }));
        assert!(adjusted.edges(1).iter().all(|edge| edge.weight == 15));

        let paths = shortest_paths(&adjusted, 0);
        assert_eq!(paths.eta(5), 19);
        assert_eq!(reconstruct_path(&paths, 0, 5), vec![0, 3, 4, 5]);
    }

    #[rstest]
    fn additive_penalty_on_node_one() {
        let adjusted =
            WeightPolicy::Additive.adjust(&Graph::demo(), &[incident(1, 1, Severity::Major)]);
        assert!(adjusted.edges(1).iter().all(|edge| edge.weight == 15));
        assert_eq!(shortest_paths(&adjusted, 0).eta(5), 19);
    }

    #[rstest]
    fn incidents_at_the_same_node_compound() {
        let adjusted = WeightPolicy::Additive.adjust(
            &Graph::demo(),
            &[incident(1, 3, Severity::Minor), incident(2, 3, Severity::Minor)],
        );
        assert!(adjusted.edges(3).contains(&Edge { to: 4, weight: 7 }));
    }

    #[rstest]
    fn edge_between_two_affected_nodes_is_adjusted_by_both() {
        let adjusted = WeightPolicy::Additive.adjust(
            &Graph::demo(),
            &[incident(1, 3, Severity::Minor), incident(2, 4, Severity::Moderate)],
        );
        assert!(adjusted.edges(3).contains(&Edge { to: 4, weight: 10 }));
    }

    #[rstest]
    fn self_loop_is_adjusted_twice() {
        let mut graph = Graph::new(1);
        graph.add_edge(0, 0, 1);
        let adjusted = WeightPolicy::Additive.adjust(&graph, &[incident(1, 0, Severity::Minor)]);
        assert_eq!(adjusted.edges(0), &[Edge { to: 0, weight: 5 }]);
    }

    #[rstest]
    #[case(-1)]
    #[case(6)]
    #[case(i64::MAX)]
    fn unknown_locations_leave_graph_unchanged(#[case] location: i64) {
        let graph = Graph::demo();
        let adjusted =
            WeightPolicy::Multiplicative.adjust(&graph, &[incident(1, location, Severity::Major)]);
        assert_eq!(adjusted, graph);
    }

    #[rstest]
    fn no_incidents_is_identity() {
        let graph = Graph::demo();
        assert_eq!(WeightPolicy::Additive.adjust(&graph, &[]), graph);
    }
}
