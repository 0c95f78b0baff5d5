//! Single-source shortest paths with Dijkstra's algorithm.
//!
//! [`shortest_paths`] runs a lazy-deletion Dijkstra over a [`Graph`]
//! snapshot: stale queue entries are skipped when popped instead of being
//! decreased in place. The search is a pure function of its input, so
//! callers may run it on private graph copies from any thread.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::{Graph, Minutes, NodeId};

/// Distance sentinel for nodes the search never reached.
pub const INFINITY: Minutes = Minutes::MAX;

/// ETA reported for unreachable destinations.
pub const NO_PATH_ETA: i64 = -1;

/// Distances and predecessor links produced by [`shortest_paths`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    distances: Vec<Minutes>,
    predecessors: Vec<Option<NodeId>>,
}

impl ShortestPaths {
    fn unreached(node_count: usize) -> Self {
        Self {
            distances: vec![INFINITY; node_count],
            predecessors: vec![None; node_count],
        }
    }

    /// Raw distance to `node`; [`INFINITY`] when unreachable or unknown.
    #[must_use]
    pub fn raw_distance(&self, node: NodeId) -> Minutes {
        self.distances.get(node).copied().unwrap_or(INFINITY)
    }

    /// Distance to `node`, or `None` when it was not reached.
    #[must_use]
    pub fn distance(&self, node: NodeId) -> Option<Minutes> {
        Some(self.raw_distance(node)).filter(|&distance| distance != INFINITY)
    }

    /// Distance to `node` as a signed ETA, using [`NO_PATH_ETA`] when
    /// unreachable.
    #[must_use]
    pub fn eta(&self, node: NodeId) -> i64 {
        self.distance(node)
            .map_or(NO_PATH_ETA, |minutes| i64::try_from(minutes).unwrap_or(i64::MAX))
    }

    /// Node preceding `node` on its shortest path.
    #[must_use]
    pub fn predecessor(&self, node: NodeId) -> Option<NodeId> {
        self.predecessors.get(node).copied().flatten()
    }

    /// Number of nodes covered by the result.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.distances.len()
    }
}

/// Compute shortest travel times from `source` to every node.
///
/// Runs in `O(E log V)`. An out-of-range `source` yields a result where
/// every node is unreachable.
///
/// # Examples
///
/// ```
/// use guardian_core::{Graph, shortest_paths};
///
/// let mut graph = Graph::new(3);
/// graph.add_edge(0, 1, 4);
/// graph.add_edge(1, 2, 1);
/// graph.add_edge(0, 2, 9);
///
/// let paths = shortest_paths(&graph, 0);
/// assert_eq!(paths.distance(2), Some(5));
/// assert_eq!(paths.predecessor(2), Some(1));
/// ```
#[must_use]
pub fn shortest_paths(graph: &Graph, source: NodeId) -> ShortestPaths {
    let mut result = ShortestPaths::unreached(graph.node_count());
    let Some(start) = result.distances.get_mut(source) else {
        return result;
    };
    *start = 0;

    let mut queue = BinaryHeap::new();
    queue.push(Reverse((0, source)));
    while let Some(Reverse((distance, node))) = queue.pop() {
        if result.raw_distance(node) != distance {
            continue;
        }
        for edge in graph.edges(node) {
            let candidate = distance.saturating_add(edge.weight);
            if let Some(best) = result.distances.get_mut(edge.to)
                && candidate < *best
            {
                *best = candidate;
                if let Some(previous) = result.predecessors.get_mut(edge.to) {
                    *previous = Some(node);
                }
                queue.push(Reverse((candidate, edge.to)));
            }
        }
    }
    result
}

/// Rebuild the node sequence from `source` to `destination`.
///
/// Returns an empty path when `destination` is unknown or unreachable.
/// The walk follows predecessor links and relies on the source having no
/// predecessor; `source` itself is not checked.
///
/// # Examples
///
/// ```
/// use guardian_core::{Graph, reconstruct_path, shortest_paths};
///
/// let graph = Graph::demo();
/// let paths = shortest_paths(&graph, 0);
/// assert_eq!(reconstruct_path(&paths, 0, 0), vec![0]);
/// assert!(reconstruct_path(&paths, 0, 99).is_empty());
/// ```
#[must_use]
pub fn reconstruct_path(
    paths: &ShortestPaths,
    _source: NodeId,
    destination: NodeId,
) -> Vec<NodeId> {
    if paths.distance(destination).is_none() {
        return Vec::new();
    }
    let mut path = vec![destination];
    let mut current = destination;
    // Predecessor chains are acyclic, so a walk longer than the node count
    // means the links were not produced by `shortest_paths`.
    while let Some(previous) = paths.predecessor(current) {
        if path.len() > paths.node_count() {
            log::warn!("predecessor chain from {destination} does not terminate");
            return Vec::new();
        }
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
