//! Travel-time graph over densely numbered transit nodes.
//!
//! Nodes are identified by `0..n`. Every node owns an ordered list of
//! outgoing [`Edge`]s whose weight is a travel time in whole minutes.
//! Undirected links are modelled by adding one edge in each direction.

use serde::{Deserialize, Serialize};

use crate::GraphError;

/// Dense node identifier in `0..node_count`.
pub type NodeId = usize;

/// Travel time in whole minutes.
pub type Minutes = u64;

/// A directed, weighted connection to another node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Target node.
    pub to: NodeId,
    /// Travel time along the edge.
    pub weight: Minutes,
}

/// Adjacency-list graph.
///
/// Self-loops and parallel edges are accepted; they only contribute extra
/// candidate relaxations during path search.
///
/// # Examples
///
/// ```
/// use guardian_core::Graph;
///
/// let mut graph = Graph::new(3);
/// graph.add_link(0, 1, 4);
/// graph.add_edge(1, 2, 6);
/// assert_eq!(graph.edges(1).len(), 2);
/// assert_eq!(graph.edge_count(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
}

impl Graph {
    /// Construct a graph with `node_count` nodes and no edges.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Build the six-node demonstration network.
    ///
    /// Links (minutes): `0-1` 5, `1-2` 5, `0-3` 10, `3-4` 3, `4-2` 2,
    /// `2-5` 7, `4-5` 6.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::Graph;
    ///
    /// let graph = Graph::demo();
    /// assert_eq!(graph.node_count(), 6);
    /// assert_eq!(graph.edge_count(), 14);
    /// ```
    #[must_use]
    pub fn demo() -> Self {
        let mut graph = Self::new(6);
        for (a, b, weight) in [
            (0, 1, 5),
            (1, 2, 5),
            (0, 3, 10),
            (3, 4, 3),
            (4, 2, 2),
            (2, 5, 7),
            (4, 5, 6),
        ] {
            graph.add_link(a, b, weight);
        }
        graph
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Total number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Whether `node` names a node of this graph.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        node < self.adjacency.len()
    }

    /// Outgoing edges of `node`, or an empty slice for unknown nodes.
    #[must_use]
    pub fn edges(&self, node: NodeId) -> &[Edge] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Append a directed edge.
    ///
    /// Edges naming an unknown endpoint are dropped silently; use
    /// [`Graph::try_add_edge`] when the caller needs to know.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: Minutes) {
        if let Err(err) = self.try_add_edge(from, to, weight) {
            log::debug!("ignoring edge {from}->{to}: {err}");
        }
    }

    /// Append a directed edge, rejecting unknown endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::NodeOutOfRange`] when either endpoint is not a
    /// node of the graph. The graph is left unchanged.
    pub fn try_add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: Minutes,
    ) -> Result<(), GraphError> {
        let node_count = self.node_count();
        if !self.contains(to) {
            return Err(GraphError::NodeOutOfRange {
                node: to,
                node_count,
            });
        }
        let edges = self
            .adjacency
            .get_mut(from)
            .ok_or(GraphError::NodeOutOfRange {
                node: from,
                node_count,
            })?;
        edges.push(Edge { to, weight });
        Ok(())
    }

    /// Append edges in both directions between `a` and `b`.
    pub fn add_link(&mut self, a: NodeId, b: NodeId, weight: Minutes) {
        self.add_edge(a, b, weight);
        self.add_edge(b, a, weight);
    }

    /// Visit every edge mutably together with its source node.
    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = (NodeId, &mut Edge)> {
        self.adjacency
            .iter_mut()
            .enumerate()
            .flat_map(|(from, edges)| edges.iter_mut().map(move |edge| (from, edge)))
    }
}
