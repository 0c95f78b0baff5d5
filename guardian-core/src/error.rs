//! Error types raised by the core domain constructors.

use thiserror::Error;

use crate::NodeId;

/// Errors returned by the validating [`Graph`](crate::Graph) builders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An edge endpoint does not name a node of the graph.
    #[error("node {node} is outside the graph (node count {node_count})")]
    NodeOutOfRange {
        /// Offending node identifier.
        node: NodeId,
        /// Number of nodes in the graph.
        node_count: usize,
    },
}

/// Errors returned when converting a raw level into a
/// [`Severity`](crate::Severity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SeverityError {
    /// The level is not one of `1` (minor), `2` (moderate) or `3` (major).
    #[error("severity level {0} is outside 1..=3")]
    OutOfRange(u8),
}
