//! Validation errors for service requests.

use guardian_core::{Location, SeverityError};
use thiserror::Error;

/// Reasons a request is rejected before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// A node reference does not name a node of the network.
    #[error("{field} {node} is not a node of the network (node count {node_count})")]
    NodeOutOfRange {
        /// Request field holding the node.
        field: &'static str,
        /// Rejected value.
        node: Location,
        /// Number of nodes in the network.
        node_count: usize,
    },
    /// The severity level is not one of the supported levels.
    #[error("invalid severity: {0}")]
    InvalidSeverity(#[from] SeverityError),
    /// Monitor thresholds must not be negative.
    #[error("monitor threshold {0} must be zero or more minutes")]
    InvalidThreshold(i64),
}
