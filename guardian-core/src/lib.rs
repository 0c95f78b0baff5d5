//! Core domain model for the Guardian transit incident engine.
//!
//! The crate owns the pieces that do not spawn threads of their own:
//! - the travel-time [`Graph`] and its Dijkstra [`shortest_paths`] engine,
//! - the [`IncidentStore`] holding reported incidents and trips with
//!   time-to-live expiry,
//! - the [`TransitDna`] delay statistics used for risk and path predictions,
//! - the [`WeightPolicy`] strategies that derive incident-adjusted graphs.
//!
//! Every shared structure guards its state behind a single mutex, so the
//! types here can be wrapped in an `Arc` and handed to concurrent callers.
//!
//! # Examples
//!
//! ```
//! use guardian_core::{Graph, reconstruct_path, shortest_paths};
//!
//! let graph = Graph::demo();
//! let paths = shortest_paths(&graph, 0);
//! assert_eq!(paths.eta(5), 17);
//! assert_eq!(reconstruct_path(&paths, 0, 5), vec![0, 1, 2, 5]);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clock;
pub mod dna;
mod error;
pub mod graph;
pub mod incident;
pub mod path;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
pub mod weighting;

pub use clock::{Clock, SystemClock, Timestamp};
pub use dna::{DelayRecord, DnaSummary, LocationSummary, TransitDna};
pub use error::{GraphError, SeverityError};
pub use graph::{Edge, Graph, Minutes, NodeId};
pub use incident::{
    Incident, IncidentId, IncidentView, Location, NewIncident, NewTrip, Severity, Trip, TripId,
};
pub use path::{INFINITY, NO_PATH_ETA, ShortestPaths, reconstruct_path, shortest_paths};
pub use store::IncidentStore;
pub use weighting::WeightPolicy;
