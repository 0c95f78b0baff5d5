//! Facade crate for the Guardian transit incident engine.
//!
//! This crate re-exports the core domain types and exposes the live service
//! layer behind the `live` feature flag.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use guardian_core::{
    Clock, DelayRecord, DnaSummary, Edge, Graph, GraphError, INFINITY, Incident, IncidentId,
    IncidentStore, IncidentView, Location, LocationSummary, Minutes, NO_PATH_ETA, NewIncident,
    NewTrip, NodeId, Severity, SeverityError, ShortestPaths, SystemClock, Timestamp, TransitDna,
    Trip, TripId, WeightPolicy, reconstruct_path, shortest_paths,
};

#[cfg(feature = "live")]
#[cfg_attr(docsrs, doc(cfg(feature = "live")))]
pub use guardian_live::{
    Alert, ChannelSink, GREETING, GuardianService, IncidentReport, LivePayload, LiveSink, Monitor,
    Recommendation, RequestError, RouteEvaluation, RouteLeg, RouteReport, ServiceConfig,
    SimulationAck, SimulationRequest, SubscriberState, Update, WriterSink,
};

#[cfg(feature = "test-support")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub use guardian_core::test_support;
