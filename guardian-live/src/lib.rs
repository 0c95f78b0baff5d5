//! Live evaluation layer for the Guardian transit incident engine.
//!
//! This crate composes the core model into a running service:
//! - [`RouteEvaluator`] compares baseline and incident-adjusted routes and
//!   feeds observed delays into the delay statistics.
//! - [`MonitorRegistry`] and [`MonitorEvaluator`] watch registered routes
//!   and raise [`Alert`]s when incidents slow them past a threshold.
//! - [`SubscriberState`] and the [`LiveSink`] implementations push
//!   deduplicated updates to live subscribers.
//! - [`GuardianService`] wires everything together, exposes the request
//!   operations, and runs the expiry sweeper, monitor loop and subscriber
//!   streams on background threads coordinated by a [`ChangeNotifier`].
//!
//! # Examples
//!
//! ```
//! use std::sync::mpsc;
//! use std::time::Duration;
//!
//! use guardian_core::Graph;
//! use guardian_live::{ChannelSink, GREETING, GuardianService, ServiceConfig};
//!
//! let service = GuardianService::new(Graph::demo(), ServiceConfig::default());
//! let tasks = service.start();
//! let (sender, receiver) = mpsc::channel();
//! let subscriber = service.subscribe(ChannelSink::new(sender));
//! assert_eq!(receiver.recv_timeout(Duration::from_secs(5)).unwrap(), GREETING);
//! tasks.shutdown();
//! subscriber.join().unwrap();
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod broadcast;
mod config;
mod error;
mod monitor;
mod notify;
mod route;
mod service;

pub use broadcast::{
    ChannelSink, GREETING, Heartbeat, LivePayload, LiveSink, SubscriberState, Update, WriterSink,
};
pub use config::{
    DEFAULT_HEARTBEAT_EVERY, DEFAULT_INCIDENT_DURATION_SECS, DEFAULT_INTERVAL,
    DEFAULT_SIMULATE_MIN_DELAY, ServiceConfig,
};
pub use error::RequestError;
pub use monitor::{Alert, Monitor, MonitorEvaluator, MonitorId, MonitorRegistry};
pub use notify::ChangeNotifier;
pub use route::{Recommendation, RouteEvaluation, RouteEvaluator, RouteLeg, RouteReport};
pub use service::{
    BackgroundTasks, DEFAULT_REPORT_DESCRIPTION, DEFAULT_SIMULATION_DESCRIPTION,
    DEFAULT_TRIP_USER, GuardianService, IncidentReport, SimulationAck, SimulationRequest, Status,
};
