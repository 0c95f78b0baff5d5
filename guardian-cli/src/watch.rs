//! Watch command implementation for the Guardian CLI.
//!
//! The command starts the service's background loops, registers monitors,
//! schedules simulated incidents and copies live-update frames to the
//! output until the watch window closes.

use std::io::Write;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use clap::Parser;
use guardian_core::Graph;
use guardian_live::{ChannelSink, GuardianService, ServiceConfig, SimulationRequest};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_INTERVAL_MS, ARG_MONITOR, ARG_SECONDS, ARG_SEED_DEMO_DNA, ARG_SIMULATE, CliError,
    IncidentSpec, MonitorSpec, parse_monitors, parse_simulations, seed_demo_dna,
};

const DEFAULT_WATCH_SECONDS: u64 = 10;

/// CLI arguments for the `watch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Run the live service over the demo network for a fixed \
                 window. Monitors raise alerts as incidents slow their \
                 routes; simulated incidents are injected after a short \
                 delay. Every live-update frame is printed as it is sent.",
    about = "Stream live updates for a fixed window"
)]
#[ortho_config(prefix = "GUARDIAN")]
pub(crate) struct WatchArgs {
    /// Length of the watch window in seconds (default 10).
    #[arg(long = ARG_SECONDS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) seconds: Option<u64>,
    /// Cadence of the sweeper, monitor and broadcast loops in milliseconds.
    #[arg(long = ARG_INTERVAL_MS, value_name = "millis")]
    #[serde(default)]
    pub(crate) interval_ms: Option<u64>,
    /// Monitor to register, as `SRC:DST:THRESHOLD`. Repeatable.
    #[arg(long = ARG_MONITOR, value_name = "src:dst:threshold")]
    #[serde(default)]
    pub(crate) monitor: Vec<String>,
    /// Incident to simulate, as `NODE:SEVERITY`. Repeatable.
    #[arg(long = ARG_SIMULATE, value_name = "node:severity")]
    #[serde(default)]
    pub(crate) simulate: Vec<String>,
    /// Seed the delay statistics with the demo observation.
    #[arg(long = ARG_SEED_DEMO_DNA)]
    #[serde(default)]
    pub(crate) seed_demo_dna: bool,
}

impl WatchArgs {
    pub(crate) fn into_config(self) -> Result<WatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        WatchConfig::try_from(merged)
    }
}

/// Resolved `watch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WatchConfig {
    pub(crate) window: Duration,
    pub(crate) interval: Option<Duration>,
    pub(crate) monitors: Vec<MonitorSpec>,
    pub(crate) simulations: Vec<IncidentSpec>,
    pub(crate) seed_demo_dna: bool,
}

impl WatchConfig {
    fn service_config(&self) -> ServiceConfig {
        let defaults = ServiceConfig::default();
        match self.interval {
            Some(interval) => defaults
                .with_sweep_interval(interval)
                .with_monitor_interval(interval)
                .with_broadcast_interval(interval),
            None => defaults,
        }
    }
}

impl TryFrom<WatchArgs> for WatchConfig {
    type Error = CliError;

    fn try_from(args: WatchArgs) -> Result<Self, Self::Error> {
        let interval = match args.interval_ms {
            Some(0) => {
                return Err(CliError::InvalidValue {
                    field: ARG_INTERVAL_MS,
                    value: "0".to_owned(),
                    expected: "a positive number of milliseconds",
                });
            }
            Some(millis) => Some(Duration::from_millis(millis)),
            None => None,
        };
        Ok(Self {
            window: Duration::from_secs(args.seconds.unwrap_or(DEFAULT_WATCH_SECONDS)),
            interval,
            monitors: parse_monitors(&args.monitor)?,
            simulations: parse_simulations(&args.simulate)?,
            seed_demo_dna: args.seed_demo_dna,
        })
    }
}

pub(crate) fn run_watch(args: WatchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_watch_with(args, &mut stdout)
}

pub(crate) fn run_watch_with(args: WatchArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_watch(&config, writer)
}

fn execute_watch(config: &WatchConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let service = GuardianService::new(Graph::demo(), config.service_config());
    if config.seed_demo_dna {
        seed_demo_dna(&service);
    }
    for monitor in &config.monitors {
        let id =
            service.register_monitor(monitor.source, monitor.destination, monitor.threshold)?;
        log::info!(
            "monitor {id} watching {} -> {} (threshold {} min)",
            monitor.source,
            monitor.destination,
            monitor.threshold
        );
    }

    let tasks = service.start();
    let (sender, receiver) = mpsc::channel();
    let subscriber = service.subscribe(ChannelSink::new(sender));
    let outcome = schedule_simulations(&service, &config.simulations)
        .and_then(|()| stream_frames(&receiver, config.window, writer));
    tasks.shutdown();
    if subscriber.join().is_err() {
        log::warn!("live subscriber panicked");
    }
    let frames = outcome?;
    log::info!("watch finished after {frames} frames");
    Ok(())
}

fn schedule_simulations(
    service: &GuardianService,
    simulations: &[IncidentSpec],
) -> Result<(), CliError> {
    for simulation in simulations {
        let ack = service.simulate_incident(SimulationRequest {
            location: simulation.location,
            severity: Some(simulation.severity),
            ..SimulationRequest::default()
        })?;
        log::info!(
            "scheduled {} incident at location {} for {} s",
            ack.severity,
            ack.node,
            ack.duration_s
        );
    }
    Ok(())
}

/// Copy frames to `writer` until `window` elapses or the stream closes.
fn stream_frames(
    receiver: &Receiver<String>,
    window: Duration,
    writer: &mut dyn Write,
) -> Result<usize, CliError> {
    let deadline = Instant::now().checked_add(window);
    let mut frames = 0_usize;
    loop {
        let remaining = deadline.map_or(window, |end| {
            end.saturating_duration_since(Instant::now())
        });
        if remaining.is_zero() {
            break;
        }
        match receiver.recv_timeout(remaining) {
            Ok(frame) => {
                writer
                    .write_all(frame.as_bytes())
                    .and_then(|()| writer.flush())
                    .map_err(CliError::WriteOutput)?;
                frames = frames.saturating_add(1);
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
        }
    }
    Ok(frames)
}
