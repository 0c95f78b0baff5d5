//! Command-line interface for the Guardian transit incident engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use guardian_core::{Location, Severity};
use guardian_live::GuardianService;

mod error;
mod route;
mod spec;
mod watch;

pub use error::CliError;

use route::{RouteArgs, run_route};
use spec::{IncidentSpec, MonitorSpec};
use watch::{WatchArgs, run_watch};

const ARG_SOURCE: &str = "source";
const ARG_DESTINATION: &str = "destination";
const ARG_INCIDENT: &str = "incident";
const ARG_MONITOR: &str = "monitor";
const ARG_SIMULATE: &str = "simulate";
const ARG_SECONDS: &str = "seconds";
const ARG_INTERVAL_MS: &str = "interval-ms";
const ARG_SEED_DEMO_DNA: &str = "seed-demo-dna";
const ENV_ROUTE_SOURCE: &str = "GUARDIAN_CMDS_ROUTE_SOURCE";
const ENV_ROUTE_DESTINATION: &str = "GUARDIAN_CMDS_ROUTE_DESTINATION";

/// Location of the observation seeded by `--seed-demo-dna`.
const DEMO_DNA_LOCATION: Location = 1;
/// Minutes of the observation seeded by `--seed-demo-dna`.
const DEMO_DNA_DELAY: u64 = 10;

/// Run the Guardian CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments fail to parse or merge, a request is
/// rejected by the service, or output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse()?;
    match cli.command {
        Command::Route(args) => run_route(args),
        Command::Watch(args) => run_watch(args),
    }
}

/// Install the `env_logger` backend with an `info` default filter.
///
/// `RUST_LOG` overrides the default. Calling this twice is harmless.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("logger already installed");
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "guardian",
    about = "Incident-aware route recommendations over the demo transit network",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare the baseline and incident-adjusted routes between two nodes.
    Route(RouteArgs),
    /// Stream live updates while monitors and simulated incidents run.
    Watch(WatchArgs),
}

/// Record the reference observation used to demonstrate predictions.
fn seed_demo_dna(service: &GuardianService) {
    service
        .dna()
        .record_impact(DEMO_DNA_LOCATION, Severity::Major, DEMO_DNA_DELAY);
    log::info!("seeded delay statistics with the demo observation");
}

fn parse_all<T, F>(raw: &[String], parse: F) -> Result<Vec<T>, CliError>
where
    F: Fn(&str) -> Result<T, CliError>,
{
    raw.iter().map(|value| parse(value)).collect()
}

fn parse_incidents(raw: &[String]) -> Result<Vec<IncidentSpec>, CliError> {
    parse_all(raw, |value| IncidentSpec::parse(ARG_INCIDENT, value))
}

fn parse_simulations(raw: &[String]) -> Result<Vec<IncidentSpec>, CliError> {
    parse_all(raw, |value| IncidentSpec::parse(ARG_SIMULATE, value))
}

fn parse_monitors(raw: &[String]) -> Result<Vec<MonitorSpec>, CliError> {
    parse_all(raw, |value| MonitorSpec::parse(ARG_MONITOR, value))
}

#[cfg(test)]
mod tests;
