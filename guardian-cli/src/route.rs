//! Route command implementation for the Guardian CLI.

use std::io::Write;

use clap::Parser;
use guardian_core::{Graph, Location};
use guardian_live::{GuardianService, IncidentReport, RouteReport, ServiceConfig};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_DESTINATION, ARG_INCIDENT, ARG_SEED_DEMO_DNA, ARG_SOURCE, CliError, ENV_ROUTE_DESTINATION,
    ENV_ROUTE_SOURCE, IncidentSpec, parse_incidents, seed_demo_dna,
};

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Report the given incidents against the demo network, then \
                 compare the baseline route with the incident-adjusted one \
                 and print the evaluation as JSON.",
    about = "Evaluate a route under incidents"
)]
#[ortho_config(prefix = "GUARDIAN")]
pub(crate) struct RouteArgs {
    /// Origin node.
    #[arg(long = ARG_SOURCE, value_name = "node")]
    #[serde(default)]
    pub(crate) source: Option<Location>,
    /// Destination node.
    #[arg(long = ARG_DESTINATION, value_name = "node")]
    #[serde(default)]
    pub(crate) destination: Option<Location>,
    /// Incident to report first, as `NODE:SEVERITY`. Repeatable.
    #[arg(long = ARG_INCIDENT, value_name = "node:severity")]
    #[serde(default)]
    pub(crate) incident: Vec<String>,
    /// Seed the delay statistics with the demo observation.
    #[arg(long = ARG_SEED_DEMO_DNA)]
    #[serde(default)]
    pub(crate) seed_demo_dna: bool,
}

impl RouteArgs {
    pub(crate) fn into_config(self) -> Result<RouteConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RouteConfig::try_from(merged)
    }
}

/// Resolved `route` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteConfig {
    pub(crate) source: Location,
    pub(crate) destination: Location,
    pub(crate) incidents: Vec<IncidentSpec>,
    pub(crate) seed_demo_dna: bool,
}

impl TryFrom<RouteArgs> for RouteConfig {
    type Error = CliError;

    fn try_from(args: RouteArgs) -> Result<Self, Self::Error> {
        let source = args.source.ok_or(CliError::MissingArgument {
            field: ARG_SOURCE,
            env: ENV_ROUTE_SOURCE,
        })?;
        let destination = args.destination.ok_or(CliError::MissingArgument {
            field: ARG_DESTINATION,
            env: ENV_ROUTE_DESTINATION,
        })?;
        Ok(Self {
            source,
            destination,
            incidents: parse_incidents(&args.incident)?,
            seed_demo_dna: args.seed_demo_dna,
        })
    }
}

pub(crate) fn run_route(args: RouteArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_route_with(args, &mut stdout)
}

pub(crate) fn run_route_with(args: RouteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let report = execute_route(&config)?;
    write_route_report(writer, &report)
}

pub(crate) fn execute_route(config: &RouteConfig) -> Result<RouteReport, CliError> {
    let service = GuardianService::new(Graph::demo(), ServiceConfig::default());
    if config.seed_demo_dna {
        seed_demo_dna(&service);
    }
    for incident in &config.incidents {
        service.report_incident(IncidentReport {
            location: incident.location,
            description: None,
            severity: Some(incident.severity),
        })?;
    }
    Ok(service.evaluate_route(config.source, config.destination)?)
}

fn write_route_report(writer: &mut dyn Write, report: &RouteReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RouteConfig, CliError> {
    let merged = RouteArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RouteConfig::try_from(merged)
}
