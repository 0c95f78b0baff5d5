//! Unit tests for the watch command's configuration and stream.

use super::*;
use crate::watch::{WatchConfig, run_watch_with};
use guardian_live::GREETING;
use rstest::rstest;
use std::time::Duration;

fn parse_watch(args: &[&str]) -> WatchArgs {
    let mut argv = vec!["guardian", "watch"];
    argv.extend_from_slice(args);
    match Cli::try_parse_from(argv).expect("arguments parse").command {
        Command::Watch(args) => args,
        Command::Route(_) => panic!("expected watch command"),
    }
}

#[rstest]
fn defaults_apply_when_flags_are_absent() {
    let config = WatchConfig::try_from(WatchArgs::default()).expect("defaults are valid");
    assert_eq!(config.window, Duration::from_secs(10));
    assert_eq!(config.interval, None);
    assert!(config.monitors.is_empty());
    assert!(config.simulations.is_empty());
}

#[rstest]
fn repeatable_flags_collect_every_value() {
    let args = parse_watch(&[
        "--monitor",
        "0:5:2",
        "--monitor",
        "2:5:1",
        "--simulate",
        "1:3",
        "--interval-ms",
        "20",
    ]);
    let config = WatchConfig::try_from(args).expect("valid arguments");
    assert_eq!(config.monitors.len(), 2);
    assert_eq!(
        config.simulations,
        vec![IncidentSpec {
            location: 1,
            severity: 3,
        }]
    );
    assert_eq!(config.interval, Some(Duration::from_millis(20)));
}

#[rstest]
fn zero_interval_is_rejected() {
    let err = WatchConfig::try_from(parse_watch(&["--interval-ms", "0"]))
        .expect_err("zero interval is invalid");
    match err {
        CliError::InvalidValue { field, .. } => assert_eq!(field, ARG_INTERVAL_MS),
        other => panic!("expected InvalidValue, found {other:?}"),
    }
}

#[rstest]
fn invalid_monitor_nodes_fail_before_streaming() {
    let mut output = Vec::new();
    let err = run_watch_with(parse_watch(&["--monitor", "0:42:1"]), &mut output)
        .expect_err("node 42 is outside the network");
    assert!(matches!(err, CliError::Request(_)));
    assert!(output.is_empty());
}

#[rstest]
fn watch_streams_greeting_then_simulated_incident() {
    let args = parse_watch(&[
        "--seconds",
        "1",
        "--interval-ms",
        "10",
        "--monitor",
        "0:5:2",
        "--simulate",
        "1:3",
    ]);
    let mut output = Vec::new();
    run_watch_with(args, &mut output).expect("watch completes");

    let printed = String::from_utf8(output).expect("frames are utf-8");
    assert!(printed.starts_with(GREETING));
    assert!(printed.contains("\"node_or_edge\":1"));
}
