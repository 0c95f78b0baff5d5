//! Behaviour-driven step definitions driving the route CLI scenarios.

use super::*;
use crate::route::run_route_with;
use guardian_live::RequestError;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

#[derive(Debug, Default)]
struct RouteWorld {
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl RouteWorld {
    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec!["guardian".to_owned(), "route".to_owned()];
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn printed(&self) -> serde_json::Value {
        let stdout = String::from_utf8(self.stdout.borrow().clone()).expect("stdout utf-8");
        serde_json::from_str(&stdout).expect("output should be a JSON route report")
    }
}

#[fixture]
fn world() -> RouteWorld {
    RouteWorld::default()
}

#[given("the route arguments {args}")]
fn route_arguments(#[from(world)] world: &RouteWorld, args: String) {
    let args = args.trim_matches('"');
    world
        .cli_args
        .replace(args.split_whitespace().map(str::to_owned).collect());
}

#[when("I run the route command")]
fn run_route_command(#[from(world)] world: &RouteWorld) {
    let invocation = world.build_command_line();
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Route(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_route_with(args, &mut *buffer)
        }
        Command::Watch(_) => panic!("expected route command"),
    });
    world.result.replace(Some(outcome));
}

#[then("the command prints a route taking {minutes} minutes after incidents")]
fn prints_adjusted_eta(#[from(world)] world: &RouteWorld, minutes: i64) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("expected success");
    let report = world.printed();
    assert_eq!(report["adjusted"]["eta_minutes"], minutes);
    assert_eq!(report["baseline"]["eta_minutes"], 17);
}

#[then("the recommendation printed is {tag}")]
fn prints_recommendation(#[from(world)] world: &RouteWorld, tag: String) {
    let report = world.printed();
    assert_eq!(report["recommendation"], tag.trim_matches('"'));
}

#[then("the command fails because a value is malformed")]
fn fails_malformed(#[from(world)] world: &RouteWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::InvalidValue { field, .. }) => assert_eq!(*field, ARG_INCIDENT),
        other => panic!("expected InvalidValue, found {other:?}"),
    }
}

#[then("the command fails because the request is invalid")]
fn fails_invalid_request(#[from(world)] world: &RouteWorld) {
    let borrowed = world.result.borrow();
    match borrowed.as_ref().expect("result recorded") {
        Err(CliError::Request(RequestError::NodeOutOfRange { field, node, .. })) => {
            assert_eq!(*field, "destination");
            assert_eq!(*node, 42);
        }
        other => panic!("expected NodeOutOfRange, found {other:?}"),
    }
}

macro_rules! register_route_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/route_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: RouteWorld) {
            let _ = world;
        }
    };
}

register_route_scenario!(route_without_incidents, "evaluating a route without incidents");
register_route_scenario!(route_around_incident, "evaluating a route around a major incident");
register_route_scenario!(route_malformed_incident, "rejecting a malformed incident");
register_route_scenario!(route_unknown_node, "rejecting a node outside the network");
