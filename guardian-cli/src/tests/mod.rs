//! Shared test harness modules for the Guardian CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;

mod route_steps;
mod watch;
