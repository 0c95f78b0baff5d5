//! Behavioural coverage for the delay statistics.

use guardian_core::{Graph, Minutes, Severity, TransitDna, reconstruct_path, shortest_paths};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

#[fixture]
fn dna() -> TransitDna {
    TransitDna::new()
}

fn severity(level: u8) -> Severity {
    Severity::try_from(level).expect("feature files use levels 1 to 3")
}

#[given("empty delay statistics")]
fn empty(dna: &TransitDna) {
    assert_eq!(dna.summary_short(), "0 keys tracked, 0 records");
}

#[when("{count} delays from 1 upwards are recorded at node {node} with severity {level}")]
fn record_many(dna: &TransitDna, count: Minutes, node: i64, level: u8) {
    for delay in 1..=count {
        dna.record_impact(node, severity(level), delay);
    }
}

#[when("a delay of {delay} is recorded at node {node} with severity {level}")]
fn record_one(dna: &TransitDna, delay: Minutes, node: i64, level: u8) {
    dna.record_impact(node, severity(level), delay);
}

#[then("the bucket for node {node} with severity {level} holds {count} observations")]
fn bucket_size(dna: &TransitDna, node: i64, level: u8, count: usize) {
    assert_eq!(dna.bucket(node, severity(level)).len(), count);
}

#[then("the predicted delay at node {node} with severity {level} is {expected}")]
fn predicted(dna: &TransitDna, node: i64, level: u8, expected: Minutes) {
    assert_eq!(dna.predict_delay(node, severity(level)), expected);
}

#[then("the risk at node {node} with severity {level} is {expected}")]
fn risk(dna: &TransitDna, node: i64, level: u8, expected: f64) {
    assert!((dna.risk_score(node, severity(level)) - expected).abs() < 1e-9);
}

#[then("the predicted delay along the demo route is {expected}")]
fn path_prediction(dna: &TransitDna, expected: f64) {
    let graph = Graph::demo();
    let path = reconstruct_path(&shortest_paths(&graph, 0), 0, 5);
    let locations = path
        .into_iter()
        .map(|node| i64::try_from(node).expect("demo node ids fit i64"));
    assert!((dna.predict_delay_for_path(locations) - expected).abs() < f64::EPSILON);
}

#[scenario(path = "tests/features/transit_dna.feature", index = 0)]
fn buckets_are_bounded(dna: TransitDna) {
    let _ = dna;
}

#[scenario(path = "tests/features/transit_dna.feature", index = 1)]
fn unseen_keys_are_neutral(dna: TransitDna) {
    let _ = dna;
}

#[scenario(path = "tests/features/transit_dna.feature", index = 2)]
fn path_prediction_is_pessimistic(dna: TransitDna) {
    let _ = dna;
}
