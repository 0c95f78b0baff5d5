//! Historical delay statistics ("transit DNA").
//!
//! Observed incident impacts are bucketed by `(location, severity)`. Each
//! bucket keeps the 20 most recent delays, evicting the oldest first, and
//! feeds a moving-average prediction. A separate history log keeps every
//! observation for auditing and is never pruned.
//!
//! All state sits behind one mutex. Public methods take the lock exactly
//! once and delegate to helpers on the locked state, so no method ever
//! re-acquires the lock it already holds.

mod summary;

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{Clock, Location, Minutes, Severity, SystemClock};

pub use summary::{DelayRecord, DnaSummary, LocationSummary};

/// Maximum number of observations retained per bucket.
pub const BUCKET_CAPACITY: usize = 20;

type BucketKey = (Location, Severity);

#[derive(Debug, Default)]
struct DnaState {
    buckets: BTreeMap<BucketKey, VecDeque<Minutes>>,
    history: Vec<DelayRecord>,
}

impl DnaState {
    fn record(&mut self, record: DelayRecord) {
        self.history.push(record);
        let bucket = self
            .buckets
            .entry((record.location, record.severity))
            .or_default();
        bucket.push_back(record.delay);
        while bucket.len() > BUCKET_CAPACITY {
            bucket.pop_front();
        }
    }

    fn predict_delay(&self, location: Location, severity: Severity) -> Minutes {
        self.buckets
            .get(&(location, severity))
            .and_then(|bucket| mean(bucket.iter().copied()))
            .unwrap_or(0)
    }

    fn has_observations(&self, location: Location, severity: Severity) -> bool {
        self.buckets
            .get(&(location, severity))
            .is_some_and(|bucket| !bucket.is_empty())
    }

    fn worst_case_delay(&self, location: Location) -> Minutes {
        Severity::ALL
            .into_iter()
            .map(|severity| self.predict_delay(location, severity))
            .max()
            .unwrap_or(0)
    }
}

fn mean(values: impl Iterator<Item = Minutes>) -> Option<Minutes> {
    let (sum, count) = values.fold((0_u64, 0_u64), |(sum, count), value| {
        (sum.saturating_add(value), count + 1)
    });
    sum.checked_div(count)
}

/// Thread-safe delay statistics keyed by location and severity.
///
/// # Examples
///
/// ```
/// use guardian_core::{Severity, TransitDna};
///
/// let dna = TransitDna::new();
/// dna.record_impact(1, Severity::Major, 10);
/// dna.record_impact(1, Severity::Major, 14);
/// assert_eq!(dna.predict_delay(1, Severity::Major), 12);
/// assert_eq!(dna.predict_delay(1, Severity::Minor), 0);
/// assert_eq!(dna.summary_short(), "1 keys tracked, 2 records");
/// ```
#[derive(Debug)]
pub struct TransitDna {
    state: Mutex<DnaState>,
    clock: Arc<dyn Clock>,
}

impl Default for TransitDna {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitDna {
    /// Construct empty statistics using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Construct empty statistics stamping history with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(DnaState::default()),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DnaState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record an observed delay for `(location, severity)`.
    pub fn record_impact(&self, location: Location, severity: Severity, delay: Minutes) {
        let record = DelayRecord {
            location,
            severity,
            delay,
            timestamp: self.clock.now(),
        };
        self.lock().record(record);
        log::debug!("recorded {delay} min delay at location {location} ({severity})");
    }

    /// Mean of the retained delays for the key, rounded down; `0` if unseen.
    #[must_use]
    pub fn predict_delay(&self, location: Location, severity: Severity) -> Minutes {
        self.lock().predict_delay(location, severity)
    }

    /// Heuristic risk in `[0, 1]`.
    ///
    /// Unseen keys score `0.2 * severity`; otherwise the score is
    /// `min(1, predicted / 20 + 0.3 * severity)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::{Severity, TransitDna};
    ///
    /// let dna = TransitDna::new();
    /// assert!((dna.risk_score(4, Severity::Moderate) - 0.4).abs() < f64::EPSILON);
    /// dna.record_impact(4, Severity::Moderate, 4);
    /// assert!((dna.risk_score(4, Severity::Moderate) - 0.8).abs() < 1e-9);
    /// ```
    #[must_use]
    pub fn risk_score(&self, location: Location, severity: Severity) -> f64 {
        let level = f64::from(severity.level());
        let state = self.lock();
        if !state.has_observations(location, severity) {
            return 0.2 * level;
        }
        let predicted = state.predict_delay(location, severity) as f64;
        (predicted / 20.0 + 0.3 * level).min(1.0)
    }

    /// Pessimistic extra delay along `path`.
    ///
    /// Sums, per location, the worst prediction across all severities.
    /// Negative locations are skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use guardian_core::{Severity, TransitDna};
    ///
    /// let dna = TransitDna::new();
    /// dna.record_impact(1, Severity::Minor, 3);
    /// dna.record_impact(1, Severity::Major, 9);
    /// dna.record_impact(2, Severity::Moderate, 4);
    /// let predicted = dna.predict_delay_for_path([0, 1, 2, -1]);
    /// assert!((predicted - 13.0).abs() < f64::EPSILON);
    /// ```
    #[must_use]
    pub fn predict_delay_for_path<I>(&self, path: I) -> f64
    where
        I: IntoIterator<Item = Location>,
    {
        let state = self.lock();
        let total: Minutes = path
            .into_iter()
            .filter(|&location| location >= 0)
            .map(|location| state.worst_case_delay(location))
            .fold(0, Minutes::saturating_add);
        total as f64
    }

    /// Per-location mean delay and sample count across all severities.
    #[must_use]
    pub fn export_summary(&self) -> DnaSummary {
        let state = self.lock();
        let mut per_location: BTreeMap<Location, (Minutes, usize)> = BTreeMap::new();
        for (&(location, _), bucket) in &state.buckets {
            let entry = per_location.entry(location).or_default();
            entry.0 = bucket.iter().fold(entry.0, |sum, &delay| sum.saturating_add(delay));
            entry.1 += bucket.len();
        }
        let locations = per_location
            .into_iter()
            .filter(|&(_, (_, samples))| samples > 0)
            .map(|(location, (sum, samples))| LocationSummary {
                location,
                avg_delay: sum / samples as u64,
                samples,
            })
            .collect();
        DnaSummary { locations }
    }

    /// One-line description of the tracked keys and history length.
    #[must_use]
    pub fn summary_short(&self) -> String {
        let state = self.lock();
        format!(
            "{} keys tracked, {} records",
            state.buckets.len(),
            state.history.len()
        )
    }

    /// Copy of the full observation history in insertion order.
    #[must_use]
    pub fn history(&self) -> Vec<DelayRecord> {
        self.lock().history.clone()
    }

    /// Copy of the retained delays for one key, oldest first.
    #[must_use]
    pub fn bucket(&self, location: Location, severity: Severity) -> Vec<Minutes> {
        self.lock()
            .buckets
            .get(&(location, severity))
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ManualClock;
    use rstest::{fixture, rstest};

    #[fixture]
    fn dna() -> TransitDna {
        TransitDna::with_clock(Arc::new(ManualClock::new(1_000)))
    }

    #[rstest]
    fn bucket_keeps_the_most_recent_twenty(dna: TransitDna) {
        for delay in 1..=45 {
            dna.record_impact(3, Severity::Moderate, delay);
        }
        let bucket = dna.bucket(3, Severity::Moderate);
        assert_eq!(bucket.len(), BUCKET_CAPACITY);
        assert_eq!(bucket, (26..=45).collect::<Vec<_>>());
        assert_eq!(dna.history().len(), 45);
    }

    #[rstest]
    fn prediction_uses_integer_mean(dna: TransitDna) {
        dna.record_impact(0, Severity::Minor, 1);
        dna.record_impact(0, Severity::Minor, 2);
        assert_eq!(dna.predict_delay(0, Severity::Minor), 1);
    }

    #[rstest]
    #[case(Severity::Minor, 0.2)]
    #[case(Severity::Moderate, 0.4)]
    #[case(Severity::Major, 0.6000000000000001)]
    fn risk_for_unseen_key_scales_with_severity(
        dna: TransitDna,
        #[case] severity: Severity,
        #[case] expected: f64,
    ) {
        assert!((dna.risk_score(9, severity) - expected).abs() < 1e-12);
    }

    #[rstest]
    fn risk_saturates_at_one(dna: TransitDna) {
        dna.record_impact(1, Severity::Major, 30);
        assert!((dna.risk_score(1, Severity::Major) - 1.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn risk_with_observations_adds_average(dna: TransitDna) {
        dna.record_impact(1, Severity::Minor, 2);
        assert!((dna.risk_score(1, Severity::Minor) - 0.4).abs() < 1e-12);
    }

    #[rstest]
    fn path_prediction_takes_worst_severity_per_node(dna: TransitDna) {
        dna.record_impact(1, Severity::Minor, 8);
        dna.record_impact(1, Severity::Major, 2);
        dna.record_impact(5, Severity::Moderate, 3);
        let predicted = dna.predict_delay_for_path([0, 1, 2, 5]);
        assert!((predicted - 11.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn path_prediction_repeats_revisited_nodes(dna: TransitDna) {
        dna.record_impact(2, Severity::Minor, 4);
        let predicted = dna.predict_delay_for_path([2, 2]);
        assert!((predicted - 8.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn summary_merges_severities_per_location(dna: TransitDna) {
        dna.record_impact(1, Severity::Minor, 4);
        dna.record_impact(1, Severity::Major, 10);
        dna.record_impact(1, Severity::Major, 7);
        dna.record_impact(0, Severity::Moderate, 5);
        let summary = dna.export_summary();
        assert_eq!(
            summary.locations,
            vec![
                LocationSummary {
                    location: 0,
                    avg_delay: 5,
                    samples: 1,
                },
                LocationSummary {
                    location: 1,
                    avg_delay: 7,
                    samples: 3,
                },
            ]
        );
        assert_eq!(summary, dna.export_summary());
    }

    #[rstest]
    fn history_is_timestamped(dna: TransitDna) {
        dna.record_impact(1, Severity::Major, 10);
        let history = dna.history();
        assert_eq!(history[0].timestamp, 1_000);
        assert_eq!(history[0].delay, 10);
    }

    #[rstest]
    fn empty_dna_reports_zero_keys(dna: TransitDna) {
        assert_eq!(dna.summary_short(), "0 keys tracked, 0 records");
        assert!(dna.export_summary().is_empty());
        assert_eq!(dna.predict_delay_for_path([0, 1]), 0.0);
    }

    #[rstest]
    fn concurrent_records_keep_buckets_capped(dna: TransitDna) {
        let dna = Arc::new(dna);
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let dna = Arc::clone(&dna);
                std::thread::spawn(move || {
                    for delay in 0..25 {
                        dna.record_impact(4, Severity::Major, worker * 100 + delay);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("worker panicked");
        }
        assert_eq!(dna.bucket(4, Severity::Major).len(), BUCKET_CAPACITY);
        assert_eq!(dna.history().len(), 200);
        assert_eq!(dna.summary_short(), "1 keys tracked, 200 records");
    }
}
