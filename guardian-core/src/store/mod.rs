//! Concurrent repository of incidents and trips.
//!
//! [`IncidentStore`] keeps every record behind one mutex. Each public method
//! holds the lock for its whole duration, so callers never observe a
//! partially applied update. Incident visibility is evaluated against the
//! store's [`Clock`] on every read: an incident whose `expires_at` has
//! passed disappears from reads immediately and is physically removed by the
//! next [`IncidentStore::purge_expired`] sweep.
//!
//! Two reads made moments apart may disagree on an incident expiring in
//! between; no consistency is promised across calls.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    Clock, Incident, IncidentId, IncidentView, NewIncident, NewTrip, SystemClock, Trip, TripId,
};

use state::StoreState;

/// Thread-safe incident and trip repository.
///
/// Identifiers for trips and incidents are assigned independently, starting
/// at `1` and increasing by one per insertion.
///
/// # Examples
///
/// ```
/// use guardian_core::{IncidentStore, NewIncident, NewTrip, Severity};
///
/// let store = IncidentStore::new();
/// let trip = store.add_trip(NewTrip::new(0, 5, "demo"));
/// let incident = store.add_incident(NewIncident::new(1, "stalled train", Severity::Major));
/// assert_eq!((trip, incident), (1, 1));
/// assert_eq!(store.list_active_incidents().len(), 1);
/// ```
#[derive(Debug)]
pub struct IncidentStore {
    state: Mutex<StoreState>,
    clock: Arc<dyn Clock>,
}

impl Default for IncidentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IncidentStore {
    /// Construct an empty store using the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Construct an empty store reading time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            clock,
        }
    }

    // Critical sections never leave the maps half-updated, so a poisoned
    // lock still guards consistent data.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a trip and return its identifier.
    ///
    /// A zero `start_time` is replaced with the current time.
    pub fn add_trip(&self, trip: NewTrip) -> TripId {
        let now = self.clock.now();
        let id = self.lock().insert_trip(trip, now);
        log::debug!("stored trip {id}");
        id
    }

    /// Store an incident and return its identifier.
    ///
    /// A zero `created_at` is replaced with the current time.
    pub fn add_incident(&self, incident: NewIncident) -> IncidentId {
        let now = self.clock.now();
        let location = incident.location;
        let severity = incident.severity;
        let id = self.lock().insert_incident(incident, now);
        log::debug!("stored incident {id} at location {location} ({severity})");
        id
    }

    /// Serialisable views of every incident visible now.
    ///
    /// Ordering follows the underlying hash map and is not stable.
    #[must_use]
    pub fn list_active_incidents(&self) -> Vec<IncidentView> {
        let now = self.clock.now();
        self.lock()
            .active_incidents(now)
            .map(IncidentView::from)
            .collect()
    }

    /// Owned copies of every incident visible now, for use outside the lock.
    #[must_use]
    pub fn snapshot_active_incidents(&self) -> Vec<Incident> {
        let now = self.clock.now();
        self.lock().active_incidents(now).cloned().collect()
    }

    /// Remove every expired incident from storage and return how many went.
    ///
    /// Idempotent: a second call at the same instant removes nothing.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self.lock().purge_expired(now);
        if removed > 0 {
            log::info!("purged {removed} expired incident(s)");
        }
        removed
    }

    /// Number of incidents physically held, expired or not.
    #[must_use]
    pub fn incident_count(&self) -> usize {
        self.lock().incident_count()
    }

    /// Copy of the trip with identifier `id`.
    #[must_use]
    pub fn trip(&self, id: TripId) -> Option<Trip> {
        self.lock().trip(id).cloned()
    }

    /// Number of stored trips.
    #[must_use]
    pub fn trip_count(&self) -> usize {
        self.lock().trip_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;
    use crate::test_support::ManualClock;
    use rstest::{fixture, rstest};

    const T0: i64 = 1_700_000_000;

    #[fixture]
    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(T0))
    }

    fn store_with(clock: &Arc<ManualClock>) -> IncidentStore {
        IncidentStore::with_clock(clock.clone())
    }

    #[rstest]
    fn identifiers_start_at_one_and_increase(clock: Arc<ManualClock>) {
        let store = store_with(&clock);
        let ids: Vec<_> = (0..3)
            .map(|n| store.add_incident(NewIncident::new(n, "x", Severity::Minor)))
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(store.add_trip(NewTrip::new(0, 1, "a")), 1);
        assert_eq!(store.add_trip(NewTrip::new(1, 2, "b")), 2);
    }

    #[rstest]
    fn unset_created_at_is_stamped(clock: Arc<ManualClock>) {
        let store = store_with(&clock);
        store.add_incident(NewIncident::new(2, "x", Severity::Minor));
        store.add_incident(NewIncident::new(3, "y", Severity::Minor).created_at(5));
        let mut snapshot = store.snapshot_active_incidents();
        snapshot.sort_by_key(|incident| incident.id);
        assert_eq!(snapshot[0].created_at, T0);
        assert_eq!(snapshot[1].created_at, 5);
    }

    #[rstest]
    fn trips_are_stamped_and_active(clock: Arc<ManualClock>) {
        let store = store_with(&clock);
        let id = store.add_trip(NewTrip::new(0, 5, "rider"));
        let trip = store.trip(id).expect("trip stored");
        assert_eq!(trip.start_time, T0);
        assert!(trip.active);
        assert_eq!(trip.user, "rider");
        assert_eq!(store.trip_count(), 1);
    }

    #[rstest]
    fn expired_incidents_vanish_without_purge(clock: Arc<ManualClock>) {
        let store = store_with(&clock);
        store.add_incident(NewIncident::new(1, "short", Severity::Major).expiring_at(T0 + 5));
        store.add_incident(NewIncident::new(2, "forever", Severity::Minor));

        clock.advance(4);
        assert_eq!(store.list_active_incidents().len(), 2);

        clock.advance(1);
        let visible = store.list_active_incidents();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].location, 2);
        assert_eq!(store.incident_count(), 2);
    }

    #[rstest]
    fn purge_removes_expired_and_is_idempotent(clock: Arc<ManualClock>) {
        let store = store_with(&clock);
        store.add_incident(NewIncident::new(1, "short", Severity::Major).expiring_at(T0 + 5));
        store.add_incident(NewIncident::new(2, "forever", Severity::Minor));

        assert_eq!(store.purge_expired(), 0);
        clock.advance(10);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.purge_expired(), 0);
        assert_eq!(store.incident_count(), 1);
    }

    #[rstest]
    fn concurrent_inserts_receive_unique_ids(clock: Arc<ManualClock>) {
        let store = Arc::new(store_with(&clock));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| store.add_incident(NewIncident::new(worker, "x", Severity::Minor)))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("worker panicked"))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&200));
    }
}
