//! Lock-free internals of the incident store.
//!
//! Every helper here assumes the caller already holds the store mutex.

use std::collections::HashMap;

use crate::{Incident, IncidentId, NewIncident, NewTrip, Timestamp, Trip, TripId};

#[derive(Debug)]
pub(super) struct StoreState {
    next_trip: TripId,
    next_incident: IncidentId,
    trips: HashMap<TripId, Trip>,
    incidents: HashMap<IncidentId, Incident>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            next_trip: 1,
            next_incident: 1,
            trips: HashMap::new(),
            incidents: HashMap::new(),
        }
    }
}

impl StoreState {
    pub(super) fn insert_trip(&mut self, trip: NewTrip, now: Timestamp) -> TripId {
        let id = self.next_trip;
        self.next_trip += 1;
        let start_time = if trip.start_time == 0 {
            now
        } else {
            trip.start_time
        };
        self.trips.insert(
            id,
            Trip {
                id,
                source: trip.source,
                destination: trip.destination,
                user: trip.user,
                start_time,
                active: true,
            },
        );
        id
    }

    pub(super) fn insert_incident(&mut self, incident: NewIncident, now: Timestamp) -> IncidentId {
        let id = self.next_incident;
        self.next_incident += 1;
        let created_at = if incident.created_at == 0 {
            now
        } else {
            incident.created_at
        };
        self.incidents.insert(
            id,
            Incident {
                id,
                location: incident.location,
                description: incident.description,
                severity: incident.severity,
                created_at,
                expires_at: incident.expires_at,
            },
        );
        id
    }

    pub(super) fn active_incidents(&self, now: Timestamp) -> impl Iterator<Item = &Incident> {
        self.incidents
            .values()
            .filter(move |incident| incident.is_active_at(now))
    }

    pub(super) fn purge_expired(&mut self, now: Timestamp) -> usize {
        let before = self.incidents.len();
        self.incidents.retain(|_, incident| incident.is_active_at(now));
        before - self.incidents.len()
    }

    pub(super) fn incident_count(&self) -> usize {
        self.incidents.len()
    }

    pub(super) fn trip(&self, id: TripId) -> Option<&Trip> {
        self.trips.get(&id)
    }

    pub(super) fn trip_count(&self) -> usize {
        self.trips.len()
    }
}
