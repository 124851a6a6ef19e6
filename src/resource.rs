use crate::time::Time;
use crate::trip::{Trip, TripId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Back-references a schedulable resource keeps into the trips it flies.
/// The trips themselves live in the schedule.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commitments {
    pub trips: Vec<TripId>,
    pub last_completed_trip: Option<TripId>,
    pub next_scheduled_trip: Option<TripId>,
    pub current_trip: Option<TripId>,
}

/// An aircraft or a crew member: anything a trip keeps busy for a while.
pub trait Resource {
    fn commitments(&self) -> &Commitments;

    fn commitments_mut(&mut self) -> &mut Commitments;

    fn active_trips<'a>(
        &'a self,
        trips: &'a HashMap<TripId, Trip>,
    ) -> impl Iterator<Item = &'a Trip> + 'a {
        self.commitments()
            .trips
            .iter()
            .filter_map(|id| trips.get(id))
            .filter(|t| t.is_active())
    }

    /// True unless an active trip's window overlaps `[from, to]`.
    /// Windows that only touch at an endpoint are not a conflict.
    fn is_free(&self, from: Time, to: Time, trips: &HashMap<TripId, Trip>) -> bool {
        self.active_trips(trips)
            .all(|t| !Time::is_overlapping(&t.window(), &(from, to)))
    }

    fn assign_trip(&mut self, trip: &Trip, trips: &HashMap<TripId, Trip>) {
        let commitments = self.commitments_mut();
        if !commitments.trips.contains(&trip.id) {
            commitments.trips.push(trip.id);
        }

        let departs_sooner = commitments
            .next_scheduled_trip
            .and_then(|id| trips.get(&id))
            .map_or(true, |next| {
                trip.scheduled_departure_time < next.scheduled_departure_time
            });
        if departs_sooner && trip.is_active() && !trip.has_started() {
            commitments.next_scheduled_trip = Some(trip.id);
        }
    }

    fn begin_trip(&mut self, trip_id: TripId) {
        self.commitments_mut().current_trip = Some(trip_id);
    }

    /// Clears `current_trip` if it points at `trip_id`.
    fn release_trip(&mut self, trip_id: TripId) -> bool {
        let commitments = self.commitments_mut();
        if commitments.current_trip == Some(trip_id) {
            commitments.current_trip = None;
            true
        } else {
            false
        }
    }

    /// Earliest active trip departing strictly after `after`.
    fn update_next_scheduled_trip(&mut self, after: Time, trips: &HashMap<TripId, Trip>) {
        let next = self
            .active_trips(trips)
            .filter(|t| t.scheduled_departure_time > after)
            .min_by_key(|t| t.scheduled_departure_time)
            .map(|t| t.id);
        self.commitments_mut().next_scheduled_trip = next;
    }

    fn update_last_and_next_scheduled_trip(
        &mut self,
        completed: &Trip,
        trips: &HashMap<TripId, Trip>,
    ) {
        self.commitments_mut().last_completed_trip = Some(completed.id);
        self.update_next_scheduled_trip(completed.estimated_arrival_time(), trips);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;
    use crate::time::at;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Default)]
    struct Probe(Commitments);

    impl Resource for Probe {
        fn commitments(&self) -> &Commitments {
            &self.0
        }

        fn commitments_mut(&mut self) -> &mut Commitments {
            &mut self.0
        }
    }

    fn two_hour_route() -> Arc<Route> {
        let mut route = Route::starting_at("A-B", Uuid::new_v4());
        route.add_node(Uuid::new_v4(), 90);
        Arc::new(route)
    }

    fn booked(probe: &mut Probe, trips: &mut HashMap<TripId, Trip>, departure: Time) -> TripId {
        let trip = Trip::new(two_hour_route(), Uuid::new_v4(), vec![], departure, "T1");
        let id = trip.id;
        trips.insert(id, trip);
        probe.assign_trip(&trips[&id], trips);
        id
    }

    #[test]
    fn test_is_free_with_touching_windows() {
        let mut probe = Probe::default();
        let mut trips = HashMap::new();
        booked(&mut probe, &mut trips, at(9, 0));

        assert!(!probe.is_free(at(10, 0), at(11, 30), &trips));
        assert!(probe.is_free(at(11, 0), at(12, 0), &trips));
        assert!(probe.is_free(at(7, 0), at(9, 0), &trips));
    }

    #[test]
    fn test_inactive_trips_do_not_block() {
        let mut probe = Probe::default();
        let mut trips = HashMap::new();
        let id = booked(&mut probe, &mut trips, at(9, 0));
        trips.get_mut(&id).unwrap().cancel();

        assert!(probe.is_free(at(9, 0), at(11, 0), &trips));
    }

    #[test]
    fn test_assignment_keeps_earliest_next_trip() {
        let mut probe = Probe::default();
        let mut trips = HashMap::new();
        let late = booked(&mut probe, &mut trips, at(15, 0));
        assert_eq!(Some(late), probe.0.next_scheduled_trip);

        let early = booked(&mut probe, &mut trips, at(8, 0));
        assert_eq!(Some(early), probe.0.next_scheduled_trip);

        booked(&mut probe, &mut trips, at(18, 0));
        assert_eq!(Some(early), probe.0.next_scheduled_trip);
        assert_eq!(3, probe.0.trips.len());
    }

    #[test]
    fn test_next_trip_after_reference() {
        let mut probe = Probe::default();
        let mut trips = HashMap::new();
        let first = booked(&mut probe, &mut trips, at(6, 0));
        let touching = booked(&mut probe, &mut trips, at(8, 0));
        let later = booked(&mut probe, &mut trips, at(12, 0));

        probe.update_next_scheduled_trip(at(8, 0), &trips);
        assert_eq!(Some(later), probe.0.next_scheduled_trip);

        trips.get_mut(&later).unwrap().cancel();
        probe.update_next_scheduled_trip(at(8, 0), &trips);
        assert_eq!(None, probe.0.next_scheduled_trip);

        probe.update_next_scheduled_trip(at(5, 0), &trips);
        assert_eq!(Some(first), probe.0.next_scheduled_trip);
        assert_ne!(Some(touching), probe.0.next_scheduled_trip);
    }

    #[test]
    fn test_release_only_matching_trip() {
        let mut probe = Probe::default();
        let trip_id = Uuid::new_v4();
        probe.begin_trip(trip_id);

        assert!(!probe.release_trip(Uuid::new_v4()));
        assert_eq!(Some(trip_id), probe.0.current_trip);
        assert!(probe.release_trip(trip_id));
        assert_eq!(None, probe.0.current_trip);
    }
}
