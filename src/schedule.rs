use crate::aircraft::{Aircraft, AircraftId};
use crate::airport::{Airport, AirportId};
use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::route::{Route, RouteId};
use crate::staff::{Staff, StaffId, StaffRole};
use crate::store::{Snapshot, Store, TripRecord};
use crate::time::Time;
use crate::trip::{Trip, TripEvent, TripId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};


/// Owns every entity and is the only writer of the back-references between
/// trips, aircraft and crew. Each public mutation applies its whole cascade
/// before returning.
#[derive(Debug, Default)]
pub struct Schedule {
    pub airports: HashMap<AirportId, Airport>,
    pub routes: HashMap<RouteId, Arc<Route>>,
    pub aircraft: HashMap<AircraftId, Aircraft>,
    pub staff: HashMap<StaffId, Staff>,
    pub trips: HashMap<TripId, Trip>,
    flights_index: HashMap<String, TripId>,
}

impl Schedule {
    pub fn new() -> Schedule {
        Schedule::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Schedule> {
        let mut schedule = Schedule::new();
        for airport in snapshot.airports {
            schedule.airports.insert(airport.id, airport);
        }
        for route in snapshot.routes {
            schedule.register_route(route)?;
        }
        for aircraft in snapshot.aircraft {
            schedule.aircraft.insert(aircraft.id, aircraft);
        }
        for staff in snapshot.staff {
            schedule.staff.insert(staff.id, staff);
        }
        for record in snapshot.trips {
            let route = schedule
                .routes
                .get(&record.route_id)
                .cloned()
                .ok_or(Error::UnknownRoute(record.route_id))?;
            let trip = record.into_trip(route)?;
            schedule
                .flights_index
                .insert(trip.flight_number.clone(), trip.id);
            schedule.trips.insert(trip.id, trip);
        }
        info!(
            trips = schedule.trips.len(),
            aircraft = schedule.aircraft.len(),
            staff = schedule.staff.len(),
            "schedule loaded"
        );
        Ok(schedule)
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut airports: Vec<Airport> = self.airports.values().cloned().collect();
        airports.sort_by(|a, b| a.code.cmp(&b.code));
        let mut routes: Vec<Route> = self.routes.values().map(|r| (**r).clone()).collect();
        routes.sort_by(|a, b| a.name.cmp(&b.name));
        let mut aircraft: Vec<Aircraft> = self.aircraft.values().cloned().collect();
        aircraft.sort_by(|a, b| a.registration_number.cmp(&b.registration_number));
        let mut staff: Vec<Staff> = self.staff.values().cloned().collect();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        let trips = self
            .trips_by_departure()
            .into_iter()
            .map(TripRecord::from)
            .collect();

        Snapshot {
            airports,
            routes,
            aircraft,
            staff,
            trips,
        }
    }

    pub fn load(store: &dyn Store) -> Result<Schedule> {
        Schedule::from_snapshot(store.load()?)
    }

    /// Writes the current state to `store`. A failed commit leaves the
    /// in-memory state as it is.
    pub fn commit(&self, store: &mut dyn Store) -> Result<()> {
        store.commit(&self.snapshot()).inspect_err(|e| {
            warn!(error = %e, "commit failed");
        })
    }

    pub fn register_airport(&mut self, airport: Airport) -> AirportId {
        let id = airport.id;
        debug!(code = %airport.code, "airport registered");
        self.airports.insert(id, airport);
        id
    }

    pub fn register_route(&mut self, route: Route) -> Result<RouteId> {
        route.validate().map_err(|source| Error::InvalidRoute {
            name: route.name.clone(),
            source,
        })?;
        if let Some(node) = route
            .nodes
            .iter()
            .find(|n| !self.airports.contains_key(&n.airport_id))
        {
            return Err(Error::UnknownAirport(node.airport_id));
        }

        let id = route.id;
        debug!(name = %route.name, stops = route.nodes.len(), "route registered");
        self.routes.insert(id, Arc::new(route));
        Ok(id)
    }

    pub fn register_aircraft(&mut self, aircraft: Aircraft) -> AircraftId {
        let id = aircraft.id;
        debug!(registration = %aircraft.registration_number, "aircraft registered");
        self.aircraft.insert(id, aircraft);
        id
    }

    pub fn register_staff(&mut self, staff: Staff) -> StaffId {
        let id = staff.id;
        debug!(name = %staff.name, role = %staff.role, "staff registered");
        self.staff.insert(id, staff);
        id
    }

    /// Creates a trip and links it to its aircraft and crew. Availability is
    /// only advisory here: a conflicting assignment is logged and applied.
    pub fn assign_trip(
        &mut self,
        route_id: RouteId,
        aircraft_id: AircraftId,
        staff_ids: Vec<StaffId>,
        scheduled_departure_time: Time,
        flight_number: &str,
    ) -> Result<TripId> {
        let route = self
            .routes
            .get(&route_id)
            .cloned()
            .ok_or(Error::UnknownRoute(route_id))?;
        if !self.aircraft.contains_key(&aircraft_id) {
            return Err(Error::UnknownAircraft(aircraft_id.to_string()));
        }
        if let Some(missing) = staff_ids.iter().find(|id| !self.staff.contains_key(id)) {
            return Err(Error::UnknownStaff(*missing));
        }

        let trip = Trip::new(
            route,
            aircraft_id,
            staff_ids,
            scheduled_departure_time,
            flight_number,
        );
        let (from, to) = trip.window();
        if !self.aircraft[&aircraft_id].is_free(from, to, &self.trips) {
            warn!(flight = %flight_number, aircraft = %self.aircraft[&aircraft_id], "aircraft double-booked");
        }
        for staff_id in &trip.staff_ids {
            if !self.staff[staff_id].can_be_assigned(from, to, &self.trips) {
                warn!(flight = %flight_number, staff = %self.staff[staff_id].name, "crew member not available");
            }
        }
        if let Some(previous) = self.flights_index.get(flight_number) {
            warn!(flight = %flight_number, previous = %previous, "flight number reused");
        }

        let trip_id = trip.id;
        self.flights_index.insert(trip.flight_number.clone(), trip_id);
        self.trips.insert(trip_id, trip);

        let trip = &self.trips[&trip_id];
        if let Some(aircraft) = self.aircraft.get_mut(&trip.aircraft_id) {
            aircraft.assign_trip(trip, &self.trips);
        }
        for staff_id in &trip.staff_ids {
            if let Some(staff) = self.staff.get_mut(staff_id) {
                staff.assign_trip(trip, &self.trips);
            }
        }
        info!(flight = %flight_number, departure = %scheduled_departure_time, "trip assigned");

        self.assert_invariants();
        Ok(trip_id)
    }

    pub fn trip(&self, trip_id: TripId) -> Result<&Trip> {
        self.trips.get(&trip_id).ok_or(Error::UnknownTrip(trip_id))
    }

    pub fn trip_id_for_flight(&self, flight_number: &str) -> Result<TripId> {
        self.flights_index
            .get(flight_number)
            .copied()
            .ok_or_else(|| Error::UnknownFlight(flight_number.to_string()))
    }

    pub fn trips_by_departure(&self) -> Vec<&Trip> {
        let mut trips: Vec<&Trip> = self.trips.values().collect();
        trips.sort_by(|a, b| {
            a.scheduled_departure_time
                .cmp(&b.scheduled_departure_time)
                .then_with(|| a.flight_number.cmp(&b.flight_number))
        });
        trips
    }

    pub fn aircraft_by_registration(&self, registration: &str) -> Result<&Aircraft> {
        self.aircraft
            .values()
            .find(|a| a.registration_number.eq_ignore_ascii_case(registration))
            .ok_or_else(|| Error::UnknownAircraft(registration.to_string()))
    }

    /// Stops of a route as airport codes, e.g. `KRK → WAW → GDN`.
    pub fn route_summary(&self, route: &Route) -> String {
        route
            .nodes
            .iter()
            .map(|n| {
                self.airports
                    .get(&n.airport_id)
                    .map(|a| a.code.clone())
                    .unwrap_or_else(|| "?".to_string())
            })
            .collect::<Vec<_>>()
            .join(" → ")
    }

    pub fn start_trip(&mut self, trip_id: TripId, departure_time: Time) -> Result<TripEvent> {
        self.apply(trip_id, |trip| trip.start(departure_time))
    }

    pub fn record_arrival(&mut self, trip_id: TripId, arrival_time: Time) -> Result<TripEvent> {
        self.apply(trip_id, |trip| trip.record_arrival(arrival_time))
    }

    pub fn record_departure(&mut self, trip_id: TripId, departure_time: Time) -> Result<TripEvent> {
        self.apply(trip_id, |trip| trip.record_departure(departure_time))
    }

    pub fn cancel_trip(&mut self, trip_id: TripId) -> Result<TripEvent> {
        self.apply(trip_id, Trip::cancel)
    }

    fn apply(&mut self, trip_id: TripId, transition: impl FnOnce(&mut Trip) -> TripEvent) -> Result<TripEvent> {
        let trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or(Error::UnknownTrip(trip_id))?;
        let event = transition(trip);

        match event {
            TripEvent::Ignored => {
                debug!(flight = %trip.flight_number, status = %trip.current_status(), "transition ignored")
            }
            TripEvent::Started => info!(flight = %trip.flight_number, "trip started"),
            TripEvent::Departed | TripEvent::Arrived => debug!(
                flight = %trip.flight_number,
                stop = trip.current_airport_sequence,
                delay = trip.total_delayed_minutes(),
                ?event,
                "leg updated"
            ),
            TripEvent::Completed => info!(
                flight = %trip.flight_number,
                delay = trip.total_delayed_minutes(),
                "trip completed"
            ),
            TripEvent::Cancelled { had_started, .. } => {
                info!(flight = %trip.flight_number, had_started, "trip cancelled")
            }
        }

        self.cascade(trip_id, event);
        self.assert_invariants();
        Ok(event)
    }

    fn cascade(&mut self, trip_id: TripId, event: TripEvent) {
        let Some(trip) = self.trips.get(&trip_id) else {
            return;
        };
        let trips = &self.trips;

        if let Some(aircraft) = self.aircraft.get_mut(&trip.aircraft_id) {
            Self::cascade_to(aircraft, trip, event, trips);
        }
        for staff_id in &trip.staff_ids {
            if let Some(staff) = self.staff.get_mut(staff_id) {
                Self::cascade_to(staff, trip, event, trips);
            }
        }
    }

    fn cascade_to<R: Resource>(
        resource: &mut R,
        trip: &Trip,
        event: TripEvent,
        trips: &HashMap<TripId, Trip>,
    ) {
        match event {
            TripEvent::Started => resource.begin_trip(trip.id),
            TripEvent::Completed => {
                resource.release_trip(trip.id);
                resource.update_last_and_next_scheduled_trip(trip, trips);
            }
            TripEvent::Cancelled {
                had_started,
                reference_arrival,
            } => {
                resource.release_trip(trip.id);
                if had_started {
                    resource.commitments_mut().last_completed_trip = Some(trip.id);
                }
                resource.update_next_scheduled_trip(reference_arrival, trips);
            }
            TripEvent::Ignored | TripEvent::Departed | TripEvent::Arrived => {}
        }
    }

    /// Crew free over `[from, to]` and not marked unavailable, per role.
    pub fn available_staff_counts(&self, from: Time, to: Time) -> HashMap<StaffRole, u32> {
        let mut counts = HashMap::new();
        self.staff
            .values()
            .filter(|s| s.can_be_assigned(from, to, &self.trips))
            .for_each(|s| *counts.entry(s.role).or_insert(0) += 1);
        counts
    }

    pub fn is_aircraft_available(&self, aircraft_id: AircraftId, from: Time, to: Time) -> Result<bool> {
        let aircraft = self
            .aircraft
            .get(&aircraft_id)
            .ok_or_else(|| Error::UnknownAircraft(aircraft_id.to_string()))?;
        let crew = self.available_staff_counts(from, to);
        Ok(aircraft.is_available(from, to, &crew, &self.trips))
    }

    pub fn is_staff_available(&self, staff_id: StaffId, from: Time, to: Time) -> Result<bool> {
        let staff = self
            .staff
            .get(&staff_id)
            .ok_or(Error::UnknownStaff(staff_id))?;
        Ok(staff.is_available(from, to, &self.trips))
    }

    pub fn available_aircraft(&self, from: Time, to: Time) -> Vec<&Aircraft> {
        let crew = self.available_staff_counts(from, to);
        let mut aircraft: Vec<&Aircraft> = self
            .aircraft
            .values()
            .filter(|a| a.is_available(from, to, &crew, &self.trips))
            .collect();
        aircraft.sort_by(|a, b| a.registration_number.cmp(&b.registration_number));
        aircraft
    }

    pub fn available_staff(&self, role: StaffRole, from: Time, to: Time) -> Vec<&Staff> {
        let mut staff: Vec<&Staff> = self
            .staff
            .values()
            .filter(|s| s.role == role && s.can_be_assigned(from, to, &self.trips))
            .collect();
        staff.sort_by(|a, b| a.name.cmp(&b.name));
        staff
    }

    pub fn set_staff_unavailable(&mut self, staff_id: StaffId, unavailable: bool) -> Result<()> {
        let staff = self
            .staff
            .get_mut(&staff_id)
            .ok_or(Error::UnknownStaff(staff_id))?;
        staff.is_unavailable = unavailable;
        info!(name = %staff.name, unavailable, "staff availability changed");
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        debug_assert!(
            self.trips.values().all(|t| {
                t.node_statuses.len() <= t.route.nodes.len()
                    && t.planned_route_node().is_some()
            }),
            "Trip progress <-> route length invariant violated"
        );

        debug_assert!(
            self.trips.values().all(|t| !(t.is_cancelled && t.is_completed)),
            "Cancelled <-> completed exclusivity violated"
        );

        let in_progress = |current: Option<TripId>| {
            current.map_or(true, |id| {
                self.trips
                    .get(&id)
                    .is_some_and(|t| t.is_active() && t.has_started())
            })
        };
        debug_assert!(
            self.aircraft
                .values()
                .all(|a| in_progress(a.commitments.current_trip)),
            "Aircraft current trip <-> trip in progress invariant violated"
        );
        debug_assert!(
            self.staff
                .values()
                .all(|s| in_progress(s.commitments.current_trip)),
            "Staff current trip <-> trip in progress invariant violated"
        );
    }

    #[cfg(not(debug_assertions))]
    fn assert_invariants(&self) {}
}
