use crate::aircraft::{Aircraft, AircraftId};
use crate::airport::{Airport, AirportId};
use crate::route::{Route, RouteId};
use crate::schedule::Schedule;
use crate::staff::{Gender, Staff, StaffId, StaffRole};
use crate::time::Time;
use crate::trip::{Trip, TripId};
use chrono::NaiveDate;
use std::collections::HashMap;

pub(crate) use crate::time::at;

pub struct Fixture {
    pub schedule: Schedule,
    pub krk: AirportId,
    pub waw: AirportId,
    pub gdn: AirportId,
    /// KRK → WAW, 90 minutes in the air plus turnaround: 120 minutes.
    pub shuttle: RouteId,
    /// KRK → WAW → GDN at offsets 0, 90, 165.
    pub coastal: RouteId,
    pub aircraft: AircraftId,
    pub pilot: StaffId,
    pub co_pilot: StaffId,
    pub cabin_crew: StaffId,
}

impl Fixture {
    pub fn crew(&self) -> Vec<StaffId> {
        vec![self.pilot, self.co_pilot, self.cabin_crew]
    }

    pub fn trip(&self, id: TripId) -> &Trip {
        &self.schedule.trips[&id]
    }

    pub fn aircraft(&self) -> &Aircraft {
        &self.schedule.aircraft[&self.aircraft]
    }

    pub fn staff(&self, id: StaffId) -> &Staff {
        &self.schedule.staff[&id]
    }

    pub fn all_crew(&self) -> Vec<&Staff> {
        self.crew().into_iter().map(|id| self.staff(id)).collect()
    }

    pub fn book(&mut self, route: RouteId, departure: Time, flight_number: &str) -> TripId {
        let crew = self.crew();
        self.schedule
            .assign_trip(route, self.aircraft, crew, departure, flight_number)
            .unwrap()
    }

    pub fn book_without_crew(&mut self, route: RouteId, departure: Time, flight_number: &str) -> TripId {
        self.schedule
            .assign_trip(route, self.aircraft, vec![], departure, flight_number)
            .unwrap()
    }
}

pub fn add_airport(schedule: &mut Schedule, code: &str) -> AirportId {
    schedule.register_airport(Airport::new(code, code, code, "Poland"))
}

pub fn add_route(schedule: &mut Schedule, name: &str, stops: &[(AirportId, u32)]) -> RouteId {
    let (origin, _) = stops[0];
    let mut route = Route::starting_at(name, origin);
    for (airport, journey) in &stops[1..] {
        route.add_node(*airport, *journey);
    }
    schedule.register_route(route).unwrap()
}

pub fn add_aircraft(schedule: &mut Schedule, registration: &str, crew: &[(StaffRole, u32)]) -> AircraftId {
    schedule.register_aircraft(Aircraft::new(
        registration,
        "Embraer 195",
        112,
        crew.iter().copied().collect::<HashMap<_, _>>(),
    ))
}

pub fn add_staff(schedule: &mut Schedule, name: &str, role: StaffRole) -> StaffId {
    schedule.register_staff(Staff::new(
        name,
        role,
        Gender::Other,
        &format!("{}@example.com", name.to_lowercase()),
        NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
    ))
}

pub fn fixture() -> Fixture {
    let mut schedule = Schedule::new();
    let krk = add_airport(&mut schedule, "KRK");
    let waw = add_airport(&mut schedule, "WAW");
    let gdn = add_airport(&mut schedule, "GDN");

    let shuttle = add_route(&mut schedule, "KRK-WAW", &[(krk, 0), (waw, 90)]);
    let coastal = add_route(&mut schedule, "KRK-WAW-GDN", &[(krk, 0), (waw, 60), (gdn, 45)]);

    let aircraft = add_aircraft(
        &mut schedule,
        "SP-LIA",
        &[
            (StaffRole::Pilot, 1),
            (StaffRole::CoPilot, 1),
            (StaffRole::CabinCrew, 1),
        ],
    );
    let pilot = add_staff(&mut schedule, "Pilot", StaffRole::Pilot);
    let co_pilot = add_staff(&mut schedule, "Copilot", StaffRole::CoPilot);
    let cabin_crew = add_staff(&mut schedule, "Cabin", StaffRole::CabinCrew);

    Fixture {
        schedule,
        krk,
        waw,
        gdn,
        shuttle,
        coastal,
        aircraft,
        pilot,
        co_pilot,
        cabin_crew,
    }
}
