//! Read-only summaries of a schedule for one operating day.

use crate::aircraft::{Aircraft, AircraftStatus};
use crate::schedule::Schedule;
use crate::staff::{Staff, StaffAvailabilityStatus};
use crate::time::Time;
use crate::trip::{Trip, TripStatus};
use chrono::NaiveDate;

/// Trips whose scheduled departure falls on `day`.
pub fn todays_trips<'a>(trips: &[&'a Trip], day: NaiveDate) -> Vec<&'a Trip> {
    trips
        .iter()
        .copied()
        .filter(|t| t.scheduled_departure_time.date() == day)
        .collect()
}

/// Share of non-cancelled trips that are on time, truncated to a whole
/// percent. With nothing left to fly the day counts as fully on time.
pub fn on_time_percentage(trips: &[&Trip]) -> u32 {
    let total = trips.iter().filter(|t| !t.is_cancelled()).count();
    if total == 0 {
        return 100;
    }
    let on_time = trips
        .iter()
        .filter(|t| t.current_status() == TripStatus::OnTime)
        .count();
    (on_time * 100 / total) as u32
}

pub fn delayed_count(trips: &[&Trip]) -> usize {
    trips
        .iter()
        .filter(|t| t.current_status() == TripStatus::Delayed)
        .count()
}

pub fn trip_status_tally(trips: &[&Trip]) -> Vec<(TripStatus, usize)> {
    TripStatus::ALL
        .iter()
        .map(|status| {
            let count = trips.iter().filter(|t| t.current_status() == *status).count();
            (*status, count)
        })
        .collect()
}

pub fn crew_status_tally<'a>(
    staff: impl IntoIterator<Item = &'a Staff>,
) -> Vec<(StaffAvailabilityStatus, usize)> {
    let mut tally = vec![
        (StaffAvailabilityStatus::Available, 0),
        (StaffAvailabilityStatus::OnDuty, 0),
        (StaffAvailabilityStatus::Unavailable, 0),
    ];
    for member in staff {
        let status = member.current_status();
        if let Some(entry) = tally.iter_mut().find(|(s, _)| *s == status) {
            entry.1 += 1;
        }
    }
    tally
}

pub fn aircraft_status_tally<'a>(
    aircraft: impl IntoIterator<Item = &'a Aircraft>,
) -> Vec<(AircraftStatus, usize)> {
    let (assigned, available): (Vec<_>, Vec<_>) = aircraft
        .into_iter()
        .partition(|a| a.current_status() == AircraftStatus::Assigned);
    vec![
        (AircraftStatus::Available, available.len()),
        (AircraftStatus::Assigned, assigned.len()),
    ]
}

/// Trips still to fly that depart within `hours` of `now`, both ends
/// inclusive, earliest first.
pub fn upcoming_trips<'a>(trips: &[&'a Trip], now: Time, hours: u32) -> Vec<&'a Trip> {
    let until = now + i64::from(hours) * 60;
    let mut upcoming: Vec<&Trip> = trips
        .iter()
        .copied()
        .filter(|t| t.is_active())
        .filter(|t| t.scheduled_departure_time >= now && t.scheduled_departure_time <= until)
        .collect();
    upcoming.sort_by_key(|t| t.scheduled_departure_time);
    upcoming
}

#[derive(Debug)]
pub struct Dashboard<'a> {
    pub day: NaiveDate,
    pub on_time_percentage: u32,
    pub delayed_count: usize,
    pub trip_status: Vec<(TripStatus, usize)>,
    pub crew_status: Vec<(StaffAvailabilityStatus, usize)>,
    pub aircraft_status: Vec<(AircraftStatus, usize)>,
    pub upcoming: Vec<&'a Trip>,
}

impl<'a> Dashboard<'a> {
    pub fn build(schedule: &'a Schedule, now: Time, window_hours: u32) -> Self {
        let trips = schedule.trips_by_departure();
        let today = todays_trips(&trips, now.date());

        Dashboard {
            day: now.date(),
            on_time_percentage: on_time_percentage(&today),
            delayed_count: delayed_count(&today),
            trip_status: trip_status_tally(&today),
            crew_status: crew_status_tally(schedule.staff.values()),
            aircraft_status: aircraft_status_tally(schedule.aircraft.values()),
            upcoming: upcoming_trips(&trips, now, window_hours),
        }
    }
}
