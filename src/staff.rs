use crate::resource::{Commitments, Resource};
use crate::time::Time;
use crate::trip::{Trip, TripId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

pub type StaffId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Pilot,
    CoPilot,
    CabinCrew,
}

impl StaffRole {
    pub const ALL: [StaffRole; 3] = [StaffRole::Pilot, StaffRole::CoPilot, StaffRole::CabinCrew];
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Pilot => write!(f, "Pilot"),
            StaffRole::CoPilot => write!(f, "Co-Pilot"),
            StaffRole::CabinCrew => write!(f, "Cabin Crew"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffAvailabilityStatus {
    Available,
    OnDuty,
    Unavailable,
}

impl fmt::Display for StaffAvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffAvailabilityStatus::Available => write!(f, "Available"),
            StaffAvailabilityStatus::OnDuty => write!(f, "On Duty"),
            StaffAvailabilityStatus::Unavailable => write!(f, "Unavailable"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub name: String,
    pub role: StaffRole,
    pub gender: Gender,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<Vec<u8>>,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub is_unavailable: bool,
    #[serde(flatten)]
    pub commitments: Commitments,
}

impl Staff {
    pub fn new(
        name: &str,
        role: StaffRole,
        gender: Gender,
        email: &str,
        date_of_birth: NaiveDate,
    ) -> Self {
        Staff {
            id: Uuid::new_v4(),
            name: name.to_string(),
            role,
            gender,
            email: email.to_string(),
            profile_image: None,
            date_of_birth,
            is_unavailable: false,
            commitments: Commitments::default(),
        }
    }

    pub fn current_status(&self) -> StaffAvailabilityStatus {
        if self.is_unavailable {
            StaffAvailabilityStatus::Unavailable
        } else if self.commitments.current_trip.is_some() {
            StaffAvailabilityStatus::OnDuty
        } else {
            StaffAvailabilityStatus::Available
        }
    }

    pub fn is_available(&self, from: Time, to: Time, trips: &HashMap<TripId, Trip>) -> bool {
        self.is_free(from, to, trips)
    }

    /// Free over the window and not marked unavailable by hand.
    pub fn can_be_assigned(&self, from: Time, to: Time, trips: &HashMap<TripId, Trip>) -> bool {
        !self.is_unavailable && self.is_available(from, to, trips)
    }

    /// Hours spent on completed trips, measured up to their estimated arrival.
    pub fn total_trip_hours(&self, trips: &HashMap<TripId, Trip>) -> f64 {
        let minutes: i64 = self
            .commitments
            .trips
            .iter()
            .filter_map(|id| trips.get(id))
            .filter(|t| t.is_completed())
            .map(|t| t.scheduled_departure_time.minutes_until(t.estimated_arrival_time()))
            .sum();
        minutes as f64 / 60.0
    }
}

impl Resource for Staff {
    fn commitments(&self) -> &Commitments {
        &self.commitments
    }

    fn commitments_mut(&mut self) -> &mut Commitments {
        &mut self.commitments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::Route;
    use crate::time::at;
    use std::sync::Arc;

    fn pilot() -> Staff {
        Staff::new(
            "Anna Nowak",
            StaffRole::Pilot,
            Gender::Female,
            "anna@example.com",
            NaiveDate::from_ymd_opt(1985, 3, 14).unwrap(),
        )
    }

    #[test]
    fn test_status_precedence() {
        let mut staff = pilot();
        assert_eq!(StaffAvailabilityStatus::Available, staff.current_status());

        staff.begin_trip(Uuid::new_v4());
        assert_eq!(StaffAvailabilityStatus::OnDuty, staff.current_status());

        staff.is_unavailable = true;
        assert_eq!(StaffAvailabilityStatus::Unavailable, staff.current_status());
    }

    #[test]
    fn test_manual_flag_blocks_assignment_only() {
        let mut staff = pilot();
        staff.is_unavailable = true;
        let trips = HashMap::new();
        let (from, to) = (at(9, 0), at(10, 0));

        assert!(staff.is_available(from, to, &trips));
        assert!(!staff.can_be_assigned(from, to, &trips));
    }

    fn shuttle(departure: Time) -> Trip {
        let mut route = Route::starting_at("KRK-WAW", Uuid::new_v4());
        route.add_node(Uuid::new_v4(), 90);
        Trip::new(Arc::new(route), Uuid::new_v4(), vec![], departure, "LO1")
    }

    #[test]
    fn test_trip_hours_cover_completed_trips_only() {
        let mut staff = pilot();
        let mut trips = HashMap::new();
        assert_eq!(0.0, staff.total_trip_hours(&trips));

        let mut on_time = shuttle(at(6, 0));
        on_time.start(at(6, 0));
        on_time.record_arrival(at(8, 0));
        // 30 minutes late: 150 minutes from scheduled departure
        let mut late = shuttle(at(9, 0));
        late.start(at(9, 0));
        late.record_arrival(at(11, 30));
        let mut aborted = shuttle(at(13, 0));
        aborted.start(at(13, 0));
        aborted.cancel();
        let mut flying = shuttle(at(15, 0));
        flying.start(at(15, 0));

        for trip in [on_time, late, aborted, flying] {
            staff.commitments.trips.push(trip.id);
            trips.insert(trip.id, trip);
        }

        assert_eq!(4.5, staff.total_trip_hours(&trips));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!("\"CO_PILOT\"", serde_json::to_string(&StaffRole::CoPilot).unwrap());
        assert_eq!("Cabin Crew", StaffRole::CabinCrew.to_string());
    }
}
