use crate::resource::{Commitments, Resource};
use crate::staff::StaffRole;
use crate::time::Time;
use crate::trip::{Trip, TripId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

pub type AircraftId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AircraftStatus {
    Available,
    Assigned,
}

impl fmt::Display for AircraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AircraftStatus::Available => write!(f, "Available"),
            AircraftStatus::Assigned => write!(f, "Assigned"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: AircraftId,
    pub registration_number: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub seating_capacity: u32,
    #[serde(default)]
    pub minimum_staff_required: HashMap<StaffRole, u32>,
    #[serde(flatten)]
    pub commitments: Commitments,
}

impl Aircraft {
    pub fn new(
        registration_number: &str,
        kind: &str,
        seating_capacity: u32,
        minimum_staff_required: HashMap<StaffRole, u32>,
    ) -> Self {
        Aircraft {
            id: Uuid::new_v4(),
            registration_number: registration_number.to_string(),
            kind: kind.to_string(),
            seating_capacity,
            minimum_staff_required,
            commitments: Commitments::default(),
        }
    }

    pub fn current_status(&self) -> AircraftStatus {
        if self.commitments.current_trip.is_some() {
            AircraftStatus::Assigned
        } else {
            AircraftStatus::Available
        }
    }

    /// Whether the crew on hand covers every role this aircraft needs.
    pub fn is_crewed_by(&self, available_staff: &HashMap<StaffRole, u32>) -> bool {
        self.minimum_staff_required
            .iter()
            .all(|(role, needed)| available_staff.get(role).copied().unwrap_or(0) >= *needed)
    }

    pub fn is_available(
        &self,
        from: Time,
        to: Time,
        available_staff: &HashMap<StaffRole, u32>,
        trips: &HashMap<TripId, Trip>,
    ) -> bool {
        self.is_free(from, to, trips) && self.is_crewed_by(available_staff)
    }

    fn completed_trips<'a>(
        &'a self,
        trips: &'a HashMap<TripId, Trip>,
    ) -> impl Iterator<Item = &'a Trip> + 'a {
        self.commitments
            .trips
            .iter()
            .filter_map(|id| trips.get(id))
            .filter(|t| t.is_completed())
    }

    /// Trips flown to their final stop. Cancelled trips never count.
    pub fn total_trips_operated(&self, trips: &HashMap<TripId, Trip>) -> usize {
        self.completed_trips(trips).count()
    }

    /// Latest arrival among completed trips.
    pub fn last_flight_date(&self, trips: &HashMap<TripId, Trip>) -> Option<Time> {
        self.completed_trips(trips)
            .map(Trip::estimated_arrival_time)
            .max()
    }
}

impl Resource for Aircraft {
    fn commitments(&self) -> &Commitments {
        &self.commitments
    }

    fn commitments_mut(&mut self) -> &mut Commitments {
        &mut self.commitments
    }
}

impl fmt::Display for Aircraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.registration_number, self.kind)
    }
}
