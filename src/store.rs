use crate::aircraft::{Aircraft, AircraftId};
use crate::airport::Airport;
use crate::error::{Error, Result};
use crate::route::{Route, RouteId};
use crate::staff::{Staff, StaffId};
use crate::time::Time;
use crate::trip::{Trip, TripId, TripNodeStatus};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Everything the schedule owns, flattened into lists. Trips refer to
/// their route by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub airports: Vec<Airport>,
    pub routes: Vec<Route>,
    pub aircraft: Vec<Aircraft>,
    pub staff: Vec<Staff>,
    pub trips: Vec<TripRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: TripId,
    pub route_id: RouteId,
    pub aircraft_id: AircraftId,
    pub staff_ids: Vec<StaffId>,
    pub scheduled_departure_time: Time,
    pub flight_number: String,
    #[serde(default)]
    pub is_cancelled: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default = "first_stop")]
    pub current_airport_sequence: usize,
    #[serde(default)]
    pub node_statuses: Vec<TripNodeStatus>,
}

fn first_stop() -> usize {
    1
}

impl From<&Trip> for TripRecord {
    fn from(trip: &Trip) -> Self {
        TripRecord {
            id: trip.id,
            route_id: trip.route.id,
            aircraft_id: trip.aircraft_id,
            staff_ids: trip.staff_ids.clone(),
            scheduled_departure_time: trip.scheduled_departure_time,
            flight_number: trip.flight_number.clone(),
            is_cancelled: trip.is_cancelled,
            is_completed: trip.is_completed,
            current_airport_sequence: trip.current_airport_sequence,
            node_statuses: trip.node_statuses.clone(),
        }
    }
}

impl TripRecord {
    /// Rebuilds the trip on top of its route, rejecting records whose
    /// progress does not fit that route.
    pub fn into_trip(self, route: Arc<Route>) -> Result<Trip> {
        let stops = route.nodes.len();
        if !route.can_be_flown() {
            return Err(Error::CorruptSnapshot(format!(
                "trip {} runs on route '{}' with {} stops",
                self.flight_number, route.name, stops
            )));
        }
        // not started yet, or one status per stop reached so far
        let in_step = if self.node_statuses.is_empty() {
            self.current_airport_sequence == 1
        } else {
            self.node_statuses.len() == self.current_airport_sequence
        };
        if !in_step || self.current_airport_sequence > stops {
            return Err(Error::CorruptSnapshot(format!(
                "trip {} is at stop {} with {} statuses on a {}-stop route",
                self.flight_number,
                self.current_airport_sequence,
                self.node_statuses.len(),
                stops
            )));
        }
        if self.is_cancelled && self.is_completed {
            return Err(Error::CorruptSnapshot(format!(
                "trip {} is both cancelled and completed",
                self.flight_number
            )));
        }

        Ok(Trip {
            id: self.id,
            route,
            aircraft_id: self.aircraft_id,
            staff_ids: self.staff_ids,
            scheduled_departure_time: self.scheduled_departure_time,
            flight_number: self.flight_number,
            is_cancelled: self.is_cancelled,
            is_completed: self.is_completed,
            current_airport_sequence: self.current_airport_sequence,
            node_statuses: self.node_statuses,
        })
    }
}

/// Where committed schedules go. A commit either lands as a whole or fails.
pub trait Store {
    fn load(&self) -> Result<Snapshot>;

    fn commit(&mut self, snapshot: &Snapshot) -> Result<()>;
}

/// Keeps the snapshot as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persistence_error(&self, source: std::io::Error) -> Error {
        Error::Persistence {
            path: self.path.clone(),
            source,
        }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Snapshot> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| self.persistence_error(e))?;
        let snapshot = serde_json::from_str(&data)?;
        Ok(snapshot)
    }

    fn commit(&mut self, snapshot: &Snapshot) -> Result<()> {
        let data = serde_json::to_string_pretty(snapshot)?;
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, data).map_err(|e| self.persistence_error(e))?;
        std::fs::rename(&staging, &self.path).map_err(|e| self.persistence_error(e))?;
        debug!(path = %self.path.display(), trips = snapshot.trips.len(), "schedule committed");
        Ok(())
    }
}

/// Holds the last committed snapshot in memory. Can be told to reject the
/// next commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: Option<Snapshot>,
    reject_next: Option<String>,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        MemoryStore {
            committed: Some(snapshot),
            ..MemoryStore::default()
        }
    }

    pub fn reject_next_commit(&mut self, reason: &str) {
        self.reject_next = Some(reason.to_string());
    }

    pub fn committed(&self) -> Option<&Snapshot> {
        self.committed.as_ref()
    }

    pub fn commits(&self) -> usize {
        self.commits
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Snapshot> {
        Ok(self.committed.clone().unwrap_or_default())
    }

    fn commit(&mut self, snapshot: &Snapshot) -> Result<()> {
        if let Some(reason) = self.reject_next.take() {
            return Err(Error::StoreRejected(reason));
        }
        self.committed = Some(snapshot.clone());
        self.commits += 1;
        Ok(())
    }
}
