use crate::airport::AirportId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

pub type RouteId = Uuid;
pub type RouteNodeId = Uuid;

/// Ground time added after every leg unless the caller picks another one.
pub const DEFAULT_TURNAROUND_MINUTES: u32 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNode {
    pub id: RouteNodeId,
    pub airport_id: AirportId,
    /// Minutes since the route's nominal start.
    pub planned_arrival_offset_minutes: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    pub nodes: Vec<RouteNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("a route needs at least two stops, found {0}")]
    TooFewStops(usize),
    #[error("airport {0} appears more than once")]
    DuplicateAirport(AirportId),
    #[error("leg {0} has no journey time")]
    EmptyLeg(usize),
}

impl Route {
    pub fn new(name: &str) -> Self {
        Route {
            id: Uuid::new_v4(),
            name: name.to_string(),
            nodes: vec![],
        }
    }

    /// A route whose origin sits at offset zero.
    pub fn starting_at(name: &str, origin: AirportId) -> Self {
        let mut route = Route::new(name);
        route.add_node_with_turnaround(origin, 0, 0);
        route
    }

    pub fn add_node(&mut self, airport_id: AirportId, journey_time_minutes: u32) -> &mut Self {
        self.add_node_with_turnaround(airport_id, journey_time_minutes, DEFAULT_TURNAROUND_MINUTES)
    }

    pub fn add_node_with_turnaround(
        &mut self,
        airport_id: AirportId,
        journey_time_minutes: u32,
        turn_around_time_minutes: u32,
    ) -> &mut Self {
        let previous_offset = self
            .nodes
            .last()
            .map(|n| n.planned_arrival_offset_minutes)
            .unwrap_or(0);
        self.nodes.push(RouteNode {
            id: Uuid::new_v4(),
            airport_id,
            planned_arrival_offset_minutes: previous_offset
                .saturating_add(journey_time_minutes)
                .saturating_add(turn_around_time_minutes),
        });
        self
    }

    pub fn total_planned_duration_minutes(&self) -> u32 {
        self.nodes
            .last()
            .map(|n| n.planned_arrival_offset_minutes)
            .unwrap_or(0)
    }

    /// Node at a 1-based sequence position.
    pub fn node(&self, sequence: usize) -> Option<&RouteNode> {
        sequence.checked_sub(1).and_then(|i| self.nodes.get(i))
    }

    pub fn can_be_flown(&self) -> bool {
        self.nodes.len() >= 2
    }

    /// Rules a route has to satisfy before it is registered.
    pub fn validate(&self) -> Result<(), RouteError> {
        if !self.can_be_flown() {
            return Err(RouteError::TooFewStops(self.nodes.len()));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.nodes.iter().find(|n| !seen.insert(n.airport_id)) {
            return Err(RouteError::DuplicateAirport(dup.airport_id));
        }

        if let Some(leg) = self.nodes.windows(2).position(|pair| {
            pair[1].planned_arrival_offset_minutes <= pair[0].planned_arrival_offset_minutes
        }) {
            return Err(RouteError::EmptyLeg(leg + 1));
        }

        Ok(())
    }
}
