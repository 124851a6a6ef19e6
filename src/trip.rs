use crate::aircraft::AircraftId;
use crate::route::{Route, RouteNode};
use crate::staff::StaffId;
use crate::time::Time;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

pub type TripId = Uuid;
pub type TripNodeStatusId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Scheduled,
    OnTime,
    Delayed,
    Cancelled,
    Completed,
}

impl TripStatus {
    pub const ALL: [TripStatus; 5] = [
        TripStatus::OnTime,
        TripStatus::Delayed,
        TripStatus::Cancelled,
        TripStatus::Scheduled,
        TripStatus::Completed,
    ];
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TripStatus::Scheduled => "Scheduled",
            TripStatus::OnTime => "On-Time",
            TripStatus::Delayed => "Delayed",
            TripStatus::Cancelled => "Cancelled",
            TripStatus::Completed => "Completed",
        };
        write!(f, "{}", label)
    }
}

/// What a transition did to the trip, and therefore which cascade the
/// schedule still has to apply to the aircraft and crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripEvent {
    Ignored,
    Started,
    Departed,
    Arrived,
    Completed,
    Cancelled {
        had_started: bool,
        /// Estimated arrival right before the cancelled flag was set.
        reference_arrival: Time,
    },
}

/// Actual times recorded for one stop of a trip in progress.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TripNodeStatus {
    pub id: TripNodeStatusId,
    pub route_node: RouteNode,
    pub sequence: usize,
    pub actual_arrival_time: Option<Time>,
    pub actual_departure_time: Option<Time>,
}

impl TripNodeStatus {
    pub fn new(route_node: RouteNode, sequence: usize) -> Self {
        TripNodeStatus {
            id: Uuid::new_v4(),
            route_node,
            sequence,
            actual_arrival_time: None,
            actual_departure_time: None,
        }
    }

    /// Signed minutes this stop runs behind its schedule; positive is late.
    ///
    /// Once landed the arrival is compared against
    /// `trip_start_time + planned_arrival_offset_minutes`. Before that the
    /// recorded departure is compared against `trip_start_time`. A stop with
    /// nothing recorded yet has no opinion.
    pub fn total_delay_minutes(&self, trip_start_time: Time) -> Option<i64> {
        match (self.actual_arrival_time, self.actual_departure_time) {
            (Some(arrival), _) => {
                let scheduled =
                    trip_start_time + i64::from(self.route_node.planned_arrival_offset_minutes);
                Some(scheduled.minutes_until(arrival))
            }
            (None, Some(departure)) => Some(trip_start_time.minutes_until(departure)),
            (None, None) => None,
        }
    }

    pub fn last_recorded_time(&self) -> Option<Time> {
        self.actual_departure_time.or(self.actual_arrival_time)
    }
}

#[derive(Clone, Debug)]
pub struct Trip {
    pub id: TripId,
    pub route: Arc<Route>,
    pub aircraft_id: AircraftId,
    pub staff_ids: Vec<StaffId>,
    pub scheduled_departure_time: Time,
    pub flight_number: String,
    pub(crate) is_cancelled: bool,
    pub(crate) is_completed: bool,
    pub(crate) current_airport_sequence: usize,
    pub(crate) node_statuses: Vec<TripNodeStatus>,
}

impl Trip {
    pub fn new(
        route: Arc<Route>,
        aircraft_id: AircraftId,
        staff_ids: Vec<StaffId>,
        scheduled_departure_time: Time,
        flight_number: &str,
    ) -> Self {
        let mut staff_ids = staff_ids;
        let mut seen = std::collections::HashSet::new();
        staff_ids.retain(|id| seen.insert(*id));
        Trip {
            id: Uuid::new_v4(),
            route,
            aircraft_id,
            staff_ids,
            scheduled_departure_time,
            flight_number: flight_number.to_string(),
            is_cancelled: false,
            is_completed: false,
            current_airport_sequence: 1,
            node_statuses: vec![],
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.is_cancelled
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn is_active(&self) -> bool {
        !self.is_cancelled && !self.is_completed
    }

    pub fn has_started(&self) -> bool {
        !self.node_statuses.is_empty()
    }

    pub fn current_airport_sequence(&self) -> usize {
        self.current_airport_sequence
    }

    pub fn node_statuses(&self) -> &[TripNodeStatus] {
        &self.node_statuses
    }

    /// Route node the trip is currently heading to or standing at.
    pub fn planned_route_node(&self) -> Option<&RouteNode> {
        self.route.node(self.current_airport_sequence)
    }

    pub fn current_status(&self) -> TripStatus {
        if self.node_statuses.is_empty() {
            return if self.is_cancelled {
                TripStatus::Cancelled
            } else {
                TripStatus::Scheduled
            };
        }
        // a positive delay outranks both terminal flags
        if self.total_delayed_minutes() > 0 {
            TripStatus::Delayed
        } else if self.is_cancelled {
            TripStatus::Cancelled
        } else if self.is_completed {
            TripStatus::Completed
        } else {
            TripStatus::OnTime
        }
    }

    pub fn total_delayed_minutes(&self) -> i64 {
        self.node_statuses
            .iter()
            .rev()
            .find_map(|s| s.total_delay_minutes(self.scheduled_departure_time))
            .unwrap_or(0)
    }

    pub fn planned_arrival_time(&self) -> Time {
        self.scheduled_departure_time + i64::from(self.route.total_planned_duration_minutes())
    }

    pub fn estimated_arrival_time(&self) -> Time {
        if self.is_cancelled {
            return self
                .node_statuses
                .iter()
                .rev()
                .find_map(TripNodeStatus::last_recorded_time)
                .unwrap_or(self.scheduled_departure_time);
        }
        if self.node_statuses.is_empty() {
            return self.planned_arrival_time();
        }
        self.planned_arrival_time() + self.total_delayed_minutes()
    }

    /// Interval the trip keeps its aircraft and crew busy.
    pub fn window(&self) -> (Time, Time) {
        (self.scheduled_departure_time, self.estimated_arrival_time())
    }

    pub fn start(&mut self, departure_time: Time) -> TripEvent {
        if self.is_cancelled || self.is_completed {
            return TripEvent::Ignored;
        }
        let Some(origin) = self.route.node(1).cloned() else {
            return TripEvent::Ignored;
        };

        self.node_statuses.clear();
        self.current_airport_sequence = 1;
        let mut status = TripNodeStatus::new(origin, 1);
        status.actual_departure_time = Some(departure_time);
        self.node_statuses.push(status);
        self.schedule_next_airport();
        TripEvent::Started
    }

    /// Moves on to the next stop; refuses to step past the last one.
    fn schedule_next_airport(&mut self) -> bool {
        if self.current_airport_sequence >= self.route.nodes.len() {
            return false;
        }
        self.current_airport_sequence += 1;
        let Some(node) = self.planned_route_node().cloned() else {
            return false;
        };
        self.node_statuses
            .push(TripNodeStatus::new(node, self.current_airport_sequence));
        true
    }

    pub fn record_arrival(&mut self, arrival_time: Time) -> TripEvent {
        if self.is_cancelled || self.is_completed {
            return TripEvent::Ignored;
        }
        let Some(status) = self.node_statuses.last_mut() else {
            return TripEvent::Ignored;
        };

        status.actual_arrival_time = Some(arrival_time);
        if self.current_airport_sequence == self.route.nodes.len() {
            self.is_completed = true;
            TripEvent::Completed
        } else {
            TripEvent::Arrived
        }
    }

    pub fn record_departure(&mut self, departure_time: Time) -> TripEvent {
        if self.is_cancelled {
            return TripEvent::Ignored;
        }
        if self.node_statuses.is_empty() {
            return self.start(departure_time);
        }
        if self.is_completed || self.current_airport_sequence >= self.route.nodes.len() {
            return TripEvent::Ignored;
        }

        if let Some(status) = self.node_statuses.last_mut() {
            status.actual_departure_time = Some(departure_time);
        }
        self.schedule_next_airport();
        TripEvent::Departed
    }

    pub fn cancel(&mut self) -> TripEvent {
        if self.is_cancelled || self.is_completed {
            return TripEvent::Ignored;
        }
        let had_started = self.has_started();
        let reference_arrival = self.estimated_arrival_time();
        self.is_cancelled = true;
        TripEvent::Cancelled {
            had_started,
            reference_arrival,
        }
    }
}

impl PartialEq for Trip {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::at;
    use proptest::prelude::*;

    fn route(legs: &[u32]) -> Arc<Route> {
        let mut route = Route::starting_at("test", Uuid::new_v4());
        for journey in legs {
            route.add_node(Uuid::new_v4(), *journey);
        }
        Arc::new(route)
    }

    fn trip(legs: &[u32], departure: Time) -> Trip {
        Trip::new(route(legs), Uuid::new_v4(), vec![], departure, "LO100")
    }

    #[test]
    fn test_node_delay_after_arrival() {
        let node = route(&[120]).nodes[1].clone();
        let mut status = TripNodeStatus::new(node, 2);
        status.actual_arrival_time = Some(at(9, 0) + 160);
        assert_eq!(Some(10), status.total_delay_minutes(at(9, 0)));

        status.actual_arrival_time = Some(at(9, 0) + 140);
        assert_eq!(Some(-10), status.total_delay_minutes(at(9, 0)));
    }

    #[test]
    fn test_node_delay_before_arrival_uses_departure() {
        let node = route(&[120]).nodes[0].clone();
        let mut status = TripNodeStatus::new(node, 1);
        assert_eq!(None, status.total_delay_minutes(at(9, 0)));

        status.actual_departure_time = Some(at(9, 25));
        assert_eq!(Some(25), status.total_delay_minutes(at(9, 0)));
    }

    #[test]
    fn test_start_opens_first_two_legs() {
        let mut trip = trip(&[120], at(9, 0));
        assert_eq!(TripStatus::Scheduled, trip.current_status());

        assert_eq!(TripEvent::Started, trip.start(at(9, 0)));
        assert_eq!(2, trip.current_airport_sequence());
        assert_eq!(2, trip.node_statuses().len());
        assert_eq!(Some(at(9, 0)), trip.node_statuses()[0].actual_departure_time);
        assert_eq!(None, trip.node_statuses()[1].actual_departure_time);
        assert_eq!(None, trip.node_statuses()[1].actual_arrival_time);
        assert_eq!(TripStatus::OnTime, trip.current_status());
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut trip = trip(&[60, 60], at(9, 0));
        trip.start(at(9, 0));
        trip.record_arrival(at(10, 30));
        trip.record_departure(at(11, 0));
        assert_eq!(3, trip.current_airport_sequence());

        trip.start(at(9, 5));
        assert_eq!(2, trip.current_airport_sequence());
        assert_eq!(2, trip.node_statuses().len());
        assert_eq!(5, trip.total_delayed_minutes());
    }

    #[test]
    fn test_single_leg_trip_completes_late() {
        let mut trip = trip(&[120], at(9, 0));
        trip.start(at(9, 0));
        assert_eq!(TripEvent::Completed, trip.record_arrival(at(9, 0) + 160));

        assert!(trip.is_completed());
        assert_eq!(10, trip.total_delayed_minutes());
        assert_eq!(TripStatus::Delayed, trip.current_status());
        assert_eq!(at(9, 0) + 160, trip.estimated_arrival_time());
    }

    #[test]
    fn test_on_time_completion_reports_completed() {
        let mut trip = trip(&[120], at(9, 0));
        trip.start(at(9, 0));
        trip.record_arrival(at(11, 20));
        assert_eq!(-10, trip.total_delayed_minutes());
        assert_eq!(TripStatus::Completed, trip.current_status());
    }

    #[test]
    fn test_multi_leg_progress() {
        let mut trip = trip(&[60, 90], at(9, 0));
        trip.start(at(9, 0));
        assert_eq!(TripEvent::Arrived, trip.record_arrival(at(10, 40)));
        assert_eq!(10, trip.total_delayed_minutes());
        assert_eq!(TripStatus::Delayed, trip.current_status());
        assert_eq!(trip.planned_arrival_time() + 10, trip.estimated_arrival_time());

        assert_eq!(TripEvent::Departed, trip.record_departure(at(11, 0)));
        assert_eq!(3, trip.current_airport_sequence());
        assert_eq!(3, trip.node_statuses().len());

        assert_eq!(TripEvent::Completed, trip.record_arrival(at(12, 20)));
        assert_eq!(-10, trip.total_delayed_minutes());
        assert_eq!(TripStatus::Completed, trip.current_status());
    }

    #[test]
    fn test_departure_from_final_stop_is_ignored() {
        let mut trip = trip(&[60], at(9, 0));
        trip.start(at(9, 0));
        assert_eq!(TripEvent::Ignored, trip.record_departure(at(9, 30)));
        assert_eq!(2, trip.node_statuses().len());
        assert_eq!(2, trip.current_airport_sequence());
    }

    #[test]
    fn test_first_departure_starts_trip() {
        let mut trip = trip(&[60], at(9, 0));
        assert_eq!(TripEvent::Started, trip.record_departure(at(9, 10)));
        assert_eq!(2, trip.node_statuses().len());
        assert_eq!(10, trip.total_delayed_minutes());
    }

    #[test]
    fn test_arrival_before_start_is_ignored() {
        let mut trip = trip(&[60], at(9, 0));
        assert_eq!(TripEvent::Ignored, trip.record_arrival(at(10, 0)));
        assert!(trip.node_statuses().is_empty());
    }

    #[test]
    fn test_cancel_never_started() {
        let mut trip = trip(&[120], at(9, 0));
        assert_eq!(
            TripEvent::Cancelled {
                had_started: false,
                reference_arrival: at(11, 30)
            },
            trip.cancel()
        );
        assert_eq!(at(9, 0), trip.estimated_arrival_time());
        assert_eq!(TripStatus::Cancelled, trip.current_status());
        assert!(!trip.is_completed());
    }

    #[test]
    fn test_cancel_in_flight_freezes_at_departure() {
        let mut trip = trip(&[120], at(9, 0));
        trip.start(at(8, 55));
        trip.cancel();
        assert_eq!(at(8, 55), trip.estimated_arrival_time());
        assert_eq!(TripStatus::Cancelled, trip.current_status());
    }

    #[test]
    fn test_cancel_with_departure_on_last_leg() {
        let mut trip = trip(&[120], at(9, 0));
        trip.start(at(9, 0));
        trip.node_statuses[1].actual_departure_time = Some(at(9, 0));
        trip.cancel();
        assert_eq!(at(9, 0), trip.estimated_arrival_time());
    }

    #[test]
    fn test_cancel_after_intermediate_landing() {
        let mut trip = trip(&[60, 60], at(9, 0));
        trip.start(at(9, 0));
        trip.record_arrival(at(10, 20));
        trip.cancel();
        assert_eq!(at(10, 20), trip.estimated_arrival_time());
    }

    #[test]
    fn test_delayed_trip_stays_delayed_after_cancel() {
        let mut trip = trip(&[60, 60], at(9, 0));
        trip.start(at(9, 0));
        trip.record_arrival(at(10, 45));
        trip.cancel();
        assert!(trip.is_cancelled());
        assert_eq!(TripStatus::Delayed, trip.current_status());
    }

    #[test]
    fn test_cancelled_trip_ignores_events() {
        let mut trip = trip(&[60, 60], at(9, 0));
        trip.start(at(9, 0));
        trip.cancel();
        let before = trip.node_statuses().to_vec();

        assert_eq!(TripEvent::Ignored, trip.record_arrival(at(10, 0)));
        assert_eq!(TripEvent::Ignored, trip.record_departure(at(10, 30)));
        assert_eq!(TripEvent::Ignored, trip.start(at(11, 0)));
        assert_eq!(TripEvent::Ignored, trip.cancel());
        assert_eq!(before, trip.node_statuses());
    }

    #[test]
    fn test_completed_trip_cannot_be_cancelled() {
        let mut trip = trip(&[60], at(9, 0));
        trip.start(at(9, 0));
        trip.record_arrival(at(10, 30));
        assert_eq!(TripEvent::Ignored, trip.cancel());
        assert!(!trip.is_cancelled());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Start(i64),
        Arrive(i64),
        Depart(i64),
        Cancel,
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..300i64).prop_map(Step::Start),
            (0..600i64).prop_map(Step::Arrive),
            (0..600i64).prop_map(Step::Depart),
            Just(Step::Cancel),
        ]
    }

    proptest! {
        #[test]
        fn test_transitions_respect_route_bounds(
            legs in prop::collection::vec(10..300u32, 1..5),
            steps in prop::collection::vec(arb_step(), 0..25)
        ) {
            let mut trip = trip(&legs, at(6, 0));
            for step in steps {
                match step {
                    Step::Start(m) => { trip.start(at(6, 0) + m); }
                    Step::Arrive(m) => { trip.record_arrival(at(6, 0) + m); }
                    Step::Depart(m) => { trip.record_departure(at(6, 0) + m); }
                    Step::Cancel => { trip.cancel(); }
                }
                prop_assert!(trip.node_statuses().len() <= trip.route.nodes.len());
                prop_assert!(trip.planned_route_node().is_some());
                prop_assert!(!(trip.is_cancelled() && trip.is_completed()));
            }
        }
    }
}
