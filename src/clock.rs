use crate::time::Time;
use chrono::Local;

/// Source of "now" for the console and the dashboard. Transitions never ask
/// a clock; they take their timestamps as arguments.
pub trait Clock {
    fn now(&self) -> Time;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Time {
        Time::new(Local::now().naive_local())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Time);

impl FixedClock {
    pub fn advance(&mut self, minutes: i64) {
        self.0 += minutes;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Time {
        self.0
    }
}
