use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use crate::error::Error;

const FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A wall-clock instant. All scheduling happens in one implicit calendar,
/// so there is no timezone attached.
#[derive(Debug, Clone, Copy, Ord, Eq, PartialEq, Hash, Serialize, Deserialize, PartialOrd)]
#[serde(transparent)]
pub struct Time(pub NaiveDateTime);

impl Time {
    pub fn new(date_time: NaiveDateTime) -> Self {
        Time(date_time)
    }

    /// `existing` blocks `window` unless they only touch at an endpoint.
    pub fn is_overlapping(existing: &(Time, Time), window: &(Time, Time)) -> bool {
        existing.1 > window.0 && existing.0 < window.1
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Signed whole minutes from `self` to `later`, truncated toward zero.
    pub fn minutes_until(&self, later: Time) -> i64 {
        (later.0 - self.0).num_minutes()
    }
}

impl std::fmt::Display for Time {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for Time {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
            .map(Time)
            .map_err(|_| Error::InvalidTime {
                input: s.to_string(),
            })
    }
}

impl Add<i64> for Time {
    type Output = Self;

    fn add(self, minutes: i64) -> Self::Output {
        Time(self.0 + Duration::minutes(minutes))
    }
}

impl Sub<i64> for Time {
    type Output = Self;

    fn sub(self, minutes: i64) -> Self::Output {
        Time(self.0 - Duration::minutes(minutes))
    }
}

impl Sub<Time> for Time {
    type Output = i64;

    fn sub(self, rhs: Time) -> Self::Output {
        rhs.minutes_until(self)
    }
}

impl AddAssign<i64> for Time {
    fn add_assign(&mut self, minutes: i64) {
        self.0 += Duration::minutes(minutes);
    }
}

#[cfg(test)]
pub(crate) fn at(hour: u32, minute: u32) -> Time {
    on(2024, 5, 17, hour, minute)
}

#[cfg(test)]
pub(crate) fn on(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Time {
    let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
    Time(date.and_hms_opt(hour, minute, 0).unwrap())
}
