//! `flightops` - trip lifecycle and resource availability for a small airline
//!
//! A [`Schedule`] owns airports, routes, aircraft, crew and trips. Trips move
//! through their stops as departures and arrivals are recorded, and every
//! transition keeps the aircraft and crew back-references in step.

#![deny(unsafe_code)]

pub mod aircraft;
pub mod airport;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod resource;
pub mod route;
pub mod schedule;
pub mod staff;
pub mod store;
pub mod time;
pub mod trip;

pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use schedule::Schedule;
pub use store::{JsonFileStore, Store};
pub use time::Time;
pub use trip::{Trip, TripStatus};
