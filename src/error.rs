//! Error types for flightops.
//!
//! Transitions that do not fit the trip's current state are not errors; they
//! are ignored by the trip itself. What ends up here are lookups of entities
//! that do not exist, routes that fail registration, persistence and
//! configuration failures.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

use crate::route::RouteError;

/// The main error type for flightops operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Lookup Errors ===
    /// No trip with this id is known to the schedule.
    #[error("unknown trip {0}")]
    UnknownTrip(Uuid),

    /// No trip carries this flight number.
    #[error("unknown flight {0}")]
    UnknownFlight(String),

    /// No route with this id is known to the schedule.
    #[error("unknown route {0}")]
    UnknownRoute(Uuid),

    /// No aircraft with this id or registration is known to the schedule.
    #[error("unknown aircraft {0}")]
    UnknownAircraft(String),

    /// No staff member with this id is known to the schedule.
    #[error("unknown staff member {0}")]
    UnknownStaff(Uuid),

    /// No airport with this id is known to the schedule.
    #[error("unknown airport {0}")]
    UnknownAirport(Uuid),

    // === Registration Errors ===
    /// A route failed the registration rules.
    #[error("invalid route '{name}': {source}")]
    InvalidRoute {
        /// Name of the rejected route.
        name: String,
        /// The rule it broke.
        #[source]
        source: RouteError,
    },

    /// A timestamp could not be parsed.
    #[error("invalid time '{input}', expected YYYY-MM-DDTHH:MM")]
    InvalidTime {
        /// The rejected input.
        input: String,
    },

    // === Persistence Errors ===
    /// Committing or loading a snapshot failed.
    #[error("failed to persist schedule at {path}: {source}")]
    Persistence {
        /// Where the snapshot lives.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A loaded snapshot breaks the trip invariants.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// A store refused the commit for a reason of its own.
    #[error("store rejected commit: {0}")]
    StoreRejected(String),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },
}

/// A specialized Result type for flightops operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Check if this error came out of the persistence layer.
    #[must_use]
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::StoreRejected(_))
    }
}
