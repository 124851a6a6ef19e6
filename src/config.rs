//! Configuration for the flightops console.
//!
//! Loaded with figment from defaults, an optional TOML file and
//! `FLIGHTOPS_`-prefixed environment variables.

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::Verbosity;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "flightops.toml";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTOPS_`)
/// 2. TOML config file, `flightops.toml` unless another path is given
/// 3. Default values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON snapshot the console loads and saves.
    pub scenario: PathBuf,
    /// How far ahead the dashboard lists upcoming trips.
    pub upcoming_window_hours: u32,
    /// Log level used when `RUST_LOG` is not set.
    pub verbosity: Verbosity,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scenario: PathBuf::from("data/default.json"),
            upcoming_window_hours: 6,
            verbosity: Verbosity::Normal,
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result fails
    /// validation.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLIGHTOPS_"));

        Self::from_figment(figment)
    }

    /// Extract and validate a configuration from an assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.upcoming_window_hours == 0 {
            return Err(Error::ConfigValidation {
                message: "upcoming_window_hours must be greater than 0".to_string(),
            });
        }

        if self.scenario.as_os_str().is_empty() {
            return Err(Error::ConfigValidation {
                message: "scenario path must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
