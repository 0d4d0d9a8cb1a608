//! Scenario configuration for the simulation core.
//!
//! This module provides the caller-constructed configuration surface: the
//! central body, the initial spherical orbital elements, per-rate-group
//! periods, the stop time, and the atmosphere density table consumed by an
//! external atmosphere model. Configurations load from YAML or JSON files
//! declaratively, or are built programmatically.
//!
//! # Configuration File Structure
//!
//! ```yaml
//! body: earth
//! stop_time_s: 60.0
//!
//! initial_state:
//!   radius: 6503000.0
//!   longitude: 0.0
//!   latitude: 0.0
//!   speed: 11200.0
//!   flight_path_angle: -0.0899
//!   heading: 1.5707963267948966
//!
//! rate_groups:
//!   - name: dynamics
//!     period_s: 0.025
//!   - name: imu
//!     period_s: 0.01
//!   - name: str
//!     period_s: 1.0
//!
//! atmosphere_table: supportData/EarthGRAMNominal.txt
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orbit::SphericalState;
use crate::types::{sec_to_nanos, SimTime};

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("atmosphere table, line {line}: {reason}")]
    Table { line: usize, reason: String },

    #[error("unknown file format: {0}")]
    UnknownFormat(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// The central gravitational body of the scenario.
///
/// Two bodies are supported; each carries a gravitational parameter and an
/// equatorial radius.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralBody {
    Earth,
    Mars,
}

impl CentralBody {
    /// Gravitational parameter mu [m^3/s^2].
    pub fn mu(&self) -> f64 {
        match self {
            CentralBody::Earth => 3.986_004_415e14,
            CentralBody::Mars => 4.282_831_0e13,
        }
    }

    /// Equatorial radius [m], the altitude reference for the atmosphere
    /// table.
    pub fn equatorial_radius(&self) -> f64 {
        match self {
            CentralBody::Earth => 6_378_136.6,
            CentralBody::Mars => 3_397_200.0,
        }
    }
}

/// One sample of the atmosphere table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtmoSample {
    /// Geometric altitude above the equatorial radius [m]
    pub altitude: f64,
    /// Neutral density [kg/m^3]
    pub density: f64,
    /// Temperature [K]
    pub temperature: f64,
}

/// An ordered altitude/density/temperature table.
///
/// Parsed from whitespace-delimited text, one sample per line; lines
/// starting with `#` are skipped. The interpolation algorithm that consumes
/// the table lives in the external atmosphere model, not here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereTable {
    samples: Vec<AtmoSample>,
}

impl AtmosphereTable {
    /// Parses a table from text.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut samples = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(ConfigError::Table {
                    line: idx + 1,
                    reason: format!("expected 3 columns, found {}", fields.len()),
                });
            }
            let parse = |s: &str| -> ConfigResult<f64> {
                s.parse().map_err(|_| ConfigError::Table {
                    line: idx + 1,
                    reason: format!("not a number: {}", s),
                })
            };
            samples.push(AtmoSample {
                altitude: parse(fields[0])?,
                density: parse(fields[1])?,
                temperature: parse(fields[2])?,
            });
        }

        let table = Self { samples };
        table.validate()?;
        Ok(table)
    }

    /// Reads and parses a table file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Checks that the table is non-empty with strictly increasing altitude.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.samples.is_empty() {
            return Err(ConfigError::Validation(
                "atmosphere table has no samples".to_string(),
            ));
        }
        for pair in self.samples.windows(2) {
            if pair[1].altitude <= pair[0].altitude {
                return Err(ConfigError::Validation(format!(
                    "atmosphere table altitude not increasing at {} m",
                    pair[1].altitude
                )));
            }
        }
        Ok(())
    }

    /// The parsed samples, in increasing-altitude order.
    pub fn samples(&self) -> &[AtmoSample] {
        &self.samples
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the table holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Altitude span covered by the table, as (lowest, highest) [m].
    pub fn altitude_span(&self) -> Option<(f64, f64)> {
        match (self.samples.first(), self.samples.last()) {
            (Some(lo), Some(hi)) => Some((lo.altitude, hi.altitude)),
            _ => None,
        }
    }
}

/// Name and period of one rate group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateGroupSpec {
    /// Group name, e.g. `"dynamics"` or `"imu"`
    pub name: String,
    /// Update period in seconds
    pub period_s: f64,
}

impl RateGroupSpec {
    /// The period in simulated nanoseconds.
    pub fn period(&self) -> SimTime {
        sec_to_nanos(self.period_s)
    }
}

/// Complete scenario configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Central gravitational body
    pub body: CentralBody,

    /// Initial spherical orbital elements
    pub initial_state: SphericalState,

    /// Rate groups and their periods
    pub rate_groups: Vec<RateGroupSpec>,

    /// Total simulated duration in seconds
    pub stop_time_s: f64,

    /// Optional path to the atmosphere density table
    #[serde(default)]
    pub atmosphere_table: Option<PathBuf>,
}

impl ScenarioConfig {
    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: ScenarioConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON string.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: ScenarioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file, auto-detecting the format from the
    /// extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let content = std::fs::read_to_string(path)?;

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::UnknownFormat(ext.to_string())),
        }
    }

    /// Validates the scenario parameters.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_state.radius <= 0.0 {
            return Err(ConfigError::Validation(
                "initial radius must be positive".to_string(),
            ));
        }
        if self.initial_state.speed < 0.0 {
            return Err(ConfigError::Validation(
                "initial speed must be non-negative".to_string(),
            ));
        }
        if self.stop_time_s <= 0.0 {
            return Err(ConfigError::Validation(
                "stop time must be positive".to_string(),
            ));
        }
        if self.rate_groups.is_empty() {
            return Err(ConfigError::Validation(
                "at least one rate group is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for group in &self.rate_groups {
            if group.period_s <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "rate group {} has a non-positive period",
                    group.name
                )));
            }
            if !names.insert(group.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate rate group name: {}",
                    group.name
                )));
            }
        }
        Ok(())
    }

    /// The stop time in simulated nanoseconds.
    pub fn stop_time(&self) -> SimTime {
        sec_to_nanos(self.stop_time_s)
    }

    /// Looks up a rate group by name.
    pub fn rate_group(&self, name: &str) -> Option<&RateGroupSpec> {
        self.rate_groups.iter().find(|g| g.name == name)
    }

    /// Serializes to YAML.
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Earth arrival preset: 6503 km radius, 11.2 km/s entry speed, -5.15 deg
/// flight-path angle, 60 s run.
///
/// These values are example scenario data, not a contract.
pub fn earth_aerocapture() -> ScenarioConfig {
    ScenarioConfig {
        body: CentralBody::Earth,
        initial_state: SphericalState {
            radius: 6_503_000.0,
            longitude: 0.0,
            latitude: 0.0,
            speed: 11_200.0,
            flight_path_angle: -5.15f64.to_radians(),
            heading: std::f64::consts::FRAC_PI_2,
        },
        rate_groups: default_rate_groups(),
        stop_time_s: 60.0,
        atmosphere_table: None,
    }
}

/// Mars arrival preset: 125 km entry altitude, 6 km/s entry speed, -10 deg
/// flight-path angle, 400 s run.
pub fn mars_aerocapture() -> ScenarioConfig {
    ScenarioConfig {
        body: CentralBody::Mars,
        initial_state: SphericalState {
            radius: 3_397_200.0 + 125_000.0,
            longitude: 0.0,
            latitude: 0.0,
            speed: 6_000.0,
            flight_path_angle: -10.0f64.to_radians(),
            heading: std::f64::consts::FRAC_PI_2,
        },
        rate_groups: default_rate_groups(),
        stop_time_s: 400.0,
        atmosphere_table: None,
    }
}

fn default_rate_groups() -> Vec<RateGroupSpec> {
    vec![
        RateGroupSpec {
            name: "dynamics".to_string(),
            period_s: 0.025,
        },
        RateGroupSpec {
            name: "imu".to_string(),
            period_s: 0.01,
        },
        RateGroupSpec {
            name: "str".to_string(),
            period_s: 1.0,
        },
    ]
}
