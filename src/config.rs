//! # config.rs – Centralized Parameter Store
//!
//! This module holds the default simulation parameters and the runtime
//! [`SimConfig`] built from them. Keeping configuration in one place makes
//! tuning, experimentation, and testing easier.

use std::sync::Mutex;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

//
// ──────────────────────────────────────────────────────────────
//   1. BUILDING & ELEVATOR PARAMETERS
// ──────────────────────────────────────────────────────────────
//

/// Floor names used when nothing else is configured (bottom to top)
pub const DEFAULT_FLOOR_NAMES: [&str; 5] = ["T", "P1", "P2", "P3", "P4"];

/// Number of passengers the cabin holds
pub const DEFAULT_CAPACITY: usize = 2;

/// Number of simulated persons spawned by the driver
pub const DEFAULT_PERSONS: usize = 10;

/// Upper bound for the random walk a person takes when choosing a destination
pub const MAX_WALK_STEPS: usize = 30;

//
// ──────────────────────────────────────────────────────────────
//   2. TIMING
// ──────────────────────────────────────────────────────────────
//

/// Time the doors take to open or close
pub const DOORS_TIME: Duration = Duration::from_millis(1000);

/// Time spent travelling between two adjacent floors
pub const TRAVELING_TIME: Duration = Duration::from_millis(1500);

/// A person idles for a random time in `[0, 2 * WAITING_TIME)` between trips
pub const WAITING_TIME: Duration = Duration::from_millis(5000);

/// Length of a simulation run
pub const SIMULATION_TIME: Duration = Duration::from_secs(60);

//
// ──────────────────────────────────────────────────────────────
//   3. LOGGING CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Enable/disable printing of the building state on every elevator change
pub static PRINT_STATE_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of errors
pub static PRINT_ERR_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of warnings
pub static PRINT_WARN_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of success messages
pub static PRINT_OK_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable printing of general info
pub static PRINT_INFO_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(true));

/// Enable/disable elevator and person trace lines
pub static PRINT_ELSE_ON: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));

/// Reads one of the print toggles, treating a poisoned toggle as enabled.
pub fn toggle(flag: &Lazy<Mutex<bool>>) -> bool {
    flag.lock().map(|on| *on).unwrap_or(true)
}

/// Sets one of the print toggles.
pub fn set_toggle(flag: &Lazy<Mutex<bool>>, value: bool) {
    match flag.lock() {
        Ok(mut on) => *on = value,
        Err(poisoned) => *poisoned.into_inner() = value,
    }
}

//
// ──────────────────────────────────────────────────────────────
//   4. RUNTIME CONFIGURATION
// ──────────────────────────────────────────────────────────────
//

/// Runtime parameters for one simulation.
///
/// Every field has a default taken from the constants above, so a JSON file
/// only needs to list what it changes. Durations are given in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Names of the floors, bottom to top. At least two.
    pub floor_names: Vec<String>,
    /// Maximum number of passengers in the cabin.
    pub capacity: usize,
    /// Travel time between adjacent floors.
    pub travel_time_ms: u64,
    /// Door open/close dwell time.
    pub door_time_ms: u64,
    /// Idle bound for persons between trips.
    pub waiting_time_ms: u64,
    /// Number of persons to spawn.
    pub persons: usize,
    /// Length of the run in seconds.
    pub duration_secs: u64,
    /// Base seed for the persons' random generators. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            floor_names: DEFAULT_FLOOR_NAMES.iter().map(|name| name.to_string()).collect(),
            capacity: DEFAULT_CAPACITY,
            travel_time_ms: TRAVELING_TIME.as_millis() as u64,
            door_time_ms: DOORS_TIME.as_millis() as u64,
            waiting_time_ms: WAITING_TIME.as_millis() as u64,
            persons: DEFAULT_PERSONS,
            duration_secs: SIMULATION_TIME.as_secs(),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Checks the preconditions the simulation relies on.
    ///
    /// A building needs two floors so the destination walk always has a
    /// neighbour to move to, and a cabin with room for nobody never moves anyone.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.floor_names.len() < 2 {
            return Err(SimError::TooFewFloors(self.floor_names.len()));
        }
        if self.capacity == 0 {
            return Err(SimError::InvalidConfig("capacity must be at least 1".to_string()));
        }
        if self.waiting_time_ms == 0 {
            return Err(SimError::InvalidConfig("waiting_time_ms must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            travel: Duration::from_millis(self.travel_time_ms),
            doors: Duration::from_millis(self.door_time_ms),
        }
    }

    pub fn waiting_time(&self) -> Duration {
        Duration::from_millis(self.waiting_time_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

/// Simulated delays used by the elevator thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Time spent between two adjacent floors
    pub travel: Duration,
    /// Dwell time for opening or closing the doors
    pub doors: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self { travel: TRAVELING_TIME, doors: DOORS_TIME }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = SimConfig::default();
        assert_eq!(config.floor_names, vec!["T", "P1", "P2", "P3", "P4"]);
        assert_eq!(config.capacity, 2);
        assert_eq!(config.timing(), Timing::default());
        assert_eq!(config.waiting_time(), WAITING_TIME);
        assert_eq!(config.duration(), SIMULATION_TIME);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "capacity": 4, "floor_names": ["G", "1"] }"#).unwrap();
        assert_eq!(config.capacity, 4);
        assert_eq!(config.floor_names, vec!["G", "1"]);
        assert_eq!(config.travel_time_ms, 1500);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn validate_rejects_degenerate_buildings() {
        let mut config = SimConfig::default();
        config.floor_names = vec!["T".to_string()];
        assert!(matches!(config.validate(), Err(SimError::TooFewFloors(1))));

        let mut config = SimConfig::default();
        config.capacity = 0;
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }
}
