#![warn(missing_docs)]
//! # This projects library
//!
//! A single elevator serving a building, shared by any number of persons who
//! each run on their own thread.
//!
//! ## Overview
//! - **config**: Default parameters, runtime configuration and print toggles.
//! - **init**: Command line arguments and configuration file.
//! - **print**: Colored logging and presentation of the building.
//! - **building**: Floors, and the façade over elevator and persons.
//! - **elevator_logic**: The elevator monitor, its scheduling loop and change notifications.
//! - **person**: The passenger threads.
//! - **simulation**: A timed run with a presenter thread.

/// Global variables
pub mod config;

/// Error type
pub mod error;

/// Initialize functions
pub mod init;

/// Print functions with color coding
pub mod print;

/// Floors and the building façade
pub mod building;

/// Elevator control logic
pub mod elevator_logic;

/// Passenger threads
pub mod person;

/// Timed simulation runs
pub mod simulation;

pub use building::Building;
pub use config::SimConfig;
pub use error::SimError;
pub use simulation::{Simulation, TraceFormat};
