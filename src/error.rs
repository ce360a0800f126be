//! Error type shared by the library modules.

use thiserror::Error;

/// Everything that can go wrong inside the simulation.
///
/// None of these are fatal to the process: callers either recover locally
/// or ignore them, so the simulation can always be stopped from outside.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The elevator was terminated while a person was waiting to board or alight.
    #[error("elevator terminated while {0} was waiting")]
    Abandoned(String),

    /// A building needs at least two floors.
    #[error("a building needs at least two floors, got {0}")]
    TooFewFloors(usize),

    /// Two floors share a name.
    #[error("duplicate floor name `{0}`")]
    DuplicateFloor(String),

    /// A floor name that is not part of the building.
    #[error("unknown floor `{0}`")]
    UnknownFloor(String),

    /// Configuration values that cannot run.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to start an actor thread.
    #[error("could not spawn thread for {0}")]
    Spawn(String),

    /// An actor thread panicked before it could be joined.
    #[error("thread `{0}` panicked")]
    ThreadPanicked(String),
}
