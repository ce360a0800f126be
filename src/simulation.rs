//! Timed simulation run.
//!
//! Builds the building, spawns the persons, lets everything run for the
//! configured time and shuts it down. Every elevator change is forwarded by a
//! [`ChannelObserver`] to a presenter thread, which prints the building
//! without ever touching the elevator monitor from inside a notification.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel as cbc;

use crate::building::Building;
use crate::config::SimConfig;
use crate::elevator_logic::observer::{ChannelObserver, ElevatorSnapshot};
use crate::error::SimError;
use crate::print;

/// How the presenter shows each change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceFormat {
    /// Table per change
    #[default]
    Table,
    /// One JSON object per line
    Json,
    /// Nothing
    Off,
}

/// A building plus the parameters of one run.
pub struct Simulation {
    building: Arc<Building>,
    config: SimConfig,
    trace: TraceFormat,
}

impl Simulation {
    /// Builds the building for `config`. Nothing runs until [`Simulation::run`].
    pub fn new(config: SimConfig, trace: TraceFormat) -> Result<Simulation, SimError> {
        let building = Arc::new(Building::new(&config)?);
        Ok(Simulation { building, config, trace })
    }

    pub fn building(&self) -> &Arc<Building> {
        &self.building
    }

    /// Runs for the configured duration.
    pub fn run(&self) -> Result<(), SimError> {
        self.run_for(self.config.duration())
    }

    /// Runs for `duration` with the configured number of persons.
    pub fn run_for(&self, duration: Duration) -> Result<(), SimError> {
        let (observer, rx) = ChannelObserver::unbounded();
        let observer_id = self.building.add_elevator_observer(Arc::new(observer));
        let presenter = self.spawn_presenter(rx)?;

        let outcome = self.drive(duration);

        print::info("Closing...".to_string());
        let stopped = self.building.stop_simulation();
        // Dropping the registered observer disconnects the presenter's channel.
        self.building.remove_elevator_observer(observer_id);
        if presenter.join().is_err() {
            print::err("Presenter thread panicked".to_string());
        }
        outcome.and(stopped)?;
        print::ok("Simulation finished.".to_string());
        Ok(())
    }

    fn drive(&self, duration: Duration) -> Result<(), SimError> {
        self.building.start_simulation()?;
        print::ok("Simulation started.".to_string());
        for _ in 0..self.config.persons {
            self.building.add_new_person()?;
        }
        thread::sleep(duration);
        Ok(())
    }

    fn spawn_presenter(&self, rx: cbc::Receiver<ElevatorSnapshot>) -> Result<thread::JoinHandle<()>, SimError> {
        let building = Arc::clone(&self.building);
        let trace = self.trace;
        thread::Builder::new()
            .name("Presenter-thread".to_string())
            .spawn(move || {
                for _change in rx.iter() {
                    match trace {
                        TraceFormat::Table => print::building_state(&building.state()),
                        TraceFormat::Json => print::building_state_json(&building.state()),
                        TraceFormat::Off => {}
                    }
                }
            })
            .map_err(|e| SimError::Spawn(format!("presenter: {}", e)))
    }
}
