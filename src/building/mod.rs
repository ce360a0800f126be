//! # Building
//!
//! The whole building: the floors, the elevator and the persons, plus the
//! threads running them. Everything a presentation layer needs goes through
//! the query and command methods here, addressed by floor and person names.
//!
//! Commands naming a floor that does not exist are ignored.

pub mod floor;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::SimConfig;
use crate::elevator_logic::observer::{ElevatorObserver, ElevatorSnapshot, ObserverId};
use crate::elevator_logic::Elevator;
use crate::error::SimError;
use crate::person::{Location, Person, PersonHandle};
use crate::print;

use floor::{Direction, FloorFlags, Floors};

/// A person as seen from outside: name and destination (if travelling).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonState {
    pub name: String,
    pub destination: Option<String>,
}

/// One floor as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorState {
    pub name: String,
    pub flags: FloorFlags,
    pub persons: Vec<PersonState>,
}

/// Everything a presentation layer shows, taken in one go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingState {
    pub elevator: ElevatorSnapshot,
    pub passengers: Vec<PersonState>,
    /// Floors from top to bottom
    pub floors: Vec<FloorState>,
}

/// The building, including the elevator, the floors and the persons.
pub struct Building {
    floors: Arc<Floors>,
    elevator: Arc<Elevator>,
    persons: Mutex<Vec<PersonHandle>>,
    elevator_thread: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
    waiting_time: Duration,
    seed: Option<u64>,
}

impl Building {
    /// Creates the building described by the configuration. No thread is started yet.
    pub fn new(config: &SimConfig) -> Result<Building, SimError> {
        config.validate()?;
        let floors = Arc::new(Floors::new(config.floor_names.as_slice())?);
        let elevator = Arc::new(Elevator::new(Arc::clone(&floors), config.capacity, config.timing()));
        Ok(Building {
            floors,
            elevator,
            persons: Mutex::new(Vec::new()),
            elevator_thread: Mutex::new(None),
            running: AtomicBool::new(false),
            waiting_time: config.waiting_time(),
            seed: config.seed,
        })
    }

    pub fn elevator(&self) -> &Arc<Elevator> {
        &self.elevator
    }

    pub fn floors(&self) -> &Arc<Floors> {
        &self.floors
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Inserts a new person at the ground floor and returns its name.
    ///
    /// Persons are named `U1`, `U2`, … in order of arrival. A person added
    /// while the simulation runs starts right away, otherwise on
    /// [`Building::start_simulation`].
    pub fn add_new_person(&self) -> Result<String, SimError> {
        let name = {
            let mut persons = self.lock_persons();
            let index = persons.len();
            let name = format!("U{}", index + 1);
            let mut handle = PersonHandle::new(Arc::new(Person::new(name.clone(), self.floors.ground())));
            if self.is_running() {
                handle.start(Arc::clone(&self.elevator), self.rng_for(index), self.waiting_time)?;
            }
            persons.push(handle);
            name
        };
        print::info(format!("{} entered the building", name));
        self.elevator.notify_observers();
        Ok(name)
    }

    /// Names of the floors, bottom to top.
    pub fn floor_names(&self) -> Vec<String> {
        self.floors.iter().map(|f| self.floors.name(f).to_string()).collect()
    }

    /// Name of the destination of a person.
    ///
    /// Empty if the person has no destination or does not exist.
    pub fn person_destination(&self, person_name: &str) -> String {
        self.lock_persons()
            .iter()
            .find(|h| h.person().name() == person_name)
            .and_then(|h| h.person().destination())
            .map(|f| self.floors.name(f).to_string())
            .unwrap_or_default()
    }

    /// Name of the floor the elevator is at.
    pub fn elevator_floor(&self) -> String {
        self.floors.name(self.elevator.current_floor()).to_string()
    }

    pub fn is_elevator_open(&self) -> bool {
        self.elevator.is_open()
    }

    /// Calls the elevator to the named floor.
    pub fn call_floor(&self, floor_name: &str, dir: Direction) {
        match self.floors.find(floor_name) {
            Some(floor) => self.elevator.call(floor, dir),
            None => print::warn(format!("{}, call ignored", SimError::UnknownFloor(floor_name.to_string()))),
        }
    }

    /// Requests a stop at the named floor.
    pub fn request_stop(&self, floor_name: &str) {
        match self.floors.find(floor_name) {
            Some(floor) => self.elevator.request_stop(floor),
            None => print::warn(format!("{}, stop ignored", SimError::UnknownFloor(floor_name.to_string()))),
        }
    }

    /// Names of the persons standing at the named floor.
    pub fn persons_at_floor(&self, floor_name: &str) -> Vec<String> {
        let Some(floor) = self.floors.find(floor_name) else {
            return Vec::new();
        };
        self.lock_persons()
            .iter()
            .filter(|h| h.person().location() == Location::Floor(floor))
            .map(|h| h.person().name().to_string())
            .collect()
    }

    /// Names of the passengers in the elevator.
    pub fn persons_in_elevator(&self) -> Vec<String> {
        self.elevator.passengers().iter().map(|p| p.name().to_string()).collect()
    }

    /// Adds a new observer to the elevator.
    pub fn add_elevator_observer(&self, observer: Arc<dyn ElevatorObserver>) -> ObserverId {
        self.elevator.add_observer(observer)
    }

    pub fn remove_elevator_observer(&self, id: ObserverId) -> bool {
        self.elevator.remove_observer(id)
    }

    /// Full picture of the building for presentation.
    ///
    /// Must not be called from inside an observer callback.
    pub fn state(&self) -> BuildingState {
        let elevator = self.elevator.snapshot();
        let passengers = self
            .elevator
            .passengers()
            .iter()
            .map(|p| self.person_state(p))
            .collect();

        let persons: Vec<Arc<Person>> =
            self.lock_persons().iter().map(|h| Arc::clone(h.person())).collect();
        let floors = self
            .floors
            .iter()
            .rev()
            .map(|floor| FloorState {
                name: self.floors.name(floor).to_string(),
                flags: self.elevator.floor_flags(floor),
                persons: persons
                    .iter()
                    .filter(|p| p.location() == Location::Floor(floor))
                    .map(|p| self.person_state(p))
                    .collect(),
            })
            .collect();

        BuildingState { elevator, passengers, floors }
    }

    /// Starts the elevator thread and every person not yet running.
    pub fn start_simulation(&self) -> Result<(), SimError> {
        if self.elevator.is_terminated() {
            print::warn("Simulation already stopped, cannot restart".to_string());
            return Ok(());
        }
        {
            let mut thread = lock(&self.elevator_thread);
            if thread.is_none() {
                let elevator = Arc::clone(&self.elevator);
                let handle = thread::Builder::new()
                    .name("Elevator-thread".to_string())
                    .spawn(move || elevator.run())
                    .map_err(|e| SimError::Spawn(format!("elevator: {}", e)))?;
                *thread = Some(handle);
            }
        }
        self.running.store(true, Ordering::SeqCst);

        let mut persons = self.lock_persons();
        for (index, handle) in persons.iter_mut().enumerate() {
            if !handle.is_started() {
                handle.start(Arc::clone(&self.elevator), self.rng_for(index), self.waiting_time)?;
            }
        }
        Ok(())
    }

    /// Stops every person and the elevator, and waits for all threads to end.
    ///
    /// Persons are told to stop first, then the elevator is terminated, which
    /// releases anyone blocked boarding or alighting. Calling it again is harmless.
    pub fn stop_simulation(&self) -> Result<(), SimError> {
        self.running.store(false, Ordering::SeqCst);
        let threads: Vec<(String, JoinHandle<()>)> = {
            let mut persons = self.lock_persons();
            persons.iter().for_each(PersonHandle::terminate);
            persons
                .iter_mut()
                .filter_map(|h| {
                    let name = h.person().name().to_string();
                    h.take_thread().map(|t| (name, t))
                })
                .collect()
        };
        self.elevator.terminate();

        let mut outcome = Ok(());
        for (name, thread) in threads {
            if thread.join().is_err() {
                print::err(format!("{} panicked", name));
                outcome = Err(SimError::ThreadPanicked(name));
            }
        }
        if let Some(thread) = lock(&self.elevator_thread).take() {
            if thread.join().is_err() {
                print::err("Elevator thread panicked".to_string());
                outcome = Err(SimError::ThreadPanicked("Elevator-thread".to_string()));
            }
        }
        outcome
    }

    fn person_state(&self, person: &Person) -> PersonState {
        PersonState {
            name: person.name().to_string(),
            destination: person.destination().map(|f| self.floors.name(f).to_string()),
        }
    }

    fn rng_for(&self, index: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => StdRng::from_entropy(),
        }
    }

    fn lock_persons(&self) -> MutexGuard<'_, Vec<PersonHandle>> {
        lock(&self.persons)
    }
}

impl Drop for Building {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.stop_simulation();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}


#[cfg(test)]
mod tests {
    use super::*;

    fn config(names: &[&str]) -> SimConfig {
        SimConfig {
            floor_names: names.iter().map(|n| n.to_string()).collect(),
            travel_time_ms: 5,
            door_time_ms: 5,
            waiting_time_ms: 5,
            seed: Some(1),
            ..SimConfig::default()
        }
    }

    #[test]
    fn rejects_a_single_floor() {
        assert!(matches!(Building::new(&config(&["T"])), Err(SimError::TooFewFloors(1))));
    }

    #[test]
    fn queries_before_start() {
        let building = Building::new(&config(&["T", "P1", "P2"])).unwrap();
        assert_eq!(building.floor_names(), vec!["T", "P1", "P2"]);
        assert_eq!(building.elevator_floor(), "T");
        assert!(building.is_elevator_open());
        assert!(building.persons_in_elevator().is_empty());

        assert_eq!(building.add_new_person().unwrap(), "U1");
        assert_eq!(building.add_new_person().unwrap(), "U2");
        assert_eq!(building.persons_at_floor("T"), vec!["U1", "U2"]);
        assert!(building.persons_at_floor("P1").is_empty());
        assert!(building.persons_at_floor("nowhere").is_empty());
        assert_eq!(building.person_destination("U1"), "");
        assert_eq!(building.person_destination("U9"), "");
    }

    #[test]
    fn unknown_floor_commands_are_ignored() {
        let building = Building::new(&config(&["T", "P1"])).unwrap();
        building.call_floor("P7", Direction::Up);
        building.request_stop("P7");
        let state = building.state();
        assert!(state.floors.iter().all(|f| !f.flags.is_pending()));
    }

    #[test]
    fn commands_light_the_buttons() {
        let building = Building::new(&config(&["T", "P1", "P2"])).unwrap();
        building.call_floor("P1", Direction::Down);
        building.request_stop("P2");
        let state = building.state();
        assert_eq!(state.floors[0].name, "P2");
        assert!(state.floors[0].flags.stop_requested());
        assert!(state.floors[1].flags.is_called(Direction::Down));
        assert!(!state.floors[1].flags.is_called(Direction::Up));
    }

    #[test]
    fn stop_without_start_is_harmless() {
        let building = Building::new(&config(&["T", "P1"])).unwrap();
        building.add_new_person().unwrap();
        assert!(building.stop_simulation().is_ok());
        assert!(building.stop_simulation().is_ok());
        assert!(building.elevator().is_terminated());
    }
}
