//! # Persons
//!
//! Every person in the building is an independent thread. It idles for a
//! random time, picks a destination, rides the elevator there and starts over,
//! until it is asked to stop.
//!
//! [`Person`] is the shared, thread-safe state that the building and the
//! elevator read; [`PersonHandle`] owns the thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel as cbc;
use rand::rngs::StdRng;
use rand::Rng;

use crate::building::floor::{Direction, FloorId, Floors};
use crate::config;
use crate::elevator_logic::Elevator;
use crate::error::SimError;
use crate::print;

/// Where a person is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Standing at a floor
    Floor(FloorId),
    /// Inside the elevator cabin
    InElevator,
}

/// A person in the building.
pub struct Person {
    name: String,
    location: Mutex<Location>,
    destination: Mutex<Option<FloorId>>,
    terminated: AtomicBool,
    stop_tx: cbc::Sender<()>,
    stop_rx: cbc::Receiver<()>,
}

impl Person {
    /// Creates a user of the elevator who is now at the given floor.
    pub fn new(name: impl Into<String>, floor: FloorId) -> Person {
        let (stop_tx, stop_rx) = cbc::bounded(1);
        Person {
            name: name.into(),
            location: Mutex::new(Location::Floor(floor)),
            destination: Mutex::new(None),
            terminated: AtomicBool::new(false),
            stop_tx,
            stop_rx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Location {
        *lock(&self.location)
    }

    /// Updated by the elevator when the person boards or alights.
    pub fn set_location(&self, location: Location) {
        *lock(&self.location) = location;
    }

    pub fn is_in_elevator(&self) -> bool {
        self.location() == Location::InElevator
    }

    /// The floor the person is travelling to, if any.
    pub fn destination(&self) -> Option<FloorId> {
        *lock(&self.destination)
    }

    fn set_destination(&self, destination: Option<FloorId>) {
        *lock(&self.destination) = destination;
    }

    /// Asks the person to stop. Takes effect at the next idle period or loop iteration.
    pub fn terminate(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        let _ = self.stop_tx.try_send(());
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Behaviour of the person: idle, choose a destination, travel, repeat.
    pub fn run(self: &Arc<Self>, elevator: &Elevator, rng: &mut StdRng, waiting_time: Duration) {
        let floors = Arc::clone(elevator.floors());
        let bound_ms = (2 * waiting_time.as_millis()).max(1) as u64;

        while !self.is_terminated() {
            let idle = Duration::from_millis(rng.gen_range(0..bound_ms));
            if !self.idle(idle) {
                break;
            }

            let here = match self.location() {
                Location::Floor(floor) => floor,
                Location::InElevator => {
                    print::warn(format!("{} woke up inside the elevator, stopping", self.name));
                    break;
                }
            };

            let steps = rng.gen_range(1..=config::MAX_WALK_STEPS);
            let destination = random_walk(&floors, here, steps);
            self.set_destination(Some(destination));
            let outcome = self.travel(elevator, &floors, here, destination);
            self.set_destination(None);

            if let Err(e) = outcome {
                print::warn(format!("{}: {}", self.name, e));
                break;
            }
        }
        print::person(format!("{} stopped", self.name));
    }

    /// Sleeps for `duration` unless stopped first. Returns `false` when stopped.
    fn idle(&self, duration: Duration) -> bool {
        if self.is_terminated() {
            return false;
        }
        match self.stop_rx.recv_timeout(duration) {
            Err(cbc::RecvTimeoutError::Timeout) => !self.is_terminated(),
            Ok(()) | Err(cbc::RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Rides the elevator from `here` to `destination`.
    ///
    /// An abandoned boarding or alighting is returned as an error and ends the trip.
    fn travel(
        self: &Arc<Self>,
        elevator: &Elevator,
        floors: &Floors,
        here: FloorId,
        destination: FloorId,
    ) -> Result<(), SimError> {
        let Some(dir) = floors.direction_to(here, destination) else {
            return Ok(());
        };
        print::person(format!(
            "{} wants to go {} from {} to {}",
            self.name,
            dir,
            floors.name(here),
            floors.name(destination)
        ));

        elevator.call(here, dir);
        elevator.enter(self, here, dir)?;
        elevator.request_stop(destination);
        elevator.exit(self, destination)
    }
}

/// Chooses a destination by walking `steps` floors from `start`.
///
/// The walk starts upwards and turns around at either end of the building
/// without spending a step on the turn. Needs at least two floors.
pub fn random_walk(floors: &Floors, start: FloorId, steps: usize) -> FloorId {
    let mut dir = Direction::Up;
    let mut floor = start;
    let mut left = steps;
    while left > 0 {
        match floors.neighbor(floor, dir) {
            Some(next) => {
                floor = next;
                left -= 1;
            }
            None => dir = dir.opposite(),
        }
    }
    floor
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A person together with the thread running it.
pub struct PersonHandle {
    person: Arc<Person>,
    thread: Option<JoinHandle<()>>,
}

impl PersonHandle {
    /// A person that has not been started yet.
    pub fn new(person: Arc<Person>) -> PersonHandle {
        PersonHandle { person, thread: None }
    }

    pub fn person(&self) -> &Arc<Person> {
        &self.person
    }

    pub fn is_started(&self) -> bool {
        self.thread.is_some()
    }

    /// Starts the person's thread. Does nothing if it is already running.
    pub fn start(&mut self, elevator: Arc<Elevator>, mut rng: StdRng, waiting_time: Duration) -> Result<(), SimError> {
        if self.thread.is_some() {
            return Ok(());
        }
        let person = Arc::clone(&self.person);
        let handle = thread::Builder::new()
            .name(format!("{}-thread", person.name()))
            .spawn(move || person.run(&elevator, &mut rng, waiting_time))
            .map_err(|e| SimError::Spawn(format!("{}: {}", self.person.name(), e)))?;
        self.thread = Some(handle);
        Ok(())
    }

    pub fn terminate(&self) {
        self.person.terminate();
    }

    /// Takes the join handle out, leaving the person queryable.
    pub fn take_thread(&mut self) -> Option<JoinHandle<()>> {
        self.thread.take()
    }
}
