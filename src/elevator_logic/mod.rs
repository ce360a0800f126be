//! # Elevator
//!
//! The cabin, its doors and the scheduling loop, plus the monitor every
//! person synchronises on.
//!
//! ## Monitor
//! All mutable elevator state, including the buttons of every floor, sits in
//! one [`Mutex`] with a single [`Condvar`]. Every change is broadcast to all
//! waiters, and every waiter re-checks its own condition when it wakes.
//!
//! ## Scheduling loop
//! [`Elevator::run`] asks [`request::plan`] for the next step and carries it
//! out. Simulated delays (travel and doors) are spent with the monitor
//! released, so persons can board and alight while the doors are open, and
//! [`Elevator::terminate`] cuts any delay short.
//!
//! ## Boarding and alighting
//! [`Elevator::enter`] and [`Elevator::exit`] block the calling person until
//! the cabin is at their floor with the doors open (and, for boarding, has
//! room). They return [`SimError::Abandoned`] if the elevator is terminated
//! first.

pub mod observer;
pub mod request;

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::building::floor::{Direction, FloorFlags, FloorId, Floors};
use crate::config::Timing;
use crate::error::SimError;
use crate::person::{Location, Person};
use crate::print;

use observer::{ElevatorObserver, ElevatorSnapshot, ObserverId, Observers};
use request::{AfterArrival, Motion, RequestView, Step};

/// State guarded by the elevator monitor.
struct Cabin {
    position: FloorId,
    door_open: bool,
    passengers: Vec<Arc<Person>>,
    motion: Motion,
    terminated: bool,
    flags: Vec<FloorFlags>,
    /// Floor the doors were last opened to service, cleared when they close.
    granted: Option<FloorId>,
}

impl Cabin {
    fn view<'a>(&'a self, floors: &'a Floors) -> RequestView<'a> {
        RequestView { floors, flags: &self.flags, position: self.position }
    }

    fn can_board(&self, floor: FloorId, capacity: usize) -> bool {
        self.door_open && self.position == floor && self.passengers.len() < capacity
    }

    fn can_alight(&self, floor: FloorId) -> bool {
        self.door_open && self.position == floor && self.granted == Some(floor)
    }
}

/// The elevator of a building.
pub struct Elevator {
    floors: Arc<Floors>,
    capacity: usize,
    timing: Timing,
    monitor: Mutex<Cabin>,
    changed: Condvar,
    observers: Observers,
}

impl Elevator {
    /// Creates the elevator parked at the ground floor with its doors open.
    pub fn new(floors: Arc<Floors>, capacity: usize, timing: Timing) -> Elevator {
        let ground = floors.ground();
        let cabin = Cabin {
            position: ground,
            door_open: true,
            passengers: Vec::with_capacity(capacity),
            motion: Motion::Waiting,
            terminated: false,
            flags: vec![FloorFlags::default(); floors.len()],
            granted: Some(ground),
        };
        Elevator {
            floors,
            capacity,
            timing,
            monitor: Mutex::new(cabin),
            changed: Condvar::new(),
            observers: Observers::new(),
        }
    }

    /// Behaviour of the elevator. Runs until [`Elevator::terminate`] is called.
    pub fn run(&self) {
        print::elevator(format!("Elevator started at floor {}", self.floors.name(self.current_floor())));
        loop {
            let step = {
                let cabin = self.lock();
                if cabin.terminated {
                    break;
                }
                request::plan(cabin.motion, &cabin.view(&self.floors))
            };

            match step {
                Step::Idle => self.await_requests(),
                Step::Depart(dir) => {
                    self.close_doors();
                    self.set_motion(Motion::moving(dir));
                }
                Step::Advance(dir) => self.advance(dir),
            }
        }
        print::elevator("Elevator stopped".to_string());
    }

    /// Asks the scheduling loop and every blocked person to stop.
    pub fn terminate(&self) {
        let mut cabin = self.lock();
        cabin.terminated = true;
        self.changed.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.lock().terminated
    }

    /// Makes the person enter the elevator as soon as it is at `floor` with
    /// open doors and room to spare.
    ///
    /// While waiting, the call for `dir` at `floor` is kept lit: a previous
    /// stop may have cleared it before this person got in.
    pub fn enter(&self, person: &Arc<Person>, floor: FloorId, dir: Direction) -> Result<(), SimError> {
        let mut cabin = self.lock();
        while !cabin.terminated && !cabin.can_board(floor, self.capacity) {
            let flags = &mut cabin.flags[floor.index()];
            if !flags.is_called(dir) {
                flags.call(dir);
                self.changed.notify_all();
            }
            cabin = self.wait(cabin);
        }
        if cabin.terminated {
            return Err(SimError::Abandoned(person.name().to_string()));
        }

        cabin.passengers.push(Arc::clone(person));
        person.set_location(Location::InElevator);
        // Answered. Anyone still waiting here lights it again on their next wake-up.
        cabin.flags[floor.index()].cancel_call(dir);
        print::person(format!("{} entered at {}", person.name(), self.floors.name(floor)));
        self.broadcast(&cabin);
        Ok(())
    }

    /// Makes the person leave the elevator when it stops at `floor`.
    ///
    /// While waiting, the stop request for `floor` is kept lit.
    pub fn exit(&self, person: &Arc<Person>, floor: FloorId) -> Result<(), SimError> {
        let mut cabin = self.lock();
        while !cabin.terminated && !cabin.can_alight(floor) {
            let flags = &mut cabin.flags[floor.index()];
            if !flags.stop_requested() {
                flags.request_stop();
                self.changed.notify_all();
            }
            cabin = self.wait(cabin);
        }
        if cabin.terminated {
            return Err(SimError::Abandoned(person.name().to_string()));
        }

        cabin.passengers.retain(|p| !Arc::ptr_eq(p, person));
        person.set_location(Location::Floor(floor));
        print::person(format!("{} left at {}", person.name(), self.floors.name(floor)));
        self.broadcast(&cabin);
        Ok(())
    }

    /// Presses the call button for `dir` at `floor`.
    pub fn call(&self, floor: FloorId, dir: Direction) {
        let mut cabin = self.lock();
        cabin.flags[floor.index()].call(dir);
        self.changed.notify_all();
    }

    /// Presses the cabin button for `floor`.
    pub fn request_stop(&self, floor: FloorId) {
        let mut cabin = self.lock();
        cabin.flags[floor.index()].request_stop();
        self.changed.notify_all();
    }

    /// Buttons of a floor as they are right now.
    pub fn floor_flags(&self, floor: FloorId) -> FloorFlags {
        self.lock().flags[floor.index()]
    }

    /// The current floor. The elevator is always at exactly one floor, even while travelling.
    pub fn current_floor(&self) -> FloorId {
        self.lock().position
    }

    /// Status of the doors.
    pub fn is_open(&self) -> bool {
        self.lock().door_open
    }

    pub fn motion(&self) -> Motion {
        self.lock().motion
    }

    /// The persons in the cabin, in boarding order.
    pub fn passengers(&self) -> Vec<Arc<Person>> {
        self.lock().passengers.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn floors(&self) -> &Arc<Floors> {
        &self.floors
    }

    pub fn snapshot(&self) -> ElevatorSnapshot {
        self.snapshot_of(&self.lock())
    }

    /// Registers an observer for elevator changes. See [`observer`] for the rules observers follow.
    pub fn add_observer(&self, observer: Arc<dyn ElevatorObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    pub fn remove_observer(&self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    /// Pushes the current state to every observer.
    pub fn notify_observers(&self) {
        let cabin = self.lock();
        self.observers.notify(&self.snapshot_of(&cabin));
    }

    /*======================================================================*/
    /*                        Scheduling loop steps                         */
    /*======================================================================*/

    /// Blocks until something is requested above or below, or termination.
    fn await_requests(&self) {
        let floors = &self.floors;
        let cabin = self.lock();
        let result = self.changed.wait_while(cabin, |cabin| {
            !cabin.terminated && !request::has_requests_away(&cabin.view(floors))
        });
        if result.is_err() {
            print::warn("Elevator monitor poisoned while idle, continuing".to_string());
        }
    }

    /// One floor of travel, then the stop decision at the new floor.
    fn advance(&self, dir: Direction) {
        let current = self.current_floor();
        let Some(next) = self.floors.neighbor(current, dir) else {
            print::warn(format!("No floor {} from {}, settling", dir, self.floors.name(current)));
            self.settle();
            return;
        };

        self.goto_floor(next);

        let stop = {
            let cabin = self.lock();
            if cabin.terminated {
                return;
            }
            request::must_stop(&cabin.flags[next.index()], dir)
        };
        if stop {
            self.open_doors(Some(dir));
        }

        let after = {
            let cabin = self.lock();
            request::after_arrival(&cabin.view(&self.floors), dir, stop)
        };
        match after {
            AfterArrival::Settle => self.settle(),
            AfterArrival::CloseAndContinue => self.close_doors(),
            AfterArrival::Continue => {}
        }
    }

    /// Switches to waiting and opens the doors for whoever is here.
    fn settle(&self) {
        self.set_motion(Motion::Waiting);
        self.open_doors(None);
    }

    fn set_motion(&self, motion: Motion) {
        let mut cabin = self.lock();
        if cabin.motion != motion {
            print::elevator(format!("{:?} -> {:?}", cabin.motion, motion));
            cabin.motion = motion;
        }
    }

    /// Moves to the given floor and spends the travel time.
    fn goto_floor(&self, floor: FloorId) {
        {
            let mut cabin = self.lock();
            cabin.position = floor;
            self.broadcast(&cabin);
        }
        self.pause(self.timing.travel);
    }

    /// Opens the doors and clears the buttons the stop services.
    ///
    /// `serviced` is the direction of travel at a sweep stop; the call the
    /// other way stays lit for the sweep back. `None` (settling into waiting)
    /// clears both calls.
    fn open_doors(&self, serviced: Option<Direction>) {
        {
            let mut cabin = self.lock();
            let here = cabin.position;
            cabin.door_open = true;
            cabin.granted = Some(here);
            let flags = &mut cabin.flags[here.index()];
            flags.cancel_request();
            match serviced {
                Some(dir) => flags.cancel_call(dir),
                None => {
                    flags.cancel_call(Direction::Up);
                    flags.cancel_call(Direction::Down);
                }
            }
            self.broadcast(&cabin);
        }
        self.pause(self.timing.doors);
    }

    fn close_doors(&self) {
        {
            let mut cabin = self.lock();
            cabin.door_open = false;
            cabin.granted = None;
            self.broadcast(&cabin);
        }
        self.pause(self.timing.doors);
    }

    /*======================================================================*/
    /*                           Monitor helpers                            */
    /*======================================================================*/

    fn lock(&self) -> MutexGuard<'_, Cabin> {
        self.monitor.lock().unwrap_or_else(|poisoned| {
            print::warn("Elevator monitor poisoned, continuing with inner state".to_string());
            poisoned.into_inner()
        })
    }

    fn wait<'a>(&self, cabin: MutexGuard<'a, Cabin>) -> MutexGuard<'a, Cabin> {
        self.changed.wait(cabin).unwrap_or_else(|poisoned| {
            print::warn("Interrupted wait on elevator monitor, re-checking".to_string());
            poisoned.into_inner()
        })
    }

    /// Simulated delay with the monitor released. Returns early on termination.
    fn pause(&self, duration: Duration) {
        let cabin = self.lock();
        if self.changed.wait_timeout_while(cabin, duration, |cabin| !cabin.terminated).is_err() {
            print::warn("Interrupted delay on elevator monitor".to_string());
        }
    }

    /// Wakes every waiter and tells the observers. Called with the monitor held.
    fn broadcast(&self, cabin: &Cabin) {
        self.observers.notify(&self.snapshot_of(cabin));
        self.changed.notify_all();
    }

    fn snapshot_of(&self, cabin: &Cabin) -> ElevatorSnapshot {
        ElevatorSnapshot {
            floor: self.floors.name(cabin.position).to_string(),
            door_open: cabin.door_open,
            motion: cabin.motion,
            passengers: cabin.passengers.iter().map(|p| p.name().to_string()).collect(),
        }
    }
}
