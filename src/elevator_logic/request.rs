//! Elevator request evaluation and direction decision logic.
//!
//! This module decides what the elevator does next, given a snapshot of where
//! it is and which buttons are lit. It is the directional sweep: keep going in
//! the current direction as long as anything is pending ahead, then settle.
//!
//! The logic is stateless and purely functional. The elevator thread takes a
//! [`RequestView`] while holding its monitor, asks [`plan`] for the next
//! [`Step`], releases the monitor and carries the step out.
//!
//! # Example
//! ```
//! use elevatorsim::building::floor::{Direction, FloorFlags, FloorId, Floors};
//! use elevatorsim::elevator_logic::request::{plan, Motion, RequestView, Step};
//!
//! let floors = Floors::new(&["T", "P1", "P2"]).unwrap();
//! let mut flags = vec![FloorFlags::default(); 3];
//! flags[2].call(Direction::Down);
//!
//! let view = RequestView { floors: &floors, flags: &flags, position: FloorId(0) };
//! assert_eq!(plan(Motion::Waiting, &view), Step::Depart(Direction::Up));
//! ```

use serde::Serialize;

use crate::building::floor::{Direction, FloorFlags, FloorId, Floors};

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Scheduling state of the elevator.
pub enum Motion {
    Waiting,
    MovingUp,
    MovingDown,
}

impl Motion {
    /// The moving state for a direction.
    pub fn moving(dir: Direction) -> Motion {
        match dir {
            Direction::Up => Motion::MovingUp,
            Direction::Down => Motion::MovingDown,
        }
    }

    /// Direction of travel, `None` while waiting.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Motion::Waiting => None,
            Motion::MovingUp => Some(Direction::Up),
            Motion::MovingDown => Some(Direction::Down),
        }
    }
}

/// Read-only snapshot of what the scheduler needs.
#[derive(Debug, Clone, Copy)]
pub struct RequestView<'a> {
    /// The floor chain
    pub floors: &'a Floors,
    /// Buttons per floor, indexed by [`FloorId::index`]
    pub flags: &'a [FloorFlags],
    /// Where the elevator is
    pub position: FloorId,
}

/// What the elevator thread should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing pending anywhere else; block until something is requested.
    Idle,
    /// Close the doors and start moving in the direction.
    Depart(Direction),
    /// Travel one floor in the direction.
    Advance(Direction),
}

/// What to do once a stop (or a pass) at a floor has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterArrival {
    /// Nothing ahead: switch to waiting and open the doors.
    Settle,
    /// Doors are open from a stop and there is more ahead: close and keep going.
    CloseAndContinue,
    /// Passed the floor without stopping; keep going.
    Continue,
}

/// Number of floors strictly beyond the elevator in `dir` with any call or stop request.
pub fn count_requests(view: &RequestView<'_>, dir: Direction) -> usize {
    view.floors
        .beyond(view.position, dir)
        .filter(|floor| view.flags[floor.index()].is_pending())
        .count()
}

/// `true` if anything is pending strictly above or below the elevator.
pub fn has_requests_away(view: &RequestView<'_>) -> bool {
    count_requests(view, Direction::Up) > 0 || count_requests(view, Direction::Down) > 0
}

/// Whether the elevator must stop at a floor it reaches while travelling in `dir`.
///
/// Only calls in the direction of travel count; a call the other way waits
/// for the sweep back.
pub fn must_stop(flags: &FloorFlags, dir: Direction) -> bool {
    flags.is_called(dir) || flags.stop_requested()
}

/// Main decision logic.
///
/// While waiting, going up needs strictly more pending floors above than below.
/// Anything else with something below goes down, so a tie is served downwards.
pub fn plan(motion: Motion, view: &RequestView<'_>) -> Step {
    match motion {
        Motion::Waiting => {
            let above = count_requests(view, Direction::Up);
            let below = count_requests(view, Direction::Down);
            if above > below {
                Step::Depart(Direction::Up)
            } else if below > 0 {
                Step::Depart(Direction::Down)
            } else {
                Step::Idle
            }
        }
        Motion::MovingUp => Step::Advance(Direction::Up),
        Motion::MovingDown => Step::Advance(Direction::Down),
    }
}

/// Decides how to continue after reaching a floor while moving in `dir`.
///
/// `stopped` tells whether the doors were opened at this floor.
pub fn after_arrival(view: &RequestView<'_>, dir: Direction, stopped: bool) -> AfterArrival {
    if count_requests(view, dir) == 0 {
        AfterArrival::Settle
    } else if stopped {
        AfterArrival::CloseAndContinue
    } else {
        AfterArrival::Continue
    }
}
