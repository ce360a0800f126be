//! # Floors of the building
//!
//! The floors form a fixed chain from the ground floor to the top. The chain
//! never changes after the building is constructed, so it is shared freely
//! between threads behind an `Arc`.
//!
//! The buttons of each floor ([`FloorFlags`]) are *not* part of the chain.
//! They are mutated by every person thread and read by the elevator thread,
//! so they live inside the elevator's monitor and are only touched while
//! holding its lock.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Direction of travel, or the direction a call asks for.
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// The other direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "UP"),
            Direction::Down => write!(f, "DOWN"),
        }
    }
}

/// Identity of a floor: its position in the chain, counted from the ground floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FloorId(pub usize);

impl FloorId {
    /// Index into per-floor tables.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The ordered chain of floors, bottom to top.
#[derive(Debug, Clone)]
pub struct Floors {
    names: Vec<String>,
}

impl Floors {
    /// Builds the chain from a list of names given bottom to top.
    ///
    /// Needs at least two floors and unique names.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Floors, SimError> {
        if names.len() < 2 {
            return Err(SimError::TooFewFloors(names.len()));
        }
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name.as_ref()) {
                return Err(SimError::DuplicateFloor(name.as_ref().to_string()));
            }
        }
        Ok(Floors { names: names.iter().map(|name| name.as_ref().to_string()).collect() })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The bottom floor, where persons enter the building.
    pub fn ground(&self) -> FloorId {
        FloorId(0)
    }

    pub fn top(&self) -> FloorId {
        FloorId(self.names.len() - 1)
    }

    /// Name of a floor. Ids always come from this chain, so the lookup cannot miss.
    pub fn name(&self, floor: FloorId) -> &str {
        &self.names[floor.0]
    }

    /// Looks a floor up by name.
    pub fn find(&self, name: &str) -> Option<FloorId> {
        self.names.iter().position(|n| n == name).map(FloorId)
    }

    /// Next floor in the given direction, or `None` at the ends of the building.
    pub fn neighbor(&self, floor: FloorId, dir: Direction) -> Option<FloorId> {
        match dir {
            Direction::Up if floor.0 + 1 < self.names.len() => Some(FloorId(floor.0 + 1)),
            Direction::Down if floor.0 > 0 => Some(FloorId(floor.0 - 1)),
            _ => None,
        }
    }

    /// `true` if `floor` lies strictly above `other`.
    pub fn is_above(&self, floor: FloorId, other: FloorId) -> bool {
        let mut current = other;
        while let Some(next) = self.neighbor(current, Direction::Up) {
            if next == floor {
                return true;
            }
            current = next;
        }
        false
    }

    /// `true` if `floor` lies strictly below `other`.
    pub fn is_below(&self, floor: FloorId, other: FloorId) -> bool {
        self.is_above(other, floor)
    }

    /// Direction to travel from `from` to reach `to`. `None` when they are the same floor.
    pub fn direction_to(&self, from: FloorId, to: FloorId) -> Option<Direction> {
        if self.is_above(to, from) {
            Some(Direction::Up)
        } else if self.is_below(to, from) {
            Some(Direction::Down)
        } else {
            None
        }
    }

    /// Floors strictly beyond `floor` in the given direction, nearest first.
    pub fn beyond(&self, floor: FloorId, dir: Direction) -> impl Iterator<Item = FloorId> + '_ {
        std::iter::successors(self.neighbor(floor, dir), move |f| self.neighbor(*f, dir))
    }

    /// All floors, bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = FloorId> {
        (0..self.names.len()).map(FloorId)
    }
}

/// The buttons of one floor.
///
/// Calls are pressed from the landing, the stop request from inside the cabin.
/// The flags are advisory: anyone may set them, and the elevator clears them
/// when it services the floor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FloorFlags {
    called_up: bool,
    called_down: bool,
    stop_requested: bool,
}

impl FloorFlags {
    /// Ask the elevator to stop at this floor.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    /// Cancel a previous stop request.
    pub fn cancel_request(&mut self) {
        self.stop_requested = false;
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Call the elevator to this floor for the given direction.
    pub fn call(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.called_up = true,
            Direction::Down => self.called_down = true,
        }
    }

    pub fn cancel_call(&mut self, dir: Direction) {
        match dir {
            Direction::Up => self.called_up = false,
            Direction::Down => self.called_down = false,
        }
    }

    pub fn is_called(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.called_up,
            Direction::Down => self.called_down,
        }
    }

    /// Any call or stop request outstanding.
    pub fn is_pending(&self) -> bool {
        self.called_up || self.called_down || self.stop_requested
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn five() -> Floors {
        Floors::new(&["T", "P1", "P2", "P3", "P4"]).unwrap()
    }

    #[test]
    fn neighbours_stop_at_the_ends() {
        let floors = five();
        assert_eq!(floors.neighbor(floors.ground(), Direction::Down), None);
        assert_eq!(floors.neighbor(floors.ground(), Direction::Up), Some(FloorId(1)));
        assert_eq!(floors.neighbor(floors.top(), Direction::Up), None);
        assert_eq!(floors.neighbor(floors.top(), Direction::Down), Some(FloorId(3)));
    }

    #[test]
    fn above_and_below_are_strict() {
        let floors = five();
        let (p1, p3) = (FloorId(1), FloorId(3));
        assert!(floors.is_above(p3, p1));
        assert!(!floors.is_above(p1, p3));
        assert!(floors.is_below(p1, p3));
        assert!(!floors.is_above(p1, p1));
        assert!(!floors.is_below(p1, p1));
        assert_eq!(floors.direction_to(p1, p3), Some(Direction::Up));
        assert_eq!(floors.direction_to(p3, p1), Some(Direction::Down));
        assert_eq!(floors.direction_to(p1, p1), None);
    }

    #[test]
    fn lookup_by_name() {
        let floors = five();
        assert_eq!(floors.find("P2"), Some(FloorId(2)));
        assert_eq!(floors.find("P9"), None);
        assert_eq!(floors.name(FloorId(4)), "P4");
        let beyond: Vec<_> = floors.beyond(FloorId(2), Direction::Down).collect();
        assert_eq!(beyond, vec![FloorId(1), FloorId(0)]);
    }

    #[test]
    fn construction_preconditions() {
        assert_eq!(Floors::new(&["T"]).unwrap_err(), SimError::TooFewFloors(1));
        assert_eq!(
            Floors::new(&["T", "P1", "T"]).unwrap_err(),
            SimError::DuplicateFloor("T".to_string())
        );
    }

    #[test]
    fn flags_are_independent() {
        let mut flags = FloorFlags::default();
        assert!(!flags.is_pending());
        flags.call(Direction::Up);
        assert!(flags.is_called(Direction::Up));
        assert!(!flags.is_called(Direction::Down));
        flags.request_stop();
        flags.cancel_call(Direction::Up);
        assert!(flags.is_pending());
        assert!(flags.stop_requested());
        flags.cancel_request();
        assert!(!flags.is_pending());
    }
}
