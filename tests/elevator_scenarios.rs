//! End-to-end scenarios with real elevator and person threads and short delays.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use elevatorsim::building::floor::{Direction, FloorId, Floors};
use elevatorsim::config::{SimConfig, Timing};
use elevatorsim::elevator_logic::observer::{ChannelObserver, ElevatorSnapshot};
use elevatorsim::elevator_logic::request::Motion;
use elevatorsim::elevator_logic::Elevator;
use elevatorsim::person::{Location, Person};
use elevatorsim::{Building, SimError, Simulation, TraceFormat};

const QUICK: Timing = Timing { travel: Duration::from_millis(10), doors: Duration::from_millis(10) };
const PATIENCE: Duration = Duration::from_secs(5);

fn elevator(names: &[&str], capacity: usize, timing: Timing) -> Arc<Elevator> {
    let floors = Arc::new(Floors::new(names).unwrap());
    Arc::new(Elevator::new(floors, capacity, timing))
}

fn start(elevator: &Arc<Elevator>) -> thread::JoinHandle<()> {
    let elevator = Arc::clone(elevator);
    thread::spawn(move || elevator.run())
}

/// Collects snapshots until `done` holds for one of them, or panics after `PATIENCE`.
fn collect_until(
    rx: &crossbeam_channel::Receiver<ElevatorSnapshot>,
    done: impl Fn(&ElevatorSnapshot) -> bool,
) -> Vec<ElevatorSnapshot> {
    let deadline = Instant::now() + PATIENCE;
    let mut seen = Vec::new();
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        let snapshot = rx.recv_timeout(left).expect("elevator did not reach the expected state in time");
        let finished = done(&snapshot);
        seen.push(snapshot);
        if finished {
            return seen;
        }
    }
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if out.last() != Some(&item) {
            out.push(item);
        }
    }
    out
}

#[test]
fn single_person_rides_from_ground_to_first_floor() {
    let elevator = elevator(&["T", "P1"], 2, QUICK);
    let runner = start(&elevator);
    let (t, p1) = (FloorId(0), FloorId(1));
    let person = Arc::new(Person::new("U1", t));

    let rider = {
        let elevator = Arc::clone(&elevator);
        let person = Arc::clone(&person);
        thread::spawn(move || -> Result<(), SimError> {
            elevator.call(t, Direction::Up);
            elevator.enter(&person, t, Direction::Up)?;
            assert_eq!(person.location(), Location::InElevator);
            elevator.request_stop(p1);
            elevator.exit(&person, p1)
        })
    };

    assert_eq!(rider.join().unwrap(), Ok(()));
    assert_eq!(person.location(), Location::Floor(p1));
    assert_eq!(person.destination(), None);
    assert_eq!(elevator.current_floor(), p1);
    assert!(elevator.passengers().is_empty());

    elevator.terminate();
    runner.join().unwrap();
}

#[test]
fn call_then_stop_is_served() {
    let elevator = elevator(&["T", "P1", "P2"], 2, QUICK);
    let (observer, rx) = ChannelObserver::unbounded();
    elevator.add_observer(Arc::new(observer));
    let runner = start(&elevator);

    elevator.call(FloorId(2), Direction::Down);
    collect_until(&rx, |s| s.floor == "P2" && s.door_open);

    elevator.request_stop(FloorId(0));
    collect_until(&rx, |s| s.floor == "T" && s.door_open);

    elevator.terminate();
    runner.join().unwrap();
}

#[test]
fn sweep_finishes_its_direction_before_reversing() {
    let elevator = elevator(&["T", "P1", "P2", "P3", "P4"], 2, QUICK);
    let (observer, rx) = ChannelObserver::unbounded();
    elevator.add_observer(Arc::new(observer));

    // All requests are in place before the elevator makes its first decision.
    elevator.call(FloorId(1), Direction::Down);
    elevator.request_stop(FloorId(2));
    elevator.request_stop(FloorId(4));
    let runner = start(&elevator);

    let seen = collect_until(&rx, |s| s.floor == "P1" && s.door_open && s.motion == Motion::Waiting);
    elevator.terminate();
    runner.join().unwrap();

    let positions = dedup(seen.iter().map(|s| s.floor.clone()));
    assert_eq!(positions, vec!["T", "P1", "P2", "P3", "P4", "P3", "P2", "P1"]);

    let openings = dedup(seen.iter().filter(|s| s.door_open).map(|s| s.floor.clone()));
    assert_eq!(openings, vec!["P2", "P4", "P1"]);
}

#[test]
fn terminate_releases_blocked_persons() {
    // The elevator thread never runs, so nobody can ever board at P1.
    let elevator = elevator(&["T", "P1", "P2"], 1, QUICK);
    let riders: Vec<_> = (1..=4)
        .map(|i| {
            let elevator = Arc::clone(&elevator);
            let person = Arc::new(Person::new(format!("U{i}"), FloorId(1)));
            thread::spawn(move || elevator.enter(&person, FloorId(1), Direction::Up))
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    assert!(elevator.floor_flags(FloorId(1)).is_called(Direction::Up));

    let stopped_at = Instant::now();
    elevator.terminate();
    for rider in riders {
        assert!(matches!(rider.join().unwrap(), Err(SimError::Abandoned(_))));
    }
    assert!(stopped_at.elapsed() < Duration::from_secs(1));
    assert!(elevator.passengers().is_empty());
}

#[test]
fn stop_is_prompt_even_with_long_delays() {
    let config = SimConfig {
        floor_names: vec!["T".into(), "P1".into(), "P2".into()],
        travel_time_ms: 10_000,
        door_time_ms: 10_000,
        waiting_time_ms: 10_000,
        seed: Some(3),
        ..SimConfig::default()
    };
    let building = Building::new(&config).unwrap();
    for _ in 0..5 {
        building.add_new_person().unwrap();
    }
    building.start_simulation().unwrap();
    building.request_stop("P2");
    thread::sleep(Duration::from_millis(100));

    let stopped_at = Instant::now();
    building.stop_simulation().unwrap();
    assert!(stopped_at.elapsed() < Duration::from_secs(2));
    assert!(building.elevator().is_terminated());
}

#[test]
fn busy_building_keeps_its_invariants() {
    let config = SimConfig {
        floor_names: vec!["T".into(), "P1".into(), "P2".into(), "P3".into()],
        capacity: 2,
        travel_time_ms: 2,
        door_time_ms: 2,
        waiting_time_ms: 5,
        seed: Some(11),
        ..SimConfig::default()
    };
    let building = Building::new(&config).unwrap();

    let most_aboard = Arc::new(AtomicUsize::new(0));
    let floors_seen = Arc::new(Mutex::new(Vec::new()));
    {
        let most_aboard = Arc::clone(&most_aboard);
        let floors_seen = Arc::clone(&floors_seen);
        building.add_elevator_observer(Arc::new(move |s: &ElevatorSnapshot| {
            most_aboard.fetch_max(s.passengers.len(), Ordering::SeqCst);
            floors_seen.lock().unwrap().push(s.floor.clone());
        }));
    }

    for _ in 0..6 {
        building.add_new_person().unwrap();
    }
    building.start_simulation().unwrap();
    thread::sleep(Duration::from_millis(600));
    building.stop_simulation().unwrap();

    assert!(most_aboard.load(Ordering::SeqCst) <= 2);

    // Adjacent floors only.
    let names = building.floor_names();
    let levels: Vec<usize> = dedup(floors_seen.lock().unwrap().iter().cloned())
        .iter()
        .map(|f| names.iter().position(|n| n == f).expect("position is a building floor"))
        .collect();
    assert!(levels.windows(2).all(|w| w[0].abs_diff(w[1]) == 1));

    // Every person is in exactly one place.
    let aboard = building.persons_in_elevator();
    for i in 1..=6 {
        let name = format!("U{i}");
        let on_floors = names.iter().filter(|f| building.persons_at_floor(f).contains(&name)).count();
        let in_cabin = aboard.contains(&name) as usize;
        assert_eq!(on_floors + in_cabin, 1, "{name} must be in exactly one place");
    }
}

#[test]
fn simulation_runs_and_finishes() {
    let config = SimConfig {
        floor_names: vec!["T".into(), "P1".into(), "P2".into()],
        travel_time_ms: 2,
        door_time_ms: 2,
        waiting_time_ms: 5,
        persons: 3,
        seed: Some(5),
        ..SimConfig::default()
    };
    let simulation = Simulation::new(config, TraceFormat::Off).unwrap();
    simulation.run_for(Duration::from_millis(200)).unwrap();

    let building = simulation.building();
    assert!(!building.is_running());
    assert_eq!(building.floor_names().len(), 3);
    let placed: usize = building
        .floor_names()
        .iter()
        .map(|f| building.persons_at_floor(f).len())
        .sum::<usize>()
        + building.persons_in_elevator().len();
    assert_eq!(placed, 3);
}
