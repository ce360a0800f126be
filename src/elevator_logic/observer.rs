//! Change notifications from the elevator to external listeners.
//!
//! The elevator owns an [`Observers`] registry and calls [`Observers::notify`]
//! after every change of position, doors or passengers. Notification happens
//! on the elevator's (or a person's) thread while the elevator monitor is held,
//! so an observer must never call back into the elevator. Observers that need
//! to do real work should forward the snapshot, see [`ChannelObserver`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel as cbc;
use serde::Serialize;

use super::request::Motion;

/// State of the elevator at the moment of a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElevatorSnapshot {
    /// Name of the floor the elevator is at
    pub floor: String,
    /// Door status
    pub door_open: bool,
    /// Scheduling state
    pub motion: Motion,
    /// Names of the persons in the cabin, in boarding order
    pub passengers: Vec<String>,
}

/// Listener for elevator changes.
pub trait ElevatorObserver: Send + Sync {
    /// Called when something changes in the observed elevator.
    fn elevator_changed(&self, snapshot: &ElevatorSnapshot);
}

impl<F> ElevatorObserver for F
where
    F: Fn(&ElevatorSnapshot) + Send + Sync,
{
    fn elevator_changed(&self, snapshot: &ElevatorSnapshot) {
        self(snapshot)
    }
}

/// Handle returned on registration, used to deregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Ordered list of registered observers.
#[derive(Default)]
pub struct Observers {
    next_id: AtomicU64,
    list: Mutex<Vec<(ObserverId, Arc<dyn ElevatorObserver>)>>,
}

impl Observers {
    pub fn new() -> Observers {
        Observers::default()
    }

    /// Registers an observer. It is notified after all observers registered before it.
    pub fn add(&self, observer: Arc<dyn ElevatorObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, observer));
        id
    }

    /// Deregisters an observer. Returns `false` if the id was not registered.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut list = self.lock();
        let before = list.len();
        list.retain(|(registered, _)| *registered != id);
        list.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Calls every observer in registration order on the calling thread.
    pub fn notify(&self, snapshot: &ElevatorSnapshot) {
        // Snapshot of the list so observers may (de)register others while being notified.
        let current: Vec<Arc<dyn ElevatorObserver>> =
            self.lock().iter().map(|(_, observer)| Arc::clone(observer)).collect();
        for observer in current {
            observer.elevator_changed(snapshot);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ObserverId, Arc<dyn ElevatorObserver>)>> {
        self.list.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Observer that forwards every snapshot over a crossbeam channel.
///
/// The receiving side runs on its own thread, outside the elevator monitor,
/// and is free to query the building. A disconnected receiver is ignored.
pub struct ChannelObserver {
    tx: cbc::Sender<ElevatorSnapshot>,
}

impl ChannelObserver {
    pub fn new(tx: cbc::Sender<ElevatorSnapshot>) -> ChannelObserver {
        ChannelObserver { tx }
    }

    /// Creates an observer together with an unbounded receiver for its snapshots.
    pub fn unbounded() -> (ChannelObserver, cbc::Receiver<ElevatorSnapshot>) {
        let (tx, rx) = cbc::unbounded();
        (ChannelObserver { tx }, rx)
    }
}

impl ElevatorObserver for ChannelObserver {
    fn elevator_changed(&self, snapshot: &ElevatorSnapshot) {
        let _ = self.tx.send(snapshot.clone());
    }
}
