//! One-shot condition/handler event registry.

use crate::error::MasterResult;
use crate::master::Master;

/// Predicate deciding whether an event entry fires.
///
/// Evaluated against shared master state; typically reads port values
/// through [`Master::get`]. Captures its own parameters.
pub type EventCondition = Box<dyn FnMut(&Master) -> MasterResult<bool>>;

/// Reaction invoked when an entry's condition becomes true.
///
/// Gets mutable access to the master, so it may set inputs or register new
/// events. Captures its own parameters.
pub type EventHandler = Box<dyn FnMut(&mut Master) -> MasterResult<()>>;

/// A pending condition/handler pair awaiting its condition becoming true.
pub(crate) struct EventEntry {
    pub condition: EventCondition,
    pub handler: EventHandler,
}

/// Registry of pending one-shot events.
///
/// Each entry lives from registration until its condition first evaluates
/// true in a sweep, at which point it is removed and its handler fires.
/// Sweeps are snapshot-then-apply: a sweep evaluates exactly the entries
/// registered before it started, in registration order; entries registered
/// during the sweep (by handlers) are kept for the next sweep. Handlers are
/// free to re-register themselves for level- or edge-triggered behavior.
#[derive(Default)]
pub(crate) struct EventRegistry {
    entries: Vec<EventEntry>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: EventEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Move all current entries out, e.g. as a sweep snapshot.
    pub fn take(&mut self) -> Vec<EventEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Put surviving entries back, ahead of anything registered meanwhile.
    pub fn restore(&mut self, mut survivors: Vec<EventEntry>) {
        survivors.append(&mut self.entries);
        self.entries = survivors;
    }
}
