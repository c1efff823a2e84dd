//! Shared Filter Parameters
//!
//! The parameter store sits between the host's parameter callbacks (any
//! thread, any number of notifications) and the refresh tick. Writers replace
//! the snapshot and raise a sticky "changed" flag; the tick atomically
//! test-and-clears the flag and reads one consistent snapshot, so a burst of
//! edits between two ticks costs a single recomputation.
//!
//! The audio thread never touches this type.

use std::sync::atomic::{AtomicBool, Ordering};

use equinox_dsp::FilterParameters;
use parking_lot::RwLock;

pub struct ParameterStore {
    current: RwLock<FilterParameters>,
    changed: AtomicBool,
}

impl ParameterStore {
    pub fn new(parameters: FilterParameters) -> Self {
        Self {
            current: RwLock::new(parameters),
            changed: AtomicBool::new(false),
        }
    }

    /// Replace the whole snapshot
    pub fn set(&self, parameters: FilterParameters) {
        *self.current.write() = parameters;
        self.changed.store(true, Ordering::Release);
    }

    /// Edit the snapshot in place (e.g. one knob moved)
    pub fn update(&self, edit: impl FnOnce(&mut FilterParameters)) {
        let mut current = self.current.write();
        edit(&mut *current);
        drop(current);
        self.changed.store(true, Ordering::Release);
    }

    /// Mark the parameters dirty without editing them
    pub fn notify_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }

    /// Consistent copy of the current parameters
    pub fn snapshot(&self) -> FilterParameters {
        *self.current.read()
    }

    /// True if anything changed since the last call; clears the flag
    pub fn take_changed(&self) -> bool {
        self.changed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok()
    }

    /// Peek at the flag without clearing it
    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(FilterParameters::default())
    }
}
