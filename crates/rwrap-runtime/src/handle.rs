//! Handle-based object table
//!
//! Handles are indices into a table of [`Boxed`] objects. Index 0 is the
//! invalid handle and index 1 is the interned `NULL` object, which is
//! allocated with the table and never collected.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;

use crate::value::{Boxed, Value};

/// An opaque handle that indirectly references a runtime object
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Invalid handle constant
    pub const INVALID: Handle = Handle(0);

    /// The interned `NULL` object
    pub const NIL: Handle = Handle(1);

    pub fn index(self) -> u64 {
        self.0
    }

    pub fn is_invalid(self) -> bool {
        self.0 == 0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(index: u64) -> Self {
        Handle(index)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Allocation counters for a handle table
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HandleStats {
    pub allocated: u64,
    pub collected: u64,
    pub peak_count: u64,
}

impl HandleStats {
    /// Objects allocated and not yet collected, `NULL` excluded
    pub fn live(&self) -> u64 {
        self.allocated - self.collected
    }
}

/// Handle table that owns every runtime object
pub struct HandleTable {
    table: DashMap<u64, Box<Boxed>>,
    counter: AtomicU64,
    stats: Mutex<HandleStats>,
}

impl HandleTable {
    /// Create a new handle table holding the interned `NULL` object
    pub fn new() -> Self {
        let table = DashMap::new();
        table.insert(Handle::NIL.0, Box::new(Boxed::new(Value::Nil)));

        Self {
            table,
            counter: AtomicU64::new(Handle::NIL.0 + 1),
            stats: Mutex::new(HandleStats::default()),
        }
    }

    #[cfg(test)]
    fn starting_at(next: u64) -> Self {
        let table = Self::new();
        table.counter.store(next, Ordering::Relaxed);
        table
    }

    /// Create a new handle for a boxed object
    pub fn create_handle(&self, boxed: Boxed) -> Handle {
        let handle = Handle(self.counter.fetch_add(1, Ordering::Relaxed));
        self.table.insert(handle.0, Box::new(boxed));

        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.allocated += 1;
        stats.peak_count = stats.peak_count.max(stats.live());

        handle
    }

    /// Check if a handle refers to a live object
    pub fn is_valid(&self, handle: Handle) -> bool {
        !handle.is_invalid() && self.table.contains_key(&handle.0)
    }

    /// Execute a closure with access to the boxed object
    pub fn with_value<T, F>(&self, handle: Handle, f: F) -> Option<T>
    where
        F: FnOnce(&Boxed) -> T,
    {
        if handle.is_invalid() {
            return None;
        }

        self.table.get(&handle.0).map(|boxed| f(&boxed))
    }

    /// Execute a closure with mutable access to the boxed object
    pub fn with_value_mut<T, F>(&self, handle: Handle, f: F) -> Option<T>
    where
        F: FnOnce(&mut Boxed) -> T,
    {
        if handle.is_invalid() {
            return None;
        }

        self.table.get_mut(&handle.0).map(|mut boxed| f(&mut boxed))
    }

    /// Drop every object whose handle is not in `live`; returns the number dropped
    pub(crate) fn sweep(&self, live: impl Fn(Handle) -> bool) -> u64 {
        let before = self.table.len();
        self.table
            .retain(|&index, _| index == Handle::NIL.0 || live(Handle(index)));
        let swept = before.saturating_sub(self.table.len()) as u64;

        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        stats.collected += swept;
        swept
    }

    /// Number of objects in the table, `NULL` included
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Get handle management statistics
    pub fn stats(&self) -> HandleStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HandleTable {
    fn default() -> Self {
        Self::new()
    }
}
