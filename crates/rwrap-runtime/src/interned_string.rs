//! Interned text cache
//!
//! Elements of text vectors and attribute keys are references into this
//! table rather than owned strings:
//! - Identical text always interns to the same [`CharHandle`]
//! - The blank string is pre-interned as [`CharHandle::BLANK`]
//! - Attribute names and the blank string are pinned; other text is dropped
//!   by a collection once no live text vector refers to it

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::{DashMap, DashSet};

/// Reference to an interned piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharHandle(u32);

impl CharHandle {
    /// The empty string
    pub const BLANK: CharHandle = CharHandle(0);

    pub fn index(self) -> u32 {
        self.0
    }
}

impl Default for CharHandle {
    fn default() -> Self {
        CharHandle::BLANK
    }
}

/// Attribute key: an interned name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(CharHandle);

impl Symbol {
    pub fn name(self) -> CharHandle {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(index: u32) -> Self {
        Symbol(CharHandle(index))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "symbol#{}", self.0.0)
    }
}

/// Interned string table that manages text deduplication
pub struct InternedStringTable {
    by_text: DashMap<Arc<str>, CharHandle>,
    by_handle: DashMap<CharHandle, Arc<str>>,
    pinned: DashSet<CharHandle>,
    next_index: AtomicU32,
}

impl InternedStringTable {
    /// Create a table holding only the blank string
    pub fn new() -> Self {
        let blank: Arc<str> = Arc::from("");
        let by_text = DashMap::new();
        let by_handle = DashMap::new();
        by_text.insert(blank.clone(), CharHandle::BLANK);
        by_handle.insert(CharHandle::BLANK, blank);
        let pinned = DashSet::new();
        pinned.insert(CharHandle::BLANK);

        Self {
            by_text,
            by_handle,
            pinned,
            next_index: AtomicU32::new(1),
        }
    }

    /// Intern `text`, returning the existing handle when already present
    pub fn intern(&self, text: &str) -> CharHandle {
        if let Some(existing) = self.by_text.get(text) {
            return *existing;
        }

        let text: Arc<str> = Arc::from(text);
        *self.by_text.entry(text.clone()).or_insert_with(|| {
            let handle = CharHandle(self.next_index.fetch_add(1, Ordering::Relaxed));
            self.by_handle.insert(handle, text);
            handle
        })
    }

    /// Intern an attribute name; names are never swept
    pub fn intern_symbol(&self, name: &str) -> Symbol {
        let handle = self.intern(name);
        self.pinned.insert(handle);
        Symbol(handle)
    }

    /// Drop unpinned text for which `live` is false; returns the number dropped
    ///
    /// Handles are never reissued, so a swept handle resolves to nothing.
    pub(crate) fn sweep(&self, live: impl Fn(CharHandle) -> bool) -> usize {
        let dead: Vec<(CharHandle, Arc<str>)> = self
            .by_handle
            .iter()
            .filter(|entry| !self.pinned.contains(entry.key()) && !live(*entry.key()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        for (handle, text) in &dead {
            self.by_handle.remove(handle);
            self.by_text.remove(text);
        }
        dead.len()
    }

    /// Look up the text behind a handle
    pub fn resolve(&self, handle: CharHandle) -> Option<Arc<str>> {
        self.by_handle.get(&handle).map(|entry| entry.value().clone())
    }

    /// Number of interned strings, the blank string included
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InternedStringTable {
    fn default() -> Self {
        Self::new()
    }
}
