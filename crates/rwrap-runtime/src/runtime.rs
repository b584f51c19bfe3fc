//! Runtime context: object table, text cache, roots and element access

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::handle::{Handle, HandleStats, HandleTable};
use crate::interned_string::{CharHandle, InternedStringTable, Symbol};
use crate::value::{Boxed, NativeTag, Storage, Value};

/// One host runtime instance
///
/// All access goes through `&self`; a runtime is meant to be driven from a
/// single thread at a time, like the host it models.
pub struct Runtime {
    pub(crate) handles: HandleTable,
    pub(crate) strings: InternedStringTable,
    pub(crate) protected: Mutex<Vec<Handle>>,
    pub(crate) preserved: DashMap<Handle, usize>,
    pub(crate) config: RuntimeConfig,
    pub(crate) allocations_since_collect: AtomicUsize,
    names: Symbol,
}

impl Runtime {
    /// Create a runtime with the default configuration
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        let strings = InternedStringTable::new();
        let names = strings.intern_symbol("names");
        debug!(?config, "runtime created");

        Self {
            handles: HandleTable::new(),
            strings,
            protected: Mutex::new(Vec::new()),
            preserved: DashMap::new(),
            config,
            allocations_since_collect: AtomicUsize::new(0),
            names,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Check if a handle refers to a live object
    pub fn is_valid(&self, handle: Handle) -> bool {
        self.handles.is_valid(handle)
    }

    pub fn stats(&self) -> HandleStats {
        self.handles.stats()
    }

    /// Number of live objects, `NULL` included
    pub fn live_count(&self) -> usize {
        self.handles.len()
    }

    pub(crate) fn read<T>(&self, handle: Handle, f: impl FnOnce(&Boxed) -> T) -> RuntimeResult<T> {
        self.handles
            .with_value(handle, f)
            .ok_or_else(|| RuntimeError::invalid_handle(handle))
    }

    fn write<T>(&self, handle: Handle, f: impl FnOnce(&mut Boxed) -> T) -> RuntimeResult<T> {
        self.handles
            .with_value_mut(handle, f)
            .ok_or_else(|| RuntimeError::invalid_handle(handle))
    }

    pub fn tag(&self, handle: Handle) -> RuntimeResult<NativeTag> {
        self.read(handle, |boxed| boxed.value.tag())
    }

    pub fn length(&self, handle: Handle) -> RuntimeResult<usize> {
        self.read(handle, |boxed| boxed.value.len())
    }

    // ========================================================================
    // Element-pointer access
    // ========================================================================

    /// Read access to the storage of a numeric, logical, raw or complex vector
    pub fn with_slots<S: Storage, R>(
        &self,
        handle: Handle,
        f: impl FnOnce(&[S]) -> R,
    ) -> RuntimeResult<R> {
        self.read(handle, |boxed| match S::slots(&boxed.value) {
            Some(slots) => Ok(f(slots)),
            None => Err(RuntimeError::tag_mismatch(S::TAG, boxed.value.tag())),
        })?
    }

    /// Write access to the storage of a numeric, logical, raw or complex vector
    ///
    /// The closure runs while the object is locked. It may intern text but
    /// must not otherwise call back into the runtime.
    pub fn with_slots_mut<S: Storage, R>(
        &self,
        handle: Handle,
        f: impl FnOnce(&mut [S]) -> R,
    ) -> RuntimeResult<R> {
        self.write(handle, |boxed| {
            let found = boxed.value.tag();
            match S::slots_mut(&mut boxed.value) {
                Some(slots) => Ok(f(slots)),
                None => Err(RuntimeError::tag_mismatch(S::TAG, found)),
            }
        })?
    }

    /// Copy out the storage of a numeric, logical, raw or complex vector
    pub fn slots<S: Storage>(&self, handle: Handle) -> RuntimeResult<Vec<S>> {
        self.with_slots(handle, |slots: &[S]| slots.to_vec())
    }

    // ========================================================================
    // Text vectors
    // ========================================================================

    /// Intern text into the runtime's string cache
    ///
    /// The handle stays valid while a live text vector holds it; store it
    /// with [`set_string_elt`](Self::set_string_elt) before the next
    /// allocation.
    pub fn intern_text(&self, text: &str) -> CharHandle {
        self.strings.intern(text)
    }

    /// Text behind an interned handle; unknown handles read as blank
    pub fn char_text(&self, handle: CharHandle) -> Arc<str> {
        self.strings.resolve(handle).unwrap_or_else(|| Arc::from(""))
    }

    pub fn set_string_elt(&self, handle: Handle, index: usize, text: CharHandle) -> RuntimeResult<()> {
        self.write(handle, |boxed| match &mut boxed.value {
            Value::Text(items) => {
                let length = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or_else(|| RuntimeError::index_out_of_bounds(index, length))?;
                *slot = text;
                Ok(())
            }
            other => Err(RuntimeError::tag_mismatch(NativeTag::Text, other.tag())),
        })?
    }

    pub fn string_elt(&self, handle: Handle, index: usize) -> RuntimeResult<Arc<str>> {
        let text = self.read(handle, |boxed| match &boxed.value {
            Value::Text(items) => items
                .get(index)
                .copied()
                .ok_or_else(|| RuntimeError::index_out_of_bounds(index, items.len())),
            other => Err(RuntimeError::tag_mismatch(NativeTag::Text, other.tag())),
        })??;
        Ok(self.char_text(text))
    }

    /// All elements of a text vector
    pub fn strings(&self, handle: Handle) -> RuntimeResult<Vec<String>> {
        let items = self.read(handle, |boxed| match &boxed.value {
            Value::Text(items) => Ok(items.clone()),
            other => Err(RuntimeError::tag_mismatch(NativeTag::Text, other.tag())),
        })??;
        Ok(items
            .into_iter()
            .map(|text| self.char_text(text).to_string())
            .collect())
    }

    // ========================================================================
    // Lists
    // ========================================================================

    pub fn set_vector_elt(&self, handle: Handle, index: usize, element: Handle) -> RuntimeResult<()> {
        if !self.is_valid(element) {
            return Err(RuntimeError::invalid_handle(element));
        }

        self.write(handle, |boxed| match &mut boxed.value {
            Value::List(items) => {
                let length = items.len();
                let slot = items
                    .get_mut(index)
                    .ok_or_else(|| RuntimeError::index_out_of_bounds(index, length))?;
                *slot = element;
                Ok(())
            }
            other => Err(RuntimeError::tag_mismatch(NativeTag::List, other.tag())),
        })?
    }

    pub fn vector_elt(&self, handle: Handle, index: usize) -> RuntimeResult<Handle> {
        self.read(handle, |boxed| match &boxed.value {
            Value::List(items) => items
                .get(index)
                .copied()
                .ok_or_else(|| RuntimeError::index_out_of_bounds(index, items.len())),
            other => Err(RuntimeError::tag_mismatch(NativeTag::List, other.tag())),
        })?
    }

    // ========================================================================
    // Attributes
    // ========================================================================

    /// Intern an attribute name
    pub fn install(&self, name: &str) -> Symbol {
        self.strings.intern_symbol(name)
    }

    /// The `names` attribute key
    pub fn names_symbol(&self) -> Symbol {
        self.names
    }

    pub fn set_attribute(&self, handle: Handle, symbol: Symbol, value: Handle) -> RuntimeResult<()> {
        if handle == Handle::NIL {
            return Err(RuntimeError::nil_attribute());
        }
        if !self.is_valid(value) {
            return Err(RuntimeError::invalid_handle(value));
        }

        self.write(handle, |boxed| boxed.set_attribute(symbol, value))
    }

    pub fn get_attribute(&self, handle: Handle, symbol: Symbol) -> RuntimeResult<Option<Handle>> {
        self.read(handle, |boxed| boxed.attribute(symbol))
    }

    /// Labels bound through the `names` attribute, if any
    pub fn names(&self, handle: Handle) -> RuntimeResult<Option<Vec<String>>> {
        match self.get_attribute(handle, self.names)? {
            Some(names) => Ok(Some(self.strings(names)?)),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Permanent roots
    // ========================================================================

    /// Keep `handle` alive until a matching [`release`](Self::release)
    pub fn preserve(&self, handle: Handle) {
        *self.preserved.entry(handle).or_insert(0) += 1;
    }

    pub fn release(&self, handle: Handle) {
        if let Entry::Occupied(mut entry) = self.preserved.entry(handle) {
            *entry.get_mut() -= 1;
            if *entry.get() == 0 {
                entry.remove();
            }
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
