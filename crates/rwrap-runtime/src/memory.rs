//! Allocation entry points
//!
//! Every allocation may run the collector first, so handles that are not
//! yet stored anywhere permanent must be protected across it.

use std::sync::atomic::Ordering;

use tracing::trace;

use crate::error::{RuntimeError, RuntimeResult};
use crate::handle::Handle;
use crate::runtime::Runtime;
use crate::value::{Boxed, NativeTag, Value};

impl Runtime {
    /// Allocate a vector of `tag` with `length` slots
    ///
    /// The returned handle is unprotected. Allocating [`NativeTag::Nil`]
    /// returns the interned `NULL` object.
    pub fn allocate(&self, tag: NativeTag, length: usize) -> RuntimeResult<Handle> {
        if tag == NativeTag::Nil {
            return Ok(Handle::NIL);
        }
        if let Some(limit) = self.config.max_vector_length {
            if length > limit {
                return Err(RuntimeError::allocation_limit(length, limit));
            }
        }

        self.maybe_collect();

        let handle = self
            .handles
            .create_handle(Boxed::new(Value::zeroed(tag, length)));
        trace!(%handle, %tag, length, "allocate");
        Ok(handle)
    }

    /// Allocate a text vector holding `text` as its only element
    pub fn make_string(&self, text: &str) -> RuntimeResult<Handle> {
        let x = self.protect(self.allocate(NativeTag::Text, 1)?);
        self.set_string_elt(x.handle(), 0, self.intern_text(text))?;
        Ok(x.into_inner())
    }

    fn maybe_collect(&self) {
        if self.config.gc_torture {
            self.collect();
            return;
        }

        let threshold = self.config.gc_threshold;
        if threshold > 0 {
            let count = self.allocations_since_collect.fetch_add(1, Ordering::Relaxed) + 1;
            if count >= threshold {
                self.collect();
            }
        }
    }
}

/// Request for a vector whose slots the caller fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoInit {
    size: usize,
}

impl NoInit {
    pub fn new(size: usize) -> Self {
        NoInit { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Materialise the request as a vector of `tag`
    pub fn allocate(self, runtime: &Runtime, tag: NativeTag) -> RuntimeResult<Handle> {
        runtime.allocate(tag, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::error::RuntimeErrorKind;

    #[test]
    fn test_allocate_vectors() {
        let rt = Runtime::new();
        let ints = rt.allocate(NativeTag::Integer, 3).unwrap();
        assert_eq!(rt.tag(ints).unwrap(), NativeTag::Integer);
        assert_eq!(rt.length(ints).unwrap(), 3);
        assert_eq!(rt.slots::<i32>(ints).unwrap(), vec![0, 0, 0]);

        let text = rt.allocate(NativeTag::Text, 0).unwrap();
        assert_eq!(rt.length(text).unwrap(), 0);

        assert_eq!(rt.allocate(NativeTag::Nil, 4).unwrap(), Handle::NIL);
        assert_eq!(rt.stats().allocated, 2);
    }

    #[test]
    fn test_allocation_limit() {
        let rt = Runtime::with_config(RuntimeConfig::default().with_max_vector_length(4));
        assert!(rt.allocate(NativeTag::Real, 4).is_ok());

        let err = rt.allocate(NativeTag::Real, 5).unwrap_err();
        assert_eq!(
            err.kind(),
            &RuntimeErrorKind::AllocationLimit {
                requested: 5,
                limit: 4
            }
        );
    }

    #[test]
    fn test_make_string() {
        let rt = Runtime::new();
        let handle = rt.make_string("hello").unwrap();
        assert_eq!(rt.tag(handle).unwrap(), NativeTag::Text);
        assert_eq!(&*rt.string_elt(handle, 0).unwrap(), "hello");
        assert_eq!(rt.protect_depth(), 0);
    }

    #[test]
    fn test_no_init() {
        let rt = Runtime::new();
        let request = NoInit::new(5);
        assert_eq!(request.size(), 5);

        let handle = request.allocate(&rt, NativeTag::Complex).unwrap();
        assert_eq!(rt.tag(handle).unwrap(), NativeTag::Complex);
        assert_eq!(rt.length(handle).unwrap(), 5);
    }
}
