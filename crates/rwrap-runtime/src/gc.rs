//! Mark-and-sweep collection
//!
//! Roots are the protect stack, the preserved set and `NULL`. Marking
//! follows list elements and attribute values. Interned text not held by a
//! surviving text vector is released in the same pass.

use std::collections::HashSet;
use std::sync::atomic::Ordering;

use tracing::debug;

use crate::handle::Handle;
use crate::runtime::Runtime;
use crate::value::Value;

/// Outcome of one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectSummary {
    pub marked: usize,
    pub swept: u64,
    pub released_text: usize,
}

impl Runtime {
    /// Reclaim every object not reachable from a root
    pub fn collect(&self) -> CollectSummary {
        let mut pending = self.protected_roots();
        pending.extend(self.preserved.iter().map(|entry| *entry.key()));
        pending.push(Handle::NIL);

        let mut marked = HashSet::new();
        let mut texts = HashSet::new();
        while let Some(handle) = pending.pop() {
            if !marked.insert(handle) {
                continue;
            }
            if let Some(children) = self.handles.with_value(handle, |boxed| {
                if let Value::Text(items) = &boxed.value {
                    texts.extend(items.iter().copied());
                }
                boxed.children().collect::<Vec<_>>()
            }) {
                pending.extend(children);
            }
        }

        let swept = self.handles.sweep(|handle| marked.contains(&handle));
        let released_text = self.strings.sweep(|text| texts.contains(&text));
        self.allocations_since_collect.store(0, Ordering::Relaxed);
        debug!(marked = marked.len(), swept, released_text, "garbage collection");

        CollectSummary {
            marked: marked.len(),
            swept,
            released_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::RuntimeConfig;
    use crate::value::NativeTag;
    use crate::{Handle, Runtime};

    #[test]
    fn test_unrooted_objects_are_collected() {
        let rt = Runtime::new();
        let garbage = rt.allocate(NativeTag::Integer, 1).unwrap();
        let summary = rt.collect();
        assert_eq!(summary.swept, 1);
        assert!(!rt.is_valid(garbage));
        assert!(rt.is_valid(Handle::NIL));
    }

    #[test]
    fn test_protected_and_reachable_objects_survive() {
        let rt = Runtime::new();
        let list = rt.protect(rt.allocate(NativeTag::List, 1).unwrap());
        let element = rt.allocate(NativeTag::Real, 2).unwrap();
        rt.set_vector_elt(list.handle(), 0, element).unwrap();

        let names = rt.allocate(NativeTag::Text, 1).unwrap();
        rt.set_attribute(list.handle(), rt.names_symbol(), names)
            .unwrap();

        let summary = rt.collect();
        assert_eq!(summary.swept, 0);
        assert!(rt.is_valid(element));
        assert!(rt.is_valid(names));

        drop(list);
        rt.collect();
        assert!(!rt.is_valid(element));
        assert!(!rt.is_valid(names));
    }

    #[test]
    fn test_unreferenced_text_is_released() {
        let rt = Runtime::new();
        let kept = rt.protect(rt.make_string("kept").unwrap());
        let dropped = rt.make_string("dropped").unwrap();
        let class = rt.install("class");
        let text = rt.intern_text("dropped");

        let summary = rt.collect();
        assert!(!rt.is_valid(dropped));
        assert_eq!(summary.released_text, 1);
        assert_eq!(&*rt.char_text(text), "");
        assert_eq!(&*rt.string_elt(kept.handle(), 0).unwrap(), "kept");
        assert_eq!(&*rt.char_text(class.name()), "class");
        assert_eq!(&*rt.char_text(rt.names_symbol().name()), "names");

        let summary = rt.collect();
        assert_eq!(summary.released_text, 0);
    }

    #[test]
    fn test_preserve_is_counted() {
        let rt = Runtime::new();
        let handle = rt.allocate(NativeTag::Logical, 1).unwrap();
        rt.preserve(handle);
        rt.preserve(handle);

        rt.release(handle);
        rt.collect();
        assert!(rt.is_valid(handle));

        rt.release(handle);
        rt.collect();
        assert!(!rt.is_valid(handle));
    }

    #[test]
    fn test_torture_collects_on_every_allocation() {
        let rt = Runtime::with_config(RuntimeConfig::default().with_gc_torture(true));
        let unprotected = rt.allocate(NativeTag::Integer, 1).unwrap();
        let protected = rt.protect(rt.allocate(NativeTag::Integer, 1).unwrap());
        rt.allocate(NativeTag::Integer, 1).unwrap();

        assert!(!rt.is_valid(unprotected));
        assert!(rt.is_valid(protected.handle()));
    }

    #[test]
    fn test_threshold_triggers_collection() {
        let rt = Runtime::with_config(RuntimeConfig::default().with_gc_threshold(3));
        let first = rt.allocate(NativeTag::Real, 1).unwrap();
        rt.allocate(NativeTag::Real, 1).unwrap();
        assert!(rt.is_valid(first));

        // The third allocation reaches the threshold and collects first.
        rt.allocate(NativeTag::Real, 1).unwrap();
        assert!(!rt.is_valid(first));
        assert_eq!(rt.stats().collected, 2);
    }
}
