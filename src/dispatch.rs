//! Top-level dispatch.
//!
//! [`Wrap`] is implemented for every classified type whose category has a
//! [`Convert`] impl. The category is an associated type, so exactly one
//! converter is selected per type and nothing is inspected at runtime.

use std::ffi::CStr;
use std::iter;

use rwrap_runtime::{Handle, Runtime, RuntimeResult};

use crate::named::NamedWrap;
use crate::range::{BorrowedEntry, RangeElement};
use crate::traits::{Classify, GenericTag, HandleTag, IntoHandle, Iterable, PairTag, TextLike};

/// Conversion selected by the category marker `C`.
pub trait Convert<C> {
    fn convert(&self, runtime: &Runtime) -> RuntimeResult<Handle>;
}

/// Values that can be converted to a runtime handle.
#[diagnostic::on_unimplemented(
    message = "cannot convert `{Self}` to a dynamic handle",
    label = "`{Self}` has no conversion category or lacks its capability",
    note = "convertible types implement `Classify` and the trait their category requires"
)]
pub trait Wrap {
    fn wrap_into(&self, runtime: &Runtime) -> RuntimeResult<Handle>;
}

impl<T: Classify + Convert<T::Category> + ?Sized> Wrap for T {
    fn wrap_into(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
        <T as Convert<T::Category>>::convert(self, runtime)
    }
}

impl<T: IntoHandle + ?Sized> Convert<HandleTag> for T {
    fn convert(&self, _runtime: &Runtime) -> RuntimeResult<Handle> {
        Ok(self.as_handle())
    }
}

impl<T: Iterable + ?Sized> Convert<GenericTag> for T {
    fn convert(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
        self.wrap_elements(runtime)
    }
}

/// A lone entry becomes a named vector of length one.
impl<K, V, S> Convert<PairTag<S>> for (K, V)
where
    K: TextLike,
    V: NamedWrap<S>,
{
    fn convert(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
        let entry = BorrowedEntry::<&(K, V), K, V>::new(self);
        <V as NamedWrap<S>>::wrap_named(runtime, iter::once(entry))
    }
}

/// Convert `value` into a runtime handle.
///
/// The returned handle is unprotected: store it or protect it before the
/// next allocation.
pub fn wrap<T: Wrap + ?Sized>(runtime: &Runtime, value: &T) -> RuntimeResult<Handle> {
    value.wrap_into(runtime)
}

/// Convert a sequence of known length into a single vector.
///
/// The iterator may read the runtime: elements are pulled before any target
/// storage is written.
pub fn wrap_range<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
where
    I: IntoIterator,
    I::IntoIter: ExactSizeIterator,
    I::Item: RangeElement,
{
    <I::Item as RangeElement>::wrap_iter(runtime, iter.into_iter())
}

/// Convert a C string into a length-1 text vector.
///
/// Invalid UTF-8 is replaced with U+FFFD.
pub fn wrap_cstr(runtime: &Runtime, text: &CStr) -> RuntimeResult<Handle> {
    runtime.make_string(&text.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwrap_runtime::NativeTag;

    #[test]
    fn test_handle_passthrough_allocates_nothing() {
        let rt = Runtime::new();
        let existing = rt.make_string("kept").unwrap();
        let before = rt.stats().allocated;

        assert_eq!(wrap(&rt, &existing).unwrap(), existing);
        assert_eq!(wrap(&rt, &Handle::NIL).unwrap(), Handle::NIL);

        let guard = rt.protect(existing);
        assert_eq!(wrap(&rt, &guard).unwrap(), existing);
        drop(guard);

        assert_eq!(rt.stats().allocated, before);
    }

    #[test]
    fn test_single_pair() {
        let rt = Runtime::new();
        let handle = wrap(&rt, &("answer", 42)).unwrap();
        assert_eq!(rt.deparse(handle).unwrap(), "c(answer = 42L)");
    }

    #[test]
    fn test_wrap_cstr() {
        let rt = Runtime::new();
        let handle = wrap_cstr(&rt, c"hello").unwrap();
        assert_eq!(rt.tag(handle).unwrap(), NativeTag::Text);
        assert_eq!(rt.strings(handle).unwrap(), vec!["hello"]);
    }

    #[test]
    fn test_wrap_cstr_replaces_invalid_utf8() {
        let rt = Runtime::new();
        let text = CStr::from_bytes_with_nul(b"a\xffb\0").unwrap();
        let handle = wrap_cstr(&rt, text).unwrap();
        assert_eq!(rt.strings(handle).unwrap(), vec!["a\u{FFFD}b"]);
    }
}
