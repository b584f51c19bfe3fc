//! Sequence conversion.
//!
//! A sequence of known length becomes a single unnamed vector. The element
//! type's shape picks the storage strategy:
//! - primitives are written through the vector's storage slice, cast or not
//!   according to their [`Primitive::NeedsCast`] marker;
//! - string-like elements are copied into one reused buffer and interned;
//! - anything else is converted on its own and stored in a list;
//! - `(key, value)` entries produce a named vector instead.
//!
//! An empty sequence produces a zero-length vector without pulling a single
//! element from the iterator.

use std::borrow::Borrow;
use std::marker::PhantomData;

use rwrap_runtime::{Handle, NativeTag, NoInit, Runtime, RuntimeResult};
use tracing::trace;

use crate::dispatch::Wrap;
use crate::named::{Entry, NamedWrap};
use crate::primitive::{Primitive, intern};
use crate::traits::{
    Classify, NestedShape, PairShape, PrimitiveShape, ShapeOf, StringShape, TextLike,
};

/// Conversion of a sequence whose elements borrow as `Self`.
pub trait RangeWrap<Shape> {
    fn wrap_range<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Borrow<Self>;
}

/// Item types accepted by [`wrap_range`](crate::wrap_range).
pub trait RangeElement: Sized {
    fn wrap_iter<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator<Item = Self>;
}

impl<T: Classify + RangeWrap<ShapeOf<T>>> RangeElement for T {
    fn wrap_iter<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator<Item = Self>,
    {
        <T as RangeWrap<ShapeOf<T>>>::wrap_range(runtime, iter)
    }
}

impl<T: Primitive> RangeWrap<PrimitiveShape> for T {
    fn wrap_range<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Borrow<Self>,
    {
        let size = iter.len();
        let x = runtime.protect(NoInit::new(size).allocate(runtime, T::TAG)?);
        let values: Vec<T::Storage> = iter
            .take(size)
            .map(|item| {
                let value: &T = item.borrow();
                T::to_storage(*value)
            })
            .collect();
        runtime.with_slots_mut(x.handle(), |slots: &mut [T::Storage]| {
            slots[..values.len()].copy_from_slice(&values);
        })?;
        trace!(tag = %T::TAG, length = size, "wrap range");
        Ok(x.into_inner())
    }
}

impl<T: TextLike + ?Sized> RangeWrap<StringShape> for T {
    fn wrap_range<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Borrow<Self>,
    {
        let size = iter.len();
        let x = runtime.protect(runtime.allocate(NativeTag::Text, size)?);
        let mut buffer = String::new();
        for (index, item) in iter.take(size).enumerate() {
            let value: &T = item.borrow();
            runtime.set_string_elt(x.handle(), index, intern(runtime, &mut buffer, value))?;
        }
        trace!(length = size, "wrap text range");
        Ok(x.into_inner())
    }
}

impl<T: Wrap + ?Sized> RangeWrap<NestedShape> for T {
    fn wrap_range<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Borrow<Self>,
    {
        let size = iter.len();
        let x = runtime.protect(runtime.allocate(NativeTag::List, size)?);
        for (index, item) in iter.take(size).enumerate() {
            let value: &T = item.borrow();
            let element = value.wrap_into(runtime)?;
            runtime.set_vector_elt(x.handle(), index, element)?;
        }
        trace!(length = size, "wrap nested range");
        Ok(x.into_inner())
    }
}

impl<K, V, S> RangeWrap<PairShape<S>> for (K, V)
where
    K: TextLike,
    V: NamedWrap<S>,
{
    fn wrap_range<I>(runtime: &Runtime, iter: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Borrow<Self>,
    {
        <V as NamedWrap<S>>::wrap_named(runtime, iter.map(BorrowedEntry::<I::Item, K, V>::new))
    }
}

/// A `(key, value)` tuple viewed as an [`Entry`].
pub(crate) struct BorrowedEntry<B, K, V> {
    pair: B,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<B: Borrow<(K, V)>, K, V> BorrowedEntry<B, K, V> {
    pub(crate) fn new(pair: B) -> Self {
        BorrowedEntry {
            pair,
            _marker: PhantomData,
        }
    }
}

impl<B: Borrow<(K, V)>, K: TextLike, V> Entry for BorrowedEntry<B, K, V> {
    type Key = K;
    type Value = V;

    fn key(&self) -> &K {
        let (key, _) = Borrow::<(K, V)>::borrow(&self.pair);
        key
    }

    fn value(&self) -> &V {
        let (_, value) = Borrow::<(K, V)>::borrow(&self.pair);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_range() {
        let rt = Runtime::new();
        let handle = <u8 as RangeWrap<PrimitiveShape>>::wrap_range(&rt, [1u8, 2, 255].iter())
            .unwrap();
        assert_eq!(rt.tag(handle).unwrap(), NativeTag::Integer);
        assert_eq!(rt.slots::<i32>(handle).unwrap(), vec![1, 2, 255]);
    }

    #[test]
    fn test_text_range_reuses_interned_text() {
        let rt = Runtime::new();
        let words = ["a", "b", "a"];
        let handle = <&str as RangeWrap<StringShape>>::wrap_range(&rt, words.iter()).unwrap();
        assert_eq!(rt.strings(handle).unwrap(), vec!["a", "b", "a"]);
        assert_eq!(rt.string_elt(handle, 0).unwrap(), rt.string_elt(handle, 2).unwrap());
    }

    #[test]
    fn test_nested_range() {
        let rt = Runtime::new();
        let rows = vec![vec![1.0, 2.0], vec![]];
        let handle = <Vec<f64> as RangeWrap<NestedShape>>::wrap_range(&rt, rows.iter()).unwrap();
        assert_eq!(rt.deparse(handle).unwrap(), "list(c(1, 2), numeric(0))");
        assert_eq!(rt.protect_depth(), 0);
    }

    #[test]
    fn test_pairs_range_is_named() {
        let rt = Runtime::new();
        let pairs = vec![("x", 1i64), ("y", 2i64)];
        let handle = <(&str, i64) as RangeElement>::wrap_iter(&rt, pairs.into_iter()).unwrap();
        assert_eq!(rt.deparse(handle).unwrap(), "c(x = 1L, y = 2L)");
    }
}
