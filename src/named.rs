//! Associative conversion.
//!
//! `(key, value)` entries become a value vector plus a text vector of the
//! same length holding the keys, bound as the value vector's `names`
//! attribute. Both vectors stay protected until the attribute is set.

use rwrap_runtime::{Handle, NativeTag, NoInit, Protected, Runtime, RuntimeResult};
use tracing::trace;

use crate::dispatch::Wrap;
use crate::primitive::{Primitive, intern};
use crate::traits::{NestedShape, PairShape, PrimitiveShape, StringShape, TextLike};

/// One `(key, value)` entry of an associative container.
pub trait Entry {
    type Key: TextLike + ?Sized;
    type Value: ?Sized;

    fn key(&self) -> &Self::Key;
    fn value(&self) -> &Self::Value;
}

/// A map item: key and value borrowed separately.
pub(crate) struct MapEntry<'a, K, V> {
    key: &'a K,
    value: &'a V,
}

impl<'a, K, V> MapEntry<'a, K, V> {
    pub(crate) fn new(key: &'a K, value: &'a V) -> Self {
        MapEntry { key, value }
    }
}

impl<K: TextLike, V> Entry for MapEntry<'_, K, V> {
    type Key = K;
    type Value = V;

    fn key(&self) -> &K {
        self.key
    }

    fn value(&self) -> &V {
        self.value
    }
}

/// Conversion of entries whose values are `Self`.
pub trait NamedWrap<Shape> {
    fn wrap_named<I>(runtime: &Runtime, entries: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Entry<Value = Self>;
}

impl<T: Primitive> NamedWrap<PrimitiveShape> for T {
    fn wrap_named<I>(runtime: &Runtime, entries: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Entry<Value = Self>,
    {
        let size = entries.len();
        let x = runtime.protect(NoInit::new(size).allocate(runtime, T::TAG)?);
        let names = runtime.protect(runtime.allocate(NativeTag::Text, size)?);

        let mut buffer = String::new();
        let mut values = Vec::with_capacity(size);
        for (index, entry) in entries.take(size).enumerate() {
            values.push(T::to_storage(*entry.value()));
            let label = intern(runtime, &mut buffer, entry.key());
            runtime.set_string_elt(names.handle(), index, label)?;
        }
        runtime.with_slots_mut(x.handle(), |slots: &mut [T::Storage]| {
            slots[..values.len()].copy_from_slice(&values);
        })?;

        trace!(tag = %T::TAG, length = size, "wrap named");
        bind_names(runtime, x, names)
    }
}

impl<T: TextLike + ?Sized> NamedWrap<StringShape> for T {
    fn wrap_named<I>(runtime: &Runtime, entries: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Entry<Value = Self>,
    {
        let size = entries.len();
        let x = runtime.protect(runtime.allocate(NativeTag::Text, size)?);
        let names = runtime.protect(runtime.allocate(NativeTag::Text, size)?);

        let mut buffer = String::new();
        for (index, entry) in entries.take(size).enumerate() {
            let label = intern(runtime, &mut buffer, entry.key());
            runtime.set_string_elt(names.handle(), index, label)?;
            let text = intern(runtime, &mut buffer, entry.value());
            runtime.set_string_elt(x.handle(), index, text)?;
        }

        trace!(length = size, "wrap named text");
        bind_names(runtime, x, names)
    }
}

impl<T: Wrap + ?Sized> NamedWrap<NestedShape> for T {
    fn wrap_named<I>(runtime: &Runtime, entries: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Entry<Value = Self>,
    {
        named_list(runtime, entries)
    }
}

/// Entry values that are themselves pairs are converted one by one.
impl<K, V, S> NamedWrap<PairShape<S>> for (K, V)
where
    (K, V): Wrap,
{
    fn wrap_named<I>(runtime: &Runtime, entries: I) -> RuntimeResult<Handle>
    where
        I: ExactSizeIterator,
        I::Item: Entry<Value = Self>,
    {
        named_list(runtime, entries)
    }
}

fn named_list<T, I>(runtime: &Runtime, entries: I) -> RuntimeResult<Handle>
where
    T: Wrap + ?Sized,
    I: ExactSizeIterator,
    I::Item: Entry<Value = T>,
{
    let size = entries.len();
    let x = runtime.protect(runtime.allocate(NativeTag::List, size)?);
    let names = runtime.protect(runtime.allocate(NativeTag::Text, size)?);

    let mut buffer = String::new();
    for (index, entry) in entries.take(size).enumerate() {
        let label = intern(runtime, &mut buffer, entry.key());
        runtime.set_string_elt(names.handle(), index, label)?;
        let element = entry.value().wrap_into(runtime)?;
        runtime.set_vector_elt(x.handle(), index, element)?;
    }

    trace!(length = size, "wrap named list");
    bind_names(runtime, x, names)
}

/// Attach `names` to `x` and release both, inner guard first.
fn bind_names(
    runtime: &Runtime,
    x: Protected<'_>,
    names: Protected<'_>,
) -> RuntimeResult<Handle> {
    let bound = runtime.set_attribute(x.handle(), runtime.names_symbol(), names.handle());
    drop(names);
    bound?;
    Ok(x.into_inner())
}
