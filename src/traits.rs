//! Compile-time classification of convertible types.
//!
//! Every convertible type has exactly one [`Classify`] impl naming its
//! category. The category picks the converter through the
//! [`Convert`](crate::Convert) impl for that marker, so dispatch is settled
//! by the trait solver and a type without a `Classify` impl fails to compile.
//!
//! | Category | Members |
//! |----------|---------|
//! | [`PrimitiveTag`] | integers, floats, `bool`, `Byte`, `Complex` |
//! | [`StringTag`] | `str`, `String`, `char`, `Cow<str>`, `Box<str>`, `Rc<str>`, `Arc<str>` |
//! | [`ImporterTag`] | user types implementing [`Importer`](crate::Importer) that opt in |
//! | [`HandleTag`] | [`Handle`], [`Protected`] and other [`IntoHandle`] types |
//! | [`GenericTag`] | std sequences, sets and string-keyed maps |
//! | [`PairTag`] | `(key, value)` entries with a string-like key |
//!
//! References classify like the value they point to.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

use rwrap_runtime::{Handle, Protected, Runtime, RuntimeResult};

use crate::named::{MapEntry, NamedWrap};
use crate::range::RangeWrap;

/// Maps a static type to its conversion category.
#[diagnostic::on_unimplemented(
    message = "cannot convert `{Self}` to a dynamic handle",
    label = "no conversion category for this type",
    note = "implement `Classify` (and the capability trait its category requires) to make `{Self}` convertible"
)]
pub trait Classify {
    type Category: Category;
}

/// A conversion category, projected to the element shape used inside
/// sequences and maps.
pub trait Category {
    type Shape;
}

pub struct PrimitiveTag;
pub struct StringTag;
pub struct ImporterTag;
pub struct HandleTag;
pub struct GenericTag;
pub struct PairTag<S>(PhantomData<S>);

/// Elements stored directly in numeric storage.
pub struct PrimitiveShape;
/// Elements stored as interned text.
pub struct StringShape;
/// Elements converted on their own and stored in a list.
pub struct NestedShape;
/// `(key, value)` entries whose values have shape `S`.
pub struct PairShape<S>(PhantomData<S>);

impl Category for PrimitiveTag {
    type Shape = PrimitiveShape;
}

impl Category for StringTag {
    type Shape = StringShape;
}

impl Category for ImporterTag {
    type Shape = NestedShape;
}

impl Category for HandleTag {
    type Shape = NestedShape;
}

impl Category for GenericTag {
    type Shape = NestedShape;
}

impl<S> Category for PairTag<S> {
    type Shape = PairShape<S>;
}

/// Element shape of a classified type.
pub type ShapeOf<T> = <<T as Classify>::Category as Category>::Shape;

impl<T: Classify + ?Sized> Classify for &T {
    type Category = T::Category;
}

// ============================================================================
// Text
// ============================================================================

/// Values that can be copied into a text buffer.
pub trait TextLike {
    fn write_text(&self, buffer: &mut String);
}

impl TextLike for str {
    fn write_text(&self, buffer: &mut String) {
        buffer.push_str(self);
    }
}

impl TextLike for char {
    fn write_text(&self, buffer: &mut String) {
        buffer.push(*self);
    }
}

macro_rules! text_like {
    ($($ty:ty),* $(,)?) => {$(
        impl TextLike for $ty {
            fn write_text(&self, buffer: &mut String) {
                buffer.push_str(self);
            }
        }
    )*};
}

text_like!(String, Cow<'_, str>, Box<str>, Rc<str>, Arc<str>);

impl<T: TextLike + ?Sized> TextLike for &T {
    fn write_text(&self, buffer: &mut String) {
        (**self).write_text(buffer);
    }
}

macro_rules! classify {
    ($category:ident => $($ty:ty),* $(,)?) => {$(
        impl Classify for $ty {
            type Category = $category;
        }
    )*};
}

classify!(StringTag => str, String, char, Cow<'_, str>, Box<str>, Rc<str>, Arc<str>);

// ============================================================================
// Handles
// ============================================================================

/// Values that already are runtime objects.
pub trait IntoHandle {
    fn as_handle(&self) -> Handle;
}

impl IntoHandle for Handle {
    fn as_handle(&self) -> Handle {
        *self
    }
}

impl IntoHandle for Protected<'_> {
    fn as_handle(&self) -> Handle {
        self.handle()
    }
}

impl<T: IntoHandle + ?Sized> IntoHandle for &T {
    fn as_handle(&self) -> Handle {
        (**self).as_handle()
    }
}

classify!(HandleTag => Handle, Protected<'_>);

// ============================================================================
// Containers
// ============================================================================

/// Containers converted element by element.
pub trait Iterable {
    fn wrap_elements(&self, runtime: &Runtime) -> RuntimeResult<Handle>;
}

impl<T: Iterable + ?Sized> Iterable for &T {
    fn wrap_elements(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
        (**self).wrap_elements(runtime)
    }
}

macro_rules! sequence {
    ($([$($params:tt)*] $ty:ty;)*) => {$(
        impl<T: Classify, $($params)*> Classify for $ty {
            type Category = GenericTag;
        }

        impl<T: Classify + RangeWrap<ShapeOf<T>>, $($params)*> Iterable for $ty {
            fn wrap_elements(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
                <T as RangeWrap<ShapeOf<T>>>::wrap_range(runtime, self.iter())
            }
        }
    )*};
}

sequence! {
    [] [T];
    [] Vec<T>;
    [] Box<[T]>;
    [const N: usize] [T; N];
    [] VecDeque<T>;
    [] LinkedList<T>;
    [] BTreeSet<T>;
    [H] HashSet<T, H>;
}

macro_rules! mapping {
    ($([$($params:tt)*] $ty:ty;)*) => {$(
        impl<K: TextLike, V: Classify, $($params)*> Classify for $ty {
            type Category = GenericTag;
        }

        impl<K: TextLike, V: Classify + NamedWrap<ShapeOf<V>>, $($params)*> Iterable for $ty {
            fn wrap_elements(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
                <V as NamedWrap<ShapeOf<V>>>::wrap_named(
                    runtime,
                    self.iter().map(|(key, value)| MapEntry::new(key, value)),
                )
            }
        }
    )*};
}

mapping! {
    [] BTreeMap<K, V>;
    [H] HashMap<K, V, H>;
}

// ============================================================================
// Entries
// ============================================================================

impl<K: TextLike, V: Classify> Classify for (K, V) {
    type Category = PairTag<ShapeOf<V>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    fn category<T: Classify + ?Sized>() -> TypeId
    where
        T::Category: 'static,
    {
        TypeId::of::<T::Category>()
    }

    fn shape<T: Classify + ?Sized>() -> TypeId
    where
        ShapeOf<T>: 'static,
    {
        TypeId::of::<ShapeOf<T>>()
    }

    #[test]
    fn test_classification() {
        assert_eq!(category::<i32>(), TypeId::of::<PrimitiveTag>());
        assert_eq!(category::<&&u64>(), TypeId::of::<PrimitiveTag>());
        assert_eq!(category::<str>(), TypeId::of::<StringTag>());
        assert_eq!(category::<Arc<str>>(), TypeId::of::<StringTag>());
        assert_eq!(category::<Handle>(), TypeId::of::<HandleTag>());
        assert_eq!(category::<Vec<String>>(), TypeId::of::<GenericTag>());
        assert_eq!(category::<BTreeMap<String, f64>>(), TypeId::of::<GenericTag>());
        assert_eq!(
            category::<(&str, bool)>(),
            TypeId::of::<PairTag<PrimitiveShape>>()
        );
    }

    #[test]
    fn test_shapes() {
        assert_eq!(shape::<f32>(), TypeId::of::<PrimitiveShape>());
        assert_eq!(shape::<char>(), TypeId::of::<StringShape>());
        assert_eq!(shape::<Vec<i32>>(), TypeId::of::<NestedShape>());
        assert_eq!(
            shape::<(String, Vec<i32>)>(),
            TypeId::of::<PairShape<NestedShape>>()
        );
    }

    #[test]
    fn test_write_text() {
        let mut buffer = String::new();
        "ab".write_text(&mut buffer);
        'c'.write_text(&mut buffer);
        Cow::Borrowed("d").write_text(&mut buffer);
        (&Rc::<str>::from("e")).write_text(&mut buffer);
        assert_eq!(buffer, "abcde");
    }
}
