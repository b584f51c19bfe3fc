//! Scalar conversion and the cast machinery shared by every numeric path.
//!
//! A primitive's storage representation is fixed by its native tag. Whether
//! a value is written as-is or passed through [`Caster`] is decided by the
//! [`Primitive::NeedsCast`] marker, which selects one of the two [`Store`]
//! impls at compile time.

use rwrap_runtime::{
    Byte, CharHandle, Complex, Handle, NativeTag, NoInit, Runtime, RuntimeResult, Storage,
};
use tracing::trace;

use crate::dispatch::Convert;
use crate::traits::{Classify, PrimitiveTag, StringTag, TextLike};

/// Marker: the value is stored through [`Caster`].
pub struct Cast;

/// Marker: the value already is its storage representation.
pub struct NoCast;

/// Explicit value conversion into a storage representation.
///
/// Integers narrower than 32 bits widen exactly. 64-bit integers narrow the
/// way `as` does, wrapping modulo 2^32. Conversions to `f64` round to the
/// nearest representable value.
pub trait Caster<To> {
    fn cast(self) -> To;
}

macro_rules! caster {
    ($to:ty => $($from:ty),* $(,)?) => {$(
        impl Caster<$to> for $from {
            fn cast(self) -> $to {
                self as $to
            }
        }
    )*};
}

caster!(i32 => i8, i16, u8, u16, i64, isize);
caster!(f64 => f32, u32, u64, usize);

impl Caster<i32> for bool {
    fn cast(self) -> i32 {
        i32::from(self)
    }
}

/// Writes a value as storage `S`, directly or through a cast depending on `Flag`.
pub trait Store<Flag, S> {
    fn store(self) -> S;
}

impl<T> Store<NoCast, T> for T {
    fn store(self) -> T {
        self
    }
}

impl<T: Caster<S>, S> Store<Cast, S> for T {
    fn store(self) -> S {
        self.cast()
    }
}

/// A scalar with a native tag.
pub trait Primitive: Copy {
    type Value: Copy + Store<Self::NeedsCast, Self::Storage>;
    type Storage: Storage;
    type NeedsCast;

    const TAG: NativeTag;

    fn value(self) -> Self::Value;

    fn to_storage(self) -> Self::Storage {
        <Self::Value as Store<Self::NeedsCast, Self::Storage>>::store(self.value())
    }
}

macro_rules! primitive {
    ($($ty:ty => $tag:ident, $storage:ty, $flag:ty;)*) => {$(
        impl Classify for $ty {
            type Category = PrimitiveTag;
        }

        impl Primitive for $ty {
            type Value = $ty;
            type Storage = $storage;
            type NeedsCast = $flag;

            const TAG: NativeTag = NativeTag::$tag;

            fn value(self) -> $ty {
                self
            }
        }
    )*};
}

primitive! {
    i32 => Integer, i32, NoCast;
    i8 => Integer, i32, Cast;
    i16 => Integer, i32, Cast;
    u8 => Integer, i32, Cast;
    u16 => Integer, i32, Cast;
    i64 => Integer, i32, Cast;
    isize => Integer, i32, Cast;
    f64 => Real, f64, NoCast;
    f32 => Real, f64, Cast;
    u32 => Real, f64, Cast;
    u64 => Real, f64, Cast;
    usize => Real, f64, Cast;
    bool => Logical, i32, Cast;
    Byte => Byte, Byte, NoCast;
    Complex => Complex, Complex, NoCast;
}

impl<T: Primitive> Primitive for &T {
    type Value = T::Value;
    type Storage = T::Storage;
    type NeedsCast = T::NeedsCast;

    const TAG: NativeTag = T::TAG;

    fn value(self) -> T::Value {
        (*self).value()
    }
}

/// Wrap a scalar into a length-1 vector of its native tag.
pub(crate) fn primitive_wrap<T: Primitive>(runtime: &Runtime, value: T) -> RuntimeResult<Handle> {
    let x = runtime.protect(NoInit::new(1).allocate(runtime, T::TAG)?);
    let stored = value.to_storage();
    runtime.with_slots_mut(x.handle(), |slots: &mut [T::Storage]| slots.fill(stored))?;
    trace!(tag = %T::TAG, "wrap primitive");
    Ok(x.into_inner())
}

/// Copy `text` into `buffer` and intern it.
pub(crate) fn intern<T: TextLike + ?Sized>(
    runtime: &Runtime,
    buffer: &mut String,
    text: &T,
) -> CharHandle {
    buffer.clear();
    text.write_text(buffer);
    runtime.intern_text(buffer)
}

/// Wrap a string-like value into a length-1 text vector.
pub(crate) fn text_wrap<T: TextLike + ?Sized>(
    runtime: &Runtime,
    value: &T,
) -> RuntimeResult<Handle> {
    let x = runtime.protect(runtime.allocate(NativeTag::Text, 1)?);
    let mut buffer = String::new();
    runtime.set_string_elt(x.handle(), 0, intern(runtime, &mut buffer, value))?;
    trace!("wrap text");
    Ok(x.into_inner())
}

impl<T: Primitive> Convert<PrimitiveTag> for T {
    fn convert(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
        primitive_wrap(runtime, *self)
    }
}

impl<T: TextLike + ?Sized> Convert<StringTag> for T {
    fn convert(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
        text_wrap(runtime, self)
    }
}
