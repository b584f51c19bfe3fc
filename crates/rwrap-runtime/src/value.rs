//! Runtime value representation
//!
//! Every object referenced by a [`Handle`] is a [`Boxed`] value: a [`Value`]
//! payload (a typed vector, or `NULL`) plus its attribute list. Vectors carry
//! one of the native element tags and store their elements in the matching
//! storage representation.

use std::fmt;

use crate::handle::Handle;
use crate::interned_string::{CharHandle, Symbol};

/// Integer `NA`, as stored in integer and logical vectors
pub const NA_INTEGER: i32 = i32::MIN;

/// Native element tags understood by the runtime
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeTag {
    Nil = 0,
    Logical = 1,
    Integer = 2,
    Real = 3,
    Complex = 4,
    Text = 5,
    List = 6,
    Byte = 7,
}

impl NativeTag {
    /// Name used by the host language for vectors of this tag
    pub fn type_name(self) -> &'static str {
        match self {
            NativeTag::Nil => "NULL",
            NativeTag::Logical => "logical",
            NativeTag::Integer => "integer",
            NativeTag::Real => "double",
            NativeTag::Complex => "complex",
            NativeTag::Text => "character",
            NativeTag::List => "list",
            NativeTag::Byte => "raw",
        }
    }
}

impl fmt::Display for NativeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A single byte, stored in `raw` vectors
#[repr(transparent)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Byte(pub u8);

/// Complex number, stored in `complex` vectors
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Complex { re, im }
    }
}

/// Vector payload of a runtime object
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Logical(Vec<i32>),
    Integer(Vec<i32>),
    Real(Vec<f64>),
    Complex(Vec<Complex>),
    Text(Vec<CharHandle>),
    List(Vec<Handle>),
    Byte(Vec<Byte>),
}

impl Value {
    /// Create a vector of `length` default-initialised elements
    ///
    /// Text vectors are filled with the blank string, lists with `NULL`.
    pub fn zeroed(tag: NativeTag, length: usize) -> Self {
        match tag {
            NativeTag::Nil => Value::Nil,
            NativeTag::Logical => Value::Logical(vec![0; length]),
            NativeTag::Integer => Value::Integer(vec![0; length]),
            NativeTag::Real => Value::Real(vec![0.0; length]),
            NativeTag::Complex => Value::Complex(vec![Complex::default(); length]),
            NativeTag::Text => Value::Text(vec![CharHandle::BLANK; length]),
            NativeTag::List => Value::List(vec![Handle::NIL; length]),
            NativeTag::Byte => Value::Byte(vec![Byte::default(); length]),
        }
    }

    pub fn tag(&self) -> NativeTag {
        match self {
            Value::Nil => NativeTag::Nil,
            Value::Logical(_) => NativeTag::Logical,
            Value::Integer(_) => NativeTag::Integer,
            Value::Real(_) => NativeTag::Real,
            Value::Complex(_) => NativeTag::Complex,
            Value::Text(_) => NativeTag::Text,
            Value::List(_) => NativeTag::List,
            Value::Byte(_) => NativeTag::Byte,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Value::Nil => 0,
            Value::Logical(v) | Value::Integer(v) => v.len(),
            Value::Real(v) => v.len(),
            Value::Complex(v) => v.len(),
            Value::Text(v) => v.len(),
            Value::List(v) => v.len(),
            Value::Byte(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A runtime object: payload plus attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Boxed {
    pub value: Value,
    pub attributes: Vec<(Symbol, Handle)>,
}

impl Boxed {
    pub fn new(value: Value) -> Self {
        Boxed {
            value,
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, symbol: Symbol) -> Option<Handle> {
        self.attributes
            .iter()
            .find(|(key, _)| *key == symbol)
            .map(|(_, value)| *value)
    }

    /// Set an attribute, replacing any previous binding for the same symbol
    pub fn set_attribute(&mut self, symbol: Symbol, value: Handle) {
        match self.attributes.iter_mut().find(|(key, _)| *key == symbol) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((symbol, value)),
        }
    }

    /// Handles directly reachable from this object
    pub(crate) fn children(&self) -> impl Iterator<Item = Handle> + '_ {
        let elements = match &self.value {
            Value::List(items) => items.as_slice(),
            _ => &[],
        };
        elements
            .iter()
            .copied()
            .chain(self.attributes.iter().map(|(_, value)| *value))
    }
}

/// Element types that can be written in bulk through a vector's storage
///
/// This is the element-pointer access used for numeric, logical, raw and
/// complex vectors. Text and list vectors are only written element-wise.
pub trait Storage: Copy + Default + 'static {
    /// The tag reported in mismatch errors
    const TAG: NativeTag;

    fn slots(value: &Value) -> Option<&[Self]>;

    fn slots_mut(value: &mut Value) -> Option<&mut [Self]>;
}

impl Storage for i32 {
    const TAG: NativeTag = NativeTag::Integer;

    fn slots(value: &Value) -> Option<&[Self]> {
        match value {
            Value::Integer(v) | Value::Logical(v) => Some(v),
            _ => None,
        }
    }

    fn slots_mut(value: &mut Value) -> Option<&mut [Self]> {
        match value {
            Value::Integer(v) | Value::Logical(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! storage {
    ($($ty:ty => $variant:ident;)*) => {$(
        impl Storage for $ty {
            const TAG: NativeTag = NativeTag::$variant;

            fn slots(value: &Value) -> Option<&[Self]> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slots_mut(value: &mut Value) -> Option<&mut [Self]> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    )*};
}

storage! {
    f64 => Real;
    Complex => Complex;
    Byte => Byte;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_vectors() {
        let ints = Value::zeroed(NativeTag::Integer, 3);
        assert_eq!(ints, Value::Integer(vec![0, 0, 0]));
        assert_eq!(ints.tag(), NativeTag::Integer);

        let text = Value::zeroed(NativeTag::Text, 2);
        assert_eq!(text, Value::Text(vec![CharHandle::BLANK; 2]));

        let list = Value::zeroed(NativeTag::List, 1);
        assert_eq!(list, Value::List(vec![Handle::NIL]));

        assert_eq!(Value::zeroed(NativeTag::Nil, 5), Value::Nil);
        assert!(Value::zeroed(NativeTag::Real, 0).is_empty());
    }

    #[test]
    fn test_logical_shares_integer_storage() {
        let mut logical = Value::zeroed(NativeTag::Logical, 2);
        i32::slots_mut(&mut logical).unwrap()[1] = 1;
        assert_eq!(logical, Value::Logical(vec![0, 1]));
        assert!(f64::slots(&logical).is_none());
    }

    #[test]
    fn test_attribute_replacement() {
        let names = Symbol::from_raw(7);
        let mut boxed = Boxed::new(Value::Nil);
        boxed.set_attribute(names, Handle::from_raw(10));
        boxed.set_attribute(names, Handle::from_raw(11));
        assert_eq!(boxed.attributes.len(), 1);
        assert_eq!(boxed.attribute(names), Some(Handle::from_raw(11)));
    }
}
