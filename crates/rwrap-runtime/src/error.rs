//! Error types for the host runtime

use derive_more::{Display, From};

use crate::handle::Handle;
use crate::value::NativeTag;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Clone, Display, Debug, From, PartialEq)]
#[display("{kind}")]
pub struct RuntimeError {
    #[from]
    kind: Box<RuntimeErrorKind>,
}

impl<E> From<E> for RuntimeError
where
    RuntimeErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        RuntimeError {
            kind: Box::new(RuntimeErrorKind::from(error)),
        }
    }
}

impl RuntimeError {
    pub fn kind(&self) -> &RuntimeErrorKind {
        &self.kind
    }

    pub(crate) fn invalid_handle(handle: Handle) -> Self {
        RuntimeErrorKind::InvalidHandle(handle).into()
    }

    pub(crate) fn tag_mismatch(expected: NativeTag, found: NativeTag) -> Self {
        RuntimeErrorKind::TagMismatch { expected, found }.into()
    }

    pub(crate) fn index_out_of_bounds(index: usize, length: usize) -> Self {
        RuntimeErrorKind::IndexOutOfBounds { index, length }.into()
    }

    pub(crate) fn allocation_limit(requested: usize, limit: usize) -> Self {
        RuntimeErrorKind::AllocationLimit { requested, limit }.into()
    }

    pub(crate) fn protect_underflow(requested: usize, depth: usize) -> Self {
        RuntimeErrorKind::ProtectUnderflow { requested, depth }.into()
    }

    pub(crate) fn nil_attribute() -> Self {
        RuntimeErrorKind::NilAttribute.into()
    }
}

#[derive(Clone, Display, Debug, PartialEq)]
pub enum RuntimeErrorKind {
    #[display("Invalid handle: {_0}")]
    InvalidHandle(Handle),

    #[display("Type mismatch: expected {expected}, found {found}")]
    TagMismatch { expected: NativeTag, found: NativeTag },

    #[display("Index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: usize, length: usize },

    #[display("Cannot allocate vector of length {requested}: limit is {limit}")]
    AllocationLimit { requested: usize, limit: usize },

    #[display("Cannot unprotect {requested} handles: only {depth} protected")]
    ProtectUnderflow { requested: usize, depth: usize },

    #[display("Cannot set an attribute on NULL")]
    NilAttribute,
}

impl std::error::Error for RuntimeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::tag_mismatch(NativeTag::Integer, NativeTag::Text);
        assert_eq!(err.to_string(), "Type mismatch: expected integer, found character");

        let err = RuntimeError::index_out_of_bounds(3, 2);
        assert_eq!(err.to_string(), "Index 3 out of bounds for length 2");
        assert!(matches!(
            err.kind(),
            RuntimeErrorKind::IndexOutOfBounds { index: 3, length: 2 }
        ));
    }
}
