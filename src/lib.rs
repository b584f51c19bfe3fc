//! Compile-time dispatched conversion of Rust values into runtime handles.
//!
//! [`wrap`] turns a statically typed value into a handle to a tagged,
//! garbage-collected object owned by a [`Runtime`]. The conversion is chosen
//! from the value's type alone:
//! - scalars become length-1 vectors of their native tag, cast when their
//!   storage representation differs;
//! - string-like values become text vectors;
//! - sequences become vectors of their element's tag, or lists when the
//!   elements are themselves composite;
//! - string-keyed maps and `(key, value)` sequences become named vectors;
//! - [`Importer`] types are read by index;
//! - existing handles pass through unchanged.
//!
//! Types with no conversion are rejected at compile time.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use rwrap::{Runtime, wrap, wrap_range};
//!
//! let rt = Runtime::new();
//!
//! let scores = BTreeMap::from([("a", 1.5), ("b", 2.5)]);
//! let handle = wrap(&rt, &scores)?;
//! assert_eq!(rt.deparse(handle)?, "c(a = 1.5, b = 2.5)");
//!
//! let handle = wrap_range(&rt, [1u8, 2, 3])?;
//! assert_eq!(rt.deparse(handle)?, "c(1L, 2L, 3L)");
//! # Ok::<(), rwrap::RuntimeError>(())
//! ```

mod dispatch;
mod importer;
mod named;
mod primitive;
mod range;
mod traits;

pub use dispatch::{Convert, Wrap, wrap, wrap_cstr, wrap_range};
pub use importer::Importer;
pub use named::{Entry, NamedWrap};
pub use primitive::{Cast, Caster, NoCast, Primitive, Store};
pub use range::{RangeElement, RangeWrap};
pub use traits::{
    Category, Classify, GenericTag, HandleTag, ImporterTag, IntoHandle, Iterable, NestedShape,
    PairShape, PairTag, PrimitiveShape, PrimitiveTag, ShapeOf, StringShape, StringTag, TextLike,
};

pub use rwrap_runtime::{
    Byte, Complex, Handle, NativeTag, Protected, Runtime, RuntimeConfig, RuntimeError,
    RuntimeErrorKind, RuntimeResult,
};
