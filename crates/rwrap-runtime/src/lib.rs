//! Host runtime for rwrap conversions.
//!
//! Models the dynamic-object side that wrapped values land in:
//! - A handle table of tagged vectors with attributes (`Runtime::allocate`)
//! - Element access by storage slice, text element and list element
//! - A protect stack with scoped guards (`Runtime::protect`)
//! - Mark-and-sweep collection rooted in the protect stack and preserved set
//! - Source-like rendering for inspection (`Runtime::deparse`)

mod config;
mod deparse;
mod error;
mod gc;
mod handle;
mod interned_string;
mod memory;
mod protect;
mod runtime;
mod value;


pub use config::{DEFAULT_GC_THRESHOLD, RuntimeConfig};
pub use error::{RuntimeError, RuntimeErrorKind, RuntimeResult};
pub use gc::CollectSummary;
pub use handle::{Handle, HandleStats, HandleTable};
pub use interned_string::{CharHandle, InternedStringTable, Symbol};
pub use memory::NoInit;
pub use protect::Protected;
pub use runtime::Runtime;
pub use value::{Boxed, Byte, Complex, NA_INTEGER, NativeTag, Storage, Value};
