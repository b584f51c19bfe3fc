//! Index-based conversion for user containers.

use rwrap_runtime::{Handle, NoInit, Runtime, RuntimeResult};
use tracing::trace;

use crate::dispatch::Convert;
use crate::primitive::Primitive;
use crate::traits::ImporterTag;

/// A container that exposes its primitive elements by index.
///
/// Implementors opt into conversion with
/// `impl Classify for MyType { type Category = ImporterTag; }`.
pub trait Importer {
    type Element: Primitive;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Self::Element;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Importer + ?Sized> Importer for &T {
    type Element = T::Element;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> T::Element {
        (**self).get(index)
    }
}

/// Wrap an importer into a vector of its element's native tag.
pub(crate) fn importer_wrap<T: Importer + ?Sized>(
    runtime: &Runtime,
    object: &T,
) -> RuntimeResult<Handle> {
    let size = object.len();
    let tag = <T::Element as Primitive>::TAG;
    let x = runtime.protect(NoInit::new(size).allocate(runtime, tag)?);
    let values: Vec<_> = (0..size).map(|index| object.get(index).to_storage()).collect();
    runtime.with_slots_mut(
        x.handle(),
        |slots: &mut [<T::Element as Primitive>::Storage]| slots.copy_from_slice(&values),
    )?;
    trace!(%tag, length = size, "wrap importer");
    Ok(x.into_inner())
}

impl<T: Importer + ?Sized> Convert<ImporterTag> for T {
    fn convert(&self, runtime: &Runtime) -> RuntimeResult<Handle> {
        importer_wrap(runtime, self)
    }
}
