//! Scoped protection of freshly allocated handles
//!
//! A newly allocated handle is reachable from no root, so any collection
//! before it is stored somewhere permanent would reclaim it. [`Protected`]
//! pushes the handle onto the protect stack and pops it on drop. Guards are
//! strictly nested: the one created last must be released first.

use std::mem;
use std::sync::{MutexGuard, PoisonError};

use crate::error::{RuntimeError, RuntimeResult};
use crate::handle::Handle;
use crate::runtime::Runtime;

/// A handle held on the protect stack for the lifetime of the guard
#[must_use = "dropping the guard unprotects the handle immediately"]
pub struct Protected<'rt> {
    runtime: &'rt Runtime,
    handle: Handle,
    depth: usize,
}

impl<'rt> Protected<'rt> {
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Unprotect and hand the handle to the caller
    pub fn into_inner(self) -> Handle {
        let handle = self.handle;
        drop(self);
        handle
    }

    /// Leave the handle on the protect stack; pair with [`Runtime::unprotect`]
    pub fn leak(self) -> Handle {
        let handle = self.handle;
        mem::forget(self);
        handle
    }
}

impl Drop for Protected<'_> {
    fn drop(&mut self) {
        let mut stack = self.runtime.protect_stack();
        debug_assert_eq!(
            stack.len(),
            self.depth + 1,
            "protection of {} released out of order",
            self.handle
        );
        stack.truncate(self.depth);
    }
}

impl Runtime {
    /// Protect `handle` until the returned guard is dropped
    pub fn protect(&self, handle: Handle) -> Protected<'_> {
        let mut stack = self.protect_stack();
        let depth = stack.len();
        stack.push(handle);
        Protected {
            runtime: self,
            handle,
            depth,
        }
    }

    /// Pop the `count` most recently protected handles
    pub fn unprotect(&self, count: usize) -> RuntimeResult<()> {
        let mut stack = self.protect_stack();
        let depth = stack.len();
        if count > depth {
            return Err(RuntimeError::protect_underflow(count, depth));
        }
        stack.truncate(depth - count);
        Ok(())
    }

    pub fn protect_depth(&self) -> usize {
        self.protect_stack().len()
    }

    pub(crate) fn protected_roots(&self) -> Vec<Handle> {
        self.protect_stack().to_vec()
    }

    fn protect_stack(&self) -> MutexGuard<'_, Vec<Handle>> {
        self.protected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
