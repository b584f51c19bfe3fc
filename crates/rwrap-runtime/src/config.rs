//! Runtime configuration

use serde::{Deserialize, Serialize};

/// Default number of allocations between automatic collections
pub const DEFAULT_GC_THRESHOLD: usize = 1024;

/// Tunables for a [`Runtime`](crate::Runtime) instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Allocations between automatic collections; `0` disables them
    pub gc_threshold: usize,
    /// Collect before every allocation
    pub gc_torture: bool,
    /// Largest vector length `allocate` accepts
    pub max_vector_length: Option<usize>,
}

impl RuntimeConfig {
    pub fn with_gc_threshold(mut self, gc_threshold: usize) -> Self {
        self.gc_threshold = gc_threshold;
        self
    }

    pub fn with_gc_torture(mut self, gc_torture: bool) -> Self {
        self.gc_torture = gc_torture;
        self
    }

    pub fn with_max_vector_length(mut self, max_vector_length: usize) -> Self {
        self.max_vector_length = Some(max_vector_length);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gc_threshold: DEFAULT_GC_THRESHOLD,
            gc_torture: false,
            max_vector_length: None,
        }
    }
}
