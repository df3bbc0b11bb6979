//! Process runtime introspection.
//!
//! The status handler reads counters through [`RuntimeStats`] so tests can
//! substitute fixed values for the live runtime.

use std::num::NonZeroUsize;

use tokio::runtime::Handle;

/// Environment variable controlling garbage-collector pacing.
pub const KNOB_GC: &str = "GOGC";
/// Environment variable carrying runtime debug settings.
pub const KNOB_DEBUG: &str = "GODEBUG";

/// Read-only view of runtime counters.
pub trait RuntimeStats: Send + Sync {
    /// Live concurrency units, including the caller.
    fn concurrency_unit_count(&self) -> usize;

    /// Configured parallelism level, at least 1.
    fn parallelism(&self) -> usize;

    /// Value of the named tuning knob, empty if unset.
    fn tuning_knob(&self, name: &str) -> String;
}

/// [`RuntimeStats`] backed by the current tokio runtime and process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRuntimeStats;

impl RuntimeStats for TokioRuntimeStats {
    fn concurrency_unit_count(&self) -> usize {
        let alive = Handle::try_current()
            .map(|handle| handle.metrics().num_alive_tasks())
            .unwrap_or(0);
        // The caller may be driven by `block_on` rather than a spawned task.
        alive.max(1)
    }

    fn parallelism(&self) -> usize {
        match Handle::try_current() {
            Ok(handle) => handle.metrics().num_workers().max(1),
            Err(_) => available_parallelism(),
        }
    }

    fn tuning_knob(&self, name: &str) -> String {
        std::env::var(name).unwrap_or_default()
    }
}

/// Number of CPUs available to the process, at least 1.
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
