//! Metrics emitted by the Store runtime.
//!
//! The runtime records through the [`metrics`] facade only. Without an
//! installed recorder every call is a no-op, so binaries opt in by installing
//! one and calling [`register_metrics`] once at startup.
//!
//! # Example
//!
//! ```
//! use tasklist_runtime::metrics::{names, register_metrics};
//!
//! register_metrics();
//! assert_eq!(names::ACTIONS_TOTAL, "store.actions.total");
//! ```

use metrics::{describe_counter, describe_histogram, Unit};

/// Metric names used by the runtime
pub mod names {
    /// Actions reduced, feedback actions included
    pub const ACTIONS_TOTAL: &str = "store.actions.total";
    /// Effects executed, labelled by `type`
    pub const EFFECTS_EXECUTED: &str = "store.effects.executed";
    /// Storage operations that failed, labelled by `type`
    pub const STORAGE_FAILURES: &str = "store.storage.failures";
    /// Time spent inside `Reducer::reduce`
    pub const REDUCER_DURATION: &str = "store.reducer.duration_seconds";
}

/// Register descriptions for every runtime metric.
///
/// Safe to call more than once; later descriptions replace earlier ones.
pub fn register_metrics() {
    describe_counter!(
        names::ACTIONS_TOTAL,
        Unit::Count,
        "Total number of actions processed by the store"
    );
    describe_counter!(
        names::EFFECTS_EXECUTED,
        Unit::Count,
        "Total number of effects executed, by effect type"
    );
    describe_counter!(
        names::STORAGE_FAILURES,
        Unit::Count,
        "Total number of failed storage reads and writes"
    );
    describe_histogram!(
        names::REDUCER_DURATION,
        Unit::Seconds,
        "Time taken to reduce a single action"
    );
}
