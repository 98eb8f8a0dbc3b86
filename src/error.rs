//! Error types surfaced by construction and bulk operations.

use thiserror::Error;

/// Errors returned by [`Config`](crate::Config) and [`Compound`](crate::Compound) construction.
///
/// Every variant is an argument-error in spec terms: validated eagerly at
/// the call site, never surfaced mid-operation. "Null element" and "null
/// supplier" from the source design have no Rust equivalent — ownership
/// (`T`, not `Option<T>`) and the `FnMut` bound make them unrepresentable
/// rather than runtime-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// `round_up_pow2(capacity)` came out smaller than `2 * lanes` — each
    /// lane needs at least 2 slots, so anything less can't be split `lanes`
    /// ways without producing a one-slot (or zero-slot) lane.
    #[error("capacity {requested} (rounds up to a power of two smaller than {lanes} lanes of at least 2 slots each)")]
    InvalidCapacity {
        /// The capacity requested by the caller, before rounding.
        requested: usize,
        /// The lane count the capacity was measured against.
        lanes: usize,
    },
    /// `parallelism == 0`.
    #[error("parallelism must be at least 1, got {parallelism}")]
    InvalidParallelism {
        /// The rejected parallelism hint.
        parallelism: usize,
    },
}
