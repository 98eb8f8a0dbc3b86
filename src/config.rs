//! Construction-time configuration for a [`Compound`](crate::Compound) queue.
//!
//! A `Config` is the validated, fully-resolved result of sizing a queue: it
//! pins down the lane count `K` and the per-lane capacity before a single
//! lane is allocated, so `Compound::new` either builds a queue whose shape
//! matches the documented sizing rule exactly or fails fast.

use crate::error::QueueError;

/// Resolved construction parameters for a compound queue.
///
/// Mirrors the shape of a config struct you'd find bolted onto any bounded
/// channel: pick a total capacity, pick a parallelism hint, validate both up
/// front, and record the decisions so the caller can inspect what they
/// actually got (`lanes()`, `lane_capacity()`) rather than recompute it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    total_capacity: usize,
    lanes: usize,
    lane_capacity: usize,
    pub(crate) enable_metrics: bool,
}

impl Config {
    /// Resolves `(capacity, parallelism)` into a validated `Config`.
    ///
    /// `parallelism` is rounded down to the nearest power of two (per the
    /// sizing rule: if it's already a power of two, use it as-is; otherwise
    /// use `next_pow2(parallelism) / 2`). `capacity` is rounded up to a
    /// power of two and must be at least `2 * lanes`, since each lane's own
    /// capacity (`total_capacity / lanes`) must itself be at least `2` —
    /// `Lane::new` asserts this, so construction must reject anything that
    /// would resolve to a one-slot (or zero-slot) lane rather than panic.
    pub fn new(capacity: usize, parallelism: usize) -> Result<Self, QueueError> {
        if parallelism == 0 {
            return Err(QueueError::InvalidParallelism { parallelism });
        }

        let lanes = choose_lane_count(parallelism);
        let total_capacity = round_up_pow2(capacity.max(1));

        if total_capacity < lanes * 2 {
            return Err(QueueError::InvalidCapacity {
                requested: capacity,
                lanes,
            });
        }

        Ok(Self {
            total_capacity,
            lanes,
            lane_capacity: total_capacity / lanes,
            enable_metrics: false,
        })
    }

    /// Resolves `capacity` against the platform CPU count as the
    /// parallelism hint (the default `Compound::new` path).
    pub fn with_default_parallelism(capacity: usize) -> Result<Self, QueueError> {
        Self::new(capacity, num_cpus::get())
    }

    /// Single-lane configuration: no cross-lane fallback, predictable
    /// per-producer latency, at the cost of all producers contending on
    /// one CAS. Use when per-producer FIFO ordering matters (see
    /// `Compound`'s docs on ordering guarantees).
    pub fn low_latency(capacity: usize) -> Result<Self, QueueError> {
        Self::new(capacity, 1)
    }

    /// Wide fan-out configuration: twice the platform CPU count as the
    /// lane-count hint, favoring producer-side throughput under heavy
    /// concurrent offer pressure over single-producer latency.
    pub fn high_throughput(capacity: usize) -> Result<Self, QueueError> {
        Self::new(capacity, num_cpus::get() * 2)
    }

    /// Enables lightweight atomic counters (see [`Metrics`](crate::Metrics)).
    #[must_use]
    pub fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Total capacity exposed to callers: `lanes() * lane_capacity()`.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.total_capacity
    }

    /// Number of lanes `K`, always a power of two.
    #[inline]
    pub const fn lanes(&self) -> usize {
        self.lanes
    }

    /// Per-lane capacity, always a power of two.
    #[inline]
    pub const fn lane_capacity(&self) -> usize {
        self.lane_capacity
    }
}

/// Rounds `parallelism` down to the nearest power of two, per the
/// construction sizing rule: already-power-of-two hints pass through
/// unchanged, everything else rounds up then halves.
fn choose_lane_count(parallelism: usize) -> usize {
    if parallelism.is_power_of_two() {
        parallelism
    } else {
        round_up_pow2(parallelism) / 2
    }
}

/// Smallest power of two `>= n` (treats `0` as `1`).
pub(crate) fn round_up_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}
