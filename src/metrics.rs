//! Optional low-overhead counters for monitoring queue activity.
//!
//! Enabled via [`Config::with_metrics`](crate::Config::with_metrics); when
//! disabled, the counters are never touched and reads return zero, so a
//! caller who doesn't ask for metrics pays nothing beyond the enabled-check.

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-lane atomic counters.
#[derive(Debug, Default)]
pub(crate) struct LaneMetrics {
    enqueued: AtomicU64,
    polled: AtomicU64,
    full_rejections: AtomicU64,
    cas_losses: AtomicU64,
}

impl LaneMetrics {
    #[inline]
    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_polled(&self) {
        self.polled.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_full(&self) {
        self.full_rejections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_cas_loss(&self) {
        self.cas_losses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> Metrics {
        Metrics {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            polled: self.polled.load(Ordering::Relaxed),
            full_rejections: self.full_rejections.load(Ordering::Relaxed),
            cas_losses: self.cas_losses.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of queue activity counters, aggregated across
/// all lanes by [`Compound::metrics`](crate::Compound::metrics).
///
/// Best-effort, like [`Compound::len`](crate::Compound::len): counters from
/// different lanes are not sampled atomically relative to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Total successful enqueues.
    pub enqueued: u64,
    /// Total successful dequeues.
    pub polled: u64,
    /// Total `try_offer`/`offer` attempts that found every reachable lane
    /// capacity-full.
    pub full_rejections: u64,
    /// Total CAS-lost producer retries across all lanes.
    pub cas_losses: u64,
}

impl Metrics {
    pub(crate) fn add(&mut self, other: Self) {
        self.enqueued += other.enqueued;
        self.polled += other.polled;
        self.full_rejections += other.full_rejections;
        self.cas_losses += other.cas_losses;
    }
}
