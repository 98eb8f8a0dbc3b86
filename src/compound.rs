//! The compound dispatcher: K lanes striped by producer identity, scanned
//! linearly by the single consumer.

use crate::backoff::Backoff;
use crate::config::Config;
use crate::error::QueueError;
use crate::lane::{Lane, TryOfferResult};
use crate::metrics::Metrics;
use crate::producer_id;
use std::cell::UnsafeCell;

/// A bounded, lock-free MPSC queue built as a compound of `K` parallel
/// [`Lane`]s.
///
/// Producers are routed to a lane by a hash of their stable per-thread
/// identity; this is a *hint*, not an ownership assignment — any producer
/// may end up on any lane once the scanning fallback engages. The consumer
/// side resumes scanning from wherever the previous `poll` left off, giving
/// an approximate round-robin sweep across lanes rather than a strict FIFO
/// across producers.
///
/// At most one consumer thread may call the poll-family methods
/// concurrently; a second concurrent consumer is a contract violation with
/// undefined behavior (see the crate-level docs). Any number of producer
/// threads may call the offer-family methods concurrently.
pub struct Compound<T> {
    lanes: Box<[Lane<T>]>,
    mask: usize,
    config: Config,
    /// Non-atomic: mutated only by the single consumer thread. Mirrors the
    /// single-writer cached-cursor cells the lane's own producer/consumer
    /// paths use.
    consumer_cursor_hint: UnsafeCell<u64>,
}

// Safety: producers synchronize via each lane's CAS protocol; the consumer
// cursor hint is touched only by the single consumer thread, per contract.
unsafe impl<T: Send> Send for Compound<T> {}
unsafe impl<T: Send> Sync for Compound<T> {}

impl<T> Compound<T> {
    /// Builds a compound queue from an already-validated [`Config`].
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        let lanes = (0..config.lanes())
            .map(|_| Lane::new(config.lane_capacity(), config.enable_metrics))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            lanes,
            mask: config.lanes() - 1,
            config,
            consumer_cursor_hint: UnsafeCell::new(0),
        }
    }

    /// Constructs a queue of the given total capacity, with parallelism
    /// defaulting to the platform CPU count.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        Ok(Self::with_config(Config::with_default_parallelism(capacity)?))
    }

    /// Constructs a queue of the given total capacity and lane-count hint.
    pub fn with_parallelism(capacity: usize, parallelism: usize) -> Result<Self, QueueError> {
        Ok(Self::with_config(Config::new(capacity, parallelism)?))
    }

    /// Total capacity: `lanes() * lane_capacity()`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Number of lanes `K`, always a power of two.
    #[inline]
    pub fn lanes(&self) -> usize {
        self.config.lanes()
    }

    /// Best-effort sum of lane sizes. Not linearizable: under concurrent
    /// offers this may momentarily exceed [`Compound::capacity`].
    pub fn len(&self) -> usize {
        self.lanes.iter().map(Lane::len).sum()
    }

    /// `true` if every lane was observed empty at some instant during the call.
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Lane::is_empty)
    }

    /// Aggregated activity counters across all lanes (zeroed if metrics
    /// were not enabled via [`Config::with_metrics`]).
    pub fn metrics(&self) -> Metrics {
        let mut total = Metrics::default();
        for lane in self.lanes.iter() {
            total.add(lane.metrics_snapshot());
        }
        total
    }

    #[inline]
    fn start_index(&self) -> usize {
        (producer_id::current() as usize) & self.mask
    }

    // SAFETY: only the single consumer thread may call poll-family methods
    // (contract), so this read/write pair is never concurrent with itself.
    #[inline]
    fn cursor_hint(&self) -> u64 {
        unsafe { *self.consumer_cursor_hint.get() }
    }

    #[inline]
    fn set_cursor_hint(&self, value: u64) {
        unsafe {
            *self.consumer_cursor_hint.get() = value;
        }
    }

    // ------------------------------------------------------------------
    // Producer side
    // ------------------------------------------------------------------

    /// Strict offer: tries the producer's home lane first (retrying
    /// CAS-lost internally, same as [`Lane::offer`]); only once that lane
    /// is confirmed capacity-full does it fall back to scanning the
    /// remaining lanes. Returns `false` only after confirming every lane
    /// was capacity-full at some instant during the call — never merely
    /// because of transient contention.
    pub fn offer(&self, item: T) -> bool {
        let start = self.start_index();
        let mut item = item;
        let mut backoff = Backoff::new();

        loop {
            match self.lanes[start].try_offer(item) {
                TryOfferResult::Enqueued => return true,
                TryOfferResult::Full(returned) => {
                    item = returned;
                    break;
                }
                TryOfferResult::Contended(returned) => {
                    item = returned;
                    backoff.snooze();
                }
            }
        }

        self.offer_fallback(start, item)
    }

    /// Scans the remaining lanes starting just past `home`, one full pass
    /// per iteration. `full` is a capacity condition; `contended` is a
    /// transient condition expected to resolve — only a pass where *every*
    /// lane reports full (and none report contended) is treated as "really
    /// full".
    fn offer_fallback(&self, home: usize, mut item: T) -> bool {
        let k = self.lanes.len();
        loop {
            let mut full_count = 0usize;
            for step in 1..=k {
                let idx = (home + step) & self.mask;
                match self.lanes[idx].try_offer(item) {
                    TryOfferResult::Enqueued => return true,
                    TryOfferResult::Full(returned) => {
                        item = returned;
                        full_count += 1;
                    }
                    TryOfferResult::Contended(returned) => {
                        item = returned;
                    }
                }
            }
            if full_count == k {
                return false;
            }
        }
    }

    /// Bounded-step offer: tries the home lane, then each remaining lane
    /// once, with no retry pass. Returns `false` after a single sweep —
    /// the caller accepted relaxed semantics.
    pub fn relaxed_offer(&self, item: T) -> bool {
        let start = self.start_index();
        let mut item = item;

        match self.lanes[start].try_offer(item) {
            TryOfferResult::Enqueued => return true,
            TryOfferResult::Full(returned) | TryOfferResult::Contended(returned) => {
                item = returned;
            }
        }

        for step in 1..self.lanes.len() {
            let idx = (start + step) & self.mask;
            match self.lanes[idx].try_offer(item) {
                TryOfferResult::Enqueued => return true,
                TryOfferResult::Full(returned) | TryOfferResult::Contended(returned) => {
                    item = returned;
                }
            }
        }

        false
    }

    /// Enqueues up to `limit` items produced by `supplier`, trying the home
    /// lane first and then each remaining lane once. Partial fill is
    /// permitted — this is relaxed semantics, like [`Compound::relaxed_offer`].
    pub fn fill<F: FnMut() -> T>(&self, mut supplier: F, limit: usize) -> usize {
        if limit == 0 {
            return 0;
        }

        let start = self.start_index();
        let mut filled = self.lanes[start].fill(&mut supplier, limit);

        if filled < limit {
            for step in 1..self.lanes.len() {
                if filled == limit {
                    break;
                }
                let idx = (start + step) & self.mask;
                filled += self.lanes[idx].fill(&mut supplier, limit - filled);
            }
        }

        filled
    }

    // ------------------------------------------------------------------
    // Consumer side
    // ------------------------------------------------------------------

    /// Removes and returns the next available element across all lanes, or
    /// `None` if every lane was empty. Resumes scanning from where the
    /// previous call left off (see the crate-level docs on cursor drift).
    pub fn poll(&self) -> Option<T> {
        let start = self.cursor_hint() as usize & self.mask;
        let limit = start + self.lanes.len();
        let mut result = None;
        let mut i = start;

        while i < limit {
            if let Some(item) = self.lanes[i & self.mask].poll() {
                result = Some(item);
                break;
            }
            i += 1;
        }

        self.set_cursor_hint(i as u64);
        result
    }

    /// Returns a reference to the next available element without removing
    /// it, or `None` if every lane was empty.
    pub fn peek(&self) -> Option<&T> {
        let start = self.cursor_hint() as usize & self.mask;
        let limit = start + self.lanes.len();
        let mut result = None;
        let mut i = start;

        while i < limit {
            if let Some(item) = self.lanes[i & self.mask].peek() {
                result = Some(item);
                break;
            }
            i += 1;
        }

        self.set_cursor_hint(i as u64);
        result
    }

    /// Bounded-step poll. Identical to [`Compound::poll`]: each lane's own
    /// poll is already wait-free and non-looping, so there is nothing
    /// additional for a relaxed variant to skip at the lane level. Kept as
    /// a distinct method so callers can name their intent and so a future
    /// lane implementation with a looping poll stays behind the same seam.
    #[inline]
    pub fn relaxed_poll(&self) -> Option<T> {
        self.poll()
    }

    /// Bounded-step peek; see [`Compound::relaxed_poll`].
    #[inline]
    pub fn relaxed_peek(&self) -> Option<&T> {
        self.peek()
    }

    // Deliberately no `iterator()` / `IntoIterator` impl: the data model
    // does not support a consistent snapshot across lanes, and a
    // best-effort iterator would misrepresent that. See DESIGN.md.
}
