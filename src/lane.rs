//! A single bounded MPSC array queue — one lane of a [`Compound`](crate::Compound).
//!
//! # Memory ordering & synchronization strategy
//!
//! Unbounded `u64` sequence numbers for `tail` (producer cursor) and `head`
//! (consumer cursor) avoid the ABA problem entirely — the buffer index is
//! only ever computed as `sequence & mask` at the point of access. At
//! billions of messages per second, wrapping the full `u64` range takes
//! decades, so wrap is a debug-assertion concern, not a runtime one.
//!
//! The cursors alone cannot be the publish mechanism: a release operation
//! only establishes happens-before for writes sequenced *before* it, and a
//! producer's slot write happens *after* it wins the `tail` CAS. An
//! `AcqRel` CAS on `tail` publishes nothing about a write that hasn't
//! happened yet. Instead each slot carries its own `sequence: AtomicU64`
//! (the classic Vyukov bounded-queue protocol, also used by
//! `other_examples/4863a400_abbychau-mpmc-std__src-lib.rs.rs` in this
//! pack): a producer claims a slot by CAS-ing `tail`, writes the element,
//! then `Release`-stores the slot's sequence to `tail + 1`. A consumer
//! `Acquire`-loads that same slot's sequence before touching the data; the
//! Acquire/Release pair on the *slot*, not on `tail`, is what carries the
//! happens-before edge.
//!
//! **Producers (any number, CAS-synchronized against each other):**
//! 1. Load `tail` Relaxed — the CAS below supplies the ordering for the
//!    cursor; the slot's own sequence number supplies ordering for the data.
//! 2. Acquire-load the target slot's `sequence`. If it doesn't equal the
//!    loaded `tail`, the slot isn't ready for this cursor value: `sequence <
//!    tail` means the consumer hasn't freed it yet (genuinely full —
//!    [`TryOfferResult::Full`]); `sequence > tail` means this producer's
//!    `tail` read was stale (some other producer already claimed and moved
//!    past it — reported as [`TryOfferResult::Contended`] so the caller
//!    retries with a fresh read).
//! 3. Otherwise `compare_exchange_weak(tail, tail + 1, Relaxed, Relaxed)` to
//!    claim the slot. Losing the CAS means another producer claimed it in
//!    the interim — [`TryOfferResult::Contended`], never conflated with
//!    [`TryOfferResult::Full`].
//! 4. On a won CAS, write the element into the claimed slot, then
//!    `Release`-store the slot's `sequence` to `tail + 1`. That store is
//!    the actual publish point.
//!
//! **Consumer (exactly one, never contends with itself):**
//! 1. Load `head` Relaxed (only the consumer ever writes it).
//! 2. Acquire-load the head slot's `sequence`. If it isn't `head + 1`, the
//!    slot hasn't been published yet (or the lane is empty) — return empty.
//! 3. Otherwise the Acquire load synchronizes with the producer's Release
//!    store, so the element write is visible: read it out, then
//!    `Release`-store the slot's `sequence` to `head + capacity`, handing
//!    the slot back to producers for the next lap, and store `head + 1`.

use crate::backoff::Backoff;
use crate::invariants::{
    debug_assert_bounded_count, debug_assert_head_not_past_tail, debug_assert_monotonic,
    debug_assert_no_wrap,
};
use crate::metrics::LaneMetrics;
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::cmp::Ordering as CmpOrdering;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of a non-retrying (`fail-fast`) offer attempt.
///
/// The Rust rendering of spec's `{0, 1, 2}` status code: `Full` and
/// `Contended` hand the item back, since a failed attempt in Rust can't
/// silently drop a value the caller still owns the way an integer status
/// code can in a language with implicit nullability. Collapsing `Full` and
/// `Contended` into one failure case would break the strict offer's
/// termination guarantee against a genuinely full lane and the Compound's
/// ability to tell "try elsewhere" apart from "every lane really is full".
#[derive(Debug)]
pub enum TryOfferResult<T> {
    /// The element was enqueued.
    Enqueued,
    /// The lane is capacity-full; retrying this lane won't help right now.
    Full(T),
    /// A CAS was lost to a concurrent producer, or this producer's cached
    /// `tail` read was stale; retrying (this lane or another) may succeed.
    Contended(T),
}

impl<T> TryOfferResult<T> {
    /// Returns `true` for [`Self::Enqueued`].
    #[inline]
    pub fn is_enqueued(&self) -> bool {
        matches!(self, Self::Enqueued)
    }
}

/// One buffer slot plus the sequence number that publishes it.
///
/// `#[repr(align(64))]` keeps adjacent slots on separate cache lines, the
/// same choice `other_examples/4863a400_abbychau-mpmc-std__src-lib.rs.rs`
/// makes for the identical reason: without it, a producer publishing slot
/// `i` and a consumer polling slot `i+1` would false-share the line the two
/// `Slot`s happen to pack into.
#[repr(align(64))]
struct Slot<T> {
    /// `sequence == tail` means "ready for the producer claiming cursor
    /// `tail` to write"; `sequence == tail + 1` means "published, ready for
    /// the consumer to read"; `sequence == tail + capacity` means "consumed,
    /// ready for the producer claiming the next lap's `tail`".
    sequence: AtomicU64,
    data: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn new(initial_sequence: u64) -> Self {
        Self {
            sequence: AtomicU64::new(initial_sequence),
            data: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// A single bounded MPSC array queue with power-of-two capacity.
///
/// Owned exclusively by a [`Compound`](crate::Compound) lane slot for the
/// Compound's entire lifetime — lanes are never resized or rebuilt.
pub struct Lane<T> {
    /// Producer cursor. Any producer thread may attempt to CAS this.
    tail: CachePadded<AtomicU64>,
    /// Consumer cursor. Written only by the single consumer; read by
    /// producers only for best-effort `len()` accounting, never for
    /// publish/visibility decisions (the per-slot `sequence` owns that).
    head: CachePadded<AtomicU64>,
    capacity: usize,
    mask: usize,
    buffer: Box<[Slot<T>]>,
    metrics: Option<LaneMetrics>,
}

// Safety: all cross-thread access to slot data goes through the per-slot
// sequence Acquire/Release protocol documented above.
unsafe impl<T: Send> Send for Lane<T> {}
unsafe impl<T: Send> Sync for Lane<T> {}

impl<T> Lane<T> {
    /// Creates a new lane with the given power-of-two capacity.
    pub(crate) fn new(capacity: usize, enable_metrics: bool) -> Self {
        debug_assert!(capacity.is_power_of_two() && capacity >= 2);

        let buffer: Box<[Slot<T>]> = (0..capacity)
            .map(|i| Slot::new(i as u64))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            tail: CachePadded::new(AtomicU64::new(0)),
            head: CachePadded::new(AtomicU64::new(0)),
            capacity,
            mask: capacity - 1,
            buffer,
            metrics: enable_metrics.then(LaneMetrics::default),
        }
    }

    /// Lane capacity `C`, a power of two.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Best-effort snapshot of `tail - head`, clamped to `[0, C]`.
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Relaxed);
        (tail.wrapping_sub(head) as usize).min(self.capacity)
    }

    /// `true` if the lane was observed empty at some instant during the call.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn metrics_snapshot(&self) -> crate::metrics::Metrics {
        self.metrics
            .as_ref()
            .map(LaneMetrics::snapshot)
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Producer side
    // ------------------------------------------------------------------

    /// Fail-fast, non-retrying offer. Never spins; bounded steps.
    pub fn try_offer(&self, item: T) -> TryOfferResult<T> {
        let tail = self.tail.load(Ordering::Relaxed);
        let idx = (tail as usize) & self.mask;
        let slot = &self.buffer[idx];
        let seq = slot.sequence.load(Ordering::Acquire);

        match seq.cmp(&tail) {
            CmpOrdering::Less => {
                // The consumer hasn't freed this slot yet: genuinely full.
                if let Some(m) = &self.metrics {
                    m.record_full();
                }
                TryOfferResult::Full(item)
            }
            CmpOrdering::Greater => {
                // Our `tail` read was stale — another producer has already
                // claimed and moved past this slot. Ask the caller to retry.
                if let Some(m) = &self.metrics {
                    m.record_cas_loss();
                }
                TryOfferResult::Contended(item)
            }
            CmpOrdering::Equal => {
                match self.tail.compare_exchange_weak(
                    tail,
                    tail.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        let new_tail = tail.wrapping_add(1);
                        debug_assert_bounded_count!(
                            new_tail.wrapping_sub(self.head.load(Ordering::Relaxed)),
                            self.capacity as u64
                        );
                        debug_assert_monotonic!("tail", tail, new_tail);
                        debug_assert_no_wrap!("tail", tail, new_tail);

                        // SAFETY: winning this CAS uniquely entitles this
                        // producer to slot `idx` for cursor value `tail` —
                        // `seq == tail` just confirmed the consumer freed it,
                        // and no other producer can also observe `seq ==
                        // tail` and win the same CAS.
                        unsafe {
                            (*slot.data.get()).write(item);
                        }
                        // Publish: a consumer's Acquire load of this same
                        // sequence value happens-after this store.
                        slot.sequence.store(new_tail, Ordering::Release);

                        if let Some(m) = &self.metrics {
                            m.record_enqueued();
                        }
                        TryOfferResult::Enqueued
                    }
                    Err(_) => {
                        if let Some(m) = &self.metrics {
                            m.record_cas_loss();
                        }
                        TryOfferResult::Contended(item)
                    }
                }
            }
        }
    }

    /// Strict offer: retries CAS-lost internally with [`Backoff`], returns
    /// only on success or genuine capacity failure. Lock-free — some
    /// producer always makes progress, though an individual producer may
    /// spin against contention.
    pub fn offer(&self, item: T) -> bool {
        let mut item = item;
        let mut backoff = Backoff::new();
        loop {
            match self.try_offer(item) {
                TryOfferResult::Enqueued => return true,
                TryOfferResult::Full(_) => return false,
                TryOfferResult::Contended(returned) => {
                    item = returned;
                    backoff.snooze();
                }
            }
        }
    }

    /// Bounded-step offer variant: one attempt, no internal retry on
    /// contention. The caller accepted relaxed semantics and may see a
    /// spurious `false` even though another attempt moments later would
    /// have succeeded.
    pub fn relaxed_offer(&self, item: T) -> bool {
        matches!(self.try_offer(item), TryOfferResult::Enqueued)
    }

    /// Enqueues up to `limit` items produced by `supplier`. Stops early if
    /// a lane-full condition is hit; never retries past fullness.
    pub fn fill<F: FnMut() -> T>(&self, mut supplier: F, limit: usize) -> usize {
        let mut filled = 0;
        while filled < limit {
            if !self.offer(supplier()) {
                break;
            }
            filled += 1;
        }
        filled
    }

    // ------------------------------------------------------------------
    // Consumer side (single-threaded by contract)
    // ------------------------------------------------------------------

    /// Removes and returns the head element, or `None` if empty. Never
    /// fails in the error sense; wait-free, bounded steps.
    pub fn poll(&self) -> Option<T> {
        let head = self.head.load(Ordering::Relaxed);
        let idx = (head as usize) & self.mask;
        let slot = &self.buffer[idx];
        let published = head.wrapping_add(1);

        // Acquire: synchronizes with the producer's Release store of this
        // same sequence value, making the element write visible below.
        if slot.sequence.load(Ordering::Acquire) != published {
            return None;
        }

        // SAFETY: the Acquire load above observed this slot's publish, so
        // the producer's write happens-before this read.
        let item = unsafe { (*slot.data.get()).assume_init_read() };

        let new_head = head.wrapping_add(1);
        debug_assert_head_not_past_tail!(new_head, self.tail.load(Ordering::Relaxed));
        debug_assert_monotonic!("head", head, new_head);

        // Hand the slot back to producers for the lap starting at
        // `head + capacity`.
        slot.sequence
            .store(head.wrapping_add(self.capacity as u64), Ordering::Release);
        self.head.store(new_head, Ordering::Relaxed);

        if let Some(m) = &self.metrics {
            m.record_polled();
        }
        Some(item)
    }

    /// Returns a reference to the head element without removing it, or
    /// `None` if empty.
    pub fn peek(&self) -> Option<&T> {
        let head = self.head.load(Ordering::Relaxed);
        let idx = (head as usize) & self.mask;
        let slot = &self.buffer[idx];
        let published = head.wrapping_add(1);

        if slot.sequence.load(Ordering::Acquire) != published {
            return None;
        }

        // SAFETY: same reasoning as `poll`, but the slot is left in place.
        unsafe { Some((*slot.data.get()).assume_init_ref()) }
    }

    /// Bounded-step poll. Identical to [`Lane::poll`] here: the consumer
    /// side never loops internally, so there is no spin for a relaxed
    /// variant to skip. The strict/relaxed distinction only has teeth at
    /// the Compound level, where "relaxed" means "no second pass across
    /// lanes", not "no retry within one lane".
    #[inline]
    pub fn relaxed_poll(&self) -> Option<T> {
        self.poll()
    }

    /// Bounded-step peek; see [`Lane::relaxed_poll`].
    #[inline]
    pub fn relaxed_peek(&self) -> Option<&T> {
        self.peek()
    }
}

impl<T> Drop for Lane<T> {
    fn drop(&mut self) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Relaxed);
        let count = tail.wrapping_sub(head) as usize;

        if count > 0 {
            let mask = self.mask;
            for i in 0..count {
                let idx = (head as usize).wrapping_add(i) & mask;
                unsafe {
                    ptr::drop_in_place((*self.buffer[idx].data.get()).as_mut_ptr());
                }
            }
        }
    }
}
