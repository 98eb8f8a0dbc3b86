//! Stable per-thread producer identity used only for lane routing.
//!
//! The design notes explicitly prefer a lazily-assigned thread-local counter
//! over the OS thread id: it avoids coupling lane selection to a
//! platform-specific id type, and the only requirement on it is that it
//! hash uniformly modulo the lane count `K`.

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PRODUCER_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static PRODUCER_ID: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Returns this thread's stable producer id, assigning one on first call.
///
/// The id is a hint for lane selection (`id & mask`), never an ownership
/// assignment — any producer may land on any lane via the Compound's
/// scanning fallback.
#[inline]
pub(crate) fn current() -> u64 {
    PRODUCER_ID.with(|cell| {
        if let Some(id) = cell.get() {
            id
        } else {
            let id = NEXT_PRODUCER_ID.fetch_add(1, Ordering::Relaxed);
            cell.set(Some(id));
            id
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn stable_within_a_thread() {
        let a = current();
        let b = current();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_across_threads() {
        let ids: Vec<u64> = (0..8)
            .map(|_| thread::spawn(current).join().unwrap())
            .collect();
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
