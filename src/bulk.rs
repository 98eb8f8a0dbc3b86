//! Bulk drain/fill helpers.
//!
//! Pure compositions over [`Compound::relaxed_poll`] /
//! [`Compound::relaxed_offer`] plus externally supplied `wait` and `exit`
//! callables — the core never invokes either while holding any lane state,
//! and neither is given the ability to see internal queue state beyond
//! what a plain `Option`/`bool` return already reveals.

use crate::compound::Compound;

impl<T> Compound<T> {
    /// Drains up to `limit` items into `consumer`, stopping early if the
    /// queue is observed empty. A single reduction over [`Compound::relaxed_poll`];
    /// no waiting, no retry.
    pub fn drain<F: FnMut(T)>(&self, limit: usize, mut consumer: F) -> usize {
        let mut total = 0;
        while total < limit {
            match self.relaxed_poll() {
                Some(item) => {
                    consumer(item);
                    total += 1;
                }
                None => break,
            }
        }
        total
    }

    /// Drains every currently-available item into `consumer`. Stops the
    /// instant the queue is observed empty — items offered concurrently
    /// after that instant are not guaranteed to be included.
    pub fn drain_all<F: FnMut(T)>(&self, mut consumer: F) -> usize {
        let mut total = 0;
        while let Some(item) = self.relaxed_poll() {
            consumer(item);
            total += 1;
        }
        total
    }

    /// Enqueues items produced by `supplier` until the queue reports full.
    /// A single reduction over [`Compound::relaxed_offer`]; no waiting, no
    /// retry past a genuine full.
    pub fn fill_all<F: FnMut() -> T>(&self, mut supplier: F) -> usize {
        let mut total = 0;
        while self.relaxed_offer(supplier()) {
            total += 1;
        }
        total
    }

    /// Drains items into `consumer` until `should_continue` returns `false`.
    ///
    /// `wait` is invoked whenever the queue is observed empty between
    /// attempts, with a monotonically increasing idle-count argument, and
    /// must return the updated idle-count — the core has no opinion on
    /// what "waiting" means (spin, sleep, park on a condvar); that policy
    /// is entirely the caller's. `should_continue` is polled once per pass;
    /// `false` stops the loop, even mid-burst.
    pub fn drain_with<C, W, E>(&self, mut consumer: C, mut wait: W, mut should_continue: E) -> usize
    where
        C: FnMut(T),
        W: FnMut(u64) -> u64,
        E: FnMut() -> bool,
    {
        let mut total = 0;
        let mut idle = 0u64;
        while should_continue() {
            match self.relaxed_poll() {
                Some(item) => {
                    consumer(item);
                    total += 1;
                    idle = 0;
                }
                None => idle = wait(idle),
            }
        }
        total
    }

    /// Enqueues items produced by `supplier` until `should_continue`
    /// returns `false`. See [`Compound::drain_with`] for the `wait` /
    /// `should_continue` contract.
    pub fn fill_with<F, W, E>(&self, mut supplier: F, mut wait: W, mut should_continue: E) -> usize
    where
        F: FnMut() -> T,
        W: FnMut(u64) -> u64,
        E: FnMut() -> bool,
    {
        let mut total = 0;
        let mut idle = 0u64;
        while should_continue() {
            if self.relaxed_offer(supplier()) {
                total += 1;
                idle = 0;
            } else {
                idle = wait(idle);
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    #[test]
    fn drain_all_empties_the_queue() {
        let q = Compound::<u64>::with_config(Config::new(8, 1).unwrap());
        for i in 0..5 {
            assert!(q.offer(i));
        }
        let mut seen = Vec::new();
        let total = q.drain_all(|item| seen.push(item));
        assert_eq!(total, 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(q.is_empty());
    }

    #[test]
    fn fill_all_stops_at_capacity() {
        let q = Compound::<u64>::with_config(Config::new(4, 1).unwrap());
        let mut next = 0u64;
        let total = q.fill_all(|| {
            next += 1;
            next
        });
        assert_eq!(total, q.capacity());
    }

    #[test]
    fn drain_with_stops_on_exit_predicate() {
        let q = Compound::<u64>::with_config(Config::new(8, 1).unwrap());
        for i in 0..3 {
            q.offer(i);
        }
        let waits = AtomicU64::new(0);
        let keep_going = AtomicBool::new(true);
        let mut seen = Vec::new();

        q.drain_with(
            |item| {
                seen.push(item);
                if item == 2 {
                    keep_going.store(false, Ordering::Relaxed);
                }
            },
            |idle| {
                waits.fetch_add(1, Ordering::Relaxed);
                idle + 1
            },
            || keep_going.load(Ordering::Relaxed),
        );

        assert_eq!(seen, vec![0, 1, 2]);
    }
}
