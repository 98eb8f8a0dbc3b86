//! Debug-only invariant checks for lane cursor arithmetic.
//!
//! Gated on `#[cfg(debug_assertions)]`, so these cost nothing in release
//! builds. Mirrors how the teacher crate guards its own cursor invariants.

/// `0 <= (tail - head) <= capacity` after a producer claims a slot.
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "INV-LANE-01 violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

/// `head <= tail` must hold after the consumer advances `head`.
macro_rules! debug_assert_head_not_past_tail {
    ($new_head:expr, $tail:expr) => {
        debug_assert!(
            $new_head <= $tail,
            "INV-LANE-01 violated: advancing head {} beyond tail {}",
            $new_head,
            $tail
        )
    };
}

/// A cursor only ever increases (mod the eventual u64 wrap, which at any
/// realistic message rate is not observable within a process lifetime).
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-LANE-02 violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

/// Detects an unexpected sequence jump (not the benign wrap at 2^64).
macro_rules! debug_assert_no_wrap {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new > $old || $old.wrapping_sub($new) > (1u64 << 32),
            "INV-LANE-03 potential wrap detected: {} went from {} to {} (delta: {})",
            $name,
            $old,
            $new,
            $new.wrapping_sub($old)
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_head_not_past_tail;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_no_wrap;
