//! Load-based multiplier decay.
//!
//! New entrants receive a lower multiplier as the queue grows: 0.05× less for
//! every full block of 10 queued participants, never below 1.1×. Stateless;
//! the only lasting effect is the multiplier stamped on the new participant.

use eddy_core::constants::{DECAY_BLOCK_SIZE, DECAY_STEP_BPS, MIN_DECAYED_MULTIPLIER_BPS};

/// Multiplier granted to a new entrant joining a queue of `queue_len`.
///
/// # Examples
///
/// ```
/// use eddy_mechanics::decay::decayed_multiplier_bps;
///
/// assert_eq!(decayed_multiplier_bps(20_000, 0), 20_000);
/// assert_eq!(decayed_multiplier_bps(20_000, 9), 20_000);
/// assert_eq!(decayed_multiplier_bps(20_000, 10), 19_500);
/// assert_eq!(decayed_multiplier_bps(20_000, 1_000), 11_000);
/// ```
pub fn decayed_multiplier_bps(base_bps: u64, queue_len: usize) -> u64 {
    let steps = (queue_len / DECAY_BLOCK_SIZE) as u64;
    let reduction = steps.saturating_mul(DECAY_STEP_BPS);
    let floor = MIN_DECAYED_MULTIPLIER_BPS.min(base_bps);
    base_bps.saturating_sub(reduction).max(floor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddy_core::constants::{MAX_MULTIPLIER_BPS, MIN_MULTIPLIER_BPS};
    use proptest::prelude::*;

    #[test]
    fn full_blocks_only() {
        assert_eq!(decayed_multiplier_bps(30_000, 19), 29_500);
        assert_eq!(decayed_multiplier_bps(30_000, 20), 29_000);
        assert_eq!(decayed_multiplier_bps(30_000, 39), 28_500);
    }

    #[test]
    fn floor_reached_exactly() {
        // 2.0× needs 18 steps (180 participants) to reach 1.1×.
        assert_eq!(decayed_multiplier_bps(20_000, 170), 11_500);
        assert_eq!(decayed_multiplier_bps(20_000, 180), 11_000);
        assert_eq!(decayed_multiplier_bps(20_000, 190), 11_000);
    }

    #[test]
    fn minimum_base_never_decays() {
        assert_eq!(decayed_multiplier_bps(MIN_MULTIPLIER_BPS, 500), MIN_MULTIPLIER_BPS);
    }

    #[test]
    fn huge_queue_saturates() {
        assert_eq!(decayed_multiplier_bps(MAX_MULTIPLIER_BPS, usize::MAX), MIN_DECAYED_MULTIPLIER_BPS);
    }

    proptest! {
        #[test]
        fn decay_bounded(base in MIN_MULTIPLIER_BPS..=MAX_MULTIPLIER_BPS, len in 0usize..10_000) {
            let m = decayed_multiplier_bps(base, len);
            prop_assert!(m <= base);
            prop_assert!(m >= MIN_DECAYED_MULTIPLIER_BPS);
        }

        #[test]
        fn decay_monotonic_in_queue_length(base in MIN_MULTIPLIER_BPS..=MAX_MULTIPLIER_BPS, a in 0usize..5_000, b in 0usize..5_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(decayed_multiplier_bps(base, lo) >= decayed_multiplier_bps(base, hi));
        }
    }
}
