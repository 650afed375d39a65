//! Allocation of a net deposit across the queue.
//!
//! Pure functions over [`QueueStore`]; the engine sequences them. Credits
//! never push a member past its target: whatever a member cannot absorb
//! stays in the pool and is reported back as leftover.

use eddy_core::config::Strategy;
use eddy_core::constants::{COMMUNITY_YIELD_BPS, MIN_FEE};
use eddy_core::queue::QueueStore;
use eddy_core::types::{apply_bps, Amount};

/// Fee on a non-system deposit: `max(MIN_FEE, amount × fee_rate)`, never more
/// than the deposit itself.
///
/// # Examples
///
/// ```
/// use eddy_core::types::units;
/// use eddy_engine::distribution::compute_fee;
///
/// assert_eq!(compute_fee(units(100), 100), units(1));
/// assert_eq!(compute_fee(units(250), 100), 2_500_000);
/// assert_eq!(compute_fee(units(10), 100), units(1));
/// ```
pub fn compute_fee(amount: Amount, fee_rate_bps: u64) -> Amount {
    apply_bps(amount, fee_rate_bps).max(MIN_FEE).min(amount)
}

/// Split a net deposit into `(yield_pool, head_pool)`.
pub fn split_pools(net: Amount, strategy: Strategy) -> (Amount, Amount) {
    match strategy {
        Strategy::Standard => (0, net),
        Strategy::CommunityYield => {
            let yield_pool = apply_bps(net, COMMUNITY_YIELD_BPS);
            (yield_pool, net - yield_pool)
        }
    }
}

/// Result of spending a pool against the queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Allocation {
    /// Total credited to members.
    pub credited: Amount,
    /// Part of the pool nobody absorbed.
    pub leftover: Amount,
}

/// Share `pool` evenly across every queued member.
///
/// Each member receives `pool / len`, capped at its remaining need. Integer
/// dust and capped excess come back as `leftover`.
pub fn distribute_yield(queue: &mut QueueStore, pool: Amount) -> Allocation {
    if pool == 0 || queue.is_empty() {
        return Allocation {
            credited: 0,
            leftover: pool,
        };
    }
    let share = pool / queue.len() as u64;
    let mut credited = 0;
    for p in queue.iter_mut() {
        credited += p.credit_capped(share);
    }
    Allocation {
        credited,
        leftover: pool - credited,
    }
}

/// Pay members in queue order, each up to its remaining need, until the pool
/// or the queue runs out. Members already at target are skipped.
pub fn allocate_heads(queue: &mut QueueStore, pool: Amount) -> Allocation {
    let mut remaining = pool;
    for p in queue.iter_mut() {
        if remaining == 0 {
            break;
        }
        remaining -= p.credit_capped(remaining);
    }
    Allocation {
        credited: pool - remaining,
        leftover: remaining,
    }
}
