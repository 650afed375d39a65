//! Profit tax on fast exits.
//!
//! Applied once per exiting participant at sweep time. The tax is booked to
//! the reserve as a side allocation; the participant's `collected` is not
//! reduced.

use eddy_core::constants::WINNERS_TAX_BPS;
use eddy_core::types::{apply_bps, Amount, Participant};

/// Whether an exit at `now_ms` happened inside the fast-exit window.
pub fn is_fast_exit(participant: &Participant, now_ms: u64, window_ms: u64) -> bool {
    now_ms.saturating_sub(participant.entry_timestamp_ms) < window_ms
}

/// Tax owed by an exiting participant, zero when exempt.
///
/// Slow exits and exits without profit pay nothing. Whether a sweep is taxed
/// at all is decided by the caller.
pub fn winners_tax(participant: &Participant, now_ms: u64, window_ms: u64) -> Amount {
    if !is_fast_exit(participant, now_ms, window_ms) {
        return 0;
    }
    apply_bps(participant.profit(), WINNERS_TAX_BPS)
}
