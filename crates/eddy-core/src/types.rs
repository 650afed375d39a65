//! Core protocol types: participants, the protocol ledger, amount helpers.
//!
//! All monetary values are in micro-units (1 unit = 10^6 micro-units).
//! Rates and multipliers are basis points (10 000 BPS = 1.0×).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{BPS_PRECISION, EXIT_EPSILON, MAX_DEPOSIT, UNIT};
use crate::error::DepositError;

/// Quantity of currency in micro-units.
pub type Amount = u64;

/// `amount * bps / BPS_PRECISION`, rounded down, saturating at `u64::MAX`.
///
/// # Examples
///
/// ```
/// use eddy_core::types::apply_bps;
///
/// assert_eq!(apply_bps(1_000, 2_000), 200);
/// assert_eq!(apply_bps(250, 20_000), 500);
/// assert_eq!(apply_bps(7, 5_000), 3);
/// ```
pub fn apply_bps(amount: Amount, bps: u64) -> Amount {
    let scaled = (amount as u128) * (bps as u128) / BPS_PRECISION as u128;
    scaled.min(u64::MAX as u128) as u64
}

/// Sum amounts in `u128`, saturating at `u64::MAX`.
///
/// ```
/// use eddy_core::types::saturating_sum;
///
/// assert_eq!(saturating_sum([3, 4]), 7);
/// assert_eq!(saturating_sum([u64::MAX, 1]), u64::MAX);
/// ```
pub fn saturating_sum(amounts: impl IntoIterator<Item = Amount>) -> Amount {
    let total: u128 = amounts.into_iter().map(u128::from).sum();
    total.min(u64::MAX as u128) as u64
}

/// Whole units to micro-units.
///
/// ```
/// use eddy_core::types::units;
/// assert_eq!(units(3), 3_000_000);
/// ```
pub const fn units(n: u64) -> Amount {
    n * UNIT
}

/// Convert a fractional unit quantity (e.g. CLI input) to micro-units.
///
/// Rejects non-finite, non-positive, and over-limit values, and values that
/// round down to zero micro-units.
pub fn amount_from_units(value: f64) -> Result<Amount, DepositError> {
    if !value.is_finite() {
        return Err(DepositError::NonFinite(value));
    }
    if value <= 0.0 {
        return Err(DepositError::NonPositive);
    }
    let micros = (value * UNIT as f64).round();
    if micros >= MAX_DEPOSIT as f64 + 1.0 {
        return Err(DepositError::TooLarge {
            amount: u64::MAX,
            max: MAX_DEPOSIT,
        });
    }
    let amount = micros as u64;
    validate_deposit(amount)?;
    Ok(amount)
}

/// Check a deposit amount before it touches engine state.
pub fn validate_deposit(amount: Amount) -> Result<(), DepositError> {
    if amount == 0 {
        return Err(DepositError::NonPositive);
    }
    if amount > MAX_DEPOSIT {
        return Err(DepositError::TooLarge {
            amount,
            max: MAX_DEPOSIT,
        });
    }
    Ok(())
}

/// Render micro-units as a decimal unit string.
///
/// ```
/// use eddy_core::types::format_amount;
/// assert_eq!(format_amount(2_500_000), "2.500000");
/// assert_eq!(format_amount(0), "0.000000");
/// ```
pub fn format_amount(amount: Amount) -> String {
    format!("{}.{:06}", amount / UNIT, amount % UNIT)
}

/// Identifier of a queued participant.
///
/// Both variants draw from one engine-wide sequence, so ids never repeat
/// within an engine's lifetime. `Protocol` marks entries seeded by the
/// protocol itself after settlement.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParticipantId {
    /// Deposit made by an external participant.
    User(u64),
    /// Fee-exempt reseed deposit made by the protocol.
    Protocol(u64),
}

impl ParticipantId {
    /// Whether this id marks a protocol-seeded entry.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// The underlying sequence number.
    pub fn seq(&self) -> u64 {
        match self {
            Self::User(n) | Self::Protocol(n) => *n,
        }
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(n) => write!(f, "user-{n}"),
            Self::Protocol(n) => write!(f, "protocol-{n}"),
        }
    }
}

/// A queued depositor awaiting payout.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    /// Gross deposit, fixed at creation.
    pub deposit: Amount,
    /// Amount owed before exit. Only ever decreases (slashing).
    pub target: Amount,
    /// Amount paid so far. Never decreases.
    pub collected: Amount,
    /// Settlement epoch at entry.
    pub entry_epoch: u64,
    /// Clock reading at entry, in milliseconds.
    pub entry_timestamp_ms: u64,
    pub was_slashed: bool,
    /// Multiplier applied at creation, after any decay.
    pub entry_multiplier_bps: u64,
}

impl Participant {
    /// Create a participant with `target = deposit × multiplier_bps`.
    pub fn new(
        id: ParticipantId,
        deposit: Amount,
        multiplier_bps: u64,
        entry_epoch: u64,
        entry_timestamp_ms: u64,
    ) -> Self {
        Self {
            id,
            deposit,
            target: apply_bps(deposit, multiplier_bps),
            collected: 0,
            entry_epoch,
            entry_timestamp_ms,
            was_slashed: false,
            entry_multiplier_bps: multiplier_bps,
        }
    }

    /// Amount still owed: `target - collected`, zero once met or exceeded.
    pub fn remaining_need(&self) -> Amount {
        self.target.saturating_sub(self.collected)
    }

    /// Unrecovered principal: `deposit - collected`, floored at zero.
    pub fn remaining_principal(&self) -> Amount {
        self.deposit.saturating_sub(self.collected)
    }

    /// Realized gain over the deposit.
    pub fn profit(&self) -> Amount {
        self.collected.saturating_sub(self.deposit)
    }

    /// Whether `collected` is within [`EXIT_EPSILON`] of `target`.
    pub fn has_reached_target(&self) -> bool {
        self.collected.saturating_add(EXIT_EPSILON) >= self.target
    }

    /// Credit up to `amount`, never past the remaining need. Returns the
    /// amount actually credited.
    pub fn credit_capped(&mut self, amount: Amount) -> Amount {
        let paid = amount.min(self.remaining_need());
        self.collected += paid;
        paid
    }
}

/// Process-wide running counters. One instance per engine.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Funds held outside the queue. Fed by fees, taxes, and floor top-ups.
    pub reserve_balance: Amount,
    /// Gross sum of every accepted deposit.
    pub total_deposited: Amount,
    pub exited_count: u64,
    /// Sum of final targets of exited participants.
    pub exited_value_sum: Amount,
    /// Advanced only by settlement.
    pub current_epoch: u64,
    /// Processed deposits, used to gate periodic mechanics.
    pub event_counter: u64,
    /// Everything credited to participants: yield, head payouts, refunds.
    pub total_paid_out: Amount,
    pub total_fees: Amount,
    pub total_taxes: Amount,
    /// Net deposit that found no recipient.
    pub total_unallocated: Amount,
    /// Liability removed by slashing.
    pub total_slashed: Amount,
    /// Principal returned during settlement.
    pub total_refunded: Amount,
    /// Liability wiped by settlement.
    pub total_forfeited: Amount,
    /// Reserve spent on protocol reseeds.
    pub total_seeded: Amount,
    /// Protocol funds added at settlement to restore the reserve floor.
    #[serde(default)]
    pub total_floor_topups: Amount,
}

impl Ledger {
    /// Every reserve movement is accounted for:
    /// `reserve = fees + taxes + floor top-ups - refunds - reseeds`.
    pub fn reserve_reconciles(&self) -> bool {
        (self.total_fees as u128 + self.total_taxes as u128 + self.total_floor_topups as u128)
            .checked_sub(self.total_refunded as u128 + self.total_seeded as u128)
            == Some(self.reserve_balance as u128)
    }

    /// Every deposited unit went to the fee, a participant, or nowhere:
    /// `deposited = fees + (paid_out - refunds) + unallocated`.
    pub fn deposits_reconcile(&self) -> bool {
        let Some(paid_from_deposits) = self.total_paid_out.checked_sub(self.total_refunded) else {
            return false;
        };
        self.total_deposited as u128
            == self.total_fees as u128 + paid_from_deposits as u128 + self.total_unallocated as u128
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn participant(deposit: Amount, multiplier_bps: u64) -> Participant {
        Participant::new(ParticipantId::User(1), deposit, multiplier_bps, 0, 0)
    }

    #[test]
    fn new_participant_target_is_multiple_of_deposit() {
        let p = participant(units(100), 20_000);
        assert_eq!(p.target, units(200));
        assert_eq!(p.collected, 0);
        assert!(!p.was_slashed);
        assert_eq!(p.entry_multiplier_bps, 20_000);
    }

    #[test]
    fn credit_capped_stops_at_target() {
        let mut p = participant(units(10), 20_000);
        assert_eq!(p.credit_capped(units(15)), units(15));
        assert_eq!(p.credit_capped(units(15)), units(5));
        assert_eq!(p.collected, p.target);
        assert_eq!(p.credit_capped(units(1)), 0);
    }

    #[test]
    fn reached_target_within_epsilon() {
        let mut p = participant(units(10), 20_000);
        p.collected = p.target - EXIT_EPSILON;
        assert!(p.has_reached_target());
        p.collected = p.target - EXIT_EPSILON - 1;
        assert!(!p.has_reached_target());
    }

    #[test]
    fn remaining_values_saturate() {
        let mut p = participant(units(10), 20_000);
        p.target = units(5);
        p.collected = units(8);
        assert_eq!(p.remaining_need(), 0);
        assert_eq!(p.remaining_principal(), units(2));
        assert_eq!(p.profit(), 0);
    }

    #[test]
    fn amount_from_units_rejects_bad_input() {
        assert_eq!(amount_from_units(0.0), Err(DepositError::NonPositive));
        assert_eq!(amount_from_units(-3.0), Err(DepositError::NonPositive));
        assert!(matches!(amount_from_units(f64::NAN), Err(DepositError::NonFinite(_))));
        assert!(matches!(
            amount_from_units(f64::INFINITY),
            Err(DepositError::NonFinite(_))
        ));
        assert!(matches!(amount_from_units(1e12), Err(DepositError::TooLarge { .. })));
        assert_eq!(amount_from_units(1e-9), Err(DepositError::NonPositive));
    }

    #[test]
    fn amount_from_units_converts_fractions() {
        assert_eq!(amount_from_units(2.5).unwrap(), 2_500_000);
        assert_eq!(amount_from_units(100.0).unwrap(), units(100));
    }

    #[test]
    fn validate_deposit_bounds() {
        assert_eq!(validate_deposit(0), Err(DepositError::NonPositive));
        assert!(validate_deposit(1).is_ok());
        assert!(validate_deposit(MAX_DEPOSIT).is_ok());
        assert!(validate_deposit(MAX_DEPOSIT + 1).is_err());
    }

    #[test]
    fn participant_id_display_and_kind() {
        assert_eq!(ParticipantId::User(7).to_string(), "user-7");
        assert_eq!(ParticipantId::Protocol(3).to_string(), "protocol-3");
        assert!(ParticipantId::Protocol(3).is_protocol());
        assert!(!ParticipantId::User(3).is_protocol());
        assert_eq!(ParticipantId::Protocol(3).seq(), 3);
    }

    #[test]
    fn empty_ledger_reconciles() {
        let l = Ledger::default();
        assert!(l.reserve_reconciles());
        assert!(l.deposits_reconcile());
    }

    #[test]
    fn ledger_detects_unaccounted_reserve() {
        let l = Ledger {
            total_fees: units(3),
            reserve_balance: units(4),
            ..Ledger::default()
        };
        assert!(!l.reserve_reconciles());
    }

    #[test]
    fn ledger_reconciles_deposit_flow() {
        let l = Ledger {
            total_deposited: units(350),
            total_fees: 3_500_000,
            total_paid_out: units(200),
            total_unallocated: 146_500_000,
            reserve_balance: 3_500_000,
            ..Ledger::default()
        };
        assert!(l.deposits_reconcile());
        assert!(l.reserve_reconciles());
    }

    #[test]
    fn floor_topups_count_toward_reserve() {
        let mut l = Ledger {
            total_fees: units(1),
            total_floor_topups: units(999),
            total_seeded: units(100),
            reserve_balance: units(900),
            ..Ledger::default()
        };
        assert!(l.reserve_reconciles());
        l.total_floor_topups = 0;
        assert!(!l.reserve_reconciles());
    }

    proptest! {
        #[test]
        fn apply_bps_never_exceeds_scaled_input(amount in 0u64..=MAX_DEPOSIT, bps in 0u64..=BPS_PRECISION) {
            prop_assert!(apply_bps(amount, bps) <= amount);
        }

        #[test]
        fn credit_capped_preserves_bounds(deposit in 1u64..=1_000_000_000, credits in proptest::collection::vec(0u64..=1_000_000_000, 0..20)) {
            let mut p = participant(deposit, 20_000);
            for c in credits {
                let before = p.collected;
                let paid = p.credit_capped(c);
                prop_assert!(paid <= c);
                prop_assert_eq!(p.collected, before + paid);
                prop_assert!(p.collected <= p.target);
            }
        }
    }
}
