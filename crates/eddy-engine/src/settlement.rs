//! Settlement ("Midnight Reset") building blocks and report.
//!
//! Settlement refunds unrecovered principal out of the reserve surplus, in
//! queue order, then wipes the queue. Profit above principal is never
//! refunded; whatever a participant is still owed at the wipe is forfeited.

use serde::{Deserialize, Serialize};

use eddy_core::queue::QueueStore;
use eddy_core::types::{Amount, ParticipantId};

use crate::engine::DepositReceipt;

/// Outcome of one settlement.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SettlementReport {
    /// Epoch entered by this settlement.
    pub epoch: u64,
    /// Reserve above the floor available for refunds.
    pub surplus: Amount,
    pub refunded: Amount,
    /// Participants that received any refund, in queue order.
    pub refunded_participants: Vec<ParticipantId>,
    /// Amount added to lift a below-floor reserve back to the floor.
    pub floor_topup: Amount,
    /// Participants removed by the wipe.
    pub wiped_count: u64,
    /// Liability still owed to wiped participants.
    pub forfeited: Amount,
    /// Reseed deposit processed after the wipe, if the reserve allowed one.
    pub reseed: Option<DepositReceipt>,
}

/// Refund principal from `surplus` in queue order.
///
/// Each member receives at most `deposit - collected`, further capped at its
/// remaining need so `collected` never passes `target`. Returns the total
/// refunded and who received it.
pub fn refund_principal(queue: &mut QueueStore, surplus: Amount) -> (Amount, Vec<ParticipantId>) {
    let mut remaining = surplus;
    let mut recipients = Vec::new();
    for p in queue.iter_mut() {
        if remaining == 0 {
            break;
        }
        let owed = p.remaining_principal().min(p.remaining_need());
        if owed == 0 {
            continue;
        }
        let paid = owed.min(remaining);
        p.collected += paid;
        remaining -= paid;
        recipients.push(p.id);
    }
    (surplus - remaining, recipients)
}
