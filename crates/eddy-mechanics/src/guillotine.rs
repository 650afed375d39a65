//! Periodic slashing of the largest outstanding liabilities.
//!
//! Candidates are the (at most 30) not-yet-slashed members owed the most,
//! ranked by remaining need with queue order breaking ties. Up to 10 victims
//! are drawn from that pool uniformly without replacement; each loses 20% of
//! its current target. `collected` is never touched, so a slash can push a
//! member straight past its new target and into the next exit sweep.

use std::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use eddy_core::constants::{
    GUILLOTINE_CANDIDATES, GUILLOTINE_MAX_VICTIMS, GUILLOTINE_MIN_QUEUE, SLASH_RETENTION_BPS,
};
use eddy_core::queue::QueueStore;
use eddy_core::types::{apply_bps, Amount, ParticipantId};

/// Outcome of one slashing event.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SlashReport {
    /// Slashed participants, in queue order.
    pub victims: Vec<ParticipantId>,
    /// Reduction in outstanding liability caused by the slash.
    pub liability_removed: Amount,
}

impl SlashReport {
    pub fn is_empty(&self) -> bool {
        self.victims.is_empty()
    }
}

/// Queue positions eligible for slashing, highest remaining need first.
pub fn slash_candidates(queue: &QueueStore) -> Vec<usize> {
    let mut ranked: Vec<(usize, Amount)> = queue
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.was_slashed)
        .map(|(i, p)| (i, p.remaining_need()))
        .collect();
    // Stable: equal needs keep queue order.
    ranked.sort_by_key(|&(_, need)| Reverse(need));
    ranked.truncate(GUILLOTINE_CANDIDATES);
    ranked.into_iter().map(|(i, _)| i).collect()
}

/// Run one slashing event against `queue`.
///
/// No-op when fewer than [`GUILLOTINE_MIN_QUEUE`] members are queued.
pub fn guillotine<R: Rng + ?Sized>(queue: &mut QueueStore, rng: &mut R) -> SlashReport {
    if queue.len() < GUILLOTINE_MIN_QUEUE {
        return SlashReport::default();
    }

    let candidates = slash_candidates(queue);
    let mut victims: Vec<usize> = candidates
        .choose_multiple(rng, GUILLOTINE_MAX_VICTIMS)
        .copied()
        .collect();
    victims.sort_unstable();

    let mut report = SlashReport::default();
    for index in victims {
        let Some(p) = queue.get_mut(index) else {
            continue;
        };
        let need_before = p.remaining_need();
        p.target = apply_bps(p.target, SLASH_RETENTION_BPS);
        p.was_slashed = true;
        report.liability_removed += need_before - p.remaining_need();
        report.victims.push(p.id);
    }

    info!(
        victims = report.victims.len(),
        liability_removed = report.liability_removed,
        "guillotine fired"
    );
    report
}
