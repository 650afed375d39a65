//! FIFO participant queue.
//!
//! The queue holds participants in arrival order, which is also payout
//! priority order. It provides:
//! - O(1) append at the tail with duplicate-id rejection
//! - in-place mutation of any member
//! - order-preserving removal of members that reached their target
//!
//! Not thread-safe; the engine owns it and serializes all access.

use std::collections::{HashSet, VecDeque};

use crate::error::QueueError;
use crate::types::{saturating_sum, Amount, Participant, ParticipantId};

/// Ordered collection of queued participants.
#[derive(Debug, Clone, Default)]
pub struct QueueStore {
    entries: VecDeque<Participant>,
    ids: HashSet<ParticipantId>,
}

impl QueueStore {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a participant with `id` is queued.
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.ids.contains(id)
    }

    /// The participant first in line for payout.
    pub fn head(&self) -> Option<&Participant> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&Participant> {
        self.entries.get(index)
    }

    /// Append a participant at the tail.
    pub fn push_back(&mut self, participant: Participant) -> Result<(), QueueError> {
        if !self.ids.insert(participant.id) {
            return Err(QueueError::Duplicate(participant.id));
        }
        self.entries.push_back(participant);
        Ok(())
    }

    /// Iterate in payout order.
    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.entries.iter()
    }

    /// Iterate mutably in payout order.
    ///
    /// Callers must not change `id` through this iterator.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Participant> {
        self.entries.iter_mut()
    }

    /// Mutable access by position.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Participant> {
        self.entries.get_mut(index)
    }

    /// Remove every participant that reached its target, preserving the
    /// relative order of those that remain. Removed participants are
    /// returned in queue order with `collected` clamped to `target`.
    pub fn sweep_exited(&mut self) -> Vec<Participant> {
        let mut exited = Vec::new();
        let mut kept = VecDeque::with_capacity(self.entries.len());
        for mut p in self.entries.drain(..) {
            if p.has_reached_target() {
                self.ids.remove(&p.id);
                p.collected = p.collected.min(p.target);
                exited.push(p);
            } else {
                kept.push_back(p);
            }
        }
        self.entries = kept;
        exited
    }

    /// Remove and return every participant.
    pub fn clear(&mut self) -> Vec<Participant> {
        self.ids.clear();
        self.entries.drain(..).collect()
    }

    /// Sum of `target - collected` over the queue, saturating at
    /// `u64::MAX`.
    pub fn outstanding_liability(&self) -> Amount {
        saturating_sum(self.entries.iter().map(Participant::remaining_need))
    }

    /// Sum of `collected` over the queue, saturating at `u64::MAX`.
    pub fn total_collected(&self) -> Amount {
        saturating_sum(self.entries.iter().map(|p| p.collected))
    }

    /// Clone of the first `limit` participants.
    pub fn front_slice(&self, limit: usize) -> Vec<Participant> {
        self.entries.iter().take(limit).cloned().collect()
    }
}
