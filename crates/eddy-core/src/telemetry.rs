//! Read-only aggregates derived from the queue and ledger.
//!
//! Nothing here mutates engine state: [`Stats::derive`] and
//! [`Snapshot::capture`] are pure functions of their inputs, so calling them
//! twice without an intervening mutation yields equal values.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, Strategy, Toggles};
use crate::constants::{SNAPSHOT_QUEUE_LIMIT, TELEMETRY_SERIES_CAP};
use crate::queue::QueueStore;
use crate::types::{Amount, Ledger, Participant};

/// One point of the deposit-by-deposit time series.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TelemetrySample {
    pub cumulative_deposited: Amount,
    pub queue_length: usize,
    pub outstanding_liability: Amount,
}

/// Bounded series of samples; the oldest sample is evicted once the cap is
/// exceeded.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TelemetrySeries {
    samples: VecDeque<TelemetrySample>,
    cap: usize,
}

impl Default for TelemetrySeries {
    fn default() -> Self {
        Self::with_cap(TELEMETRY_SERIES_CAP)
    }
}

impl TelemetrySeries {
    /// Create an empty series holding at most `cap` samples.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(cap.saturating_add(1)),
            cap,
        }
    }

    pub fn push(&mut self, sample: TelemetrySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.cap {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Samples, oldest first.
    pub fn to_vec(&self) -> Vec<TelemetrySample> {
        self.samples.iter().copied().collect()
    }
}

/// Aggregate view of the engine for presentation and advisory consumers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Stats {
    pub total_deposited: Amount,
    pub total_paid_out: Amount,
    /// Exited plus currently queued participants.
    pub total_users: u64,
    pub exited_count: u64,
    pub exited_value_sum: Amount,
    pub queued_count: u64,
    pub current_epoch: u64,
    pub event_counter: u64,
    pub strategy: Strategy,
    pub base_multiplier_bps: u64,
    pub toggles: Toggles,
    pub reserve_balance: Amount,
    pub outstanding_liability: Amount,
}

impl Stats {
    pub fn derive(config: &EngineConfig, queue: &QueueStore, ledger: &Ledger) -> Self {
        let queued_count = queue.len() as u64;
        Self {
            total_deposited: ledger.total_deposited,
            total_paid_out: ledger.total_paid_out,
            total_users: ledger.exited_count + queued_count,
            exited_count: ledger.exited_count,
            exited_value_sum: ledger.exited_value_sum,
            queued_count,
            current_epoch: ledger.current_epoch,
            event_counter: ledger.event_counter,
            strategy: config.strategy,
            base_multiplier_bps: config.base_multiplier_bps,
            toggles: config.toggles(),
            reserve_balance: ledger.reserve_balance,
            outstanding_liability: queue.outstanding_liability(),
        }
    }

    /// Outstanding liability per unit of reserve, in BPS. `None` with an
    /// empty reserve.
    pub fn liability_coverage_bps(&self) -> Option<u64> {
        if self.reserve_balance == 0 {
            return None;
        }
        let ratio = (self.outstanding_liability as u128) * 10_000 / self.reserve_balance as u128;
        Some(ratio.min(u64::MAX as u128) as u64)
    }
}

/// Immutable picture of the engine handed to presentation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub queue_head: Option<Participant>,
    /// The first [`SNAPSHOT_QUEUE_LIMIT`] participants.
    pub queue: Vec<Participant>,
    pub stats: Stats,
    pub series: Vec<TelemetrySample>,
}

impl Snapshot {
    pub fn capture(
        config: &EngineConfig,
        queue: &QueueStore,
        ledger: &Ledger,
        series: &TelemetrySeries,
    ) -> Self {
        Self {
            queue_head: queue.head().cloned(),
            queue: queue.front_slice(SNAPSHOT_QUEUE_LIMIT),
            stats: Stats::derive(config, queue, ledger),
            series: series.to_vec(),
        }
    }
}
