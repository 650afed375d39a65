//! The deposit/settlement state machine.
//!
//! [`Engine`] owns the queue, ledger, and telemetry series and is the only
//! thing that mutates them. It is not internally synchronized; wrap it in an
//! [`EngineHandle`](crate::handle::EngineHandle) to share it across threads.
//!
//! Every mutating operation validates its input first and then runs to
//! completion, so a rejected call leaves no trace.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use eddy_core::config::EngineConfig;
use eddy_core::constants::SEED_DEPOSIT;
use eddy_core::error::{ConfigError, EngineError, QueueError};
use eddy_core::queue::QueueStore;
use eddy_core::telemetry::{Snapshot, Stats, TelemetrySample, TelemetrySeries};
use eddy_core::traits::{Clock, SystemClock};
use eddy_core::types::{saturating_sum, validate_deposit, Amount, Ledger, Participant, ParticipantId};
use eddy_mechanics::{decayed_multiplier_bps, guillotine, winners_tax, SlashReport};

use crate::distribution::{allocate_heads, compute_fee, distribute_yield, split_pools};
use crate::settlement::{refund_principal, SettlementReport};

/// A participant removed by an exit sweep.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExitRecord {
    pub id: ParticipantId,
    pub deposit: Amount,
    /// Final target; `collected` was clamped to it.
    pub target: Amount,
    /// Winners tax booked to the reserve for this exit.
    pub tax: Amount,
}

/// What one processed deposit did.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DepositReceipt {
    /// Id assigned to the new participant.
    pub id: ParticipantId,
    pub amount: Amount,
    pub fee: Amount,
    pub net: Amount,
    pub yield_pool: Amount,
    pub head_pool: Amount,
    /// Total credited to existing members.
    pub credited: Amount,
    /// Net deposit that found no recipient.
    pub unallocated: Amount,
    /// Multiplier applied to the new participant.
    pub multiplier_bps: u64,
    pub exits: Vec<ExitRecord>,
    /// Present when this deposit triggered the guillotine.
    pub slash: Option<SlashReport>,
}

/// Deposit and settlement engine.
pub struct Engine {
    config: EngineConfig,
    queue: QueueStore,
    ledger: Ledger,
    series: TelemetrySeries,
    /// Next participant sequence number; never reused until reset.
    next_seq: u64,
    clock: Arc<dyn Clock>,
    rng: Box<dyn RngCore + Send>,
}

impl Engine {
    /// Create an engine with injected time and randomness.
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            queue: QueueStore::new(),
            ledger: Ledger::default(),
            series: TelemetrySeries::default(),
            next_seq: 0,
            clock,
            rng,
        })
    }

    /// Create an engine on the wall clock with an OS-seeded RNG.
    pub fn with_entropy(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::new(
            config,
            Arc::new(SystemClock),
            Box::new(StdRng::from_entropy()),
        )
    }

    /// Create a reproducible engine: same clock readings and seed, same run.
    pub fn seeded(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(config, clock, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn queue(&self) -> &QueueStore {
        &self.queue
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn series(&self) -> &TelemetrySeries {
        &self.series
    }

    /// Mutable queue access for test setups.
    #[cfg(any(test, feature = "testing"))]
    pub fn queue_mut(&mut self) -> &mut QueueStore {
        &mut self.queue
    }

    /// Mutable ledger access for test setups.
    #[cfg(any(test, feature = "testing"))]
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Aggregate statistics. Pure read.
    pub fn stats(&self) -> Stats {
        Stats::derive(&self.config, &self.queue, &self.ledger)
    }

    /// Immutable snapshot for presentation. Pure read.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.config, &self.queue, &self.ledger, &self.series)
    }

    fn peek_id(&self, is_system_seed: bool) -> ParticipantId {
        if is_system_seed {
            ParticipantId::Protocol(self.next_seq)
        } else {
            ParticipantId::User(self.next_seq)
        }
    }

    /// Ingest one deposit.
    ///
    /// In order: count the event (slashing first when due), take the fee,
    /// split the net into yield and head pools, stamp the new participant's
    /// multiplier, credit the yield share, pay heads in FIFO order, enqueue
    /// the newcomer, sweep exits (winners tax), and record a telemetry
    /// sample.
    pub fn process_deposit(
        &mut self,
        amount: Amount,
        is_system_seed: bool,
    ) -> Result<DepositReceipt, EngineError> {
        validate_deposit(amount)?;
        let id = self.peek_id(is_system_seed);
        if self.queue.contains(&id) {
            return Err(QueueError::Duplicate(id).into());
        }
        self.next_seq += 1;

        self.ledger.event_counter = self.ledger.event_counter.saturating_add(1);
        let slash = if self.config.guillotine_enabled
            && self.ledger.event_counter % self.config.guillotine_interval_events == 0
        {
            let report = guillotine(&mut self.queue, self.rng.as_mut());
            self.ledger.total_slashed = self.ledger.total_slashed.saturating_add(report.liability_removed);
            Some(report)
        } else {
            None
        };

        let fee = if is_system_seed {
            0
        } else {
            compute_fee(amount, self.config.fee_rate_bps)
        };
        let net = amount - fee;
        // Running totals saturate rather than overflow.
        let ledger = &mut self.ledger;
        ledger.reserve_balance = ledger.reserve_balance.saturating_add(fee);
        ledger.total_fees = ledger.total_fees.saturating_add(fee);
        ledger.total_deposited = ledger.total_deposited.saturating_add(amount);

        let (yield_pool, head_pool) = split_pools(net, self.config.strategy);

        let multiplier_bps = if self.config.dynamic_decay_enabled && !is_system_seed {
            decayed_multiplier_bps(self.config.base_multiplier_bps, self.queue.len())
        } else {
            self.config.base_multiplier_bps
        };
        let now_ms = self.clock.now_ms();
        let participant = Participant::new(
            id,
            amount,
            multiplier_bps,
            self.ledger.current_epoch,
            now_ms,
        );

        let shared = distribute_yield(&mut self.queue, yield_pool);
        let heads = allocate_heads(&mut self.queue, head_pool + shared.leftover);
        let credited = shared.credited + heads.credited;
        self.ledger.total_paid_out = self.ledger.total_paid_out.saturating_add(credited);
        self.ledger.total_unallocated = self.ledger.total_unallocated.saturating_add(heads.leftover);

        self.queue.push_back(participant)?;

        let exits = self.sweep_exits(now_ms, is_system_seed);

        let liability = self.queue.outstanding_liability();
        self.series.push(TelemetrySample {
            cumulative_deposited: self.ledger.total_deposited,
            queue_length: self.queue.len(),
            outstanding_liability: liability,
        });

        debug!(
            %id,
            amount,
            fee,
            credited,
            unallocated = heads.leftover,
            exits = exits.len(),
            queue_len = self.queue.len(),
            "deposit processed"
        );

        Ok(DepositReceipt {
            id,
            amount,
            fee,
            net,
            yield_pool,
            head_pool,
            credited,
            unallocated: heads.leftover,
            multiplier_bps,
            exits,
            slash,
        })
    }

    fn sweep_exits(&mut self, now_ms: u64, is_system_seed: bool) -> Vec<ExitRecord> {
        let taxed = self.config.winners_tax_enabled && !is_system_seed;
        let window_ms = self.config.fast_exit_window_ms;
        let mut records = Vec::new();
        for p in self.queue.sweep_exited() {
            let tax = if taxed {
                winners_tax(&p, now_ms, window_ms)
            } else {
                0
            };
            let ledger = &mut self.ledger;
            ledger.reserve_balance = ledger.reserve_balance.saturating_add(tax);
            ledger.total_taxes = ledger.total_taxes.saturating_add(tax);
            ledger.exited_count = ledger.exited_count.saturating_add(1);
            ledger.exited_value_sum = ledger.exited_value_sum.saturating_add(p.target);
            records.push(ExitRecord {
                id: p.id,
                deposit: p.deposit,
                target: p.target,
                tax,
            });
        }
        records
    }

    /// Midnight reset: refund principal from the reserve surplus, wipe the
    /// queue, advance the epoch, and reseed from the reserve if it can
    /// afford [`SEED_DEPOSIT`].
    pub fn perform_settlement(&mut self) -> SettlementReport {
        let surplus = self
            .ledger
            .reserve_balance
            .saturating_sub(self.config.reserve_floor);
        let (refunded, refunded_participants) = refund_principal(&mut self.queue, surplus);
        // Reserve ends at `floor + unspent surplus`; a shortfall below the
        // floor is topped up by the protocol.
        let floor_topup = self
            .config
            .reserve_floor
            .saturating_sub(self.ledger.reserve_balance);
        self.ledger.reserve_balance = self.config.reserve_floor + (surplus - refunded);
        self.ledger.total_floor_topups = self.ledger.total_floor_topups.saturating_add(floor_topup);
        self.ledger.total_refunded = self.ledger.total_refunded.saturating_add(refunded);
        self.ledger.total_paid_out = self.ledger.total_paid_out.saturating_add(refunded);

        let wiped = self.queue.clear();
        let forfeited = saturating_sum(wiped.iter().map(Participant::remaining_need));
        self.ledger.total_forfeited = self.ledger.total_forfeited.saturating_add(forfeited);
        self.ledger.current_epoch += 1;

        let reseed = if self.ledger.reserve_balance >= SEED_DEPOSIT {
            self.ledger.reserve_balance -= SEED_DEPOSIT;
            self.ledger.total_seeded = self.ledger.total_seeded.saturating_add(SEED_DEPOSIT);
            match self.process_deposit(SEED_DEPOSIT, true) {
                Ok(receipt) => Some(receipt),
                Err(e) => {
                    warn!("reseed rejected: {e}");
                    self.ledger.reserve_balance += SEED_DEPOSIT;
                    self.ledger.total_seeded -= SEED_DEPOSIT;
                    None
                }
            }
        } else {
            None
        };

        info!(
            epoch = self.ledger.current_epoch,
            surplus,
            refunded,
            floor_topup,
            wiped = wiped.len(),
            forfeited,
            reseeded = reseed.is_some(),
            reserve = self.ledger.reserve_balance,
            "settlement complete"
        );

        SettlementReport {
            epoch: self.ledger.current_epoch,
            surplus,
            refunded,
            refunded_participants,
            floor_topup,
            wiped_count: wiped.len() as u64,
            forfeited,
            reseed,
        }
    }

    /// Return to the initial empty state, keeping configuration, clock, and
    /// RNG.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.ledger = Ledger::default();
        self.series.clear();
        self.next_seq = 0;
        info!("engine reset");
    }

    /// Apply a new configuration.
    ///
    /// Changing strategy or base multiplier resets the engine, since queued
    /// targets were computed under the old values. Returns whether a reset
    /// happened. An invalid configuration leaves the engine untouched.
    pub fn reconfigure(&mut self, config: EngineConfig) -> Result<bool, ConfigError> {
        config.validate()?;
        let needs_reset = self.config.requires_reset(&config);
        self.config = config;
        if needs_reset {
            self.reset();
        }
        info!(
            strategy = %self.config.strategy,
            multiplier_bps = self.config.base_multiplier_bps,
            reset = needs_reset,
            "engine reconfigured"
        );
        Ok(needs_reset)
    }
}
