//! Timed deposit and settlement loop.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use eddy_core::telemetry::Stats;
use eddy_core::traits::SystemClock;
use eddy_core::types::{format_amount, Amount};
use eddy_engine::{Engine, EngineHandle};

use crate::settings::SimConfig;

/// Counters for one simulator run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub deposits: u64,
    pub rejected: u64,
    pub settlements: u64,
}

pub struct Simulation {
    handle: EngineHandle,
    amounts: Uniform<Amount>,
    rng: StdRng,
    config: SimConfig,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let (min, max) = config.deposit_range()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        // Offset so deposit amounts and slash draws use separate streams.
        let engine = Engine::seeded(config.engine.clone(), Arc::new(SystemClock), seed ^ 0x5eed)?;
        info!(seed, "simulation seeded");
        Ok(Self {
            handle: EngineHandle::new(engine),
            amounts: Uniform::new_inclusive(min, max),
            rng: StdRng::seed_from_u64(seed),
            config,
        })
    }

    pub fn handle(&self) -> &EngineHandle {
        &self.handle
    }

    fn deposit_once(&mut self, summary: &mut RunSummary) {
        let amount = self.amounts.sample(&mut self.rng);
        match self.handle.process_deposit(amount, false) {
            Ok(receipt) => {
                summary.deposits += 1;
                debug!(
                    id = %receipt.id,
                    amount = %format_amount(amount),
                    exits = receipt.exits.len(),
                    "deposit accepted"
                );
            }
            Err(e) => {
                summary.rejected += 1;
                warn!("deposit rejected: {e}");
            }
        }
    }

    fn done(&self, summary: &RunSummary) -> bool {
        self.config.max_deposits > 0 && summary.deposits >= self.config.max_deposits
    }

    /// Drive deposits, settlements, and stats logging until `shutdown`
    /// resolves or `max_deposits` deposits are accepted.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut deposits = interval(Duration::from_millis(self.config.deposit_interval_ms));
        deposits.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let settle_every = Duration::from_millis(self.config.settlement_interval_ms);
        let mut settlements = interval_at(Instant::now() + settle_every, settle_every);
        let stats_every = Duration::from_millis(self.config.stats_interval_ms);
        let mut reports = interval_at(Instant::now() + stats_every, stats_every);

        tokio::pin!(shutdown);
        while !self.done(&summary) {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                _ = deposits.tick() => self.deposit_once(&mut summary),
                _ = settlements.tick() => {
                    let report = self.handle.perform_settlement();
                    summary.settlements += 1;
                    info!(
                        epoch = report.epoch,
                        refunded = %format_amount(report.refunded),
                        wiped = report.wiped_count,
                        "midnight reset"
                    );
                }
                _ = reports.tick() => log_stats(&self.handle.stats()),
            }
        }
        log_stats(&self.handle.stats());
        summary
    }
}

/// Emit one structured stats line.
pub fn log_stats(stats: &Stats) {
    info!(
        epoch = stats.current_epoch,
        events = stats.event_counter,
        queued = stats.queued_count,
        exited = stats.exited_count,
        deposited = %format_amount(stats.total_deposited),
        paid_out = %format_amount(stats.total_paid_out),
        owed = %format_amount(stats.outstanding_liability),
        reserve = %format_amount(stats.reserve_balance),
        "stats"
    );
}
