//! Trait interfaces for the Eddy protocol.
//!
//! These traits define the seams between the engine and its environment:
//! - [`Clock`]: source of "now" for entry timestamps and fast-exit checks
//! - [`Advisor`]: optional commentary collaborator fed with stats snapshots

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::error::AdvisoryError;
use crate::telemetry::Stats;

/// Millisecond time source.
///
/// Injected into the engine so tests can control elapsed time exactly.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Wall clock backed by `chrono`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Manually advanced clock for deterministic runs.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: AtomicU64::new(start_ms),
        }
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Produces free-text commentary about the protocol's state.
///
/// The engine never depends on an advisor being present; callers degrade to
/// [`ADVISORY_UNAVAILABLE`](crate::constants::ADVISORY_UNAVAILABLE) on absence
/// or failure.
#[async_trait]
pub trait Advisor: Send + Sync {
    /// Comment on `stats`, optionally steered by free-text `context`.
    async fn analyze(&self, stats: &Stats, context: &str) -> Result<String, AdvisoryError>;
}
