//! Single-writer access to a shared engine.
//!
//! [`EngineHandle`] serializes every mutation through one `Mutex` and, after
//! each one, publishes an immutable [`Snapshot`] behind a `RwLock`. Readers
//! take the read lock on the published snapshot only, so presentation never
//! contends with the mutation path and never observes a half-applied deposit.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use eddy_core::config::EngineConfig;
use eddy_core::error::{ConfigError, EngineError};
use eddy_core::telemetry::{Snapshot, Stats};
use eddy_core::types::Amount;

use crate::engine::{DepositReceipt, Engine};
use crate::settlement::SettlementReport;

/// Cloneable, thread-safe front end to an [`Engine`].
#[derive(Clone)]
pub struct EngineHandle {
    engine: Arc<Mutex<Engine>>,
    published: Arc<RwLock<Arc<Snapshot>>>,
}

impl EngineHandle {
    /// Take ownership of `engine` and publish its initial snapshot.
    pub fn new(engine: Engine) -> Self {
        let initial = Arc::new(engine.snapshot());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            published: Arc::new(RwLock::new(initial)),
        }
    }

    fn publish(&self, engine: &Engine) {
        *self.published.write() = Arc::new(engine.snapshot());
    }

    pub fn process_deposit(
        &self,
        amount: Amount,
        is_system_seed: bool,
    ) -> Result<DepositReceipt, EngineError> {
        let mut engine = self.engine.lock();
        let receipt = engine.process_deposit(amount, is_system_seed)?;
        self.publish(&engine);
        Ok(receipt)
    }

    pub fn perform_settlement(&self) -> SettlementReport {
        let mut engine = self.engine.lock();
        let report = engine.perform_settlement();
        self.publish(&engine);
        report
    }

    pub fn reset(&self) {
        let mut engine = self.engine.lock();
        engine.reset();
        self.publish(&engine);
    }

    /// See [`Engine::reconfigure`].
    pub fn reconfigure(&self, config: EngineConfig) -> Result<bool, ConfigError> {
        let mut engine = self.engine.lock();
        let reset = engine.reconfigure(config)?;
        self.publish(&engine);
        Ok(reset)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.published.read())
    }

    /// Stats from the latest published snapshot.
    pub fn stats(&self) -> Stats {
        self.snapshot().stats.clone()
    }

    /// Run `f` against the live engine under the writer lock.
    pub fn with_engine<T>(&self, f: impl FnOnce(&Engine) -> T) -> T {
        f(&self.engine.lock())
    }
}
