//! # eddy-engine: Deposit distribution, settlement, and engine access.
//!
//! Composes the queue, ledger, and mechanics into a running engine:
//! - [`engine::Engine`]: the deposit/settlement state machine
//! - [`distribution`]: fee, pool split, yield, and head allocation
//! - [`settlement`]: principal refunds and the settlement report
//! - [`handle::EngineHandle`]: single-writer front end with published snapshots
//! - [`advisory`]: optional commentary with graceful degradation

pub mod advisory;
pub mod distribution;
pub mod engine;
pub mod handle;
pub mod settlement;

pub use advisory::{commentary, RuleBasedAdvisor, StaticAdvisor};
pub use engine::{DepositReceipt, Engine, ExitRecord};
pub use handle::EngineHandle;
pub use settlement::SettlementReport;
