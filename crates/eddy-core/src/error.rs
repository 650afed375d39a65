//! Error types for the Eddy protocol.
use thiserror::Error;

use crate::types::ParticipantId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("fee rate {bps} bps outside [{min}, {max}]")] FeeRateOutOfRange { bps: u64, min: u64, max: u64 },
    #[error("base multiplier {bps} bps outside [{min}, {max}]")] MultiplierOutOfRange { bps: u64, min: u64, max: u64 },
    #[error("guillotine interval must be at least one event")] ZeroGuillotineInterval,
    #[error("reserve floor {0} exceeds maximum deposit")] ReserveFloorTooLarge(u64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepositError {
    #[error("deposit must be positive")] NonPositive,
    #[error("deposit is not a finite number: {0}")] NonFinite(f64),
    #[error("deposit {amount} exceeds maximum {max}")] TooLarge { amount: u64, max: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("participant already queued: {0}")] Duplicate(ParticipantId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryError {
    #[error("advisor unavailable")] Unavailable,
    #[error("advisor failed: {0}")] Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)] Config(#[from] ConfigError),
    #[error(transparent)] Deposit(#[from] DepositError),
    #[error(transparent)] Queue(#[from] QueueError),
}
