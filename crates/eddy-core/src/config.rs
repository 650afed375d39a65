//! Engine configuration.
//!
//! Provides [`EngineConfig`] with validated ranges for every tunable the
//! engine reads. Values can be built programmatically or deserialized
//! (missing fields fall back to defaults) and must pass
//! [`EngineConfig::validate`] before an engine accepts them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    DEFAULT_FAST_EXIT_WINDOW_MS, DEFAULT_FEE_RATE_BPS, DEFAULT_GUILLOTINE_INTERVAL,
    DEFAULT_MULTIPLIER_BPS, DEFAULT_RESERVE_FLOOR, MAX_DEPOSIT, MAX_FEE_RATE_BPS,
    MAX_MULTIPLIER_BPS, MIN_FEE_RATE_BPS, MIN_MULTIPLIER_BPS,
};
use crate::error::ConfigError;

/// How a net deposit is divided between the queue as a whole and its head.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// The whole net deposit pays queue heads in order.
    #[default]
    Standard,
    /// A fifth of the net deposit is shared by every queued member first.
    CommunityYield,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("STANDARD"),
            Self::CommunityYield => f.write_str("COMMUNITY_YIELD"),
        }
    }
}

/// The optional adverse mechanics, each independently switchable.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Toggles {
    pub guillotine: bool,
    pub dynamic_decay: bool,
    pub winners_tax: bool,
}

/// Configuration for an engine instance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Fraction of each non-system deposit sent to the reserve, in BPS.
    pub fee_rate_bps: u64,
    /// Target multiple of a deposit before decay, in BPS.
    pub base_multiplier_bps: u64,
    pub strategy: Strategy,
    pub guillotine_enabled: bool,
    pub dynamic_decay_enabled: bool,
    pub winners_tax_enabled: bool,
    /// Processed deposits between slashing events.
    pub guillotine_interval_events: u64,
    /// Reserve kept back when settlement refunds surplus.
    pub reserve_floor: u64,
    /// Exits faster than this after entry pay the winners tax.
    pub fast_exit_window_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_rate_bps: DEFAULT_FEE_RATE_BPS,
            base_multiplier_bps: DEFAULT_MULTIPLIER_BPS,
            strategy: Strategy::Standard,
            guillotine_enabled: false,
            dynamic_decay_enabled: false,
            winners_tax_enabled: false,
            guillotine_interval_events: DEFAULT_GUILLOTINE_INTERVAL,
            reserve_floor: DEFAULT_RESERVE_FLOOR,
            fast_exit_window_ms: DEFAULT_FAST_EXIT_WINDOW_MS,
        }
    }
}

impl EngineConfig {
    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FEE_RATE_BPS..=MAX_FEE_RATE_BPS).contains(&self.fee_rate_bps) {
            return Err(ConfigError::FeeRateOutOfRange {
                bps: self.fee_rate_bps,
                min: MIN_FEE_RATE_BPS,
                max: MAX_FEE_RATE_BPS,
            });
        }
        if !(MIN_MULTIPLIER_BPS..=MAX_MULTIPLIER_BPS).contains(&self.base_multiplier_bps) {
            return Err(ConfigError::MultiplierOutOfRange {
                bps: self.base_multiplier_bps,
                min: MIN_MULTIPLIER_BPS,
                max: MAX_MULTIPLIER_BPS,
            });
        }
        if self.guillotine_interval_events == 0 {
            return Err(ConfigError::ZeroGuillotineInterval);
        }
        if self.reserve_floor > MAX_DEPOSIT {
            return Err(ConfigError::ReserveFloorTooLarge(self.reserve_floor));
        }
        Ok(())
    }

    /// Current toggle state.
    pub fn toggles(&self) -> Toggles {
        Toggles {
            guillotine: self.guillotine_enabled,
            dynamic_decay: self.dynamic_decay_enabled,
            winners_tax: self.winners_tax_enabled,
        }
    }

    /// Whether switching from `self` to `next` invalidates in-flight targets.
    ///
    /// Strategy and base multiplier shape every queued target, so changing
    /// either one needs a full engine reset.
    pub fn requires_reset(&self, next: &EngineConfig) -> bool {
        self.strategy != next.strategy || self.base_multiplier_bps != next.base_multiplier_bps
    }
}
