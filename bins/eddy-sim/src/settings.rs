//! Simulator configuration.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, then
//! `EDDY__*` environment variables (`EDDY__ENGINE__FEE_RATE_BPS=250`,
//! `EDDY__DEPOSIT_INTERVAL_MS=50`). CLI flags are applied on top by `main`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use eddy_core::config::EngineConfig;
use eddy_core::types::{amount_from_units, Amount};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "EDDY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Engine rules for the run.
    pub engine: EngineConfig,
    /// Smallest random deposit, in whole units.
    pub min_deposit: f64,
    /// Largest random deposit, in whole units.
    pub max_deposit: f64,
    /// Delay between deposits.
    pub deposit_interval_ms: u64,
    /// Delay between settlements.
    pub settlement_interval_ms: u64,
    /// Delay between stats log lines.
    pub stats_interval_ms: u64,
    /// Stop after this many accepted deposits (0 runs until Ctrl+C).
    pub max_deposits: u64,
    /// Seed for deposit amounts and slashing; OS entropy when unset.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            min_deposit: 10.0,
            max_deposit: 500.0,
            deposit_interval_ms: 200,
            settlement_interval_ms: 60_000,
            stats_interval_ms: 5_000,
            max_deposits: 0,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Load from `path` (if given) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from `path` (if given) and an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings = builder
            .add_source(env.separator("__").try_parsing(true))
            .build()
            .context("failed to read simulator configuration")?;
        let config: SimConfig = settings
            .try_deserialize()
            .context("invalid simulator configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check engine rules, the deposit range, and the cadences.
    pub fn validate(&self) -> Result<()> {
        self.engine.validate().context("invalid engine configuration")?;
        let (min, max) = self.deposit_range()?;
        if min > max {
            bail!(
                "min_deposit {} exceeds max_deposit {}",
                self.min_deposit,
                self.max_deposit
            );
        }
        for (name, ms) in [
            ("deposit_interval_ms", self.deposit_interval_ms),
            ("settlement_interval_ms", self.settlement_interval_ms),
            ("stats_interval_ms", self.stats_interval_ms),
        ] {
            if ms == 0 {
                bail!("{name} must be positive");
            }
        }
        Ok(())
    }

    /// Deposit bounds in micro-units.
    pub fn deposit_range(&self) -> Result<(Amount, Amount)> {
        let min = amount_from_units(self.min_deposit).context("invalid min_deposit")?;
        let max = amount_from_units(self.max_deposit).context("invalid max_deposit")?;
        Ok((min, max))
    }
}
