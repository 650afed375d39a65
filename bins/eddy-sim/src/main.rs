//! Eddy simulator binary.
//!
//! Feeds a randomized deposit stream into the engine, runs the midnight
//! reset on a timer, logs stats periodically, and on exit prints the final
//! snapshot as JSON followed by advisory commentary.

mod settings;
mod driver;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use eddy_core::config::Strategy;
use eddy_core::traits::Advisor;
use eddy_engine::{commentary, RuleBasedAdvisor};

use crate::settings::SimConfig;
use crate::driver::Simulation;

/// Eddy pay-it-forward queue simulator.
#[derive(Parser, Debug)]
#[command(name = "eddy-sim", version, about = "Queue-based pay-it-forward deposit simulator")]
struct Args {
    /// TOML configuration file (EDDY__* environment variables override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many accepted deposits (0 runs until Ctrl+C)
    #[arg(long)]
    max_deposits: Option<u64>,

    /// Payout strategy ("standard" or "community-yield")
    #[arg(long, value_parser = parse_strategy)]
    strategy: Option<Strategy>,

    /// Free-text context passed to the advisor
    #[arg(long, default_value = "")]
    context: String,

    /// Write the final snapshot here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    /// Apply CLI overrides on top of the layered configuration.
    fn apply(&self, config: &mut SimConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max) = self.max_deposits {
            config.max_deposits = max;
        }
        if let Some(strategy) = self.strategy {
            config.engine.strategy = strategy;
        }
    }
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    match s.to_ascii_lowercase().replace('_', "-").as_str() {
        "standard" => Ok(Strategy::Standard),
        "community-yield" => Ok(Strategy::CommunityYield),
        other => Err(format!("unknown strategy: {other}")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    let mut config = SimConfig::load(args.config.as_deref())?;
    args.apply(&mut config);

    info!("Eddy simulator v{}", env!("CARGO_PKG_VERSION"));
    info!(
        strategy = %config.engine.strategy,
        multiplier_bps = config.engine.base_multiplier_bps,
        fee_rate_bps = config.engine.fee_rate_bps,
        guillotine = config.engine.guillotine_enabled,
        decay = config.engine.dynamic_decay_enabled,
        winners_tax = config.engine.winners_tax_enabled,
        "engine configured"
    );

    let mut sim = Simulation::new(config)?;
    let shutdown = async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
        }
    };
    let summary = sim.run(shutdown).await;
    info!(
        deposits = summary.deposits,
        rejected = summary.rejected,
        settlements = summary.settlements,
        "simulation finished"
    );

    let snapshot = sim.handle().snapshot();
    let json = serde_json::to_string_pretty(&*snapshot).context("failed to encode snapshot")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("snapshot written to {}", path.display());
        }
        None => println!("{json}"),
    }

    let advisor = RuleBasedAdvisor;
    let text = commentary(Some(&advisor as &dyn Advisor), &snapshot.stats, &args.context).await;
    println!("{text}");
    Ok(())
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Logs go to stderr so stdout carries only the snapshot and commentary.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
