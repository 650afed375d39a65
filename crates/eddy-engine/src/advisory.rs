//! Advisory commentary over engine stats.
//!
//! The engine never requires an advisor. [`commentary`] turns a missing or
//! failing advisor into the fixed [`ADVISORY_UNAVAILABLE`] message.

use async_trait::async_trait;
use tracing::warn;

use eddy_core::constants::{ADVISORY_UNAVAILABLE, BPS_PRECISION};
use eddy_core::error::AdvisoryError;
use eddy_core::telemetry::Stats;
use eddy_core::traits::Advisor;
use eddy_core::types::format_amount;

/// Ask `advisor` for commentary, degrading to the fixed unavailable message.
pub async fn commentary(advisor: Option<&dyn Advisor>, stats: &Stats, context: &str) -> String {
    let Some(advisor) = advisor else {
        return ADVISORY_UNAVAILABLE.to_string();
    };
    match advisor.analyze(stats, context).await {
        Ok(text) => text,
        Err(e) => {
            warn!("advisory degraded: {e}");
            ADVISORY_UNAVAILABLE.to_string()
        }
    }
}

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct StaticAdvisor {
    text: String,
}

impl StaticAdvisor {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl Advisor for StaticAdvisor {
    async fn analyze(&self, _stats: &Stats, _context: &str) -> Result<String, AdvisoryError> {
        Ok(self.text.clone())
    }
}

/// Offline advisor that reads solvency signals straight off the stats.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

/// Liability above this multiple of the reserve is flagged (10×).
const STRAINED_COVERAGE_BPS: u64 = 10 * BPS_PRECISION;

impl RuleBasedAdvisor {
    fn assess(stats: &Stats) -> &'static str {
        if stats.queued_count == 0 {
            return "Queue is empty; nothing is owed.";
        }
        match stats.liability_coverage_bps() {
            None => "Reserve is empty; every queued claim depends on new deposits.",
            Some(bps) if bps > STRAINED_COVERAGE_BPS => {
                "Outstanding liability dwarfs the reserve; late entrants are unlikely to be paid in full."
            }
            Some(_) => "Reserve covers a meaningful share of outstanding liability.",
        }
    }
}

#[async_trait]
impl Advisor for RuleBasedAdvisor {
    async fn analyze(&self, stats: &Stats, context: &str) -> Result<String, AdvisoryError> {
        let mut lines = Vec::new();
        if !context.trim().is_empty() {
            lines.push(format!("Context: {}", context.trim()));
        }
        lines.push(format!(
            "Epoch {}: {} queued, {} exited, strategy {} at {}x.",
            stats.current_epoch,
            stats.queued_count,
            stats.exited_count,
            stats.strategy,
            stats.base_multiplier_bps as f64 / BPS_PRECISION as f64,
        ));
        lines.push(format!(
            "Deposited {}, paid out {}, owed {}, reserve {}.",
            format_amount(stats.total_deposited),
            format_amount(stats.total_paid_out),
            format_amount(stats.outstanding_liability),
            format_amount(stats.reserve_balance),
        ));
        lines.push(Self::assess(stats).to_string());
        let toggles = stats.toggles;
        let active: Vec<&str> = [
            (toggles.guillotine, "guillotine"),
            (toggles.dynamic_decay, "dynamic decay"),
            (toggles.winners_tax, "winners tax"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect();
        if !active.is_empty() {
            lines.push(format!("Active mechanics: {}.", active.join(", ")));
        }
        Ok(lines.join("\n"))
    }
}
