//! Protocol constants. All monetary values in micro-units (1 unit = 10^6 micro-units).

/// One whole currency unit.
pub const UNIT: u64 = 1_000_000;

/// Basis points precision: 10 000 BPS = 1.0×.
pub const BPS_PRECISION: u64 = 10_000;

/// Largest single deposit accepted by the engine.
///
/// Keeps `deposit × MAX_MULTIPLIER_BPS` comfortably inside `u64` so target
/// computation never overflows.
pub const MAX_DEPOSIT: u64 = 1_000_000_000 * UNIT;

// ---------------------------------------------------------------------------
// Fees
// ---------------------------------------------------------------------------

/// Lowest configurable fee rate (0%).
pub const MIN_FEE_RATE_BPS: u64 = 0;

/// Highest configurable fee rate (10%).
pub const MAX_FEE_RATE_BPS: u64 = 1_000;

/// Default fee rate (1%).
pub const DEFAULT_FEE_RATE_BPS: u64 = 100;

/// Floor applied to the fee itself on every non-system deposit.
pub const MIN_FEE: u64 = UNIT;

// ---------------------------------------------------------------------------
// Multipliers
// ---------------------------------------------------------------------------

/// Lowest configurable base multiplier (1.1×).
pub const MIN_MULTIPLIER_BPS: u64 = 11_000;

/// Highest configurable base multiplier (3.0×).
pub const MAX_MULTIPLIER_BPS: u64 = 30_000;

/// Default base multiplier (2.0×).
pub const DEFAULT_MULTIPLIER_BPS: u64 = 20_000;

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Share of each net deposit spread across all queued members under
/// community yield (20%).
pub const COMMUNITY_YIELD_BPS: u64 = 2_000;

/// A participant has exited once `collected >= target - EXIT_EPSILON` (0.01 unit).
pub const EXIT_EPSILON: u64 = UNIT / 100;

// ---------------------------------------------------------------------------
// Dynamic decay
// ---------------------------------------------------------------------------

/// Multiplier reduction per full block of queued participants (0.05×).
pub const DECAY_STEP_BPS: u64 = 500;

/// Number of queued participants per decay step.
pub const DECAY_BLOCK_SIZE: usize = 10;

/// Decay never pushes the effective multiplier below 1.1×.
pub const MIN_DECAYED_MULTIPLIER_BPS: u64 = 11_000;

// ---------------------------------------------------------------------------
// Guillotine
// ---------------------------------------------------------------------------

/// Default number of processed deposits between slashing events.
pub const DEFAULT_GUILLOTINE_INTERVAL: u64 = 60;

/// Slashing is skipped while fewer members than this are queued.
pub const GUILLOTINE_MIN_QUEUE: usize = 5;

/// Size of the highest-liability candidate pool.
pub const GUILLOTINE_CANDIDATES: usize = 30;

/// Maximum victims drawn from the candidate pool per event.
pub const GUILLOTINE_MAX_VICTIMS: usize = 10;

/// Fraction of the current target a victim keeps (80%).
pub const SLASH_RETENTION_BPS: u64 = 8_000;

// ---------------------------------------------------------------------------
// Winners tax
// ---------------------------------------------------------------------------

/// Tax on realized profit for fast exits (20%).
pub const WINNERS_TAX_BPS: u64 = 2_000;

/// Default fast-exit window in milliseconds (10 seconds).
pub const DEFAULT_FAST_EXIT_WINDOW_MS: u64 = 10_000;

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Default reserve retained through settlement refunds.
pub const DEFAULT_RESERVE_FLOOR: u64 = 1_000 * UNIT;

/// Amount the protocol deposits to reseed the queue after settlement.
pub const SEED_DEPOSIT: u64 = 100 * UNIT;

// ---------------------------------------------------------------------------
// Telemetry
// ---------------------------------------------------------------------------

/// Maximum samples kept in the telemetry series.
pub const TELEMETRY_SERIES_CAP: usize = 100;

/// Maximum queue entries included in a snapshot.
pub const SNAPSHOT_QUEUE_LIMIT: usize = 50;

/// Commentary returned when no advisor is available or it fails.
pub const ADVISORY_UNAVAILABLE: &str = "Advisory analysis unavailable.";
