//! # eddy-mechanics: Optional adverse queue mechanics.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! Each mechanic is independently toggleable by the engine:
//! - **Guillotine**: every N processed deposits, up to 10 of the 30 largest
//!   outstanding liabilities lose 20% of their target.
//! - **Dynamic decay**: the multiplier granted to new entrants drops 0.05×
//!   per 10 queued participants, floored at 1.1×.
//! - **Winners tax**: fast exits pay 20% of their profit into the reserve.

pub mod decay;
pub mod guillotine;
pub mod winners_tax;

pub use decay::decayed_multiplier_bps;
pub use guillotine::{guillotine, slash_candidates, SlashReport};
pub use winners_tax::{is_fast_exit, winners_tax};
