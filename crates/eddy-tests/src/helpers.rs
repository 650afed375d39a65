//! Shared test helpers for scenario and property tests.

use std::collections::HashSet;
use std::sync::Arc;

use eddy_core::config::{EngineConfig, Strategy};
use eddy_core::constants::EXIT_EPSILON;
use eddy_core::traits::ManualClock;
use eddy_core::types::{Amount, Participant, ParticipantId};
use eddy_engine::Engine;

/// Fee 1%, 2.0×, STANDARD, all mechanics off.
pub fn plain_config() -> EngineConfig {
    EngineConfig {
        fee_rate_bps: 100,
        base_multiplier_bps: 20_000,
        strategy: Strategy::Standard,
        guillotine_enabled: false,
        dynamic_decay_enabled: false,
        winners_tax_enabled: false,
        ..EngineConfig::default()
    }
}

/// Every mechanic switched on, with a short guillotine interval.
pub fn hostile_config(strategy: Strategy) -> EngineConfig {
    EngineConfig {
        strategy,
        guillotine_enabled: true,
        guillotine_interval_events: 5,
        dynamic_decay_enabled: true,
        winners_tax_enabled: true,
        ..plain_config()
    }
}

/// Seeded engine on a manual clock starting at zero.
pub fn test_engine(config: EngineConfig, seed: u64) -> (Engine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    let engine = Engine::seeded(config, clock.clone(), seed).unwrap();
    (engine, clock)
}

/// Queue a participant directly with the given deposit, target, and
/// collected amounts. Uses high sequence numbers so engine-assigned ids
/// never collide.
pub fn insert_member(engine: &mut Engine, tag: u64, deposit: Amount, target: Amount, collected: Amount) {
    let mut p = Participant::new(ParticipantId::User(1_000_000 + tag), deposit, 20_000, 0, 0);
    p.target = target;
    p.collected = collected;
    engine.queue_mut().push_back(p).unwrap();
}

/// Panic if any queue invariant is broken.
pub fn assert_queue_invariants(engine: &Engine) {
    let queue = engine.queue();
    let mut seen = HashSet::new();
    for p in queue.iter() {
        assert!(seen.insert(p.id), "duplicate id {}", p.id);
        assert!(
            p.collected <= p.target + EXIT_EPSILON,
            "{} collected {} above target {}",
            p.id,
            p.collected,
            p.target
        );
        assert!(
            !p.has_reached_target(),
            "{} reached target but is still queued",
            p.id
        );
    }
}

/// Panic if any queue invariant is broken or the ledger does not reconcile.
///
/// Only meaningful for engines driven purely through deposits and
/// settlements (no direct ledger or queue edits).
pub fn assert_invariants(engine: &Engine) {
    assert_queue_invariants(engine);
    assert!(engine.ledger().reserve_reconciles(), "reserve does not reconcile");
    assert!(engine.ledger().deposits_reconcile(), "deposits do not reconcile");
}

/// `(id, target)` pairs in queue order.
pub fn targets(engine: &Engine) -> Vec<(ParticipantId, Amount)> {
    engine.queue().iter().map(|p| (p.id, p.target)).collect()
}
