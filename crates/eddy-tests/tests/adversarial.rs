//! Adversarial property-based test suite for the Eddy engine.
//!
//! Randomized deposit, seed, settlement, and clock sequences are thrown at
//! engines with every combination of mechanics switched on, and the queue
//! and ledger invariants are checked after every single operation.
//!
//! Attack vectors tested:
//! - Payout overshoot (collected above target, or a paid-up member left queued)
//! - Duplicate identities after slashing, sweeping, and reseeding
//! - Target inflation (slashing may only lower a target)
//! - Queue reordering (FIFO must survive every mutation)
//! - Ledger drift (reserve and deposits must reconcile at all times)
//! - Unbounded telemetry growth
//! - Invalid deposits mutating state

use std::collections::HashMap;

use proptest::prelude::*;

use eddy_core::config::{EngineConfig, Strategy as PayoutStrategy};
use eddy_core::constants::*;
use eddy_core::traits::ManualClock;
use eddy_core::types::{amount_from_units, units, Amount, ParticipantId};
use eddy_engine::Engine;
use eddy_tests::helpers::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Op {
    Deposit(Amount),
    Seed(Amount),
    Settle,
    Tick(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (1u64..=units(5_000)).prop_map(Op::Deposit),
        1 => (1u64..=units(500)).prop_map(Op::Seed),
        1 => Just(Op::Settle),
        2 => (0u64..20_000).prop_map(Op::Tick),
    ]
}

fn payout_strategy() -> impl Strategy<Value = PayoutStrategy> {
    prop_oneof![Just(PayoutStrategy::Standard), Just(PayoutStrategy::CommunityYield)]
}

fn engine_config() -> impl Strategy<Value = EngineConfig> {
    (
        MIN_FEE_RATE_BPS..=MAX_FEE_RATE_BPS,
        MIN_MULTIPLIER_BPS..=MAX_MULTIPLIER_BPS,
        payout_strategy(),
        any::<(bool, bool, bool)>(),
        1u64..=20,
        0u64..=units(2_000),
    )
        .prop_map(
            |(fee, multiplier, strategy, (guillotine, decay, tax), interval, floor)| EngineConfig {
                fee_rate_bps: fee,
                base_multiplier_bps: multiplier,
                strategy,
                guillotine_enabled: guillotine,
                dynamic_decay_enabled: decay,
                winners_tax_enabled: tax,
                guillotine_interval_events: interval,
                reserve_floor: floor,
                ..EngineConfig::default()
            },
        )
}

fn ids(engine: &Engine) -> Vec<ParticipantId> {
    engine.queue().iter().map(|p| p.id).collect()
}

fn apply(engine: &mut Engine, clock: &ManualClock, op: &Op) {
    match *op {
        Op::Deposit(amount) => {
            engine.process_deposit(amount, false).unwrap();
        }
        Op::Seed(amount) => {
            engine.process_deposit(amount, true).unwrap();
        }
        Op::Settle => {
            engine.perform_settlement();
        }
        Op::Tick(ms) => clock.advance(ms),
    }
}

// ---------------------------------------------------------------------------
// Test 1: fuzz_invariants_hold_after_every_op
//
// Attack vector: an arbitrary interleaving of deposits, protocol seeds,
// settlements, and clock jumps under any configuration drives a member past
// its target, leaves a paid-up member queued, duplicates an id, or lets the
// ledger drift from its running totals.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fuzz_invariants_hold_after_every_op(
        config in engine_config(),
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..150),
    ) {
        let (mut engine, clock) = test_engine(config, seed);
        for op in &ops {
            apply(&mut engine, &clock, op);
            assert_invariants(&engine);
            prop_assert!(engine.series().len() <= TELEMETRY_SERIES_CAP);
            prop_assert_eq!(engine.stats().queued_count as usize, engine.queue().len());
        }
    }
}

// ---------------------------------------------------------------------------
// Test 2: fuzz_targets_never_increase
//
// Attack vector: slashing or sweeping raises a queued member's target,
// turning a haircut into a windfall.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fuzz_targets_never_increase(
        strategy in payout_strategy(),
        seed in any::<u64>(),
        amounts in prop::collection::vec(1u64..=units(2_000), 1..200),
    ) {
        let (mut engine, clock) = test_engine(hostile_config(strategy), seed);
        for amount in amounts {
            let before: HashMap<_, _> = targets(&engine).into_iter().collect();
            clock.advance(1_500);
            engine.process_deposit(amount, false).unwrap();
            for (id, target) in targets(&engine) {
                if let Some(prev) = before.get(&id) {
                    prop_assert!(target <= *prev, "{} target rose {} -> {}", id, prev, target);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Test 3: fuzz_fifo_order_preserved
//
// Attack vector: a deposit reorders survivors or inserts the newcomer
// anywhere but the tail.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fuzz_fifo_order_preserved(
        config in engine_config(),
        seed in any::<u64>(),
        amounts in prop::collection::vec(1u64..=units(3_000), 1..200),
    ) {
        let (mut engine, _) = test_engine(config, seed);
        for amount in amounts {
            let before = ids(&engine);
            let receipt = engine.process_deposit(amount, false).unwrap();
            let after = ids(&engine);

            let exited: Vec<_> = receipt.exits.iter().map(|x| x.id).collect();
            let mut expected: Vec<_> = before.into_iter().filter(|id| !exited.contains(id)).collect();
            expected.push(receipt.id);
            prop_assert_eq!(after, expected);
        }
    }
}

// ---------------------------------------------------------------------------
// Test 4: fuzz_credit_never_exceeds_net
//
// Attack vector: distribution pays out more than the net deposit, creating
// value from nothing, or the receipt misreports how the net was split.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fuzz_credit_never_exceeds_net(
        config in engine_config(),
        seed in any::<u64>(),
        amounts in prop::collection::vec(1u64..=units(3_000), 1..120),
    ) {
        let (mut engine, _) = test_engine(config.clone(), seed);
        for amount in amounts {
            let liability = engine.queue().outstanding_liability();
            let r = engine.process_deposit(amount, false).unwrap();
            prop_assert!(r.fee >= MIN_FEE.min(amount));
            prop_assert_eq!(r.fee + r.net, amount);
            prop_assert_eq!(r.yield_pool + r.head_pool, r.net);
            prop_assert_eq!(r.credited + r.unallocated, r.net);
            if r.slash.is_none() {
                prop_assert!(r.credited <= liability);
            }
            if config.strategy == PayoutStrategy::Standard {
                prop_assert_eq!(r.yield_pool, 0);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Test 5: fuzz_invalid_deposits_are_inert
//
// Attack vector: zero, negative, non-finite, or oversized inputs slip past
// validation and perturb the queue or ledger.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn fuzz_invalid_deposits_are_inert(
        seed in any::<u64>(),
        warmup in prop::collection::vec(1u64..=units(500), 0..20),
        raw in prop_oneof![
            Just(0.0f64),
            Just(f64::NAN),
            Just(f64::INFINITY),
            Just(f64::NEG_INFINITY),
            -1.0e12f64..0.0,
            (MAX_DEPOSIT / UNIT) as f64 * 1.5..1.0e15,
        ],
    ) {
        let (mut engine, _) = test_engine(hostile_config(PayoutStrategy::CommunityYield), seed);
        for amount in warmup {
            engine.process_deposit(amount, false).unwrap();
        }
        let before = engine.snapshot();
        let ledger = engine.ledger().clone();

        let converted = amount_from_units(raw);
        prop_assert!(converted.is_err(), "{} accepted as {:?}", raw, converted);

        prop_assert!(engine.process_deposit(0, false).is_err());
        prop_assert!(engine.process_deposit(MAX_DEPOSIT + 1, false).is_err());
        prop_assert_eq!(engine.snapshot(), before);
        prop_assert_eq!(engine.ledger(), &ledger);
    }
}

// ---------------------------------------------------------------------------
// Test 6: fuzz_settlement_leaves_clean_epoch
//
// Attack vector: a settlement after arbitrary history leaves survivors in
// the queue, over-refunds principal, or dips the reserve below zero.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn fuzz_settlement_leaves_clean_epoch(
        config in engine_config(),
        seed in any::<u64>(),
        amounts in prop::collection::vec(1u64..=units(3_000), 0..120),
    ) {
        let (mut engine, _) = test_engine(config, seed);
        for amount in amounts {
            engine.process_deposit(amount, false).unwrap();
        }
        let principal: Amount = engine.queue().iter().map(|p| p.remaining_principal()).sum();
        let reserve = engine.ledger().reserve_balance;
        let epoch = engine.ledger().current_epoch;

        let report = engine.perform_settlement();
        prop_assert_eq!(report.epoch, epoch + 1);
        prop_assert!(report.refunded <= report.surplus);
        prop_assert!(report.refunded <= principal);
        prop_assert!(report.refunded <= reserve);

        match &report.reseed {
            Some(receipt) => {
                prop_assert!(receipt.id.is_protocol());
                prop_assert_eq!(engine.queue().len(), 1);
            }
            None => prop_assert!(engine.queue().is_empty()),
        }
        assert_invariants(&engine);
    }
}
