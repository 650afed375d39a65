//! Scenario and adversarial test suite for the Eddy engine.
//!
//! The tests in this crate drive the engine only through its public
//! surface (plus the `testing` feature's state mutators) and check the
//! queue and ledger invariants after every operation.

pub mod helpers;
