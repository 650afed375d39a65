//! # eddy-core
//! Foundation types and traits for the Eddy pay-it-forward protocol.

pub mod config;
pub mod constants;
pub mod error;
pub mod queue;
pub mod telemetry;
pub mod traits;
pub mod types;
