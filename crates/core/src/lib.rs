//! Yieldfolio Core - Domain models, services, and collaborator traits.
//!
//! This crate contains the dashboard logic for the Yieldfolio investment
//! contract: fixed-point unit conversion, the simulated market trend,
//! portfolio valuation, transaction tracking and the refresh protocol.
//! It does not talk to a node itself; the contract and wallet are injected
//! through the traits in [`contract`] and [`accounts`], implemented by the
//! `yieldfolio-chain` crate.

pub mod accounts;
pub mod constants;
pub mod contract;
pub mod errors;
pub mod events;
pub mod market_trend;
pub mod portfolio;
pub mod transactions;
pub mod units;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_support;

// Re-export the portfolio surface
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
