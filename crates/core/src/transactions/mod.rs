//! Transaction lifecycle tracking.

mod transaction_tracker;
mod transactions_model;
mod transactions_traits;

#[cfg(test)]
mod transaction_tracker_tests;

pub use transaction_tracker::*;
pub use transactions_model::*;
pub use transactions_traits::*;
