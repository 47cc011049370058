//! Portfolio valuation, allocation and the refresh protocol.

pub mod allocation;
pub mod refresh;
pub mod valuation;

pub use allocation::*;
pub use refresh::*;
pub use valuation::*;
