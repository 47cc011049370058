//! Simulated market trend signal.
//!
//! The trend only adjusts how returns are displayed. It has no on-chain
//! counterpart and is replaced wholesale on every update.

mod market_trend_model;
mod market_trend_traits;
mod simulated_feed;
mod ticker;

pub use market_trend_model::*;
pub use market_trend_traits::*;
pub use simulated_feed::*;
pub use ticker::*;
