//! Wallet account context and network gating.

mod accounts_model;
mod accounts_service;
mod accounts_traits;
mod network_guard;

pub use accounts_model::*;
pub use accounts_service::*;
pub use accounts_traits::*;
pub use network_guard::*;
