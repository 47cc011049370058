//! Contract collaborator module.
//!
//! The on-chain investment contract is an external collaborator. This module
//! only defines the surface the dashboard consumes and the helpers that work
//! on raw contract results.

mod contract_errors;
mod contract_model;
mod contract_probe;
mod contract_traits;
mod investors;

pub use contract_errors::*;
pub use contract_model::*;
pub use contract_probe::*;
pub use contract_traits::*;
pub use investors::*;
