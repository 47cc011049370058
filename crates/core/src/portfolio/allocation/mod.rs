pub mod allocation_calculator;
pub mod allocation_model;

pub use allocation_calculator::*;
pub use allocation_model::*;
