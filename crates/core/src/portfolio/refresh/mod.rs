mod portfolio_service;
mod refresh_model;


pub use portfolio_service::*;
pub use refresh_model::*;
