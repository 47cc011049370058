pub mod api;
pub mod config;
pub mod error;
pub mod events;
mod main_lib;
pub mod scheduler;

pub use main_lib::{
    build_state, build_state_with, init_tracing, AppState, Collaborators, ServiceSettings,
};
