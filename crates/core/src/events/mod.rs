//! User-facing notifications.
//!
//! Core services emit notifications after state changes the user should hear
//! about. Runtime adapters implement the sink to turn them into toasts, SSE
//! messages, or log lines.

mod notification;
mod sink;

pub use notification::*;
pub use sink::*;
