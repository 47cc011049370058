//! Conversion between contract base units and display amounts.

mod conversion;

pub use conversion::*;
