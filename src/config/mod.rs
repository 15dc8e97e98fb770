//! Configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoints, encoding parameters, download limits)
//! - The library `Config` and logging option types

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
