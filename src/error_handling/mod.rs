//! Error types.
//!
//! Errors are split by seam:
//! - **CategoryError**: outcome of a categorization or prediction call
//! - **FrameError**: row container construction, CSV and JSON I/O
//! - **InitializationError**: logger and HTTP client setup
//!
//! Malformed or non-string domains are deliberately not errors: they normalize
//! to an empty domain and encode as an all-unknown feature vector.

mod types;

// Re-export public API
pub use types::{CategoryError, FrameError, InitializationError};
