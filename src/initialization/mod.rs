//! Process-level setup.
//!
//! The library never installs a logger on its own; applications call
//! [`init_logger_with`] once at startup if they want its diagnostics.

mod logger;

pub use logger::init_logger_with;
