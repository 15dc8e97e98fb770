//! domain_category library: categorize domain names by lookup and prediction
//!
//! This library attaches content and threat categories to a batch of URLs or
//! hostnames in two ways:
//!
//! - **Lookup** against reference tables (open-directory taxonomy, aggregated
//!   blacklist, phishing list) with an exact match first and a
//!   registrable-domain fallback second.
//! - **Prediction** with a character n-gram sequence classifier for domains no
//!   table knows about.
//!
//! Tables and models are downloaded once, cached on disk under
//! `~/.domain_category`, and kept in memory for the rest of the process.
//!
//! # Example
//!
//! ```no_run
//! use domain_category::{Categorizer, Config, Frame, Value};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let categorizer = Categorizer::new(Config::from_env())?;
//! let frame = Frame::from_rows(
//!     &["url"],
//!     vec![vec![Value::from("http://www.google.com")]],
//! )?;
//!
//! let frame = categorizer.dmoz_cat(&frame, "url").await?;
//! println!("{:?}", frame.get(0, "dmoz_2016_cat"));
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Fetching requires a Tokio runtime. Prediction additionally needs a
//! [`ModelLoader`] that turns a downloaded model file into a
//! [`SequenceClassifier`].

#![warn(missing_docs)]

mod artifact;
mod assemble;
mod categorizer;
pub mod classifier;
pub mod config;
pub mod domain;
mod error_handling;
pub mod frame;
pub mod initialization;
pub mod ngram;
pub mod pipeline;
pub mod reference;
mod registry;
pub mod resolve;

// Re-export public API
pub use assemble::ColumnPrefix;
pub use categorizer::Categorizer;
pub use classifier::{ModelLoader, Prediction, SequenceClassifier};
pub use config::{Config, LogFormat, LogLevel};
pub use domain::{normalize, registrable_domain, ExcludeSubdomains};
pub use error_handling::{CategoryError, FrameError, InitializationError};
pub use frame::{Column, Frame, Value};
pub use pipeline::{ModelBundle, OutputKind, Pipeline};
pub use reference::{Dataset, ReferenceTable, ReferenceTableBuilder};
