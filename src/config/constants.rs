//! Configuration constants.
//!
//! This module defines the constants used throughout the crate, including
//! artifact endpoints, feature-encoding parameters, and download limits.

use std::time::Duration;

/// Application name used for the per-user cache directory (`~/.domain_category`).
pub const APP_NAME: &str = "domain_category";

/// Default base URL for reference table downloads.
pub const DEFAULT_DATA_BASE_URL: &str =
    "https://raw.githubusercontent.com/themains/pydomains/master/pydomains/data/";

/// Default base URL for model artifact downloads (model, vocabulary, category names).
pub const DEFAULT_MODELS_BASE_URL: &str =
    "https://raw.githubusercontent.com/themains/pydomains/master/pydomains/models/";

/// Environment variable overriding the reference table base URL.
pub const ENV_DATA_URL: &str = "DOMAIN_CATEGORY_DATA_URL";
/// Environment variable overriding the model artifact base URL.
pub const ENV_MODELS_URL: &str = "DOMAIN_CATEGORY_MODELS_URL";
/// Environment variable holding an optional bearer token for authenticated fetches.
pub const ENV_AUTH_TOKEN: &str = "DOMAIN_CATEGORY_AUTH_TOKEN";
/// Environment variable overriding the cache directory.
pub const ENV_CACHE_DIR: &str = "DOMAIN_CATEGORY_CACHE_DIR";

// Feature encoding
/// Length of the character n-grams fed to the sequence classifiers.
pub const NGRAMS: usize = 2;
/// Fixed width of every encoded sequence handed to a classifier.
pub const FEATURE_LEN: usize = 128;
/// Index shared by "n-gram not in vocabulary" and left padding.
pub const UNKNOWN_INDEX: i64 = 0;
/// Separator used by aggregated multi-label categories (e.g. `news|shopping`).
pub const LABEL_SEPARATOR: char = '|';

// Network limits
/// HTTP timeout for artifact downloads in seconds.
/// Reference tables are a few megabytes compressed, models slightly more.
pub const DOWNLOAD_TIMEOUT_SECS: u64 = 120;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Maximum artifact size in bytes (200MB)
pub const MAX_DOWNLOAD_SIZE: usize = 200 * 1024 * 1024;
/// Number of download attempts before an artifact is reported unavailable
pub const MAX_NETWORK_DOWNLOAD_RETRIES: u32 = 3;
/// Base delay for exponential backoff between download attempts
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);
/// Upper bound on a single backoff delay
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);
