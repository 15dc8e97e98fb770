//! Configuration types.
//!
//! This module defines the library configuration and the logging enums used by
//! `initialization::init_logger_with`.

use std::path::PathBuf;

use crate::config::constants::{
    APP_NAME, DEFAULT_DATA_BASE_URL, DEFAULT_MODELS_BASE_URL, DOWNLOAD_TIMEOUT_SECS,
    ENV_AUTH_TOKEN, ENV_CACHE_DIR, ENV_DATA_URL, ENV_MODELS_URL, MAX_DOWNLOAD_SIZE,
    MAX_NETWORK_DOWNLOAD_RETRIES,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// Every endpoint is overridable so the crate can run against a private mirror
/// or a local fixture server.
///
/// # Examples
///
/// ```no_run
/// use domain_category::Config;
///
/// let config = Config {
///     data_base_url: "https://mirror.internal/data/".to_string(),
///     ..Config::from_env()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for reference table downloads
    pub data_base_url: String,

    /// Base URL for model, vocabulary and category-name downloads
    ///
    /// The default endpoint serves Keras `.h5` models. Point this at a mirror
    /// using the same file names when the installed loader needs another format.
    pub models_base_url: String,

    /// Optional bearer token sent with every download
    pub auth_token: Option<String>,

    /// Directory holding cached artifacts (one file per artifact)
    pub cache_dir: PathBuf,

    /// Per-download timeout in seconds
    pub timeout_seconds: u64,

    /// Downloads larger than this are rejected
    pub max_download_size: usize,

    /// Download attempts before giving up
    pub download_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_base_url: DEFAULT_DATA_BASE_URL.to_string(),
            models_base_url: DEFAULT_MODELS_BASE_URL.to_string(),
            auth_token: None,
            cache_dir: default_cache_dir(None),
            timeout_seconds: DOWNLOAD_TIMEOUT_SECS,
            max_download_size: MAX_DOWNLOAD_SIZE,
            download_retries: MAX_NETWORK_DOWNLOAD_RETRIES,
        }
    }
}

impl Config {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            data_base_url: get(ENV_DATA_URL).unwrap_or(defaults.data_base_url),
            models_base_url: get(ENV_MODELS_URL).unwrap_or(defaults.models_base_url),
            auth_token: get(ENV_AUTH_TOKEN),
            cache_dir: get(ENV_CACHE_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| default_cache_dir(get("HOME"))),
            ..defaults
        }
    }
}

fn default_cache_dir(home: Option<String>) -> PathBuf {
    let home = home.or_else(|| std::env::var("HOME").ok());
    match home {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(format!(".{APP_NAME}")),
        _ => PathBuf::from(format!(".{APP_NAME}")),
    }
}
