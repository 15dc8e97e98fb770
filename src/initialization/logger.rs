//! Logger initialization.

use std::io::Write;

use crate::config::{LogFormat, LogLevel, APP_NAME};
use crate::error_handling::InitializationError;
use colored::*;
use log::{Level, LevelFilter};

/// Installs an `env_logger` backend for the crate's diagnostics.
///
/// `RUST_LOG` is read first; `level` then overrides the global level and the
/// level of this crate's own targets. HTTP client internals stay at `info`.
///
/// Plain output is colored and emoji-prefixed; JSON output writes one object
/// per line with a millisecond timestamp.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LogLevel, format: LogFormat) -> Result<(), InitializationError> {
    let level: LevelFilter = level.into();

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module(APP_NAME, level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let level = record.level();
                writeln!(
                    buf,
                    "{} {} [{}] {}",
                    emoji(level),
                    record.target().cyan(),
                    colored_level(level),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)
}

fn json_line(ts: i64, level: Level, target: &str, msg: &str) -> String {
    format!(
        "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
        ts,
        level,
        target,
        serde_json::to_string(msg).unwrap_or_else(|_| "\"\"".into())
    )
}

fn emoji(level: Level) -> &'static str {
    match level {
        Level::Error => "❌",
        Level::Warn => "⚠️",
        Level::Info => "✔️",
        Level::Debug => "🔍",
        Level::Trace => "🔬",
    }
}

fn colored_level(level: Level) -> ColoredString {
    let text = level.to_string();
    match level {
        Level::Error => text.red(),
        Level::Warn => text.yellow(),
        Level::Info => text.green(),
        Level::Debug => text.blue(),
        Level::Trace => text.purple(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_escapes_message() {
        let line = json_line(
            1_700_000_000_000,
            Level::Warn,
            "domain_category::artifact",
            "Cannot download \"dmoz_2016.csv.bz2\"\nretrying",
        );
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["ts"], 1_700_000_000_000i64);
        assert_eq!(parsed["level"], "WARN");
        assert_eq!(parsed["target"], "domain_category::artifact");
        assert_eq!(
            parsed["msg"],
            "Cannot download \"dmoz_2016.csv.bz2\"\nretrying"
        );
    }

    #[test]
    fn test_every_level_has_an_emoji() {
        let emojis: std::collections::HashSet<_> = [
            Level::Error,
            Level::Warn,
            Level::Info,
            Level::Debug,
            Level::Trace,
        ]
        .into_iter()
        .map(emoji)
        .collect();
        assert_eq!(emojis.len(), 5);
    }

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        // Only one logger per process: whichever call comes second must fail cleanly.
        let first = init_logger_with(LogLevel::Info, LogFormat::Plain);
        let second = init_logger_with(LogLevel::Debug, LogFormat::Json);
        assert!(second.is_err());
        if first.is_ok() {
            log::info!("logger installed");
        }
    }
}
