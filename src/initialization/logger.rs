//! Logger initialization.
//!
//! This module provides functions to initialize the logger with custom formatting.

use std::io::Write;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;
use colored::*;
use log::LevelFilter;

/// Initializes the logger with the specified level and format.
///
/// Configures `env_logger` with custom formatting. Plain text is colored and
/// prefixed with an emoji per level; JSON emits one object per line with
/// `ts`, `level`, `target` and `msg`.
///
/// The logger reads from the `RUST_LOG` environment variable by default, but
/// the provided `level` parameter will override it. This allows developers to
/// use `RUST_LOG=debug` for quick debugging while still supporting explicit
/// CLI control via `--log-level`.
///
/// # Arguments
///
/// * `level` - Minimum log level to display (overrides `RUST_LOG` if set)
/// * `format` - Log format (Plain or Json)
///
/// # Returns
///
/// `Ok(())` if initialization succeeds, or an error if logger setup fails.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if logger initialization fails.
///
/// # Examples
///
/// ```bash
/// # Use RUST_LOG for quick debugging (no CLI args needed)
/// RUST_LOG=debug ssl_expiry_checker --once
///
/// # Override with CLI args (takes precedence)
/// RUST_LOG=debug ssl_expiry_checker --log-level info
///
/// # Per-module filtering via RUST_LOG
/// RUST_LOG=ssl_expiry_checker=debug,sqlx=warn ssl_expiry_checker
/// ```
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    // RUST_LOG first; the CLI level overrides it
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, cap) in DEPENDENCY_LEVEL_CAPS {
        builder.filter_module(module, *cap);
    }
    builder.filter_module(env!("CARGO_CRATE_NAME"), level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            let line = json_line(
                chrono::Utc::now().timestamp_millis(),
                record.level(),
                record.target(),
                &record.args().to_string(),
            );
            writeln!(buf, "{line}")
        }),
        LogFormat::Plain => builder.format(|buf, record| {
            let line = plain_line(record.level(), record.target(), &record.args().to_string());
            writeln!(buf, "{line}")
        }),
    };

    // try_init so a second initialization reports an error instead of panicking
    builder.try_init().map_err(InitializationError::from)?;

    Ok(())
}

/// Dependencies that log too much at the level the checker itself runs at.
const DEPENDENCY_LEVEL_CAPS: &[(&str, LevelFilter)] = &[
    ("sqlx", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
    ("rustls", LevelFilter::Warn),
    ("cron", LevelFilter::Info),
];

/// One JSON object per record: `ts` (epoch millis), `level`, `target`, `msg`.
fn json_line(ts_millis: i64, level: log::Level, target: &str, msg: &str) -> String {
    serde_json::json!({
        "ts": ts_millis,
        "level": level.as_str(),
        "target": target,
        "msg": msg,
    })
    .to_string()
}

fn plain_line(level: log::Level, target: &str, msg: &str) -> String {
    let label = level.as_str();
    let colored_level = match level {
        log::Level::Error => label.red(),
        log::Level::Warn => label.yellow(),
        log::Level::Info => label.green(),
        log::Level::Debug => label.blue(),
        log::Level::Trace => label.purple(),
    };
    format!("{} {} [{}] {}", level_emoji(level), target.cyan(), colored_level, msg)
}

fn level_emoji(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "❌",
        log::Level::Warn => "⚠️",
        log::Level::Info => "✔️",
        log::Level::Debug => "🔍",
        log::Level::Trace => "🔬",
    }
}
