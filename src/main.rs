//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `ssl_expiry_checker` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Choosing between a single check and the scheduler
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use ssl_expiry_checker::initialization::{init_crypto_provider, init_logger_with};
use ssl_expiry_checker::schedule::{run_scheduled, schedule_from_env};
use ssl_expiry_checker::{run_check, Config, LogFormat, LogLevel, TlsFetcher};

/// Checks TLS certificates and emails a report of those close to expiry.
///
/// Settings come from the environment or a `.env` file.
#[derive(Debug, Parser)]
#[command(name = "ssl_expiry_checker", version, about)]
struct Cli {
    /// Run a single check now and exit instead of following CRON_FREQUENCY
    #[arg(long)]
    once: bool,

    /// Log level: error/warn/info/debug/trace
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Log format: plain/json
    #[arg(long, value_enum, default_value = "plain")]
    log_format: LogFormat,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A missing .env is fine; settings may already be exported
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logger_with(cli.log_level.into(), cli.log_format)
        .context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    // Fail fast on bad settings; each run re-reads them
    let config = Config::from_env().context("Invalid configuration")?;
    let fetcher = TlsFetcher::new().context("Failed to build TLS client")?;

    if cli.once {
        match run_check(&config, &fetcher).await {
            Ok(report) => {
                println!(
                    "Checked {} certificate{} from {} host{} ({} skipped): {} expiring, notification {}",
                    report.unique_certificates,
                    if report.unique_certificates == 1 { "" } else { "s" },
                    report.targets,
                    if report.targets == 1 { "" } else { "s" },
                    report.skipped.len(),
                    report.expiring.len(),
                    if report.notified { "sent" } else { "not needed" }
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("ssl_expiry_checker error: {:#}", e);
                process::exit(1);
            }
        }
    } else {
        let schedule = schedule_from_env().context("Failed to read schedule")?;
        run_scheduled(&schedule, &fetcher).await;
        Ok(())
    }
}
