//! ssl_expiry_checker library: TLS certificate expiry checks
//!
//! This library fetches the leaf certificate presented by each target host,
//! works out how many days each distinct certificate has left, and emails a
//! report of those below a threshold through an HTTP mail webhook.
//!
//! # Example
//!
//! ```no_run
//! use ssl_expiry_checker::{run_check, Config, TlsFetcher};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! ssl_expiry_checker::initialization::init_crypto_provider();
//! let config = Config::from_env()?;
//! let fetcher = TlsFetcher::new()?;
//!
//! let report = run_check(&config, &fetcher).await?;
//! println!("{} of {} certificates expiring, notified: {}",
//!          report.expiring.len(), report.unique_certificates, report.notified);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Hosts are processed one at a time,
//! so a current-thread runtime is enough.

pub mod config;
mod error_handling;
pub mod expiry;
pub mod initialization;
pub mod notification;
pub mod schedule;
pub mod targets;
pub mod tls;

#[cfg(test)]
mod test_helpers;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, TargetSource, ZeroDayPolicy};
pub use error_handling::{
    CertificateError, ConfigurationError, DeliveryError, FetchError, InitializationError,
    RunError, SourceUnavailableError, TemplateError,
};
pub use run::{run_check, run_check_at, RunReport};
pub use tls::{CertificateFetcher, RawCertificate, SkippedHost, TlsFetcher};

// Internal run module (contains the check pipeline)
mod run {
    use std::time::Instant;

    use chrono::{DateTime, Utc};
    use log::info;

    use crate::config::Config;
    use crate::error_handling::RunError;
    use crate::expiry::{evaluate, EvaluatedCertificate};
    use crate::notification::{
        build_expiring_list, build_message, ExpiringEntry, ReportRenderer, WebhookNotifier,
    };
    use crate::targets::load_targets;
    use crate::tls::{fetch_certificates, CertificateFetcher, SkippedHost};

    /// Results of one check run.
    #[derive(Debug, Clone)]
    pub struct RunReport {
        /// Hostnames produced by the target source, duplicates included
        pub targets: usize,
        /// Successful handshakes
        pub fetched: usize,
        /// Hosts whose certificate could not be retrieved
        pub skipped: Vec<SkippedHost>,
        /// Distinct certificates evaluated
        pub unique_certificates: usize,
        /// Report rows, in the order the certificates were first seen
        pub expiring: Vec<ExpiringEntry>,
        /// Whether the webhook accepted a notification
        pub notified: bool,
        /// Elapsed time in seconds
        pub elapsed_seconds: f64,
    }

    /// Runs one check with the current time.
    ///
    /// See `run_check_at`.
    pub async fn run_check<F>(config: &Config, fetcher: &F) -> Result<RunReport, RunError>
    where
        F: CertificateFetcher,
    {
        run_check_at(config, fetcher, Utc::now()).await
    }

    /// Runs one check with day counts computed relative to `now`.
    ///
    /// Stages, in order: load targets, fetch certificates (failing hosts are
    /// skipped), evaluate every distinct certificate, keep those below the
    /// threshold, and send one notification if any remain. Nothing is sent
    /// when no certificate is below the threshold.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The target source is unavailable
    /// - A retrieved certificate cannot be parsed or lacks a SAN extension or expiry
    /// - The report template fails to render
    /// - The webhook request fails or answers anything but 201
    pub async fn run_check_at<F>(
        config: &Config,
        fetcher: &F,
        now: DateTime<Utc>,
    ) -> Result<RunReport, RunError>
    where
        F: CertificateFetcher,
    {
        let start = Instant::now();
        info!("Starting certificate check");

        let targets = load_targets(&config.targets).await?;
        let outcome = fetch_certificates(fetcher, &targets).await;

        let evaluated = outcome
            .certificates
            .iter()
            .map(|cert| evaluate(cert, now, config.zero_day_policy))
            .collect::<Result<Vec<EvaluatedCertificate>, _>>()?;

        let expiring = build_expiring_list(&evaluated, config.expiry_threshold);

        let mut report = RunReport {
            targets: targets.len(),
            fetched: outcome.fetched,
            skipped: outcome.skipped,
            unique_certificates: evaluated.len(),
            expiring,
            notified: false,
            elapsed_seconds: 0.0,
        };

        if report.expiring.is_empty() {
            info!("No expiring certificates");
        } else {
            let renderer = ReportRenderer::new(config.template_dir.as_deref())?;
            let message = build_message(&report.expiring, &config.email, &renderer)?;
            let notifier = WebhookNotifier::new(config.webhook.clone())?;
            notifier.send(&message).await?;
            report.notified = true;
        }

        report.elapsed_seconds = start.elapsed().as_secs_f64();
        info!(
            "Check complete: {} target(s), {} skipped, {} unique certificate(s), {} expiring in {:.2}s",
            report.targets,
            report.skipped.len(),
            report.unique_certificates,
            report.expiring.len(),
            report.elapsed_seconds
        );
        Ok(report)
    }
}
