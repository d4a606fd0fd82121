//! Error type definitions.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for process startup failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The TLS client configuration could not be built.
    #[error("TLS client configuration error: {0}")]
    TlsConfigError(#[from] rustls::Error),

    /// The schedule expression could not be parsed.
    #[error("Invalid schedule expression '{expression}': {message}")]
    ScheduleError { expression: String, message: String },
}

/// A required setting is absent or unusable. Aborts the run before any work.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required setting {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },

    #[error("No target source configured: set DOMAINS, or DB_HOST, DB_USER, DB_PASS and DB_NAME")]
    NoTargetSource,
}

/// The target list could not be obtained. Fatal for the run.
#[derive(Error, Debug)]
pub enum SourceUnavailableError {
    /// Building the connection URL failed.
    #[error("Invalid database connection parameters: {0}")]
    InvalidConnection(String),

    /// Opening the database connection failed.
    #[error("Failed to connect to target database: {0}")]
    Connect(#[source] sqlx::Error),

    /// The target query failed.
    #[error("Failed to query target domains: {0}")]
    Query(#[source] sqlx::Error),
}

/// Retrieving the certificate of one host failed. Recovered by skipping the host.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid hostname '{host}': {message}")]
    InvalidHostname { host: String, message: String },

    #[error("Failed to connect to {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("TCP connection timeout for {host}:{port} ({secs}s)")]
    ConnectTimeout { host: String, port: u16, secs: u64 },

    #[error("TLS handshake failed for {host}: {source}")]
    Handshake {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake timeout for {host} ({secs}s)")]
    HandshakeTimeout { host: String, secs: u64 },

    #[error("{host} did not present a certificate")]
    NoCertificate { host: String },
}

/// A fetched certificate could not be evaluated. Fatal for the run.
#[derive(Error, Debug)]
pub enum CertificateError {
    /// The PEM or DER structure does not decode.
    #[error("Malformed certificate: {0}")]
    Malformed(String),

    /// The certificate carries no Subject Alternative Name extension.
    #[error("Malformed certificate '{common_name}': no Subject Alternative Name extension")]
    MissingSubjectAltName { common_name: String },

    /// The not-after time cannot be represented as a UTC timestamp. A missing
    /// validity field is reported as `Malformed` by the parser instead.
    #[error("Certificate '{common_name}' has no usable expiry time")]
    MissingExpiry { common_name: String },
}

/// The report body could not be rendered.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Render(#[from] minijinja::Error),
}

/// The notification could not be delivered. Fatal for the run.
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// Transport-level failure (timeout, DNS, connection refused, ...).
    #[error("Webhook request failed: {0}")]
    Request(#[from] ReqwestError),

    /// The webhook answered with anything other than 201 Created.
    #[error("Webhook returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Any error that aborts a whole check run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    SourceUnavailable(#[from] SourceUnavailableError),

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
