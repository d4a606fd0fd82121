//! Configuration constants.
//!
//! This module defines the constants used throughout the application,
//! including ports, timeouts, and the fixed parts of the notification.

// Network operation timeouts
/// Port the leaf certificate is fetched from
pub const TLS_PORT: u16 = 443;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

// Webhook delivery
/// Upper bound for the whole webhook request, in seconds
pub const WEBHOOK_TIMEOUT_SECS: u64 = 30;
/// The only status the webhook answers with when it accepted the email
pub const WEBHOOK_SUCCESS_STATUS: u16 = 201;

// Expiry evaluation
pub const SECONDS_PER_DAY: i64 = 86_400;
/// Substituted for a day count of exactly zero under `ZeroDayPolicy::Sentinel`
pub const ZERO_DAY_SENTINEL_DAYS: i64 = 90;
/// Rendered in place of a missing subject common name
pub const UNKNOWN_COMMON_NAME: &str = "Unknown";

// Target source
/// Separator between hostnames in the static domain list
pub const DOMAIN_DELIMITER: char = ',';
/// MySQL default port, used when `DB_PORT` is not set
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DB_SCHEME: &str = "mysql";

// Templates
/// Name of the report template, both built-in and inside `TEMPLATE_DIR`
pub const EMAIL_TEMPLATE_NAME: &str = "email.html";
/// Format used for the `expires` column of the report
pub const EXPIRES_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
