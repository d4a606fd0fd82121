//! Names of the environment settings read by the checker.

/// Schedule expression, required when running on a timer
pub const ENV_CRON_FREQUENCY: &str = "CRON_FREQUENCY";
pub const ENV_EXPIRY_THRESHOLD: &str = "EXPIRY_THRESHOLD";
pub const ENV_DOMAINS: &str = "DOMAINS";

pub const ENV_DB_HOST: &str = "DB_HOST";
pub const ENV_DB_PORT: &str = "DB_PORT";
pub const ENV_DB_USER: &str = "DB_USER";
pub const ENV_DB_PASS: &str = "DB_PASS";
pub const ENV_DB_NAME: &str = "DB_NAME";

pub const ENV_EMAIL_SUBJECT: &str = "EMAIL_SUBJECT";
pub const ENV_EMAIL_TO: &str = "EMAIL_TO";
pub const ENV_EMAIL_SENDER: &str = "EMAIL_SENDER";

pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
pub const ENV_WEBHOOK_USER: &str = "WEBHOOK_USER";
pub const ENV_WEBHOOK_PASS: &str = "WEBHOOK_PASS";

/// Optional directory containing an `email.html` that replaces the built-in template
pub const ENV_TEMPLATE_DIR: &str = "TEMPLATE_DIR";
/// Optional `sentinel` (default) or `exact`
pub const ENV_ZERO_DAY_POLICY: &str = "ZERO_DAY_POLICY";
