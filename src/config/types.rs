//! Configuration types and environment parsing.
//!
//! `Config` is built once from environment-style key/value lookups and
//! validated up front, so the pipeline never reads the environment itself.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use strum_macros::{Display, EnumString};
use url::Url;

use crate::config::constants::DEFAULT_DB_PORT;
use crate::config::env::*;
use crate::error_handling::ConfigurationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
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
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// What to report when less than one full day is left on a certificate.
///
/// `Sentinel` replaces a floored day count of exactly zero with
/// `ZERO_DAY_SENTINEL_DAYS`, which keeps such certificates out of the report
/// for any threshold up to that value. `Exact` reports the real count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ZeroDayPolicy {
    #[default]
    Sentinel,
    Exact,
}

/// Where the hostnames for a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// Raw delimiter-separated list, split by `targets::parse_domain_list`
    Static(String),
    /// Certificate inventory database
    Database(DatabaseConfig),
}

/// Connection parameters for the certificate inventory database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .finish()
    }
}

/// Fixed envelope fields of the notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub subject: String,
    /// Recipient address(es), passed through to the webhook as given
    pub to: String,
    pub sender: String,
}

/// Webhook endpoint and its basic-auth credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    pub url: Url,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("url", &self.url.as_str())
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Validated configuration for one check run.
///
/// # Examples
///
/// ```no_run
/// use ssl_expiry_checker::Config;
///
/// let config = Config::from_env().expect("invalid configuration");
/// println!("threshold: {} days", config.expiry_threshold);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Hostname source
    pub targets: TargetSource,

    /// Certificates with fewer days left than this are reported
    pub expiry_threshold: i64,

    /// Email envelope
    pub email: EmailConfig,

    /// Webhook endpoint and credentials
    pub webhook: WebhookConfig,

    /// Directory with a custom `email.html`, if any
    pub template_dir: Option<PathBuf>,

    /// Handling of a zero day count
    pub zero_day_policy: ZeroDayPolicy,
}

impl Config {
    /// Reads and validates the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if a required setting is absent or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads and validates the configuration through an arbitrary key lookup.
    ///
    /// Values are trimmed; a value that is empty after trimming counts as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings = Settings(&lookup);

        let expiry_threshold = settings.parse::<i64>(ENV_EXPIRY_THRESHOLD)?;
        let targets = settings.target_source()?;

        let email = EmailConfig {
            subject: settings.required(ENV_EMAIL_SUBJECT)?,
            to: settings.required(ENV_EMAIL_TO)?,
            sender: settings.required(ENV_EMAIL_SENDER)?,
        };

        let raw_url = settings.required(ENV_WEBHOOK_URL)?;
        let url = Url::parse(&raw_url).map_err(|e| ConfigurationError::Invalid {
            key: ENV_WEBHOOK_URL,
            message: e.to_string(),
        })?;
        let webhook = WebhookConfig {
            url,
            user: settings.required(ENV_WEBHOOK_USER)?,
            password: settings.required(ENV_WEBHOOK_PASS)?,
        };

        let template_dir = settings.optional(ENV_TEMPLATE_DIR).map(PathBuf::from);
        let zero_day_policy = match settings.optional(ENV_ZERO_DAY_POLICY) {
            Some(value) => {
                ZeroDayPolicy::from_str(&value).map_err(|_| ConfigurationError::Invalid {
                    key: ENV_ZERO_DAY_POLICY,
                    message: format!("expected 'sentinel' or 'exact', got '{value}'"),
                })?
            }
            None => ZeroDayPolicy::default(),
        };

        Ok(Self {
            targets,
            expiry_threshold,
            email,
            webhook,
            template_dir,
            zero_day_policy,
        })
    }
}

struct Settings<'a, F>(&'a F);

impl<F> Settings<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigurationError> {
        self.optional(key).ok_or(ConfigurationError::Missing(key))
    }

    fn parse<T>(&self, key: &'static str) -> Result<T, ConfigurationError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.required(key)?;
        value.parse().map_err(|e: T::Err| ConfigurationError::Invalid {
            key,
            message: format!("'{value}': {e}"),
        })
    }

    /// The database wins whenever `DB_HOST` is present.
    fn target_source(&self) -> Result<TargetSource, ConfigurationError> {
        if let Some(host) = self.optional(ENV_DB_HOST) {
            let port = match self.optional(ENV_DB_PORT) {
                Some(_) => self.parse::<u16>(ENV_DB_PORT)?,
                None => DEFAULT_DB_PORT,
            };
            return Ok(TargetSource::Database(DatabaseConfig {
                host,
                port,
                user: self.required(ENV_DB_USER)?,
                password: self.required(ENV_DB_PASS)?,
                name: self.required(ENV_DB_NAME)?,
            }));
        }

        self.optional(ENV_DOMAINS)
            .map(TargetSource::Static)
            .ok_or(ConfigurationError::NoTargetSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_settings() -> HashMap<&'static str, String> {
        HashMap::from([
            (ENV_EXPIRY_THRESHOLD, "30".to_string()),
            (ENV_DOMAINS, "example.com,example.org".to_string()),
            (ENV_EMAIL_SUBJECT, "Certificates expiring".to_string()),
            (ENV_EMAIL_TO, "ops@example.com".to_string()),
            (ENV_EMAIL_SENDER, "noreply@example.com".to_string()),
            (ENV_WEBHOOK_URL, "https://hooks.example.com/mail".to_string()),
            (ENV_WEBHOOK_USER, "hook".to_string()),
            (ENV_WEBHOOK_PASS, "secret".to_string()),
        ])
    }

    fn load(settings: &HashMap<&'static str, String>) -> Result<Config, ConfigurationError> {
        Config::from_lookup(|key| settings.get(key).cloned())
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_full_static_config() {
        let config = load(&base_settings()).expect("config should load");
        assert_eq!(config.expiry_threshold, 30);
        assert_eq!(
            config.targets,
            TargetSource::Static("example.com,example.org".to_string())
        );
        assert_eq!(config.email.to, "ops@example.com");
        assert_eq!(config.webhook.url.as_str(), "https://hooks.example.com/mail");
        assert_eq!(config.zero_day_policy, ZeroDayPolicy::Sentinel);
        assert!(config.template_dir.is_none());
    }

    #[test]
    fn test_missing_threshold_is_configuration_error() {
        let mut settings = base_settings();
        settings.remove(ENV_EXPIRY_THRESHOLD);
        let err = load(&settings).unwrap_err();
        assert!(matches!(err, ConfigurationError::Missing(ENV_EXPIRY_THRESHOLD)));
    }

    #[test]
    fn test_unparseable_threshold_is_configuration_error() {
        let mut settings = base_settings();
        settings.insert(ENV_EXPIRY_THRESHOLD, "thirty".to_string());
        let err = load(&settings).unwrap_err();
        match err {
            ConfigurationError::Invalid { key, message } => {
                assert_eq!(key, ENV_EXPIRY_THRESHOLD);
                assert!(message.contains("thirty"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut settings = base_settings();
        settings.insert(ENV_EMAIL_SUBJECT, "   ".to_string());
        let err = load(&settings).unwrap_err();
        assert!(matches!(err, ConfigurationError::Missing(ENV_EMAIL_SUBJECT)));
    }

    #[test]
    fn test_each_notification_setting_is_required() {
        for key in [
            ENV_EMAIL_SUBJECT,
            ENV_EMAIL_TO,
            ENV_EMAIL_SENDER,
            ENV_WEBHOOK_URL,
            ENV_WEBHOOK_USER,
            ENV_WEBHOOK_PASS,
        ] {
            let mut settings = base_settings();
            settings.remove(key);
            match load(&settings) {
                Err(ConfigurationError::Missing(missing)) => assert_eq!(missing, key),
                other => panic!("{key}: expected Missing, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_invalid_webhook_url() {
        let mut settings = base_settings();
        settings.insert(ENV_WEBHOOK_URL, "not a url".to_string());
        let err = load(&settings).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Invalid {
                key: ENV_WEBHOOK_URL,
                ..
            }
        ));
    }

    #[test]
    fn test_no_target_source() {
        let mut settings = base_settings();
        settings.remove(ENV_DOMAINS);
        let err = load(&settings).unwrap_err();
        assert!(matches!(err, ConfigurationError::NoTargetSource));
    }

    #[test]
    fn test_database_source_takes_precedence() {
        let mut settings = base_settings();
        settings.insert(ENV_DB_HOST, "db.internal".to_string());
        settings.insert(ENV_DB_USER, "reader".to_string());
        settings.insert(ENV_DB_PASS, "p@ss".to_string());
        settings.insert(ENV_DB_NAME, "certs".to_string());

        let config = load(&settings).expect("config should load");
        match config.targets {
            TargetSource::Database(db) => {
                assert_eq!(db.host, "db.internal");
                assert_eq!(db.port, DEFAULT_DB_PORT);
                assert_eq!(db.user, "reader");
                assert_eq!(db.name, "certs");
            }
            other => panic!("expected database source, got {other:?}"),
        }
    }

    #[test]
    fn test_database_source_requires_all_parameters() {
        let mut settings = base_settings();
        settings.insert(ENV_DB_HOST, "db.internal".to_string());
        settings.insert(ENV_DB_USER, "reader".to_string());
        settings.insert(ENV_DB_NAME, "certs".to_string());

        let err = load(&settings).unwrap_err();
        assert!(matches!(err, ConfigurationError::Missing(ENV_DB_PASS)));
    }

    #[test]
    fn test_database_port_must_be_numeric() {
        let mut settings = base_settings();
        settings.insert(ENV_DB_HOST, "db.internal".to_string());
        settings.insert(ENV_DB_PORT, "mysql".to_string());
        let err = load(&settings).unwrap_err();
        assert!(matches!(
            err,
            ConfigurationError::Invalid {
                key: ENV_DB_PORT,
                ..
            }
        ));
    }

    #[test]
    fn test_zero_day_policy_parsing() {
        let mut settings = base_settings();
        settings.insert(ENV_ZERO_DAY_POLICY, "Exact".to_string());
        assert_eq!(
            load(&settings).unwrap().zero_day_policy,
            ZeroDayPolicy::Exact
        );

        settings.insert(ENV_ZERO_DAY_POLICY, "sometimes".to_string());
        assert!(matches!(
            load(&settings).unwrap_err(),
            ConfigurationError::Invalid {
                key: ENV_ZERO_DAY_POLICY,
                ..
            }
        ));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let mut settings = base_settings();
        settings.insert(ENV_DB_HOST, "db.internal".to_string());
        settings.insert(ENV_DB_USER, "reader".to_string());
        settings.insert(ENV_DB_PASS, "hunter2".to_string());
        settings.insert(ENV_DB_NAME, "certs".to_string());

        let rendered = format!("{:?}", load(&settings).unwrap());
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("secret"));
    }
}
