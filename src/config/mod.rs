//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (ports, timeouts, template names, etc.)
//! - Environment setting names
//! - The validated `Config` struct and its parts

mod constants;
mod env;
mod types;

// Re-export all constants
pub use constants::*;
pub use env::*;
pub use types::{
    Config, DatabaseConfig, EmailConfig, LogFormat, LogLevel, TargetSource, WebhookConfig,
    ZeroDayPolicy,
};
