//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger (plain or JSON)
//! - HTTP client for the mail webhook
//! - Process-wide crypto provider for rustls

mod client;
mod logger;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use client::init_webhook_client;
pub use logger::init_logger_with;

/// Initializes the crypto provider for TLS operations.
///
/// Installs `ring` as the process-wide provider for `rustls`. Must run before
/// the webhook client or any TLS connection is built.
pub fn init_crypto_provider() {
    // Reinstalling is harmless, so the result is ignored
    let _ = CryptoProvider::install_default(default_provider());
}
