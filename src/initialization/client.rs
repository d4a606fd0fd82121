//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

/// User agent sent with every webhook request.
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Initializes the HTTP client used to post notifications.
///
/// Creates a `reqwest::Client` configured with:
/// - a total request timeout of `timeout`
/// - redirects disabled, so a moved webhook surfaces as a non-201 status
/// - the crate name and version as User-Agent
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_webhook_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(USER_AGENT)
        .build()
}
