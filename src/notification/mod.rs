//! Expiry report construction and delivery.
//!
//! - `build_expiring_list` keeps the certificates below the threshold
//! - `build_message` renders the report and wraps it in a `NotificationMessage`
//! - `WebhookNotifier` posts the message to the mail webhook

mod template;
mod webhook;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Serialize, Serializer};

use crate::config::{EmailConfig, EXPIRES_FORMAT};
use crate::error_handling::TemplateError;
use crate::expiry::EvaluatedCertificate;

pub use template::{ReportRenderer, DEFAULT_EMAIL_TEMPLATE};
pub use webhook::WebhookNotifier;

/// One row of the expiry report.
///
/// Field names are the names the template sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiringEntry {
    /// Common name, `Unknown` when the certificate has none
    pub cert: String,
    /// Days until expiry
    pub delta: i64,
    #[serde(serialize_with = "serialize_expires")]
    pub expires: DateTime<Utc>,
    pub domains: Vec<String>,
}

fn serialize_expires<S>(expires: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&expires.format(EXPIRES_FORMAT))
}

/// Keeps the certificates with fewer than `threshold_days` days left.
///
/// A certificate with exactly `threshold_days` left is not included. Input
/// order is preserved.
pub fn build_expiring_list(
    evaluated: &[EvaluatedCertificate],
    threshold_days: i64,
) -> Vec<ExpiringEntry> {
    evaluated
        .iter()
        .filter(|cert| cert.days_until_expiry < threshold_days)
        .map(|cert| {
            info!(
                "Certificate {} expires in {} days",
                cert.display_name(),
                cert.days_until_expiry
            );
            ExpiringEntry {
                cert: cert.display_name().to_string(),
                delta: cert.days_until_expiry,
                expires: cert.not_after,
                domains: cert.domains.clone(),
            }
        })
        .collect()
}

/// The email handed to the webhook. Serializes to exactly
/// `{"subject", "body", "to", "sender"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    subject: String,
    body: String,
    to: String,
    sender: String,
}

impl NotificationMessage {
    pub fn new(
        subject: impl Into<String>,
        body: impl Into<String>,
        to: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            to: to.into(),
            sender: sender.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }
}

/// Renders the report for `entries` and addresses it per `email`.
///
/// Only called with a non-empty list; an empty run sends nothing.
///
/// # Errors
///
/// Returns `TemplateError` if the template is missing or fails to render.
pub fn build_message(
    entries: &[ExpiringEntry],
    email: &EmailConfig,
    renderer: &ReportRenderer,
) -> Result<NotificationMessage, TemplateError> {
    let body = renderer.render(entries)?;
    Ok(NotificationMessage::new(
        email.subject.clone(),
        body,
        email.to.clone(),
        email.sender.clone(),
    ))
}
