//! Delivery of the notification to the mail webhook.

use std::time::Duration;

use log::{error, info};

use crate::config::{WebhookConfig, WEBHOOK_SUCCESS_STATUS, WEBHOOK_TIMEOUT_SECS};
use crate::error_handling::DeliveryError;
use crate::initialization::init_webhook_client;
use crate::notification::NotificationMessage;

/// Posts notifications to the configured webhook, once, with basic auth.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook: WebhookConfig,
}

impl WebhookNotifier {
    /// Creates a notifier with the default 30 second request timeout.
    pub fn new(webhook: WebhookConfig) -> Result<Self, DeliveryError> {
        Self::with_timeout(webhook, Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
    }

    pub fn with_timeout(webhook: WebhookConfig, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = init_webhook_client(timeout)?;
        Ok(Self { client, webhook })
    }

    /// Sends `message` as a JSON POST.
    ///
    /// Only 201 Created counts as delivered. There is no retry.
    ///
    /// # Errors
    ///
    /// - `DeliveryError::Request` on timeouts, DNS or connection failures
    /// - `DeliveryError::UnexpectedStatus` for any status other than 201
    pub async fn send(&self, message: &NotificationMessage) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.webhook.url.clone())
            .basic_auth(&self.webhook.user, Some(&self.webhook.password))
            .json(message)
            .send()
            .await
            .map_err(|e| {
                error!("Error sending email: {e}");
                DeliveryError::Request(e)
            })?;

        let status = response.status().as_u16();
        if status == WEBHOOK_SUCCESS_STATUS {
            info!("Email sent to {}", message.to());
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        error!("Error {status}: {body}");
        Err(DeliveryError::UnexpectedStatus { status, body })
    }
}
