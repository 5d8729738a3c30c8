// libs/notification-cell/src/services/mailer.rs
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{NotificationError, NotificationRequest};

/// The notifier is best-effort: a bounded timeout, no retries. Failures
/// surface to the caller; the administrator re-triggers by hand.
const MAIL_TIMEOUT_SECS: u64 = 10;

/// Client for the transactional-email endpoint.
pub struct MailerClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl MailerClient {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_mailer_configured() {
            return Err(NotificationError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(MAIL_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotificationError::RequestFailed { message: e.to_string() })?;

        Ok(Self {
            client,
            endpoint: config.mail_endpoint.clone(),
            api_key: config.mail_api_key.clone(),
        })
    }

    /// Send one notification. Success needs nothing beyond the
    /// acknowledgement; failure carries the endpoint's error body verbatim.
    pub async fn send(&self, request: &NotificationRequest) -> Result<(), NotificationError> {
        info!("Sending {} notification to {}", request.status, request.email);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| NotificationError::RequestFailed { message: e.to_string() })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| NotificationError::RequestFailed { message: e.to_string() })?;

        if !status.is_success() {
            error!("Mail endpoint error: {} - {}", status, response_text);
            return Err(NotificationError::MailApiError {
                message: format!("HTTP {}: {}", status, response_text),
            });
        }

        debug!("Notification accepted for {}", request.email);
        Ok(())
    }
}
