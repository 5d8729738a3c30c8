use serde::{Deserialize, Serialize};

/// Payload posted to the transactional-email endpoint. The endpoint owns
/// templating; this service only hands over the facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub email: String,
    pub patient_name: String,
    /// Human-readable appointment time, already formatted for display.
    pub date: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum NotificationError {
    #[error("Mail delivery is not configured")]
    NotConfigured,

    #[error("Mail endpoint error: {message}")]
    MailApiError { message: String },

    #[error("Mail request failed: {message}")]
    RequestFailed { message: String },
}
