// libs/notification-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::NotificationRequest;
use crate::services::mailer::MailerClient;

/// Manual re-send for an appointment whose original notification failed.
/// The dashboard already holds the record, so it posts the full payload.
#[axum::debug_handler]
pub async fn send_notification(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<NotificationRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Auth("Administrator access required".to_string()));
    }

    let mailer = MailerClient::new(&state)
        .map_err(|e| AppError::Notification(e.to_string()))?;

    mailer
        .send(&request)
        .await
        .map_err(|e| AppError::Notification(e.to_string()))?;

    Ok(Json(json!({ "success": true })))
}
