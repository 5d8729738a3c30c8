// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentStatus, CreateAppointmentRequest, TransitionRequest,
};
use crate::services::appointment::AppointmentService;
use crate::services::lifecycle::AppointmentLifecycleService;

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<AppointmentStatus>,
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::InvalidStatusTransition(_) => AppError::InvalidState(e.to_string()),
        AppointmentError::InvalidTargetStatus(_) => AppError::BadRequest(e.to_string()),
        AppointmentError::ValidationError(msg) => AppError::Validation(msg),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

fn require_admin(user: &User) -> Result<(), AppError> {
    if !user.is_admin() {
        return Err(AppError::Auth("Administrator access required".to_string()));
    }
    Ok(())
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

/// Booking request from the patient page. Always lands as pending.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointment = service
        .create_appointment(request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

// ==============================================================================
// ADMIN HANDLERS (AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointments = service
        .list_appointments(query.status)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::new(&state);

    let appointment = service
        .get_appointment(&appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

/// Confirm or cancel a pending appointment. A notification failure after
/// the status is persisted comes back as a 200 with `notified: false`,
/// never as an error response.
#[axum::debug_handler]
pub async fn transition_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = AppointmentLifecycleService::new(&state);
    let outcome = service
        .transition(&appointment_id, request.status)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": outcome.appointment,
        "notified": outcome.notified,
        "notification_error": outcome.notification_error
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = AppointmentService::new(&state);
    service
        .delete_appointment(&appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({ "success": true })))
}
