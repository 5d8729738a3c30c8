// libs/schedule-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateScheduleRequest, ScheduleError};
use crate::services::schedule::ScheduleService;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub start: NaiveDate,
}

fn map_schedule_error(e: ScheduleError) -> AppError {
    match e {
        ScheduleError::NotFound => AppError::NotFound("Schedule range not found".to_string()),
        ScheduleError::DatabaseError(msg) => AppError::Database(msg),
        ScheduleError::CorruptConfig(msg) => AppError::Internal(msg),
        other => AppError::Validation(other.to_string()),
    }
}

fn require_admin(user: &User) -> Result<(), AppError> {
    if !user.is_admin() {
        return Err(AppError::Auth("Administrator access required".to_string()));
    }
    Ok(())
}

// ==============================================================================
// ADMIN HANDLERS (AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_schedules(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);

    let schedules = service.list_schedules().await.map_err(map_schedule_error)?;

    Ok(Json(json!({
        "schedules": schedules,
        "total": schedules.len()
    })))
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Path(schedule_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let schedule = service.get_schedule(&schedule_id).await.map_err(map_schedule_error)?;

    Ok(Json(json!(schedule)))
}

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = ScheduleService::new(&state);
    let schedule = service.create_schedule(request).await.map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn replace_schedule(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(schedule_id): Path<String>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = ScheduleService::new(&state);
    let schedule = service
        .replace_schedule(&schedule_id, request)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({
        "success": true,
        "schedule": schedule
    })))
}

#[axum::debug_handler]
pub async fn delete_schedule(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(schedule_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    require_admin(&user)?;

    let service = ScheduleService::new(&state);
    service
        .delete_schedule(&schedule_id)
        .await
        .map_err(map_schedule_error)?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_overlaps(
    State(state): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let overlaps = service.check_overlaps().await.map_err(map_schedule_error)?;

    Ok(Json(json!({
        "overlaps": overlaps,
        "total": overlaps.len()
    })))
}

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let availability = service.resolve_date(query.date).await.map_err(map_schedule_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn get_week_availability(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&state);
    let days = service.resolve_week(query.start).await.map_err(map_schedule_error)?;

    Ok(Json(json!({ "days": days })))
}
