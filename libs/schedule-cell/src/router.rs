// libs/schedule-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

/// Operating-hours management for the admin dashboard.
pub fn schedule_routes(state: Arc<AppConfig>) -> Router {
    let protected_routes = Router::new()
        .route("/", get(handlers::list_schedules))
        .route("/", post(handlers::create_schedule))
        .route("/overlaps", get(handlers::get_overlaps))
        .route("/{schedule_id}", get(handlers::get_schedule))
        .route("/{schedule_id}", put(handlers::replace_schedule))
        .route("/{schedule_id}", delete(handlers::delete_schedule))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}

/// Resolved opening hours; consumed by the public patient page.
pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::get_availability))
        .route("/week", get(handlers::get_week_availability))
        .with_state(state)
}
