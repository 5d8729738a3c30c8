use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use notification_cell::router::notify_routes;
use schedule_cell::router::{availability_routes, schedule_routes};
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Alipio Clinic API is running!" }))
        .nest("/auth", auth_routes(state.clone()))
        .nest("/schedules", schedule_routes(state.clone()))
        .nest("/availability", availability_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/notify", notify_routes(state))
}
