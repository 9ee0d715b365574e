use std::sync::Arc;

use axum::{routing::get, Router};

use office_cell::router::office_routes;
use scheduling_cell::router::appointment_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Dealership scheduling API is running!" }))
        .nest("/offices", office_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
}
