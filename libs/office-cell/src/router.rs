use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn office_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_offices))
        .route("/{office_id}", get(handlers::get_office))
        .with_state(state)
}
