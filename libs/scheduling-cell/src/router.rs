use std::sync::Arc;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        // Availability
        .route("/best-slot", get(handlers::best_available_slot))
        .route("/free-slots", get(handlers::free_slots))
        // Booking and reads
        .route("/", post(handlers::create_appointment))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/customers/{customer_id}", get(handlers::customer_appointments))
        // Lifecycle and admin
        .route("/{appointment_id}/state", patch(handlers::set_appointment_state))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .with_state(state)
}
