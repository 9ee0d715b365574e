use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use office_cell::services::directory::OfficeDirectory;
use shared_config::AppConfig;
use shared_database::StoreError;
use shared_models::error::AppError;

use crate::models::{
    AppointmentState, BookAppointmentRequest, FreeSlotsQuery, FreeSlotsResponse, SetStateRequest,
};
use crate::services::booking::SchedulingService;

/// Minimum length for an admin-entered cancellation justification.
const MIN_CANCELLATION_REASON_CHARS: usize = 10;

fn map_office_error(e: StoreError) -> AppError {
    match e {
        StoreError::NotFound(_) => AppError::NotFound("Office not found".to_string()),
        StoreError::Unavailable(msg) => AppError::Store(msg),
        other => AppError::Internal(other.to_string()),
    }
}

// ==============================================================================
// AVAILABILITY HANDLERS
// ==============================================================================

/// Best available slot across all offices - feeds the appointment-form
/// autocomplete. 204 means "no availability within the horizon", which the
/// client must present as such, not as a failure.
#[axum::debug_handler]
pub async fn best_available_slot(State(state): State<Arc<AppConfig>>) -> Result<Response, AppError> {
    let directory = OfficeDirectory::new(&state);
    let offices = directory.list_offices().await.map_err(map_office_error)?;

    let service = SchedulingService::new(&state);
    let best = service
        .best_slot(&offices, Utc::now(), state.booking_horizon_days)
        .await?;

    Ok(match best {
        Some(slot) => (StatusCode::OK, Json(json!(slot))).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

#[axum::debug_handler]
pub async fn free_slots(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<FreeSlotsQuery>,
) -> Result<Json<FreeSlotsResponse>, AppError> {
    let directory = OfficeDirectory::new(&state);
    let office = directory
        .get_office(query.office_id)
        .await
        .map_err(map_office_error)?;

    let service = SchedulingService::new(&state);
    let slots = service.free_slots(&office, query.date, Utc::now()).await?;

    Ok(Json(FreeSlotsResponse {
        available: !slots.is_empty(),
        slots,
    }))
}

// ==============================================================================
// BOOKING HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Response, AppError> {
    let directory = OfficeDirectory::new(&state);
    let office = directory
        .get_office(request.office_id)
        .await
        .map_err(map_office_error)?;

    let service = SchedulingService::new(&state);
    let appointment = service.book(&office, request, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))).into_response())
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);
    let appointment = service.get_appointment(appointment_id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn customer_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = SchedulingService::new(&state);
    let appointments = service.customer_appointments(customer_id).await?;

    Ok(Json(json!({ "appointments": appointments })))
}

// ==============================================================================
// STATE MACHINE HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn set_appointment_state(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<SetStateRequest>,
) -> Result<Json<Value>, AppError> {
    // Admin-side rule: a cancellation needs a real justification, not a
    // couple of characters.
    if request.target_state == AppointmentState::Cancelled {
        let reason_len = request
            .reason
            .as_deref()
            .map(|r| r.trim().chars().count())
            .unwrap_or(0);
        if reason_len < MIN_CANCELLATION_REASON_CHARS {
            return Err(AppError::BadRequest(format!(
                "Cancellation reason must be at least {} characters",
                MIN_CANCELLATION_REASON_CHARS
            )));
        }
    }

    let service = SchedulingService::new(&state);
    let appointment = service
        .set_state(appointment_id, request.target_state, request.reason, Utc::now())
        .await?;

    Ok(Json(json!(appointment)))
}

/// Administrative hard delete. Bypasses the state machine entirely; the
/// calling admin surface owns the audit trail.
#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = SchedulingService::new(&state);
    service.hard_delete(appointment_id).await?;

    info!("Appointment {} hard-deleted", appointment_id);
    Ok(StatusCode::NO_CONTENT)
}
