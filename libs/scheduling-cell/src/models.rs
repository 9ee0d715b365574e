use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::StoreError;
use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A workshop appointment. Never deleted through the state machine:
/// cancellation is a state, and only the explicit admin hard-delete path
/// removes the row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub office_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub comment: Option<String>,
    pub state: AppointmentState,
    /// Required iff state is Cancelled.
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentState {
    Pending,
    Confirmed,
    Attended,
    Cancelled,
}

impl AppointmentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentState::Attended | AppointmentState::Cancelled)
    }
}

impl fmt::Display for AppointmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentState::Pending => write!(f, "pending"),
            AppointmentState::Confirmed => write!(f, "confirmed"),
            AppointmentState::Attended => write!(f, "attended"),
            AppointmentState::Cancelled => write!(f, "cancelled"),
        }
    }
}

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub customer_id: Uuid,
    pub vehicle_id: Uuid,
    pub office_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetStateRequest {
    pub target_state: AppointmentState,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FreeSlotsQuery {
    pub office_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct FreeSlotsResponse {
    pub available: bool,
    pub slots: Vec<NaiveTime>,
}

/// The earliest bookable slot across the registry, used by the
/// appointment-form autocomplete.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BestSlot {
    pub office_id: Uuid,
    pub office_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Outcome of an atomic reservation attempt. Losing the race is an
/// expected result the caller branches on, not a fault.
#[derive(Debug)]
pub enum ReserveOutcome {
    Reserved(Appointment),
    Conflict,
}

// ==============================================================================
// ERROR TAXONOMY
// ==============================================================================

#[derive(Error, Debug)]
pub enum SchedulingError {
    /// The slot was taken by the time the reservation landed.
    #[error("Appointment slot is already booked")]
    Conflict,

    /// The submitted slot has already elapsed relative to server time.
    /// Same UX as Conflict, but indicates stale client state rather than
    /// a lost race, so it stays a separate variant.
    #[error("Appointment slot is in the past")]
    PastSlot,

    #[error("Cannot change appointment state from {from} to {to}")]
    InvalidTransition {
        from: AppointmentState,
        to: AppointmentState,
    },

    #[error("Appointment not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl From<StoreError> for SchedulingError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => SchedulingError::StoreUnavailable(msg),
            StoreError::NotFound(_) => SchedulingError::NotFound,
            other => SchedulingError::StoreError(other.to_string()),
        }
    }
}

impl From<SchedulingError> for AppError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::Conflict => AppError::Conflict(e.to_string()),
            SchedulingError::PastSlot => AppError::BadRequest(e.to_string()),
            SchedulingError::InvalidTransition { .. } => AppError::BadRequest(e.to_string()),
            SchedulingError::NotFound => AppError::NotFound(e.to_string()),
            SchedulingError::Validation(msg) => AppError::BadRequest(msg),
            SchedulingError::StoreUnavailable(msg) => AppError::Store(msg),
            SchedulingError::StoreError(msg) => AppError::Internal(msg),
        }
    }
}
