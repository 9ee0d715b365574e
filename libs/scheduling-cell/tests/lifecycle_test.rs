use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use scheduling_cell::models::{BookAppointmentRequest, SchedulingError};
use scheduling_cell::services::booking::SchedulingService;
use scheduling_cell::services::ledger::{BookingLedger, MemoryLedger};
use scheduling_cell::services::lifecycle::AppointmentLifecycleService;

use scheduling_cell::models::AppointmentState::{Attended, Cancelled, Confirmed, Pending};

// ==============================================================================
// TRANSITION TABLE
// ==============================================================================

#[test]
fn transition_table_matches_the_lifecycle() {
    let lifecycle = AppointmentLifecycleService::new();

    assert_eq!(lifecycle.valid_transitions(Pending), &[Confirmed, Cancelled]);
    assert_eq!(lifecycle.valid_transitions(Confirmed), &[Attended, Cancelled]);
    assert!(lifecycle.valid_transitions(Attended).is_empty());
    assert!(lifecycle.valid_transitions(Cancelled).is_empty());
}

#[test]
fn terminal_states_reject_every_transition() {
    let lifecycle = AppointmentLifecycleService::new();

    for from in [Attended, Cancelled] {
        for to in [Pending, Confirmed, Attended, Cancelled] {
            let err = lifecycle.validate_transition(from, to).unwrap_err();
            assert_matches!(err, SchedulingError::InvalidTransition { .. });
        }
    }
}

#[test]
fn attended_requires_prior_confirmation() {
    let lifecycle = AppointmentLifecycleService::new();

    assert_matches!(
        lifecycle.validate_transition(Pending, Attended).unwrap_err(),
        SchedulingError::InvalidTransition { from: Pending, to: Attended }
    );
    assert!(lifecycle.validate_transition(Confirmed, Attended).is_ok());
}

#[test]
fn nothing_transitions_back_into_pending() {
    let lifecycle = AppointmentLifecycleService::new();

    for from in [Pending, Confirmed, Attended, Cancelled] {
        assert!(lifecycle.validate_transition(from, Pending).is_err());
    }
}

#[test]
fn cancellation_reason_must_not_be_blank() {
    let lifecycle = AppointmentLifecycleService::new();

    assert!(lifecycle.validate_cancellation_reason(None).is_err());
    assert!(lifecycle.validate_cancellation_reason(Some("")).is_err());
    assert!(lifecycle.validate_cancellation_reason(Some("   ")).is_err());
    assert_eq!(
        lifecycle
            .validate_cancellation_reason(Some("  customer request  "))
            .unwrap(),
        "customer request"
    );
}

// ==============================================================================
// SERVICE-LEVEL TRANSITIONS
// ==============================================================================

async fn pending_appointment(ledger: &Arc<MemoryLedger>) -> Uuid {
    let request = BookAppointmentRequest {
        customer_id: Uuid::new_v4(),
        vehicle_id: Uuid::new_v4(),
        office_id: Uuid::new_v4(),
        date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
        time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        comment: None,
    };
    match ledger.try_reserve(request, Utc::now()).await.unwrap() {
        scheduling_cell::models::ReserveOutcome::Reserved(apt) => apt.id,
        scheduling_cell::models::ReserveOutcome::Conflict => unreachable!("empty ledger"),
    }
}

#[tokio::test]
async fn full_happy_path_pending_confirmed_attended() {
    let ledger = Arc::new(MemoryLedger::new());
    let service = SchedulingService::with_ledger(ledger.clone());
    let id = pending_appointment(&ledger).await;
    let now = Utc.with_ymd_and_hms(2025, 6, 9, 12, 0, 0).unwrap();

    let confirmed = service.confirm(id, now).await.unwrap();
    assert_eq!(confirmed.state, Confirmed);

    let attended = service.mark_attended(id, now).await.unwrap();
    assert_eq!(attended.state, Attended);
    assert!(attended.cancellation_reason.is_none());
}

#[tokio::test]
async fn cancelling_records_the_reason() {
    let ledger = Arc::new(MemoryLedger::new());
    let service = SchedulingService::with_ledger(ledger.clone());
    let id = pending_appointment(&ledger).await;
    let now = Utc::now();

    let cancelled = service
        .cancel(id, "workshop closed for inventory".to_string(), now)
        .await
        .unwrap();

    assert_eq!(cancelled.state, Cancelled);
    assert_eq!(
        cancelled.cancellation_reason.as_deref(),
        Some("workshop closed for inventory")
    );
}

#[tokio::test]
async fn cancel_without_reason_is_a_validation_error() {
    let ledger = Arc::new(MemoryLedger::new());
    let service = SchedulingService::with_ledger(ledger.clone());
    let id = pending_appointment(&ledger).await;

    let err = service
        .set_state(id, Cancelled, None, Utc::now())
        .await
        .unwrap_err();
    assert_matches!(err, SchedulingError::Validation(_));

    // The failed attempt must not have touched the appointment.
    let untouched = service.get_appointment(id).await.unwrap();
    assert_eq!(untouched.state, Pending);
}

#[tokio::test]
async fn terminal_appointments_reject_service_level_transitions() {
    let ledger = Arc::new(MemoryLedger::new());
    let service = SchedulingService::with_ledger(ledger.clone());
    let now = Utc::now();

    let id = pending_appointment(&ledger).await;
    service.confirm(id, now).await.unwrap();
    service.mark_attended(id, now).await.unwrap();

    assert_matches!(
        service.confirm(id, now).await.unwrap_err(),
        SchedulingError::InvalidTransition { from: Attended, .. }
    );
    assert_matches!(
        service.mark_attended(id, now).await.unwrap_err(),
        SchedulingError::InvalidTransition { from: Attended, .. }
    );
    assert_matches!(
        service
            .cancel(id, "far too late for this".to_string(), now)
            .await
            .unwrap_err(),
        SchedulingError::InvalidTransition { from: Attended, .. }
    );
}

#[tokio::test]
async fn cancelled_appointments_stay_cancelled() {
    let ledger = Arc::new(MemoryLedger::new());
    let service = SchedulingService::with_ledger(ledger.clone());
    let now = Utc::now();

    let id = pending_appointment(&ledger).await;
    service
        .cancel(id, "duplicate booking by mistake".to_string(), now)
        .await
        .unwrap();

    assert_matches!(
        service.confirm(id, now).await.unwrap_err(),
        SchedulingError::InvalidTransition { from: Cancelled, .. }
    );
    assert_matches!(
        service
            .cancel(id, "cancelling a second time".to_string(), now)
            .await
            .unwrap_err(),
        SchedulingError::InvalidTransition { from: Cancelled, .. }
    );
}

#[tokio::test]
async fn transitions_on_missing_appointments_are_not_found() {
    let service = SchedulingService::with_ledger(Arc::new(MemoryLedger::new()));

    let err = service.confirm(Uuid::new_v4(), Utc::now()).await.unwrap_err();
    assert_matches!(err, SchedulingError::NotFound);
}

#[tokio::test]
async fn hard_delete_bypasses_the_state_machine() {
    let ledger = Arc::new(MemoryLedger::new());
    let service = SchedulingService::with_ledger(ledger.clone());
    let now = Utc::now();

    let id = pending_appointment(&ledger).await;
    service.confirm(id, now).await.unwrap();
    service.mark_attended(id, now).await.unwrap();

    // Attended is terminal for transitions, but the admin delete path
    // removes the row anyway.
    service.hard_delete(id).await.unwrap();
    assert_matches!(
        service.get_appointment(id).await.unwrap_err(),
        SchedulingError::NotFound
    );
}
