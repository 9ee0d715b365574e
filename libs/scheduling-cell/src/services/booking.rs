use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use office_cell::models::Office;
use office_cell::services::calendar::generate_slots;
use shared_config::AppConfig;

use crate::models::{
    Appointment, AppointmentState, BestSlot, BookAppointmentRequest, ReserveOutcome,
    SchedulingError,
};
use crate::services::availability::{is_in_future, AvailabilityService};
use crate::services::ledger::{BookingLedger, PostgrestLedger};
use crate::services::lifecycle::AppointmentLifecycleService;

/// Front door of the scheduling core: booking, availability queries and
/// state transitions. Handlers construct one per request; it owns no
/// caches, all durable state lives in the ledger.
pub struct SchedulingService {
    ledger: Arc<dyn BookingLedger>,
    availability: AvailabilityService,
    lifecycle: AppointmentLifecycleService,
}

impl SchedulingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_ledger(Arc::new(PostgrestLedger::new(config)))
    }

    /// Build the service over any ledger implementation. Tests and local
    /// runs plug in `MemoryLedger` here.
    pub fn with_ledger(ledger: Arc<dyn BookingLedger>) -> Self {
        Self {
            availability: AvailabilityService::new(Arc::clone(&ledger)),
            lifecycle: AppointmentLifecycleService::new(),
            ledger,
        }
    }

    // ==========================================================================
    // AVAILABILITY
    // ==========================================================================

    pub async fn free_slots(
        &self,
        office: &Office,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<NaiveTime>, SchedulingError> {
        self.availability.free_slots(office, date, now).await
    }

    pub async fn best_slot(
        &self,
        offices: &[Office],
        now: DateTime<Utc>,
        horizon_days: u32,
    ) -> Result<Option<BestSlot>, SchedulingError> {
        self.availability.best_slot(offices, now, horizon_days).await
    }

    // ==========================================================================
    // BOOKING
    // ==========================================================================

    /// Book a slot for a customer. Whatever the client believed was free is
    /// not trusted: the past-slot check runs against server time and the
    /// ledger re-validates occupancy atomically at insert.
    pub async fn book(
        &self,
        office: &Office,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        if !is_in_future(request.date, request.time, now) {
            return Err(SchedulingError::PastSlot);
        }

        if !generate_slots(office, request.date).contains(&request.time) {
            return Err(SchedulingError::Validation(format!(
                "{} is not a bookable time at this office on {}",
                request.time, request.date
            )));
        }

        match self.ledger.try_reserve(request, now).await? {
            ReserveOutcome::Reserved(appointment) => {
                info!(
                    "Appointment {} booked at office {} on {} {}",
                    appointment.id, appointment.office_id, appointment.date, appointment.time
                );
                Ok(appointment)
            }
            ReserveOutcome::Conflict => Err(SchedulingError::Conflict),
        }
    }

    // ==========================================================================
    // STATE MACHINE
    // ==========================================================================

    /// Apply a state transition after validating it against the current
    /// state. Cancellation carries a mandatory reason and, because the
    /// occupancy index ignores cancelled rows, releases the slot back to
    /// `free_slots`.
    pub async fn set_state(
        &self,
        id: Uuid,
        target: AppointmentState,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let current = self.ledger.get(id).await?;
        self.lifecycle.validate_transition(current.state, target)?;

        let cancellation_reason = if target == AppointmentState::Cancelled {
            Some(self.lifecycle.validate_cancellation_reason(reason.as_deref())?)
        } else {
            None
        };

        let updated = self
            .ledger
            .update_state(id, target, cancellation_reason, now)
            .await?;

        info!("Appointment {} moved {} -> {}", id, current.state, target);
        Ok(updated)
    }

    pub async fn confirm(&self, id: Uuid, now: DateTime<Utc>) -> Result<Appointment, SchedulingError> {
        self.set_state(id, AppointmentState::Confirmed, None, now).await
    }

    pub async fn mark_attended(&self, id: Uuid, now: DateTime<Utc>) -> Result<Appointment, SchedulingError> {
        self.set_state(id, AppointmentState::Attended, None, now).await
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        reason: String,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        self.set_state(id, AppointmentState::Cancelled, Some(reason), now).await
    }

    // ==========================================================================
    // READS AND ADMIN
    // ==========================================================================

    pub async fn get_appointment(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.ledger.get(id).await
    }

    pub async fn customer_appointments(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        self.ledger.list_for_customer(customer_id).await
    }

    /// Destructive admin path: removes the row outright, skipping the state
    /// machine. Audit logging is the caller's responsibility.
    pub async fn hard_delete(&self, id: Uuid) -> Result<(), SchedulingError> {
        warn!("Hard-deleting appointment {}", id);
        self.ledger.delete(id).await
    }
}
