use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};

use crate::models::{
    Appointment, AppointmentState, BookAppointmentRequest, ReserveOutcome, SchedulingError,
};

/// Authoritative occupancy record. The one hard guarantee of the scheduler
/// lives here: for a fixed (office, date, time) triple, at most one
/// non-cancelled appointment exists, and concurrent `try_reserve` calls for
/// the same triple resolve to exactly one `Reserved` and any number of
/// `Conflict`s.
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// All times occupied by non-cancelled appointments at an office on a
    /// date. Batch form used to filter a whole day's grid in one query.
    async fn occupied_times(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<HashSet<NaiveTime>, SchedulingError>;

    async fn is_occupied(
        &self,
        office_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> Result<bool, SchedulingError> {
        Ok(self.occupied_times(office_id, date).await?.contains(&time))
    }

    /// Atomic reserve-if-free. Check and insert are one indivisible unit;
    /// "read free, then write" is exactly the race this method exists to
    /// prevent.
    async fn try_reserve(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<ReserveOutcome, SchedulingError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError>;

    /// Raw state write. Transition legality is the state machine's job;
    /// callers go through `SchedulingService::set_state`.
    async fn update_state(
        &self,
        id: Uuid,
        state: AppointmentState,
        cancellation_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError>;

    /// Administrative hard delete. Bypasses the state machine.
    async fn delete(&self, id: Uuid) -> Result<(), SchedulingError>;

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Appointment>, SchedulingError>;
}

// ==============================================================================
// POSTGREST-BACKED LEDGER
// ==============================================================================

/// Production ledger over the appointments table. Atomicity comes from the
/// store's partial unique index over (office_id, date, time) filtered to
/// non-cancelled rows: the insert attempt itself is the atomicity boundary,
/// and a 409 from the index is mapped to `ReserveOutcome::Conflict`.
pub struct PostgrestLedger {
    store: StoreClient,
}

#[derive(Deserialize)]
struct TimeRow {
    time: NaiveTime,
}

impl PostgrestLedger {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    fn representation_headers() -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );
        headers
    }

    fn parse_single(result: Vec<Value>) -> Result<Appointment, SchedulingError> {
        let first = result.into_iter().next().ok_or(SchedulingError::NotFound)?;
        serde_json::from_value(first)
            .map_err(|e| SchedulingError::StoreError(format!("failed to parse appointment: {}", e)))
    }
}

#[async_trait]
impl BookingLedger for PostgrestLedger {
    async fn occupied_times(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<HashSet<NaiveTime>, SchedulingError> {
        let path = format!(
            "/rest/v1/appointments?office_id=eq.{}&date=eq.{}&state=neq.cancelled&select=time",
            office_id, date
        );
        let rows: Vec<TimeRow> = self.store.request(Method::GET, &path, None).await?;

        Ok(rows.into_iter().map(|row| row.time).collect())
    }

    async fn try_reserve(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<ReserveOutcome, SchedulingError> {
        debug!(
            "Reserving slot {} {} at office {}",
            request.date, request.time, request.office_id
        );

        let appointment_data = json!({
            "customer_id": request.customer_id,
            "vehicle_id": request.vehicle_id,
            "office_id": request.office_id,
            "date": request.date.to_string(),
            "time": request.time.format("%H:%M:%S").to_string(),
            "comment": request.comment,
            "state": AppointmentState::Pending.to_string(),
            "cancellation_reason": Value::Null,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let result: Vec<Value> = match self
            .store
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(appointment_data),
                Some(Self::representation_headers()),
            )
            .await
        {
            Ok(rows) => rows,
            // The unique index rejected the insert: somebody else holds the
            // slot. Expected, recoverable.
            Err(StoreError::UniqueViolation(_)) => {
                info!(
                    "Reservation conflict for office {} at {} {}",
                    request.office_id, request.date, request.time
                );
                return Ok(ReserveOutcome::Conflict);
            }
            Err(e) => return Err(e.into()),
        };

        let appointment = Self::parse_single(result).map_err(|e| match e {
            SchedulingError::NotFound => SchedulingError::StoreError(
                "store returned no representation for insert".to_string(),
            ),
            other => other,
        })?;

        info!("Appointment {} reserved in state pending", appointment.id);
        Ok(ReserveOutcome::Reserved(appointment))
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        Self::parse_single(result)
    }

    async fn update_state(
        &self,
        id: Uuid,
        state: AppointmentState,
        cancellation_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let mut update_data = serde_json::Map::new();
        update_data.insert("state".to_string(), json!(state.to_string()));
        if let Some(reason) = cancellation_reason {
            update_data.insert("cancellation_reason".to_string(), json!(reason));
        }
        update_data.insert("updated_at".to_string(), json!(now.to_rfc3339()));

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let result: Vec<Value> = self
            .store
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(update_data)),
                Some(Self::representation_headers()),
            )
            .await?;

        Self::parse_single(result)
    }

    async fn delete(&self, id: Uuid) -> Result<(), SchedulingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let _: Value = self.store.request(Method::DELETE, &path, None).await?;

        Ok(())
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Appointment>, SchedulingError> {
        let path = format!(
            "/rest/v1/appointments?customer_id=eq.{}&order=date.desc,time.desc",
            customer_id
        );
        let result: Vec<Value> = self.store.request(Method::GET, &path, None).await?;

        result
            .into_iter()
            .map(|apt| {
                serde_json::from_value(apt).map_err(|e| {
                    SchedulingError::StoreError(format!("failed to parse appointment: {}", e))
                })
            })
            .collect()
    }
}

// ==============================================================================
// IN-MEMORY LEDGER
// ==============================================================================

/// Ledger backed by a process-local map, used by tests and local runs.
/// Check-and-insert happens under a single lock, so the one-winner
/// guarantee holds here the same way the unique index enforces it in the
/// store-backed ledger. The lock is never held across an await.
#[derive(Default, Clone)]
pub struct MemoryLedger {
    appointments: Arc<Mutex<HashMap<Uuid, Appointment>>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Appointment>> {
        // Lock poisoning only happens if a holder panicked; the map is still
        // consistent because every write is a single insert or update.
        self.appointments
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BookingLedger for MemoryLedger {
    async fn occupied_times(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<HashSet<NaiveTime>, SchedulingError> {
        let appointments = self.lock();
        Ok(appointments
            .values()
            .filter(|apt| {
                apt.office_id == office_id
                    && apt.date == date
                    && apt.state != AppointmentState::Cancelled
            })
            .map(|apt| apt.time)
            .collect())
    }

    async fn try_reserve(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
    ) -> Result<ReserveOutcome, SchedulingError> {
        let mut appointments = self.lock();

        let occupied = appointments.values().any(|apt| {
            apt.office_id == request.office_id
                && apt.date == request.date
                && apt.time == request.time
                && apt.state != AppointmentState::Cancelled
        });
        if occupied {
            return Ok(ReserveOutcome::Conflict);
        }

        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            vehicle_id: request.vehicle_id,
            office_id: request.office_id,
            date: request.date,
            time: request.time,
            comment: request.comment,
            state: AppointmentState::Pending,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };
        appointments.insert(appointment.id, appointment.clone());

        Ok(ReserveOutcome::Reserved(appointment))
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.lock().get(&id).cloned().ok_or(SchedulingError::NotFound)
    }

    async fn update_state(
        &self,
        id: Uuid,
        state: AppointmentState,
        cancellation_reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Appointment, SchedulingError> {
        let mut appointments = self.lock();
        let appointment = appointments.get_mut(&id).ok_or(SchedulingError::NotFound)?;

        appointment.state = state;
        if cancellation_reason.is_some() {
            appointment.cancellation_reason = cancellation_reason;
        }
        appointment.updated_at = now;

        Ok(appointment.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), SchedulingError> {
        self.lock().remove(&id).map(|_| ()).ok_or(SchedulingError::NotFound)
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Appointment>, SchedulingError> {
        let appointments = self.lock();
        let mut rows: Vec<Appointment> = appointments
            .values()
            .filter(|apt| apt.customer_id == customer_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));

        Ok(rows)
    }
}
