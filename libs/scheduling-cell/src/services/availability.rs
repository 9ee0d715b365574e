use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::debug;

use office_cell::models::Office;
use office_cell::services::calendar::generate_slots;

use crate::models::{BestSlot, SchedulingError};
use crate::services::ledger::BookingLedger;

/// Answers "when can this customer come in", combining the office policy
/// grid with current occupancy and an injected `now`. Nothing here reads
/// the system clock: callers pass `now` in, which is what makes past-slot
/// filtering testable against a fixed clock.
pub struct AvailabilityService {
    ledger: Arc<dyn BookingLedger>,
}

impl AvailabilityService {
    pub fn new(ledger: Arc<dyn BookingLedger>) -> Self {
        Self { ledger }
    }

    /// Free slots for one office and date, ascending by time-of-day.
    ///
    /// The ordering is load-bearing: `best_slot` and the booking UI both
    /// treat index 0 as the earliest option. A slot whose (date, time) is
    /// at or before `now` is excluded; future dates are never filtered.
    pub async fn free_slots(
        &self,
        office: &Office,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<NaiveTime>, SchedulingError> {
        let occupied = self.ledger.occupied_times(office.id, date).await?;

        let slots: Vec<NaiveTime> = generate_slots(office, date)
            .into_iter()
            .filter(|time| !occupied.contains(time))
            .filter(|time| is_in_future(date, *time, now))
            .collect();

        debug!(
            "Office {} has {} free slots on {}",
            office.id,
            slots.len(),
            date
        );
        Ok(slots)
    }

    /// Earliest bookable slot across all offices within the horizon.
    ///
    /// Dates are scanned from `now`'s date forward; within a date the
    /// winner is the earliest time, and on an exact time tie the office
    /// appearing first in registry order wins. The scan is fully
    /// deterministic for unchanged ledger state, so repeated autocomplete
    /// calls do not bounce customers between offices.
    ///
    /// `None` means no availability inside the horizon - an ordinary
    /// outcome, not an error.
    pub async fn best_slot(
        &self,
        offices: &[Office],
        now: DateTime<Utc>,
        horizon_days: u32,
    ) -> Result<Option<BestSlot>, SchedulingError> {
        let today = now.date_naive();

        for day_offset in 0..=horizon_days as i64 {
            let date = today + Duration::days(day_offset);

            let mut best: Option<(NaiveTime, &Office)> = None;
            for office in offices {
                let Some(earliest) = self.free_slots(office, date, now).await?.first().copied()
                else {
                    continue;
                };

                // Strict < keeps the earlier registry index on time ties.
                if best.map_or(true, |(time, _)| earliest < time) {
                    best = Some((earliest, office));
                }
            }

            if let Some((time, office)) = best {
                return Ok(Some(BestSlot {
                    office_id: office.id,
                    office_name: office.name.clone(),
                    date,
                    time,
                }));
            }
        }

        debug!("No free slot within {} days", horizon_days);
        Ok(None)
    }
}

/// True when the slot starts strictly after `now` (UTC wall clock).
pub fn is_in_future(date: NaiveDate, time: NaiveTime, now: DateTime<Utc>) -> bool {
    NaiveDateTime::new(date, time) > now.naive_utc()
}
