use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

use crate::models::Office;

/// Produce every bookable time for `office` on `date`, in ascending order.
///
/// Times are aligned to the office's slot grid and fall strictly inside
/// `[opens_at, closes_at)` - a slot starting at closing time is not bookable.
/// The result depends only on the office policy and the calendar weekday;
/// no clock is consulted, so slots already in the past are still produced.
/// Filtering against "now" belongs to the availability resolver.
pub fn generate_slots(office: &Office, date: NaiveDate) -> Vec<NaiveTime> {
    let Some(hours) = office.hours_for(date.weekday()) else {
        // Office closed that weekday.
        return Vec::new();
    };

    if hours.slot_minutes == 0 || hours.opens_at >= hours.closes_at {
        return Vec::new();
    }

    let step = Duration::minutes(hours.slot_minutes as i64);
    let mut slots = Vec::new();
    let mut current = hours.opens_at;

    while current < hours.closes_at {
        slots.push(current);
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            // Stepped past midnight; the day's grid is exhausted.
            break;
        }
        current = next;
    }

    slots
}
