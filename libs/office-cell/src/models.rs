use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A service office. Reference data owned by the back-office CRUD; the
/// scheduler only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Office {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub hours: Vec<OfficeHours>,
}

/// Operating hours for a single weekday. A weekday with no row is a day the
/// office is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeHours {
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: u8,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    /// Width of the booking grid, e.g. 30 for half-hour slots.
    pub slot_minutes: u32,
}

impl Office {
    pub fn hours_for(&self, weekday: Weekday) -> Option<&OfficeHours> {
        let day = day_of_week_index(weekday);
        self.hours.iter().find(|h| h.day_of_week == day)
    }
}

pub fn day_of_week_index(weekday: Weekday) -> u8 {
    match weekday {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}
