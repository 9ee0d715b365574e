use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use office_cell::models::{Office, OfficeHours};
use office_cell::services::calendar::generate_slots;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn office_open(day_of_week: u8, opens: NaiveTime, closes: NaiveTime, slot_minutes: u32) -> Office {
    Office {
        id: Uuid::new_v4(),
        name: "Downtown Service Center".to_string(),
        address: "1 Main St".to_string(),
        phone: None,
        email: None,
        hours: vec![OfficeHours {
            day_of_week,
            opens_at: opens,
            closes_at: closes,
            slot_minutes,
        }],
    }
}

// 2025-06-10 is a Tuesday (day_of_week = 2).
const TUESDAY: (i32, u32, u32) = (2025, 6, 10);

fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(TUESDAY.0, TUESDAY.1, TUESDAY.2).unwrap()
}

#[test]
fn thirty_minute_grid_is_end_exclusive() {
    let office = office_open(2, time(9, 0), time(12, 0), 30);

    let slots = generate_slots(&office, tuesday());

    assert_eq!(
        slots,
        vec![
            time(9, 0),
            time(9, 30),
            time(10, 0),
            time(10, 30),
            time(11, 0),
            time(11, 30),
        ]
    );
}

#[test]
fn closed_weekday_yields_no_slots() {
    // Hours configured for Monday only; asking about a Tuesday.
    let office = office_open(1, time(9, 0), time(12, 0), 30);

    assert!(generate_slots(&office, tuesday()).is_empty());
}

#[test]
fn partial_trailing_interval_still_gets_a_slot() {
    // 10:30 starts before closing even though the interval is cut short.
    let office = office_open(2, time(9, 0), time(10, 45), 30);

    let slots = generate_slots(&office, tuesday());

    assert_eq!(slots, vec![time(9, 0), time(9, 30), time(10, 0), time(10, 30)]);
}

#[test]
fn inverted_or_degenerate_hours_yield_no_slots() {
    let inverted = office_open(2, time(12, 0), time(9, 0), 30);
    assert!(generate_slots(&inverted, tuesday()).is_empty());

    let zero_width = office_open(2, time(9, 0), time(9, 0), 30);
    assert!(generate_slots(&zero_width, tuesday()).is_empty());

    let zero_step = office_open(2, time(9, 0), time(12, 0), 0);
    assert!(generate_slots(&zero_step, tuesday()).is_empty());
}

#[test]
fn generation_is_deterministic_and_ignores_the_clock() {
    // Past dates are not this component's concern; same input, same output.
    let office = office_open(2, time(8, 0), time(20, 0), 60);
    let long_ago = NaiveDate::from_ymd_opt(2019, 4, 2).unwrap(); // also a Tuesday

    let first = generate_slots(&office, long_ago);
    let second = generate_slots(&office, long_ago);

    assert_eq!(first, second);
    assert_eq!(first.len(), 12);
    assert_eq!(first.first(), Some(&time(8, 0)));
    assert_eq!(first.last(), Some(&time(19, 0)));
}

#[test]
fn grid_survives_hours_running_to_midnight() {
    let office = office_open(2, time(23, 0), time(23, 59), 30);

    let slots = generate_slots(&office, tuesday());

    assert_eq!(slots, vec![time(23, 0), time(23, 30)]);
}
