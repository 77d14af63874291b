//! Picks the next municipal event worth showing on the dashboard.

use chrono::{Duration, NaiveDate};

use crate::model::MunicipalEvent;

/// How far ahead events are shown.
pub const EVENT_WINDOW_DAYS: i64 = 30;

/// Earliest event starting between `today` and `today + window_days`, inclusive.
#[must_use]
pub fn upcoming(
    events: &[MunicipalEvent],
    today: NaiveDate,
    window_days: i64,
) -> Option<&MunicipalEvent> {
    let last = today + Duration::days(window_days);
    events
        .iter()
        .filter(|event| {
            event
                .start_date
                .is_some_and(|start| start >= today && start <= last)
        })
        .min_by_key(|event| event.start_date)
}

/// Relative label such as "TODAY", "Tomorrow" or "In 4 days".
#[must_use]
pub fn relative_label(start: NaiveDate, today: NaiveDate) -> String {
    match (start - today).num_days() {
        0 => "TODAY".to_owned(),
        1 => "Tomorrow".to_owned(),
        days => format!("In {days} days"),
    }
}
