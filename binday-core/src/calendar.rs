//! iCalendar export of a resolved schedule.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use uuid::Uuid;

use crate::config::BinLabels;
use crate::error::EngineError;
use crate::model::BinSchedule;

const PRODID: &str = "-//Bin Day Brain//Wollongong Waste//EN";
const UID_DOMAIN: &str = "binday";

/// Turns schedules into all-day events with an evening-before reminder.
#[derive(Debug, Clone)]
pub struct CalendarExporter {
    labels: BinLabels,
    alarm_lead_hours: u32,
}

impl CalendarExporter {
    /// Exporter naming bins with `labels` and alarming `alarm_lead_hours` before each day.
    #[must_use]
    pub fn new(labels: BinLabels, alarm_lead_hours: u32) -> Self {
        Self {
            labels,
            alarm_lead_hours,
        }
    }

    /// Serialize `schedule` as an iCalendar document stamped with `stamp`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ExportEmpty`] when no bin has a date.
    pub fn export(
        &self,
        schedule: &BinSchedule,
        stamp: DateTime<FixedOffset>,
    ) -> Result<Vec<u8>, EngineError> {
        if schedule.is_empty() {
            return Err(EngineError::ExportEmpty);
        }

        let dtstamp = stamp.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string();
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_owned(),
            "VERSION:2.0".to_owned(),
            format!("PRODID:{PRODID}"),
            "CALSCALE:GREGORIAN".to_owned(),
            "METHOD:PUBLISH".to_owned(),
        ];

        for (kind, next) in schedule.iter() {
            let label = escape_text(self.labels.label(kind));
            let day = next.day();
            lines.extend([
                "BEGIN:VEVENT".to_owned(),
                format!("UID:{}@{UID_DOMAIN}", Uuid::new_v4()),
                format!("DTSTAMP:{dtstamp}"),
                format!("DTSTART;VALUE=DATE:{}", ical_date(day)),
                format!("DTEND;VALUE=DATE:{}", ical_date(day + Duration::days(1))),
                format!("SUMMARY:Put out {label}"),
                format!("DESCRIPTION:Bin Day Brain reminder - {label} collection day"),
                "BEGIN:VALARM".to_owned(),
                format!("TRIGGER:-PT{}H", self.alarm_lead_hours),
                "ACTION:DISPLAY".to_owned(),
                format!("DESCRIPTION:Put out {label} tonight!"),
                "END:VALARM".to_owned(),
                "END:VEVENT".to_owned(),
            ]);
        }

        lines.push("END:VCALENDAR".to_owned());

        let mut document = lines.join("\r\n");
        document.push_str("\r\n");
        Ok(document.into_bytes())
    }
}

fn ical_date(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}

// RFC 5545 TEXT escaping.
fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for character in raw.chars() {
        match character {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}
