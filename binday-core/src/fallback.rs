//! Derives a three-bin schedule from a weekly collection day.
//!
//! Organics go out every week. Recycling and landfill alternate fortnightly, and the
//! upstream does not say which week is which, so ISO week parity decides: even weeks are
//! recycling weeks. This matches the real roster only as long as the roster happens to
//! line up with ISO week numbers, which drifts across year boundaries with 53 weeks.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate};

use crate::model::{BinKind, BinSchedule, NextCollection};

/// Next date on or after `today` falling on `collection_day` (1 = Monday .. 7 = Sunday).
#[must_use]
pub fn next_occurrence(collection_day: u32, today: NaiveDate) -> Option<NaiveDate> {
    if !(1..=7).contains(&collection_day) {
        return None;
    }
    let weekday = today.weekday().number_from_monday();
    let days_ahead = if collection_day >= weekday {
        collection_day - weekday
    } else {
        collection_day + 7 - weekday
    };
    Some(today + Duration::days(i64::from(days_ahead)))
}

/// Dates per bin for a weekly `collection_day`, or `None` when the day is out of range.
#[must_use]
pub fn synthesize(collection_day: u32, today: NaiveDate) -> Option<[(BinKind, NaiveDate); 3]> {
    let organic = next_occurrence(collection_day, today)?;
    let following = organic + Duration::days(7);

    let (recycling, landfill) = if organic.iso_week().week() % 2 == 0 {
        (organic, following)
    } else {
        (following, organic)
    };

    Some([
        (BinKind::Organic, organic),
        (BinKind::Recycling, recycling),
        (BinKind::Landfill, landfill),
    ])
}

/// [`synthesize`] as a [`BinSchedule`] with collections at the usual hour in `offset`.
#[must_use]
pub fn synthesize_at(
    collection_day: u32,
    today: NaiveDate,
    offset: FixedOffset,
) -> Option<BinSchedule> {
    let mut schedule = BinSchedule::new();
    for (kind, day) in synthesize(collection_day, today)? {
        schedule.insert(kind, NextCollection::on(day, offset)?);
    }
    Some(schedule)
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;

    fn day(year: i32, month: u32, dom: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, dom).expect("valid date")
    }

    fn date_of(dates: &[(BinKind, NaiveDate); 3], kind: BinKind) -> NaiveDate {
        dates
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, date)| *date)
            .expect("every kind is synthesized")
    }

    #[test]
    fn wednesday_from_monday_in_even_week() {
        // Monday of ISO week 42.
        let monday = day(2026, 10, 12);
        assert_eq!(monday.weekday(), Weekday::Mon);
        assert_eq!(monday.iso_week().week() % 2, 0);

        let dates = synthesize(3, monday).expect("valid day");

        assert_eq!(date_of(&dates, BinKind::Organic), day(2026, 10, 14));
        assert_eq!(date_of(&dates, BinKind::Recycling), day(2026, 10, 14));
        assert_eq!(date_of(&dates, BinKind::Landfill), day(2026, 10, 21));
    }

    #[test]
    fn odd_week_swaps_recycling_and_landfill() {
        let monday = day(2026, 10, 19);
        assert_eq!(monday.iso_week().week() % 2, 1);

        let dates = synthesize(3, monday).expect("valid day");

        assert_eq!(date_of(&dates, BinKind::Landfill), day(2026, 10, 21));
        assert_eq!(date_of(&dates, BinKind::Recycling), day(2026, 10, 28));
    }

    #[test]
    fn collection_today_is_next_occurrence() {
        let wednesday = day(2026, 10, 21);
        assert_eq!(next_occurrence(3, wednesday), Some(wednesday));
        assert_eq!(next_occurrence(2, wednesday), Some(day(2026, 10, 27)));
    }

    #[test]
    fn out_of_range_days_are_rejected() {
        assert_eq!(next_occurrence(0, day(2026, 10, 21)), None);
        assert_eq!(next_occurrence(8, day(2026, 10, 21)), None);
        assert!(synthesize_at(0, day(2026, 10, 21), FixedOffset::east_opt(0).expect("utc")).is_none());
    }

    #[test]
    fn every_day_and_start_date_holds_the_invariants() {
        let start = day(2026, 12, 20);
        for offset_days in 0..21 {
            let today = start + Duration::days(offset_days);
            for collection_day in 1..=7 {
                let dates = synthesize(collection_day, today).expect("valid day");
                let organic = date_of(&dates, BinKind::Organic);
                let recycling = date_of(&dates, BinKind::Recycling);
                let landfill = date_of(&dates, BinKind::Landfill);

                assert!(organic >= today, "organic must not be in the past");
                assert!(
                    (organic - today).num_days() < 7,
                    "organic must be the nearest matching weekday"
                );
                assert_eq!(organic.weekday().number_from_monday(), collection_day);
                assert_ne!(recycling, landfill);
                assert_eq!((recycling - landfill).num_days().abs(), 7);
                assert!(recycling == organic || landfill == organic);
            }
        }
    }

    #[test]
    fn synthesize_at_places_collections_in_offset() {
        let offset = FixedOffset::east_opt(11 * 3600).expect("valid offset");
        let schedule = synthesize_at(3, day(2026, 10, 19), offset).expect("valid day");

        assert_eq!(schedule.len(), 3);
        let organic = schedule.get(BinKind::Organic).expect("organic present");
        assert_eq!(organic.date.to_rfc3339(), "2026-10-21T06:00:00+11:00");
    }
}
