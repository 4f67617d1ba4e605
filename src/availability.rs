use chrono::{Duration, NaiveDate};

use crate::dates;
use crate::models::UnavailableRange;

/// How far ahead the nearest-available scan looks before giving up.
pub const DEFAULT_HORIZON_DAYS: i64 = 730;

/// Which end of the range the customer is currently picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Start,
    End { start: NaiveDate },
}

/// A date is available iff no unavailable range covers it.
pub fn is_available(date: NaiveDate, ranges: &[UnavailableRange]) -> bool {
    !dates::is_date_excluded(date, ranges)
}

/// A date can be picked in the booking form iff it is not in the past,
/// is available, and, when picking the end of a range, lies strictly after
/// the chosen start. Today is selectable whenever it is available.
pub fn is_selectable(
    date: NaiveDate,
    today: NaiveDate,
    ranges: &[UnavailableRange],
    selection: Selection,
) -> bool {
    if date < today || !is_available(date, ranges) {
        return false;
    }
    match selection {
        Selection::Start => true,
        Selection::End { start } => date > start,
    }
}

/// A candidate range is bookable iff every day of the inclusive [from, to]
/// span is available.
pub fn is_range_bookable(from: NaiveDate, to: NaiveDate, ranges: &[UnavailableRange]) -> bool {
    if to < from {
        return false;
    }
    if !is_available(from, ranges) || !is_available(to, ranges) {
        return false;
    }
    let mut day = from + Duration::days(1);
    while dates::is_strictly_between(day, from, to) {
        if !is_available(day, ranges) {
            return false;
        }
        day += Duration::days(1);
    }
    true
}

/// First available date scanning forward from `today` inclusive. Exhausting
/// the horizon yields None; callers surface that as an explicit
/// "unavailable" result, never an error.
pub fn nearest_available_date(
    ranges: &[UnavailableRange],
    today: NaiveDate,
    horizon_days: i64,
) -> Option<NaiveDate> {
    (0..horizon_days)
        .map(|offset| today + Duration::days(offset))
        .find(|day| is_available(*day, ranges))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn june_block() -> Vec<UnavailableRange> {
        vec![UnavailableRange::new(d("2024-06-10"), d("2024-06-15"))]
    }

    #[test]
    fn availability_respects_closed_ranges() {
        assert!(!is_available(d("2024-06-12"), &june_block()));
        assert!(!is_available(d("2024-06-15"), &june_block()));
        assert!(is_available(d("2024-06-16"), &june_block()));
    }

    #[test]
    fn past_dates_are_never_selectable() {
        let today = d("2024-06-20");
        assert!(!is_selectable(d("2024-06-19"), today, &[], Selection::Start));
        assert!(is_selectable(today, today, &[], Selection::Start));
    }

    #[test]
    fn end_date_must_follow_start() {
        let today = d("2024-06-01");
        let start = d("2024-06-20");
        let end = Selection::End { start };
        assert!(!is_selectable(start, today, &[], end));
        assert!(!is_selectable(d("2024-06-19"), today, &[], end));
        assert!(is_selectable(d("2024-06-21"), today, &[], end));
    }

    #[test]
    fn unavailable_days_are_not_selectable() {
        let today = d("2024-06-01");
        assert!(!is_selectable(
            d("2024-06-12"),
            today,
            &june_block(),
            Selection::Start
        ));
    }

    #[test]
    fn range_bookable_checks_every_day() {
        let ranges = june_block();
        assert!(is_range_bookable(d("2024-06-01"), d("2024-06-09"), &ranges));
        assert!(is_range_bookable(d("2024-06-16"), d("2024-06-20"), &ranges));
        // Spans crossing the block are rejected even when both ends are free
        assert!(!is_range_bookable(d("2024-06-08"), d("2024-06-18"), &ranges));
        assert!(!is_range_bookable(d("2024-06-05"), d("2024-06-01"), &ranges));
    }

    #[test]
    fn nearest_available_skips_a_fully_booked_stretch() {
        let today = d("2024-06-01");
        // Booked for the next 10 days: today through day 10
        let ranges = vec![UnavailableRange::new(today, d("2024-06-10"))];
        assert_eq!(
            nearest_available_date(&ranges, today, DEFAULT_HORIZON_DAYS),
            Some(d("2024-06-11"))
        );
    }

    #[test]
    fn nearest_available_is_today_when_free() {
        let today = d("2024-06-01");
        assert_eq!(
            nearest_available_date(&[], today, DEFAULT_HORIZON_DAYS),
            Some(today)
        );
    }

    #[test]
    fn exhausted_horizon_yields_none() {
        let today = d("2024-06-01");
        let ranges = vec![UnavailableRange::new(today, d("2030-01-01"))];
        assert_eq!(nearest_available_date(&ranges, today, 30), None);
    }
}
