use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::UnavailableRange;

// All calendar-day logic runs in UTC. Callers inject "now" so date-boundary
// behavior never depends on the host's local zone.

/// True iff `start < date < end`, comparing calendar days only.
pub fn is_strictly_between(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start < date && date < end
}

/// True iff `date` falls inside any `[from, to]` closed interval.
/// Entries missing either bound are ignored.
pub fn is_date_excluded(date: NaiveDate, ranges: &[UnavailableRange]) -> bool {
    ranges.iter().any(|range| match (range.from, range.to) {
        (Some(from), Some(to)) => from <= date && date <= to,
        _ => false,
    })
}

const DAY_MS: i64 = 86_400_000;

/// Billed day count for a span: ceil((end - start) / 1 day), never negative.
/// Partial days round up, so a 36-hour span bills as 2 days.
pub fn inclusive_day_count(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let ms = (end - start).num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    (ms + DAY_MS - 1) / DAY_MS
}

/// Same clamp for plain calendar dates, where spans are always whole days.
pub fn day_count(start: NaiveDate, end: NaiveDate) -> i64 {
    inclusive_day_count(
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn strictly_between_excludes_both_bounds() {
        let (start, end) = (d("2024-06-10"), d("2024-06-15"));
        assert!(is_strictly_between(d("2024-06-12"), start, end));
        assert!(!is_strictly_between(start, start, end));
        assert!(!is_strictly_between(end, start, end));
        assert!(!is_strictly_between(d("2024-06-09"), start, end));
    }

    #[test]
    fn excluded_ranges_are_closed_intervals() {
        let ranges = vec![UnavailableRange::new(d("2024-06-10"), d("2024-06-15"))];
        assert!(is_date_excluded(d("2024-06-10"), &ranges));
        assert!(is_date_excluded(d("2024-06-12"), &ranges));
        assert!(is_date_excluded(d("2024-06-15"), &ranges));
        assert!(!is_date_excluded(d("2024-06-16"), &ranges));
        assert!(!is_date_excluded(d("2024-06-09"), &ranges));
    }

    #[test]
    fn malformed_ranges_are_ignored() {
        let ranges = vec![
            UnavailableRange {
                from: Some(d("2024-06-10")),
                to: None,
            },
            UnavailableRange {
                from: None,
                to: Some(d("2024-06-15")),
            },
        ];
        assert!(!is_date_excluded(d("2024-06-12"), &ranges));
    }

    #[test]
    fn partial_days_round_up() {
        let start = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 7, 3, 0, 0, 0).unwrap();
        // 36 hours bills as two days
        assert_eq!(inclusive_day_count(start, end), 2);
    }

    #[test]
    fn day_count_never_negative() {
        let start = Utc.with_ymd_and_hms(2024, 7, 5, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(inclusive_day_count(start, end), 0);
        assert_eq!(inclusive_day_count(start, start), 0);
        assert_eq!(day_count(d("2024-07-05"), d("2024-07-01")), 0);
        assert_eq!(day_count(d("2024-07-01"), d("2024-07-05")), 4);
    }
}
