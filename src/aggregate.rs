use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use crate::models::{
    Car, DashboardResponse, FleetCar, FleetState, Period, RentalRequest, RevenuePoint, TopCar,
};
use crate::pricing;

/// Reporting window [start, now) plus the equal-length window immediately
/// preceding it, used for period-over-period growth.
struct Window {
    start: DateTime<Utc>,
    prev_start: DateTime<Utc>,
}

fn resolve_window(period: Period, now: DateTime<Utc>) -> Window {
    let start = match period {
        Period::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
        Period::Week => now - chrono::Duration::days(7),
        Period::Month => now - chrono::Duration::days(30),
        Period::Year => now - chrono::Duration::days(365),
        Period::All => DateTime::<Utc>::UNIX_EPOCH,
    };
    let prev_start = match period {
        // "All" has no meaningful baseline; the empty previous window makes
        // growth fall through to the zero-baseline rule
        Period::All => start,
        _ => start - (now - start),
    };
    Window { start, prev_start }
}

/// Period-over-period growth in whole percent. A zero baseline reads as 100%
/// growth, including the 0-vs-0 case. That convention comes straight from the
/// original product and is relied on by the admin UI.
fn growth_pct(current: i64, previous: i64) -> i64 {
    if previous == 0 {
        return 100;
    }
    (((current - previous) as f64 / previous as f64) * 100.0).round() as i64
}

fn revenue_growth_pct(current: Decimal, previous: Decimal) -> i64 {
    if previous.is_zero() {
        return 100;
    }
    let current = current.to_f64().unwrap_or(0.0);
    let previous = previous.to_f64().unwrap_or(0.0);
    (((current - previous) / previous) * 100.0).round() as i64
}

/// Bucket key for the revenue time series. Lexical order of these formats is
/// chronological, so a BTreeMap keeps the series sorted.
fn bucket_key(period: Period, timestamp: DateTime<Utc>) -> String {
    match period {
        Period::Today => timestamp.format("%H:00").to_string(),
        Period::Year => timestamp.format("%Y-%m").to_string(),
        _ => timestamp.format("%Y-%m-%d").to_string(),
    }
}

/// Builds the full dashboard snapshot from the fetched request and car rows.
/// Pure: `now` is injected, empty inputs degenerate to zeros, and unparseable
/// stored prices contribute nothing to the sums.
pub fn build_dashboard(
    period: Period,
    now: DateTime<Utc>,
    requests: &[RentalRequest],
    cars: &[Car],
) -> DashboardResponse {
    let window = resolve_window(period, now);
    let today = now.date_naive();

    let total_bookings = requests
        .iter()
        .filter(|r| r.created_at >= window.start)
        .count() as i64;
    let previous_bookings = requests
        .iter()
        .filter(|r| r.created_at >= window.prev_start && r.created_at < window.start)
        .count() as i64;

    let accepted_in_window: Vec<&RentalRequest> = requests
        .iter()
        .filter(|r| r.is_accepted() && r.created_at >= window.start)
        .collect();

    let total_revenue: Decimal = accepted_in_window
        .iter()
        .map(|r| pricing::parse_price(&r.total_price))
        .sum();
    let previous_revenue: Decimal = requests
        .iter()
        .filter(|r| {
            r.is_accepted() && r.created_at >= window.prev_start && r.created_at < window.start
        })
        .map(|r| pricing::parse_price(&r.total_price))
        .sum();

    let mut buckets: BTreeMap<String, (Decimal, i64)> = BTreeMap::new();
    for request in &accepted_in_window {
        let entry = buckets
            .entry(bucket_key(period, request.created_at))
            .or_insert((Decimal::ZERO, 0));
        entry.0 += pricing::parse_price(&request.total_price);
        entry.1 += 1;
    }
    let revenue_series = buckets
        .into_iter()
        .map(|(bucket, (revenue, bookings))| RevenuePoint {
            bucket,
            revenue,
            bookings,
        })
        .collect();

    // Top cars keyed by id, falling back to the display name for legacy rows.
    // First-seen name wins per group; the stable sort keeps encounter order
    // on tied counts.
    let mut ranking: Vec<TopCar> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for request in &accepted_in_window {
        let key = match (request.car_id, request.car_name.as_deref()) {
            (Some(id), _) => id.to_string(),
            (None, Some(name)) => name.to_string(),
            (None, None) => continue,
        };
        match seen.get(&key) {
            Some(&slot) => ranking[slot].accepted_count += 1,
            None => {
                seen.insert(key, ranking.len());
                ranking.push(TopCar {
                    car_id: request.car_id,
                    car_name: request
                        .car_name
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    accepted_count: 1,
                });
            }
        }
    }
    ranking.sort_by(|a, b| b.accepted_count.cmp(&a.accepted_count));
    ranking.truncate(5);

    let active_requests: Vec<&RentalRequest> =
        requests.iter().filter(|r| r.is_active_on(today)).collect();
    let active_rentals = active_requests.len() as i64;

    let fleet: Vec<FleetCar> = cars
        .iter()
        .map(|car| {
            let booked = active_requests.iter().any(|r| match r.car_id {
                Some(id) => id == car.id,
                None => r.car_name.as_deref() == Some(car.title.as_str()),
            });
            FleetCar {
                id: car.id,
                title: car.title.clone(),
                brand: car.brand.clone(),
                state: if booked {
                    FleetState::Booked
                } else {
                    FleetState::Available
                },
                active: car.active,
            }
        })
        .collect();
    let available_cars = fleet
        .iter()
        .filter(|car| car.state == FleetState::Available)
        .count() as i64;

    DashboardResponse {
        period: period.as_str().to_string(),
        total_bookings,
        booking_growth: growth_pct(total_bookings, previous_bookings),
        active_rentals,
        available_cars,
        total_revenue,
        revenue_growth: revenue_growth_pct(total_revenue, previous_revenue),
        revenue_series,
        top_cars: ranking,
        fleet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UnavailableRange;
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal_macros::dec;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 14, 30, 0).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn request(
        status: &str,
        price: &str,
        created_at: DateTime<Utc>,
        car: Option<(Uuid, &str)>,
    ) -> RentalRequest {
        RentalRequest {
            id: Uuid::new_v4(),
            name: "Guest".to_string(),
            contact: "+971500000000".to_string(),
            car_id: car.map(|(id, _)| id),
            car_name: car.map(|(_, name)| name.to_string()),
            date_from: d("2024-07-14"),
            date_to: d("2024-07-16"),
            total_days: 2,
            rental_type: "daily".to_string(),
            total_price: price.to_string(),
            message: None,
            status: status.to_string(),
            urgent: false,
            user_ref: None,
            created_at,
            updated_at: None,
        }
    }

    fn car(id: Uuid, title: &str) -> Car {
        Car {
            id,
            brand: "Lamborghini".to_string(),
            model: "Urus".to_string(),
            title: title.to_string(),
            description: None,
            price_daily: "2500".to_string(),
            price_weekly: "15000".to_string(),
            price_monthly: "48000".to_string(),
            unavailable_ranges: Json(Vec::<UnavailableRange>::new()),
            image_url: None,
            seats: Some(5),
            doors: Some(4),
            transmission: Some("Automatic".to_string()),
            active: true,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn revenue_sums_lenient_price_strings() {
        let id = Uuid::new_v4();
        let requests = vec![
            request("accepted", "AED 1,200", now(), Some((id, "Urus"))),
            request("accepted", "$800", now(), Some((id, "Urus"))),
            request("accepted", "n/a", now(), Some((id, "Urus"))),
            request("pending", "AED 9,999", now(), Some((id, "Urus"))),
        ];
        let snapshot = build_dashboard(Period::Week, now(), &requests, &[]);
        assert_eq!(snapshot.total_revenue, dec!(2000));
    }

    #[test]
    fn growth_is_100_against_a_zero_baseline() {
        let snapshot = build_dashboard(Period::Week, now(), &[], &[]);
        // Zero vs zero still reads as 100 by the zero-baseline rule
        assert_eq!(snapshot.booking_growth, 100);
        assert_eq!(snapshot.revenue_growth, 100);
        assert_eq!(snapshot.total_bookings, 0);
        assert_eq!(snapshot.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn growth_compares_equal_length_windows() {
        let id = Uuid::new_v4();
        let in_window = now() - chrono::Duration::days(2);
        let previous = now() - chrono::Duration::days(9);
        let requests = vec![
            request("accepted", "1000", in_window, Some((id, "Urus"))),
            request("accepted", "1000", in_window, Some((id, "Urus"))),
            request("accepted", "1000", in_window, Some((id, "Urus"))),
            request("accepted", "1000", previous, Some((id, "Urus"))),
            request("accepted", "1000", previous, Some((id, "Urus"))),
        ];
        let snapshot = build_dashboard(Period::Week, now(), &requests, &[]);
        assert_eq!(snapshot.total_bookings, 3);
        assert_eq!(snapshot.booking_growth, 50);
        assert_eq!(snapshot.revenue_growth, 50);
    }

    #[test]
    fn today_series_buckets_by_hour() {
        let id = Uuid::new_v4();
        let morning = Utc.with_ymd_and_hms(2024, 7, 15, 9, 5, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 7, 15, 14, 0, 0).unwrap();
        let requests = vec![
            request("accepted", "100", later, Some((id, "Urus"))),
            request("accepted", "200", morning, Some((id, "Urus"))),
            request("accepted", "300", morning, Some((id, "Urus"))),
        ];
        let snapshot = build_dashboard(Period::Today, now(), &requests, &[]);
        let series = &snapshot.revenue_series;
        assert_eq!(series.len(), 2);
        // Lexical bucket order is chronological
        assert_eq!(series[0].bucket, "09:00");
        assert_eq!(series[0].revenue, dec!(500));
        assert_eq!(series[0].bookings, 2);
        assert_eq!(series[1].bucket, "14:00");
        assert_eq!(series[1].revenue, dec!(100));
    }

    #[test]
    fn year_series_buckets_by_month() {
        let id = Uuid::new_v4();
        let march = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let requests = vec![
            request("accepted", "100", march, Some((id, "Urus"))),
            request("accepted", "150", now(), Some((id, "Urus"))),
        ];
        let snapshot = build_dashboard(Period::Year, now(), &requests, &[]);
        let buckets: Vec<&str> = snapshot
            .revenue_series
            .iter()
            .map(|p| p.bucket.as_str())
            .collect();
        assert_eq!(buckets, vec!["2024-03", "2024-07"]);
    }

    #[test]
    fn top_cars_rank_by_count_with_stable_ties() {
        let urus = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let sf90 = Uuid::new_v4();
        // Legacy row without an id groups by display name
        let mut legacy = request("accepted", "100", now(), None);
        legacy.car_name = Some("Phantom".to_string());
        let requests = vec![
            request("accepted", "100", now(), Some((urus, "Urus"))),
            request("accepted", "100", now(), Some((ghost, "Ghost"))),
            request("accepted", "100", now(), Some((sf90, "SF90"))),
            request("accepted", "100", now(), Some((sf90, "SF90"))),
            legacy,
        ];
        let snapshot = build_dashboard(Period::Week, now(), &requests, &[]);
        assert_eq!(snapshot.top_cars.len(), 4);
        assert_eq!(snapshot.top_cars[0].car_name, "SF90");
        assert_eq!(snapshot.top_cars[0].accepted_count, 2);
        // The remaining three tie at 1; encounter order is preserved
        assert_eq!(snapshot.top_cars[1].car_name, "Urus");
        assert_eq!(snapshot.top_cars[2].car_name, "Ghost");
        assert_eq!(snapshot.top_cars[3].car_name, "Phantom");
        assert!(snapshot.top_cars[3].car_id.is_none());
    }

    #[test]
    fn fleet_state_tracks_currently_active_rentals() {
        let urus = Uuid::new_v4();
        let ghost = Uuid::new_v4();
        let mut covering = request("accepted", "100", now(), Some((urus, "Urus")));
        covering.date_from = d("2024-07-14");
        covering.date_to = d("2024-07-15"); // ends today: still active, bounds inclusive
        let mut past = request("accepted", "100", now(), Some((ghost, "Ghost")));
        past.date_from = d("2024-07-01");
        past.date_to = d("2024-07-10");
        let requests = vec![covering, past];
        let cars = vec![car(urus, "Urus"), car(ghost, "Ghost")];

        let snapshot = build_dashboard(Period::Week, now(), &requests, &cars);
        assert_eq!(snapshot.active_rentals, 1);
        assert_eq!(snapshot.fleet[0].state, FleetState::Booked);
        assert_eq!(snapshot.fleet[1].state, FleetState::Available);
        assert_eq!(snapshot.available_cars, 1);
    }

    #[test]
    fn fleet_matches_legacy_rows_by_display_name() {
        let urus = Uuid::new_v4();
        let mut legacy = request("accepted", "100", now(), None);
        legacy.car_name = Some("Urus".to_string());
        legacy.date_from = d("2024-07-14");
        legacy.date_to = d("2024-07-16");
        let cars = vec![car(urus, "Urus")];

        let snapshot = build_dashboard(Period::Week, now(), &[legacy], &cars);
        assert_eq!(snapshot.fleet[0].state, FleetState::Booked);
        assert_eq!(snapshot.available_cars, 0);
    }

    #[test]
    fn all_period_counts_everything_since_epoch() {
        let id = Uuid::new_v4();
        let ancient = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        let requests = vec![
            request("accepted", "100", ancient, Some((id, "Urus"))),
            request("rejected", "100", now(), Some((id, "Urus"))),
        ];
        let snapshot = build_dashboard(Period::All, now(), &requests, &[]);
        assert_eq!(snapshot.total_bookings, 2);
        assert_eq!(snapshot.booking_growth, 100);
    }
}
