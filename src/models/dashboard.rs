use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reporting window selector for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
    Year,
    All,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
            Period::All => "all",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today" => Some(Period::Today),
            "week" => Some(Period::Week),
            "month" => Some(Period::Month),
            "year" => Some(Period::Year),
            "all" => Some(Period::All),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub period: Option<String>,
}

/// One time-series bucket: hour of day, calendar day, or month depending on
/// the selected period. Keys sort lexically, which is chronological for
/// these formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePoint {
    pub bucket: String,
    pub revenue: Decimal,
    pub bookings: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCar {
    pub car_id: Option<Uuid>,
    pub car_name: String,
    pub accepted_count: i64,
}

/// Computed, never stored: whether any accepted request covers today for
/// this car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetState {
    Available,
    Booked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetCar {
    pub id: Uuid,
    pub title: String,
    pub brand: String,
    pub state: FleetState,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub period: String,
    pub total_bookings: i64,
    pub booking_growth: i64,
    pub active_rentals: i64,
    pub available_cars: i64,
    pub total_revenue: Decimal,
    pub revenue_growth: i64,
    pub revenue_series: Vec<RevenuePoint>,
    pub top_cars: Vec<TopCar>,
    pub fleet: Vec<FleetCar>,
}
