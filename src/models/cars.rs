use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::common::deserialize_vec_string_from_query;
use crate::pricing::RentalType;

/// Closed [from, to] calendar-day interval during which a car cannot be booked.
/// Bounds are optional so stored entries missing either end are skipped on read
/// instead of failing the whole row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnavailableRange {
    #[serde(default)]
    pub from: Option<NaiveDate>,
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl UnavailableRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }
}

/// Fleet car. Prices stay display strings end to end; parsing is lenient on read.
/// Cars are never deleted, only deactivated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub brand: String,
    pub model: String,
    pub title: String,
    pub description: Option<String>,
    pub price_daily: String,
    pub price_weekly: String,
    pub price_monthly: String,
    pub unavailable_ranges: Json<Vec<UnavailableRange>>,
    pub image_url: Option<String>,
    pub seats: Option<i32>,
    pub doors: Option<i32>,
    pub transmission: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCarRequest {
    #[validate(length(min = 1))]
    pub brand: String,
    #[validate(length(min = 1))]
    pub model: String,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: Option<String>,
    pub price_daily: String,
    pub price_weekly: String,
    pub price_monthly: String,
    pub image_url: Option<String>,
    pub seats: Option<i32>,
    pub doors: Option<i32>,
    pub transmission: Option<String>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCarRequest {
    #[validate(length(min = 1))]
    pub brand: Option<String>,
    #[validate(length(min = 1))]
    pub model: Option<String>,
    #[validate(length(min = 1))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_daily: Option<String>,
    pub price_weekly: Option<String>,
    pub price_monthly: Option<String>,
    pub image_url: Option<String>,
    pub seats: Option<i32>,
    pub doors: Option<i32>,
    pub transmission: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CarListParams {
    /// Page number (0-indexed)
    #[serde(default)]
    pub page: Option<i64>,
    /// Results per page
    #[serde(default)]
    pub limit: Option<i64>,
    /// Filter by brand; accepts a single value or a comma-separated list
    #[serde(default, deserialize_with = "deserialize_vec_string_from_query")]
    pub brand: Vec<String>,
    /// Sort by field (brand, title, price_daily, newest)
    pub sort_by: Option<String>,
    /// Sort direction (asc, desc)
    pub sort_dir: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CarListResponse {
    pub cars: Vec<Car>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Unit policy for the quote; defaults to daily
    pub rental_type: Option<RentalType>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub car_id: Uuid,
    pub available: bool,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Billed days for the candidate range, when one was given
    pub total_days: Option<i64>,
    /// Quoted price for the candidate range under the chosen unit policy
    pub total_price: Option<rust_decimal::Decimal>,
    /// First bookable date within the scan horizon; null when fully booked
    pub nearest_available_date: Option<NaiveDate>,
}
