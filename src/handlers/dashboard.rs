use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;

use crate::aggregate;
use crate::errors::{AppError, Result};
use crate::models::{Car, DashboardParams, DashboardResponse, Period, RentalRequest};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

/// GET /api/admin/dashboard - Aggregate snapshot for a reporting period
///
/// Parameters:
/// - period: today, week, month, year or all (default: week)
pub async fn get_dashboard(
    Query(params): Query<DashboardParams>,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>> {
    let raw = params.period.as_deref().unwrap_or("week");
    let period = Period::parse(raw).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown period '{}', expected today, week, month, year or all",
            raw
        ))
    })?;

    let cache_key = format!("dashboard:{}", period.as_str());
    if let Some(cached) = crate::cache::get::<DashboardResponse>(&cache_key) {
        return Ok(Json(cached));
    }

    // The fleet and request volumes here are small enough to aggregate in
    // process; the heavy lifting stays in plain testable functions
    let requests: Vec<RentalRequest> = sqlx::query_as("SELECT * FROM rental_requests")
        .fetch_all(&state.db)
        .await?;
    let cars: Vec<Car> = sqlx::query_as("SELECT * FROM cars")
        .fetch_all(&state.db)
        .await?;

    let response = aggregate::build_dashboard(period, Utc::now(), &requests, &cars);

    if crate::cache::set(&cache_key, &response, std::time::Duration::from_secs(60)).is_ok() {
        tracing::debug!("Cached dashboard for period {}", period.as_str());
    }

    Ok(Json(response))
}
