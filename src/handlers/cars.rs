use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::availability::{self, Selection, DEFAULT_HORIZON_DAYS};
use crate::dates;
use crate::errors::AppError;
use crate::models::{
    AvailabilityParams, AvailabilityResponse, Car, CarListParams, CarListResponse,
    CreateCarRequest, UnavailableRange, UpdateCarRequest,
};
use crate::pricing::{self, RatePlan, RentalType};
use crate::AppState;

/// Public catalog routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cars))
        .route("/:id", get(get_car))
        .route("/:id/availability", get(check_availability))
}

/// Admin fleet-management routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_car))
        .route("/:id", put(update_car))
        .route("/:id/activate", post(activate_car))
        .route("/:id/deactivate", post(deactivate_car))
}

/// GET /api/cars - Public catalog listing
///
/// Parameters:
/// - page: Page number (0-indexed, default: 0)
/// - limit: Results per page (default: 50, max: 100)
/// - brand: Filter by brand; single value or comma-separated list
/// - sort_by: Field to sort by (brand, title, price_daily, newest)
/// - sort_dir: Sort direction (asc, desc)
pub async fn list_cars(
    Query(params): Query<CarListParams>,
    State(state): State<AppState>,
) -> Result<Json<CarListResponse>, AppError> {
    let page = params.page.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let offset = page * limit;

    let sort_by = params.sort_by.as_deref().unwrap_or("newest");
    let sort_dir = match params.sort_dir.as_deref() {
        Some("desc") => "DESC",
        _ => "ASC",
    };

    let cache_key = format!(
        "cars:list:{}:{}:{:?}:{}:{}",
        page, limit, params.brand, sort_by, sort_dir
    );
    if let Some(cached) = crate::cache::get::<CarListResponse>(&cache_key) {
        return Ok(Json(cached));
    }

    let mut count_query =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM cars WHERE active = TRUE");
    if !params.brand.is_empty() {
        count_query.push(" AND brand = ANY(");
        count_query.push_bind(params.brand.clone());
        count_query.push(")");
    }
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    let mut select_query =
        QueryBuilder::<Postgres>::new("SELECT * FROM cars WHERE active = TRUE");
    if !params.brand.is_empty() {
        select_query.push(" AND brand = ANY(");
        select_query.push_bind(params.brand.clone());
        select_query.push(")");
    }

    // Price columns are display strings; strip decorations in SQL so the
    // ordering matches the lenient parse used everywhere else
    let order_clause = match sort_by {
        "brand" => format!(" ORDER BY brand {}, title ASC", sort_dir),
        "title" => format!(" ORDER BY title {}", sort_dir),
        "price_daily" => format!(
            " ORDER BY NULLIF(regexp_replace(price_daily, '[^0-9.]', '', 'g'), '')::numeric {} NULLS LAST, title ASC",
            sort_dir
        ),
        _ => " ORDER BY created_at DESC".to_string(),
    };
    select_query.push(order_clause);
    select_query.push(" LIMIT ");
    select_query.push_bind(limit);
    select_query.push(" OFFSET ");
    select_query.push_bind(offset);

    let cars: Vec<Car> = select_query.build_query_as().fetch_all(&state.db).await?;

    let total_pages = if limit > 0 {
        ((total as f64) / (limit as f64)).ceil() as i64
    } else {
        0
    };

    let response = CarListResponse {
        cars,
        total,
        page,
        limit,
        total_pages,
    };

    if crate::cache::set(&cache_key, &response, std::time::Duration::from_secs(60)).is_ok() {
        tracing::debug!("Cached car list page {}", page);
    }

    Ok(Json(response))
}

/// GET /api/cars/:id
pub async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Car>, AppError> {
    let car = fetch_car_by_id(&state.db, id).await?;
    Ok(Json(car))
}

/// GET /api/cars/:id/availability - Bookability check and quote
///
/// With date_from and date_to, reports whether the inclusive range is
/// bookable and quotes a price under the chosen rental_type. Without dates,
/// reports today's availability. Always includes the nearest bookable date;
/// null means nothing is free within the scan horizon.
pub async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let car = fetch_car_by_id(&state.db, id).await?;
    let ranges = &car.unavailable_ranges.0;
    let today = Utc::now().date_naive();
    let nearest = availability::nearest_available_date(ranges, today, DEFAULT_HORIZON_DAYS);

    match (params.date_from, params.date_to) {
        (Some(date_from), Some(date_to)) => {
            if date_to < date_from {
                return Err(AppError::BadRequest(
                    "date_to must not precede date_from".to_string(),
                ));
            }

            // Mirror the booking form: the start must be pickable today, the
            // end must follow it, and nothing in between may be blocked
            let available = availability::is_selectable(date_from, today, ranges, Selection::Start)
                && availability::is_selectable(
                    date_to,
                    today,
                    ranges,
                    Selection::End { start: date_from },
                )
                && availability::is_range_bookable(date_from, date_to, ranges);

            let total_days = dates::day_count(date_from, date_to);
            let rental_type = params.rental_type.unwrap_or(RentalType::Daily);
            let rates = RatePlan {
                daily: pricing::parse_price(&car.price_daily),
                weekly: pricing::parse_price(&car.price_weekly),
                monthly: pricing::parse_price(&car.price_monthly),
            };
            let total_price = pricing::rental_price(total_days, rental_type, &rates);

            Ok(Json(AvailabilityResponse {
                car_id: car.id,
                available,
                date_from: Some(date_from),
                date_to: Some(date_to),
                total_days: Some(total_days),
                total_price: Some(total_price),
                nearest_available_date: nearest,
            }))
        }
        (None, None) => Ok(Json(AvailabilityResponse {
            car_id: car.id,
            available: availability::is_available(today, ranges),
            date_from: None,
            date_to: None,
            total_days: None,
            total_price: None,
            nearest_available_date: nearest,
        })),
        _ => Err(AppError::BadRequest(
            "date_from and date_to must be provided together".to_string(),
        )),
    }
}

/// POST /api/admin/cars
pub async fn create_car(
    State(state): State<AppState>,
    Json(body): Json<CreateCarRequest>,
) -> Result<Json<Car>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let car: Car = sqlx::query_as(
        r#"
        INSERT INTO cars (brand, model, title, description, price_daily, price_weekly, price_monthly,
                          unavailable_ranges, image_url, seats, doors, transmission)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(&body.brand)
    .bind(&body.model)
    .bind(&body.title)
    .bind(&body.description)
    .bind(&body.price_daily)
    .bind(&body.price_weekly)
    .bind(&body.price_monthly)
    .bind(sqlx::types::Json(Vec::<UnavailableRange>::new()))
    .bind(&body.image_url)
    .bind(body.seats)
    .bind(body.doors)
    .bind(&body.transmission)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert car: {}", e);
        AppError::DatabaseError("Failed to create car".to_string())
    })?;

    crate::cache::invalidate_prefix("cars:");
    crate::cache::invalidate_prefix("dashboard:");

    Ok(Json(car))
}

/// PUT /api/admin/cars/:id - Partial field update; absent fields keep their value
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateCarRequest>,
) -> Result<Json<Car>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let car = fetch_car_by_id(&state.db, id).await?;

    let updated: Car = sqlx::query_as(
        r#"
        UPDATE cars
        SET brand = $1, model = $2, title = $3, description = $4,
            price_daily = $5, price_weekly = $6, price_monthly = $7,
            image_url = $8, seats = $9, doors = $10, transmission = $11,
            updated_at = NOW()
        WHERE id = $12
        RETURNING *
        "#,
    )
    .bind(body.brand.unwrap_or(car.brand))
    .bind(body.model.unwrap_or(car.model))
    .bind(body.title.unwrap_or(car.title))
    .bind(body.description.or(car.description))
    .bind(body.price_daily.unwrap_or(car.price_daily))
    .bind(body.price_weekly.unwrap_or(car.price_weekly))
    .bind(body.price_monthly.unwrap_or(car.price_monthly))
    .bind(body.image_url.or(car.image_url))
    .bind(body.seats.or(car.seats))
    .bind(body.doors.or(car.doors))
    .bind(body.transmission.or(car.transmission))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    crate::cache::invalidate_prefix("cars:");
    crate::cache::invalidate_prefix("dashboard:");

    Ok(Json(updated))
}

/// POST /api/admin/cars/:id/activate
pub async fn activate_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    set_active(&state, id, true).await
}

/// POST /api/admin/cars/:id/deactivate - Cars are never deleted, only retired
pub async fn deactivate_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    set_active(&state, id, false).await
}

async fn set_active(
    state: &AppState,
    id: Uuid,
    active: bool,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("UPDATE cars SET active = $1, updated_at = NOW() WHERE id = $2")
        .bind(active)
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Car {} not found", id)));
    }

    crate::cache::invalidate_prefix("cars:");
    crate::cache::invalidate_prefix("dashboard:");

    Ok(Json(json!({
        "success": true,
        "id": id,
        "active": active
    })))
}

/// Fetch car by ID
pub async fn fetch_car_by_id(pool: &PgPool, id: Uuid) -> Result<Car, AppError> {
    sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Car {} not found", id)))
}
