use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::handlers::cars::fetch_car_by_id;
use crate::models::{
    Car, CreateRequestBody, RentalRequest, RequestListParams, RequestListResponse, RequestStatus,
    UnavailableRange,
};
use crate::AppState;

/// Public submission route
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_request))
}

/// Admin triage routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests))
        .route("/:id", get(get_request))
        .route("/:id/accept", post(accept_request))
        .route("/:id/reject", post(reject_request))
}

/// POST /api/requests - Customer booking submission
///
/// Rejects with the full list of missing field names; no partial record is
/// ever created.
pub async fn create_request(
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> Result<Json<RentalRequest>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let submission = body.into_new().map_err(AppError::MissingFields)?;

    if submission.date_to < submission.date_from {
        return Err(AppError::BadRequest(
            "date_to must not precede date_from".to_string(),
        ));
    }
    if submission.total_days < 0 {
        return Err(AppError::BadRequest(
            "total_days must not be negative".to_string(),
        ));
    }
    // The client computes billed days; a mismatch is worth a log line but the
    // submitted value is what the customer saw and agreed to
    let computed_days = crate::dates::day_count(submission.date_from, submission.date_to);
    if i64::from(submission.total_days) != computed_days {
        tracing::warn!(
            "Submitted total_days {} differs from computed {} for {} - {}",
            submission.total_days,
            computed_days,
            submission.date_from,
            submission.date_to
        );
    }

    // Car name is denormalized at submission time for display and for
    // matching should the id column ever be scrubbed
    let car = fetch_car_by_id(&state.db, submission.car_id).await?;

    let request: RentalRequest = sqlx::query_as(
        r#"
        INSERT INTO rental_requests (name, contact, car_id, car_name, date_from, date_to,
                                     total_days, rental_type, total_price, message, status,
                                     urgent, user_ref)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending', $11, $12)
        RETURNING *
        "#,
    )
    .bind(&submission.name)
    .bind(&submission.contact)
    .bind(submission.car_id)
    .bind(&car.title)
    .bind(submission.date_from)
    .bind(submission.date_to)
    .bind(submission.total_days)
    .bind(submission.rental_type.as_str())
    .bind(&submission.total_price)
    .bind(&submission.message)
    .bind(submission.urgent)
    .bind(&submission.user_ref)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to insert rental request: {}", e);
        AppError::DatabaseError("Failed to create rental request".to_string())
    })?;

    crate::cache::invalidate_prefix("dashboard:");

    Ok(Json(request))
}

/// GET /api/admin/requests - Triage listing, urgent first then newest
///
/// Parameters:
/// - status: Filter by status (pending, accepted, rejected)
/// - page: Page number (0-indexed, default: 0)
/// - limit: Results per page (default: 50, max: 100)
pub async fn list_requests(
    Query(params): Query<RequestListParams>,
    State(state): State<AppState>,
) -> Result<Json<RequestListResponse>, AppError> {
    let page = params.page.unwrap_or(0).max(0);
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let offset = page * limit;

    let status = match &params.status {
        Some(raw) => Some(RequestStatus::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Unknown status '{}', expected pending, accepted or rejected",
                raw
            ))
        })?),
        None => None,
    };

    let mut count_query =
        QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM rental_requests WHERE 1=1");
    if let Some(status) = status {
        count_query.push(" AND status = ");
        count_query.push_bind(status.as_str());
    }
    let total: i64 = count_query
        .build_query_scalar()
        .fetch_one(&state.db)
        .await?;

    let mut select_query =
        QueryBuilder::<Postgres>::new("SELECT * FROM rental_requests WHERE 1=1");
    if let Some(status) = status {
        select_query.push(" AND status = ");
        select_query.push_bind(status.as_str());
    }
    select_query.push(" ORDER BY urgent DESC, created_at DESC LIMIT ");
    select_query.push_bind(limit);
    select_query.push(" OFFSET ");
    select_query.push_bind(offset);

    let requests: Vec<RentalRequest> =
        select_query.build_query_as().fetch_all(&state.db).await?;

    let total_pages = if limit > 0 {
        ((total as f64) / (limit as f64)).ceil() as i64
    } else {
        0
    };

    Ok(Json(RequestListResponse {
        requests,
        total,
        page,
        limit,
        total_pages,
    }))
}

/// GET /api/admin/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RentalRequest>, AppError> {
    let request = sqlx::query_as::<_, RentalRequest>("SELECT * FROM rental_requests WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;

    Ok(Json(request))
}

/// POST /api/admin/requests/:id/accept
///
/// Accepting reserves the requested range against the car: the status write
/// and the unavailable-range append commit in one transaction. Terminal
/// requests cannot be re-accepted.
pub async fn accept_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut tx = state.db.begin().await?;

    let request: RentalRequest =
        sqlx::query_as("SELECT * FROM rental_requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;

    if !request.is_pending() {
        return Err(AppError::Conflict(format!(
            "Request {} is already {}",
            id, request.status
        )));
    }

    let updated: RentalRequest = sqlx::query_as(
        "UPDATE rental_requests SET status = 'accepted', updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    match request.car_id {
        Some(car_id) => {
            let car: Option<Car> = sqlx::query_as("SELECT * FROM cars WHERE id = $1 FOR UPDATE")
                .bind(car_id)
                .fetch_optional(&mut *tx)
                .await?;
            match car {
                Some(car) => {
                    let mut ranges = car.unavailable_ranges.0;
                    ranges.push(UnavailableRange::new(request.date_from, request.date_to));
                    sqlx::query(
                        "UPDATE cars SET unavailable_ranges = $1, updated_at = NOW() WHERE id = $2",
                    )
                    .bind(sqlx::types::Json(ranges))
                    .bind(car_id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => tracing::warn!(
                    "Request {} references missing car {}; accepted without range append",
                    id,
                    car_id
                ),
            }
        }
        // Legacy rows created before car_id became required
        None => tracing::warn!("Request {} has no car reference; accepted without range append", id),
    }

    tx.commit().await?;

    crate::cache::invalidate_prefix("dashboard:");
    crate::cache::invalidate_prefix("cars:");

    tracing::info!("Request {} accepted", id);

    Ok(Json(json!({
        "success": true,
        "request": updated
    })))
}

/// POST /api/admin/requests/:id/reject - Status-only write, never touches a car
pub async fn reject_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let updated: Option<RentalRequest> = sqlx::query_as(
        r#"
        UPDATE rental_requests SET status = 'rejected', updated_at = NOW()
        WHERE id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    match updated {
        Some(request) => {
            crate::cache::invalidate_prefix("dashboard:");
            tracing::info!("Request {} rejected", id);
            Ok(Json(json!({
                "success": true,
                "request": request
            })))
        }
        None => {
            let existing: Option<(String,)> =
                sqlx::query_as("SELECT status FROM rental_requests WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&state.db)
                    .await?;
            match existing {
                Some((status,)) => Err(AppError::Conflict(format!(
                    "Request {} is already {}",
                    id, status
                ))),
                None => Err(AppError::NotFound(format!("Request {} not found", id))),
            }
        }
    }
}
