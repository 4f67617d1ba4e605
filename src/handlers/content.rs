use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::{
    Brand, BrandBody, ContactInfo, Faq, FaqBody, GalleryImage, GalleryImageBody, GalleryListParams,
    HeroSlide, HeroSlideBody, UpdateContactBody,
};
use crate::AppState;

/// Public content routes consumed by the marketing site
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contact", get(get_contact))
        .route("/faqs", get(list_faqs))
        .route("/brands", get(list_brands))
        .route("/hero", get(list_hero_slides))
        .route("/gallery", get(list_gallery))
}

/// Admin content-management routes
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/contact", put(update_contact))
        .route("/faqs", post(create_faq))
        .route("/faqs/:id", put(update_faq).delete(delete_faq))
        .route("/brands", post(create_brand))
        .route("/brands/:id", put(update_brand).delete(delete_brand))
        .route("/hero", post(create_hero_slide))
        .route("/hero/:id", put(update_hero_slide).delete(delete_hero_slide))
        .route("/gallery", post(create_gallery_image))
        .route(
            "/gallery/:id",
            put(update_gallery_image).delete(delete_gallery_image),
        )
}

// --- Contact info (singleton) ---

pub async fn get_contact(State(state): State<AppState>) -> Result<Json<ContactInfo>, AppError> {
    let contact = sqlx::query_as::<_, ContactInfo>("SELECT * FROM contact_info WHERE id = 1")
        .fetch_one(&state.db)
        .await?;
    Ok(Json(contact))
}

pub async fn update_contact(
    State(state): State<AppState>,
    Json(body): Json<UpdateContactBody>,
) -> Result<Json<ContactInfo>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let existing = sqlx::query_as::<_, ContactInfo>("SELECT * FROM contact_info WHERE id = 1")
        .fetch_one(&state.db)
        .await?;

    let contact = sqlx::query_as::<_, ContactInfo>(
        r#"
        UPDATE contact_info
        SET phone = $1, email = $2, whatsapp = $3, address = $4,
            working_hours = $5, instagram_url = $6, facebook_url = $7,
            updated_at = NOW()
        WHERE id = 1
        RETURNING *
        "#,
    )
    .bind(body.phone.or(existing.phone))
    .bind(body.email.or(existing.email))
    .bind(body.whatsapp.or(existing.whatsapp))
    .bind(body.address.or(existing.address))
    .bind(body.working_hours.or(existing.working_hours))
    .bind(body.instagram_url.or(existing.instagram_url))
    .bind(body.facebook_url.or(existing.facebook_url))
    .fetch_one(&state.db)
    .await?;

    Ok(Json(contact))
}

// --- FAQs ---

pub async fn list_faqs(State(state): State<AppState>) -> Result<Json<Vec<Faq>>, AppError> {
    let faqs = sqlx::query_as::<_, Faq>(
        "SELECT * FROM faqs WHERE active = TRUE ORDER BY sort_order ASC, created_at ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(faqs))
}

pub async fn create_faq(
    State(state): State<AppState>,
    Json(body): Json<FaqBody>,
) -> Result<Json<Faq>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let faq = sqlx::query_as::<_, Faq>(
        r#"
        INSERT INTO faqs (question, answer, sort_order, active)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&body.question)
    .bind(&body.answer)
    .bind(body.sort_order)
    .bind(body.active)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(faq))
}

pub async fn update_faq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<FaqBody>,
) -> Result<Json<Faq>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let faq = sqlx::query_as::<_, Faq>(
        r#"
        UPDATE faqs
        SET question = $1, answer = $2, sort_order = $3, active = $4, updated_at = NOW()
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&body.question)
    .bind(&body.answer)
    .bind(body.sort_order)
    .bind(body.active)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("FAQ {} not found", id)))?;

    Ok(Json(faq))
}

pub async fn delete_faq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_row(&state, "faqs", id).await
}

// --- Brands ---

pub async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>, AppError> {
    let brands =
        sqlx::query_as::<_, Brand>("SELECT * FROM brands ORDER BY sort_order ASC, name ASC")
            .fetch_all(&state.db)
            .await?;
    Ok(Json(brands))
}

pub async fn create_brand(
    State(state): State<AppState>,
    Json(body): Json<BrandBody>,
) -> Result<Json<Brand>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let brand = sqlx::query_as::<_, Brand>(
        "INSERT INTO brands (name, logo_url, sort_order) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.logo_url)
    .bind(body.sort_order)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(brand))
}

pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<BrandBody>,
) -> Result<Json<Brand>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let brand = sqlx::query_as::<_, Brand>(
        "UPDATE brands SET name = $1, logo_url = $2, sort_order = $3 WHERE id = $4 RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.logo_url)
    .bind(body.sort_order)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))?;

    Ok(Json(brand))
}

pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_row(&state, "brands", id).await
}

// --- Hero slides ---

pub async fn list_hero_slides(
    State(state): State<AppState>,
) -> Result<Json<Vec<HeroSlide>>, AppError> {
    let slides = sqlx::query_as::<_, HeroSlide>(
        "SELECT * FROM hero_slides WHERE active = TRUE ORDER BY sort_order ASC, created_at ASC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(slides))
}

pub async fn create_hero_slide(
    State(state): State<AppState>,
    Json(body): Json<HeroSlideBody>,
) -> Result<Json<HeroSlide>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let slide = sqlx::query_as::<_, HeroSlide>(
        r#"
        INSERT INTO hero_slides (title, subtitle, image_url, cta_label, cta_url, sort_order, active)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(&body.title)
    .bind(&body.subtitle)
    .bind(&body.image_url)
    .bind(&body.cta_label)
    .bind(&body.cta_url)
    .bind(body.sort_order)
    .bind(body.active)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(slide))
}

pub async fn update_hero_slide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<HeroSlideBody>,
) -> Result<Json<HeroSlide>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let slide = sqlx::query_as::<_, HeroSlide>(
        r#"
        UPDATE hero_slides
        SET title = $1, subtitle = $2, image_url = $3, cta_label = $4,
            cta_url = $5, sort_order = $6, active = $7
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&body.title)
    .bind(&body.subtitle)
    .bind(&body.image_url)
    .bind(&body.cta_label)
    .bind(&body.cta_url)
    .bind(body.sort_order)
    .bind(body.active)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Hero slide {} not found", id)))?;

    Ok(Json(slide))
}

pub async fn delete_hero_slide(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_row(&state, "hero_slides", id).await
}

// --- Gallery ---

pub async fn list_gallery(
    Query(params): Query<GalleryListParams>,
    State(state): State<AppState>,
) -> Result<Json<Vec<GalleryImage>>, AppError> {
    let images = match &params.category {
        Some(category) => {
            sqlx::query_as::<_, GalleryImage>(
                "SELECT * FROM gallery_images WHERE category = $1 ORDER BY sort_order ASC, created_at ASC",
            )
            .bind(category)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, GalleryImage>(
                "SELECT * FROM gallery_images ORDER BY sort_order ASC, created_at ASC",
            )
            .fetch_all(&state.db)
            .await?
        }
    };
    Ok(Json(images))
}

pub async fn create_gallery_image(
    State(state): State<AppState>,
    Json(body): Json<GalleryImageBody>,
) -> Result<Json<GalleryImage>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let image = sqlx::query_as::<_, GalleryImage>(
        r#"
        INSERT INTO gallery_images (title, image_url, category, sort_order)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&body.title)
    .bind(&body.image_url)
    .bind(&body.category)
    .bind(body.sort_order)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(image))
}

pub async fn update_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<GalleryImageBody>,
) -> Result<Json<GalleryImage>, AppError> {
    body.validate()
        .map_err(|e| AppError::BadRequest(format!("Validation error: {}", e)))?;

    let image = sqlx::query_as::<_, GalleryImage>(
        r#"
        UPDATE gallery_images
        SET title = $1, image_url = $2, category = $3, sort_order = $4
        WHERE id = $5
        RETURNING *
        "#,
    )
    .bind(&body.title)
    .bind(&body.image_url)
    .bind(&body.category)
    .bind(body.sort_order)
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Gallery image {} not found", id)))?;

    Ok(Json(image))
}

pub async fn delete_gallery_image(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_row(&state, "gallery_images", id).await
}

// Content tables share the same delete shape. Table names are compile-time
// constants, never user input.
async fn delete_row(
    state: &AppState,
    table: &str,
    id: Uuid,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Row {} not found in {}",
            id, table
        )));
    }

    Ok(Json(json!({
        "success": true,
        "id": id
    })))
}
