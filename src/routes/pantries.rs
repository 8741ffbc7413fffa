use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{schedule::status_or_closed, Clock, RankedSearch};
use crate::models::{
    ErrorResponse, HealthResponse, Pantry, PantryStatusResponse, PantryView, ReviewPageQuery,
    SearchPantriesQuery, SearchPantriesResponse, SubmitReviewRequest, SubmitReviewResponse,
};
use crate::services::{CacheManager, PantryCatalog};
use chrono::NaiveDateTime;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<PantryCatalog>,
    pub cache: Arc<CacheManager>,
    pub clock: Arc<dyn Clock>,
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Configure all pantry routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/pantries", web::get().to(search_pantries))
        .route("/pantries/{id}", web::get().to(get_pantry))
        .route("/pantries/{id}/status", web::get().to(pantry_status))
        .route("/pantries/{id}/reviews", web::get().to(list_reviews))
        .route("/pantries/{id}/reviews", web::post().to(submit_review));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    error_response(actix_web::http::StatusCode::BAD_REQUEST, error, message)
}

fn not_found(pantry_id: &str) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::NOT_FOUND,
        "Pantry not found",
        format!("No pantry with id {}", pantry_id),
    )
}

fn view(pantry: Pantry, now: NaiveDateTime) -> PantryView {
    let status = status_or_closed(&pantry, now);
    PantryView::new(pantry, status)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = match state.catalog.reviews() {
        Some(reviews) => reviews.health_check().await.unwrap_or(false),
        None => true,
    };

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.catalog.backend_name().to_string(),
        cached_entries: state.cache.stats().l1_size,
        timestamp: chrono::Utc::now(),
    })
}

/// Search pantries endpoint
///
/// GET /api/v1/pantries?lat=37.77&lng=-122.42&isOpen=true&categories=Produce,Dairy
///
/// Returns pantries sorted by distance (closest first; pantries without a
/// distance last), each with its current opening status.
async fn search_pantries(
    state: web::Data<AppState>,
    query: web::Query<SearchPantriesQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for pantry search: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let filter = match query.to_filter() {
        Ok(filter) => filter,
        Err(e) => return bad_request("Invalid filter", e.to_string()),
    };

    let user_location = match query.user_location() {
        Ok(location) => location,
        Err(e) => return bad_request("Invalid location", e.to_string()),
    };

    let now = query.at.unwrap_or_else(|| state.clock.now());
    let limit = query.limit.unwrap_or(state.default_limit).min(state.max_limit);

    let pantries = match state.catalog.snapshot().await {
        Ok(pantries) => pantries,
        Err(e) => {
            tracing::error!("Failed to load pantries: {}", e);
            return error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load pantries",
                e.to_string(),
            );
        }
    };

    let outcome = RankedSearch::new()
        .with_limit(limit)
        .run(&pantries, user_location, &filter, now);

    if outcome.schedule_errors > 0 {
        tracing::warn!("{} pantries have invalid schedules", outcome.schedule_errors);
    }

    tracing::info!(
        "Returning {} pantries (from {} candidates, located: {})",
        outcome.pantries.len(),
        outcome.total_candidates,
        user_location.is_some()
    );

    HttpResponse::Ok().json(SearchPantriesResponse {
        pantries: outcome.pantries.into_iter().map(|p| view(p, now)).collect(),
        total_results: outcome.total_results,
        total_candidates: outcome.total_candidates,
        schedule_errors: outcome.schedule_errors,
    })
}

/// Get pantry endpoint
///
/// GET /api/v1/pantries/{id}
async fn get_pantry(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let pantry_id = path.into_inner();

    match state.catalog.pantry(&pantry_id).await {
        Ok(Some(pantry)) => HttpResponse::Ok().json(view(pantry, state.clock.now())),
        Ok(None) => not_found(&pantry_id),
        Err(e) => {
            tracing::error!("Failed to fetch pantry {}: {}", pantry_id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch pantry",
                e.to_string(),
            )
        }
    }
}

/// Pantry status endpoint
///
/// GET /api/v1/pantries/{id}/status
///
/// Evaluates only the schedule, for status badges.
async fn pantry_status(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let pantry_id = path.into_inner();

    let pantry = match state.catalog.pantry(&pantry_id).await {
        Ok(Some(pantry)) => pantry,
        Ok(None) => return not_found(&pantry_id),
        Err(e) => {
            tracing::error!("Failed to fetch pantry {}: {}", pantry_id, e);
            return error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch pantry",
                e.to_string(),
            );
        }
    };

    let status = status_or_closed(&pantry, state.clock.now());

    HttpResponse::Ok().json(PantryStatusResponse {
        pantry_id,
        status_text: status.status_text(),
        badge: status.badge(),
        status,
    })
}

/// List reviews endpoint
///
/// GET /api/v1/pantries/{id}/reviews?limit=20&offset=0
async fn list_reviews(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ReviewPageQuery>,
) -> impl Responder {
    let pantry_id = path.into_inner();

    if let Err(errors) = query.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let Some(reviews) = state.catalog.reviews() else {
        return reviews_unavailable();
    };

    match reviews
        .list_reviews(&pantry_id, query.limit as usize, query.offset as usize)
        .await
    {
        Ok(reviews) => HttpResponse::Ok().json(serde_json::json!({
            "pantryId": pantry_id,
            "reviews": reviews,
            "count": reviews.len(),
        })),
        Err(e) => {
            tracing::error!("Failed to list reviews for {}: {}", pantry_id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list reviews",
                e.to_string(),
            )
        }
    }
}

/// Submit review endpoint
///
/// POST /api/v1/pantries/{id}/reviews
///
/// Request body:
/// ```json
/// {
///   "rating": 4,
///   "comment": "string"
/// }
/// ```
async fn submit_review(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<SubmitReviewRequest>,
) -> impl Responder {
    let pantry_id = path.into_inner();

    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let Some(reviews) = state.catalog.reviews() else {
        return reviews_unavailable();
    };

    match state.catalog.pantry(&pantry_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&pantry_id),
        Err(e) => {
            tracing::error!("Failed to fetch pantry {}: {}", pantry_id, e);
            return error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch pantry",
                e.to_string(),
            );
        }
    }

    match reviews
        .record_review(&pantry_id, req.rating, req.comment.as_deref())
        .await
    {
        Ok(review_id) => {
            // Ratings are joined into cached snapshots
            state.catalog.invalidate(&pantry_id).await;

            HttpResponse::Ok().json(SubmitReviewResponse {
                success: true,
                review_id: review_id.to_string(),
            })
        }
        Err(e) => {
            tracing::error!("Failed to record review for {}: {}", pantry_id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record review",
                e.to_string(),
            )
        }
    }
}

fn reviews_unavailable() -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::SERVICE_UNAVAILABLE,
        "Reviews unavailable",
        "No review database is configured".to_string(),
    )
}
