use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::error;

use crate::app_state::AppState;
use crate::models::{
    AppInfoResponse, AppReviewsResponse, BatchSummary, CollectData, CollectMeta, CollectRequest,
    CollectResponse,
};
use crate::services::{itunes, itunes::FetchError, reviews};
use crate::utils::normalization::summarize_stars;
use crate::utils::validators::{
    clean_app_id, validate_country, validate_review_limit, ValidationError,
};

// Fixed page size for the plain reviews endpoint
const REVIEWS_ENDPOINT_LIMIT: usize = 100;
// Echoed raw/clean reviews are truncated to keep payloads bounded
const RESPONSE_DATA_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "us".to_string()
}

pub async fn get_app_info(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<AppInfoResponse>, (StatusCode, String)> {
    let app_id = clean_app_id(&app_id).map_err(bad_request)?;
    let country = validate_country(&query.country).map_err(bad_request)?;

    match itunes::fetch_app_info(&state.http, &app_id, &country).await {
        Ok(Some(details)) => Ok(Json(AppInfoResponse {
            status: "success".to_string(),
            details,
        })),
        Ok(None) => Err(app_not_found(&app_id, &country)),
        Err(e) => {
            error!("App lookup failed for {}: {}", app_id, e);
            Err(upstream_error(e))
        }
    }
}

pub async fn get_app_reviews(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<AppReviewsResponse>, (StatusCode, String)> {
    let app_id = clean_app_id(&app_id).map_err(bad_request)?;
    let country = validate_country(&query.country).map_err(bad_request)?;

    let (items, _pages) = itunes::fetch_reviews_paged(
        &state.http,
        &app_id,
        &country,
        REVIEWS_ENDPOINT_LIMIT,
        state.config.fetch_delay_ms,
    )
    .await
    .map_err(|e| {
        error!("Failed to fetch reviews for app {}: {}", app_id, e);
        upstream_error(e)
    })?;

    if items.is_empty() {
        return Err(reviews_not_found(&app_id, &country));
    }

    Ok(Json(AppReviewsResponse {
        status: "success".to_string(),
        count: items.len(),
        items,
    }))
}

pub async fn collect_and_preprocess(
    State(state): State<AppState>,
    Json(request): Json<CollectRequest>,
) -> Result<Json<CollectResponse>, (StatusCode, String)> {
    let started = Instant::now();

    let app_id = clean_app_id(&request.app_id).map_err(bad_request)?;
    let country = validate_country(&request.country).map_err(bad_request)?;
    validate_review_limit(request.review_limit, state.config.max_review_limit)
        .map_err(bad_request)?;

    let app_info = match itunes::fetch_app_info(&state.http, &app_id, &country).await {
        Ok(Some(details)) => details,
        Ok(None) => return Err(app_not_found(&app_id, &country)),
        Err(e) => {
            error!("App lookup failed for {}: {}", app_id, e);
            return Err(upstream_error(e));
        }
    };

    let (raw_reviews, pages_fetched) = itunes::fetch_reviews_paged(
        &state.http,
        &app_id,
        &country,
        request.review_limit as usize,
        state.config.fetch_delay_ms,
    )
    .await
    .map_err(|e| {
        error!("Failed to fetch reviews for app {}: {}", app_id, e);
        upstream_error(e)
    })?;

    if raw_reviews.is_empty() {
        return Err(reviews_not_found(&app_id, &country));
    }

    let prepared = reviews::prepare_reviews(&raw_reviews, Utc::now(), request.min_tokens);
    let (mean_star, by_star) = summarize_stars(&raw_reviews);
    let lang_distribution = reviews::language_distribution(&prepared);

    let mut clean_reviews = reviews::to_clean_reviews(&prepared);
    clean_reviews.truncate(RESPONSE_DATA_LIMIT);
    let mut raw_echo = raw_reviews.clone();
    raw_echo.truncate(RESPONSE_DATA_LIMIT);

    Ok(Json(CollectResponse {
        status: "ok".to_string(),
        meta: CollectMeta {
            app_id,
            country,
            collected_reviews: raw_reviews.len(),
            pages_fetched,
            processing_time_ms: started.elapsed().as_millis() as u64,
        },
        app_info,
        summary: BatchSummary {
            mean_star,
            by_star,
            lang_distribution,
        },
        data: CollectData {
            raw_reviews: raw_echo,
            clean_reviews,
        },
    }))
}

fn bad_request(e: ValidationError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn upstream_error(e: FetchError) -> (StatusCode, String) {
    (StatusCode::BAD_GATEWAY, e.to_string())
}

fn app_not_found(app_id: &str, country: &str) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!(
            "App with ID '{}' not found in {} App Store",
            app_id,
            country.to_uppercase()
        ),
    )
}

fn reviews_not_found(app_id: &str, country: &str) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!(
            "No reviews found for app ID '{}' in {} App Store",
            app_id,
            country.to_uppercase()
        ),
    )
}
