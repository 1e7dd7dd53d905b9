use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use tracing::{error, info};

use crate::app_state::AppState;
use crate::models::{AnalyzeRequest, AnalyzeResponse, Thresholds};
use crate::services::analysis::{assemble_response, run_analysis, EngineParams};
use crate::services::{itunes, reviews};
use crate::utils::validators::{
    clean_app_id, validate_country, validate_review_limit, ValidationError,
};

pub async fn analyze_reviews(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, String)> {
    let started = Instant::now();

    let app_id = clean_app_id(&request.app_id).map_err(bad_request)?;
    let country = validate_country(&request.country).map_err(bad_request)?;
    validate_review_limit(request.review_limit, state.config.max_review_limit)
        .map_err(bad_request)?;

    let params = EngineParams {
        model: request.sentiment_model.clone(),
        weights: request.weights,
        thresholds: Thresholds {
            neg: state.config.neg_threshold,
            pos: state.config.pos_threshold,
        },
        ngram_range: request.ngram_range,
        min_df: request.min_df,
        top_k: request.top_k_phrases,
        recency_cutoffs_days: request.recency_cutoffs_days.clone(),
    };
    params.validate().map_err(bad_request)?;

    // An explicitly supplied empty batch is analyzable (all-zero overview);
    // only a fetch that finds nothing is a 404.
    let raw_reviews = match request.reviews_override {
        Some(items) => items,
        None => {
            let (items, pages) = itunes::fetch_reviews_paged(
                &state.http,
                &app_id,
                &country,
                request.review_limit as usize,
                state.config.fetch_delay_ms,
            )
            .await
            .map_err(|e| {
                error!("Failed to fetch reviews for app {}: {}", app_id, e);
                (StatusCode::BAD_GATEWAY, e.to_string())
            })?;
            info!(
                "Fetched {} reviews over {} pages for app {}",
                items.len(),
                pages,
                app_id
            );
            if items.is_empty() {
                return Err((
                    StatusCode::NOT_FOUND,
                    format!(
                        "No reviews found for app ID '{}' in {} App Store",
                        app_id,
                        country.to_uppercase()
                    ),
                ));
            }
            items
        }
    };

    let batch = reviews::prepare_reviews(&raw_reviews, Utc::now(), 0);
    let outcome = run_analysis(&batch, &params, state.config.low_sample_threshold);
    let response = assemble_response(
        &app_id,
        &country,
        &params,
        outcome,
        started.elapsed().as_millis() as u64,
    );

    Ok(Json(response))
}

fn bad_request(e: ValidationError) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}
