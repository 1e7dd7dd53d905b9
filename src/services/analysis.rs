//! The analysis pipeline: sentiment -> negative subset -> phrases ->
//! recency -> insights, assembled into the response shape.
//!
//! Every stage is a pure function of its inputs; nothing here touches I/O or
//! shared state, so concurrent requests run as independent pipelines.

use crate::models::{
    AnalyzeMeta, AnalyzeResponse, DebugInfo, Insight, NegativePhrase, Phrase, Review,
    SentimentOverview, Thresholds, Weights,
};
use crate::services::{insights, phrases, phrases::PhraseParams, sentiment};
use crate::utils::validators::{
    self, ValidationError,
};

#[derive(Debug, Clone)]
pub struct EngineParams {
    pub model: String,
    pub weights: Weights,
    pub thresholds: Thresholds,
    pub ngram_range: (usize, usize),
    pub min_df: usize,
    pub top_k: usize,
    pub recency_cutoffs_days: Vec<i64>,
}

impl EngineParams {
    /// Reject malformed parameters before any pipeline stage runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validators::validate_model(&self.model)?;
        validators::validate_weights(&self.weights)?;
        validators::validate_thresholds(&self.thresholds)?;
        validators::validate_ngram_range(self.ngram_range)?;
        validators::validate_min_df(self.min_df)?;
        validators::validate_top_k(self.top_k)?;
        validators::validate_recency_cutoffs(&self.recency_cutoffs_days)?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct AnalysisOutcome {
    pub analyzed: usize,
    pub overview: SentimentOverview,
    pub phrases: Vec<Phrase>,
    pub insights: Vec<Insight>,
    pub low_sample: bool,
    pub no_negative_signal: bool,
}

/// Run the full engine over a prepared batch. Deterministic: identical
/// batches and parameters produce identical outcomes.
pub fn run_analysis(
    reviews: &[Review],
    params: &EngineParams,
    low_sample_threshold: usize,
) -> AnalysisOutcome {
    let (sentiments, overview) =
        sentiment::score_reviews(reviews, &params.weights, &params.thresholds);

    let negative_idx = sentiment::negative_indices(reviews, &sentiments, &params.thresholds);
    let negative: Vec<&Review> = negative_idx.iter().map(|&i| &reviews[i]).collect();
    let no_negative_signal = negative.is_empty();
    let low_sample = reviews.len() < low_sample_threshold;

    let phrase_params = PhraseParams {
        ngram_range: params.ngram_range,
        min_df: params.min_df,
        top_k: params.top_k,
    };
    let mut ranked = phrases::extract_phrases(
        &negative,
        reviews,
        &phrase_params,
        &params.recency_cutoffs_days,
    );
    phrases::apply_recency_boost(&mut ranked);

    let generated = insights::generate_insights(&ranked, low_sample);

    AnalysisOutcome {
        analyzed: reviews.len(),
        overview,
        phrases: ranked,
        insights: generated,
        low_sample,
        no_negative_signal,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Assemble the response DTO. Rounding happens here and only here, so
/// scoring math never accumulates rounding error across stages.
pub fn assemble_response(
    app_id: &str,
    country: &str,
    params: &EngineParams,
    outcome: AnalysisOutcome,
    processing_time_ms: u64,
) -> AnalyzeResponse {
    let overview = SentimentOverview {
        pos: round_to(outcome.overview.pos, 3),
        neu: round_to(outcome.overview.neu, 3),
        neg: round_to(outcome.overview.neg, 3),
        mean_star: round_to(outcome.overview.mean_star, 2),
    };

    let top_negative_phrases = outcome
        .phrases
        .iter()
        .map(|p| NegativePhrase {
            phrase: p.text.clone(),
            score: round_to(p.importance, 3),
            count: p.total_count,
            share_neg: round_to(p.share_neg, 3),
        })
        .collect();

    AnalyzeResponse {
        status: "ok".to_string(),
        meta: AnalyzeMeta {
            app_id: app_id.to_string(),
            country: country.to_string(),
            analyzed: outcome.analyzed,
            processing_time_ms,
        },
        sentiment_overview: overview,
        top_negative_phrases,
        insights: outcome.insights,
        debug: DebugInfo {
            model: params.model.clone(),
            thresholds: params.thresholds,
            low_sample: outcome.low_sample,
            no_negative_signal: outcome.no_negative_signal,
        },
    }
}
