use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A review as delivered by the iTunes RSS feed or supplied via
/// `reviews_override`. Everything except the rating is optional because the
/// feed omits fields freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(rename = "reviewId", default)]
    pub review_id: Option<String>,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// A preprocessed review, ready for the analysis pipeline. Immutable once
/// built; `age_days` is None when the feed timestamp is missing or unparsable.
#[derive(Debug, Clone)]
pub struct Review {
    pub id: String,
    pub rating: u8,
    pub clean_text: String,
    pub tokens: Vec<String>,
    pub age_days: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Per-review sentiment, one-to-one with the input batch.
#[derive(Debug, Clone)]
pub struct ReviewSentiment {
    pub review_id: String,
    pub compound: f64,
    pub label: SentimentLabel,
    pub hybrid_score: f64,
}

/// Label fractions over the batch. Fractions sum to 1.0 for a non-empty
/// batch; all fields are 0.0 for an empty one.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentOverview {
    pub pos: f64,
    pub neu: f64,
    pub neg: f64,
    pub mean_star: f64,
}

/// A candidate phrase extracted from the negative subset. `bucket_counts`
/// holds occurrence counts per recency bucket, tightest window first, with
/// the final slot covering everything beyond the widest cutoff (including
/// reviews of unknown age).
#[derive(Debug, Clone)]
pub struct Phrase {
    pub text: String,
    pub doc_frequency: usize,
    pub total_count: usize,
    pub importance: f64,
    pub share_neg: f64,
    pub bucket_counts: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Area {
    General,
    #[serde(rename = "Pricing/IAP")]
    PricingIap,
    #[serde(rename = "Stability/Performance")]
    StabilityPerformance,
    #[serde(rename = "Onboarding/UX")]
    OnboardingUx,
    Support,
    #[serde(rename = "Privacy/Trust")]
    PrivacyTrust,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insight {
    pub priority: usize,
    pub area: Area,
    pub issue: String,
    pub why: String,
    pub action: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Thresholds {
    pub neg: f64,
    pub pos: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Weights {
    pub text: f64,
    pub stars: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Weights {
            text: 0.6,
            stars: 0.4,
        }
    }
}

// Request/Response DTOs

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub app_id: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_review_limit")]
    pub review_limit: u32,
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_min_df")]
    pub min_df: usize,
    #[serde(default = "default_top_k")]
    pub top_k_phrases: usize,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default = "default_recency_cutoffs")]
    pub recency_cutoffs_days: Vec<i64>,
    #[serde(default)]
    pub reviews_override: Option<Vec<RawReview>>,
}

fn default_country() -> String {
    "us".to_string()
}

fn default_review_limit() -> u32 {
    300
}

fn default_sentiment_model() -> String {
    "vader".to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 2)
}

fn default_min_df() -> usize {
    2
}

fn default_top_k() -> usize {
    20
}

fn default_recency_cutoffs() -> Vec<i64> {
    vec![90, 365]
}

#[derive(Debug, Serialize)]
pub struct AnalyzeMeta {
    pub app_id: String,
    pub country: String,
    pub analyzed: usize,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct NegativePhrase {
    pub phrase: String,
    pub score: f64,
    pub count: usize,
    pub share_neg: f64,
}

#[derive(Debug, Serialize)]
pub struct DebugInfo {
    pub model: String,
    pub thresholds: Thresholds,
    pub low_sample: bool,
    pub no_negative_signal: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub meta: AnalyzeMeta,
    pub sentiment_overview: SentimentOverview,
    pub top_negative_phrases: Vec<NegativePhrase>,
    pub insights: Vec<Insight>,
    pub debug: DebugInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct AppDetails {
    #[serde(rename = "appId")]
    pub app_id: Option<u64>,
    pub name: Option<String>,
    #[serde(rename = "bundleId")]
    pub bundle_id: Option<String>,
    pub genres: Vec<String>,
    pub rating: Option<f64>,
    #[serde(rename = "ratingCount")]
    pub rating_count: Option<u64>,
    pub price: f64,
    pub seller: Option<String>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
    #[serde(rename = "lastUpdate")]
    pub last_update: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AppInfoResponse {
    pub status: String,
    pub details: AppDetails,
}

#[derive(Debug, Serialize)]
pub struct AppReviewsResponse {
    pub status: String,
    pub count: usize,
    pub items: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    pub app_id: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_review_limit")]
    pub review_limit: u32,
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,
}

fn default_min_tokens() -> usize {
    3
}

#[derive(Debug, Serialize)]
pub struct CleanReview {
    #[serde(rename = "reviewId")]
    pub review_id: String,
    pub clean_text: String,
    pub tokens: Vec<String>,
    pub token_count: usize,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub mean_star: Option<f64>,
    pub by_star: BTreeMap<String, usize>,
    pub lang_distribution: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct CollectMeta {
    pub app_id: String,
    pub country: String,
    pub collected_reviews: usize,
    pub pages_fetched: u32,
    pub processing_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct CollectData {
    pub raw_reviews: Vec<RawReview>,
    pub clean_reviews: Vec<CleanReview>,
}

#[derive(Debug, Serialize)]
pub struct CollectResponse {
    pub status: String,
    pub meta: CollectMeta,
    pub app_info: AppDetails,
    pub summary: BatchSummary,
    pub data: CollectData,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}
