//! Review batch preparation: text cleanup, tokenization, and age computation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{CleanReview, RawReview, Review};
use crate::utils::normalization::{clean_text, detect_language, tokenize_en};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Title and content merged into a single text, the way reviewers read it.
pub fn merged_text(raw: &RawReview) -> String {
    let title = raw.title.as_deref().unwrap_or("").trim();
    let content = raw.content.as_deref().unwrap_or("").trim();
    match (title.is_empty(), content.is_empty()) {
        (true, _) => content.to_string(),
        (_, true) => title.to_string(),
        _ => format!("{} {}", title, content),
    }
}

fn age_days(updated: Option<&str>, now: DateTime<Utc>) -> Option<f64> {
    let parsed = DateTime::parse_from_rfc3339(updated?).ok()?;
    let seconds = (now - parsed.with_timezone(&Utc)).num_seconds().max(0);
    Some(seconds as f64 / SECONDS_PER_DAY)
}

/// Clean and tokenize a raw batch. Reviews with fewer than `min_tokens`
/// tokens are dropped; pass 0 to keep everything (the analysis pipeline
/// needs the batch intact so star-only signals survive).
pub fn prepare_reviews(
    raw_reviews: &[RawReview],
    now: DateTime<Utc>,
    min_tokens: usize,
) -> Vec<Review> {
    let mut reviews = Vec::with_capacity(raw_reviews.len());

    for (i, raw) in raw_reviews.iter().enumerate() {
        let cleaned = clean_text(&merged_text(raw));
        let tokens = tokenize_en(&cleaned);
        if tokens.len() < min_tokens {
            continue;
        }

        let id = raw
            .review_id
            .clone()
            .unwrap_or_else(|| format!("review-{}", i));

        reviews.push(Review {
            id,
            rating: raw.rating,
            clean_text: cleaned,
            tokens,
            age_days: age_days(raw.updated.as_deref(), now),
        });
    }

    reviews
}

pub fn to_clean_reviews(reviews: &[Review]) -> Vec<CleanReview> {
    reviews
        .iter()
        .map(|r| CleanReview {
            review_id: r.id.clone(),
            clean_text: r.clean_text.clone(),
            tokens: r.tokens.clone(),
            token_count: r.tokens.len(),
        })
        .collect()
}

/// Share of English vs other-language reviews in a prepared batch.
pub fn language_distribution(reviews: &[Review]) -> BTreeMap<String, f64> {
    let total = reviews.len().max(1);
    let en = reviews
        .iter()
        .filter(|r| detect_language(&r.clean_text) == "en")
        .count();
    let en_share = en as f64 / total as f64;

    let mut dist = BTreeMap::new();
    dist.insert("en".to_string(), en_share);
    dist.insert("other".to_string(), 1.0 - en_share);
    dist
}
