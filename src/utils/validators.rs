use thiserror::Error;

use crate::models::{Thresholds, Weights};

const WEIGHT_TOLERANCE: f64 = 1e-6;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("App ID cannot be empty")]
    EmptyAppId,
    #[error("Invalid app ID format: '{0}'. App ID must contain only digits (e.g., '1459969523')")]
    AppIdNotDigits(String),
    #[error("Invalid app ID length: '{0}'. App ID should be 8-10 digits long")]
    AppIdLength(String),
    #[error("Country code must be a 2-letter code (e.g., 'us', 'gb', 'de')")]
    InvalidCountry,
    #[error("review_limit must be between 1 and {max}")]
    ReviewLimitOutOfRange { max: u32 },
    #[error("Unsupported sentiment model: '{0}'")]
    UnsupportedModel(String),
    #[error("weights.text and weights.stars must sum to 1.0 (got {0})")]
    WeightsSum(f64),
    #[error("thresholds.neg ({neg}) must be lower than thresholds.pos ({pos})")]
    ThresholdOrder { neg: f64, pos: f64 },
    #[error("ngram_range must satisfy 1 <= min <= max")]
    NgramRange,
    #[error("min_df must be at least 1")]
    MinDf,
    #[error("top_k_phrases must be at least 1")]
    TopK,
    #[error("recency_cutoffs_days must be a non-empty, strictly increasing sequence")]
    RecencyCutoffs,
}

/// Normalize and validate an app ID: strips an optional `id` prefix and
/// requires 8-10 digits, matching App Store track IDs.
pub fn clean_app_id(app_id: &str) -> Result<String, ValidationError> {
    let trimmed = app_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyAppId);
    }

    let cleaned = trimmed
        .strip_prefix("id")
        .or_else(|| trimmed.strip_prefix("ID"))
        .or_else(|| trimmed.strip_prefix("Id"))
        .unwrap_or(trimmed)
        .trim();

    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::AppIdNotDigits(app_id.to_string()));
    }
    if cleaned.len() < 8 || cleaned.len() > 10 {
        return Err(ValidationError::AppIdLength(cleaned.to_string()));
    }

    Ok(cleaned.to_string())
}

pub fn validate_country(country: &str) -> Result<String, ValidationError> {
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidCountry);
    }
    Ok(country.to_lowercase())
}

pub fn validate_review_limit(limit: u32, max: u32) -> Result<(), ValidationError> {
    if limit < 1 || limit > max {
        return Err(ValidationError::ReviewLimitOutOfRange { max });
    }
    Ok(())
}

pub fn validate_model(model: &str) -> Result<(), ValidationError> {
    if model != "vader" {
        return Err(ValidationError::UnsupportedModel(model.to_string()));
    }
    Ok(())
}

pub fn validate_weights(weights: &Weights) -> Result<(), ValidationError> {
    let sum = weights.text + weights.stars;
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(ValidationError::WeightsSum(sum));
    }
    Ok(())
}

pub fn validate_thresholds(thresholds: &Thresholds) -> Result<(), ValidationError> {
    if thresholds.neg >= thresholds.pos {
        return Err(ValidationError::ThresholdOrder {
            neg: thresholds.neg,
            pos: thresholds.pos,
        });
    }
    Ok(())
}

pub fn validate_ngram_range(range: (usize, usize)) -> Result<(), ValidationError> {
    let (min, max) = range;
    if min < 1 || min > max {
        return Err(ValidationError::NgramRange);
    }
    Ok(())
}

pub fn validate_min_df(min_df: usize) -> Result<(), ValidationError> {
    if min_df < 1 {
        return Err(ValidationError::MinDf);
    }
    Ok(())
}

pub fn validate_top_k(top_k: usize) -> Result<(), ValidationError> {
    if top_k < 1 {
        return Err(ValidationError::TopK);
    }
    Ok(())
}

pub fn validate_recency_cutoffs(cutoffs: &[i64]) -> Result<(), ValidationError> {
    if cutoffs.is_empty() {
        return Err(ValidationError::RecencyCutoffs);
    }
    if cutoffs.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ValidationError::RecencyCutoffs);
    }
    if cutoffs[0] <= 0 {
        return Err(ValidationError::RecencyCutoffs);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_app_id() {
        assert_eq!(clean_app_id("1459969523").unwrap(), "1459969523");
        assert_eq!(clean_app_id("id1459969523").unwrap(), "1459969523");
        assert_eq!(clean_app_id("  1459969523  ").unwrap(), "1459969523");
    }

    #[test]
    fn test_clean_app_id_errors() {
        assert!(matches!(clean_app_id(""), Err(ValidationError::EmptyAppId)));
        assert!(matches!(
            clean_app_id("abc123"),
            Err(ValidationError::AppIdNotDigits(_))
        ));
        assert!(matches!(
            clean_app_id("1234"),
            Err(ValidationError::AppIdLength(_))
        ));
        assert!(matches!(
            clean_app_id("12345678901"),
            Err(ValidationError::AppIdLength(_))
        ));
    }

    #[test]
    fn test_validate_country() {
        assert_eq!(validate_country("US").unwrap(), "us");
        assert_eq!(validate_country("de").unwrap(), "de");
        assert!(validate_country("usa").is_err());
        assert!(validate_country("u1").is_err());
        assert!(validate_country("").is_err());
    }

    #[test]
    fn test_validate_weights() {
        assert!(validate_weights(&Weights {
            text: 0.6,
            stars: 0.4
        })
        .is_ok());
        // within the 1e-6 tolerance
        assert!(validate_weights(&Weights {
            text: 0.6000000001,
            stars: 0.4
        })
        .is_ok());
        assert!(matches!(
            validate_weights(&Weights {
                text: 0.7,
                stars: 0.4
            }),
            Err(ValidationError::WeightsSum(_))
        ));
    }

    #[test]
    fn test_validate_thresholds() {
        assert!(validate_thresholds(&Thresholds {
            neg: -0.2,
            pos: 0.2
        })
        .is_ok());
        assert!(validate_thresholds(&Thresholds { neg: 0.2, pos: 0.2 }).is_err());
        assert!(validate_thresholds(&Thresholds {
            neg: 0.3,
            pos: -0.3
        })
        .is_err());
    }

    #[test]
    fn test_validate_ngram_range() {
        assert!(validate_ngram_range((1, 2)).is_ok());
        assert!(validate_ngram_range((2, 2)).is_ok());
        assert!(validate_ngram_range((0, 2)).is_err());
        assert!(validate_ngram_range((3, 2)).is_err());
    }

    #[test]
    fn test_validate_recency_cutoffs() {
        assert!(validate_recency_cutoffs(&[90, 365]).is_ok());
        assert!(validate_recency_cutoffs(&[30]).is_ok());
        assert!(validate_recency_cutoffs(&[]).is_err());
        assert!(validate_recency_cutoffs(&[90, 90]).is_err());
        assert!(validate_recency_cutoffs(&[365, 90]).is_err());
        assert!(validate_recency_cutoffs(&[0, 90]).is_err());
    }

    #[test]
    fn test_validate_review_limit() {
        assert!(validate_review_limit(1, 2000).is_ok());
        assert!(validate_review_limit(2000, 2000).is_ok());
        assert!(validate_review_limit(0, 2000).is_err());
        assert!(validate_review_limit(2001, 2000).is_err());
    }
}
