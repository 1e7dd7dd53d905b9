use std::env;

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub itunes_timeout_secs: u64,
    pub itunes_user_agent: String,
    pub fetch_delay_ms: u64,
    pub max_review_limit: u32,
    pub low_sample_threshold: usize,
    pub neg_threshold: f64,
    pub pos_threshold: f64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let get = |key: &str, default: &str| env::var(key).unwrap_or_else(|_| default.to_string());

        let config = Config {
            port: get("PORT", "8080")
                .parse()
                .context("Invalid PORT value")?,
            itunes_timeout_secs: get("ITUNES_TIMEOUT_SECS", "15")
                .parse()
                .context("Invalid ITUNES_TIMEOUT_SECS value")?,
            itunes_user_agent: get("ITUNES_USER_AGENT", "review-insights/0.1"),
            fetch_delay_ms: get("FETCH_DELAY_MS", "1000")
                .parse()
                .context("Invalid FETCH_DELAY_MS value")?,
            max_review_limit: get("MAX_REVIEW_LIMIT", "2000")
                .parse()
                .context("Invalid MAX_REVIEW_LIMIT value")?,
            low_sample_threshold: get("LOW_SAMPLE_THRESHOLD", "50")
                .parse()
                .context("Invalid LOW_SAMPLE_THRESHOLD value")?,
            neg_threshold: get("NEG_THRESHOLD", "-0.2")
                .parse()
                .context("Invalid NEG_THRESHOLD value")?,
            pos_threshold: get("POS_THRESHOLD", "0.2")
                .parse()
                .context("Invalid POS_THRESHOLD value")?,
        };

        if config.port == 0 {
            bail!("PORT must be non-zero");
        }
        if config.neg_threshold >= config.pos_threshold {
            bail!(
                "NEG_THRESHOLD ({}) must be strictly below POS_THRESHOLD ({})",
                config.neg_threshold,
                config.pos_threshold
            );
        }

        Ok(config)
    }
}
