//! iTunes Store client: app lookup and paged customer-reviews RSS feed.
//!
//! Fetch failures surface as `FetchError` so callers can tell "upstream was
//! unavailable" apart from "the app genuinely has no reviews".

use std::collections::HashSet;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::models::{AppDetails, RawReview};

const LOOKUP_URL: &str = "https://itunes.apple.com/lookup";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("iTunes API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("iTunes API returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Fetch app details from the iTunes Lookup API. `Ok(None)` means the
/// lookup succeeded but no app matched.
pub async fn fetch_app_info(
    client: &reqwest::Client,
    app_id: &str,
    country: &str,
) -> Result<Option<AppDetails>, FetchError> {
    let response = client
        .get(LOOKUP_URL)
        .query(&[("id", app_id), ("country", country)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status()));
    }

    let body: Value = response.json().await?;
    Ok(parse_lookup(&body))
}

/// Fetch reviews with pagination from the customer-reviews RSS feed,
/// deduplicated by review id. Stops at `limit`, at the last page, or when a
/// page adds nothing new. A failing first page is an error; a failure after
/// at least one good page just ends the pagination with a partial batch.
pub async fn fetch_reviews_paged(
    client: &reqwest::Client,
    app_id: &str,
    country: &str,
    limit: usize,
    delay_ms: u64,
) -> Result<(Vec<RawReview>, u32), FetchError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut items: Vec<RawReview> = Vec::new();
    let mut page: u32 = 1;
    let mut pages_fetched: u32 = 0;

    while items.len() < limit {
        let url = format!(
            "https://itunes.apple.com/{country}/rss/customerreviews/id={app_id}/sortBy=mostRecent/page={page}/json"
        );
        debug!("Fetching reviews page {} for app {}", page, app_id);

        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            if pages_fetched == 0 {
                return Err(FetchError::Status(response.status()));
            }
            warn!(
                "Reviews page {} returned HTTP {}, stopping pagination",
                page,
                response.status()
            );
            break;
        }

        let body: Value = response.json().await?;
        let feed = body.get("feed").cloned().unwrap_or(Value::Null);

        let mut added = 0;
        for entry in as_list(feed.get("entry")) {
            let Some(review) = parse_entry(entry) else {
                continue;
            };
            let id = review.review_id.clone().unwrap_or_default();
            if id.is_empty() || !seen.insert(id) {
                continue;
            }
            items.push(review);
            added += 1;
            if items.len() >= limit {
                break;
            }
        }
        pages_fetched += 1;

        let has_next = as_list(feed.get("link")).iter().any(|link| {
            link.get("attributes")
                .and_then(|a| a.get("rel"))
                .and_then(Value::as_str)
                == Some("next")
        });
        if !has_next || added == 0 {
            break;
        }

        page += 1;
        if delay_ms > 0 {
            sleep(Duration::from_millis(delay_ms)).await;
        }
    }

    Ok((items, pages_fetched))
}

/// The feed serializes single children as objects and multiples as arrays.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(obj @ Value::Object(_)) => vec![obj],
        _ => Vec::new(),
    }
}

fn label(value: Option<&Value>) -> Option<String> {
    value?.get("label")?.as_str().map(str::to_string)
}

fn parse_entry(entry: &Value) -> Option<RawReview> {
    // App metadata entries in the feed have no rating
    entry.get("im:rating")?;

    Some(RawReview {
        review_id: label(entry.get("id")),
        rating: label(entry.get("im:rating"))
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        title: label(entry.get("title")),
        content: label(entry.get("content")),
        updated: label(entry.get("updated")),
        version: label(entry.get("im:version")),
        author: entry
            .get("author")
            .and_then(|a| label(a.get("name"))),
    })
}

fn parse_lookup(body: &Value) -> Option<AppDetails> {
    if body.get("resultCount").and_then(Value::as_u64).unwrap_or(0) == 0 {
        return None;
    }
    let result = body.get("results")?.get(0)?;

    let strings = |key: &str| -> Vec<String> {
        result
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    let string = |key: &str| -> Option<String> {
        result.get(key).and_then(Value::as_str).map(str::to_string)
    };

    Some(AppDetails {
        app_id: result.get("trackId").and_then(Value::as_u64),
        name: string("trackName"),
        bundle_id: string("bundleId"),
        genres: strings("genres"),
        rating: result.get("averageUserRating").and_then(Value::as_f64),
        rating_count: result.get("userRatingCount").and_then(Value::as_u64),
        price: result.get("price").and_then(Value::as_f64).unwrap_or(0.0),
        seller: string("sellerName"),
        release_date: string("releaseDate"),
        last_update: string("currentVersionReleaseDate"),
        url: string("trackViewUrl"),
    })
}
