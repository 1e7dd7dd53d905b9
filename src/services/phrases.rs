//! N-gram phrase extraction over the negative subset, with statistical
//! weighting and recency-based re-ranking.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::models::{Phrase, Review};

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "has",
        "have", "her", "him", "his", "how", "its", "may", "our", "out", "she", "that", "this",
        "these", "those", "they", "them", "then", "than", "was", "were", "will", "with",
        "would", "could", "should", "there", "their", "what", "when", "where", "which", "who",
        "why", "your", "yours", "from", "into", "onto", "been", "being", "because", "about",
        "after", "before", "again", "very", "just", "only", "also", "some", "such", "more",
        "most", "other", "over", "under", "here", "does", "did", "doing", "don't", "own",
        "same", "too", "each", "few", "get", "got", "getting", "even", "ever", "every", "now",
        "one", "two", "it's", "i'm", "i've", "i'll", "you're", "can't", "won't", "didn't",
        "doesn't", "isn't", "wasn't",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy)]
pub struct PhraseParams {
    pub ngram_range: (usize, usize),
    pub min_df: usize,
    pub top_k: usize,
}

/// N-grams of a token sequence after stopword removal. Duplicates are kept;
/// callers needing document frequency deduplicate themselves.
fn ngrams(tokens: &[String], range: (usize, usize)) -> Vec<String> {
    let filtered: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !STOP_WORDS.contains(t))
        .collect();

    let (min_n, max_n) = range;
    let mut grams = Vec::new();
    for n in min_n..=max_n {
        if n == 0 || n > filtered.len() {
            continue;
        }
        for window in filtered.windows(n) {
            grams.push(window.join(" "));
        }
    }
    grams
}

/// Raw importance of a term: its relative document frequency in the negative
/// subset, amplified by how exclusively it occurs in negative reviews.
/// Monotone non-decreasing in both inputs.
fn importance(doc_frequency: usize, n_negative: usize, share_neg: f64) -> f64 {
    if n_negative == 0 {
        return 0.0;
    }
    (doc_frequency as f64 / n_negative as f64) * (1.0 + share_neg)
}

/// Recency bucket for a review age: index of the first cutoff the age fits
/// in, or the final bucket for ages beyond the widest cutoff. Unknown ages
/// land in the final bucket so missing data never inflates importance.
pub fn recency_bucket(age_days: Option<f64>, cutoffs: &[i64]) -> usize {
    match age_days {
        Some(age) => cutoffs
            .iter()
            .position(|&c| age <= c as f64)
            .unwrap_or(cutoffs.len()),
        None => cutoffs.len(),
    }
}

fn sort_ranked(phrases: &mut [Phrase]) {
    phrases.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_count.cmp(&a.total_count))
            .then_with(|| a.text.cmp(&b.text))
    });
}

/// Extract ranked phrases from the negative subset.
///
/// Document frequency is counted over negative reviews only and terms below
/// `min_df` are dropped. Occurrences are then counted across the full batch
/// so `share_neg` reflects how exclusive a term is to negative reviews.
/// Returns an empty list when the negative subset is empty.
pub fn extract_phrases(
    negative: &[&Review],
    all_reviews: &[Review],
    params: &PhraseParams,
    recency_cutoffs: &[i64],
) -> Vec<Phrase> {
    if negative.is_empty() {
        return Vec::new();
    }

    // Document frequency over the negative subset.
    let mut doc_freq: HashMap<String, usize> = HashMap::new();
    for review in negative {
        let unique: HashSet<String> = ngrams(&review.tokens, params.ngram_range)
            .into_iter()
            .collect();
        for gram in unique {
            *doc_freq.entry(gram).or_insert(0) += 1;
        }
    }
    doc_freq.retain(|_, df| *df >= params.min_df);
    if doc_freq.is_empty() {
        return Vec::new();
    }

    // Occurrence counts: negative subset (with recency buckets) and full batch.
    let n_buckets = recency_cutoffs.len() + 1;
    let mut neg_counts: HashMap<&str, usize> = HashMap::new();
    let mut bucket_counts: HashMap<&str, Vec<usize>> = HashMap::new();
    for review in negative {
        let bucket = recency_bucket(review.age_days, recency_cutoffs);
        for gram in ngrams(&review.tokens, params.ngram_range) {
            if let Some((term, _)) = doc_freq.get_key_value(gram.as_str()) {
                *neg_counts.entry(term.as_str()).or_insert(0) += 1;
                bucket_counts
                    .entry(term.as_str())
                    .or_insert_with(|| vec![0; n_buckets])[bucket] += 1;
            }
        }
    }

    let mut total_counts: HashMap<&str, usize> = HashMap::new();
    for review in all_reviews {
        for gram in ngrams(&review.tokens, params.ngram_range) {
            if let Some((term, _)) = doc_freq.get_key_value(gram.as_str()) {
                *total_counts.entry(term.as_str()).or_insert(0) += 1;
            }
        }
    }

    let n_negative = negative.len();
    let mut phrases: Vec<Phrase> = doc_freq
        .iter()
        .map(|(text, &df)| {
            let neg_occ = neg_counts.get(text.as_str()).copied().unwrap_or(0);
            let total = total_counts.get(text.as_str()).copied().unwrap_or(neg_occ);
            let share_neg = if total > 0 {
                neg_occ as f64 / total as f64
            } else {
                0.0
            };
            Phrase {
                text: text.clone(),
                doc_frequency: df,
                total_count: total,
                importance: importance(df, n_negative, share_neg),
                share_neg,
                bucket_counts: bucket_counts
                    .get(text.as_str())
                    .cloned()
                    .unwrap_or_else(|| vec![0; n_buckets]),
            }
        })
        .collect();

    sort_ranked(&mut phrases);
    phrases.truncate(params.top_k);
    phrases
}

/// Bucket multipliers, tightest window first: linear decay from 1.0 down to
/// 0.5 for the bucket beyond the widest cutoff.
fn bucket_multipliers(n_buckets: usize) -> Vec<f64> {
    if n_buckets <= 1 {
        return vec![1.0];
    }
    (0..n_buckets)
        .map(|i| 1.0 - 0.5 * i as f64 / (n_buckets - 1) as f64)
        .collect()
}

/// Re-weight importance by the mean recency multiplier of each phrase's
/// occurrences, then re-sort with the same tie-break as extraction.
pub fn apply_recency_boost(phrases: &mut Vec<Phrase>) {
    let Some(n_buckets) = phrases.first().map(|p| p.bucket_counts.len()) else {
        return;
    };
    let multipliers = bucket_multipliers(n_buckets);

    for phrase in phrases.iter_mut() {
        let occurrences: usize = phrase.bucket_counts.iter().sum();
        if occurrences == 0 {
            continue;
        }
        let weighted: f64 = phrase
            .bucket_counts
            .iter()
            .zip(multipliers.iter())
            .map(|(&count, &m)| count as f64 * m)
            .sum();
        phrase.importance *= weighted / occurrences as f64;
    }

    sort_ranked(phrases);
}

/// True when the majority of a phrase's occurrences fall inside the
/// tightest recency window.
pub fn recent_majority(phrase: &Phrase) -> bool {
    let total: usize = phrase.bucket_counts.iter().sum();
    total > 0 && phrase.bucket_counts[0] * 2 > total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::normalization::tokenize_en;

    fn review(id: &str, rating: u8, text: &str, age_days: Option<f64>) -> Review {
        Review {
            id: id.to_string(),
            rating,
            clean_text: text.to_string(),
            tokens: tokenize_en(text),
            age_days,
        }
    }

    fn params(min_df: usize, top_k: usize) -> PhraseParams {
        PhraseParams {
            ngram_range: (1, 2),
            min_df,
            top_k,
        }
    }

    #[test]
    fn test_ngrams_stopword_filtering() {
        let tokens = tokenize_en("the app crashes");
        let grams = ngrams(&tokens, (1, 2));
        assert!(grams.contains(&"app".to_string()));
        assert!(grams.contains(&"crashes".to_string()));
        assert!(grams.contains(&"app crashes".to_string()));
        assert!(!grams.iter().any(|g| g.contains("the")));
    }

    #[test]
    fn test_share_neg_bounds_and_exclusive_phrase() {
        let all = vec![
            review("a", 1, "total scam app", Some(10.0)),
            review("b", 1, "scam app avoid", Some(20.0)),
            review("c", 5, "lovely app works", Some(5.0)),
        ];
        let negative: Vec<&Review> = vec![&all[0], &all[1]];
        let phrases = extract_phrases(&negative, &all, &params(2, 20), &[90, 365]);

        let scam = phrases.iter().find(|p| p.text == "scam").unwrap();
        assert_eq!(scam.doc_frequency, 2);
        assert_eq!(scam.share_neg, 1.0);

        // "app" also occurs in the positive review
        let app = phrases.iter().find(|p| p.text == "app").unwrap();
        assert_eq!(app.total_count, 3);
        assert!((app.share_neg - 2.0 / 3.0).abs() < 1e-9);

        for p in &phrases {
            assert!(p.share_neg >= 0.0 && p.share_neg <= 1.0);
        }
    }

    #[test]
    fn test_min_df_filters_to_empty() {
        let all = vec![
            review("a", 1, "screen flickers badly", Some(10.0)),
            review("b", 1, "keyboard vanished entirely", Some(20.0)),
        ];
        let negative: Vec<&Review> = all.iter().collect();
        let phrases = extract_phrases(&negative, &all, &params(5, 20), &[90, 365]);
        assert!(phrases.is_empty());
    }

    #[test]
    fn test_empty_negative_subset() {
        let all = vec![review("a", 5, "great app", Some(10.0))];
        let phrases = extract_phrases(&[], &all, &params(1, 20), &[90, 365]);
        assert!(phrases.is_empty());
    }

    #[test]
    fn test_importance_monotonicity() {
        // non-decreasing in doc_frequency with share_neg fixed
        let mut prev = 0.0;
        for df in 1..=10 {
            let score = importance(df, 10, 0.5);
            assert!(score >= prev);
            prev = score;
        }
        // non-decreasing in share_neg with doc_frequency fixed
        let mut prev = 0.0;
        for i in 0..=10 {
            let score = importance(4, 10, i as f64 / 10.0);
            assert!(score >= prev);
            prev = score;
        }
    }

    #[test]
    fn test_tie_break_total_count_then_text() {
        let mut phrases = vec![
            Phrase {
                text: "beta".to_string(),
                doc_frequency: 2,
                total_count: 3,
                importance: 0.5,
                share_neg: 1.0,
                bucket_counts: vec![0, 0, 3],
            },
            Phrase {
                text: "alpha".to_string(),
                doc_frequency: 2,
                total_count: 3,
                importance: 0.5,
                share_neg: 1.0,
                bucket_counts: vec![0, 0, 3],
            },
            Phrase {
                text: "gamma".to_string(),
                doc_frequency: 2,
                total_count: 5,
                importance: 0.5,
                share_neg: 1.0,
                bucket_counts: vec![0, 0, 5],
            },
        ];
        sort_ranked(&mut phrases);
        let order: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(order, vec!["gamma", "alpha", "beta"]);
    }

    #[test]
    fn test_recency_bucket() {
        let cutoffs = [90, 365];
        assert_eq!(recency_bucket(Some(10.0), &cutoffs), 0);
        assert_eq!(recency_bucket(Some(90.0), &cutoffs), 0);
        assert_eq!(recency_bucket(Some(200.0), &cutoffs), 1);
        assert_eq!(recency_bucket(Some(400.0), &cutoffs), 2);
        assert_eq!(recency_bucket(None, &cutoffs), 2);
    }

    #[test]
    fn test_bucket_multipliers_decay() {
        let m = bucket_multipliers(3);
        assert_eq!(m, vec![1.0, 0.75, 0.5]);
        let m = bucket_multipliers(2);
        assert_eq!(m, vec![1.0, 0.5]);
    }

    #[test]
    fn test_recency_boost_reranks() {
        // equal raw importance; recent occurrences should win after the boost
        let mut phrases = vec![
            Phrase {
                text: "old issue".to_string(),
                doc_frequency: 3,
                total_count: 3,
                importance: 0.6,
                share_neg: 1.0,
                bucket_counts: vec![0, 0, 3],
            },
            Phrase {
                text: "new issue".to_string(),
                doc_frequency: 3,
                total_count: 3,
                importance: 0.6,
                share_neg: 1.0,
                bucket_counts: vec![3, 0, 0],
            },
        ];
        apply_recency_boost(&mut phrases);
        assert_eq!(phrases[0].text, "new issue");
        assert!((phrases[0].importance - 0.6).abs() < 1e-9);
        assert!((phrases[1].importance - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_recent_majority() {
        let recent = Phrase {
            text: "x".to_string(),
            doc_frequency: 1,
            total_count: 3,
            importance: 1.0,
            share_neg: 1.0,
            bucket_counts: vec![2, 1, 0],
        };
        let stale = Phrase {
            bucket_counts: vec![1, 1, 1],
            ..recent.clone()
        };
        assert!(recent_majority(&recent));
        assert!(!recent_majority(&stale));
    }
}
