//! Lexicon-based sentiment scoring with hybrid text+star classification.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::models::{
    Review, ReviewSentiment, SentimentLabel, SentimentOverview, Thresholds, Weights,
};

// Word valences on a roughly -4..4 scale, VADER style. Skewed towards the
// vocabulary that actually shows up in app-store reviews.
static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // positive
        ("good", 1.9),
        ("great", 3.1),
        ("excellent", 3.2),
        ("amazing", 2.8),
        ("wonderful", 2.7),
        ("fantastic", 2.6),
        ("superb", 3.0),
        ("outstanding", 3.1),
        ("brilliant", 2.8),
        ("love", 3.2),
        ("loved", 2.9),
        ("loving", 2.9),
        ("like", 1.5),
        ("best", 3.2),
        ("better", 1.9),
        ("happy", 2.7),
        ("joy", 2.8),
        ("beautiful", 2.9),
        ("perfect", 2.7),
        ("perfectly", 2.6),
        ("awesome", 3.1),
        ("incredible", 2.8),
        ("delightful", 2.8),
        ("pleasant", 2.3),
        ("satisfying", 2.2),
        ("satisfied", 2.0),
        ("recommend", 1.6),
        ("recommended", 1.6),
        ("impressive", 2.3),
        ("exceptional", 2.9),
        ("remarkable", 2.4),
        ("smooth", 1.8),
        ("fast", 1.4),
        ("easy", 1.7),
        ("simple", 1.2),
        ("intuitive", 1.9),
        ("helpful", 1.9),
        ("useful", 1.8),
        ("reliable", 1.9),
        ("stable", 1.6),
        ("solid", 1.5),
        ("clean", 1.4),
        ("fun", 2.3),
        ("enjoy", 2.2),
        ("enjoyable", 2.3),
        ("worth", 1.4),
        ("free", 1.0),
        ("nice", 1.8),
        ("works", 1.2),
        ("fine", 0.8),
        ("thanks", 1.9),
        ("thank", 1.9),
        // negative
        ("bad", -2.5),
        ("terrible", -3.1),
        ("awful", -3.1),
        ("horrible", -2.9),
        ("poor", -2.1),
        ("worst", -3.1),
        ("worse", -2.1),
        ("hate", -2.7),
        ("hated", -2.9),
        ("dislike", -1.6),
        ("disappointing", -2.2),
        ("disappointed", -2.2),
        ("disappointment", -2.3),
        ("failure", -2.5),
        ("failed", -2.3),
        ("fail", -2.4),
        ("fails", -2.4),
        ("failing", -2.3),
        ("sad", -2.1),
        ("unhappy", -1.9),
        ("angry", -2.3),
        ("annoyed", -1.8),
        ("annoying", -1.9),
        ("frustrated", -2.1),
        ("frustrating", -2.1),
        ("problem", -1.7),
        ("problems", -1.7),
        ("issue", -1.3),
        ("issues", -1.3),
        ("bug", -1.8),
        ("buggy", -2.1),
        ("bugs", -1.8),
        ("broken", -2.3),
        ("crash", -2.4),
        ("crashes", -2.4),
        ("crashed", -2.4),
        ("crashing", -2.4),
        ("freeze", -1.9),
        ("freezes", -1.9),
        ("frozen", -1.8),
        ("lag", -1.7),
        ("laggy", -1.9),
        ("lags", -1.7),
        ("error", -1.7),
        ("errors", -1.7),
        ("glitch", -1.8),
        ("glitchy", -2.0),
        ("glitches", -1.8),
        ("mistake", -1.6),
        ("wrong", -1.6),
        ("useless", -2.4),
        ("unusable", -2.6),
        ("waste", -2.2),
        ("wasted", -2.2),
        ("scam", -3.0),
        ("fraud", -3.0),
        ("fake", -2.2),
        ("unreliable", -2.0),
        ("unstable", -1.9),
        ("slow", -1.6),
        ("difficult", -1.4),
        ("complicated", -1.3),
        ("confusing", -1.6),
        ("expensive", -1.4),
        ("overpriced", -2.0),
        ("worthless", -2.7),
        ("garbage", -2.8),
        ("trash", -2.6),
        ("rubbish", -2.3),
        ("pathetic", -2.5),
        ("mediocre", -1.4),
        ("inferior", -1.8),
        ("stuck", -1.5),
        ("lost", -1.5),
        ("missing", -1.4),
        ("spam", -2.1),
        ("intrusive", -1.8),
        ("misleading", -2.2),
        ("deceptive", -2.4),
        ("ads", -1.2),
        ("paywall", -1.9),
        ("uninstall", -2.2),
        ("uninstalled", -2.2),
        ("uninstalling", -2.2),
        ("refund", -1.6),
        ("charged", -1.3),
        ("avoid", -1.9),
    ]
    .into_iter()
    .collect()
});

static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "not", "never", "cannot", "can't", "cant", "don't", "dont", "doesn't", "doesnt",
        "didn't", "didnt", "won't", "wont", "isn't", "isnt", "wasn't", "wasnt", "aren't",
        "arent", "couldn't", "couldnt", "wouldn't", "wouldnt", "shouldn't", "shouldnt",
        "hardly", "barely", "without",
    ]
    .into_iter()
    .collect()
});

// Negation dampens and flips the following word's valence, per VADER.
const NEGATION_SCALAR: f64 = -0.74;
// Normalization constant mapping the raw valence sum into [-1, 1].
const NORM_ALPHA: f64 = 15.0;

/// Compound polarity of a token sequence in [-1, 1]. Empty or
/// lexicon-free text scores 0.0.
pub fn compound_score(tokens: &[String]) -> f64 {
    let mut total = 0.0;
    for (i, tok) in tokens.iter().enumerate() {
        let Some(&valence) = LEXICON.get(tok.as_str()) else {
            continue;
        };
        let negated = i > 0 && NEGATORS.contains(tokens[i - 1].as_str());
        total += if negated {
            valence * NEGATION_SCALAR
        } else {
            valence
        };
    }

    if total == 0.0 {
        return 0.0;
    }
    total / (total * total + NORM_ALPHA).sqrt()
}

/// Normalize a 1..5 star rating into [-1, 1].
pub fn stars_norm(rating: u8) -> f64 {
    (f64::from(rating) - 3.0) / 2.0
}

pub fn classify(hybrid_score: f64, thresholds: &Thresholds) -> SentimentLabel {
    if hybrid_score < thresholds.neg {
        SentimentLabel::Negative
    } else if hybrid_score > thresholds.pos {
        SentimentLabel::Positive
    } else {
        SentimentLabel::Neutral
    }
}

/// Score a batch: one ReviewSentiment per review, order preserved, plus the
/// batch overview. Deterministic; fractions are left unrounded.
pub fn score_reviews(
    reviews: &[Review],
    weights: &Weights,
    thresholds: &Thresholds,
) -> (Vec<ReviewSentiment>, SentimentOverview) {
    let mut sentiments = Vec::with_capacity(reviews.len());
    let mut pos = 0usize;
    let mut neu = 0usize;
    let mut neg = 0usize;
    let mut star_sum = 0u64;

    for review in reviews {
        let compound = compound_score(&review.tokens);
        let hybrid_score = weights.text * compound + weights.stars * stars_norm(review.rating);
        let label = classify(hybrid_score, thresholds);

        match label {
            SentimentLabel::Positive => pos += 1,
            SentimentLabel::Neutral => neu += 1,
            SentimentLabel::Negative => neg += 1,
        }
        star_sum += u64::from(review.rating);

        sentiments.push(ReviewSentiment {
            review_id: review.id.clone(),
            compound,
            label,
            hybrid_score,
        });
    }

    let total = reviews.len();
    let overview = if total == 0 {
        SentimentOverview {
            pos: 0.0,
            neu: 0.0,
            neg: 0.0,
            mean_star: 0.0,
        }
    } else {
        SentimentOverview {
            pos: pos as f64 / total as f64,
            neu: neu as f64 / total as f64,
            neg: neg as f64 / total as f64,
            mean_star: star_sum as f64 / total as f64,
        }
    };

    (sentiments, overview)
}

/// Indices of reviews in the negative subset: hybrid score below the
/// negative threshold, or a 1-2 star rating regardless of text.
pub fn negative_indices(
    reviews: &[Review],
    sentiments: &[ReviewSentiment],
    thresholds: &Thresholds,
) -> Vec<usize> {
    reviews
        .iter()
        .zip(sentiments.iter())
        .enumerate()
        .filter(|(_, (review, sentiment))| {
            sentiment.hybrid_score < thresholds.neg || review.rating <= 2
        })
        .map(|(i, _)| i)
        .collect()
}
