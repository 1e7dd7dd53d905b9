use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::models::RawReview;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[\w.\-]+@[\w.\-]+\.\w+\b").unwrap());
static MENTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[@#]\w+").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z][a-zA-Z']{2,}").unwrap());

/// Clean and normalize review text: decode HTML, strip tags/URLs/emails/
/// mentions/emoji, NFKC-normalize, lowercase, collapse whitespace.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let t = unescape_html(text);
    let t = TAG_RE.replace_all(&t, " ");
    let t = URL_RE.replace_all(&t, " ");
    let t = EMAIL_RE.replace_all(&t, " ");
    let t = MENTION_RE.replace_all(&t, " ");
    let t: String = t.chars().filter(|c| !is_emoji(*c)).collect();
    let t: String = t.nfkc().collect::<String>().to_lowercase();

    WS_RE.replace_all(&t, " ").trim().to_string()
}

/// Decode the HTML entities that actually show up in review feeds.
fn unescape_html(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
}

fn is_emoji(c: char) -> bool {
    matches!(u32::from(c),
        0x1F000..=0x1FAFF | // pictographs, emoticons, symbols
        0x2600..=0x27BF |   // misc symbols, dingbats
        0x2190..=0x21FF |   // arrows
        0xFE00..=0xFE0F |   // variation selectors
        0x200D)             // zero-width joiner
}

/// Tokenize English text: alphabetic tokens of at least 3 characters,
/// apostrophes allowed after the first character.
pub fn tokenize_en(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Crude language detection on the cleaned text: the share of ASCII letters
/// among all letters.
pub fn detect_language(text: &str) -> &'static str {
    let ascii_letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let total_letters = text.chars().filter(|c| c.is_alphabetic()).count();

    if total_letters == 0 {
        return "other";
    }
    if ascii_letters as f64 / total_letters as f64 >= 0.8 {
        "en"
    } else {
        "other"
    }
}

/// Mean star rating and per-star counts over a raw batch. Ratings of 0
/// (missing in the feed) are excluded.
pub fn summarize_stars(reviews: &[RawReview]) -> (Option<f64>, BTreeMap<String, usize>) {
    let mut by_star: BTreeMap<String, usize> = BTreeMap::new();
    let mut sum: u64 = 0;
    let mut n: u64 = 0;

    for r in reviews {
        if r.rating == 0 {
            continue;
        }
        *by_star.entry(r.rating.to_string()).or_insert(0) += 1;
        sum += u64::from(r.rating);
        n += 1;
    }

    let mean = if n > 0 {
        Some(sum as f64 / n as f64)
    } else {
        None
    };
    (mean, by_star)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_basic() {
        assert_eq!(clean_text("Great App!"), "great app!");
        assert_eq!(clean_text("  lots   of\t\nspace  "), "lots of space");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_clean_text_html() {
        assert_eq!(clean_text("<b>Bad</b> &amp; broken"), "bad & broken");
        assert_eq!(clean_text("it&#39;s fine"), "it's fine");
    }

    #[test]
    fn test_clean_text_urls_and_mentions() {
        assert_eq!(clean_text("see https://example.com now"), "see now");
        assert_eq!(clean_text("email me@example.com please"), "email please");
        assert_eq!(clean_text("thanks @dev #broken"), "thanks");
    }

    #[test]
    fn test_clean_text_emoji() {
        assert_eq!(clean_text("crashes all the time 😡😡"), "crashes all the time");
    }

    #[test]
    fn test_tokenize_en() {
        assert_eq!(
            tokenize_en("the app won't load my data"),
            vec!["the", "app", "won't", "load", "data"]
        );
        assert!(tokenize_en("a b 12 34").is_empty());
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("plain english text"), "en");
        assert_eq!(detect_language("это приложение ужасно"), "other");
        assert_eq!(detect_language("1234 !!"), "other");
    }

    #[test]
    fn test_summarize_stars() {
        let reviews: Vec<RawReview> = [5, 5, 1, 0]
            .iter()
            .map(|&rating| RawReview {
                review_id: None,
                rating,
                title: None,
                content: None,
                updated: None,
                version: None,
                author: None,
            })
            .collect();
        let (mean, by_star) = summarize_stars(&reviews);
        assert_eq!(mean, Some(11.0 / 3.0));
        assert_eq!(by_star.get("5"), Some(&2));
        assert_eq!(by_star.get("1"), Some(&1));
        assert_eq!(by_star.get("0"), None);
    }
}
