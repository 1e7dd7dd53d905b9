//! Insight generation: maps ranked phrases onto product areas with
//! templated explanations, impact labels, and contiguous priorities.

use once_cell::sync::Lazy;

use crate::models::{Area, Impact, Insight, Phrase};
use crate::services::phrases::recent_majority;

const GENERAL_ACTION: &str = "Investigate the issue, gather additional context from affected reviews";
const LOW_SAMPLE_CAVEAT: &str = " (low sample; interpret with caution)";

/// Ordered pattern table, first match wins. A pattern matches when it equals
/// one of the phrase's whitespace-separated tokens, so "ads" never matches
/// inside "loads".
static AREA_TABLE: Lazy<Vec<(&'static str, Area, &'static str)>> = Lazy::new(|| {
    const PRICING: &str = "Review pricing tiers, open up basic features, add a free trial";
    const STABILITY: &str = "Prioritize bug fixes, expand crash reporting, use staged rollouts";
    const UX: &str = "Simplify key flows, rework onboarding, run usability testing";
    const SUPPORT: &str = "Shorten support response times, expand self-serve help";
    const TRUST: &str = "Audit data practices, clarify permissions and billing copy";

    vec![
        // Privacy/Trust first: "scam"/"fraud" must not fall through to pricing
        ("scam", Area::PrivacyTrust, TRUST),
        ("fraud", Area::PrivacyTrust, TRUST),
        ("fake", Area::PrivacyTrust, TRUST),
        ("privacy", Area::PrivacyTrust, TRUST),
        ("permissions", Area::PrivacyTrust, TRUST),
        ("tracking", Area::PrivacyTrust, TRUST),
        ("misleading", Area::PrivacyTrust, TRUST),
        // Pricing/IAP
        ("ads", Area::PricingIap, PRICING),
        ("advert", Area::PricingIap, PRICING),
        ("advertisement", Area::PricingIap, PRICING),
        ("pay", Area::PricingIap, PRICING),
        ("paywall", Area::PricingIap, PRICING),
        ("price", Area::PricingIap, PRICING),
        ("expensive", Area::PricingIap, PRICING),
        ("overpriced", Area::PricingIap, PRICING),
        ("purchase", Area::PricingIap, PRICING),
        ("unlock", Area::PricingIap, PRICING),
        ("locked", Area::PricingIap, PRICING),
        ("subscribe", Area::PricingIap, PRICING),
        ("subscription", Area::PricingIap, PRICING),
        ("refund", Area::PricingIap, PRICING),
        ("charged", Area::PricingIap, PRICING),
        ("money", Area::PricingIap, PRICING),
        // Stability/Performance
        ("bug", Area::StabilityPerformance, STABILITY),
        ("bugs", Area::StabilityPerformance, STABILITY),
        ("buggy", Area::StabilityPerformance, STABILITY),
        ("crash", Area::StabilityPerformance, STABILITY),
        ("crashes", Area::StabilityPerformance, STABILITY),
        ("crashing", Area::StabilityPerformance, STABILITY),
        ("freeze", Area::StabilityPerformance, STABILITY),
        ("freezes", Area::StabilityPerformance, STABILITY),
        ("frozen", Area::StabilityPerformance, STABILITY),
        ("lag", Area::StabilityPerformance, STABILITY),
        ("laggy", Area::StabilityPerformance, STABILITY),
        ("slow", Area::StabilityPerformance, STABILITY),
        ("glitch", Area::StabilityPerformance, STABILITY),
        ("glitches", Area::StabilityPerformance, STABILITY),
        ("broken", Area::StabilityPerformance, STABILITY),
        ("error", Area::StabilityPerformance, STABILITY),
        ("errors", Area::StabilityPerformance, STABILITY),
        ("battery", Area::StabilityPerformance, STABILITY),
        // Onboarding/UX
        ("login", Area::OnboardingUx, UX),
        ("signup", Area::OnboardingUx, UX),
        ("onboarding", Area::OnboardingUx, UX),
        ("tutorial", Area::OnboardingUx, UX),
        ("confusing", Area::OnboardingUx, UX),
        ("complicated", Area::OnboardingUx, UX),
        ("interface", Area::OnboardingUx, UX),
        ("design", Area::OnboardingUx, UX),
        ("navigation", Area::OnboardingUx, UX),
        ("feature", Area::OnboardingUx, UX),
        ("features", Area::OnboardingUx, UX),
        ("missing", Area::OnboardingUx, UX),
        // Support
        ("support", Area::Support, SUPPORT),
        ("help", Area::Support, SUPPORT),
        ("contact", Area::Support, SUPPORT),
        ("response", Area::Support, SUPPORT),
        ("customer", Area::Support, SUPPORT),
        ("service", Area::Support, SUPPORT),
    ]
});

/// Classify a phrase into a product area with its canned recommendation.
/// Falls back to General when nothing in the table matches.
pub fn classify_area(phrase: &str) -> (Area, &'static str) {
    for (pattern, area, action) in AREA_TABLE.iter() {
        if phrase.split_whitespace().any(|token| token == *pattern) {
            return (*area, action);
        }
    }
    (Area::General, GENERAL_ACTION)
}

fn polarity_descriptor(share_neg: f64) -> &'static str {
    if share_neg >= 0.5 {
        "strong"
    } else if share_neg >= 0.25 {
        "moderate"
    } else {
        "mild"
    }
}

/// Impact from importance-rank percentile combined with share_neg.
/// `rank` is 1-based over `total` ranked phrases.
fn impact_for(rank: usize, total: usize, share_neg: f64) -> Impact {
    let top_quartile = 4 * rank <= total + 3;
    let bottom_quartile = 4 * rank > 3 * total;

    if top_quartile && share_neg >= 0.4 {
        Impact::High
    } else if bottom_quartile || share_neg < 0.15 {
        Impact::Low
    } else {
        Impact::Medium
    }
}

/// One insight per ranked phrase, in rank order. `low_sample` appends a
/// caveat to every explanation but never suppresses insights.
pub fn generate_insights(phrases: &[Phrase], low_sample: bool) -> Vec<Insight> {
    let total = phrases.len();

    phrases
        .iter()
        .enumerate()
        .map(|(i, phrase)| {
            let rank = i + 1;
            let (area, action) = classify_area(&phrase.text);

            let mut why = format!(
                "{:.0}% of mentions in negative reviews; {} negative signal",
                phrase.share_neg * 100.0,
                polarity_descriptor(phrase.share_neg)
            );
            if recent_majority(phrase) {
                why.push_str("; recent reviews");
            }
            if low_sample {
                why.push_str(LOW_SAMPLE_CAVEAT);
            }

            Insight {
                priority: rank,
                area,
                issue: phrase.text.clone(),
                why,
                action: action.to_string(),
                impact: impact_for(rank, total, phrase.share_neg),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrase(text: &str, share_neg: f64, bucket_counts: Vec<usize>) -> Phrase {
        Phrase {
            text: text.to_string(),
            doc_frequency: 2,
            total_count: bucket_counts.iter().sum(),
            importance: 0.5,
            share_neg,
            bucket_counts,
        }
    }

    #[test]
    fn test_classify_area_first_match_wins() {
        assert_eq!(classify_area("scam").0, Area::PrivacyTrust);
        assert_eq!(classify_area("subscription scam").0, Area::PrivacyTrust);
        assert_eq!(classify_area("app crashes").0, Area::StabilityPerformance);
        assert_eq!(classify_area("too many ads").0, Area::PricingIap);
        assert_eq!(classify_area("customer support").0, Area::Support);
        assert_eq!(classify_area("confusing interface").0, Area::OnboardingUx);
    }

    #[test]
    fn test_classify_area_token_match_only() {
        // "ads" must not match inside "loads"
        assert_eq!(classify_area("loads forever").0, Area::General);
        assert_eq!(classify_area("something unrelated").0, Area::General);
    }

    #[test]
    fn test_priorities_contiguous_and_unique() {
        let phrases: Vec<Phrase> = (0..7)
            .map(|i| phrase(&format!("issue{i}"), 0.5, vec![1, 0, 0]))
            .collect();
        let insights = generate_insights(&phrases, false);
        let priorities: Vec<usize> = insights.iter().map(|x| x.priority).collect();
        assert_eq!(priorities, (1..=7).collect::<Vec<_>>());
    }

    #[test]
    fn test_impact_rule() {
        // 8 phrases: ranks 1-2 top quartile, ranks 7-8 bottom quartile
        assert_eq!(impact_for(1, 8, 0.5), Impact::High);
        assert_eq!(impact_for(2, 8, 0.4), Impact::High);
        assert_eq!(impact_for(1, 8, 0.3), Impact::Medium);
        assert_eq!(impact_for(4, 8, 0.5), Impact::Medium);
        assert_eq!(impact_for(7, 8, 0.5), Impact::Low);
        assert_eq!(impact_for(3, 8, 0.1), Impact::Low);
    }

    #[test]
    fn test_why_template() {
        let insights = generate_insights(&[phrase("crashes", 0.6, vec![3, 0, 1])], false);
        assert_eq!(
            insights[0].why,
            "60% of mentions in negative reviews; strong negative signal; recent reviews"
        );
        assert_eq!(insights[0].impact, Impact::High);

        let insights = generate_insights(&[phrase("slow", 0.3, vec![0, 1, 2])], false);
        assert_eq!(
            insights[0].why,
            "30% of mentions in negative reviews; moderate negative signal"
        );
    }

    #[test]
    fn test_low_sample_caveat() {
        let insights = generate_insights(&[phrase("crashes", 0.6, vec![1, 0, 0])], true);
        assert!(insights[0].why.ends_with("(low sample; interpret with caution)"));
        assert_eq!(insights.len(), 1);
    }
}
