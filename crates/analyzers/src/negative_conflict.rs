//! Detects negative keywords that block converting positive keywords.

use std::sync::Arc;

use tracing::debug;

use searchnav_core::config::ProviderConfig;
use searchnav_core::types::{
    validate_customer_id, AnalysisResult, DateRange, KeywordRow, MatchType, NegativeKeyword,
    Priority, Recommendation, RecommendationType,
};
use searchnav_core::NavResult;
use searchnav_providers::{with_timeout, GoogleAdsProvider};

/// Strips match-type decorations and normalizes case/whitespace.
pub fn normalize_keyword(text: &str) -> String {
    let t = text.trim();
    let t = t.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(t);
    let t = t.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(t);
    t.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Whether a phrase appears as a contiguous whole-word run inside a keyword.
fn contains_phrase(keyword_words: &[&str], phrase_words: &[&str]) -> bool {
    if phrase_words.is_empty() || phrase_words.len() > keyword_words.len() {
        return false;
    }
    keyword_words
        .windows(phrase_words.len())
        .any(|window| window == phrase_words)
}

/// Google Ads negative matching semantics, case-insensitive:
/// - Exact blocks only the identical normalized text.
/// - Phrase blocks keywords containing the phrase as contiguous whole words.
/// - Broad blocks keywords containing every negative word as a whole word,
///   in any order.
pub fn negative_blocks(negative: &NegativeKeyword, keyword_text: &str) -> bool {
    let neg = normalize_keyword(&negative.text);
    let kw = normalize_keyword(keyword_text);
    if neg.is_empty() || kw.is_empty() {
        return false;
    }
    match negative.match_type {
        MatchType::Exact => neg == kw,
        MatchType::Phrase => {
            let kw_words: Vec<&str> = kw.split(' ').collect();
            let neg_words: Vec<&str> = neg.split(' ').collect();
            contains_phrase(&kw_words, &neg_words)
        }
        MatchType::Broad => {
            let kw_words: Vec<&str> = kw.split(' ').collect();
            neg.split(' ').all(|word| kw_words.contains(&word))
        }
    }
}

pub struct NegativeConflictAnalyzer {
    provider: Arc<dyn GoogleAdsProvider>,
    timeout_secs: u64,
}

impl NegativeConflictAnalyzer {
    pub const NAME: &'static str = "negative_conflict";

    pub fn new(provider: Arc<dyn GoogleAdsProvider>, providers: &ProviderConfig) -> Self {
        Self {
            provider,
            timeout_secs: providers.call_timeout_secs,
        }
    }

    pub async fn analyze(&self, customer_id: &str, range: DateRange) -> NavResult<AnalysisResult> {
        validate_customer_id(customer_id)?;

        let keywords = with_timeout(
            self.timeout_secs,
            "keywords report",
            self.provider.fetch_keywords(customer_id, &range),
        )
        .await?;
        let negatives = with_timeout(
            self.timeout_secs,
            "negative keywords",
            self.provider.fetch_negative_keywords(customer_id),
        )
        .await?;

        let mut result = AnalysisResult::new(Self::NAME, customer_id, range);
        result.recommendations = evaluate(&keywords, &negatives);
        result.summary = serde_json::json!({
            "keywords_checked": keywords.len(),
            "negatives_checked": negatives.len(),
            "conflicts": result.recommendations.len(),
        });
        debug!(conflicts = result.recommendations.len(), "negative conflict scan done");
        Ok(result)
    }
}

fn evaluate(keywords: &[KeywordRow], negatives: &[NegativeKeyword]) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    for negative in negatives {
        for keyword in keywords {
            // Campaign-level negatives only conflict inside their campaign.
            if !negative.campaign_id.is_empty()
                && !keyword.campaign_id.is_empty()
                && negative.campaign_id != keyword.campaign_id
            {
                continue;
            }
            if !negative_blocks(negative, &keyword.keyword_text) {
                continue;
            }
            let priority = if keyword.conversions >= 10.0 {
                Priority::Critical
            } else if keyword.conversions >= 3.0 {
                Priority::High
            } else if keyword.conversions > 0.0 {
                Priority::Medium
            } else {
                Priority::Low
            };
            recommendations.push(Recommendation::new(
                RecommendationType::RemoveNegativeKeyword,
                priority,
                format!(
                    "Negative \"{}\" blocks keyword \"{}\"",
                    negative.text, keyword.keyword_text
                ),
                format!(
                    "The {:?}-match negative \"{}\" suppresses the positive keyword \
                     \"{}\" ({} conversions, {:.2} conv. value in the window). Remove \
                     or narrow the negative to restore delivery.",
                    negative.match_type,
                    negative.text,
                    keyword.keyword_text,
                    keyword.conversions,
                    keyword.conversion_value,
                ),
                keyword.conversion_value,
                serde_json::json!({
                    "negative_keyword": negative.text,
                    "negative_match_type": negative.match_type,
                    "negative_level": negative.level,
                    "campaign_id": negative.campaign_id,
                    "blocked_keyword": keyword.keyword_text,
                    "blocked_conversions": keyword.conversions,
                }),
            ));
        }
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchnav_core::types::NegativeLevel;

    fn negative(text: &str, match_type: MatchType) -> NegativeKeyword {
        NegativeKeyword {
            text: text.to_string(),
            match_type,
            level: NegativeLevel::Campaign,
            campaign_id: String::new(),
        }
    }

    #[test]
    fn test_exact_blocks_only_identical_text() {
        let neg = negative("[shoes]", MatchType::Exact);
        assert!(negative_blocks(&neg, "shoes"));
        assert!(negative_blocks(&neg, "Shoes"));
        assert!(negative_blocks(&neg, "  shoes "));
        assert!(!negative_blocks(&neg, "running shoes"));
        assert!(!negative_blocks(&neg, "shoe"));
    }

    #[test]
    fn test_broad_requires_all_words_as_whole_words() {
        let neg = negative("running shoes", MatchType::Broad);
        assert!(negative_blocks(&neg, "buy running shoes online"));
        assert!(negative_blocks(&neg, "shoes running outlet"));
        assert!(negative_blocks(&neg, "RUNNING shoes"));
        assert!(!negative_blocks(&neg, "running sneakers"));
        assert!(!negative_blocks(&neg, "runnings shoes sale"));
        assert!(!negative_blocks(&neg, "trail runners shoes"));
    }

    #[test]
    fn test_phrase_requires_contiguous_words() {
        let neg = negative("\"running shoes\"", MatchType::Phrase);
        assert!(negative_blocks(&neg, "buy running shoes online"));
        assert!(negative_blocks(&neg, "running shoes"));
        assert!(!negative_blocks(&neg, "shoes for running"));
        assert!(!negative_blocks(&neg, "running red shoes"));
    }

    #[test]
    fn test_normalize_strips_decorations() {
        assert_eq!(normalize_keyword("[Red  Shoes]"), "red shoes");
        assert_eq!(normalize_keyword("\"red shoes\""), "red shoes");
        assert_eq!(normalize_keyword("  red shoes  "), "red shoes");
    }

    #[test]
    fn test_evaluate_prioritizes_by_conversions() {
        let keywords = vec![
            KeywordRow {
                campaign_id: "c1".into(),
                ad_group_id: "a1".into(),
                keyword_text: "running shoes".into(),
                match_type: MatchType::Phrase,
                clicks: 500,
                impressions: 20_000,
                cost: 800.0,
                conversions: 12.0,
                conversion_value: 2400.0,
            },
            KeywordRow {
                campaign_id: "c1".into(),
                ad_group_id: "a1".into(),
                keyword_text: "trail boots".into(),
                match_type: MatchType::Exact,
                clicks: 40,
                impressions: 900,
                cost: 60.0,
                conversions: 0.0,
                conversion_value: 0.0,
            },
        ];
        let negatives = vec![negative("shoes", MatchType::Broad)];
        let recs = evaluate(&keywords, &negatives);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(
            recs[0].action_data["blocked_keyword"],
            serde_json::json!("running shoes")
        );
    }

    #[test]
    fn test_campaign_scoping() {
        let keywords = vec![KeywordRow {
            campaign_id: "c2".into(),
            ad_group_id: "a1".into(),
            keyword_text: "shoes".into(),
            match_type: MatchType::Exact,
            clicks: 10,
            impressions: 100,
            cost: 5.0,
            conversions: 1.0,
            conversion_value: 20.0,
        }];
        let mut neg = negative("shoes", MatchType::Exact);
        neg.campaign_id = "c1".into();
        assert!(evaluate(&keywords, &[neg]).is_empty());
    }
}
