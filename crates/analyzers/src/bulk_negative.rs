//! Bulk negative keyword manager — flags search terms that spend without
//! converting and are not already blocked by an existing negative.

use std::sync::Arc;

use tracing::debug;

use searchnav_core::config::{BulkNegativeConfig, ProviderConfig};
use searchnav_core::types::{
    validate_customer_id, AnalysisResult, DateRange, NegativeKeyword, Recommendation,
    RecommendationType, SearchTermRow,
};
use searchnav_core::NavResult;
use searchnav_providers::{with_timeout, GoogleAdsProvider};

use crate::negative_conflict::negative_blocks;
use crate::savings_priority;

pub struct BulkNegativeAnalyzer {
    provider: Arc<dyn GoogleAdsProvider>,
    config: BulkNegativeConfig,
    timeout_secs: u64,
}

impl BulkNegativeAnalyzer {
    pub const NAME: &'static str = "bulk_negative";

    pub fn new(
        provider: Arc<dyn GoogleAdsProvider>,
        config: BulkNegativeConfig,
        providers: &ProviderConfig,
    ) -> Self {
        Self {
            provider,
            config,
            timeout_secs: providers.call_timeout_secs,
        }
    }

    pub async fn analyze(&self, customer_id: &str, range: DateRange) -> NavResult<AnalysisResult> {
        validate_customer_id(customer_id)?;

        let terms = with_timeout(
            self.timeout_secs,
            "search terms report",
            self.provider.fetch_search_terms(customer_id, &range),
        )
        .await?;
        let negatives = with_timeout(
            self.timeout_secs,
            "negative keywords",
            self.provider.fetch_negative_keywords(customer_id),
        )
        .await?;

        let mut result = AnalysisResult::new(Self::NAME, customer_id, range);
        result.recommendations = evaluate(&terms, &negatives, &self.config);
        let wasted: f64 = result
            .recommendations
            .iter()
            .map(|r| r.estimated_monthly_savings)
            .sum();
        result.summary = serde_json::json!({
            "terms_analyzed": terms.len(),
            "existing_negatives": negatives.len(),
            "flagged_terms": result.recommendations.len(),
            "wasted_spend": wasted,
        });
        debug!(
            flagged = result.recommendations.len(),
            wasted, "bulk negative scan done"
        );
        Ok(result)
    }
}

fn evaluate(
    terms: &[SearchTermRow],
    negatives: &[NegativeKeyword],
    config: &BulkNegativeConfig,
) -> Vec<Recommendation> {
    terms
        .iter()
        .filter(|t| t.conversions == 0.0)
        .filter(|t| t.clicks >= config.min_clicks)
        .filter(|t| t.cost >= config.min_cost)
        .filter(|t| !negatives.iter().any(|n| negative_blocks(n, &t.search_term)))
        .map(|term| {
            Recommendation::new(
                RecommendationType::AddNegativeKeyword,
                savings_priority(term.cost),
                format!("Add negative keyword \"{}\"", term.search_term),
                format!(
                    "Search term \"{}\" spent {:.2} over {} clicks with zero \
                     conversions (matched via \"{}\"). Add it as an exact negative.",
                    term.search_term, term.cost, term.clicks, term.matched_keyword,
                ),
                term.cost,
                serde_json::json!({
                    "campaign_id": term.campaign_id,
                    "ad_group_id": term.ad_group_id,
                    "keyword": term.search_term,
                    "match_type": "exact",
                }),
            )
        })
        .collect()
}
