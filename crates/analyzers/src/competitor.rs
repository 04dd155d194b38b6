//! Competitor insights over the auction insights report.
//!
//! Rankings and flags are computed in a single pass over the rows.

use std::sync::Arc;

use tracing::debug;

use searchnav_core::config::{CompetitorConfig, ProviderConfig};
use searchnav_core::types::{
    validate_customer_id, AnalysisResult, AuctionInsightRow, DateRange, Priority, Recommendation,
    RecommendationType,
};
use searchnav_core::NavResult;
use searchnav_providers::{with_timeout, GoogleAdsProvider};

/// Domain labels Google uses for the account's own row.
const SELF_DOMAINS: [&str; 2] = ["you", "your ads"];

fn is_self(row: &AuctionInsightRow) -> bool {
    SELF_DOMAINS
        .iter()
        .any(|d| row.domain.eq_ignore_ascii_case(d))
}

pub struct CompetitorInsightsAnalyzer {
    provider: Arc<dyn GoogleAdsProvider>,
    config: CompetitorConfig,
    timeout_secs: u64,
}

impl CompetitorInsightsAnalyzer {
    pub const NAME: &'static str = "competitor_insights";

    pub fn new(
        provider: Arc<dyn GoogleAdsProvider>,
        config: CompetitorConfig,
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

        let rows = with_timeout(
            self.timeout_secs,
            "auction insights",
            self.provider.fetch_auction_insights(customer_id, &range),
        )
        .await?;

        let mut result = AnalysisResult::new(Self::NAME, customer_id, range);
        let rankings = evaluate(&rows, &self.config, &mut result.recommendations);
        result.summary = serde_json::json!({
            "competitors": rankings.competitors,
            "own_impression_share": rankings.own_impression_share,
            "own_rank": rankings.own_rank,
            "top_competitor": rankings.top_competitor,
        });
        debug!(
            competitors = rankings.competitors,
            recommendations = result.recommendations.len(),
            "competitor scan done"
        );
        Ok(result)
    }
}

struct Rankings {
    competitors: usize,
    own_impression_share: Option<f64>,
    own_rank: Option<usize>,
    top_competitor: Option<String>,
}

/// Single pass: tracks the account's own share, the strongest competitor,
/// and the account's rank while emitting per-domain flags.
fn evaluate(
    rows: &[AuctionInsightRow],
    config: &CompetitorConfig,
    recommendations: &mut Vec<Recommendation>,
) -> Rankings {
    let mut own_impression_share = None;
    let mut own_rank_better_than = 0usize;
    let mut competitors = 0usize;
    let mut top_competitor: Option<(&AuctionInsightRow, f64)> = None;

    let own_share_hint = rows.iter().find(|r| is_self(r)).map(|r| r.impression_share);

    for row in rows {
        if is_self(row) {
            own_impression_share = Some(row.impression_share);
            continue;
        }
        competitors += 1;

        if own_share_hint.map(|own| row.impression_share > own).unwrap_or(false) {
            own_rank_better_than += 1;
        }
        if top_competitor
            .map(|(_, share)| row.impression_share > share)
            .unwrap_or(true)
        {
            top_competitor = Some((row, row.impression_share));
        }

        // Domains that both overlap heavily and sit above us in the auction.
        if row.overlap_rate >= config.min_overlap_rate
            && row.position_above_rate >= config.outranked_threshold
        {
            let priority = if row.position_above_rate >= 0.75 {
                Priority::High
            } else {
                Priority::Medium
            };
            recommendations.push(Recommendation::new(
                RecommendationType::BidAdjustment,
                priority,
                format!("{} outranks you in shared auctions", row.domain),
                format!(
                    "{} appears in {:.0}% of your auctions and shows above you \
                     {:.0}% of the time. Review bids and ad rank on the overlapping \
                     keywords.",
                    row.domain,
                    row.overlap_rate * 100.0,
                    row.position_above_rate * 100.0,
                ),
                0.0,
                serde_json::json!({
                    "domain": row.domain,
                    "overlap_rate": row.overlap_rate,
                    "position_above_rate": row.position_above_rate,
                }),
            ));
        }
    }

    if let Some(own) = own_impression_share {
        if own < config.low_impression_share {
            recommendations.push(Recommendation::new(
                RecommendationType::BudgetAdjustment,
                Priority::High,
                format!("Impression share is only {:.0}%", own * 100.0),
                format!(
                    "Your ads captured {:.0}% of eligible impressions, below the \
                     {:.0}% floor. Budget or rank is capping delivery while \
                     competitors absorb the remainder.",
                    own * 100.0,
                    config.low_impression_share * 100.0,
                ),
                0.0,
                serde_json::json!({
                    "impression_share": own,
                    "threshold": config.low_impression_share,
                }),
            ));
        }
    }

    Rankings {
        competitors,
        own_impression_share,
        own_rank: own_impression_share.map(|_| own_rank_better_than + 1),
        top_competitor: top_competitor.map(|(r, _)| r.domain.clone()),
    }
}
