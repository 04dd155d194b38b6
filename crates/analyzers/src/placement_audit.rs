//! Display/Video placement audit — non-converting, click-spam, and dead
//! placements, plus blanket mobile-app exclusion.

use std::sync::Arc;

use tracing::debug;

use searchnav_core::config::{PlacementConfig, ProviderConfig};
use searchnav_core::types::{
    validate_customer_id, AdMetrics, AnalysisResult, DateRange, PlacementKind, PlacementRow,
    Priority, Recommendation, RecommendationType,
};
use searchnav_core::NavResult;
use searchnav_providers::{with_timeout, GoogleAdsProvider};

use crate::savings_priority;

pub struct PlacementAuditAnalyzer {
    provider: Arc<dyn GoogleAdsProvider>,
    config: PlacementConfig,
    timeout_secs: u64,
}

impl PlacementAuditAnalyzer {
    pub const NAME: &'static str = "placement_audit";

    pub fn new(
        provider: Arc<dyn GoogleAdsProvider>,
        config: PlacementConfig,
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
            "placements report",
            self.provider.fetch_placements(customer_id, &range),
        )
        .await?;

        let mut result = AnalysisResult::new(Self::NAME, customer_id, range);
        result.recommendations = evaluate(&rows, &self.config);
        let recoverable: f64 = result
            .recommendations
            .iter()
            .map(|r| r.estimated_monthly_savings)
            .sum();
        result.summary = serde_json::json!({
            "placements_analyzed": rows.len(),
            "placements_flagged": result.recommendations.len(),
            "recoverable_spend": recoverable,
        });
        debug!(
            flagged = result.recommendations.len(),
            recoverable, "placement audit done"
        );
        Ok(result)
    }
}

/// Exclusion reasons in descending severity. A placement matching several
/// gets one recommendation carrying the strongest reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reason {
    ClickSpam,
    MobileApp,
    NoConversions,
    DeadPlacement,
}

fn classify(row: &PlacementRow, config: &PlacementConfig) -> Option<Reason> {
    if row.cost < config.min_cost {
        return None;
    }
    let ctr = row.ctr();
    if ctr >= config.spam_ctr && row.conversions == 0.0 {
        return Some(Reason::ClickSpam);
    }
    if config.exclude_mobile_apps && row.kind == PlacementKind::MobileApp {
        return Some(Reason::MobileApp);
    }
    if row.conversions == 0.0 {
        return Some(Reason::NoConversions);
    }
    if ctr <= config.dead_ctr {
        return Some(Reason::DeadPlacement);
    }
    None
}

fn evaluate(rows: &[PlacementRow], config: &PlacementConfig) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    for row in rows {
        let Some(reason) = classify(row, config) else {
            continue;
        };

        // Converting placements flagged for low CTR lose nothing by staying.
        let savings = if row.conversions == 0.0 { row.cost } else { 0.0 };
        let (priority, detail) = match reason {
            Reason::ClickSpam => (
                Priority::Critical,
                format!(
                    "CTR of {:.1}% over {} impressions with zero conversions is a \
                     click-spam signature.",
                    row.ctr() * 100.0,
                    row.impressions
                ),
            ),
            Reason::MobileApp => (
                savings_priority(savings).max(Priority::Medium),
                format!(
                    "Mobile app placement spent {:.2} and the account policy \
                     excludes app inventory.",
                    row.cost
                ),
            ),
            Reason::NoConversions => (
                savings_priority(savings),
                format!(
                    "Spent {:.2} over {} clicks with zero conversions.",
                    row.cost, row.clicks
                ),
            ),
            Reason::DeadPlacement => (
                Priority::Low,
                format!(
                    "CTR of {:.3}% across {} impressions shows the placement \
                     never earns engagement.",
                    row.ctr() * 100.0,
                    row.impressions
                ),
            ),
        };

        recommendations.push(Recommendation::new(
            RecommendationType::ExcludePlacement,
            priority,
            format!("Exclude placement {}", row.placement),
            detail,
            savings,
            serde_json::json!({
                "campaign_id": row.campaign_id,
                "placement": row.placement,
                "kind": row.kind,
                "reason": format!("{reason:?}"),
                "cost": row.cost,
                "ctr": row.ctr(),
            }),
        ));
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        placement: &str,
        kind: PlacementKind,
        clicks: u64,
        impressions: u64,
        cost: f64,
        conversions: f64,
    ) -> PlacementRow {
        PlacementRow {
            campaign_id: "c1".into(),
            placement: placement.to_string(),
            kind,
            clicks,
            impressions,
            cost,
            conversions,
        }
    }

    fn config() -> PlacementConfig {
        PlacementConfig {
            min_cost: 5.0,
            spam_ctr: 0.10,
            dead_ctr: 0.0005,
            exclude_mobile_apps: true,
        }
    }

    #[test]
    fn test_click_spam_is_critical() {
        let rows = vec![row("spam.example", PlacementKind::Website, 300, 1000, 80.0, 0.0)];
        let recs = evaluate(&rows, &config());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(recs[0].action_data["reason"], serde_json::json!("ClickSpam"));
        assert_eq!(recs[0].estimated_monthly_savings, 80.0);
    }

    #[test]
    fn test_mobile_app_excluded_even_when_converting() {
        let rows = vec![row("com.game.app", PlacementKind::MobileApp, 50, 5000, 40.0, 2.0)];
        let recs = evaluate(&rows, &config());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].action_data["reason"], serde_json::json!("MobileApp"));
        assert_eq!(recs[0].estimated_monthly_savings, 0.0);
    }

    #[test]
    fn test_mobile_apps_kept_when_policy_disabled() {
        let mut cfg = config();
        cfg.exclude_mobile_apps = false;
        let rows = vec![row("com.game.app", PlacementKind::MobileApp, 50, 5000, 40.0, 2.0)];
        assert!(evaluate(&rows, &cfg).is_empty());
    }

    #[test]
    fn test_dead_placement_low_priority() {
        let rows = vec![row(
            "parked.example",
            PlacementKind::Website,
            1,
            400_000,
            12.0,
            1.0,
        )];
        let recs = evaluate(&rows, &config());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Low);
        assert_eq!(recs[0].action_data["reason"], serde_json::json!("DeadPlacement"));
    }

    #[test]
    fn test_cheap_and_healthy_placements_skipped() {
        let rows = vec![
            row("cheap.example", PlacementKind::Website, 20, 300, 2.0, 0.0),
            row("good.example", PlacementKind::YoutubeVideo, 120, 8000, 90.0, 6.0),
        ];
        assert!(evaluate(&rows, &config()).is_empty());
    }

    #[test]
    fn test_one_recommendation_per_placement() {
        // Spammy mobile app matches several reasons but yields a single rec.
        let rows = vec![row("com.spam.app", PlacementKind::MobileApp, 400, 1200, 60.0, 0.0)];
        let recs = evaluate(&rows, &config());
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].action_data["reason"], serde_json::json!("ClickSpam"));
    }
}
