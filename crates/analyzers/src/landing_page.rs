//! Landing page audit over GA4 page metrics — high-bounce and slow pages
//! that burn paid clicks.

use std::sync::Arc;

use tracing::debug;

use searchnav_core::config::{LandingPageConfig, ProviderConfig};
use searchnav_core::types::{
    validate_customer_id, AnalysisResult, DateRange, LandingPageRow, Priority, Recommendation,
    RecommendationType,
};
use searchnav_core::NavResult;
use searchnav_providers::{with_timeout, Ga4Provider};

pub struct LandingPageAnalyzer {
    provider: Arc<dyn Ga4Provider>,
    config: LandingPageConfig,
    timeout_secs: u64,
}

impl LandingPageAnalyzer {
    pub const NAME: &'static str = "landing_page";

    pub fn new(
        provider: Arc<dyn Ga4Provider>,
        config: LandingPageConfig,
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
            "landing pages",
            self.provider.fetch_landing_pages(customer_id, &range),
        )
        .await?;

        let mut result = AnalysisResult::new(Self::NAME, customer_id, range);
        result.recommendations = evaluate(&rows, &self.config);
        result.summary = serde_json::json!({
            "pages_analyzed": rows.len(),
            "pages_flagged": result.recommendations.len(),
        });
        debug!(flagged = result.recommendations.len(), "landing page scan done");
        Ok(result)
    }
}

fn evaluate(rows: &[LandingPageRow], config: &LandingPageConfig) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    for row in rows {
        if row.sessions < config.min_sessions {
            continue;
        }
        let bouncy = row.bounce_rate > config.max_bounce_rate;
        let slow = row.avg_load_ms > config.max_load_ms;
        if !bouncy && !slow {
            continue;
        }

        // Paid spend wasted on sessions that bounce beyond the tolerated rate.
        let excess_bounce = (row.bounce_rate - config.max_bounce_rate).max(0.0);
        let savings = row.cost * excess_bounce;

        let priority = match (bouncy, slow) {
            (true, true) => Priority::High,
            (true, false) => Priority::Medium,
            (false, true) => {
                if row.cost > 0.0 {
                    Priority::Medium
                } else {
                    Priority::Low
                }
            }
            (false, false) => unreachable!(),
        };

        let mut problems = Vec::new();
        if bouncy {
            problems.push(format!(
                "bounce rate {:.0}% (limit {:.0}%)",
                row.bounce_rate * 100.0,
                config.max_bounce_rate * 100.0
            ));
        }
        if slow {
            problems.push(format!(
                "average load {:.0} ms (limit {:.0} ms)",
                row.avg_load_ms, config.max_load_ms
            ));
        }

        recommendations.push(Recommendation::new(
            RecommendationType::LandingPageFix,
            priority,
            format!("Fix landing page {}", row.url),
            format!(
                "{} received {} sessions with {}. Paid clicks are landing on a \
                 page that loses visitors before they can convert.",
                row.url,
                row.sessions,
                problems.join(" and ")
            ),
            savings,
            serde_json::json!({
                "url": row.url,
                "bounce_rate": row.bounce_rate,
                "avg_load_ms": row.avg_load_ms,
                "sessions": row.sessions,
                "cost": row.cost,
            }),
        ));
    }
    recommendations
}
