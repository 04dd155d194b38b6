//! Device performance — compares per-device CPA against the account
//! baseline and recommends bid adjustments.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use searchnav_core::config::{DeviceConfig, ProviderConfig};
use searchnav_core::types::{
    validate_customer_id, AnalysisResult, DateRange, DeviceCategory, DeviceRow, Priority,
    Recommendation, RecommendationType,
};
use searchnav_core::NavResult;
use searchnav_providers::{with_timeout, GoogleAdsProvider};

use crate::savings_priority;

pub struct DevicePerformanceAnalyzer {
    provider: Arc<dyn GoogleAdsProvider>,
    config: DeviceConfig,
    timeout_secs: u64,
}

impl DevicePerformanceAnalyzer {
    pub const NAME: &'static str = "device_performance";

    pub fn new(
        provider: Arc<dyn GoogleAdsProvider>,
        config: DeviceConfig,
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
            "device report",
            self.provider.fetch_device_metrics(customer_id, &range),
        )
        .await?;

        let mut result = AnalysisResult::new(Self::NAME, customer_id, range);
        let account = aggregate(&rows);
        result.recommendations = evaluate(&account, &self.config);
        result.summary = serde_json::json!({
            "devices": account.per_device.len(),
            "account_cpa": account.cpa(),
            "account_cost": account.cost,
        });
        debug!(recommendations = result.recommendations.len(), "device scan done");
        Ok(result)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Totals {
    clicks: u64,
    cost: f64,
    conversions: f64,
    conversion_value: f64,
}

impl Totals {
    fn cpa(&self) -> Option<f64> {
        (self.conversions > 0.0).then(|| self.cost / self.conversions)
    }
}

struct AccountView {
    clicks: u64,
    cost: f64,
    conversions: f64,
    per_device: HashMap<DeviceCategory, Totals>,
}

impl AccountView {
    fn cpa(&self) -> Option<f64> {
        (self.conversions > 0.0).then(|| self.cost / self.conversions)
    }
}

fn aggregate(rows: &[DeviceRow]) -> AccountView {
    let mut per_device: HashMap<DeviceCategory, Totals> = HashMap::new();
    let (mut clicks, mut cost, mut conversions) = (0u64, 0.0f64, 0.0f64);
    for row in rows {
        let entry = per_device.entry(row.device).or_default();
        entry.clicks += row.clicks;
        entry.cost += row.cost;
        entry.conversions += row.conversions;
        entry.conversion_value += row.conversion_value;
        clicks += row.clicks;
        cost += row.cost;
        conversions += row.conversions;
    }
    AccountView {
        clicks,
        cost,
        conversions,
        per_device,
    }
}

fn evaluate(account: &AccountView, config: &DeviceConfig) -> Vec<Recommendation> {
    let Some(account_cpa) = account.cpa() else {
        return Vec::new();
    };
    if account.clicks == 0 {
        return Vec::new();
    }

    let mut recommendations = Vec::new();
    for (device, totals) in &account.per_device {
        if totals.clicks < config.min_clicks {
            continue;
        }

        if totals.conversions == 0.0 {
            if totals.cost > 0.0 {
                recommendations.push(bid_down(
                    *device,
                    totals,
                    config.max_bid_adjustment_pct,
                    totals.cost,
                    format!(
                        "{device:?} spent {:.2} over {} clicks with no conversions.",
                        totals.cost, totals.clicks
                    ),
                ));
            }
            continue;
        }

        let device_cpa = totals.cost / totals.conversions;
        let ratio = device_cpa / account_cpa;
        if ratio >= config.cpa_ratio_threshold {
            // Excess spend relative to the account baseline.
            let savings = totals.cost - totals.conversions * account_cpa;
            let suggested = ((ratio - 1.0) * 100.0).min(config.max_bid_adjustment_pct);
            recommendations.push(bid_down(
                *device,
                totals,
                suggested,
                savings,
                format!(
                    "{device:?} CPA is {device_cpa:.2} vs account {account_cpa:.2} \
                     ({:.0}% above baseline).",
                    (ratio - 1.0) * 100.0
                ),
            ));
        } else if ratio <= 1.0 / config.cpa_ratio_threshold {
            let suggested = ((1.0 / ratio - 1.0) * 100.0).min(config.max_bid_adjustment_pct);
            recommendations.push(Recommendation::new(
                RecommendationType::BidAdjustment,
                Priority::Medium,
                format!("Raise bids on {device:?} by {suggested:.0}%"),
                format!(
                    "{device:?} converts at {device_cpa:.2} CPA, well under the \
                     account baseline of {account_cpa:.2}. Headroom for a positive \
                     bid adjustment.",
                ),
                0.0,
                serde_json::json!({
                    "device": *device,
                    "bid_adjustment_pct": suggested,
                    "device_cpa": device_cpa,
                    "account_cpa": account_cpa,
                }),
            ));
        }
    }
    recommendations
}

fn bid_down(
    device: DeviceCategory,
    totals: &Totals,
    adjustment_pct: f64,
    savings: f64,
    detail: String,
) -> Recommendation {
    Recommendation::new(
        RecommendationType::BidAdjustment,
        savings_priority(savings),
        format!("Lower bids on {device:?} by {adjustment_pct:.0}%"),
        format!("{detail} A negative bid adjustment recovers the excess spend."),
        savings,
        serde_json::json!({
            "device": device,
            "bid_adjustment_pct": -adjustment_pct,
            "device_cost": totals.cost,
            "device_conversions": totals.conversions,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(device: DeviceCategory, clicks: u64, cost: f64, conversions: f64) -> DeviceRow {
        DeviceRow {
            campaign_id: "c1".into(),
            device,
            clicks,
            impressions: clicks * 25,
            cost,
            conversions,
            conversion_value: conversions * 50.0,
        }
    }

    fn config() -> DeviceConfig {
        DeviceConfig {
            min_clicks: 100,
            cpa_ratio_threshold: 1.3,
            max_bid_adjustment_pct: 30.0,
        }
    }

    #[test]
    fn test_overspending_device_gets_negative_adjustment() {
        // Account CPA = 1300/30 ≈ 43.3; mobile CPA = 100 (ratio ≈ 2.3).
        let rows = vec![
            row(DeviceCategory::Desktop, 2000, 800.0, 25.0),
            row(DeviceCategory::Mobile, 1500, 500.0, 5.0),
        ];
        let account = aggregate(&rows);
        let recs = evaluate(&account, &config());
        let mobile = recs
            .iter()
            .find(|r| r.action_data["device"] == serde_json::json!(DeviceCategory::Mobile))
            .expect("mobile recommendation");
        let pct = mobile.action_data["bid_adjustment_pct"].as_f64().unwrap();
        assert!(pct < 0.0);
        assert_eq!(pct, -30.0); // clamped at max
        let account_cpa = 1300.0 / 30.0;
        assert!((mobile.estimated_monthly_savings - (500.0 - 5.0 * account_cpa)).abs() < 1e-9);
    }

    #[test]
    fn test_outperforming_device_gets_positive_adjustment() {
        let rows = vec![
            row(DeviceCategory::Desktop, 2000, 900.0, 10.0),
            row(DeviceCategory::Tablet, 400, 100.0, 8.0),
        ];
        let account = aggregate(&rows);
        let recs = evaluate(&account, &config());
        let tablet = recs
            .iter()
            .find(|r| r.action_data["device"] == serde_json::json!(DeviceCategory::Tablet))
            .expect("tablet recommendation");
        assert!(tablet.action_data["bid_adjustment_pct"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_low_traffic_devices_skipped() {
        let rows = vec![
            row(DeviceCategory::Desktop, 2000, 800.0, 20.0),
            row(DeviceCategory::ConnectedTv, 10, 90.0, 0.0),
        ];
        let account = aggregate(&rows);
        let recs = evaluate(&account, &config());
        assert!(recs
            .iter()
            .all(|r| r.action_data["device"] != serde_json::json!(DeviceCategory::ConnectedTv)));
    }

    #[test]
    fn test_no_conversions_anywhere_yields_nothing() {
        let rows = vec![row(DeviceCategory::Desktop, 500, 100.0, 0.0)];
        let account = aggregate(&rows);
        assert!(evaluate(&account, &config()).is_empty());
    }
}
