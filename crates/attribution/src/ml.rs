//! ML-assisted attribution insights — extracts tabular features from
//! journeys, delegates LTV training/prediction to an opaque model service,
//! and turns predictions into structured recommendations.
//!
//! Model failures never reach the caller: training or prediction errors
//! (including timeouts) fall back to rule-of-thumb LTV multipliers and the
//! report summary records that the fallback was used.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use ndarray::Array2;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

use searchnav_core::config::AttributionConfig;
use searchnav_core::types::{
    AnalysisResult, DateRange, DeviceCategory, Priority, Recommendation, RecommendationType,
};

use crate::types::CustomerJourney;

/// Width of the per-journey feature vector. The layout is documented on
/// [`extract_features`].
pub const FEATURE_DIM: usize = 40;

#[derive(Debug, Clone, Error)]
pub enum MlError {
    #[error("model not trained")]
    NotTrained,
    #[error("training failed: {0}")]
    TrainingFailed(String),
    #[error("prediction failed: {0}")]
    PredictionFailed(String),
    #[error("model call timed out")]
    Timeout,
}

/// Opaque LTV model seam. Real deployments back this with an external
/// causal-ML service; tests and offline runs use [`HeuristicLtvModel`].
#[async_trait]
pub trait LtvModel: Send + Sync {
    async fn train(&self, features: &Array2<f32>, targets: &[f32]) -> Result<(), MlError>;

    async fn predict(&self, features: &Array2<f32>) -> Result<Vec<f32>, MlError>;

    /// Model name for logging and report summaries.
    fn name(&self) -> &str;
}

/// Builds one journey's feature vector.
///
/// Layout (40 dims):
///   [0]      — touch count
///   [1]      — converted flag
///   [2]      — ln(1 + conversion value)
///   [3]      — journey span in hours
///   [4..7)   — mean / max / min gap between timestamped touches (hours)
///   [7]      — multi-channel flag
///   [8]      — multi-device flag
///   [9]      — gclid match rate
///   [10..15) — touch counts by device (desktop, mobile, tablet, ctv, other)
///   [15..22) — touch counts by medium class (cpc, organic, direct,
///              referral, email, social, other)
///   [22]     — first touch is paid search
///   [23]     — last touch is paid search
///   [24]     — distinct sources
///   [25]     — distinct mediums
///   [26]     — distinct campaigns
///   [27]     — total page views
///   [28]     — mean page views per touch
///   [29]     — total session duration (minutes)
///   [30]     — mean session duration per touch (minutes)
///   [31]     — share of touches with a timestamp
///   [32]     — share of touches on a weekend
///   [33]     — mean hour-of-day / 24
///   [34]     — touches within 24h of the journey anchor
///   [35]     — touches within 7d of the journey anchor
///   [36]     — share of engaged sessions (> 30s)
///   [37..40) — reserved, zero
pub fn extract_features(journey: &CustomerJourney) -> [f32; FEATURE_DIM] {
    let mut f = [0.0f32; FEATURE_DIM];
    let n = journey.touches.len();
    if n == 0 {
        return f;
    }
    let nf = n as f32;

    f[0] = nf;
    f[1] = if journey.converted { 1.0 } else { 0.0 };
    f[2] = (1.0 + journey.conversion_value as f32).ln();

    if let (Some(first), Some(last)) = (journey.first_touch_at, journey.last_touch_at) {
        f[3] = (last - first).num_seconds() as f32 / 3600.0;
    }

    let stamps: Vec<_> = journey.touches.iter().filter_map(|t| t.timestamp).collect();
    if stamps.len() >= 2 {
        let gaps: Vec<f32> = stamps
            .windows(2)
            .map(|w| (w[1] - w[0]).num_seconds().max(0) as f32 / 3600.0)
            .collect();
        f[4] = gaps.iter().sum::<f32>() / gaps.len() as f32;
        f[5] = gaps.iter().cloned().fold(0.0, f32::max);
        f[6] = gaps.iter().cloned().fold(f32::INFINITY, f32::min);
    }

    f[7] = if journey.multi_channel { 1.0 } else { 0.0 };
    f[8] = if journey.multi_device { 1.0 } else { 0.0 };
    f[9] = journey.touches.iter().filter(|t| t.gclid.is_some()).count() as f32 / nf;

    for touch in &journey.touches {
        let slot = match touch.device {
            DeviceCategory::Desktop => 10,
            DeviceCategory::Mobile => 11,
            DeviceCategory::Tablet => 12,
            DeviceCategory::ConnectedTv => 13,
            DeviceCategory::Other => 14,
        };
        f[slot] += 1.0;

        let medium = touch.medium.to_ascii_lowercase();
        let slot = match medium.as_str() {
            "cpc" | "ppc" => 15,
            "organic" => 16,
            "(none)" | "direct" => 17,
            "referral" => 18,
            "email" => 19,
            "social" | "paid_social" => 20,
            _ => 21,
        };
        f[slot] += 1.0;
    }

    f[22] = if journey.touches.first().map(|t| t.is_paid_search()).unwrap_or(false) { 1.0 } else { 0.0 };
    f[23] = if journey.touches.last().map(|t| t.is_paid_search()).unwrap_or(false) { 1.0 } else { 0.0 };

    let sources: std::collections::HashSet<_> =
        journey.touches.iter().map(|t| t.source.as_str()).collect();
    let mediums: std::collections::HashSet<_> =
        journey.touches.iter().map(|t| t.medium.as_str()).collect();
    let campaigns: std::collections::HashSet<_> =
        journey.touches.iter().filter_map(|t| t.campaign.as_deref()).collect();
    f[24] = sources.len() as f32;
    f[25] = mediums.len() as f32;
    f[26] = campaigns.len() as f32;

    let page_views: u32 = journey.touches.iter().map(|t| t.page_views).sum();
    f[27] = page_views as f32;
    f[28] = page_views as f32 / nf;
    let duration: f64 = journey.touches.iter().map(|t| t.session_duration_secs).sum();
    f[29] = (duration / 60.0) as f32;
    f[30] = (duration / 60.0) as f32 / nf;

    f[31] = stamps.len() as f32 / nf;
    if !stamps.is_empty() {
        let weekend = stamps
            .iter()
            .filter(|ts| {
                let wd = ts.weekday();
                wd == chrono::Weekday::Sat || wd == chrono::Weekday::Sun
            })
            .count();
        f[32] = weekend as f32 / stamps.len() as f32;
        f[33] = stamps.iter().map(|ts| ts.hour() as f32).sum::<f32>()
            / stamps.len() as f32
            / 24.0;
    }

    if let Some(anchor) = journey.conversion_at.or(journey.last_touch_at) {
        f[34] = stamps
            .iter()
            .filter(|ts| (anchor - **ts).num_hours() <= 24)
            .count() as f32;
        f[35] = stamps
            .iter()
            .filter(|ts| (anchor - **ts).num_days() <= 7)
            .count() as f32;
    }

    f[36] = journey
        .touches
        .iter()
        .filter(|t| t.session_duration_secs > 30.0)
        .count() as f32
        / nf;

    f
}

/// Stacks per-journey feature vectors into a training/prediction matrix.
pub fn feature_matrix(journeys: &[CustomerJourney]) -> Array2<f32> {
    let mut matrix = Array2::<f32>::zeros((journeys.len(), FEATURE_DIM));
    for (i, journey) in journeys.iter().enumerate() {
        let features = extract_features(journey);
        for (j, value) in features.iter().enumerate() {
            matrix[[i, j]] = *value;
        }
    }
    matrix
}

/// Deterministic in-process model: learns the mean target during training
/// and scales it by the multi-channel / multi-device flags at prediction
/// time. Used by tests and offline runs.
pub struct HeuristicLtvModel {
    mean_target: RwLock<Option<f32>>,
}

impl HeuristicLtvModel {
    pub fn new() -> Self {
        Self {
            mean_target: RwLock::new(None),
        }
    }
}

impl Default for HeuristicLtvModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LtvModel for HeuristicLtvModel {
    async fn train(&self, features: &Array2<f32>, targets: &[f32]) -> Result<(), MlError> {
        if features.nrows() != targets.len() {
            return Err(MlError::TrainingFailed(format!(
                "{} feature rows vs {} targets",
                features.nrows(),
                targets.len()
            )));
        }
        if targets.is_empty() {
            return Err(MlError::TrainingFailed("no training rows".into()));
        }
        let mean = targets.iter().sum::<f32>() / targets.len() as f32;
        *self.mean_target.write() = Some(mean);
        Ok(())
    }

    async fn predict(&self, features: &Array2<f32>) -> Result<Vec<f32>, MlError> {
        let mean = self.mean_target.read().ok_or(MlError::NotTrained)?;
        Ok(features
            .rows()
            .into_iter()
            .map(|row| {
                let mut scale = 1.0f32;
                if row[7] > 0.0 {
                    scale += 0.5; // multi-channel
                }
                if row[8] > 0.0 {
                    scale += 0.25; // multi-device
                }
                mean * scale
            })
            .collect())
    }

    fn name(&self) -> &str {
        "heuristic_mean"
    }
}

/// Fallback LTV used when the model is unavailable: a rule-of-thumb
/// multiplier over the journey's own conversion value.
fn fallback_ltv(journey: &CustomerJourney) -> f64 {
    let multiplier = if journey.multi_channel {
        2.5
    } else if journey.multi_device {
        1.8
    } else {
        1.2
    };
    journey.conversion_value * multiplier
}

pub struct MlAttributionAnalyzer {
    model: Arc<dyn LtvModel>,
    config: AttributionConfig,
}

impl MlAttributionAnalyzer {
    pub const NAME: &'static str = "ml_attribution";

    pub fn new(model: Arc<dyn LtvModel>, config: AttributionConfig) -> Self {
        Self { model, config }
    }

    /// Produces attribution insights for the given journeys. Model failures
    /// degrade to heuristics; this method never errors.
    pub async fn generate_insights(
        &self,
        customer_id: &str,
        range: DateRange,
        journeys: &[CustomerJourney],
    ) -> AnalysisResult {
        let mut result = AnalysisResult::new(Self::NAME, customer_id, range);

        let converting: Vec<&CustomerJourney> = journeys.iter().filter(|j| j.converted).collect();
        debug!(
            journeys = journeys.len(),
            converting = converting.len(),
            "generating ML attribution insights"
        );

        let (predictions, model_used) = self.predict_ltv(journeys, &converting).await;
        if !model_used {
            result
                .warnings
                .push("LTV model unavailable, used rule-of-thumb multipliers".to_string());
        }

        let mean_ltv = if predictions.is_empty() {
            0.0
        } else {
            predictions.iter().sum::<f64>() / predictions.len() as f64
        };

        self.push_high_ltv_insight(&mut result, journeys, &predictions, mean_ltv);
        self.push_sequence_insight(&mut result, journeys);
        self.push_gclid_insight(&mut result, journeys);
        self.push_cross_channel_insight(&mut result, journeys);

        result.summary = serde_json::json!({
            "journeys_analyzed": journeys.len(),
            "converting_journeys": converting.len(),
            "model": self.model.name(),
            "model_used": model_used,
            "mean_predicted_ltv": mean_ltv,
        });
        result
    }

    /// Trains on converting journeys and predicts for all. Any failure or
    /// timeout falls back to heuristic multipliers.
    async fn predict_ltv(
        &self,
        journeys: &[CustomerJourney],
        converting: &[&CustomerJourney],
    ) -> (Vec<f64>, bool) {
        let timeout = Duration::from_secs(self.config.ml_timeout_secs);

        let trained = if converting.is_empty() {
            Err(MlError::TrainingFailed("no converting journeys".into()))
        } else {
            let owned: Vec<CustomerJourney> = converting.iter().map(|j| (*j).clone()).collect();
            let train_features = feature_matrix(&owned);
            let targets: Vec<f32> = converting.iter().map(|j| j.conversion_value as f32).collect();
            match tokio::time::timeout(timeout, self.model.train(&train_features, &targets)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(MlError::Timeout),
            }
        };

        match trained {
            Ok(()) => {
                let features = feature_matrix(journeys);
                match tokio::time::timeout(timeout, self.model.predict(&features)).await {
                    Ok(Ok(scores)) if scores.len() == journeys.len() => {
                        return (scores.into_iter().map(|s| s as f64).collect(), true);
                    }
                    Ok(Ok(scores)) => {
                        warn!(
                            expected = journeys.len(),
                            got = scores.len(),
                            "model returned wrong prediction count, falling back"
                        );
                    }
                    Ok(Err(e)) => warn!(error = %e, "LTV prediction failed, falling back"),
                    Err(_) => warn!("LTV prediction timed out, falling back"),
                }
            }
            Err(e) => warn!(error = %e, "LTV training failed, falling back"),
        }

        (journeys.iter().map(fallback_ltv).collect(), false)
    }

    fn push_high_ltv_insight(
        &self,
        result: &mut AnalysisResult,
        journeys: &[CustomerJourney],
        predictions: &[f64],
        mean_ltv: f64,
    ) {
        if mean_ltv <= 0.0 {
            return;
        }
        let high: Vec<&CustomerJourney> = journeys
            .iter()
            .zip(predictions)
            .filter(|(_, p)| **p > 1.5 * mean_ltv)
            .map(|(j, _)| j)
            .collect();
        if high.is_empty() {
            return;
        }
        let share = high.len() as f64 / journeys.len() as f64;
        let multi_channel_share =
            high.iter().filter(|j| j.multi_channel).count() as f64 / high.len() as f64;
        result.recommendations.push(Recommendation::new(
            RecommendationType::AttributionInsight,
            Priority::Medium,
            format!("{:.0}% of journeys have outsized predicted LTV", share * 100.0),
            format!(
                "{} journeys are predicted at more than 1.5x the mean lifetime value; \
                 {:.0}% of them are multi-channel. Last-click bidding undervalues the \
                 assisting channels in these paths.",
                high.len(),
                multi_channel_share * 100.0
            ),
            0.0,
            serde_json::json!({
                "high_ltv_journeys": high.len(),
                "share": share,
                "multi_channel_share": multi_channel_share,
            }),
        ));
    }

    /// Counts 2–3 step closing source/medium sequences and surfaces the most
    /// common converting one, with the non-converting occurrences of the same
    /// path as a baseline.
    fn push_sequence_insight(&self, result: &mut AnalysisResult, journeys: &[CustomerJourney]) {
        fn closing_path(journey: &CustomerJourney) -> Option<String> {
            if journey.touches.len() < 2 {
                return None;
            }
            let channels: Vec<String> = journey.touches.iter().map(|t| t.channel()).collect();
            let take = channels.len().min(3);
            // Closing steps of the path carry the sequence signal.
            Some(channels[channels.len() - take..].join(" > "))
        }

        let mut converting: HashMap<String, usize> = HashMap::new();
        let mut non_converting: HashMap<String, usize> = HashMap::new();
        for journey in journeys {
            let Some(seq) = closing_path(journey) else { continue };
            if journey.converted {
                *converting.entry(seq).or_insert(0) += 1;
            } else {
                *non_converting.entry(seq).or_insert(0) += 1;
            }
        }
        let Some((path, count)) = converting.into_iter().max_by_key(|(_, c)| *c) else {
            return;
        };
        if count < 2 {
            return;
        }
        let baseline = non_converting.get(&path).copied().unwrap_or(0);
        let close_rate = count as f64 / (count + baseline) as f64;
        result.recommendations.push(Recommendation::new(
            RecommendationType::AttributionInsight,
            Priority::Medium,
            format!("Common converting path: {path}"),
            format!(
                "{count} converting journeys closed through the path \"{path}\", \
                 against {baseline} non-converting journeys on the same path \
                 ({:.0}% close rate). Keep every channel in this sequence funded \
                 when rebalancing budgets.",
                close_rate * 100.0
            ),
            0.0,
            serde_json::json!({
                "path": path,
                "conversions": count,
                "non_converting": baseline,
                "close_rate": close_rate,
            }),
        ));
    }

    fn push_gclid_insight(&self, result: &mut AnalysisResult, journeys: &[CustomerJourney]) {
        let paid: Vec<_> = journeys
            .iter()
            .flat_map(|j| j.touches.iter())
            .filter(|t| t.is_paid_search())
            .collect();
        if paid.is_empty() {
            return;
        }
        let matched = paid.iter().filter(|t| t.gclid.is_some()).count();
        let rate = matched as f64 / paid.len() as f64;
        if rate >= self.config.min_gclid_match_rate {
            return;
        }
        result.recommendations.push(Recommendation::new(
            RecommendationType::AttributionInsight,
            Priority::High,
            format!("GCLID match rate is {:.0}%", rate * 100.0),
            format!(
                "Only {matched} of {} paid-search touches carry a GCLID (threshold \
                 {:.0}%). Auto-tagging or redirect stripping is likely breaking the \
                 click-to-analytics join, which skews every attribution model.",
                paid.len(),
                self.config.min_gclid_match_rate * 100.0
            ),
            0.0,
            serde_json::json!({"gclid_match_rate": rate, "paid_touches": paid.len()}),
        ));
    }

    fn push_cross_channel_insight(&self, result: &mut AnalysisResult, journeys: &[CustomerJourney]) {
        let (mut multi_total, mut multi_conv, mut single_total, mut single_conv) = (0u64, 0u64, 0u64, 0u64);
        for journey in journeys {
            if journey.multi_channel {
                multi_total += 1;
                if journey.converted {
                    multi_conv += 1;
                }
            } else {
                single_total += 1;
                if journey.converted {
                    single_conv += 1;
                }
            }
        }
        if multi_total == 0 || single_total == 0 {
            return;
        }
        let multi_rate = multi_conv as f64 / multi_total as f64;
        let single_rate = single_conv as f64 / single_total as f64;
        if multi_rate <= single_rate * 1.2 {
            return;
        }
        result.recommendations.push(Recommendation::new(
            RecommendationType::AttributionInsight,
            Priority::Medium,
            "Multi-channel journeys convert better".to_string(),
            format!(
                "Multi-channel journeys convert at {:.1}% vs {:.1}% for single-channel. \
                 Assist channels are earning conversions that last-click reporting hides.",
                multi_rate * 100.0,
                single_rate * 100.0
            ),
            0.0,
            serde_json::json!({
                "multi_channel_rate": multi_rate,
                "single_channel_rate": single_rate,
            }),
        ));
    }
}

impl std::fmt::Debug for MlAttributionAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MlAttributionAnalyzer")
            .field("model", &self.model.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use searchnav_core::types::DeviceCategory;

    use crate::types::AttributionTouch;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap()
    }

    fn touch(source: &str, medium: &str, gclid: bool, day: u32) -> AttributionTouch {
        AttributionTouch {
            gclid: gclid.then(|| format!("gclid-{day}")),
            source: source.to_string(),
            medium: medium.to_string(),
            campaign: Some("brand".to_string()),
            device: DeviceCategory::Mobile,
            timestamp: Some(Utc.with_ymd_and_hms(2026, 3, day, 10, 0, 0).unwrap()),
            page_views: 2,
            session_duration_secs: 45.0,
        }
    }

    fn journey(id: &str, touches: Vec<AttributionTouch>, value: f64) -> CustomerJourney {
        let first = touches.iter().filter_map(|t| t.timestamp).min();
        let last = touches.iter().filter_map(|t| t.timestamp).max();
        let channels: std::collections::HashSet<_> = touches
            .iter()
            .map(|t| (t.source.clone(), t.medium.clone()))
            .collect();
        CustomerJourney {
            journey_id: id.to_string(),
            customer_id: id.to_string(),
            total_touches: touches.len(),
            first_touch_at: first,
            last_touch_at: last,
            converted: value > 0.0,
            conversion_value: value,
            conversion_at: last,
            multi_channel: channels.len() >= 2,
            multi_device: false,
            touches,
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LtvModel for FailingModel {
        async fn train(&self, _f: &Array2<f32>, _t: &[f32]) -> Result<(), MlError> {
            Err(MlError::TrainingFailed("service unavailable".into()))
        }
        async fn predict(&self, _f: &Array2<f32>) -> Result<Vec<f32>, MlError> {
            Err(MlError::PredictionFailed("service unavailable".into()))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    fn sample_journeys() -> Vec<CustomerJourney> {
        vec![
            journey(
                "c1",
                vec![touch("google", "cpc", true, 1), touch("news", "email", false, 3)],
                120.0,
            ),
            journey(
                "c2",
                vec![touch("google", "cpc", true, 2), touch("news", "email", false, 4)],
                80.0,
            ),
            journey("c3", vec![touch("google", "organic", false, 5)], 0.0),
        ]
    }

    #[test]
    fn test_feature_vector_shape_and_basics() {
        let journeys = sample_journeys();
        let f = extract_features(&journeys[0]);
        assert_eq!(f.len(), FEATURE_DIM);
        assert_eq!(f[0], 2.0); // touches
        assert_eq!(f[1], 1.0); // converted
        assert_eq!(f[7], 1.0); // multi-channel
        assert_eq!(f[9], 0.5); // gclid match rate
        assert_eq!(f[22], 1.0); // first touch paid
        assert_eq!(f[23], 0.0); // last touch not paid

        let matrix = feature_matrix(&journeys);
        assert_eq!(matrix.shape(), &[3, FEATURE_DIM]);
    }

    #[tokio::test]
    async fn test_heuristic_model_round_trip() {
        let model = HeuristicLtvModel::new();
        let journeys = sample_journeys();
        let features = feature_matrix(&journeys);
        let targets = vec![120.0, 80.0, 0.0];
        model.train(&features, &targets).await.unwrap();
        let predictions = model.predict(&features).await.unwrap();
        assert_eq!(predictions.len(), 3);
        // Multi-channel rows get the 1.5x scale over the learned mean.
        assert!(predictions[0] > predictions[2]);
    }

    #[tokio::test]
    async fn test_model_failure_never_propagates() {
        let analyzer =
            MlAttributionAnalyzer::new(Arc::new(FailingModel), AttributionConfig::default());
        let journeys = sample_journeys();
        let result = analyzer
            .generate_insights("123-456-7890", range(), &journeys)
            .await;
        assert_eq!(result.summary["model_used"], serde_json::json!(false));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("rule-of-thumb")));
        // Fallback multipliers: c1 multi-channel 120 * 2.5 = 300.
        let mean = result.summary["mean_predicted_ltv"].as_f64().unwrap();
        assert!((mean - (300.0 + 200.0 + 0.0) / 3.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_gclid_insight_fires_below_threshold() {
        let analyzer = MlAttributionAnalyzer::new(
            Arc::new(HeuristicLtvModel::new()),
            AttributionConfig::default(),
        );
        let journeys = vec![journey(
            "c1",
            vec![
                touch("google", "cpc", false, 1),
                touch("google", "cpc", false, 2),
                touch("google", "cpc", true, 3),
            ],
            50.0,
        )];
        let result = analyzer
            .generate_insights("123-456-7890", range(), &journeys)
            .await;
        assert!(result
            .recommendations
            .iter()
            .any(|r| r.title.contains("GCLID match rate")));
    }

    #[tokio::test]
    async fn test_sequence_insight_counts_repeated_paths() {
        let analyzer = MlAttributionAnalyzer::new(
            Arc::new(HeuristicLtvModel::new()),
            AttributionConfig::default(),
        );
        let result = analyzer
            .generate_insights("123-456-7890", range(), &sample_journeys())
            .await;
        let seq = result
            .recommendations
            .iter()
            .find(|r| r.title.contains("Common converting path"))
            .expect("sequence insight");
        assert_eq!(seq.action_data["conversions"], serde_json::json!(2));
        assert_eq!(
            seq.action_data["path"],
            serde_json::json!("google/cpc > news/email")
        );
    }

    #[tokio::test]
    async fn test_sequence_insight_reports_non_converting_baseline() {
        let analyzer = MlAttributionAnalyzer::new(
            Arc::new(HeuristicLtvModel::new()),
            AttributionConfig::default(),
        );
        let mut journeys = sample_journeys();
        // Same closing path as c1/c2, but never converts.
        journeys.push(journey(
            "c4",
            vec![touch("google", "cpc", true, 6), touch("news", "email", false, 8)],
            0.0,
        ));
        let result = analyzer
            .generate_insights("123-456-7890", range(), &journeys)
            .await;
        let seq = result
            .recommendations
            .iter()
            .find(|r| r.title.contains("Common converting path"))
            .expect("sequence insight");
        assert_eq!(seq.action_data["non_converting"], serde_json::json!(1));
        let rate = seq.action_data["close_rate"].as_f64().unwrap();
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
    }
}
