//! Attribution weighting — splits conversion credit across a journey's
//! touchpoints according to the selected model.

use std::collections::HashMap;

use chrono::Utc;
use futures::future::join_all;
use tracing::warn;

use searchnav_core::config::AttributionConfig;
use searchnav_core::{NavError, NavResult};

use crate::types::{AttributionModel, AttributionResult, CustomerJourney, TouchCredit};

pub struct AttributionEngine {
    batch_size: usize,
}

impl AttributionEngine {
    pub fn new(config: &AttributionConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
        }
    }

    /// Computes the credit weight for every touch in the journey.
    ///
    /// Invariant: the returned weights sum to 1.0. A single-touch journey
    /// gets weight 1.0 regardless of model.
    pub fn compute_weights(
        journey: &CustomerJourney,
        model: &AttributionModel,
    ) -> NavResult<Vec<f64>> {
        let n = journey.touches.len();
        if n == 0 {
            return Err(NavError::Attribution(format!(
                "journey {} has no touches",
                journey.journey_id
            )));
        }
        if n == 1 {
            return Ok(vec![1.0]);
        }

        let raw = match model {
            AttributionModel::FirstTouch => {
                let mut w = vec![0.0; n];
                w[0] = 1.0;
                w
            }
            AttributionModel::LastTouch => {
                let mut w = vec![0.0; n];
                w[n - 1] = 1.0;
                w
            }
            AttributionModel::Linear => vec![1.0 / n as f64; n],
            AttributionModel::TimeDecay { half_life_hours } => {
                if *half_life_hours <= 0.0 {
                    return Err(NavError::Attribution(format!(
                        "time-decay half-life must be positive, got {half_life_hours}"
                    )));
                }
                Self::time_decay_weights(journey, *half_life_hours)
            }
            AttributionModel::PositionBased {
                first_weight,
                last_weight,
            } => Self::position_weights(n, *first_weight, *last_weight)?,
        };

        normalize(raw, &journey.journey_id)
    }

    /// Weight ∝ 2^(−Δt / half_life), Δt measured back from the conversion
    /// time (last touch for non-converting journeys). Touches without a
    /// timestamp decay as if they occurred at journey start.
    fn time_decay_weights(journey: &CustomerJourney, half_life_hours: f64) -> Vec<f64> {
        let anchor = journey.conversion_at.or(journey.last_touch_at);
        let Some(anchor) = anchor else {
            // No timestamps anywhere: nothing to decay against.
            let n = journey.touches.len();
            return vec![1.0 / n as f64; n];
        };
        let start = journey.first_touch_at.unwrap_or(anchor);

        journey
            .touches
            .iter()
            .map(|t| {
                let at = t.timestamp.unwrap_or(start);
                let delta_hours =
                    (anchor - at).num_seconds().max(0) as f64 / 3600.0;
                2f64.powf(-delta_hours / half_life_hours)
            })
            .collect()
    }

    fn position_weights(n: usize, first: f64, last: f64) -> NavResult<Vec<f64>> {
        if first < 0.0 || last < 0.0 {
            return Err(NavError::Attribution(format!(
                "position weights must be non-negative, got ({first}, {last})"
            )));
        }
        if n > 2 && first + last > 1.0 {
            return Err(NavError::Attribution(format!(
                "position weights ({first}, {last}) leave no credit for {} middle touches",
                n - 2
            )));
        }
        let mut w = vec![0.0; n];
        w[0] = first;
        w[n - 1] = last;
        if n > 2 {
            let middle = (1.0 - first - last) / (n - 2) as f64;
            for slot in w.iter_mut().take(n - 1).skip(1) {
                *slot = middle;
            }
        }
        Ok(w)
    }

    /// Applies the model to one journey, producing per-touch attributed
    /// revenue and a `source/medium` channel rollup.
    pub fn attribute(
        journey: &CustomerJourney,
        model: &AttributionModel,
    ) -> NavResult<AttributionResult> {
        let weights = Self::compute_weights(journey, model)?;

        let mut channel_revenue: HashMap<String, f64> = HashMap::new();
        let credits: Vec<TouchCredit> = journey
            .touches
            .iter()
            .zip(weights.iter())
            .enumerate()
            .map(|(index, (touch, &weight))| {
                let attributed = weight * journey.conversion_value;
                *channel_revenue.entry(touch.channel()).or_insert(0.0) += attributed;
                TouchCredit {
                    index,
                    source: touch.source.clone(),
                    medium: touch.medium.clone(),
                    weight,
                    attributed_revenue: attributed,
                }
            })
            .collect();

        Ok(AttributionResult {
            journey_id: journey.journey_id.clone(),
            model: model.clone(),
            credits,
            channel_revenue,
            computed_at: Utc::now(),
        })
    }

    /// Attributes every journey in fixed-size batches. Per-journey failures
    /// are logged and collected as warnings, never propagated — the report
    /// is best-effort.
    pub async fn attribute_all(
        &self,
        journeys: &[CustomerJourney],
        model: &AttributionModel,
    ) -> (Vec<AttributionResult>, Vec<String>) {
        let mut results = Vec::with_capacity(journeys.len());
        let mut warnings = Vec::new();

        for chunk in journeys.chunks(self.batch_size) {
            let batch = join_all(
                chunk
                    .iter()
                    .map(|journey| async move { Self::attribute(journey, model) }),
            )
            .await;

            for (journey, outcome) in chunk.iter().zip(batch) {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(e) => {
                        warn!(journey_id = %journey.journey_id, error = %e, "attribution failed, skipping journey");
                        warnings.push(format!("journey {}: {e}", journey.journey_id));
                    }
                }
            }
        }

        (results, warnings)
    }

    /// Account-level channel rollup across a set of per-journey results.
    pub fn rollup_channels(results: &[AttributionResult]) -> HashMap<String, f64> {
        let mut rollup: HashMap<String, f64> = HashMap::new();
        for result in results {
            for (channel, revenue) in &result.channel_revenue {
                *rollup.entry(channel.clone()).or_insert(0.0) += revenue;
            }
        }
        rollup
    }
}

fn normalize(weights: Vec<f64>, journey_id: &str) -> NavResult<Vec<f64>> {
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return Err(NavError::Attribution(format!(
            "degenerate weight vector for journey {journey_id}"
        )));
    }
    Ok(weights.into_iter().map(|w| w / sum).collect())
}
