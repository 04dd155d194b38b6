use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use searchnav_core::types::DeviceCategory;

/// One touchpoint inside a journey. Owned exclusively by its parent
/// journey; never shared across journeys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionTouch {
    pub gclid: Option<String>,
    pub source: String,
    pub medium: String,
    pub campaign: Option<String>,
    pub device: DeviceCategory,
    pub timestamp: Option<DateTime<Utc>>,
    pub page_views: u32,
    pub session_duration_secs: f64,
}

impl AttributionTouch {
    /// `source/medium` channel key used for rollups and sequence insights.
    pub fn channel(&self) -> String {
        format!("{}/{}", self.source, self.medium)
    }

    pub fn is_paid_search(&self) -> bool {
        self.medium.eq_ignore_ascii_case("cpc") || self.medium.eq_ignore_ascii_case("ppc")
    }
}

/// The ordered touchpoint sequence for one customer within the analysis
/// window. Built fresh per analysis call and immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerJourney {
    pub journey_id: String,
    pub customer_id: String,
    pub touches: Vec<AttributionTouch>,
    pub first_touch_at: Option<DateTime<Utc>>,
    pub last_touch_at: Option<DateTime<Utc>>,
    pub total_touches: usize,
    pub converted: bool,
    pub conversion_value: f64,
    pub conversion_at: Option<DateTime<Utc>>,
    pub multi_channel: bool,
    pub multi_device: bool,
}

/// Stateless weighting rule selection. Parameters ride along with the
/// variant so a model value is self-describing in serialized output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionModel {
    FirstTouch,
    LastTouch,
    Linear,
    TimeDecay { half_life_hours: f64 },
    PositionBased { first_weight: f64, last_weight: f64 },
}

impl AttributionModel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstTouch => "first_touch",
            Self::LastTouch => "last_touch",
            Self::Linear => "linear",
            Self::TimeDecay { .. } => "time_decay",
            Self::PositionBased { .. } => "position_based",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchCredit {
    pub index: usize,
    pub source: String,
    pub medium: String,
    pub weight: f64,
    pub attributed_revenue: f64,
}

/// Per-journey attribution output. Derived, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionResult {
    pub journey_id: String,
    pub model: AttributionModel,
    pub credits: Vec<TouchCredit>,
    pub channel_revenue: HashMap<String, f64>,
    pub computed_at: DateTime<Utc>,
}
