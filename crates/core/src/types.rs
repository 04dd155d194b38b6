use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{NavError, NavResult};

/// Inclusive analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting inverted bounds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> NavResult<Self> {
        if end < start {
            return Err(NavError::Validation(format!(
                "date range is inverted: {start} > {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Validates a Google Ads customer id: `123-456-7890` or 10 bare digits.
pub fn validate_customer_id(customer_id: &str) -> NavResult<()> {
    fn digits(s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
    }
    let ok = match customer_id.split('-').collect::<Vec<_>>().as_slice() {
        [d] => d.len() == 10 && digits(d),
        [a, b, c] => a.len() == 3 && b.len() == 3 && c.len() == 4 && digits(a) && digits(b) && digits(c),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(NavError::Validation(format!(
            "invalid customer id: {customer_id}"
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    AddNegativeKeyword,
    RemoveNegativeKeyword,
    BidAdjustment,
    BudgetAdjustment,
    ExcludePlacement,
    LandingPageFix,
    AttributionInsight,
}

/// Common output record shared by every analyzer. `action_data` carries the
/// machine-readable payload downstream exporters turn into bulk-upload rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub rec_type: RecommendationType,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub estimated_monthly_savings: f64,
    pub action_data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    pub fn new(
        rec_type: RecommendationType,
        priority: Priority,
        title: impl Into<String>,
        description: impl Into<String>,
        estimated_monthly_savings: f64,
        action_data: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            rec_type,
            priority,
            title: title.into(),
            description: description.into(),
            estimated_monthly_savings,
            action_data,
            created_at: Utc::now(),
        }
    }
}

/// One analyzer's output for one customer and window. `warnings` carries
/// partial-failure notes (skipped rows, fallbacks) without failing the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analyzer: String,
    pub customer_id: String,
    pub date_range: DateRange,
    pub recommendations: Vec<Recommendation>,
    pub summary: serde_json::Value,
    #[serde(default)]
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(analyzer: impl Into<String>, customer_id: impl Into<String>, range: DateRange) -> Self {
        Self {
            analyzer: analyzer.into(),
            customer_id: customer_id.into(),
            date_range: range,
            recommendations: Vec::new(),
            summary: serde_json::json!({}),
            warnings: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    pub fn total_estimated_savings(&self) -> f64 {
        self.recommendations
            .iter()
            .map(|r| r.estimated_monthly_savings)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Phrase,
    Broad,
}

impl MatchType {
    /// Parses editor notation (`[term]`, `"term"`) or a literal label.
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        let lower = t.to_ascii_lowercase();
        if lower == "exact" || (t.starts_with('[') && t.ends_with(']')) {
            Self::Exact
        } else if lower == "phrase" || (t.starts_with('"') && t.ends_with('"')) {
            Self::Phrase
        } else {
            Self::Broad
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeLevel {
    Campaign,
    AdGroup,
    SharedSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegativeKeyword {
    pub text: String,
    pub match_type: MatchType,
    pub level: NegativeLevel,
    pub campaign_id: String,
}

/// A search term row from the search terms report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTermRow {
    pub campaign_id: String,
    pub ad_group_id: String,
    pub search_term: String,
    pub matched_keyword: String,
    pub match_type: MatchType,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: f64,
    pub conversions: f64,
    pub conversion_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordRow {
    pub campaign_id: String,
    pub ad_group_id: String,
    pub keyword_text: String,
    pub match_type: MatchType,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: f64,
    pub conversions: f64,
    pub conversion_value: f64,
}

/// One competitor domain row from the auction insights report.
/// Share/rate fields are fractions in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionInsightRow {
    pub domain: String,
    pub impression_share: f64,
    pub overlap_rate: f64,
    pub outranking_share: f64,
    pub position_above_rate: f64,
    pub top_of_page_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCategory {
    Desktop,
    Mobile,
    Tablet,
    ConnectedTv,
    Other,
}

impl DeviceCategory {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" | "computers" | "computer" => Self::Desktop,
            "mobile" | "mobile phones" | "smartphone" => Self::Mobile,
            "tablet" | "tablets" => Self::Tablet,
            "tv" | "tv screens" | "connected tv" => Self::ConnectedTv,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRow {
    pub campaign_id: String,
    pub device: DeviceCategory,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: f64,
    pub conversions: f64,
    pub conversion_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementKind {
    Website,
    MobileApp,
    YoutubeVideo,
    YoutubeChannel,
}

/// A Display/Video placement row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRow {
    pub campaign_id: String,
    pub placement: String,
    pub kind: PlacementKind,
    pub clicks: u64,
    pub impressions: u64,
    pub cost: f64,
    pub conversions: f64,
}

/// GA4-derived landing page metrics. `bounce_rate` is a fraction in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingPageRow {
    pub url: String,
    pub sessions: u64,
    pub bounce_rate: f64,
    pub avg_load_ms: f64,
    pub clicks: u64,
    pub cost: f64,
    pub conversions: f64,
}

/// One raw marketing touchpoint event as delivered by GA4/BigQuery exports,
/// before journey grouping. A conversion event carries a `conversion_value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTouchpoint {
    pub customer_id: String,
    pub gclid: Option<String>,
    pub session_id: Option<String>,
    pub source: String,
    pub medium: String,
    pub campaign: Option<String>,
    pub device: DeviceCategory,
    pub timestamp: Option<DateTime<Utc>>,
    pub page_views: u32,
    pub session_duration_secs: f64,
    pub conversion_value: Option<f64>,
}

/// Derived ad-performance ratios with zero-division guards.
pub trait AdMetrics {
    fn clicks(&self) -> u64;
    fn impressions(&self) -> u64;
    fn cost(&self) -> f64;
    fn conversions(&self) -> f64;
    fn conversion_value(&self) -> f64;

    fn ctr(&self) -> f64 {
        if self.impressions() == 0 {
            0.0
        } else {
            self.clicks() as f64 / self.impressions() as f64
        }
    }

    fn cpa(&self) -> Option<f64> {
        if self.conversions() > 0.0 {
            Some(self.cost() / self.conversions())
        } else {
            None
        }
    }

    fn roas(&self) -> Option<f64> {
        if self.cost() > 0.0 {
            Some(self.conversion_value() / self.cost())
        } else {
            None
        }
    }

    fn conversion_rate(&self) -> f64 {
        if self.clicks() == 0 {
            0.0
        } else {
            self.conversions() / self.clicks() as f64
        }
    }
}

macro_rules! impl_ad_metrics {
    ($ty:ty) => {
        impl AdMetrics for $ty {
            fn clicks(&self) -> u64 {
                self.clicks
            }
            fn impressions(&self) -> u64 {
                self.impressions
            }
            fn cost(&self) -> f64 {
                self.cost
            }
            fn conversions(&self) -> f64 {
                self.conversions
            }
            fn conversion_value(&self) -> f64 {
                self.conversion_value
            }
        }
    };
}

impl_ad_metrics!(SearchTermRow);
impl_ad_metrics!(KeywordRow);
impl_ad_metrics!(DeviceRow);

impl AdMetrics for PlacementRow {
    fn clicks(&self) -> u64 {
        self.clicks
    }
    fn impressions(&self) -> u64 {
        self.impressions
    }
    fn cost(&self) -> f64 {
        self.cost
    }
    fn conversions(&self) -> f64 {
        self.conversions
    }
    fn conversion_value(&self) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_rejects_inverted() {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert!(matches!(
            DateRange::new(start, end),
            Err(NavError::Validation(_))
        ));
        assert!(DateRange::new(end, start).is_ok());
        assert!(DateRange::new(start, start).is_ok());
    }

    #[test]
    fn test_customer_id_validation() {
        assert!(validate_customer_id("123-456-7890").is_ok());
        assert!(validate_customer_id("1234567890").is_ok());
        assert!(validate_customer_id("123456789").is_err());
        assert!(validate_customer_id("123-456-78901").is_err());
        assert!(validate_customer_id("abc-def-ghij").is_err());
        assert!(validate_customer_id("123 456 7890").is_err());
        // Ten digits with stray dashes is not a valid id shape.
        assert!(validate_customer_id("1-2-3-4-5-6-7-8-9-0").is_err());
        assert!(validate_customer_id("12-3456-7890").is_err());
        assert!(validate_customer_id("123-456-7890-").is_err());
    }

    #[test]
    fn test_metrics_zero_division_guards() {
        let row = SearchTermRow {
            campaign_id: "c1".into(),
            ad_group_id: "a1".into(),
            search_term: "free shoes".into(),
            matched_keyword: "shoes".into(),
            match_type: MatchType::Broad,
            clicks: 0,
            impressions: 0,
            cost: 0.0,
            conversions: 0.0,
            conversion_value: 0.0,
        };
        assert_eq!(row.ctr(), 0.0);
        assert_eq!(row.cpa(), None);
        assert_eq!(row.roas(), None);
        assert_eq!(row.conversion_rate(), 0.0);
    }

    #[test]
    fn test_device_category_parse() {
        assert_eq!(DeviceCategory::parse("Mobile phones"), DeviceCategory::Mobile);
        assert_eq!(DeviceCategory::parse("COMPUTERS"), DeviceCategory::Desktop);
        assert_eq!(DeviceCategory::parse("smart fridge"), DeviceCategory::Other);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
