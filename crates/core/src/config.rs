use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `PAID_SEARCH_NAV__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub attribution: AttributionConfig,
    #[serde(default)]
    pub csv: CsvConfig,
    #[serde(default)]
    pub providers: ProviderConfig,
    #[serde(default)]
    pub bulk_negative: BulkNegativeConfig,
    #[serde(default)]
    pub competitor: CompetitorConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub landing_page: LandingPageConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_lookback_window_days")]
    pub lookback_window_days: u32,
    #[serde(default = "default_half_life_hours")]
    pub time_decay_half_life_hours: f64,
    #[serde(default = "default_position_first_weight")]
    pub position_first_weight: f64,
    #[serde(default = "default_position_last_weight")]
    pub position_last_weight: f64,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_include_non_converting")]
    pub include_non_converting: bool,
    #[serde(default = "default_ml_timeout_secs")]
    pub ml_timeout_secs: u64,
    #[serde(default = "default_min_gclid_match_rate")]
    pub min_gclid_match_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvConfig {
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

/// Thresholds for the bulk negative keyword manager.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkNegativeConfig {
    #[serde(default = "default_bn_min_clicks")]
    pub min_clicks: u64,
    #[serde(default = "default_bn_min_cost")]
    pub min_cost: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorConfig {
    #[serde(default = "default_comp_min_overlap_rate")]
    pub min_overlap_rate: f64,
    #[serde(default = "default_comp_outranked_threshold")]
    pub outranked_threshold: f64,
    #[serde(default = "default_comp_low_impression_share")]
    pub low_impression_share: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_dev_min_clicks")]
    pub min_clicks: u64,
    #[serde(default = "default_dev_cpa_ratio_threshold")]
    pub cpa_ratio_threshold: f64,
    #[serde(default = "default_dev_max_bid_adjustment")]
    pub max_bid_adjustment_pct: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LandingPageConfig {
    #[serde(default = "default_lp_min_sessions")]
    pub min_sessions: u64,
    #[serde(default = "default_lp_max_bounce_rate")]
    pub max_bounce_rate: f64,
    #[serde(default = "default_lp_max_load_ms")]
    pub max_load_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacementConfig {
    #[serde(default = "default_pl_min_cost")]
    pub min_cost: f64,
    #[serde(default = "default_pl_spam_ctr")]
    pub spam_ctr: f64,
    #[serde(default = "default_pl_dead_ctr")]
    pub dead_ctr: f64,
    #[serde(default = "default_pl_exclude_mobile_apps")]
    pub exclude_mobile_apps: bool,
}

// Default functions
fn default_lookback_window_days() -> u32 {
    30
}
fn default_half_life_hours() -> f64 {
    168.0 // one week
}
fn default_position_first_weight() -> f64 {
    0.4
}
fn default_position_last_weight() -> f64 {
    0.4
}
fn default_batch_size() -> usize {
    50
}
fn default_include_non_converting() -> bool {
    true
}
fn default_ml_timeout_secs() -> u64 {
    30
}
fn default_min_gclid_match_rate() -> f64 {
    0.85
}
fn default_max_file_size_mb() -> u64 {
    50
}
fn default_call_timeout_secs() -> u64 {
    30
}
fn default_bn_min_clicks() -> u64 {
    25
}
fn default_bn_min_cost() -> f64 {
    10.0
}
fn default_comp_min_overlap_rate() -> f64 {
    0.1
}
fn default_comp_outranked_threshold() -> f64 {
    0.5
}
fn default_comp_low_impression_share() -> f64 {
    0.3
}
fn default_dev_min_clicks() -> u64 {
    100
}
fn default_dev_cpa_ratio_threshold() -> f64 {
    1.3
}
fn default_dev_max_bid_adjustment() -> f64 {
    30.0
}
fn default_lp_min_sessions() -> u64 {
    50
}
fn default_lp_max_bounce_rate() -> f64 {
    0.85
}
fn default_lp_max_load_ms() -> f64 {
    3000.0
}
fn default_pl_min_cost() -> f64 {
    5.0
}
fn default_pl_spam_ctr() -> f64 {
    0.10
}
fn default_pl_dead_ctr() -> f64 {
    0.0005
}
fn default_pl_exclude_mobile_apps() -> bool {
    true
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            lookback_window_days: default_lookback_window_days(),
            time_decay_half_life_hours: default_half_life_hours(),
            position_first_weight: default_position_first_weight(),
            position_last_weight: default_position_last_weight(),
            batch_size: default_batch_size(),
            include_non_converting: default_include_non_converting(),
            ml_timeout_secs: default_ml_timeout_secs(),
            min_gclid_match_rate: default_min_gclid_match_rate(),
        }
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

impl Default for BulkNegativeConfig {
    fn default() -> Self {
        Self {
            min_clicks: default_bn_min_clicks(),
            min_cost: default_bn_min_cost(),
        }
    }
}

impl Default for CompetitorConfig {
    fn default() -> Self {
        Self {
            min_overlap_rate: default_comp_min_overlap_rate(),
            outranked_threshold: default_comp_outranked_threshold(),
            low_impression_share: default_comp_low_impression_share(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            min_clicks: default_dev_min_clicks(),
            cpa_ratio_threshold: default_dev_cpa_ratio_threshold(),
            max_bid_adjustment_pct: default_dev_max_bid_adjustment(),
        }
    }
}

impl Default for LandingPageConfig {
    fn default() -> Self {
        Self {
            min_sessions: default_lp_min_sessions(),
            max_bounce_rate: default_lp_max_bounce_rate(),
            max_load_ms: default_lp_max_load_ms(),
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            min_cost: default_pl_min_cost(),
            spam_ctr: default_pl_spam_ctr(),
            dead_ctr: default_pl_dead_ctr(),
            exclude_mobile_apps: default_pl_exclude_mobile_apps(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            attribution: AttributionConfig::default(),
            csv: CsvConfig::default(),
            providers: ProviderConfig::default(),
            bulk_negative: BulkNegativeConfig::default(),
            competitor: CompetitorConfig::default(),
            device: DeviceConfig::default(),
            landing_page: LandingPageConfig::default(),
            placement: PlacementConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("PAID_SEARCH_NAV")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.attribution.lookback_window_days, 30);
        assert_eq!(cfg.attribution.batch_size, 50);
        assert_eq!(cfg.csv.max_file_size_mb, 50);
        assert!(cfg.placement.exclude_mobile_apps);
    }
}
