//! In-memory provider used by tests and offline demos.

use async_trait::async_trait;

use searchnav_core::types::{
    AuctionInsightRow, DateRange, DeviceRow, KeywordRow, LandingPageRow, NegativeKeyword,
    PlacementRow, RawTouchpoint, SearchTermRow,
};
use searchnav_core::NavResult;

use crate::traits::{BigQueryProvider, Ga4Provider, GoogleAdsProvider, TouchpointQuery};

/// Holds pre-loaded rows and serves them for any customer/range.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    pub search_terms: Vec<SearchTermRow>,
    pub keywords: Vec<KeywordRow>,
    pub negative_keywords: Vec<NegativeKeyword>,
    pub auction_insights: Vec<AuctionInsightRow>,
    pub devices: Vec<DeviceRow>,
    pub placements: Vec<PlacementRow>,
    pub landing_pages: Vec<LandingPageRow>,
    pub touchpoints: Vec<RawTouchpoint>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GoogleAdsProvider for StaticProvider {
    async fn fetch_search_terms(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<SearchTermRow>> {
        Ok(self.search_terms.clone())
    }

    async fn fetch_keywords(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<KeywordRow>> {
        Ok(self.keywords.clone())
    }

    async fn fetch_negative_keywords(&self, _customer_id: &str) -> NavResult<Vec<NegativeKeyword>> {
        Ok(self.negative_keywords.clone())
    }

    async fn fetch_auction_insights(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<AuctionInsightRow>> {
        Ok(self.auction_insights.clone())
    }

    async fn fetch_device_metrics(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<DeviceRow>> {
        Ok(self.devices.clone())
    }

    async fn fetch_placements(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<PlacementRow>> {
        Ok(self.placements.clone())
    }
}

#[async_trait]
impl Ga4Provider for StaticProvider {
    async fn fetch_landing_pages(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<LandingPageRow>> {
        Ok(self.landing_pages.clone())
    }

    async fn fetch_touchpoints(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<RawTouchpoint>> {
        Ok(self.touchpoints.clone())
    }
}

#[async_trait]
impl BigQueryProvider for StaticProvider {
    async fn query_touchpoints(&self, _query: &TouchpointQuery) -> NavResult<Vec<RawTouchpoint>> {
        Ok(self.touchpoints.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use searchnav_attribution::JourneyBuilder;
    use searchnav_core::config::AttributionConfig;
    use searchnav_core::types::DeviceCategory;

    fn touchpoint(day: u32, medium: &str, conversion_value: Option<f64>) -> RawTouchpoint {
        RawTouchpoint {
            customer_id: "cust-1".to_string(),
            gclid: Some("gclid-1".to_string()),
            session_id: None,
            source: "google".to_string(),
            medium: medium.to_string(),
            campaign: Some("brand".to_string()),
            device: DeviceCategory::Mobile,
            timestamp: Some(Utc.with_ymd_and_hms(2026, 4, day, 9, 0, 0).unwrap()),
            page_views: 2,
            session_duration_secs: 40.0,
            conversion_value,
        }
    }

    #[tokio::test]
    async fn test_warehouse_touchpoints_feed_journey_building() {
        let provider = StaticProvider {
            touchpoints: vec![
                touchpoint(1, "cpc", None),
                touchpoint(4, "organic", Some(75.0)),
            ],
            ..StaticProvider::new()
        };
        let query = TouchpointQuery {
            customer_id: "123-456-7890".to_string(),
            range: DateRange::new(
                NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 4, 30).unwrap(),
            )
            .unwrap(),
            dataset: "analytics_prod".to_string(),
        };

        let rows = provider.query_touchpoints(&query).await.unwrap();
        assert_eq!(rows.len(), 2);

        let journeys = JourneyBuilder::new(&AttributionConfig::default()).build(&rows);
        assert_eq!(journeys.len(), 1);
        assert!(journeys[0].converted);
        assert_eq!(journeys[0].conversion_value, 75.0);
        assert!(journeys[0].multi_channel);
    }
}
