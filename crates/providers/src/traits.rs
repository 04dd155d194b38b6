//! Provider seams for the external data sources. Real deployments back
//! these with the Google Ads API, the GA4 Data API, and BigQuery; analyzers
//! only ever see the traits.

use async_trait::async_trait;

use searchnav_core::types::{
    AuctionInsightRow, DateRange, DeviceRow, KeywordRow, LandingPageRow, NegativeKeyword,
    PlacementRow, RawTouchpoint, SearchTermRow,
};
use searchnav_core::NavResult;

#[async_trait]
pub trait GoogleAdsProvider: Send + Sync {
    async fn fetch_search_terms(
        &self,
        customer_id: &str,
        range: &DateRange,
    ) -> NavResult<Vec<SearchTermRow>>;

    async fn fetch_keywords(
        &self,
        customer_id: &str,
        range: &DateRange,
    ) -> NavResult<Vec<KeywordRow>>;

    async fn fetch_negative_keywords(&self, customer_id: &str) -> NavResult<Vec<NegativeKeyword>>;

    async fn fetch_auction_insights(
        &self,
        customer_id: &str,
        range: &DateRange,
    ) -> NavResult<Vec<AuctionInsightRow>>;

    async fn fetch_device_metrics(
        &self,
        customer_id: &str,
        range: &DateRange,
    ) -> NavResult<Vec<DeviceRow>>;

    async fn fetch_placements(
        &self,
        customer_id: &str,
        range: &DateRange,
    ) -> NavResult<Vec<PlacementRow>>;
}

#[async_trait]
pub trait Ga4Provider: Send + Sync {
    async fn fetch_landing_pages(
        &self,
        customer_id: &str,
        range: &DateRange,
    ) -> NavResult<Vec<LandingPageRow>>;

    async fn fetch_touchpoints(
        &self,
        customer_id: &str,
        range: &DateRange,
    ) -> NavResult<Vec<RawTouchpoint>>;
}

/// Parameterized touchpoint query against the analytics warehouse.
#[derive(Debug, Clone)]
pub struct TouchpointQuery {
    pub customer_id: String,
    pub range: DateRange,
    pub dataset: String,
}

#[async_trait]
pub trait BigQueryProvider: Send + Sync {
    async fn query_touchpoints(&self, query: &TouchpointQuery) -> NavResult<Vec<RawTouchpoint>>;
}
