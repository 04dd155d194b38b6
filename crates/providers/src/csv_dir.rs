//! Provider backed by a directory of bulk-export CSV files.
//!
//! Expected file names mirror the Google Ads / GA4 export screens:
//! `search_terms.csv`, `keywords.csv`, `negative_keywords.csv`,
//! `auction_insights.csv`, `devices.csv`, `placements.csv`,
//! `landing_pages.csv`, `touchpoints.csv`. A missing file yields an empty
//! table with a logged warning so a partial export still produces a report.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use searchnav_core::config::CsvConfig;
use searchnav_core::types::{
    AuctionInsightRow, DateRange, DeviceRow, KeywordRow, LandingPageRow, NegativeKeyword,
    PlacementRow, RawTouchpoint, SearchTermRow,
};
use searchnav_core::NavResult;

use crate::csv_report::{
    auction_insight_rows, device_rows, keyword_rows, landing_page_rows, negative_keyword_rows,
    placement_rows, search_term_rows, touchpoint_rows, CsvReportParser, ParsedReport, ReportKind,
};
use crate::traits::{Ga4Provider, GoogleAdsProvider};

pub struct CsvDirProvider {
    dir: PathBuf,
    parser: CsvReportParser,
}

impl CsvDirProvider {
    pub fn new(dir: impl Into<PathBuf>, config: &CsvConfig) -> Self {
        Self {
            dir: dir.into(),
            parser: CsvReportParser::new(config),
        }
    }

    /// Parses one export file, degrading to `None` when the file is absent.
    /// Structural errors (missing columns, oversize) still propagate.
    fn load(&self, file: &str, kind: ReportKind) -> NavResult<Option<ParsedReport>> {
        let path: PathBuf = self.dir.join(file);
        if !Path::new(&path).exists() {
            warn!(file, "export file not found, treating as empty");
            return Ok(None);
        }
        self.parser.parse_file(&path, kind).map(Some)
    }
}

fn log_warnings(file: &str, warnings: &[String]) {
    for w in warnings {
        warn!(file, warning = %w, "row skipped during CSV extraction");
    }
}

#[async_trait]
impl GoogleAdsProvider for CsvDirProvider {
    async fn fetch_search_terms(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<SearchTermRow>> {
        match self.load("search_terms.csv", ReportKind::SearchTerms)? {
            Some(report) => {
                let (rows, warnings) = search_term_rows(&report);
                log_warnings("search_terms.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_keywords(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<KeywordRow>> {
        match self.load("keywords.csv", ReportKind::Keywords)? {
            Some(report) => {
                let (rows, warnings) = keyword_rows(&report);
                log_warnings("keywords.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_negative_keywords(&self, _customer_id: &str) -> NavResult<Vec<NegativeKeyword>> {
        match self.load("negative_keywords.csv", ReportKind::NegativeKeywords)? {
            Some(report) => {
                let (rows, warnings) = negative_keyword_rows(&report);
                log_warnings("negative_keywords.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_auction_insights(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<AuctionInsightRow>> {
        match self.load("auction_insights.csv", ReportKind::AuctionInsights)? {
            Some(report) => {
                let (rows, warnings) = auction_insight_rows(&report);
                log_warnings("auction_insights.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_device_metrics(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<DeviceRow>> {
        match self.load("devices.csv", ReportKind::Devices)? {
            Some(report) => {
                let (rows, warnings) = device_rows(&report);
                log_warnings("devices.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_placements(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<PlacementRow>> {
        match self.load("placements.csv", ReportKind::Placements)? {
            Some(report) => {
                let (rows, warnings) = placement_rows(&report);
                log_warnings("placements.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl Ga4Provider for CsvDirProvider {
    async fn fetch_landing_pages(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<LandingPageRow>> {
        match self.load("landing_pages.csv", ReportKind::LandingPages)? {
            Some(report) => {
                let (rows, warnings) = landing_page_rows(&report);
                log_warnings("landing_pages.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_touchpoints(
        &self,
        _customer_id: &str,
        _range: &DateRange,
    ) -> NavResult<Vec<RawTouchpoint>> {
        match self.load("touchpoints.csv", ReportKind::Touchpoints)? {
            Some(report) => {
                let (rows, warnings) = touchpoint_rows(&report);
                log_warnings("touchpoints.csv", &warnings);
                Ok(rows)
            }
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvDirProvider::new(dir.path(), &CsvConfig::default());
        let rows = provider.fetch_search_terms("123-456-7890", &range()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_reads_export_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("devices.csv"),
            "Device,Clicks,Impr.,Cost,Conversions\nMobile phones,120,4000,300.0,2\n",
        )
        .unwrap();
        let provider = CsvDirProvider::new(dir.path(), &CsvConfig::default());
        let rows = provider.fetch_device_metrics("123-456-7890", &range()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].clicks, 120);
    }
}
