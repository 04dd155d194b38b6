//! Tolerant parsing of Google Ads bulk-report CSV exports.
//!
//! Exports in the wild carry UTF-8 BOMs, localized headers, currency
//! symbols, ragged rows, and the occasional unescaped quote. Parsing runs
//! through four increasingly lenient strategies before giving up; required
//! columns are validated up front and an oversize file is rejected before
//! any read.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use searchnav_core::config::CsvConfig;
use searchnav_core::types::{
    AuctionInsightRow, DeviceCategory, DeviceRow, KeywordRow, LandingPageRow, MatchType,
    NegativeKeyword, NegativeLevel, PlacementKind, PlacementRow, RawTouchpoint, SearchTermRow,
};
use searchnav_core::{NavError, NavResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    SearchTerms,
    Keywords,
    NegativeKeywords,
    AuctionInsights,
    Devices,
    Placements,
    LandingPages,
    Touchpoints,
}

impl ReportKind {
    /// Canonical column names that must be present after header
    /// normalization.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Self::SearchTerms => &["search_term", "clicks", "impressions", "cost", "conversions"],
            Self::Keywords => &["keyword", "clicks", "impressions", "cost", "conversions"],
            Self::NegativeKeywords => &["keyword", "match_type"],
            Self::AuctionInsights => &["domain", "impression_share"],
            Self::Devices => &["device", "clicks", "impressions", "cost", "conversions"],
            Self::Placements => &["placement", "clicks", "impressions", "cost"],
            Self::LandingPages => &["landing_page", "sessions", "bounce_rate"],
            Self::Touchpoints => &["customer_id", "source", "medium"],
        }
    }
}

/// Which strategy ultimately produced the rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    Strict,
    Flexible,
    SkipBadRecords,
    LineByLine,
}

#[derive(Debug, Clone)]
pub struct ParsedReport {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
    pub strategy: ParseStrategy,
    pub skipped_lines: usize,
}

impl ParsedReport {
    fn get<'a>(&self, row: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
        row.get(key).map(|s| s.as_str()).filter(|s| !s.is_empty())
    }
}

pub struct CsvReportParser {
    max_file_size_mb: u64,
}

impl CsvReportParser {
    pub fn new(config: &CsvConfig) -> Self {
        Self {
            max_file_size_mb: config.max_file_size_mb,
        }
    }

    /// Parses a report file. The size gate runs on file metadata before any
    /// byte of the file is read.
    pub fn parse_file(&self, path: &Path, kind: ReportKind) -> NavResult<ParsedReport> {
        let meta = std::fs::metadata(path)?;
        let max_bytes = self.max_file_size_mb * 1024 * 1024;
        if meta.len() > max_bytes {
            return Err(NavError::Validation(format!(
                "file {} is {} bytes, exceeds max_file_size_mb={}",
                path.display(),
                meta.len(),
                self.max_file_size_mb
            )));
        }
        let data = std::fs::read_to_string(path)?;
        self.parse_str(&data, kind)
    }

    /// Parses report text through the four-strategy cascade.
    pub fn parse_str(&self, data: &str, kind: ReportKind) -> NavResult<ParsedReport> {
        let data = data.strip_prefix('\u{feff}').unwrap_or(data);
        let headers = read_headers(data)?;
        check_required_columns(&headers, kind)?;

        for strategy in [
            ParseStrategy::Strict,
            ParseStrategy::Flexible,
            ParseStrategy::SkipBadRecords,
        ] {
            match parse_with_reader(data, &headers, strategy) {
                Ok((rows, skipped)) => {
                    if skipped > 0 {
                        warn!(skipped, ?strategy, "skipped malformed CSV records");
                    }
                    return Ok(ParsedReport {
                        headers,
                        rows,
                        strategy,
                        skipped_lines: skipped,
                    });
                }
                Err(e) => {
                    warn!(?strategy, error = %e, "CSV strategy failed, trying next");
                }
            }
        }

        // Last resort: naive line splitting. Does not honor quoting, but
        // recovers rows from exports no conformant reader will accept.
        let (rows, skipped) = parse_line_by_line(data, &headers);
        if rows.is_empty() && skipped > 0 {
            return Err(NavError::CsvParse(format!(
                "no parseable rows after all strategies ({skipped} lines skipped)"
            )));
        }
        Ok(ParsedReport {
            headers,
            rows,
            strategy: ParseStrategy::LineByLine,
            skipped_lines: skipped,
        })
    }
}

fn read_headers(data: &str) -> NavResult<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| NavError::CsvParse(format!("unreadable header row: {e}")))?;
    if headers.is_empty() {
        return Err(NavError::CsvParse("empty header row".into()));
    }
    Ok(headers.iter().map(canonical_header).collect())
}

fn check_required_columns(headers: &[String], kind: ReportKind) -> NavResult<()> {
    let missing: Vec<&str> = kind
        .required_columns()
        .iter()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .copied()
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(NavError::CsvParse(format!(
            "missing required columns: {}",
            missing.join(", ")
        )))
    }
}

/// Normalizes an export header to its canonical snake_case name.
fn canonical_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('\u{feff}').to_lowercase();
    match trimmed.as_str() {
        "impr." | "impr" => "impressions".into(),
        "conv." | "all conv." => "conversions".into(),
        "conv. value" | "all conv. value" | "conversion value" => "conversion_value".into(),
        "search term" => "search_term".into(),
        "match type" => "match_type".into(),
        "keyword" | "keyword text" | "negative keyword" => "keyword".into(),
        "campaign" | "campaign id" => "campaign_id".into(),
        "ad group" | "ad group id" => "ad_group_id".into(),
        "display url domain" | "url domain" => "domain".into(),
        "search impr. share" | "impr. share" | "impression share" => "impression_share".into(),
        "overlap rate" => "overlap_rate".into(),
        "outranking share" => "outranking_share".into(),
        "position above rate" => "position_above_rate".into(),
        "top of page rate" => "top_of_page_rate".into(),
        "landing page" | "page" => "landing_page".into(),
        "bounce rate" => "bounce_rate".into(),
        "avg. page load time (ms)" | "avg load ms" => "avg_load_ms".into(),
        "placement url" => "placement".into(),
        "placement type" => "placement_type".into(),
        "session duration" | "avg. session duration" => "session_duration_secs".into(),
        "page views" | "pageviews" => "page_views".into(),
        other => other.replace([' ', '.'], "_").replace("__", "_"),
    }
}

fn parse_with_reader(
    data: &str,
    headers: &[String],
    strategy: ParseStrategy,
) -> NavResult<(Vec<HashMap<String, String>>, usize)> {
    let flexible = strategy != ParseStrategy::Strict;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(flexible)
        .from_reader(data.as_bytes());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                if strategy == ParseStrategy::SkipBadRecords {
                    skipped += 1;
                    continue;
                }
                return Err(NavError::CsvParse(e.to_string()));
            }
        };
        if strategy == ParseStrategy::Strict && record.len() != headers.len() {
            return Err(NavError::CsvParse(format!(
                "record has {} fields, expected {}",
                record.len(),
                headers.len()
            )));
        }
        rows.push(record_to_row(headers, record.iter()));
    }
    Ok((rows, skipped))
}

fn parse_line_by_line(data: &str, headers: &[String]) -> (Vec<HashMap<String, String>>, usize) {
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for line in data.lines().skip(1) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.iter().all(|f| f.trim().is_empty()) {
            skipped += 1;
            continue;
        }
        rows.push(record_to_row(headers, fields.into_iter()));
    }
    (rows, skipped)
}

fn record_to_row<'a>(
    headers: &[String],
    fields: impl Iterator<Item = &'a str>,
) -> HashMap<String, String> {
    headers
        .iter()
        .zip(fields.chain(std::iter::repeat("")))
        .map(|(h, f)| (h.clone(), f.trim().trim_matches('"').to_string()))
        .collect()
}

// ─── Value parsing ──────────────────────────────────────────────────────────

/// Parses an integer metric, tolerating thousands separators and the
/// ` --` placeholder Google Ads writes for empty cells. A fractional cell
/// is not a count and is rejected rather than having its digits joined.
pub fn parse_count(s: &str) -> Option<u64> {
    let t = s.trim();
    if t == "--" || t.is_empty() {
        return Some(0);
    }
    if t.contains('.') {
        return None;
    }
    let cleaned: String = t.chars().filter(|c| c.is_ascii_digit()).collect();
    cleaned.parse().ok()
}

/// Parses a money/ratio cell. Percent cells become fractions.
pub fn parse_number(s: &str) -> Option<f64> {
    let t = s.trim();
    if t == "--" || t.is_empty() {
        return Some(0.0);
    }
    // "< 10%" appears in impression-share columns.
    let t = t.trim_start_matches('<').trim_start_matches('>').trim();
    let percent = t.ends_with('%');
    let cleaned: String = t
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    Some(if percent { value / 100.0 } else { value })
}

fn parse_timestamp(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    use chrono::{DateTime, NaiveDateTime, Utc};
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|ndt| ndt.and_utc())
}

// ─── Typed row extraction ───────────────────────────────────────────────────

macro_rules! metric {
    ($report:ident, $row:ident, $key:literal, $parser:ident, $warnings:ident) => {
        match $report.get($row, $key).map($parser) {
            Some(Some(v)) => v,
            Some(None) => {
                $warnings.push(format!("unparseable {} in row, skipped", $key));
                continue;
            }
            None => Default::default(),
        }
    };
}

pub fn search_term_rows(report: &ParsedReport) -> (Vec<SearchTermRow>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(term) = report.get(row, "search_term") else {
            warnings.push("row without search_term skipped".into());
            continue;
        };
        out.push(SearchTermRow {
            campaign_id: report.get(row, "campaign_id").unwrap_or("").to_string(),
            ad_group_id: report.get(row, "ad_group_id").unwrap_or("").to_string(),
            search_term: term.to_string(),
            matched_keyword: report.get(row, "keyword").unwrap_or("").to_string(),
            match_type: MatchType::parse(report.get(row, "match_type").unwrap_or("broad")),
            clicks: metric!(report, row, "clicks", parse_count, warnings),
            impressions: metric!(report, row, "impressions", parse_count, warnings),
            cost: metric!(report, row, "cost", parse_number, warnings),
            conversions: metric!(report, row, "conversions", parse_number, warnings),
            conversion_value: metric!(report, row, "conversion_value", parse_number, warnings),
        });
    }
    (out, warnings)
}

pub fn keyword_rows(report: &ParsedReport) -> (Vec<KeywordRow>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(text) = report.get(row, "keyword") else {
            warnings.push("row without keyword skipped".into());
            continue;
        };
        out.push(KeywordRow {
            campaign_id: report.get(row, "campaign_id").unwrap_or("").to_string(),
            ad_group_id: report.get(row, "ad_group_id").unwrap_or("").to_string(),
            keyword_text: text.to_string(),
            match_type: MatchType::parse(report.get(row, "match_type").unwrap_or(text)),
            clicks: metric!(report, row, "clicks", parse_count, warnings),
            impressions: metric!(report, row, "impressions", parse_count, warnings),
            cost: metric!(report, row, "cost", parse_number, warnings),
            conversions: metric!(report, row, "conversions", parse_number, warnings),
            conversion_value: metric!(report, row, "conversion_value", parse_number, warnings),
        });
    }
    (out, warnings)
}

pub fn negative_keyword_rows(report: &ParsedReport) -> (Vec<NegativeKeyword>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(text) = report.get(row, "keyword") else {
            warnings.push("row without keyword skipped".into());
            continue;
        };
        let level = match report
            .get(row, "level")
            .unwrap_or("campaign")
            .to_ascii_lowercase()
            .as_str()
        {
            "ad group" | "ad_group" => NegativeLevel::AdGroup,
            "shared set" | "shared_set" => NegativeLevel::SharedSet,
            _ => NegativeLevel::Campaign,
        };
        out.push(NegativeKeyword {
            text: text.to_string(),
            match_type: MatchType::parse(report.get(row, "match_type").unwrap_or(text)),
            level,
            campaign_id: report.get(row, "campaign_id").unwrap_or("").to_string(),
        });
    }
    (out, warnings)
}

pub fn auction_insight_rows(report: &ParsedReport) -> (Vec<AuctionInsightRow>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(domain) = report.get(row, "domain") else {
            warnings.push("row without domain skipped".into());
            continue;
        };
        out.push(AuctionInsightRow {
            domain: domain.to_string(),
            impression_share: metric!(report, row, "impression_share", parse_number, warnings),
            overlap_rate: metric!(report, row, "overlap_rate", parse_number, warnings),
            outranking_share: metric!(report, row, "outranking_share", parse_number, warnings),
            position_above_rate: metric!(report, row, "position_above_rate", parse_number, warnings),
            top_of_page_rate: metric!(report, row, "top_of_page_rate", parse_number, warnings),
        });
    }
    (out, warnings)
}

pub fn device_rows(report: &ParsedReport) -> (Vec<DeviceRow>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(device) = report.get(row, "device") else {
            warnings.push("row without device skipped".into());
            continue;
        };
        out.push(DeviceRow {
            campaign_id: report.get(row, "campaign_id").unwrap_or("").to_string(),
            device: DeviceCategory::parse(device),
            clicks: metric!(report, row, "clicks", parse_count, warnings),
            impressions: metric!(report, row, "impressions", parse_count, warnings),
            cost: metric!(report, row, "cost", parse_number, warnings),
            conversions: metric!(report, row, "conversions", parse_number, warnings),
            conversion_value: metric!(report, row, "conversion_value", parse_number, warnings),
        });
    }
    (out, warnings)
}

pub fn placement_rows(report: &ParsedReport) -> (Vec<PlacementRow>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(placement) = report.get(row, "placement") else {
            warnings.push("row without placement skipped".into());
            continue;
        };
        let kind = match report
            .get(row, "placement_type")
            .unwrap_or("website")
            .to_ascii_lowercase()
            .as_str()
        {
            "mobile app" | "mobile_app" | "app" => PlacementKind::MobileApp,
            "youtube video" | "youtube_video" => PlacementKind::YoutubeVideo,
            "youtube channel" | "youtube_channel" => PlacementKind::YoutubeChannel,
            _ => PlacementKind::Website,
        };
        out.push(PlacementRow {
            campaign_id: report.get(row, "campaign_id").unwrap_or("").to_string(),
            placement: placement.to_string(),
            kind,
            clicks: metric!(report, row, "clicks", parse_count, warnings),
            impressions: metric!(report, row, "impressions", parse_count, warnings),
            cost: metric!(report, row, "cost", parse_number, warnings),
            conversions: metric!(report, row, "conversions", parse_number, warnings),
        });
    }
    (out, warnings)
}

pub fn landing_page_rows(report: &ParsedReport) -> (Vec<LandingPageRow>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(url) = report.get(row, "landing_page") else {
            warnings.push("row without landing_page skipped".into());
            continue;
        };
        out.push(LandingPageRow {
            url: url.to_string(),
            sessions: metric!(report, row, "sessions", parse_count, warnings),
            bounce_rate: metric!(report, row, "bounce_rate", parse_number, warnings),
            avg_load_ms: metric!(report, row, "avg_load_ms", parse_number, warnings),
            clicks: metric!(report, row, "clicks", parse_count, warnings),
            cost: metric!(report, row, "cost", parse_number, warnings),
            conversions: metric!(report, row, "conversions", parse_number, warnings),
        });
    }
    (out, warnings)
}

pub fn touchpoint_rows(report: &ParsedReport) -> (Vec<RawTouchpoint>, Vec<String>) {
    let mut out = Vec::new();
    let mut warnings = Vec::new();
    for row in &report.rows {
        let Some(customer) = report.get(row, "customer_id") else {
            warnings.push("row without customer_id skipped".into());
            continue;
        };
        let conversion_value = report
            .get(row, "conversion_value")
            .and_then(parse_number)
            .filter(|v| *v > 0.0);
        out.push(RawTouchpoint {
            customer_id: customer.to_string(),
            gclid: report.get(row, "gclid").map(str::to_string),
            session_id: report.get(row, "session_id").map(str::to_string),
            source: report.get(row, "source").unwrap_or("(direct)").to_string(),
            medium: report.get(row, "medium").unwrap_or("(none)").to_string(),
            campaign: report.get(row, "campaign_id").map(str::to_string),
            device: DeviceCategory::parse(report.get(row, "device").unwrap_or("")),
            timestamp: report.get(row, "timestamp").and_then(parse_timestamp),
            page_views: (metric!(report, row, "page_views", parse_count, warnings)) as u32,
            session_duration_secs: metric!(report, row, "session_duration_secs", parse_number, warnings),
            conversion_value,
        });
    }
    (out, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> CsvReportParser {
        CsvReportParser::new(&CsvConfig { max_file_size_mb: 1 })
    }

    #[test]
    fn test_strict_parse_happy_path() {
        let data = "Search term,Clicks,Impr.,Cost,Conversions,Conv. value\n\
                    free running shoes,40,1200,$52.10,0,0\n\
                    buy shoes,12,300,8.00,2,140.50\n";
        let report = parser().parse_str(data, ReportKind::SearchTerms).unwrap();
        assert_eq!(report.strategy, ParseStrategy::Strict);
        let (rows, warnings) = search_term_rows(&report);
        assert!(warnings.is_empty());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].search_term, "free running shoes");
        assert_eq!(rows[0].clicks, 40);
        assert!((rows[0].cost - 52.10).abs() < 1e-9);
        assert!((rows[1].conversion_value - 140.50).abs() < 1e-9);
    }

    #[test]
    fn test_missing_columns_named_in_error() {
        let data = "Search term,Clicks\nfoo,10\n";
        let err = parser()
            .parse_str(data, ReportKind::SearchTerms)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("impressions"), "got: {msg}");
        assert!(msg.contains("cost"), "got: {msg}");
        assert!(msg.contains("conversions"), "got: {msg}");
        assert!(!msg.contains("search_term"), "got: {msg}");
    }

    #[test]
    fn test_oversize_file_rejected_before_parse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.csv");
        // 2 MB of garbage that would also fail parsing; the size gate must
        // fire first with a Validation error, not a CsvParse error.
        std::fs::write(&path, vec![b'x'; 2 * 1024 * 1024]).unwrap();
        let err = parser()
            .parse_file(&path, ReportKind::SearchTerms)
            .unwrap_err();
        assert!(matches!(err, searchnav_core::NavError::Validation(_)));
        assert!(err.to_string().contains("max_file_size_mb"));
    }

    #[test]
    fn test_ragged_rows_fall_back_to_lenient_strategy() {
        let data = "Search term,Clicks,Impr.,Cost,Conversions\n\
                    good term,10,100,5.0,1\n\
                    short row,5\n\
                    another good,20,400,9.9,0\n";
        let report = parser().parse_str(data, ReportKind::SearchTerms).unwrap();
        assert_ne!(report.strategy, ParseStrategy::Strict);
        assert_eq!(report.rows.len(), 3);
        let (rows, _) = search_term_rows(&report);
        // The short row pads missing metrics with zeros.
        assert_eq!(rows[1].impressions, 0);
    }

    #[test]
    fn test_size_gate_is_exact_at_the_byte_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let limit = 1024 * 1024usize;
        let base = "Search term,Clicks,Impr.,Cost,Conversions\nfoo,1,10,1.0,0\n";

        // Exactly at the limit: accepted and parsed.
        let exact = dir.path().join("exact.csv");
        let mut data = base.to_string();
        data.push_str(&"\n".repeat(limit - base.len()));
        std::fs::write(&exact, &data).unwrap();
        let report = parser().parse_file(&exact, ReportKind::SearchTerms).unwrap();
        assert_eq!(report.rows.len(), 1);

        // One byte over: rejected before any parsing.
        let over = dir.path().join("over.csv");
        let mut data = base.to_string();
        data.push_str(&"\n".repeat(limit + 1 - base.len()));
        std::fs::write(&over, &data).unwrap();
        let err = parser()
            .parse_file(&over, ReportKind::SearchTerms)
            .unwrap_err();
        assert!(matches!(err, NavError::Validation(_)));
    }

    #[test]
    fn test_percent_and_placeholder_cells() {
        assert_eq!(parse_number("43.5%"), Some(0.435));
        assert_eq!(parse_number("< 10%"), Some(0.10));
        assert_eq!(parse_number("--"), Some(0.0));
        assert_eq!(parse_number("$1,234.56"), Some(1234.56));
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("--"), Some(0));
        // Fractional cells must not collapse into a larger integer.
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count("1,234.0"), None);
    }

    #[test]
    fn test_fractional_count_cell_skips_row_with_warning() {
        let data = "Search term,Clicks,Impr.,Cost,Conversions\n\
                    bad term,12.5,100,5.0,0\n\
                    good term,12,100,5.0,0\n";
        let report = parser().parse_str(data, ReportKind::SearchTerms).unwrap();
        let (rows, warnings) = search_term_rows(&report);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].search_term, "good term");
        assert!(warnings.iter().any(|w| w.contains("clicks")));
    }

    #[test]
    fn test_bom_and_header_aliases() {
        let data = "\u{feff}Display URL domain,Impression share,Overlap rate,Outranking share,Position above rate,Top of page rate\n\
                    rival.com,43.5%,22%,12%,8%,60%\n";
        let report = parser()
            .parse_str(data, ReportKind::AuctionInsights)
            .unwrap();
        let (rows, warnings) = auction_insight_rows(&report);
        assert!(warnings.is_empty());
        assert_eq!(rows[0].domain, "rival.com");
        assert!((rows[0].impression_share - 0.435).abs() < 1e-9);
    }

    #[test]
    fn test_touchpoint_rows() {
        let data = "customer_id,gclid,source,medium,device,timestamp,conversion_value\n\
                    cust-1,Cj0abc,google,cpc,Mobile,2026-03-01 10:00:00,0\n\
                    cust-1,,google,organic,Desktop,2026-03-02T09:00:00Z,99.5\n";
        let report = parser().parse_str(data, ReportKind::Touchpoints).unwrap();
        let (rows, _) = touchpoint_rows(&report);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].gclid.as_deref(), Some("Cj0abc"));
        assert_eq!(rows[0].conversion_value, None);
        assert_eq!(rows[1].conversion_value, Some(99.5));
        assert!(rows[0].timestamp.is_some());
        assert!(rows[1].timestamp.is_some());
    }
}
