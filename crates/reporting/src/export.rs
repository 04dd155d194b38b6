//! Renders an [`OptimizationReport`] for downstream consumption.
//!
//! The CSV export emits Google Ads Editor bulk-upload rows for the
//! recommendation types that map onto editor actions (negative keywords and
//! placement exclusions). Everything else stays in the JSON and Markdown
//! renderings.

use std::str::FromStr;

use searchnav_core::types::{Priority, Recommendation, RecommendationType};
use searchnav_core::{NavError, NavResult};

use crate::report::OptimizationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl FromStr for ExportFormat {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(NavError::Validation(format!(
                "unknown export format: {other} (expected json, csv, or markdown)"
            ))),
        }
    }
}

pub fn to_json(report: &OptimizationReport) -> NavResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

const BULK_HEADERS: [&str; 6] = [
    "Action",
    "Campaign ID",
    "Ad group ID",
    "Keyword or Placement",
    "Match type",
    "Notes",
];

/// Google Ads Editor bulk-upload CSV. Skips recommendation types without an
/// editor action rather than failing the export.
pub fn to_bulk_csv(report: &OptimizationReport) -> NavResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(BULK_HEADERS)
        .map_err(|e| NavError::Export(e.to_string()))?;

    for rec in &report.recommendations {
        let Some(row) = bulk_row(rec) else { continue };
        writer
            .write_record(&row)
            .map_err(|e| NavError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| NavError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| NavError::Export(e.to_string()))
}

fn bulk_row(rec: &Recommendation) -> Option<[String; 6]> {
    let field = |key: &str| {
        rec.action_data
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    };
    match rec.rec_type {
        RecommendationType::AddNegativeKeyword => Some([
            "Add negative keyword".into(),
            field("campaign_id"),
            field("ad_group_id"),
            field("keyword"),
            field("match_type"),
            rec.title.clone(),
        ]),
        RecommendationType::RemoveNegativeKeyword => Some([
            "Remove negative keyword".into(),
            field("campaign_id"),
            String::new(),
            field("negative_keyword"),
            rec.action_data
                .get("negative_match_type")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            rec.title.clone(),
        ]),
        RecommendationType::ExcludePlacement => Some([
            "Exclude placement".into(),
            field("campaign_id"),
            String::new(),
            field("placement"),
            String::new(),
            rec.title.clone(),
        ]),
        _ => None,
    }
}

/// Markdown implementation guide grouped by priority, highest first.
pub fn to_markdown(report: &OptimizationReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Optimization report for {}\n\n{} to {} | {} recommendations | \
         estimated monthly savings: ${:.2}\n\n",
        report.customer_id,
        report.date_range.start,
        report.date_range.end,
        report.total_recommendations,
        report.total_estimated_monthly_savings,
    ));

    for priority in [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ] {
        let recs: Vec<&Recommendation> = report
            .recommendations
            .iter()
            .filter(|r| r.priority == priority)
            .collect();
        if recs.is_empty() {
            continue;
        }
        out.push_str(&format!("## {priority:?} ({})\n\n", recs.len()));
        for rec in recs {
            out.push_str(&format!("### {}\n\n{}\n\n", rec.title, rec.description));
            if rec.estimated_monthly_savings > 0.0 {
                out.push_str(&format!(
                    "Estimated monthly savings: ${:.2}\n\n",
                    rec.estimated_monthly_savings
                ));
            }
        }
    }

    if !report.warnings.is_empty() {
        out.push_str("## Warnings\n\n");
        for warning in &report.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
        out.push('\n');
    }

    out
}
