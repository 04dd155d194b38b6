//! Merges per-analyzer [`AnalysisResult`]s into one report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use searchnav_core::types::{AnalysisResult, DateRange, Priority, Recommendation};

/// One analyzer's slice of the merged report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerSection {
    pub analyzer: String,
    pub recommendation_count: usize,
    pub estimated_monthly_savings: f64,
    pub summary: serde_json::Value,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub customer_id: String,
    pub date_range: DateRange,
    pub generated_at: DateTime<Utc>,
    pub total_recommendations: usize,
    pub total_estimated_monthly_savings: f64,
    /// Count per priority tier, keyed by the serialized tier name.
    pub priority_counts: BTreeMap<String, usize>,
    pub sections: Vec<AnalyzerSection>,
    /// All recommendations, highest priority first, ties broken by savings.
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ReportBuilder {
    results: Vec<AnalysisResult>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: AnalysisResult) -> &mut Self {
        self.results.push(result);
        self
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = AnalysisResult>) -> &mut Self {
        self.results.extend(results);
        self
    }

    /// Consumes the accumulated results. `customer_id` and `range` describe
    /// the run; sections keep their own identity even when an analyzer
    /// produced nothing.
    pub fn build(self, customer_id: &str, range: DateRange) -> OptimizationReport {
        let mut sections = Vec::with_capacity(self.results.len());
        let mut recommendations = Vec::new();
        let mut warnings = Vec::new();

        for result in self.results {
            sections.push(AnalyzerSection {
                analyzer: result.analyzer.clone(),
                recommendation_count: result.recommendations.len(),
                estimated_monthly_savings: result.total_estimated_savings(),
                summary: result.summary,
                warnings: result.warnings.clone(),
            });
            warnings.extend(
                result
                    .warnings
                    .into_iter()
                    .map(|w| format!("{}: {w}", result.analyzer)),
            );
            recommendations.extend(result.recommendations);
        }

        recommendations.sort_by(|a, b| {
            b.priority.cmp(&a.priority).then(
                b.estimated_monthly_savings
                    .total_cmp(&a.estimated_monthly_savings),
            )
        });

        let mut priority_counts = BTreeMap::new();
        for rec in &recommendations {
            *priority_counts.entry(priority_key(rec.priority)).or_insert(0) += 1;
        }

        let total_savings = recommendations
            .iter()
            .map(|r| r.estimated_monthly_savings)
            .sum();

        debug!(
            recommendations = recommendations.len(),
            sections = sections.len(),
            "report assembled"
        );

        OptimizationReport {
            customer_id: customer_id.to_string(),
            date_range: range,
            generated_at: Utc::now(),
            total_recommendations: recommendations.len(),
            total_estimated_monthly_savings: total_savings,
            priority_counts,
            sections,
            recommendations,
            warnings,
        }
    }
}

pub(crate) fn priority_key(priority: Priority) -> String {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
        Priority::Critical => "critical",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use searchnav_core::types::{RecommendationType, Recommendation};

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
        .unwrap()
    }

    fn rec(priority: Priority, savings: f64) -> Recommendation {
        Recommendation::new(
            RecommendationType::AddNegativeKeyword,
            priority,
            "t",
            "d",
            savings,
            serde_json::json!({}),
        )
    }

    fn result(analyzer: &str, recs: Vec<Recommendation>) -> AnalysisResult {
        let mut r = AnalysisResult::new(analyzer, "123-456-7890", range());
        r.recommendations = recs;
        r
    }

    #[test]
    fn test_merge_sorts_by_priority_then_savings() {
        let mut builder = ReportBuilder::new();
        builder.push(result(
            "a",
            vec![rec(Priority::Medium, 40.0), rec(Priority::Critical, 10.0)],
        ));
        builder.push(result(
            "b",
            vec![rec(Priority::Medium, 90.0), rec(Priority::Low, 900.0)],
        ));
        let report = builder.build("123-456-7890", range());

        assert_eq!(report.total_recommendations, 4);
        assert_eq!(report.recommendations[0].priority, Priority::Critical);
        assert_eq!(report.recommendations[1].estimated_monthly_savings, 90.0);
        assert_eq!(report.recommendations[2].estimated_monthly_savings, 40.0);
        assert_eq!(report.recommendations[3].priority, Priority::Low);
        assert!((report.total_estimated_monthly_savings - 1040.0).abs() < 1e-9);
        assert_eq!(report.priority_counts["medium"], 2);
        assert_eq!(report.priority_counts["critical"], 1);
    }

    #[test]
    fn test_warnings_are_namespaced_and_sections_kept_when_empty() {
        let mut builder = ReportBuilder::new();
        let mut empty = result("device_performance", vec![]);
        empty.warnings.push("device report timed out".into());
        builder.push(empty);
        let report = builder.build("123-456-7890", range());

        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].recommendation_count, 0);
        assert_eq!(
            report.warnings,
            vec!["device_performance: device report timed out"]
        );
    }
}
