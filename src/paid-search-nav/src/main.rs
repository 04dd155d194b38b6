//! PaidSearchNav — paid search account analysis and multi-touch attribution.
//!
//! Reads bulk-export CSVs, runs the rule-based analyzers and the attribution
//! pipeline, and renders an optimization report.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use tracing::{info, warn};

use searchnav_analyzers::{
    BulkNegativeAnalyzer, CompetitorInsightsAnalyzer, DevicePerformanceAnalyzer,
    LandingPageAnalyzer, NegativeConflictAnalyzer, PlacementAuditAnalyzer,
};
use searchnav_attribution::{
    AttributionEngine, AttributionModel, HeuristicLtvModel, JourneyBuilder, MlAttributionAnalyzer,
};
use searchnav_core::config::AppConfig;
use searchnav_core::types::{AnalysisResult, DateRange};
use searchnav_core::{NavError, NavResult};
use searchnav_providers::{CsvDirProvider, Ga4Provider};
use searchnav_reporting::{
    to_bulk_csv, to_json, to_markdown, ExportFormat, OptimizationReport, ReportBuilder,
};

#[derive(Parser, Debug)]
#[command(name = "paid-search-nav")]
#[command(about = "Paid search account analysis and multi-touch attribution")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every analyzer plus attribution and produce a report.
    Analyze {
        /// Google Ads customer id (123-456-7890)
        #[arg(long, env = "PAID_SEARCH_NAV__CUSTOMER_ID")]
        customer_id: String,

        /// Directory of bulk-export CSV files
        #[arg(long, env = "PAID_SEARCH_NAV__INPUT_DIR")]
        input_dir: PathBuf,

        /// Window start (YYYY-MM-DD), defaults to 30 days ago
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        /// Window end (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Attribution model: first_touch, last_touch, linear, time_decay,
        /// position_based
        #[arg(long, default_value = "time_decay")]
        model: String,

        /// json, csv, or markdown
        #[arg(long, default_value = "json", value_parser = parse_format)]
        format: ExportFormat,

        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Attribute the same journeys under two models and show the deltas.
    Compare {
        #[arg(long, env = "PAID_SEARCH_NAV__CUSTOMER_ID")]
        customer_id: String,

        #[arg(long, env = "PAID_SEARCH_NAV__INPUT_DIR")]
        input_dir: PathBuf,

        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,

        #[arg(long, value_parser = parse_date)]
        end: Option<NaiveDate>,

        /// Baseline model
        #[arg(long, default_value = "last_touch")]
        baseline: String,

        /// Candidate model
        #[arg(long, default_value = "time_decay")]
        candidate: String,
    },

    /// Re-render a saved JSON report as bulk-upload CSV or Markdown.
    ExportRecommendations {
        /// Report produced by `analyze --format json`
        #[arg(long)]
        report: PathBuf,

        #[arg(long, default_value = "csv", value_parser = parse_format)]
        format: ExportFormat,

        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    ExportFormat::from_str(s).map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::from_str(s).map_err(|e| format!("invalid date {s:?}: {e}"))
}

fn resolve_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> NavResult<DateRange> {
    let end = end.unwrap_or_else(|| Utc::now().date_naive());
    let start = start.unwrap_or(end - Duration::days(30));
    DateRange::new(start, end)
}

fn parse_model(name: &str, config: &AppConfig) -> NavResult<AttributionModel> {
    match name {
        "first_touch" => Ok(AttributionModel::FirstTouch),
        "last_touch" => Ok(AttributionModel::LastTouch),
        "linear" => Ok(AttributionModel::Linear),
        "time_decay" => Ok(AttributionModel::TimeDecay {
            half_life_hours: config.attribution.time_decay_half_life_hours,
        }),
        "position_based" => Ok(AttributionModel::PositionBased {
            first_weight: config.attribution.position_first_weight,
            last_weight: config.attribution.position_last_weight,
        }),
        other => Err(NavError::Validation(format!(
            "unknown attribution model: {other}"
        ))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        AppConfig::default()
    });

    match cli.command {
        Command::Analyze {
            customer_id,
            input_dir,
            start,
            end,
            model,
            format,
            output,
        } => {
            let range = resolve_range(start, end)?;
            let model = parse_model(&model, &config)?;
            let report = run_analysis(&config, &customer_id, &input_dir, range, &model).await?;
            let rendered = match format {
                ExportFormat::Json => to_json(&report)?,
                ExportFormat::Csv => to_bulk_csv(&report)?,
                ExportFormat::Markdown => to_markdown(&report),
            };
            emit(output, rendered)?;
        }
        Command::Compare {
            customer_id,
            input_dir,
            start,
            end,
            baseline,
            candidate,
        } => {
            let range = resolve_range(start, end)?;
            let baseline = parse_model(&baseline, &config)?;
            let candidate = parse_model(&candidate, &config)?;
            run_compare(&config, &customer_id, &input_dir, range, &baseline, &candidate).await?;
        }
        Command::ExportRecommendations {
            report,
            format,
            output,
        } => {
            let text = std::fs::read_to_string(&report)?;
            let report: OptimizationReport = serde_json::from_str(&text)?;
            let rendered = match format {
                ExportFormat::Json => to_json(&report)?,
                ExportFormat::Csv => to_bulk_csv(&report)?,
                ExportFormat::Markdown => to_markdown(&report),
            };
            emit(output, rendered)?;
        }
    }

    Ok(())
}

fn emit(output: Option<PathBuf>, rendered: String) -> NavResult<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Converts an analyzer failure into an empty result carrying the error as a
/// warning. One broken data source never sinks the whole report.
fn degrade(
    name: &str,
    customer_id: &str,
    range: DateRange,
    outcome: NavResult<AnalysisResult>,
) -> AnalysisResult {
    match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!(analyzer = name, error = %e, "analyzer failed, degrading to empty section");
            let mut result = AnalysisResult::new(name, customer_id, range);
            result.warnings.push(format!("analyzer failed: {e}"));
            result
        }
    }
}

async fn run_analysis(
    config: &AppConfig,
    customer_id: &str,
    input_dir: &PathBuf,
    range: DateRange,
    model: &AttributionModel,
) -> NavResult<OptimizationReport> {
    let provider = Arc::new(CsvDirProvider::new(input_dir.clone(), &config.csv));
    info!(customer_id, input_dir = %input_dir.display(), model = model.label(), "starting analysis");

    let bulk_negative = BulkNegativeAnalyzer::new(
        provider.clone(),
        config.bulk_negative.clone(),
        &config.providers,
    );
    let negative_conflict = NegativeConflictAnalyzer::new(provider.clone(), &config.providers);
    let competitor = CompetitorInsightsAnalyzer::new(
        provider.clone(),
        config.competitor.clone(),
        &config.providers,
    );
    let device =
        DevicePerformanceAnalyzer::new(provider.clone(), config.device.clone(), &config.providers);
    let landing_page = LandingPageAnalyzer::new(
        provider.clone(),
        config.landing_page.clone(),
        &config.providers,
    );
    let placement =
        PlacementAuditAnalyzer::new(provider.clone(), config.placement.clone(), &config.providers);

    let (r1, r2, r3, r4, r5, r6) = tokio::join!(
        bulk_negative.analyze(customer_id, range),
        negative_conflict.analyze(customer_id, range),
        competitor.analyze(customer_id, range),
        device.analyze(customer_id, range),
        landing_page.analyze(customer_id, range),
        placement.analyze(customer_id, range),
    );

    let mut builder = ReportBuilder::new();
    builder.push(degrade(BulkNegativeAnalyzer::NAME, customer_id, range, r1));
    builder.push(degrade(NegativeConflictAnalyzer::NAME, customer_id, range, r2));
    builder.push(degrade(CompetitorInsightsAnalyzer::NAME, customer_id, range, r3));
    builder.push(degrade(DevicePerformanceAnalyzer::NAME, customer_id, range, r4));
    builder.push(degrade(LandingPageAnalyzer::NAME, customer_id, range, r5));
    builder.push(degrade(PlacementAuditAnalyzer::NAME, customer_id, range, r6));

    builder.push(degrade(
        "attribution",
        customer_id,
        range,
        run_attribution(config, provider, customer_id, range, model).await,
    ));

    Ok(builder.build(customer_id, range))
}

/// Builds journeys, attributes them under the selected model, and layers the
/// ML insight pass on top.
async fn run_attribution(
    config: &AppConfig,
    provider: Arc<CsvDirProvider>,
    customer_id: &str,
    range: DateRange,
    model: &AttributionModel,
) -> NavResult<AnalysisResult> {
    let touchpoints = provider.fetch_touchpoints(customer_id, &range).await?;
    let journeys = JourneyBuilder::new(&config.attribution).build(&touchpoints);

    let engine = AttributionEngine::new(&config.attribution);
    let (results, attribution_warnings) = engine.attribute_all(&journeys, model).await;
    let rollup = AttributionEngine::rollup_channels(&results);

    let ml = MlAttributionAnalyzer::new(
        Arc::new(HeuristicLtvModel::new()),
        config.attribution.clone(),
    );
    let mut result = ml.generate_insights(customer_id, range, &journeys).await;

    result.analyzer = "attribution".to_string();
    result.warnings.extend(attribution_warnings);
    if let Some(summary) = result.summary.as_object_mut() {
        summary.insert("model".into(), serde_json::json!(model.label()));
        summary.insert("journeys_attributed".into(), serde_json::json!(results.len()));
        summary.insert("channel_revenue".into(), serde_json::json!(rollup));
    }
    Ok(result)
}

async fn run_compare(
    config: &AppConfig,
    customer_id: &str,
    input_dir: &PathBuf,
    range: DateRange,
    baseline: &AttributionModel,
    candidate: &AttributionModel,
) -> NavResult<()> {
    let provider = CsvDirProvider::new(input_dir.clone(), &config.csv);
    let touchpoints = provider.fetch_touchpoints(customer_id, &range).await?;
    let journeys = JourneyBuilder::new(&config.attribution).build(&touchpoints);
    info!(
        journeys = journeys.len(),
        baseline = baseline.label(),
        candidate = candidate.label(),
        "comparing attribution models"
    );

    let engine = AttributionEngine::new(&config.attribution);
    let runs = join_all([
        engine.attribute_all(&journeys, baseline),
        engine.attribute_all(&journeys, candidate),
    ])
    .await;
    let base_rollup = AttributionEngine::rollup_channels(&runs[0].0);
    let cand_rollup = AttributionEngine::rollup_channels(&runs[1].0);

    let mut channels: Vec<&String> = base_rollup.keys().chain(cand_rollup.keys()).collect();
    channels.sort();
    channels.dedup();

    println!(
        "{:<32} {:>14} {:>14} {:>12}",
        "channel",
        baseline.label(),
        candidate.label(),
        "delta"
    );
    for channel in channels {
        let base = base_rollup.get(channel).copied().unwrap_or(0.0);
        let cand = cand_rollup.get(channel).copied().unwrap_or(0.0);
        println!(
            "{channel:<32} {base:>14.2} {cand:>14.2} {:>+12.2}",
            cand - base
        );
    }

    for (label, (_, warnings)) in [baseline.label(), candidate.label()].into_iter().zip(&runs) {
        for w in warnings {
            warn!(model = label, warning = %w, "journey skipped");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_uses_configured_parameters() {
        let config = AppConfig::default();
        assert_eq!(
            parse_model("linear", &config).unwrap(),
            AttributionModel::Linear
        );
        match parse_model("time_decay", &config).unwrap() {
            AttributionModel::TimeDecay { half_life_hours } => {
                assert_eq!(half_life_hours, 168.0)
            }
            other => panic!("unexpected model {other:?}"),
        }
        assert!(parse_model("u_shaped", &config).is_err());
    }

    #[test]
    fn test_resolve_range_defaults_to_trailing_month() {
        let range = resolve_range(None, None).unwrap();
        assert_eq!(range.days(), 31);
        assert!(resolve_range(
            parse_date("2026-02-10").ok(),
            parse_date("2026-02-01").ok()
        )
        .is_err());
    }
}
