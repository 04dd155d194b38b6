//! Report assembly and export. [`ReportBuilder`] merges analyzer outputs
//! into a single [`OptimizationReport`]; the export module renders it as
//! JSON, Google Ads bulk-upload CSV, or a Markdown implementation guide.

pub mod export;
pub mod report;

pub use export::{to_bulk_csv, to_json, to_markdown, ExportFormat};
pub use report::{AnalyzerSection, OptimizationReport, ReportBuilder};
