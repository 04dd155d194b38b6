//! Data-source seams: provider traits, bulk-export CSV ingestion, and the
//! in-memory/file-backed implementations used by tests and the CLI.

pub mod csv_dir;
pub mod csv_report;
pub mod static_data;
pub mod timeout;
pub mod traits;

pub use csv_dir::CsvDirProvider;
pub use csv_report::{CsvReportParser, ParseStrategy, ParsedReport, ReportKind};
pub use static_data::StaticProvider;
pub use timeout::with_timeout;
pub use traits::{BigQueryProvider, Ga4Provider, GoogleAdsProvider, TouchpointQuery};
