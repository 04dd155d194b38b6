//! Multi-touch attribution — journey building, weighting models, batched
//! attribution, and ML-assisted predictive insights.

pub mod engine;
pub mod journey;
pub mod ml;
pub mod types;

pub use engine::AttributionEngine;
pub use journey::JourneyBuilder;
pub use ml::{
    extract_features, feature_matrix, HeuristicLtvModel, LtvModel, MlAttributionAnalyzer, MlError,
    FEATURE_DIM,
};
pub use types::{
    AttributionModel, AttributionResult, AttributionTouch, CustomerJourney, TouchCredit,
};
