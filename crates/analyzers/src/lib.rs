//! Rule-based account analyzers. Every analyzer follows the same pattern:
//! fetch rows from a provider, filter against configured thresholds, bucket
//! into priority tiers, and emit [`Recommendation`]s with an estimated
//! savings figure derived linearly from cost/conversions.

pub mod bulk_negative;
pub mod competitor;
pub mod device;
pub mod landing_page;
pub mod negative_conflict;
pub mod placement_audit;

use searchnav_core::types::Priority;

pub use bulk_negative::BulkNegativeAnalyzer;
pub use competitor::CompetitorInsightsAnalyzer;
pub use device::DevicePerformanceAnalyzer;
pub use landing_page::LandingPageAnalyzer;
pub use negative_conflict::NegativeConflictAnalyzer;
pub use placement_audit::PlacementAuditAnalyzer;

/// Fixed monthly-savings cutoffs shared by the analyzers.
pub fn savings_priority(estimated_monthly_savings: f64) -> Priority {
    if estimated_monthly_savings >= 500.0 {
        Priority::Critical
    } else if estimated_monthly_savings >= 100.0 {
        Priority::High
    } else if estimated_monthly_savings >= 25.0 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_priority_cutoffs() {
        assert_eq!(savings_priority(1000.0), Priority::Critical);
        assert_eq!(savings_priority(500.0), Priority::Critical);
        assert_eq!(savings_priority(499.99), Priority::High);
        assert_eq!(savings_priority(100.0), Priority::High);
        assert_eq!(savings_priority(30.0), Priority::Medium);
        assert_eq!(savings_priority(1.0), Priority::Low);
    }
}
