//! Groups a flat touchpoint stream into per-customer journeys bounded by a
//! lookback window.

use std::collections::{HashMap, HashSet};

use chrono::Duration;
use tracing::debug;

use searchnav_core::config::AttributionConfig;
use searchnav_core::types::RawTouchpoint;

use crate::types::{AttributionTouch, CustomerJourney};

pub struct JourneyBuilder {
    lookback: Duration,
    include_non_converting: bool,
}

impl JourneyBuilder {
    pub fn new(config: &AttributionConfig) -> Self {
        Self {
            lookback: Duration::days(config.lookback_window_days as i64),
            include_non_converting: config.include_non_converting,
        }
    }

    /// Builds journeys from raw events. Touches are grouped by customer id,
    /// ordered by timestamp (untimestamped touches sort to journey start),
    /// and trimmed to the lookback window anchored at the conversion time —
    /// or the last touch for non-converting journeys.
    pub fn build(&self, events: &[RawTouchpoint]) -> Vec<CustomerJourney> {
        let mut by_customer: HashMap<&str, Vec<&RawTouchpoint>> = HashMap::new();
        for event in events {
            by_customer
                .entry(event.customer_id.as_str())
                .or_default()
                .push(event);
        }

        let mut journeys: Vec<CustomerJourney> = by_customer
            .into_iter()
            .filter_map(|(customer_id, touches)| self.build_one(customer_id, touches))
            .collect();
        journeys.sort_by(|a, b| a.journey_id.cmp(&b.journey_id));

        debug!(
            total = journeys.len(),
            converting = journeys.iter().filter(|j| j.converted).count(),
            "built customer journeys"
        );
        journeys
    }

    fn build_one(
        &self,
        customer_id: &str,
        mut touches: Vec<&RawTouchpoint>,
    ) -> Option<CustomerJourney> {
        // Option ordering puts None first, which is exactly the "missing
        // timestamps belong at journey start" rule.
        touches.sort_by_key(|t| t.timestamp);

        let converted = touches.iter().any(|t| t.conversion_value.is_some());
        if !converted && !self.include_non_converting {
            return None;
        }

        let conversion_at = touches
            .iter()
            .filter(|t| t.conversion_value.is_some())
            .filter_map(|t| t.timestamp)
            .max();
        let last_timestamp = touches.iter().filter_map(|t| t.timestamp).max();
        let anchor = conversion_at.or(last_timestamp);

        // Window trim. Untimestamped touches are kept.
        if let Some(anchor) = anchor {
            let cutoff = anchor - self.lookback;
            touches.retain(|t| t.timestamp.map(|ts| ts >= cutoff).unwrap_or(true));
        }
        if touches.is_empty() {
            return None;
        }

        let conversion_value: f64 = touches.iter().filter_map(|t| t.conversion_value).sum();
        let first_touch_at = touches.iter().filter_map(|t| t.timestamp).min();
        let last_touch_at = touches.iter().filter_map(|t| t.timestamp).max();

        let channels: HashSet<(&str, &str)> = touches
            .iter()
            .map(|t| (t.source.as_str(), t.medium.as_str()))
            .collect();
        let devices: HashSet<_> = touches.iter().map(|t| t.device).collect();

        let key = touches
            .iter()
            .find_map(|t| t.gclid.as_deref().or(t.session_id.as_deref()))
            .unwrap_or("na");
        let journey_id = format!("{customer_id}:{key}");

        let touches: Vec<AttributionTouch> = touches
            .into_iter()
            .map(|t| AttributionTouch {
                gclid: t.gclid.clone(),
                source: t.source.clone(),
                medium: t.medium.clone(),
                campaign: t.campaign.clone(),
                device: t.device,
                timestamp: t.timestamp,
                page_views: t.page_views,
                session_duration_secs: t.session_duration_secs,
            })
            .collect();

        Some(CustomerJourney {
            journey_id,
            customer_id: customer_id.to_string(),
            total_touches: touches.len(),
            first_touch_at,
            last_touch_at,
            converted,
            conversion_value,
            conversion_at,
            multi_channel: channels.len() >= 2,
            multi_device: devices.len() >= 2,
            touches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use searchnav_core::types::DeviceCategory;

    fn touch(
        customer: &str,
        source: &str,
        medium: &str,
        device: DeviceCategory,
        day: u32,
        conversion_value: Option<f64>,
    ) -> RawTouchpoint {
        RawTouchpoint {
            customer_id: customer.to_string(),
            gclid: Some(format!("gclid-{customer}")),
            session_id: None,
            source: source.to_string(),
            medium: medium.to_string(),
            campaign: None,
            device,
            timestamp: Some(Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()),
            page_views: 3,
            session_duration_secs: 60.0,
            conversion_value,
        }
    }

    fn config() -> AttributionConfig {
        AttributionConfig::default()
    }

    #[test]
    fn test_groups_by_customer_and_orders_touches() {
        let events = vec![
            touch("c1", "google", "cpc", DeviceCategory::Mobile, 5, None),
            touch("c1", "newsletter", "email", DeviceCategory::Desktop, 8, Some(100.0)),
            touch("c2", "google", "organic", DeviceCategory::Desktop, 6, None),
            touch("c1", "google", "organic", DeviceCategory::Mobile, 2, None),
        ];
        let journeys = JourneyBuilder::new(&config()).build(&events);
        assert_eq!(journeys.len(), 2);

        let j1 = journeys.iter().find(|j| j.customer_id == "c1").unwrap();
        assert_eq!(j1.total_touches, 3);
        assert_eq!(j1.touches[0].source, "google");
        assert_eq!(j1.touches[0].medium, "organic");
        assert!(j1.converted);
        assert_eq!(j1.conversion_value, 100.0);
        assert!(j1.multi_channel);
        assert!(j1.multi_device);

        let j2 = journeys.iter().find(|j| j.customer_id == "c2").unwrap();
        assert!(!j2.converted);
        assert!(!j2.multi_channel);
    }

    #[test]
    fn test_lookback_window_drops_stale_touches() {
        let mut old = touch("c1", "google", "cpc", DeviceCategory::Mobile, 1, None);
        old.timestamp = Some(Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap());
        let events = vec![
            old,
            touch("c1", "google", "cpc", DeviceCategory::Mobile, 10, None),
            touch("c1", "newsletter", "email", DeviceCategory::Mobile, 12, Some(50.0)),
        ];
        let journeys = JourneyBuilder::new(&config()).build(&events);
        assert_eq!(journeys[0].total_touches, 2);
    }

    #[test]
    fn test_non_converting_excluded_when_configured() {
        let mut cfg = config();
        cfg.include_non_converting = false;
        let events = vec![
            touch("c1", "google", "cpc", DeviceCategory::Mobile, 5, None),
            touch("c2", "google", "cpc", DeviceCategory::Mobile, 5, Some(10.0)),
        ];
        let journeys = JourneyBuilder::new(&cfg).build(&events);
        assert_eq!(journeys.len(), 1);
        assert_eq!(journeys[0].customer_id, "c2");
    }

    #[test]
    fn test_untimestamped_touches_sort_first_and_survive_trim() {
        let mut no_ts = touch("c1", "partner", "referral", DeviceCategory::Desktop, 1, None);
        no_ts.timestamp = None;
        let events = vec![
            touch("c1", "google", "cpc", DeviceCategory::Mobile, 10, Some(30.0)),
            no_ts,
        ];
        let journeys = JourneyBuilder::new(&config()).build(&events);
        assert_eq!(journeys[0].total_touches, 2);
        assert_eq!(journeys[0].touches[0].medium, "referral");
        assert!(journeys[0].touches[0].timestamp.is_none());
    }
}
