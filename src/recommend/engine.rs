// src/recommend/engine.rs — Recommendation generation from a device's history

use chrono_tz::Tz;
use tracing::debug;

use super::aggregator::{aggregate, total_count};
use super::care::average_care_by_mode;
use super::encoder::FeatureEncoder;
use super::formatter::format_recommendation;
use super::selector::top_k;
use super::types::{HistoryEvent, ModeCareStats, Recommendation};

/// Encodes, groups and ranks a batch of sessions.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationEngine {
    encoder: FeatureEncoder,
    top_k: usize,
}

/// Everything one engine pass produces.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub total_events: usize,
    /// Number of distinct feature signatures observed
    pub groups: usize,
    pub recommendations: Vec<Recommendation>,
    pub care_stats: ModeCareStats,
}

impl RecommendationEngine {
    pub fn new(top_k: usize, tz: Tz) -> Self {
        Self {
            encoder: FeatureEncoder::new(tz),
            top_k,
        }
    }

    pub fn recommend(&self, events: &[HistoryEvent]) -> EngineOutput {
        let encoded = self.encoder.encode_all(events);
        let counts = aggregate(&encoded);
        let total_events = total_count(&counts);

        let recommendations: Vec<Recommendation> = top_k(&counts, self.top_k)
            .iter()
            .enumerate()
            .map(|(i, group)| format_recommendation(group, i + 1, total_events))
            .collect();

        let care_stats = average_care_by_mode(&encoded);
        debug!(
            "Engine pass: {} events, {} groups, {} recommendations, care stats for {} modes",
            total_events,
            counts.len(),
            recommendations.len(),
            care_stats.len()
        );

        EngineOutput {
            total_events,
            groups: counts.len(),
            recommendations,
            care_stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    // 2025-01-05 is a Sunday; 00:00 UTC is 09:00 in Seoul.
    fn sunday_nine_wet_crumb() -> HistoryEvent {
        HistoryEvent {
            start_time: Utc.with_ymd_and_hms(2025, 1, 5, 0, 10, 0).unwrap(),
            mode: "습식 모드".into(),
            crumb_care: true,
            grease_care: false,
            water_care: false,
        }
    }

    // 2025-01-08 09:00 UTC is Wednesday 18:00 in Seoul.
    fn wednesday_six_pm_dry() -> HistoryEvent {
        HistoryEvent {
            start_time: Utc.with_ymd_and_hms(2025, 1, 8, 9, 45, 0).unwrap(),
            mode: "건식 모드".into(),
            crumb_care: false,
            grease_care: false,
            water_care: false,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let mut events = vec![sunday_nine_wet_crumb(); 4];
        events.push(wednesday_six_pm_dry());

        let out = RecommendationEngine::new(3, chrono_tz::Asia::Seoul).recommend(&events);
        assert_eq!(out.total_events, 5);
        assert_eq!(out.groups, 2);
        assert_eq!(out.recommendations.len(), 2);

        let first = &out.recommendations[0];
        assert_eq!(first.rank, 1);
        assert_eq!(first.mode, "습식 모드");
        assert_eq!((first.weekday, first.hour), (0, 9));
        assert_eq!((first.crumb_care, first.grease_care, first.water_care), (1, 0, 0));
        assert!((first.probability - 0.8).abs() < 1e-9);

        let second = &out.recommendations[1];
        assert_eq!(second.rank, 2);
        assert_eq!(second.mode, "건식 모드");
        assert_eq!((second.weekday, second.hour), (3, 18));
        assert!((second.probability - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history() {
        let out = RecommendationEngine::new(3, chrono_tz::Asia::Seoul).recommend(&[]);
        assert_eq!(out.total_events, 0);
        assert_eq!(out.groups, 0);
        assert!(out.recommendations.is_empty());
        assert!(out.care_stats.is_empty());
    }

    #[test]
    fn test_probabilities_bounded() {
        let events: Vec<HistoryEvent> = (0..40)
            .map(|i| HistoryEvent {
                start_time: Utc.with_ymd_and_hms(2025, 2, 1 + (i % 7), i % 24, 0, 0).unwrap(),
                mode: ["습식 모드", "건식 모드", "표준 모드", "???"][(i % 4) as usize].into(),
                crumb_care: i % 2 == 0,
                grease_care: i % 5 == 0,
                water_care: false,
            })
            .collect();

        let out = RecommendationEngine::new(3, chrono_tz::Asia::Seoul).recommend(&events);
        assert_eq!(out.recommendations.len(), 3.min(out.groups));
        let sum: f64 = out.recommendations.iter().map(|r| r.probability).sum();
        assert!(sum <= 1.0 + 1e-9);
        for r in &out.recommendations {
            assert!(r.probability > 0.0 && r.probability <= 1.0);
        }
        assert!(out.care_stats.contains_key(&-1i8));
    }
}
