// src/recommend/encoder.rs — History event feature encoding

use chrono::{Datelike, Timelike};
use chrono_tz::Tz;

use super::types::{CleaningMode, EncodedEvent, HistoryEvent, UNKNOWN_MODE_CODE};

/// Turns validated history events into discrete features.
///
/// Weekday and hour are taken in a fixed calendar zone so the same event
/// always encodes the same way regardless of where the job runs.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder {
    tz: Tz,
}

impl FeatureEncoder {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn encode(&self, event: &HistoryEvent) -> EncodedEvent {
        let local = event.start_time.with_timezone(&self.tz);
        EncodedEvent {
            weekday: local.weekday().num_days_from_sunday() as u8,
            hour: local.hour() as u8,
            mode_code: encode_mode(&event.mode),
            crumb_care: event.crumb_care as u8,
            grease_care: event.grease_care as u8,
            water_care: event.water_care as u8,
        }
    }

    pub fn encode_all(&self, events: &[HistoryEvent]) -> Vec<EncodedEvent> {
        events.iter().map(|e| self.encode(e)).collect()
    }
}

/// Map a mode label to its code, or the unknown sentinel.
pub fn encode_mode(label: &str) -> i8 {
    CleaningMode::from_label(label)
        .map(|m| m.code())
        .unwrap_or(UNKNOWN_MODE_CODE)
}
