// src/recommend/formatter.rs — Recommendation records and their display form

use std::fmt;

use super::types::{CleaningMode, GroupStat, Recommendation, UNKNOWN_MODE_LABEL};

const WEEKDAY_NAMES: [&str; 7] = [
    "일요일",
    "월요일",
    "화요일",
    "수요일",
    "목요일",
    "금요일",
    "토요일",
];

const UNKNOWN_WEEKDAY: &str = "알 수 없는 요일";

/// Build the recommendation for a ranked group.
///
/// `total_events` is the number of sessions across all groups, so the
/// probabilities of one run never sum past 1.
pub fn format_recommendation(group: &GroupStat, rank: usize, total_events: usize) -> Recommendation {
    let probability = if total_events == 0 {
        0.0
    } else {
        group.count as f64 / total_events as f64
    };

    Recommendation {
        rank,
        mode: mode_name(group.key.mode_code).to_string(),
        probability,
        weekday: group.key.weekday,
        hour: group.key.hour,
        crumb_care: group.key.crumb_care,
        grease_care: group.key.grease_care,
        water_care: group.key.water_care,
    }
}

/// Reverse lookup of a mode code; anything unknown gets the fixed label.
pub fn mode_name(code: i8) -> &'static str {
    CleaningMode::from_code(code)
        .map(|m| m.label())
        .unwrap_or(UNKNOWN_MODE_LABEL)
}

pub fn weekday_name(weekday: u8) -> &'static str {
    WEEKDAY_NAMES
        .get(weekday as usize)
        .copied()
        .unwrap_or(UNKNOWN_WEEKDAY)
}

/// 24-hour value to a 12-hour clock reading with the 오전/오후 marker.
pub fn clock_12h(hour: u8) -> (u8, &'static str) {
    let h12 = if hour % 12 == 0 { 12 } else { hour % 12 };
    let marker = if hour < 12 { "오전" } else { "오후" };
    (h12, marker)
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h12, marker) = clock_12h(self.hour);
        writeln!(f, "[추천 {}]", self.rank)?;
        writeln!(f, "  모드: {} (확률: {:.2})", self.mode, self.probability)?;
        writeln!(
            f,
            "  집중케어: 부스러기 {}, 기름때 {}, 물때 {}",
            self.crumb_care, self.grease_care, self.water_care
        )?;
        write!(f, "  요일: {}, 시간: {} {}시", weekday_name(self.weekday), marker, h12)
    }
}
