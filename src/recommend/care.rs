// src/recommend/care.rs — Per-mode targeted-care averages

use std::collections::BTreeMap;

use super::types::{CareAverages, EncodedEvent, ModeCareStats};

/// Average each care flag over all sessions that used the same mode.
pub fn average_care_by_mode(events: &[EncodedEvent]) -> ModeCareStats {
    // (crumb, grease, water, sessions)
    let mut sums: BTreeMap<i8, (u64, u64, u64, usize)> = BTreeMap::new();
    for e in events {
        let s = sums.entry(e.mode_code).or_default();
        s.0 += e.crumb_care as u64;
        s.1 += e.grease_care as u64;
        s.2 += e.water_care as u64;
        s.3 += 1;
    }

    sums.into_iter()
        .map(|(mode, (crumb, grease, water, n))| {
            let n_f = n as f64;
            (
                mode,
                CareAverages {
                    crumb_care: crumb as f64 / n_f,
                    grease_care: grease as f64 / n_f,
                    water_care: water as f64 / n_f,
                    sessions: n,
                },
            )
        })
        .collect()
}
