// src/infra/daemon/scheduler.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::infra::config::Config;
use crate::infra::errors::RecommendError;

/// A fixed weekly slot in a fixed calendar zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklySchedule {
    weekday: Weekday,
    time: NaiveTime,
    tz: Tz,
}

impl WeeklySchedule {
    pub fn new(weekday: Weekday, hour: u32, minute: u32, tz: Tz) -> Result<Self, RecommendError> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            RecommendError::InvalidSchedule(format!("time {hour:02}:{minute:02} is out of range"))
        })?;
        Ok(Self { weekday, time, tz })
    }

    pub fn from_config(config: &Config) -> Result<Self, RecommendError> {
        Self::new(
            config.schedule_weekday()?,
            config.schedule.hour,
            config.schedule.minute,
            config.timezone()?,
        )
    }

    /// The most recent slot at or before `now`.
    pub fn latest_slot(&self, now: &DateTime<Utc>) -> DateTime<Tz> {
        let local = now.with_timezone(&self.tz);
        let days_back = (local.weekday().num_days_from_sunday() + 7
            - self.weekday.num_days_from_sunday())
            % 7;
        let date = local.date_naive() - Duration::days(days_back as i64);

        let slot = self.at(date);
        if slot > local {
            self.at(date - Duration::days(7))
        } else {
            slot
        }
    }

    /// Idempotency key for the slot covering `now`.
    pub fn run_key(&self, now: &DateTime<Utc>) -> String {
        run_key_for(&self.latest_slot(now))
    }

    /// The first slot strictly after `now`.
    pub fn next_slot(&self, now: &DateTime<Utc>) -> DateTime<Tz> {
        let latest = self.latest_slot(now);
        self.at(latest.date_naive() + Duration::days(7))
    }

    fn at(&self, date: NaiveDate) -> DateTime<Tz> {
        let naive = date.and_time(self.time);
        // A slot inside a DST gap falls back to the same wall-clock reading in UTC.
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| self.tz.from_utc_datetime(&naive))
    }
}

/// `weekly-<ISO year>-W<ISO week>` of the slot's local date.
pub fn run_key_for(slot: &DateTime<Tz>) -> String {
    let week = slot.iso_week();
    format!("weekly-{}-W{:02}", week.year(), week.week())
}

/// Tracks attempts for the current slot so each slot is completed at most
/// once and retried a bounded number of times.
#[derive(Debug, Default)]
pub struct SlotTracker {
    run_key: Option<String>,
    attempts: u32,
    finished: bool,
}

impl SlotTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the slot identified by `run_key` still needs a run.
    pub fn should_attempt(&mut self, run_key: &str, max_attempts: u32) -> bool {
        if self.run_key.as_deref() != Some(run_key) {
            self.run_key = Some(run_key.to_string());
            self.attempts = 0;
            self.finished = false;
        }
        !self.finished && self.attempts < max_attempts
    }

    /// Record one attempt. `finished` marks the slot as done (success or a
    /// failure that retrying will not fix).
    pub fn record_attempt(&mut self, finished: bool) {
        self.attempts += 1;
        if finished {
            self.finished = true;
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
