// src/infra/config.rs — Configuration loading (TOML)

use chrono::Weekday;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::infra::errors::RecommendError;
use crate::infra::paths;
use crate::recommend::types::DeviceRef;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub recommend: RecommendConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// Which device's history is analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub user_id: String,
    pub device_id: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            user_id: "local".into(),
            device_id: "default".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// How many ranked recommendations to keep per run
    pub top_k: usize,
    /// Calendar zone used for weekday/hour features and the schedule
    pub timezone: String,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            timezone: "Asia/Seoul".into(),
        }
    }
}

/// Weekly trigger, evaluated in `recommend.timezone`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub weekday: String,
    pub hour: u32,
    pub minute: u32,
    pub check_interval_secs: u64,
    /// Attempts per scheduled slot before the daemon gives up until next week
    pub max_attempts: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekday: "sun".into(),
            hour: 0,
            minute: 0,
            check_interval_secs: 60,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn device(&self) -> DeviceRef {
        DeviceRef::new(&self.device.user_id, &self.device.device_id)
    }

    pub fn timezone(&self) -> Result<Tz, RecommendError> {
        self.recommend
            .timezone
            .parse::<Tz>()
            .map_err(|_| RecommendError::UnknownTimeZone(self.recommend.timezone.clone()))
    }

    pub fn schedule_weekday(&self) -> Result<Weekday, RecommendError> {
        self.schedule.weekday.parse::<Weekday>().map_err(|_| {
            RecommendError::InvalidSchedule(format!("unknown weekday '{}'", self.schedule.weekday))
        })
    }

    /// Check the values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), RecommendError> {
        if self.device.user_id.trim().is_empty() || self.device.device_id.trim().is_empty() {
            return Err(RecommendError::Config(
                "device.user_id and device.device_id must be set".into(),
            ));
        }
        if self.recommend.top_k == 0 {
            return Err(RecommendError::Config(
                "recommend.top_k must be at least 1".into(),
            ));
        }
        self.timezone()?;
        self.schedule_weekday()?;
        if self.schedule.hour > 23 || self.schedule.minute > 59 {
            return Err(RecommendError::InvalidSchedule(format!(
                "time {:02}:{:02} is out of range",
                self.schedule.hour, self.schedule.minute
            )));
        }
        if self.schedule.check_interval_secs == 0 {
            return Err(RecommendError::InvalidSchedule(
                "check_interval_secs must be positive".into(),
            ));
        }
        if self.schedule.max_attempts == 0 {
            return Err(RecommendError::InvalidSchedule(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
