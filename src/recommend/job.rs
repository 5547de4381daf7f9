// src/recommend/job.rs — One recommendation run: fetch, rank, write

use async_trait::async_trait;
use chrono_tz::Tz;
use tracing::{debug, info, warn};

use crate::infra::config::Config;
use crate::infra::errors::RecommendError;
use crate::recommend::engine::RecommendationEngine;
use crate::recommend::formatter::mode_name;
use crate::recommend::types::{
    DeviceRef, HistoryEvent, ModeCareStats, RawHistoryRecord, Recommendation,
};

/// Where history records come from.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// All stored sessions for one device, in no particular order.
    async fn fetch_history(&self, device: &DeviceRef) -> anyhow::Result<Vec<RawHistoryRecord>>;
}

/// Result of an atomic batch write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchWrite {
    Committed(usize),
    /// A batch with the same run key was already stored; nothing was written.
    AlreadyExists,
}

/// Where recommendations go.
///
/// Implementations must apply the whole batch or none of it, and must treat a
/// repeated `run_key` for the same device as [`BatchWrite::AlreadyExists`].
#[async_trait]
pub trait RecommendationSink: Send + Sync {
    async fn write_batch(
        &self,
        device: &DeviceRef,
        run_key: &str,
        recommendations: &[Recommendation],
    ) -> anyhow::Result<BatchWrite>;
}

/// Per-run parameters.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub device: DeviceRef,
    pub top_k: usize,
    pub tz: Tz,
}

impl JobSettings {
    pub fn from_config(config: &Config) -> Result<Self, RecommendError> {
        Ok(Self {
            device: config.device(),
            top_k: config.recommend.top_k,
            tz: config.timezone()?,
        })
    }
}

/// Summary of a run that reached the engine.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_key: String,
    pub total_events: usize,
    /// Records rejected by validation
    pub skipped: usize,
    pub groups: usize,
    pub recommendations: Vec<Recommendation>,
    pub care_stats: ModeCareStats,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Written(RunReport),
    /// The same run key was committed earlier; this run was a no-op.
    AlreadyWritten(RunReport),
    NoHistory,
    NoGroups { skipped: usize },
}

impl RunOutcome {
    pub fn report(&self) -> Option<&RunReport> {
        match self {
            Self::Written(r) | Self::AlreadyWritten(r) => Some(r),
            Self::NoHistory | Self::NoGroups { .. } => None,
        }
    }
}

/// Runs the recommendation pipeline against injected collaborators.
pub struct RecommendationJob<'a> {
    source: &'a dyn HistorySource,
    sink: &'a dyn RecommendationSink,
    settings: JobSettings,
}

impl<'a> RecommendationJob<'a> {
    pub fn new(
        source: &'a dyn HistorySource,
        sink: &'a dyn RecommendationSink,
        settings: JobSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    pub async fn run(&self, run_key: &str) -> Result<RunOutcome, RecommendError> {
        let device = &self.settings.device;
        let records =
            self.source
                .fetch_history(device)
                .await
                .map_err(|e| RecommendError::Source {
                    device: device.to_string(),
                    message: format!("{e:#}"),
                })?;

        if records.is_empty() {
            info!("No cleaning history for {}, nothing to recommend", device);
            return Ok(RunOutcome::NoHistory);
        }

        let (events, skipped) = validate_records(records);
        let engine = RecommendationEngine::new(self.settings.top_k, self.settings.tz);
        let output = engine.recommend(&events);

        if output.groups == 0 || output.recommendations.is_empty() {
            info!(
                "No usable history groups for {} ({} records skipped)",
                device, skipped
            );
            return Ok(RunOutcome::NoGroups { skipped });
        }

        for rec in &output.recommendations {
            info!(
                "Recommendation {}: {} p={:.2} weekday={} hour={}",
                rec.rank, rec.mode, rec.probability, rec.weekday, rec.hour
            );
        }
        for (code, avg) in &output.care_stats {
            debug!(
                "Care averages for {}: crumbs {:.2}, grease {:.2}, water {:.2} over {} sessions",
                mode_name(*code),
                avg.crumb_care,
                avg.grease_care,
                avg.water_care,
                avg.sessions
            );
        }

        let write = self
            .sink
            .write_batch(device, run_key, &output.recommendations)
            .await
            .map_err(|e| RecommendError::WriteFailure {
                run_key: run_key.to_string(),
                message: format!("{e:#}"),
            })?;

        let report = RunReport {
            run_key: run_key.to_string(),
            total_events: output.total_events,
            skipped,
            groups: output.groups,
            recommendations: output.recommendations,
            care_stats: output.care_stats,
        };

        match write {
            BatchWrite::Committed(n) => {
                info!("Stored {} recommendations for {} ({})", n, device, run_key);
                Ok(RunOutcome::Written(report))
            }
            BatchWrite::AlreadyExists => {
                info!(
                    "Recommendations for {} ({}) already stored, skipping write",
                    device, run_key
                );
                Ok(RunOutcome::AlreadyWritten(report))
            }
        }
    }
}

/// Validate raw records, logging and counting the rejects.
pub fn validate_records(records: Vec<RawHistoryRecord>) -> (Vec<HistoryEvent>, usize) {
    let mut events = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for raw in records {
        match HistoryEvent::try_from(raw) {
            Ok(event) => events.push(event),
            Err(e) => {
                warn!("Skipping history record: {}", e);
                skipped += 1;
            }
        }
    }
    (events, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, start: Option<&str>) -> RawHistoryRecord {
        RawHistoryRecord {
            id: id.into(),
            start_time: start.map(String::from),
            mode: Some("표준 모드".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_counts_rejects() {
        let (events, skipped) = validate_records(vec![
            raw("ok-1", Some("2025-03-01T10:00:00Z")),
            raw("missing", None),
            raw("garbled", Some("03/01/2025")),
            raw("ok-2", Some("2025-03-02T10:00:00+09:00")),
        ]);
        assert_eq!(events.len(), 2);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_outcome_report_accessor() {
        assert!(RunOutcome::NoHistory.report().is_none());
        assert!(RunOutcome::NoGroups { skipped: 3 }.report().is_none());
    }
}
