// src/recommend/mod.rs — Cleaning-setting recommendations from usage history

pub mod aggregator;
pub mod care;
pub mod encoder;
pub mod engine;
pub mod formatter;
pub mod job;
pub mod selector;
pub mod types;

pub use engine::{EngineOutput, RecommendationEngine};
pub use job::{
    BatchWrite, HistorySource, JobSettings, RecommendationJob, RecommendationSink, RunOutcome,
    RunReport,
};
pub use types::{
    CleaningMode, DeviceRef, HistoryEvent, RawHistoryRecord, Recommendation, RecordError,
};
