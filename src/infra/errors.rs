// src/infra/errors.rs — Error types for cleanrec

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    // Collaborator errors (retriable by the trigger)
    #[error("Failed to read history for '{device}': {message}")]
    Source { device: String, message: String },

    #[error("Failed to write recommendation batch '{run_key}': {message}")]
    WriteFailure { run_key: String, message: String },

    // User errors
    #[error("Unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Daemon already running (pid {pid})")]
    DaemonRunning { pid: u32 },

    // Infra
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RecommendError {
    /// Whether the trigger may try the same run again later.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            RecommendError::Source { .. } | RecommendError::WriteFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_classification() {
        let write = RecommendError::WriteFailure {
            run_key: "weekly-2025-W02".into(),
            message: "disk full".into(),
        };
        assert!(write.is_retriable());
        assert_eq!(
            write.to_string(),
            "Failed to write recommendation batch 'weekly-2025-W02': disk full"
        );

        assert!(!RecommendError::UnknownTimeZone("Mars/Olympus".into()).is_retriable());
        assert!(!RecommendError::Config("bad".into()).is_retriable());
    }
}
