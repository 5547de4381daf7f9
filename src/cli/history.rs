// src/cli/history.rs — History import and manual entry

use std::path::Path;

use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::infra::config::Config;
use crate::recommend::job::validate_records;
use crate::recommend::types::{HistoryEvent, RawHistoryRecord};
use crate::store::StoreHandle;

/// Records read from an import file.
#[derive(Debug, Default)]
pub struct ParsedHistory {
    pub records: Vec<RawHistoryRecord>,
    /// Array elements that are not history records at all (e.g. bare numbers)
    pub rejected: usize,
}

/// Parse a JSON array of history records, one element at a time.
///
/// Only a file that is not a JSON array fails as a whole.
pub fn parse_history_file(content: &str) -> anyhow::Result<ParsedHistory> {
    let elements: Vec<Value> = serde_json::from_str(content)?;
    let mut parsed = ParsedHistory::default();

    for (index, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            warn!("Skipping history element {}: not a JSON object", index);
            parsed.rejected += 1;
            continue;
        }
        match serde_json::from_value::<RawHistoryRecord>(element) {
            Ok(record) => parsed.records.push(record),
            Err(e) => {
                warn!("Skipping history element {}: {}", index, e);
                parsed.rejected += 1;
            }
        }
    }
    Ok(parsed)
}

/// Import records from a JSON file. Malformed records are stored as-is and
/// rejected per record at run time; the count is reported here.
pub async fn run_import(config: &Config, store: &StoreHandle, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)?;
    let summary = import_history(config, store, &content).await?;

    println!(
        "Imported {} of {} record(s) for {} ({} already present).",
        summary.inserted,
        summary.total,
        config.device(),
        summary.total - summary.inserted
    );
    if summary.invalid > 0 {
        println!(
            "Warning: {} record(s) are malformed and will be skipped by runs.",
            summary.invalid
        );
    }
    if summary.rejected > 0 {
        println!(
            "Warning: {} array element(s) were not records and were ignored.",
            summary.rejected
        );
    }
    Ok(())
}

/// Counts from one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub total: usize,
    pub inserted: usize,
    /// Stored but will fail validation at run time
    pub invalid: usize,
    /// Not stored at all
    pub rejected: usize,
}

pub async fn import_history(
    config: &Config,
    store: &StoreHandle,
    content: &str,
) -> anyhow::Result<ImportSummary> {
    let ParsedHistory { records, rejected } = parse_history_file(content)?;
    let total = records.len();

    let (_, invalid) = validate_records(records.clone());
    let inserted = store.insert_history(config.device(), records).await?;

    Ok(ImportSummary {
        total,
        inserted,
        invalid,
        rejected,
    })
}

/// Record one session after validating it.
pub async fn run_add(
    config: &Config,
    store: &StoreHandle,
    mode: &str,
    start: &str,
    crumb: bool,
    grease: bool,
    water: bool,
) -> anyhow::Result<()> {
    let record = RawHistoryRecord {
        id: Uuid::new_v4().to_string(),
        start_time: Some(start.to_string()),
        mode: Some(mode.to_string()),
        crumb_care: Some(Value::Bool(crumb)),
        grease_care: Some(Value::Bool(grease)),
        water_care: Some(Value::Bool(water)),
    };
    HistoryEvent::try_from(record.clone())?;

    store.insert_history(config.device(), vec![record]).await?;
    println!("Recorded {} session at {} for {}.", mode, start, config.device());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_history_file() {
        let json = r#"[
            {"id": "h1", "start_time": "2025-01-05T09:00:00+09:00", "mode": "습식 모드", "crumb_care": true},
            {"id": "h2", "startTime": "2025-01-06T10:00:00+09:00", "mode": "건식 모드", "기름때 집중 케어": 1},
            {"id": "h3"}
        ]"#;
        let parsed = parse_history_file(json).unwrap();
        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.rejected, 0);
        assert_eq!(parsed.records[1].grease_care, Some(serde_json::json!(1)));
        assert!(parsed.records[2].start_time.is_none());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_history_file(r#"{"id": "h1"}"#).is_err());
    }

    #[test]
    fn test_wrong_typed_record_does_not_sink_the_file() {
        let json = r#"[
            {"id": "ok", "startTime": "2025-01-05T09:00:00+09:00", "mode": "습식 모드"},
            {"id": "bad", "startTime": 1736035200, "mode": "습식 모드"},
            {"id": "obj", "startTime": {"_seconds": 1736035200, "_nanoseconds": 0}, "mode": 1},
            42
        ]"#;
        let parsed = parse_history_file(json).unwrap();
        assert_eq!(parsed.records.len(), 3);
        assert_eq!(parsed.rejected, 1);
        assert_eq!(parsed.records[1].start_time.as_deref(), Some("1736035200"));

        let (events, skipped) = validate_records(parsed.records);
        assert_eq!(events.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[tokio::test]
    async fn test_import_mixed_file_stores_every_record() {
        let (handle, _server) = crate::store::spawn_store_server(crate::store::in_memory().unwrap());
        let config = Config::default();
        let json = r#"[
            {"id": "ok", "startTime": "2025-01-05T09:00:00+09:00", "mode": "습식 모드"},
            {"id": "bad", "startTime": 1736035200, "mode": "습식 모드"}
        ]"#;

        let summary = import_history(&config, &handle, json).await.unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                total: 2,
                inserted: 2,
                invalid: 1,
                rejected: 0
            }
        );

        let stored = handle.query_history(config.device()).await.unwrap();
        assert_eq!(stored.len(), 2);
        let bad = stored.iter().find(|r| r.id == "bad").unwrap();
        assert_eq!(bad.start_time.as_deref(), Some("1736035200"));
    }
}
