// tests/store_test.rs — Integration test: SQLite round-trip (history + predictions)

use cleanrec::recommend::job::BatchWrite;
use cleanrec::recommend::types::{DeviceRef, RawHistoryRecord, Recommendation};
use cleanrec::store::{self, Store};
use pretty_assertions::assert_eq;
use serde_json::json;

fn test_store() -> Store {
    store::in_memory().unwrap()
}

fn device() -> DeviceRef {
    DeviceRef::new("user-1", "WJ772")
}

fn record(id: &str, start: &str, mode: &str) -> RawHistoryRecord {
    RawHistoryRecord {
        id: id.into(),
        start_time: Some(start.into()),
        mode: Some(mode.into()),
        crumb_care: Some(json!(true)),
        grease_care: Some(json!(0)),
        water_care: None,
    }
}

fn rec(rank: usize, mode: &str, probability: f64) -> Recommendation {
    Recommendation {
        rank,
        mode: mode.into(),
        probability,
        weekday: 0,
        hour: 9,
        crumb_care: 1,
        grease_care: 0,
        water_care: 0,
    }
}

#[test]
fn test_insert_and_query_history() {
    let store = test_store();
    let d = device();

    assert!(store
        .insert_history_record(&d, &record("h1", "2025-01-05T09:00:00+09:00", "습식 모드"))
        .unwrap());
    assert!(store
        .insert_history_record(&d, &record("h2", "2025-01-06T09:00:00+09:00", "건식 모드"))
        .unwrap());

    let history = store.query_history(&d).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], record("h1", "2025-01-05T09:00:00+09:00", "습식 모드"));
    assert_eq!(store.count_history(&d).unwrap(), 2);
}

#[test]
fn test_duplicate_history_id_ignored() {
    let store = test_store();
    let d = device();
    let r = record("h1", "2025-01-05T09:00:00+09:00", "습식 모드");

    assert!(store.insert_history_record(&d, &r).unwrap());
    assert!(!store.insert_history_record(&d, &r).unwrap());
    assert_eq!(store.count_history(&d).unwrap(), 1);
}

#[test]
fn test_history_without_id_gets_one() {
    let store = test_store();
    let d = device();
    let mut r = record("", "2025-01-05T09:00:00+09:00", "습식 모드");
    r.id.clear();

    store.insert_history_record(&d, &r).unwrap();
    store.insert_history_record(&d, &r).unwrap();

    let history = store.query_history(&d).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|h| !h.id.is_empty()));
}

#[test]
fn test_history_is_scoped_to_device() {
    let store = test_store();
    let other = DeviceRef::new("user-1", "OTHER");

    store
        .insert_history_record(&device(), &record("h1", "2025-01-05T09:00:00Z", "표준 모드"))
        .unwrap();
    store
        .insert_history_record(&other, &record("h2", "2025-01-05T09:00:00Z", "표준 모드"))
        .unwrap();

    assert_eq!(store.query_history(&device()).unwrap().len(), 1);
    assert_eq!(store.query_history(&other).unwrap()[0].id, "h2");
}

#[test]
fn test_malformed_history_is_stored_verbatim() {
    let store = test_store();
    let d = device();
    let r = RawHistoryRecord {
        id: "broken".into(),
        start_time: None,
        mode: None,
        crumb_care: Some(json!("")),
        grease_care: None,
        water_care: Some(json!({"level": 2})),
    };
    store.insert_history_record(&d, &r).unwrap();
    assert_eq!(store.query_history(&d).unwrap(), vec![r]);
}

#[test]
fn test_write_batch_commits_all_rows() {
    let store = test_store();
    let d = device();
    let batch = vec![rec(1, "습식 모드", 0.6), rec(2, "건식 모드", 0.3)];

    let result = store
        .write_prediction_batch(&d, "weekly-2025-W02", &batch)
        .unwrap();
    assert_eq!(result, BatchWrite::Committed(2));

    let latest = store.query_latest_predictions(&d).unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].run_key, "weekly-2025-W02");
    assert_eq!(latest[0].recommendation, batch[0]);
    assert_eq!(latest[1].recommendation, batch[1]);
    assert!(!latest[0].timestamp.is_empty());
}

#[test]
fn test_write_batch_same_run_key_is_noop() {
    let store = test_store();
    let d = device();

    store
        .write_prediction_batch(&d, "weekly-2025-W02", &[rec(1, "습식 모드", 0.6)])
        .unwrap();
    let again = store
        .write_prediction_batch(
            &d,
            "weekly-2025-W02",
            &[rec(1, "표준 모드", 0.9), rec(2, "건식 모드", 0.1)],
        )
        .unwrap();

    assert_eq!(again, BatchWrite::AlreadyExists);
    let count: i64 = store
        .conn()
        .query_row("SELECT COUNT(*) FROM predictions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(store.count_prediction_runs(&d).unwrap(), 1);
}

#[test]
fn test_failed_batch_leaves_nothing_behind() {
    let store = test_store();
    let d = device();

    // Duplicate rank violates the unique constraint on the second insert.
    let result = store.write_prediction_batch(
        &d,
        "weekly-2025-W03",
        &[rec(1, "습식 모드", 0.5), rec(1, "건식 모드", 0.5)],
    );
    assert!(result.is_err());

    let count: i64 = store
        .conn()
        .query_row("SELECT COUNT(*) FROM predictions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
    assert!(store.query_latest_predictions(&d).unwrap().is_empty());
}

#[test]
fn test_latest_predictions_picks_newest_run() {
    let store = test_store();
    let d = device();

    store
        .write_prediction_batch(&d, "weekly-2025-W02", &[rec(1, "습식 모드", 0.6)])
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    store
        .write_prediction_batch(&d, "weekly-2025-W03", &[rec(1, "표준 모드", 0.7)])
        .unwrap();

    let latest = store.query_latest_predictions(&d).unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].run_key, "weekly-2025-W03");
    assert_eq!(latest[0].recommendation.mode, "표준 모드");
    assert_eq!(store.count_prediction_runs(&d).unwrap(), 2);
}

#[test]
fn test_latest_predictions_empty() {
    let store = test_store();
    assert!(store.query_latest_predictions(&device()).unwrap().is_empty());
}
