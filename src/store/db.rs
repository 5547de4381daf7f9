// src/store/db.rs — SQLite operations

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::recommend::job::BatchWrite;
use crate::recommend::types::{DeviceRef, RawHistoryRecord, Recommendation};

/// Low-level SQLite operations for history and predictions.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    // -- Cleaning history --

    /// Insert one history record. Returns `false` when a record with the same
    /// id already exists; records without an id get a fresh one.
    pub fn insert_history_record(
        &self,
        device: &DeviceRef,
        record: &RawHistoryRecord,
    ) -> anyhow::Result<bool> {
        let now = Utc::now().to_rfc3339();
        let id = if record.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            record.id.clone()
        };

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO clean_history (id, user_id, device_id, start_time, mode,
             crumb_care, grease_care, water_care, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                device.user_id,
                device.device_id,
                record.start_time,
                record.mode,
                care_to_sql(record.crumb_care.as_ref()),
                care_to_sql(record.grease_care.as_ref()),
                care_to_sql(record.water_care.as_ref()),
                now
            ],
        )?;
        Ok(inserted > 0)
    }

    pub fn query_history(&self, device: &DeviceRef) -> anyhow::Result<Vec<RawHistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, start_time, mode, crumb_care, grease_care, water_care
             FROM clean_history WHERE user_id = ?1 AND device_id = ?2
             ORDER BY start_time",
        )?;

        let rows = stmt.query_map(params![device.user_id, device.device_id], |row| {
            Ok(RawHistoryRecord {
                id: row.get(0)?,
                start_time: row.get(1)?,
                mode: row.get(2)?,
                crumb_care: care_from_sql(row.get(3)?),
                grease_care: care_from_sql(row.get(4)?),
                water_care: care_from_sql(row.get(5)?),
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn count_history(&self, device: &DeviceRef) -> anyhow::Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM clean_history WHERE user_id = ?1 AND device_id = ?2",
            params![device.user_id, device.device_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    // -- Predictions --

    /// Store one run's recommendations in a single transaction.
    ///
    /// If any prediction already exists for `(device, run_key)` nothing is
    /// written and [`BatchWrite::AlreadyExists`] is returned.
    pub fn write_prediction_batch(
        &self,
        device: &DeviceRef,
        run_key: &str,
        recommendations: &[Recommendation],
    ) -> anyhow::Result<BatchWrite> {
        let tx = self.conn.unchecked_transaction()?;

        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM predictions
             WHERE user_id = ?1 AND device_id = ?2 AND run_key = ?3",
            params![device.user_id, device.device_id, run_key],
            |r| r.get(0),
        )?;
        if existing > 0 {
            return Ok(BatchWrite::AlreadyExists);
        }

        let now = Utc::now().to_rfc3339();
        for rec in recommendations {
            tx.execute(
                "INSERT INTO predictions (id, user_id, device_id, run_key, rank, mode,
                 probability, weekday, hour, crumb_care, grease_care, water_care, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    Uuid::new_v4().to_string(),
                    device.user_id,
                    device.device_id,
                    run_key,
                    rec.rank as i64,
                    rec.mode,
                    rec.probability,
                    rec.weekday,
                    rec.hour,
                    rec.crumb_care,
                    rec.grease_care,
                    rec.water_care,
                    now
                ],
            )?;
        }
        tx.commit()?;

        Ok(BatchWrite::Committed(recommendations.len()))
    }

    /// Predictions from the most recently written run for a device.
    pub fn query_latest_predictions(
        &self,
        device: &DeviceRef,
    ) -> anyhow::Result<Vec<PredictionRow>> {
        let latest_key: Option<String> = self
            .conn
            .query_row(
                "SELECT run_key FROM predictions
                 WHERE user_id = ?1 AND device_id = ?2
                 ORDER BY timestamp DESC, run_key DESC LIMIT 1",
                params![device.user_id, device.device_id],
                |r| r.get(0),
            )
            .optional()?;

        let Some(run_key) = latest_key else {
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, run_key, rank, mode, probability, weekday, hour,
             crumb_care, grease_care, water_care, timestamp
             FROM predictions
             WHERE user_id = ?1 AND device_id = ?2 AND run_key = ?3
             ORDER BY rank",
        )?;

        let rows = stmt.query_map(params![device.user_id, device.device_id, run_key], |row| {
            Ok(PredictionRow {
                id: row.get(0)?,
                run_key: row.get(1)?,
                recommendation: Recommendation {
                    rank: row.get::<_, i64>(2)? as usize,
                    mode: row.get(3)?,
                    probability: row.get(4)?,
                    weekday: row.get(5)?,
                    hour: row.get(6)?,
                    crumb_care: row.get(7)?,
                    grease_care: row.get(8)?,
                    water_care: row.get(9)?,
                },
                timestamp: row.get(10)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    pub fn count_prediction_runs(&self, device: &DeviceRef) -> anyhow::Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(DISTINCT run_key) FROM predictions
             WHERE user_id = ?1 AND device_id = ?2",
            params![device.user_id, device.device_id],
            |r| r.get(0),
        )?;
        Ok(count)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Care values are stored as JSON text so their original shape survives.
fn care_to_sql(value: Option<&serde_json::Value>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn care_from_sql(text: Option<String>) -> Option<serde_json::Value> {
    text.map(|t| serde_json::from_str(&t).unwrap_or(serde_json::Value::String(t)))
}

// -- Row types --

#[derive(Debug, Clone)]
pub struct PredictionRow {
    pub id: String,
    pub run_key: String,
    pub recommendation: Recommendation,
    pub timestamp: String,
}
