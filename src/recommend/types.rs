// src/recommend/types.rs — Domain types for history events and recommendations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label used when a stored mode is not one of the known modes.
pub const UNKNOWN_MODE_LABEL: &str = "알 수 없는 모드";

/// Encoded value for a mode label outside the known enumeration.
pub const UNKNOWN_MODE_CODE: i8 = -1;

/// Cleaning modes the device firmware reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleaningMode {
    SmartCare,
    Wet,
    Dry,
    Standard,
}

impl CleaningMode {
    pub const ALL: [CleaningMode; 4] = [Self::SmartCare, Self::Wet, Self::Dry, Self::Standard];

    /// The label as stored in history records and persisted predictions.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SmartCare => "스마트 케어 모드",
            Self::Wet => "습식 모드",
            Self::Dry => "건식 모드",
            Self::Standard => "표준 모드",
        }
    }

    pub fn code(&self) -> i8 {
        match self {
            Self::SmartCare => 0,
            Self::Wet => 1,
            Self::Dry => 2,
            Self::Standard => 3,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }

    pub fn from_code(code: i8) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }
}

/// The device whose history is analyzed and whose predictions are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRef {
    pub user_id: String,
    pub device_id: String,
}

impl DeviceRef {
    pub fn new(user_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            device_id: device_id.into(),
        }
    }
}

impl std::fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user_id, self.device_id)
    }
}

/// A history record as it comes out of the store, before validation.
///
/// Care values are kept as loose JSON because upstream writers have stored
/// booleans, numbers and strings for the same field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHistoryRecord {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: String,
    #[serde(default, alias = "startTime", deserialize_with = "loose_text")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    pub mode: Option<String>,
    #[serde(default, alias = "부스러기 집중 케어", alias = "crumbCare")]
    pub crumb_care: Option<serde_json::Value>,
    #[serde(default, alias = "기름때 집중 케어", alias = "greaseCare")]
    pub grease_care: Option<serde_json::Value>,
    #[serde(default, alias = "물때 집중 케어", alias = "waterCare")]
    pub water_care: Option<serde_json::Value>,
}

/// Text field that tolerates any JSON type. Strings pass through, null is
/// absent, and anything else keeps its JSON text so the record can still be
/// stored and rejected on its own during validation.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde_json::Value;

    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(loose_text(deserializer)?.unwrap_or_default())
}

/// Why a single history record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    #[error("record '{id}' has an unparseable start time '{value}'")]
    InvalidTimestamp { id: String, value: String },
}

/// One validated cleaning session.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEvent {
    pub start_time: DateTime<Utc>,
    pub mode: String,
    pub crumb_care: bool,
    pub grease_care: bool,
    pub water_care: bool,
}

impl TryFrom<RawHistoryRecord> for HistoryEvent {
    type Error = RecordError;

    fn try_from(raw: RawHistoryRecord) -> Result<Self, Self::Error> {
        let start = raw.start_time.ok_or_else(|| RecordError::MissingField {
            id: raw.id.clone(),
            field: "start_time",
        })?;
        let start_time = DateTime::parse_from_rfc3339(start.trim())
            .map_err(|_| RecordError::InvalidTimestamp {
                id: raw.id.clone(),
                value: start.clone(),
            })?
            .with_timezone(&Utc);
        let mode = raw.mode.ok_or_else(|| RecordError::MissingField {
            id: raw.id.clone(),
            field: "mode",
        })?;

        Ok(Self {
            start_time,
            mode,
            crumb_care: is_truthy(raw.crumb_care.as_ref()),
            grease_care: is_truthy(raw.grease_care.as_ref()),
            water_care: is_truthy(raw.water_care.as_ref()),
        })
    }
}

/// Loose truthiness for stored care values: null, false, 0, NaN and the
/// empty string are false, everything else is true.
pub fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Discrete features of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedEvent {
    /// 0 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub mode_code: i8,
    pub crumb_care: u8,
    pub grease_care: u8,
    pub water_care: u8,
}

impl EncodedEvent {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            mode_code: self.mode_code,
            crumb_care: self.crumb_care,
            grease_care: self.grease_care,
            water_care: self.water_care,
            weekday: self.weekday,
            hour: self.hour,
        }
    }
}

/// Six-feature signature shared by all sessions in a group.
///
/// Field order defines the derived ordering, which is used as the
/// tie-break when two groups have the same count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub mode_code: i8,
    pub crumb_care: u8,
    pub grease_care: u8,
    pub water_care: u8,
    pub weekday: u8,
    pub hour: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupStat {
    pub key: GroupKey,
    pub count: usize,
}

/// Mean of each care flag across all sessions of one mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CareAverages {
    pub crumb_care: f64,
    pub grease_care: f64,
    pub water_care: f64,
    pub sessions: usize,
}

/// Per-mode care averages keyed by mode code.
pub type ModeCareStats = std::collections::BTreeMap<i8, CareAverages>;

/// A ranked cleaning-setting recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rank: usize,
    pub mode: String,
    pub probability: f64,
    pub weekday: u8,
    pub hour: u8,
    pub crumb_care: u8,
    pub grease_care: u8,
    pub water_care: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(id: &str) -> RawHistoryRecord {
        RawHistoryRecord {
            id: id.into(),
            start_time: Some("2025-01-05T09:15:00+09:00".into()),
            mode: Some("습식 모드".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_mode_label_code_roundtrip() {
        for mode in CleaningMode::ALL {
            assert_eq!(CleaningMode::from_label(mode.label()), Some(mode));
            assert_eq!(CleaningMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(CleaningMode::from_label("turbo"), None);
        assert_eq!(CleaningMode::from_code(UNKNOWN_MODE_CODE), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("yes"))));
        assert!(is_truthy(Some(&json!("false"))));
        assert!(is_truthy(Some(&json!([]))));
    }

    #[test]
    fn test_valid_record_converts() {
        let mut r = raw("a");
        r.crumb_care = Some(json!(true));
        r.water_care = Some(json!(""));
        let event = HistoryEvent::try_from(r).unwrap();
        assert_eq!(event.mode, "습식 모드");
        assert!(event.crumb_care);
        assert!(!event.grease_care);
        assert!(!event.water_care);
        assert_eq!(event.start_time.to_rfc3339(), "2025-01-05T00:15:00+00:00");
    }

    #[test]
    fn test_missing_start_time() {
        let mut r = raw("b");
        r.start_time = None;
        assert_eq!(
            HistoryEvent::try_from(r),
            Err(RecordError::MissingField {
                id: "b".into(),
                field: "start_time"
            })
        );
    }

    #[test]
    fn test_bad_start_time() {
        let mut r = raw("c");
        r.start_time = Some("yesterday".into());
        assert!(matches!(
            HistoryEvent::try_from(r),
            Err(RecordError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_missing_mode() {
        let mut r = raw("d");
        r.mode = None;
        let err = HistoryEvent::try_from(r).unwrap_err();
        assert_eq!(err.to_string(), "record 'd' is missing required field 'mode'");
    }

    #[test]
    fn test_raw_record_accepts_original_field_names() {
        let r: RawHistoryRecord = serde_json::from_value(json!({
            "id": "e",
            "startTime": "2025-01-05T09:15:00Z",
            "mode": "건식 모드",
            "부스러기 집중 케어": true,
            "물때 집중 케어": 1
        }))
        .unwrap();
        assert_eq!(r.start_time.as_deref(), Some("2025-01-05T09:15:00Z"));
        assert_eq!(r.crumb_care, Some(json!(true)));
        assert_eq!(r.grease_care, None);
        assert_eq!(r.water_care, Some(json!(1)));
    }

    #[test]
    fn test_wrong_typed_fields_still_deserialize() {
        let r: RawHistoryRecord = serde_json::from_value(json!({
            "id": 17,
            "startTime": 1736035200,
            "mode": {"code": 1}
        }))
        .unwrap();
        assert_eq!(r.id, "17");
        assert_eq!(r.start_time.as_deref(), Some("1736035200"));
        assert_eq!(r.mode.as_deref(), Some(r#"{"code":1}"#));

        let err = HistoryEvent::try_from(r).unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidTimestamp {
                id: "17".into(),
                value: "1736035200".into()
            }
        );
    }

    #[test]
    fn test_null_fields_are_absent() {
        let r: RawHistoryRecord =
            serde_json::from_value(json!({"id": null, "startTime": null, "mode": null})).unwrap();
        assert_eq!(r, RawHistoryRecord::default());
    }

    #[test]
    fn test_group_key_orders_by_mode_first() {
        let a = GroupKey {
            mode_code: 0,
            crumb_care: 1,
            grease_care: 1,
            water_care: 1,
            weekday: 6,
            hour: 23,
        };
        let b = GroupKey {
            mode_code: 1,
            crumb_care: 0,
            grease_care: 0,
            water_care: 0,
            weekday: 0,
            hour: 0,
        };
        assert!(a < b);
    }
}
