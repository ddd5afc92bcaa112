//! Value normalization for audit entries
//!
//! Task fields are heterogeneous (text, enums, dates, timestamps, ids). Every
//! field is lifted into a [`FieldValue`] so the classifier can compare them,
//! and [`format_value`] renders one into the canonical string stored in an
//! entry's `old_value`/`new_value` columns.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::Value;

use crate::models::{Priority, TaskStatus, UserId};

/// Canonical layout for dates and timestamps in `old_value`/`new_value`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single field value captured in a change snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    /// Records, lists and anything else with internal structure
    Structured(Value),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Raw (unformatted) JSON form, as kept in entry metadata
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Integer(i) => Value::from(*i),
            Self::Text(s) => Value::String(s.clone()),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::Timestamp(ts) => Value::String(ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Structured(v) => v.clone(),
        }
    }
}

/// Render a value into its canonical display string
///
/// Null stays null; booleans become `"true"`/`"false"`; structured values are
/// compact JSON; dates and timestamps use `YYYY-MM-DD HH:MM:SS` (a bare date
/// is taken at midnight); everything else is its natural string form.
pub fn format_value(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Null => None,
        FieldValue::Bool(b) => Some(if *b { "true" } else { "false" }.to_string()),
        FieldValue::Integer(i) => Some(i.to_string()),
        FieldValue::Text(s) => Some(s.clone()),
        FieldValue::Date(d) => d
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.format(DATETIME_FORMAT).to_string()),
        FieldValue::Timestamp(ts) => Some(ts.format(DATETIME_FORMAT).to_string()),
        FieldValue::Structured(Value::Null) => None,
        FieldValue::Structured(v) => Some(v.to_string()),
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<TaskStatus> for FieldValue {
    fn from(value: TaskStatus) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<Priority> for FieldValue {
    fn from(value: Priority) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<UserId> for FieldValue {
    fn from(value: UserId) -> Self {
        Self::Text(value.as_uuid().to_string())
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::String(s) => Self::Text(s),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Structured(Value::Number(n)),
            },
            other => Self::Structured(other),
        }
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_null_formats_to_none() {
        assert_eq!(format_value(&FieldValue::Null), None);
        assert_eq!(format_value(&FieldValue::from(None::<String>)), None);
    }

    #[test]
    fn test_bool_literals() {
        assert_eq!(format_value(&true.into()).as_deref(), Some("true"));
        assert_eq!(format_value(&false.into()).as_deref(), Some("false"));
    }

    #[test]
    fn test_structured_is_compact_json() {
        let value = FieldValue::Structured(json!({"tags": ["a", "b"], "n": 1}));
        assert_eq!(
            format_value(&value).as_deref(),
            Some(r#"{"n":1,"tags":["a","b"]}"#)
        );

        let list = FieldValue::from(json!([1, 2, 3]));
        assert_eq!(format_value(&list).as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_timestamp_layout() {
        let ts = Utc.with_ymd_and_hms(2026, 2, 11, 20, 50, 7).unwrap();
        assert_eq!(
            format_value(&ts.into()).as_deref(),
            Some("2026-02-11 20:50:07")
        );
    }

    #[test]
    fn test_date_taken_at_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            format_value(&date.into()).as_deref(),
            Some("2026-03-01 00:00:00")
        );
    }

    #[test]
    fn test_scalars_use_natural_form() {
        assert_eq!(format_value(&42i64.into()).as_deref(), Some("42"));
        assert_eq!(format_value(&"hello".into()).as_deref(), Some("hello"));
        assert_eq!(
            format_value(&TaskStatus::InProgress.into()).as_deref(),
            Some("in-progress")
        );
        assert_eq!(format_value(&Priority::High.into()).as_deref(), Some("high"));
    }

    #[test]
    fn test_raw_json_keeps_dates_short() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(FieldValue::from(date).to_json(), json!("2026-03-01"));
        assert_eq!(FieldValue::Null.to_json(), Value::Null);
    }

    #[test]
    fn test_from_json_value() {
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from(json!(7)), FieldValue::Integer(7));
        assert_eq!(FieldValue::from(json!("x")), FieldValue::Text("x".into()));
        assert!(matches!(
            FieldValue::from(json!(1.5)),
            FieldValue::Structured(_)
        ));
    }
}
