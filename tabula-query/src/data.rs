//! Values written by an update.
//!
//! Unlike [`FilterValue`], a [`FieldValue`] remembers whether a string is a calendar day
//! or a timestamp, so a persistence layer can bind it with the right column type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::filter::FilterValue;

/// A field value that can be set in an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// Calendar day as `YYYY-MM-DD`.
    Date(String),
    /// Timestamp as an ISO 8601 string.
    DateTime(String),
    /// Structured JSON value (arrays, objects).
    Json(Value),
}

impl FieldValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Value::from(*f),
            Self::String(s) | Self::Date(s) | Self::DateTime(s) => Value::String(s.clone()),
            Self::Json(j) => j.clone(),
        }
    }

    /// Convert to a bindable [`FilterValue`].
    pub fn to_filter_value(&self) -> FilterValue {
        match self {
            Self::Null => FilterValue::Null,
            Self::Bool(b) => FilterValue::Bool(*b),
            Self::Int(i) => FilterValue::Int(*i),
            Self::Float(f) => FilterValue::Float(*f),
            Self::String(s) | Self::Date(s) | Self::DateTime(s) => FilterValue::String(s.clone()),
            Self::Json(j) => FilterValue::String(j.to_string()),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map(Self::Float).unwrap_or(Self::Json(Value::Number(n))),
            },
            Value::String(s) => Self::String(s),
            other => Self::Json(other),
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        value.clone().into()
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Self::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_value() {
        assert_eq!(FieldValue::from(json!(3)), FieldValue::Int(3));
        assert_eq!(FieldValue::from(json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(FieldValue::from(json!("x")), FieldValue::String("x".into()));
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from(json!([1, 2])), FieldValue::Json(json!([1, 2])));
    }

    #[test]
    fn test_option_into_null() {
        assert!(FieldValue::from(None::<i64>).is_null());
        assert_eq!(FieldValue::from(Some(4i64)), FieldValue::Int(4));
    }

    #[test]
    fn test_date_renders_as_string() {
        let value = FieldValue::Date("2024-03-05".into());
        assert_eq!(value.to_json(), json!("2024-03-05"));
        assert_eq!(value.to_filter_value(), FilterValue::String("2024-03-05".into()));
    }

    #[test]
    fn test_json_binds_as_text() {
        let value = FieldValue::Json(json!({ "a": 1 }));
        assert_eq!(value.to_filter_value(), FilterValue::String("{\"a\":1}".into()));
    }
}
