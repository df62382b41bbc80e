//! Predicate fragments for building WHERE clauses.
//!
//! A [`Filter`] is one composable condition targeting a storage column. Fragments render
//! two ways: as a Prisma-shaped JSON object (`{"status": "active"}`,
//! `{"total": {"gte": 10}}`, `{"OR": [...]}`) for query layers that speak that dialect,
//! and as parameterised SQL.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Timestamp layout used when a filter value is rendered as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// A filter value that can be used in comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
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
    /// Local timestamp with millisecond precision.
    DateTime(NaiveDateTime),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Render as a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => json!(i),
            Self::Float(f) => json!(f),
            Self::String(s) => Value::String(s.clone()),
            Self::DateTime(dt) => Value::String(dt.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A predicate fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// No filter (always true).
    #[default]
    None,

    /// Equals comparison.
    Equals(String, FilterValue),
    /// Not equals comparison.
    NotEquals(String, FilterValue),

    /// Inclusive range; absent bounds are open.
    Range {
        /// Target column.
        column: String,
        /// Lower bound (`>=`).
        gte: Option<FilterValue>,
        /// Upper bound (`<=`).
        lte: Option<FilterValue>,
    },

    /// Case-insensitive contains (ILIKE %value%).
    ContainsInsensitive(String, FilterValue),

    /// Is null check.
    IsNull(String),

    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
}

impl Filter {
    /// Check if this filter is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create an equality filter.
    pub fn equals(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::Equals(column.into(), value.into())
    }

    /// Create a range filter. Returns [`Filter::None`] when both bounds are absent.
    pub fn range(
        column: impl Into<String>,
        gte: Option<FilterValue>,
        lte: Option<FilterValue>,
    ) -> Self {
        if gte.is_none() && lte.is_none() {
            return Self::None;
        }
        Self::Range {
            column: column.into(),
            gte,
            lte,
        }
    }

    /// Create an AND filter. A single member is returned unwrapped.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.pop().unwrap_or_default(),
            _ => Self::And(filters),
        }
    }

    /// Create an OR filter. A single member is returned unwrapped.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.pop().unwrap_or_default(),
            _ => Self::Or(filters),
        }
    }

    /// Render as a Prisma-shaped JSON condition object.
    pub fn to_json(&self) -> Value {
        match self {
            Self::None => Value::Object(Map::new()),
            Self::Equals(col, val) => json!({ col: val.to_json() }),
            Self::NotEquals(col, val) => json!({ col: { "not": val.to_json() } }),
            Self::Range { column, gte, lte } => {
                let mut bounds = Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".into(), gte.to_json());
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".into(), lte.to_json());
                }
                json!({ column: bounds })
            }
            Self::ContainsInsensitive(col, val) => {
                json!({ col: { "contains": val.to_json(), "mode": "insensitive" } })
            }
            Self::IsNull(col) => json!({ col: null }),
            Self::And(filters) => {
                json!({ "AND": filters.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
            Self::Or(filters) => {
                json!({ "OR": filters.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
        }
    }

    /// Generate SQL for this filter with parameter placeholders.
    /// Returns (sql, params) where params are the values to bind.
    pub fn to_sql(&self, param_offset: usize) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let sql = self.to_sql_with_params(param_offset, &mut params);
        (sql, params)
    }

    fn to_sql_with_params(&self, offset: usize, params: &mut Vec<FilterValue>) -> String {
        let bind = |value: FilterValue, params: &mut Vec<FilterValue>| {
            params.push(value);
            format!("${}", offset + params.len())
        };

        match self {
            Self::None => "TRUE".to_string(),

            Self::Equals(col, val) => {
                if val.is_null() {
                    format!("{} IS NULL", col)
                } else {
                    format!("{} = {}", col, bind(val.clone(), params))
                }
            }
            Self::NotEquals(col, val) => {
                if val.is_null() {
                    format!("{} IS NOT NULL", col)
                } else {
                    format!("{} != {}", col, bind(val.clone(), params))
                }
            }

            Self::Range { column, gte, lte } => match (gte, lte) {
                (Some(gte), Some(lte)) => {
                    let low = bind(gte.clone(), params);
                    let high = bind(lte.clone(), params);
                    format!("({} >= {} AND {} <= {})", column, low, column, high)
                }
                (Some(gte), None) => format!("{} >= {}", column, bind(gte.clone(), params)),
                (None, Some(lte)) => format!("{} <= {}", column, bind(lte.clone(), params)),
                (None, None) => "TRUE".to_string(),
            },

            Self::ContainsInsensitive(col, val) => {
                format!("{} ILIKE {}", col, bind(like_pattern(val), params))
            }

            Self::IsNull(col) => format!("{} IS NULL", col),

            Self::And(filters) => {
                if filters.is_empty() {
                    return "TRUE".to_string();
                }
                let parts: Vec<_> = filters
                    .iter()
                    .map(|f| f.to_sql_with_params(offset, params))
                    .collect();
                format!("({})", parts.join(" AND "))
            }
            Self::Or(filters) => {
                if filters.is_empty() {
                    return "FALSE".to_string();
                }
                let parts: Vec<_> = filters
                    .iter()
                    .map(|f| f.to_sql_with_params(offset, params))
                    .collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

fn like_pattern(value: &FilterValue) -> FilterValue {
    match value {
        FilterValue::String(s) => FilterValue::String(format!("%{}%", s)),
        other => other.clone(),
    }
}
