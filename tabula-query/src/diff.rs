//! Update diffing and value coercion.
//!
//! [`DiffEngine`] compares a record's original values with the values a user proposed
//! and keeps only the fields that actually changed, coerced to the type their column
//! stores. Running it again over an untouched record yields an empty plan.
//!
//! ```rust
//! use serde_json::json;
//! use tabula_query::diff::{Record, compute_update};
//! use tabula_schema::{EntitySchema, FieldDescriptor, FieldKind};
//!
//! let orders = EntitySchema::new("orders")
//!     .field(FieldDescriptor::new("urgent", FieldKind::Boolean));
//!
//! let original: Record = json!({ "id": 1, "urgent": true }).as_object().cloned().unwrap();
//! let proposed: Record = json!({ "urgent": false }).as_object().cloned().unwrap();
//!
//! let plan = compute_update(&original, &proposed, &orders).unwrap();
//! assert_eq!(plan.to_json(), json!({ "urgent": false }));
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tabula_schema::{EntitySchema, FieldDescriptor, FieldKind};
use tracing::{debug, warn};

use crate::coerce::{
    DAY_FORMAT, Timestamp, coerce_bool, is_unsigned_integer, parse_day, stringify,
    timestamp_from_json,
};
use crate::data::FieldValue;
use crate::error::{QueryError, QueryResult};
use crate::filter::FilterValue;
use crate::options::FilterOptions;
use crate::relations::RelationResolver;

/// A record as a flat map of column or field key to JSON value.
pub type Record = Map<String, Value>;

/// The minimal set of column changes an edit produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePlan {
    /// Changed values keyed by storage column, in the order they were proposed.
    pub changes: IndexMap<String, FieldValue>,
}

impl UpdatePlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing changed. Callers treat this as a successful cancel.
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changed columns.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Check if the plan has no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Get the new value of a column.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.changes.get(column)
    }

    /// Render the changes as a JSON object, ready for an `update` call.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.changes
                .iter()
                .map(|(column, value)| (column.clone(), value.to_json()))
                .collect(),
        )
    }

    /// Render as a parameterised `UPDATE` statement. `None` for a no-op plan.
    pub fn to_sql(
        &self,
        table: &str,
        primary_key: &str,
        key: impl Into<FilterValue>,
    ) -> Option<(String, Vec<FilterValue>)> {
        if self.is_noop() {
            return None;
        }

        let mut params: Vec<FilterValue> = Vec::with_capacity(self.changes.len() + 1);
        let assignments: Vec<String> = self
            .changes
            .iter()
            .map(|(column, value)| {
                params.push(value.to_filter_value());
                format!("{} = ${}", column, params.len())
            })
            .collect();
        params.push(key.into());

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ${}",
            table,
            assignments.join(", "),
            primary_key,
            params.len()
        );
        Some((sql, params))
    }
}

/// Why a relation value could not become an identifier.
enum IdentifierError {
    Invalid,
    OutOfRange,
}

/// Computes update plans for one entity.
#[derive(Debug, Clone)]
pub struct DiffEngine<'a> {
    entity: &'a EntitySchema,
    options: FilterOptions,
    resolver: RelationResolver,
}

impl<'a> DiffEngine<'a> {
    /// Create an engine with default options.
    pub fn new(entity: &'a EntitySchema) -> Self {
        Self::with_options(entity, FilterOptions::default())
    }

    /// Create an engine with explicit options.
    pub fn with_options(entity: &'a EntitySchema, options: FilterOptions) -> Self {
        let resolver = RelationResolver::new(&options);
        Self {
            entity,
            options,
            resolver,
        }
    }

    /// The entity this engine diffs.
    pub fn entity(&self) -> &EntitySchema {
        self.entity
    }

    /// The primary-key column name.
    pub fn primary_key(&self) -> &str {
        &self.options.primary_key
    }

    /// Diff every proposed key against `original`.
    ///
    /// Keys absent from `proposed` are never touched. Fails on the first proposed value
    /// that cannot be coerced to its field's kind.
    pub fn compute(&self, original: &Record, proposed: &Record) -> QueryResult<UpdatePlan> {
        let mut plan = UpdatePlan::new();

        for (key, value) in proposed {
            let change = match self.entity.get_field(key) {
                Some(field) => self.diff_field(field, original, value),
                None => Ok(diff_default(key, original.get(key), value)),
            }
            .map_err(|e| e.with_entity(self.entity.name()).with_context("compute_update"))?;

            if let Some((column, new_value)) = change {
                plan.changes.insert(column, new_value);
            }
        }

        if self.options.log_fragments {
            debug!(
                entity = %self.entity.name(),
                proposed = proposed.len(),
                changed = plan.len(),
                "computed update plan"
            );
        }
        Ok(plan)
    }

    fn diff_field(
        &self,
        field: &FieldDescriptor,
        original: &Record,
        proposed: &Value,
    ) -> QueryResult<Option<(String, FieldValue)>> {
        let key = field.key();
        match field.kind {
            FieldKind::Boolean => Ok(diff_boolean(key, original.get(key), proposed)),
            FieldKind::Relation | FieldKind::Location => {
                self.diff_relation(field, original, proposed)
            }
            FieldKind::Date => diff_date(key, original.get(key), proposed),
            FieldKind::Datetime => diff_datetime(key, original.get(key), proposed),
            FieldKind::Textarea => Ok(diff_textarea(key, original.get(key), proposed)),
            FieldKind::Text | FieldKind::Number | FieldKind::Currency | FieldKind::Select => {
                Ok(diff_default(key, original.get(key), proposed))
            }
        }
    }

    fn diff_relation(
        &self,
        field: &FieldDescriptor,
        original: &Record,
        proposed: &Value,
    ) -> QueryResult<Option<(String, FieldValue)>> {
        let column = self.resolver.resolve_storage_field(field);
        if !self.resolver.is_identifier_column(&column) {
            let old = original.get(&column);
            return Ok(diff_relation_text(column, old, proposed));
        }

        let new_id = relation_identifier(Some(proposed)).map_err(|e| match e {
            IdentifierError::Invalid => {
                QueryError::invalid_value(field.key(), field.kind, display(proposed))
            }
            IdentifierError::OutOfRange => {
                QueryError::identifier_out_of_range(field.key(), display(proposed))
            }
        })?;

        let old_id = match relation_identifier(original.get(&column)) {
            Ok(id) => id,
            Err(_) => {
                warn!(
                    entity = %self.entity.name(),
                    column = %column,
                    "original relation value is not an identifier"
                );
                None
            }
        };

        if new_id == old_id {
            return Ok(None);
        }
        Ok(Some((column, FieldValue::from(new_id))))
    }
}

/// Relations keyed by a non-identifier column compare the trimmed text.
fn diff_relation_text(
    column: String,
    original: Option<&Value>,
    proposed: &Value,
) -> Option<(String, FieldValue)> {
    let normalize = |value: Option<&Value>| {
        Some(stringify(value).trim().to_string()).filter(|s| !s.is_empty())
    };
    let new = normalize(Some(proposed));
    (normalize(original) != new).then(|| (column, FieldValue::from(new)))
}

fn diff_boolean(
    key: &str,
    original: Option<&Value>,
    proposed: &Value,
) -> Option<(String, FieldValue)> {
    let new = coerce_bool(Some(proposed));
    (coerce_bool(original) != new).then(|| (key.to_string(), FieldValue::Bool(new)))
}

fn diff_date(
    key: &str,
    original: Option<&Value>,
    proposed: &Value,
) -> QueryResult<Option<(String, FieldValue)>> {
    let new = normalize_day(Some(proposed))
        .ok_or_else(|| QueryError::invalid_value(key, FieldKind::Date, display(proposed)))?;
    let old = normalize_day(original).unwrap_or_else(|| Some(stringify(original)));

    if new == old {
        return Ok(None);
    }
    Ok(Some((
        key.to_string(),
        new.map(FieldValue::Date).unwrap_or(FieldValue::Null),
    )))
}

fn diff_datetime(
    key: &str,
    original: Option<&Value>,
    proposed: &Value,
) -> QueryResult<Option<(String, FieldValue)>> {
    let new = normalize_timestamp(Some(proposed))
        .ok_or_else(|| QueryError::invalid_value(key, FieldKind::Datetime, display(proposed)))?;

    let unchanged = match (normalize_timestamp(original), &new) {
        (Some(Some(old)), Some(new)) => old.instant() == new.instant(),
        (Some(None), None) => true,
        _ => false,
    };
    if unchanged {
        return Ok(None);
    }
    Ok(Some((
        key.to_string(),
        new.map(|ts| FieldValue::DateTime(ts.to_iso_string()))
            .unwrap_or(FieldValue::Null),
    )))
}

fn diff_textarea(
    key: &str,
    original: Option<&Value>,
    proposed: &Value,
) -> Option<(String, FieldValue)> {
    let normalize = |value: Option<&Value>| Some(stringify(value)).filter(|s| !s.is_empty());
    let new = normalize(Some(proposed));
    (normalize(original) != new).then(|| (key.to_string(), FieldValue::from(new)))
}

fn diff_default(
    key: &str,
    original: Option<&Value>,
    proposed: &Value,
) -> Option<(String, FieldValue)> {
    (stringify(original) != stringify(Some(proposed)))
        .then(|| (key.to_string(), FieldValue::from(proposed)))
}

/// `""`, null, missing and zero all mean "no related record".
fn relation_identifier(value: Option<&Value>) -> Result<Option<i64>, IdentifierError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            if !is_unsigned_integer(s) {
                return Err(IdentifierError::Invalid);
            }
            match s.parse::<i64>() {
                Ok(0) => Ok(None),
                Ok(id) => Ok(Some(id)),
                Err(_) => Err(IdentifierError::OutOfRange),
            }
        }
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return match i {
                    0 => Ok(None),
                    i if i > 0 => Ok(Some(i)),
                    _ => Err(IdentifierError::Invalid),
                };
            }
            if n.as_u64().is_some() {
                return Err(IdentifierError::OutOfRange);
            }
            match n.as_f64() {
                Some(f) if f == 0.0 => Ok(None),
                Some(f) if f > 0.0 && f.fract() == 0.0 && f < i64::MAX as f64 => {
                    Ok(Some(f as i64))
                }
                _ => Err(IdentifierError::Invalid),
            }
        }
        Some(_) => Err(IdentifierError::Invalid),
    }
}

/// `Some(None)` for empty, `Some(Some(day))` for a parsed day, `None` when unparseable.
fn normalize_day(value: Option<&Value>) -> Option<Option<String>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) if s.trim().is_empty() => Some(None),
        Some(Value::String(s)) => {
            parse_day(s).map(|day| Some(day.format(DAY_FORMAT).to_string()))
        }
        Some(other) => timestamp_from_json(other)
            .map(|ts| Some(ts.local().date().format(DAY_FORMAT).to_string())),
    }
}

/// Same shape as [`normalize_day`], keeping full precision.
fn normalize_timestamp(value: Option<&Value>) -> Option<Option<Timestamp>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) if s.trim().is_empty() => Some(None),
        Some(other) => timestamp_from_json(other).map(Some),
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Diff `proposed` against `original` for `entity` with default options.
pub fn compute_update(
    original: &Record,
    proposed: &Record,
    entity: &EntitySchema,
) -> QueryResult<UpdatePlan> {
    DiffEngine::new(entity).compute(original, proposed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tabula_schema::RelationSpec;

    fn orders() -> EntitySchema {
        EntitySchema::new("orders")
            .field(FieldDescriptor::new("reference", FieldKind::Text))
            .field(FieldDescriptor::new("quantity", FieldKind::Number))
            .field(FieldDescriptor::new("urgent", FieldKind::Boolean))
            .field(FieldDescriptor::relation(
                "customer",
                RelationSpec::new("customers", "name"),
            ))
            .field(FieldDescriptor::new("destination_location", FieldKind::Location))
            .field(FieldDescriptor::new("due_on", FieldKind::Date))
            .field(FieldDescriptor::new("picked_at", FieldKind::Datetime))
            .field(FieldDescriptor::new("notes", FieldKind::Textarea))
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn original() -> Record {
        record(json!({
            "id": 10,
            "reference": "PO-1",
            "quantity": 5,
            "urgent": false,
            "customer": "Acme",
            "customer_id": 42,
            "location_id": 3,
            "due_on": "2024-03-05",
            "picked_at": "2024-03-05T10:00:00Z",
            "notes": null,
        }))
    }

    fn diff(proposed: Value) -> QueryResult<UpdatePlan> {
        compute_update(&original(), &record(proposed), &orders())
    }

    #[test]
    fn test_unchanged_values_are_noop() {
        let plan = diff(json!({
            "reference": "PO-1",
            "quantity": "5",
            "urgent": false,
            "customer": 42,
            "destination_location": "3",
            "due_on": "2024-03-05T08:30:00",
            "picked_at": "2024-03-05T12:00:00+02:00",
            "notes": "",
        }))
        .unwrap();
        assert!(plan.is_noop(), "unexpected changes: {:?}", plan.changes);
    }

    #[test]
    fn test_boolean_false_is_a_value() {
        let original = record(json!({ "urgent": true }));
        let plan =
            compute_update(&original, &record(json!({ "urgent": false })), &orders()).unwrap();
        assert_eq!(plan.to_json(), json!({ "urgent": false }));
    }

    #[test]
    fn test_boolean_coercion() {
        let plan = diff(json!({ "urgent": "1" })).unwrap();
        assert_eq!(plan.get("urgent"), Some(&FieldValue::Bool(true)));
        let plan = diff(json!({ "urgent": null })).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn test_relation_emitted_under_storage_column() {
        let plan = diff(json!({ "customer": "7", "destination_location": 9 })).unwrap();
        assert_eq!(plan.to_json(), json!({ "customer_id": 7, "location_id": 9 }));
    }

    #[test]
    fn test_relation_empty_and_zero_become_null() {
        for empty in [json!(""), json!(0), json!("0"), Value::Null] {
            let plan = diff(json!({ "customer": empty })).unwrap();
            assert_eq!(plan.get("customer_id"), Some(&FieldValue::Null));
        }
    }

    #[test]
    fn test_relation_invalid_is_an_error() {
        let err = diff(json!({ "customer": "Acme" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDataType);
        assert_eq!(err.context.field.as_deref(), Some("customer"));
        assert_eq!(err.context.entity.as_deref(), Some("orders"));

        let err = diff(json!({ "customer": "99999999999999999999" })).unwrap_err();
        assert_eq!(err.code, ErrorCode::IdentifierOutOfRange);
    }

    #[test]
    fn test_relation_keyed_by_code() {
        let currencies = EntitySchema::new("invoices").field(FieldDescriptor::relation(
            "currency",
            RelationSpec::new("currencies", "name").with_value_field("code"),
        ));
        let original = record(json!({ "id": 1, "code": "EUR" }));

        let plan =
            compute_update(&original, &record(json!({ "currency": " EUR " })), &currencies)
                .unwrap();
        assert!(plan.is_noop(), "unexpected changes: {:?}", plan.changes);

        let plan =
            compute_update(&original, &record(json!({ "currency": "USD" })), &currencies)
                .unwrap();
        assert_eq!(plan.to_json(), json!({ "code": "USD" }));

        let plan =
            compute_update(&original, &record(json!({ "currency": "" })), &currencies).unwrap();
        assert_eq!(plan.get("code"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_date_normalised_to_day() {
        let plan = diff(json!({ "due_on": "2024-04-01T15:00:00Z" })).unwrap();
        assert_eq!(plan.get("due_on"), Some(&FieldValue::Date("2024-04-01".into())));

        let plan = diff(json!({ "due_on": "" })).unwrap();
        assert_eq!(plan.get("due_on"), Some(&FieldValue::Null));

        assert!(diff(json!({ "due_on": "someday" })).is_err());
    }

    #[test]
    fn test_datetime_keeps_precision() {
        let plan = diff(json!({ "picked_at": "2024-03-05T10:00:00.250Z" })).unwrap();
        assert_eq!(
            plan.get("picked_at"),
            Some(&FieldValue::DateTime("2024-03-05T10:00:00.250Z".into()))
        );
    }

    #[test]
    fn test_textarea_empty_is_null() {
        let original = record(json!({ "notes": "Fragile" }));
        let plan = compute_update(&original, &record(json!({ "notes": "" })), &orders()).unwrap();
        assert_eq!(plan.get("notes"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_default_emits_proposed_as_given() {
        let plan = diff(json!({ "quantity": "6", "reference": "PO-2" })).unwrap();
        assert_eq!(plan.to_json(), json!({ "quantity": "6", "reference": "PO-2" }));
    }

    #[test]
    fn test_unknown_field_uses_default_rule() {
        let plan = diff(json!({ "priority": "high" })).unwrap();
        assert_eq!(plan.to_json(), json!({ "priority": "high" }));
    }

    #[test]
    fn test_update_sql() {
        let plan = diff(json!({ "reference": "PO-2", "customer": 7 })).unwrap();
        let (sql, params) = plan.to_sql("orders", "id", 10i64).unwrap();
        assert_eq!(
            sql,
            "UPDATE orders SET reference = $1, customer_id = $2 WHERE id = $3"
        );
        assert_eq!(
            params,
            vec![
                FilterValue::String("PO-2".into()),
                FilterValue::Int(7),
                FilterValue::Int(10)
            ]
        );
        assert!(UpdatePlan::new().to_sql("orders", "id", 10i64).is_none());
    }
}
