//! Multi-row batch edits.
//!
//! A batch form starts blank and applies the same proposed values to every selected
//! row. A field left empty (or cleared to null) means "leave unchanged", not "clear".
//!
//! ```rust
//! use serde_json::json;
//! use tabula_query::batch::compute_batch_update;
//! use tabula_schema::{EntitySchema, FieldDescriptor, FieldKind};
//!
//! let orders = EntitySchema::new("orders")
//!     .field(FieldDescriptor::new("status", FieldKind::Select));
//!
//! let rows = vec![
//!     json!({ "id": 1, "status": "open" }).as_object().cloned().unwrap(),
//!     json!({ "id": 2, "status": "closed" }).as_object().cloned().unwrap(),
//! ];
//! let proposed = json!({ "status": "closed" }).as_object().cloned().unwrap();
//!
//! let batch = compute_batch_update(&rows, &proposed, &orders).unwrap();
//! assert_eq!(batch.rows.len(), 1);
//! assert_eq!(batch.unchanged.len(), 1);
//! ```

use serde_json::Value;
use tabula_schema::EntitySchema;
use tracing::debug;

use crate::diff::{DiffEngine, Record, UpdatePlan};
use crate::error::{QueryError, QueryResult};
use crate::filter::FilterValue;

/// The update for one row of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    /// Primary-key value of the row.
    pub key: FilterValue,
    /// Changes for this row.
    pub plan: UpdatePlan,
}

/// The outcome of a batch edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchUpdate {
    /// Rows that need an update, in input order.
    pub rows: Vec<RowUpdate>,
    /// Primary keys of rows the edit does not change.
    pub unchanged: Vec<FilterValue>,
}

impl BatchUpdate {
    /// Check if no row changes.
    pub fn is_noop(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows that change.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no row updates.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render one parameterised `UPDATE` per changed row.
    pub fn to_sql(&self, table: &str, primary_key: &str) -> Vec<(String, Vec<FilterValue>)> {
        self.rows
            .iter()
            .filter_map(|row| row.plan.to_sql(table, primary_key, row.key.clone()))
            .collect()
    }
}

impl<'a> DiffEngine<'a> {
    /// Apply `proposed` to every row in `rows`.
    ///
    /// Fails if a row lacks its primary key or a proposed value cannot be coerced.
    pub fn compute_batch(&self, rows: &[Record], proposed: &Record) -> QueryResult<BatchUpdate> {
        let proposed: Record = proposed
            .iter()
            .filter(|(_, value)| !is_blank(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let mut batch = BatchUpdate::default();
        for (index, row) in rows.iter().enumerate() {
            let key = row
                .get(self.primary_key())
                .filter(|v| !v.is_null())
                .map(primary_key_value)
                .ok_or_else(|| {
                    QueryError::missing_primary_key(index, self.primary_key())
                        .with_entity(self.entity().name())
                })?;

            let plan = self.compute(row, &proposed)?;
            if plan.is_noop() {
                batch.unchanged.push(key);
            } else {
                batch.rows.push(RowUpdate { key, plan });
            }
        }

        debug!(
            entity = %self.entity().name(),
            rows = rows.len(),
            changed = batch.rows.len(),
            "computed batch update"
        );
        Ok(batch)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn primary_key_value(value: &Value) -> FilterValue {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => FilterValue::Int(i),
            None => FilterValue::String(n.to_string()),
        },
        Value::String(s) => FilterValue::String(s.clone()),
        Value::Bool(b) => FilterValue::Bool(*b),
        other => FilterValue::String(other.to_string()),
    }
}

/// Apply `proposed` to every row with default options.
pub fn compute_batch_update(
    rows: &[Record],
    proposed: &Record,
    entity: &EntitySchema,
) -> QueryResult<BatchUpdate> {
    DiffEngine::new(entity).compute_batch(rows, proposed)
}
