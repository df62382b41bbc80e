//! Storage-column and value-type resolution for relation fields.

use std::fmt;

use tabula_schema::{FieldDescriptor, FieldKind, FilterConfig};
use tracing::warn;

use crate::coerce::is_unsigned_integer;
use crate::filter::FilterValue;
use crate::options::FilterOptions;

/// Location keys whose storage column does not follow the `{key}_id` rule.
pub const LOCATION_ALIASES: &[(&str, &str)] = &[("destination_location", "location_id")];

/// Actor fields stored under their own name and holding user identifiers.
pub const ACTOR_FIELDS: &[&str] = &["created_by", "updated_by"];

/// A relation value after coercion to its storage column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationValue {
    /// Numeric identifier.
    Id(i64),
    /// Non-identifier value (for relations keyed by e.g. a code column).
    Text(String),
}

impl From<RelationValue> for FilterValue {
    fn from(value: RelationValue) -> Self {
        match value {
            RelationValue::Id(id) => FilterValue::Int(id),
            RelationValue::Text(text) => FilterValue::String(text),
        }
    }
}

impl fmt::Display for RelationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Resolves which column a relation field is stored under and what its values look like.
#[derive(Debug, Clone)]
pub struct RelationResolver {
    primary_key: String,
    all_sentinel: String,
}

impl Default for RelationResolver {
    fn default() -> Self {
        let FilterConfig {
            primary_key,
            all_sentinel,
            ..
        } = FilterConfig::default();
        Self {
            primary_key,
            all_sentinel,
        }
    }
}

impl RelationResolver {
    /// Create a resolver using the primary-key name and `all` sentinel from `options`.
    pub fn new(options: &FilterOptions) -> Self {
        Self {
            primary_key: options.primary_key.clone(),
            all_sentinel: options.all_sentinel.clone(),
        }
    }

    /// The storage column for `field`.
    ///
    /// Named overrides are consulted first; the general rules never infer them.
    pub fn resolve_storage_field(&self, field: &FieldDescriptor) -> String {
        let key = field.key();

        if field.kind == FieldKind::Location {
            return match LOCATION_ALIASES.iter().find(|(alias, _)| *alias == key) {
                Some((_, column)) => (*column).to_string(),
                None => format!("{}_id", key),
            };
        }

        if field.kind != FieldKind::Relation {
            return key.to_string();
        }

        let spec = field.relation.as_ref();
        if let Some(storage) = spec.and_then(|s| s.storage_field.as_ref()) {
            return storage.to_string();
        }

        if self.is_actor_field(key) {
            return key.to_string();
        }

        let value_field = spec
            .and_then(|s| s.value_field.as_deref())
            .unwrap_or(self.primary_key.as_str());

        if value_field == self.primary_key {
            if key.ends_with("_id") {
                key.to_string()
            } else {
                format!("{}_id", key)
            }
        } else {
            value_field.to_string()
        }
    }

    /// Convert a raw parameter value for `column` into its stored type.
    ///
    /// Returns `None` for empty and `all` values, and for identifier columns whose value
    /// is not an unsigned integer. Never fails.
    pub fn coerce_relation_value(&self, raw: &str, column: &str) -> Option<RelationValue> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(&self.all_sentinel) {
            return None;
        }

        if !self.is_identifier_column(column) {
            return Some(RelationValue::Text(raw.to_string()));
        }

        if !is_unsigned_integer(raw) {
            warn!(column = %column, value = %raw, "relation value is not an identifier");
            return None;
        }

        match raw.parse::<i64>() {
            Ok(id) => Some(RelationValue::Id(id)),
            Err(_) => {
                warn!(column = %column, value = %raw, "relation identifier out of range");
                None
            }
        }
    }

    /// Check if `column` holds numeric identifiers.
    pub fn is_identifier_column(&self, column: &str) -> bool {
        column.ends_with("_id") || column == self.primary_key || self.is_actor_field(column)
    }

    fn is_actor_field(&self, key: &str) -> bool {
        ACTOR_FIELDS.contains(&key)
    }
}

/// Resolve the storage column for `field` with default options.
pub fn resolve_storage_field(field: &FieldDescriptor) -> String {
    RelationResolver::default().resolve_storage_field(field)
}

/// Coerce a raw relation value for `column` with default options.
pub fn coerce_relation_value(raw: &str, column: &str) -> Option<RelationValue> {
    RelationResolver::default().coerce_relation_value(raw, column)
}
