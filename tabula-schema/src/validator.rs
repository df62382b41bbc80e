//! Catalog validation.
//!
//! This module checks loaded catalogs for semantic correctness:
//! - Each entity is registered under its own name
//! - No duplicate field keys within an entity
//! - Relation and location fields carry a relation spec, other kinds do not
//! - Relation targets are registered entities
//! - Filter and search descriptors reference declared fields of a compatible kind

use std::collections::HashSet;

use crate::ast::*;
use crate::error::{SchemaError, SchemaResult};

/// Catalog validator.
#[derive(Debug)]
pub struct Validator {
    /// Collected validation errors.
    errors: Vec<SchemaError>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    /// Validate a catalog and return it, or every problem found.
    pub fn validate(&mut self, catalog: SchemaCatalog) -> SchemaResult<SchemaCatalog> {
        self.errors.clear();

        for (key, entity) in &catalog.entities {
            if key != &entity.name {
                self.errors.push(SchemaError::invalid_entity(
                    key.as_str(),
                    format!("registered under `{}` but named `{}`", key, entity.name),
                ));
            }
            self.validate_entity(entity, &catalog);
        }

        if self.errors.is_empty() {
            Ok(catalog)
        } else {
            tracing::debug!(count = self.errors.len(), "catalog validation failed");
            Err(SchemaError::ValidationFailed {
                count: self.errors.len(),
                errors: std::mem::take(&mut self.errors),
            })
        }
    }

    fn validate_entity(&mut self, entity: &EntitySchema, catalog: &SchemaCatalog) {
        let name = entity.name();
        let mut seen = HashSet::new();

        for field in &entity.fields {
            if !seen.insert(field.key.as_str()) {
                self.errors
                    .push(SchemaError::duplicate("field", format!("{}.{}", name, field.key)));
            }
            self.validate_field(name, field, catalog);
        }

        for filter in &entity.filters {
            self.validate_filter(entity, filter);
        }

        for search in &entity.search {
            self.validate_search(entity, search);
        }
    }

    fn validate_field(&mut self, entity: &str, field: &FieldDescriptor, catalog: &SchemaCatalog) {
        if field.key.is_empty() {
            self.errors
                .push(SchemaError::invalid_field(entity, "", "field key must not be empty"));
        }

        match (&field.kind, &field.relation) {
            (FieldKind::Relation, None) => {
                self.errors.push(SchemaError::invalid_relation(
                    entity,
                    field.key.as_str(),
                    "relation field has no relation spec",
                ));
            }
            (kind, Some(_)) if !kind.is_relational() => {
                self.errors.push(SchemaError::invalid_field(
                    entity,
                    field.key.as_str(),
                    format!("`{}` field must not carry a relation spec", kind),
                ));
            }
            (_, Some(spec)) => {
                if !catalog.has_entity(&spec.target_entity) {
                    self.errors.push(SchemaError::invalid_relation(
                        entity,
                        field.key.as_str(),
                        format!("target entity `{}` is not in the catalog", spec.target_entity),
                    ));
                }
            }
            // Location fields may omit the spec: their storage column is derived from the key.
            _ => {}
        }
    }

    fn validate_filter(&mut self, entity: &EntitySchema, filter: &FilterDescriptor) {
        for key in filter.target_fields() {
            let Some(field) = entity.get_field(key) else {
                self.errors
                    .push(SchemaError::unknown_field("filter", entity.name(), key));
                continue;
            };

            let compatible = match filter.kind {
                FilterKind::DateRange => field.kind.is_temporal(),
                FilterKind::NumberRange => field.kind.is_numeric(),
                FilterKind::Checkbox => field.kind == FieldKind::Boolean,
                FilterKind::Select => true,
            };
            if !compatible {
                self.errors.push(SchemaError::invalid_field(
                    entity.name(),
                    key,
                    format!(
                        "`{}` filter cannot target a `{}` field",
                        filter.kind.as_str(),
                        field.kind
                    ),
                ));
            }
        }
    }

    fn validate_search(&mut self, entity: &EntitySchema, search: &AdvancedSearchDescriptor) {
        if !entity.has_field(&search.field) {
            self.errors.push(SchemaError::unknown_field(
                "search",
                entity.name(),
                search.field.as_str(),
            ));
        }
    }
}

/// Validate a catalog, returning it unchanged on success.
pub fn validate_catalog(catalog: SchemaCatalog) -> SchemaResult<SchemaCatalog> {
    Validator::new().validate(catalog)
}
