//! The catalog of every administered entity.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::EntitySchema;
use crate::error::{SchemaError, SchemaResult};

/// All entity schemas known to the application, keyed by entity name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaCatalog {
    /// Entities in declaration order.
    #[serde(default)]
    pub entities: IndexMap<SmolStr, EntitySchema>,
}

impl SchemaCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a `.toml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Parse a catalog from TOML.
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        let catalog: Self =
            toml::from_str(content).map_err(|e| SchemaError::TomlError { source: e })?;
        Ok(catalog.with_entity_names())
    }

    /// Parse a catalog from JSON.
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        let catalog: Self =
            serde_json::from_str(content).map_err(|e| SchemaError::JsonError { source: e })?;
        Ok(catalog.with_entity_names())
    }

    fn with_entity_names(mut self) -> Self {
        for (key, entity) in &mut self.entities {
            if entity.name.is_empty() {
                entity.name = key.clone();
            }
        }
        self
    }

    /// Add an entity to the catalog.
    pub fn add_entity(&mut self, entity: EntitySchema) {
        self.entities.insert(entity.name.clone(), entity);
    }

    /// Builder form of [`SchemaCatalog::add_entity`].
    pub fn with_entity(mut self, entity: EntitySchema) -> Self {
        self.add_entity(entity);
        self
    }

    /// Get an entity by name.
    pub fn get_entity(&self, name: &str) -> Option<&EntitySchema> {
        self.entities.get(name)
    }

    /// Check if an entity is registered.
    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// Get all entity names.
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldKind, FilterKind, SearchKind};
    use pretty_assertions::assert_eq;

    const CATALOG: &str = r#"
        [entities.customers]
        fields = [
            { key = "name", kind = "text" },
        ]

        [entities.orders]
        filters = [
            { field = "status", kind = "select" },
            { field = "created_at", kind = "date_range" },
        ]
        search = [
            { field = "status", kind = "select" },
        ]

        [[entities.orders.fields]]
        key = "status"
        kind = "select"
        options = [{ value = "active", label = "Active" }, { value = "closed", label = "Closed" }]

        [[entities.orders.fields]]
        key = "customer"
        kind = "relation"
        relation = { target_entity = "customers", display_field = "name" }

        [[entities.orders.fields]]
        key = "created_at"
        kind = "datetime"
    "#;

    #[test]
    fn test_parse_toml_catalog() {
        let catalog = SchemaCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.entity_names().collect::<Vec<_>>(), vec!["customers", "orders"]);

        let orders = catalog.get_entity("orders").unwrap();
        assert_eq!(orders.name(), "orders");
        assert_eq!(orders.get_field("created_at").unwrap().kind, FieldKind::Datetime);
        assert_eq!(orders.filters[1].kind, FilterKind::DateRange);
        assert_eq!(orders.search[0].kind, SearchKind::Select);
        assert!(orders.get_field("status").unwrap().has_fixed_options());
    }

    #[test]
    fn test_parse_json_catalog() {
        let catalog = SchemaCatalog::from_json_str(
            r#"{"entities": {"carriers": {"fields": [{"key": "scac", "kind": "text"}]}}}"#,
        )
        .unwrap();
        assert!(catalog.has_entity("carriers"));
        assert_eq!(catalog.get_entity("carriers").unwrap().name(), "carriers");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let result = SchemaCatalog::from_toml_str("[entities.orders]\nfields = 3");
        assert!(matches!(result, Err(SchemaError::TomlError { .. })));
    }
}
