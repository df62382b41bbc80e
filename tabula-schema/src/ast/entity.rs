//! Entity definitions: one declarative schema per administered record type.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::{AdvancedSearchDescriptor, FieldDescriptor, FilterDescriptor};

/// The declarative description of one entity (customers, orders, carriers, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity name. Filled from the catalog key when omitted.
    #[serde(default)]
    pub name: SmolStr,
    /// Field catalog.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Quick filters shown above the list.
    #[serde(default)]
    pub filters: Vec<FilterDescriptor>,
    /// Advanced-search form fields.
    #[serde(default, alias = "advanced_search")]
    pub search: Vec<AdvancedSearchDescriptor>,
}

impl EntitySchema {
    /// Create a new empty entity.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the entity name as a string.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a field descriptor.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a quick-filter descriptor.
    pub fn filter(mut self, filter: FilterDescriptor) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an advanced-search descriptor.
    pub fn search(mut self, search: AdvancedSearchDescriptor) -> Self {
        self.search.push(search);
        self
    }

    /// Get a field descriptor by key.
    pub fn get_field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Check if the entity declares a field.
    pub fn has_field(&self, key: &str) -> bool {
        self.get_field(key).is_some()
    }

    /// Get all relation and location fields.
    pub fn relational_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_relational())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FieldKind, RelationSpec};

    #[test]
    fn test_builder_and_lookup() {
        let entity = EntitySchema::new("orders")
            .field(FieldDescriptor::new("status", FieldKind::Select))
            .field(FieldDescriptor::relation(
                "customer",
                RelationSpec::new("customers", "name"),
            ))
            .filter(FilterDescriptor::select("status"));

        assert_eq!(entity.name(), "orders");
        assert!(entity.has_field("status"));
        assert!(!entity.has_field("missing"));
        assert_eq!(entity.relational_fields().count(), 1);
        assert_eq!(entity.filters.len(), 1);
    }
}
