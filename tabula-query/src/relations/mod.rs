//! Relation field resolution.
//!
//! Relation and location fields are displayed by label but stored as a foreign key.
//! [`RelationResolver`] decides which column that key lives in and coerces raw
//! parameter values to the column's type.
//!
//! ## Example
//!
//! ```rust
//! use tabula_query::relations::{RelationResolver, RelationValue};
//! use tabula_schema::{FieldDescriptor, RelationSpec};
//!
//! let resolver = RelationResolver::default();
//! let customer = FieldDescriptor::relation("customer", RelationSpec::new("customers", "name"));
//!
//! let column = resolver.resolve_storage_field(&customer);
//! assert_eq!(column, "customer_id");
//! assert_eq!(
//!     resolver.coerce_relation_value("42", &column),
//!     Some(RelationValue::Id(42))
//! );
//! ```

mod resolver;

pub use resolver::{
    ACTOR_FIELDS, LOCATION_ALIASES, RelationResolver, RelationValue, coerce_relation_value,
    resolve_storage_field,
};
