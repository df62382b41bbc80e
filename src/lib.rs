//! # Tabula
//!
//! Declarative filters and edits for schema-driven admin backends.
//!
//! Every entity is described once, as data: its fields, the quick filters its list page
//! offers and its advanced-search form. Tabula provides:
//! - Catalog loading and validation from TOML or JSON (`tabula-schema`)
//! - Quick-filter and advanced-search compilation into a `where` predicate
//! - Relation-field resolution to storage columns
//! - Minimal, typed update payloads from inline and batch edits (`tabula-query`)
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tabula::prelude::*;
//!
//! let catalog = SchemaCatalog::from_toml_str(r#"
//! [[entities.orders.fields]]
//! key = "status"
//! kind = "select"
//!
//! [[entities.orders.fields]]
//! key = "urgent"
//! kind = "boolean"
//!
//! [[entities.orders.filters]]
//! field = "status"
//! kind = "select"
//! "#).unwrap();
//! let orders = catalog.get_entity("orders").unwrap();
//!
//! // List page
//! let params = QueryParams::from_query_string("filter_status=open");
//! let mut where_input = WhereInput::new();
//! FilterCompiler::new(orders).apply(&mut where_input, &params);
//! assert_eq!(where_input.to_json(), json!({ "status": "open" }));
//!
//! // Inline edit
//! let original: Record = json!({ "id": 1, "urgent": true }).as_object().cloned().unwrap();
//! let proposed: Record = json!({ "urgent": false }).as_object().cloned().unwrap();
//! let plan = DiffEngine::new(orders).compute(&original, &proposed).unwrap();
//! assert_eq!(plan.to_json(), json!({ "urgent": false }));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Entity catalogs, descriptors and configuration.
pub mod schema {
    pub use tabula_schema::*;
}

/// Filter compilation, advanced search and update diffing.
pub mod query {
    pub use tabula_query::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::query::prelude::*;
    pub use crate::schema::{
        EntitySchema, FieldDescriptor, FieldKind, FilterDescriptor, SchemaCatalog, TabulaConfig,
    };
}

// Re-export key types at the crate root
pub use query::{QueryError, WhereInput};
pub use schema::{SchemaCatalog, SchemaError};
