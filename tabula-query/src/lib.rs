//! # tabula-query
//!
//! Filter compilation and update diffing for configuration-driven admin tables.
//!
//! This crate turns declarative entity schemas (see `tabula-schema`) plus runtime input
//! into the two things a list/edit screen sends to its store:
//! - a `where` predicate compiled from quick filters (`filter_*` parameters) and
//!   advanced search (`advanced_*` parameters)
//! - a minimal, correctly typed update payload computed from a record and a user's edits
//!
//! Everything is synchronous and pure; schemas are borrowed immutably per call.
//!
//! ## Filters
//!
//! ```rust
//! use tabula_query::{FilterCompiler, QueryParams, WhereInput};
//! use tabula_schema::{EntitySchema, FieldDescriptor, FieldKind, FilterDescriptor, RelationSpec};
//!
//! let orders = EntitySchema::new("orders")
//!     .field(FieldDescriptor::new("status", FieldKind::Select))
//!     .field(FieldDescriptor::relation("customer", RelationSpec::new("customers", "name")))
//!     .filter(FilterDescriptor::select("status"))
//!     .filter(FilterDescriptor::select("customer"));
//!
//! let params = QueryParams::from_query_string("filter_status=open&filter_customer=42");
//! let mut where_input = WhereInput::new();
//! FilterCompiler::new(&orders).apply(&mut where_input, &params);
//!
//! let (sql, values) = where_input.into_filter().to_sql(0);
//! assert_eq!(sql, "(status = $1 AND customer_id = $2)");
//! assert_eq!(values.len(), 2);
//! ```
//!
//! ## Updates
//!
//! ```rust
//! use serde_json::json;
//! use tabula_query::{DiffEngine, Record};
//! use tabula_schema::{EntitySchema, FieldDescriptor, FieldKind};
//!
//! let orders = EntitySchema::new("orders")
//!     .field(FieldDescriptor::new("notes", FieldKind::Textarea));
//!
//! let original: Record = json!({ "id": 1, "notes": null }).as_object().cloned().unwrap();
//! let proposed: Record = json!({ "notes": "" }).as_object().cloned().unwrap();
//!
//! let plan = DiffEngine::new(&orders).compute(&original, &proposed).unwrap();
//! assert!(plan.is_noop());
//! ```
//!
//! ## Logging
//!
//! The crate emits `tracing` events: `debug` for each compiled fragment when
//! `log_fragments` is on, `warn` for each dropped parameter. See [`logging`] for the
//! `TABULA_*` environment variables.

pub mod batch;
pub mod coerce;
pub mod data;
pub mod diff;
pub mod error;
pub mod filter;
pub mod filter_compiler;
pub mod logging;
pub mod options;
pub mod params;
pub mod query;
pub mod relations;
pub mod search;
pub mod session;

pub use batch::{BatchUpdate, RowUpdate, compute_batch_update};
pub use data::FieldValue;
pub use diff::{DiffEngine, Record, UpdatePlan, compute_update};
pub use error::{ErrorCode, ErrorContext, QueryError, QueryResult};
pub use filter::{Filter, FilterValue};
pub use filter_compiler::{FilterCompiler, SelectSentinel, compile_filters};
pub use options::FilterOptions;
pub use params::QueryParams;
pub use query::{WhereInput, merge_fragments};
pub use relations::{RelationResolver, RelationValue, coerce_relation_value, resolve_storage_field};
pub use search::{
    AdvancedSearchComposer, GlobalLogic, apply_advanced_search, compile_advanced_search,
};
pub use session::{EditSession, EditState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::diff::{DiffEngine, Record, UpdatePlan};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::filter::{Filter, FilterValue};
    pub use crate::filter_compiler::FilterCompiler;
    pub use crate::params::QueryParams;
    pub use crate::query::WhereInput;
    pub use crate::search::{AdvancedSearchComposer, GlobalLogic};
    pub use crate::session::EditSession;
}
