//! Descriptor types for Tabula entity catalogs.
//!
//! These are pure data: every other component consumes them, none of them carry behavior
//! beyond lookups.

mod entity;
mod field;
mod filter;
mod schema;

pub use entity::*;
pub use field::*;
pub use filter::*;
pub use schema::*;
