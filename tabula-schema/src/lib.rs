//! # tabula-schema
//!
//! Declarative entity catalogs for Tabula.
//!
//! This crate provides:
//! - Field, filter and advanced-search descriptor types
//! - Catalog loading from TOML or JSON
//! - Configuration parser for `tabula.toml` files
//! - Catalog validation
//!
//! ## Example
//!
//! ```rust,ignore
//! use tabula_schema::{SchemaCatalog, TabulaConfig, validate_catalog};
//!
//! let config = TabulaConfig::from_file("tabula.toml")?;
//! let catalog = validate_catalog(SchemaCatalog::from_file(&config.catalog.path)?)?;
//! let orders = catalog.get_entity("orders").unwrap();
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod validator;

pub use ast::*;
pub use config::{FilterConfig, TabulaConfig};
pub use error::{SchemaError, SchemaResult};
pub use validator::{Validator, validate_catalog};

/// Load a catalog from disk, validating it when the configuration asks for it.
pub fn load_catalog(config: &TabulaConfig) -> SchemaResult<SchemaCatalog> {
    let catalog = SchemaCatalog::from_file(&config.catalog.path)?;
    if config.catalog.validate {
        validate_catalog(catalog)
    } else {
        Ok(catalog)
    }
}
