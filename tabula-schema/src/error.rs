//! Error types for catalog loading and validation.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while loading or validating descriptor catalogs.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(tabula::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid entity definition.
    #[error("invalid entity `{name}`: {message}")]
    #[diagnostic(code(tabula::schema::invalid_entity))]
    InvalidEntity { name: String, message: String },

    /// Invalid field descriptor.
    #[error("invalid field `{entity}.{field}`: {message}")]
    #[diagnostic(code(tabula::schema::invalid_field))]
    InvalidField {
        entity: String,
        field: String,
        message: String,
    },

    /// Invalid relation specification.
    #[error("invalid relation `{entity}.{field}`: {message}")]
    #[diagnostic(
        code(tabula::schema::invalid_relation),
        help("relation and location fields must declare `relation.target_entity`")
    )]
    InvalidRelation {
        entity: String,
        field: String,
        message: String,
    },

    /// A filter or search descriptor references a field the entity does not declare.
    #[error("{kind} descriptor on `{entity}` references unknown field `{field}`")]
    #[diagnostic(code(tabula::schema::unknown_field))]
    UnknownField {
        kind: String,
        entity: String,
        field: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} `{name}`")]
    #[diagnostic(code(tabula::schema::duplicate))]
    Duplicate { kind: String, name: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(tabula::schema::config_error))]
    ConfigError { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(tabula::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// JSON parsing error.
    #[error("failed to parse JSON")]
    #[diagnostic(code(tabula::schema::json_error))]
    JsonError {
        #[source]
        source: serde_json::Error,
    },

    /// Validation error with multiple issues.
    #[error("catalog validation failed with {count} error(s)")]
    #[diagnostic(code(tabula::schema::validation_failed))]
    ValidationFailed {
        count: usize,
        #[related]
        errors: Vec<SchemaError>,
    },
}

impl SchemaError {
    /// Create an invalid entity error.
    pub fn invalid_entity(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEntity {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid field error.
    pub fn invalid_field(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            entity: entity.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid relation error.
    pub fn invalid_relation(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRelation {
            entity: entity.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unknown field reference error.
    pub fn unknown_field(
        kind: impl Into<String>,
        entity: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self::UnknownField {
            kind: kind.into(),
            entity: entity.into(),
            field: field.into(),
        }
    }

    /// Create a duplicate definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
#[allow(unused_assignments)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_error() {
        let err = SchemaError::invalid_field("orders", "total", "invalid kind");

        match err {
            SchemaError::InvalidField {
                entity,
                field,
                message,
            } => {
                assert_eq!(entity, "orders");
                assert_eq!(field, "total");
                assert_eq!(message, "invalid kind");
            }
            _ => panic!("Expected InvalidField"),
        }
    }

    #[test]
    fn test_invalid_relation_display() {
        let err = SchemaError::invalid_relation("orders", "customer", "missing target");
        let display = format!("{}", err);
        assert!(display.contains("orders.customer"));
        assert!(display.contains("missing target"));
    }

    #[test]
    fn test_unknown_field_display() {
        let err = SchemaError::unknown_field("filter", "orders", "shipped_at");
        let display = format!("{}", err);
        assert!(display.contains("filter descriptor"));
        assert!(display.contains("shipped_at"));
    }

    #[test]
    fn test_duplicate_display() {
        let err = SchemaError::duplicate("field", "orders.status");
        let display = format!("{}", err);
        assert!(display.contains("duplicate"));
        assert!(display.contains("orders.status"));
    }

    #[test]
    fn test_io_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = SchemaError::IoError {
            path: "catalog.toml".to_string(),
            source: io_err,
        };

        assert!(format!("{}", err).contains("catalog.toml"));
    }

    #[test]
    fn test_validation_failed_display() {
        let err = SchemaError::ValidationFailed {
            count: 3,
            errors: vec![],
        };
        assert!(format!("{}", err).contains("3"));
    }
}
