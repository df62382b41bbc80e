//! Error types for filter compilation and update diffing with actionable messages.
//!
//! Filter compilation never fails: malformed parameters are logged and dropped.
//! The update-diff engine, by contrast, must be exact, so a proposed value that cannot
//! be coerced to its field's kind is reported instead of silently discarded.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: T{category}{number}
//! - 1xxx: Query errors (invalid filter, unknown entity)
//! - 6xxx: Data errors (coercion failures)
//! - 7xxx: Configuration errors
//! - 8xxx: Edit session errors
//!
//! ```rust
//! use tabula_query::{QueryError, ErrorCode};
//!
//! let err = QueryError::invalid_value("due_date", "date", "next tuesday");
//! assert_eq!(err.code, ErrorCode::InvalidDataType);
//! assert!(err.to_string().contains("due_date"));
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Query errors (1xxx)
    /// Invalid filter or where clause (T1003).
    InvalidFilter = 1003,
    /// Unknown entity (T1006).
    UnknownEntity = 1006,

    // Data errors (6xxx)
    /// Invalid data type (T6001).
    InvalidDataType = 6001,
    /// Identifier out of range (T6005).
    IdentifierOutOfRange = 6005,

    // Configuration errors (7xxx)
    /// Invalid configuration (T7001).
    InvalidConfiguration = 7001,

    // Session errors (8xxx)
    /// Operation not allowed in the current edit state (T8001).
    InvalidSessionState = 8001,
    /// Batch row without a primary key (T8002).
    MissingPrimaryKey = 8002,
}

impl ErrorCode {
    /// Get the error code string (e.g., "T6001").
    pub fn code(&self) -> String {
        format!("T{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InvalidFilter => "Invalid filter condition",
            Self::UnknownEntity => "Unknown entity",
            Self::InvalidDataType => "Invalid data type",
            Self::IdentifierOutOfRange => "Identifier out of range",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::InvalidSessionState => "Invalid edit session state",
            Self::MissingPrimaryKey => "Missing primary key",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The entity involved.
    pub entity: Option<String>,
    /// The field involved.
    pub field: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
}

/// Errors that can occur while compiling filters or computing updates.
#[derive(Error, Debug)]
pub struct QueryError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl QueryError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Set the entity.
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.context.entity = Some(entity.into());
        self
    }

    /// Set the field.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.context.field = Some(field.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// A proposed value that cannot be coerced to its field's kind.
    pub fn invalid_value(
        field: impl Into<String>,
        kind: impl fmt::Display,
        value: impl fmt::Display,
    ) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::InvalidDataType,
            format!("Cannot use `{}` as a {} value for {}", value, kind, field),
        )
        .with_field(&field)
    }

    /// A filter or search parameter that cannot be interpreted.
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFilter, message)
    }

    /// An identifier that does not fit a signed 64-bit column.
    pub fn identifier_out_of_range(field: impl Into<String>, value: impl fmt::Display) -> Self {
        let field = field.into();
        Self::new(
            ErrorCode::IdentifierOutOfRange,
            format!("Identifier {} for {} does not fit in 64 bits", value, field),
        )
        .with_field(&field)
    }

    /// An entity missing from the catalog.
    pub fn unknown_entity(entity: impl Into<String>) -> Self {
        let entity = entity.into();
        Self::new(ErrorCode::UnknownEntity, format!("Unknown entity `{}`", entity))
            .with_entity(&entity)
            .with_suggestion("Check that the entity is declared in the catalog")
    }

    /// An edit-session transition that is not allowed from the current state.
    pub fn invalid_session_state(operation: &str, state: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidSessionState,
            format!("Cannot {} while the edit session is {}", operation, state),
        )
        .with_context(operation)
    }

    /// A batch row without a primary key.
    pub fn missing_primary_key(index: usize, primary_key: &str) -> Self {
        Self::new(
            ErrorCode::MissingPrimaryKey,
            format!("Batch row {} has no `{}` value", index, primary_key),
        )
        .with_field(primary_key)
    }

    /// Check if this is a data coercion error.
    pub fn is_data_error(&self) -> bool {
        (self.code as u16) / 1000 == 6
    }
}

impl From<tabula_schema::SchemaError> for QueryError {
    fn from(err: tabula_schema::SchemaError) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, err.to_string())
            .with_suggestion("Check tabula.toml and the entity catalog")
            .with_source(err)
    }
}
