//! Quick-filter and advanced-search descriptors.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// The control a quick filter is rendered as, which decides how its parameters are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Single value (or delimiter-joined set) read from `filter_<field>`.
    Select,
    /// Day range read from `filter_<field>_from` / `filter_<field>_to`.
    #[serde(alias = "dateRange")]
    DateRange,
    /// Numeric range read from `filter_<field>_min` / `filter_<field>_max`.
    #[serde(alias = "numberRange")]
    NumberRange,
    /// Boolean toggle read from `filter_<field>`.
    Checkbox,
}

impl FilterKind {
    /// Get the kind name as it appears in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::DateRange => "date_range",
            Self::NumberRange => "number_range",
            Self::Checkbox => "checkbox",
        }
    }

    /// Check if this filter reads a pair of bound parameters.
    pub fn is_range(&self) -> bool {
        matches!(self, Self::DateRange | Self::NumberRange)
    }
}

/// One user-facing filter control bound to one or more fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    /// Primary field key; also names the query parameters.
    pub field: SmolStr,
    /// Control kind.
    pub kind: FilterKind,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Fields this control applies to, combined with OR.
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "relatedFieldKeys")]
    pub related_fields: Vec<SmolStr>,
}

impl FilterDescriptor {
    /// Create a new filter descriptor.
    pub fn new(field: impl Into<SmolStr>, kind: FilterKind) -> Self {
        Self {
            field: field.into(),
            kind,
            label: None,
            related_fields: Vec::new(),
        }
    }

    /// Create a select filter.
    pub fn select(field: impl Into<SmolStr>) -> Self {
        Self::new(field, FilterKind::Select)
    }

    /// Create a date-range filter.
    pub fn date_range(field: impl Into<SmolStr>) -> Self {
        Self::new(field, FilterKind::DateRange)
    }

    /// Create a number-range filter.
    pub fn number_range(field: impl Into<SmolStr>) -> Self {
        Self::new(field, FilterKind::NumberRange)
    }

    /// Create a checkbox filter.
    pub fn checkbox(field: impl Into<SmolStr>) -> Self {
        Self::new(field, FilterKind::Checkbox)
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Apply this control to several fields at once.
    pub fn with_related_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.related_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The fields the compiled predicate targets.
    pub fn target_fields(&self) -> Vec<&str> {
        if self.related_fields.is_empty() {
            vec![self.field.as_str()]
        } else {
            self.related_fields.iter().map(SmolStr::as_str).collect()
        }
    }
}

/// How an advanced-search field interprets its parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    /// Case-insensitive substring.
    Text,
    /// Exact number.
    Number,
    /// Exact day.
    Date,
    /// Exact timestamp.
    #[serde(alias = "date_time")]
    Datetime,
    /// Exact value, or relation identifier.
    Select,
    /// Numeric range.
    #[serde(alias = "numberRange")]
    NumberRange,
    /// Day range.
    #[serde(alias = "dateRange")]
    DateRange,
}

impl SearchKind {
    /// Get the kind name as it appears in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Select => "select",
            Self::NumberRange => "number_range",
            Self::DateRange => "date_range",
        }
    }
}

/// One field of the advanced-search form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedSearchDescriptor {
    /// Field key; also names the query parameters.
    pub field: SmolStr,
    /// Search kind.
    pub kind: SearchKind,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl AdvancedSearchDescriptor {
    /// Create a new advanced-search descriptor.
    pub fn new(field: impl Into<SmolStr>, kind: SearchKind) -> Self {
        Self {
            field: field.into(),
            kind,
            label: None,
        }
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
