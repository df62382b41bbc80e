//! Field descriptors: the declarative vocabulary shared by filters, search and editing.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// The kind of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Short free text.
    Text,
    /// Integer or decimal number.
    Number,
    /// Monetary amount.
    Currency,
    /// Calendar day with no time component.
    Date,
    /// Full timestamp.
    #[serde(alias = "date_time")]
    Datetime,
    /// True/false flag.
    Boolean,
    /// Value picked from a fixed option set.
    Select,
    /// Reference to another entity's record.
    Relation,
    /// Reference to a location record, stored as `<key>_id`.
    Location,
    /// Long free-form text.
    Textarea,
}

impl FieldKind {
    /// Get the kind name as it appears in catalogs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Currency => "currency",
            Self::Date => "date",
            Self::Datetime => "datetime",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Relation => "relation",
            Self::Location => "location",
            Self::Textarea => "textarea",
        }
    }

    /// Check if values of this kind reference another record.
    pub fn is_relational(&self) -> bool {
        matches!(self, Self::Relation | Self::Location)
    }

    /// Check if this kind holds free text.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Textarea)
    }

    /// Check if this kind holds a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Currency)
    }

    /// Check if this kind holds a date or timestamp.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Datetime)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a static option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Stored value.
    pub value: SmolStr,
    /// Display label.
    pub label: String,
}

impl FieldOption {
    /// Create a new option.
    pub fn new(value: impl Into<SmolStr>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// How a relation or location field points at its target entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSpec {
    /// Name of the referenced entity.
    pub target_entity: SmolStr,
    /// Field of the target shown to users.
    pub display_field: SmolStr,
    /// Field of the target the reference stores. Defaults to the primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<SmolStr>,
    /// Storage column on this entity, overriding every naming rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_field: Option<SmolStr>,
}

impl RelationSpec {
    /// Create a relation spec pointing at the target's primary key.
    pub fn new(target_entity: impl Into<SmolStr>, display_field: impl Into<SmolStr>) -> Self {
        Self {
            target_entity: target_entity.into(),
            display_field: display_field.into(),
            value_field: None,
            storage_field: None,
        }
    }

    /// Set the referenced value field.
    pub fn with_value_field(mut self, field: impl Into<SmolStr>) -> Self {
        self.value_field = Some(field.into());
        self
    }

    /// Set an explicit storage column.
    pub fn with_storage_field(mut self, field: impl Into<SmolStr>) -> Self {
        self.storage_field = Some(field.into());
        self
    }
}

/// Declaration of one entity attribute as exposed to filtering, search and editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Stable identifier, unique within the entity.
    pub key: SmolStr,
    /// Value kind.
    pub kind: FieldKind,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Static option set for select-like fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    /// Target description for relation and location fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<RelationSpec>,
    /// Whether filter values may be a delimiter-joined set.
    #[serde(default)]
    pub multi_valued: bool,
}

impl FieldDescriptor {
    /// Create a new field descriptor.
    pub fn new(key: impl Into<SmolStr>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            kind,
            label: None,
            options: None,
            relation: None,
            multi_valued: false,
        }
    }

    /// Create a relation field.
    pub fn relation(key: impl Into<SmolStr>, spec: RelationSpec) -> Self {
        Self::new(key, FieldKind::Relation).with_relation(spec)
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the static option set.
    pub fn with_options(mut self, options: impl IntoIterator<Item = FieldOption>) -> Self {
        self.options = Some(options.into_iter().collect());
        self
    }

    /// Set the relation spec.
    pub fn with_relation(mut self, spec: RelationSpec) -> Self {
        self.relation = Some(spec);
        self
    }

    /// Accept delimiter-joined filter values.
    pub fn multi_valued(mut self) -> Self {
        self.multi_valued = true;
        self
    }

    /// Get the key as a string slice.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Check if this field references another record.
    pub fn is_relational(&self) -> bool {
        self.kind.is_relational()
    }

    /// Check if this field exposes a non-empty static option set.
    pub fn has_fixed_options(&self) -> bool {
        self.options.as_ref().is_some_and(|o| !o.is_empty())
    }

    /// Free text without a fixed option set is matched by substring.
    pub fn is_free_text(&self) -> bool {
        self.kind.is_textual() && !self.has_fixed_options()
    }

    /// Look up the label for a stored option value.
    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .as_ref()?
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}
