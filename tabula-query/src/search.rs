//! Advanced-search composition.
//!
//! Advanced search is a form of single-field criteria (`advanced_*` parameters)
//! combined under one global combinator chosen by the user (`advanced_logic`).
//!
//! ```rust
//! use tabula_query::{QueryParams, WhereInput, search::AdvancedSearchComposer};
//! use tabula_schema::{
//!     AdvancedSearchDescriptor, EntitySchema, FieldDescriptor, FieldKind, SearchKind,
//! };
//!
//! let customers = EntitySchema::new("customers")
//!     .field(FieldDescriptor::new("name", FieldKind::Text))
//!     .search(AdvancedSearchDescriptor::new("name", SearchKind::Text));
//!
//! let params = QueryParams::from([("advanced_name", "acme"), ("advanced_logic", "or")]);
//! let mut where_input = WhereInput::new();
//! AdvancedSearchComposer::new(&customers).apply(&mut where_input, &params);
//! assert_eq!(where_input.or.len(), 1);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tabula_schema::{
    AdvancedSearchDescriptor, EntitySchema, FieldDescriptor, SchemaCatalog, SearchKind,
};
use tracing::{debug, warn};

use crate::coerce::{
    end_of_day, parse_day, parse_number, parse_scalar, parse_timestamp, start_of_day,
};
use crate::error::{QueryError, QueryResult};
use crate::filter::{Filter, FilterValue};
use crate::options::FilterOptions;
use crate::params::QueryParams;
use crate::query::WhereInput;
use crate::relations::RelationResolver;

/// How advanced-search criteria combine with each other and with quick filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GlobalLogic {
    /// Every criterion must hold.
    #[default]
    And,
    /// Any criterion may hold.
    Or,
}

impl GlobalLogic {
    /// Read the combinator from `params`, defaulting to AND when absent or unknown.
    pub fn from_params(params: &QueryParams, options: &FilterOptions) -> Self {
        params
            .value(&options.logic_param)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    /// Keyword form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl FromStr for GlobalLogic {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("and") {
            Ok(Self::And)
        } else if s.eq_ignore_ascii_case("or") {
            Ok(Self::Or)
        } else {
            Err(QueryError::invalid_filter(format!(
                "Unknown search logic `{}`, expected AND or OR",
                s
            )))
        }
    }
}

impl fmt::Display for GlobalLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiles an entity's advanced-search descriptors.
#[derive(Debug, Clone)]
pub struct AdvancedSearchComposer<'a> {
    entity: &'a EntitySchema,
    catalog: Option<&'a SchemaCatalog>,
    options: FilterOptions,
    resolver: RelationResolver,
}

impl<'a> AdvancedSearchComposer<'a> {
    /// Create a composer with default options and no catalog.
    ///
    /// Without a catalog, relation targets are not checked.
    pub fn new(entity: &'a EntitySchema) -> Self {
        Self::with_options(entity, FilterOptions::default())
    }

    /// Create a composer with explicit options.
    pub fn with_options(entity: &'a EntitySchema, options: FilterOptions) -> Self {
        let resolver = RelationResolver::new(&options);
        Self {
            entity,
            catalog: None,
            options,
            resolver,
        }
    }

    /// Check relation descriptors against `catalog`.
    pub fn with_catalog(mut self, catalog: &'a SchemaCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// The combinator requested by `params`.
    pub fn logic(&self, params: &QueryParams) -> GlobalLogic {
        GlobalLogic::from_params(params, &self.options)
    }

    /// One fragment per descriptor that has a usable parameter.
    pub fn fragments(&self, params: &QueryParams) -> Vec<Filter> {
        self.entity
            .search
            .iter()
            .map(|descriptor| self.compile_descriptor(descriptor, params))
            .filter(|fragment| !fragment.is_none())
            .collect()
    }

    /// Combine all fragments under `logic`. `None` when no criterion applies.
    pub fn compile(&self, params: &QueryParams, logic: GlobalLogic) -> Option<Filter> {
        let fragments = self.fragments(params);
        let combined = match logic {
            GlobalLogic::And => Filter::and(fragments),
            GlobalLogic::Or => Filter::or(fragments),
        };
        (!combined.is_none()).then_some(combined)
    }

    /// Fold the search criteria into `where_input` using the requested combinator.
    pub fn apply(&self, where_input: &mut WhereInput, params: &QueryParams) {
        let logic = self.logic(params);
        let fragments = self.fragments(params);
        if self.options.log_fragments && !fragments.is_empty() {
            debug!(
                entity = %self.entity.name(),
                logic = %logic,
                count = fragments.len(),
                "applying advanced search"
            );
        }
        where_input.apply_search(fragments, logic);
    }

    fn compile_descriptor(
        &self,
        descriptor: &AdvancedSearchDescriptor,
        params: &QueryParams,
    ) -> Filter {
        let field = self.entity.get_field(&descriptor.field);
        let column = field
            .map(|f| self.resolver.resolve_storage_field(f))
            .unwrap_or_else(|| descriptor.field.to_string());
        let param = self.options.advanced_param(&descriptor.field, None);

        match descriptor.kind {
            SearchKind::NumberRange => {
                let gte = self.bound(descriptor, params, "min", parse_number);
                let lte = self.bound(descriptor, params, "max", parse_number);
                Filter::range(column, gte, lte)
            }
            SearchKind::DateRange => {
                let gte = self
                    .bound(descriptor, params, "from", parse_day)
                    .map(|day| FilterValue::DateTime(start_of_day(day)));
                let lte = self
                    .bound(descriptor, params, "to", parse_day)
                    .map(|day| FilterValue::DateTime(end_of_day(day)));
                Filter::range(column, gte, lte)
            }
            kind => {
                let Some(raw) = params.value(&param) else {
                    return Filter::None;
                };
                self.single_value(kind, field, column, &param, raw)
            }
        }
    }

    fn single_value(
        &self,
        kind: SearchKind,
        field: Option<&FieldDescriptor>,
        column: String,
        param: &str,
        raw: &str,
    ) -> Filter {
        match kind {
            SearchKind::Text => Filter::ContainsInsensitive(column, raw.into()),
            SearchKind::Number => match parse_number(raw) {
                Some(value) => Filter::Equals(column, value),
                None => self.dropped(param, raw, "not a number"),
            },
            SearchKind::Date => match parse_day(raw) {
                Some(day) => Filter::Equals(column, FilterValue::DateTime(start_of_day(day))),
                None => self.dropped(param, raw, "not a date"),
            },
            SearchKind::Datetime => match parse_timestamp(raw) {
                Some(ts) => Filter::Equals(column, FilterValue::DateTime(ts.local())),
                None => self.dropped(param, raw, "not a timestamp"),
            },
            SearchKind::Select => self.select(field, column, param, raw),
            SearchKind::NumberRange | SearchKind::DateRange => Filter::None,
        }
    }

    fn select(
        &self,
        field: Option<&FieldDescriptor>,
        column: String,
        param: &str,
        raw: &str,
    ) -> Filter {
        if self.options.is_all(raw) {
            return Filter::None;
        }
        let Some(field) = field else {
            return Filter::Equals(column, raw.into());
        };
        if !field.is_relational() {
            return match parse_scalar(field.kind, raw) {
                Some(value) => Filter::Equals(column, value),
                None => self.dropped(param, raw, "value does not match the field type"),
            };
        }

        if let (Some(catalog), Some(spec)) = (self.catalog, field.relation.as_ref()) {
            if !catalog.has_entity(&spec.target_entity) {
                warn!(
                    entity = %self.entity.name(),
                    field = %field.key,
                    target = %spec.target_entity,
                    "relation target is not registered, skipping search field"
                );
                return Filter::None;
            }
        }

        match self.resolver.coerce_relation_value(raw, &column) {
            Some(value) => Filter::Equals(column, value.into()),
            None => self.dropped(param, raw, "not a valid relation value"),
        }
    }

    fn bound<T>(
        &self,
        descriptor: &AdvancedSearchDescriptor,
        params: &QueryParams,
        suffix: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let param = self.options.advanced_param(&descriptor.field, Some(suffix));
        let raw = params.value(&param)?;
        let parsed = parse(raw);
        if parsed.is_none() {
            self.dropped(&param, raw, "unparseable range bound");
        }
        parsed
    }

    fn dropped(&self, param: &str, raw: &str, reason: &str) -> Filter {
        if self.options.log_dropped_params {
            warn!(
                entity = %self.entity.name(),
                param = %param,
                value = %raw,
                reason,
                "dropping search parameter"
            );
        }
        Filter::None
    }
}

/// Compile the advanced search of `entity` from `catalog`.
pub fn compile_advanced_search(
    catalog: &SchemaCatalog,
    entity: &str,
    params: &QueryParams,
    logic: GlobalLogic,
) -> QueryResult<Option<Filter>> {
    let schema = catalog
        .get_entity(entity)
        .ok_or_else(|| QueryError::unknown_entity(entity))?;
    Ok(AdvancedSearchComposer::new(schema)
        .with_catalog(catalog)
        .compile(params, logic))
}

/// Fold the advanced search of `entity` into `where_input`, using `advanced_logic`.
pub fn apply_advanced_search(
    where_input: &mut WhereInput,
    catalog: &SchemaCatalog,
    entity: &str,
    params: &QueryParams,
) -> QueryResult<()> {
    let schema = catalog
        .get_entity(entity)
        .ok_or_else(|| QueryError::unknown_entity(entity))?;
    AdvancedSearchComposer::new(schema)
        .with_catalog(catalog)
        .apply(where_input, params);
    Ok(())
}
