//! Quick-filter compilation.
//!
//! Each [`FilterDescriptor`] of an entity reads its own `filter_*` parameters and
//! contributes at most one [`Filter`] fragment. Missing or malformed parameters
//! contribute nothing; compilation never fails.
//!
//! ```rust
//! use tabula_query::{QueryParams, compile_filters};
//! use tabula_schema::{EntitySchema, FieldDescriptor, FieldKind, FilterDescriptor};
//!
//! let orders = EntitySchema::new("orders")
//!     .field(FieldDescriptor::new("status", FieldKind::Select))
//!     .filter(FilterDescriptor::select("status"));
//!
//! let params = QueryParams::from([("filter_status", "open")]);
//! let fragments = compile_filters(&orders, &params);
//! assert_eq!(fragments.len(), 1);
//! ```

use tabula_schema::{EntitySchema, FieldDescriptor, FilterDescriptor, FilterKind};
use tracing::{debug, warn};

use crate::coerce::{end_of_day, parse_day, parse_number, parse_scalar, start_of_day};
use crate::filter::{Filter, FilterValue};
use crate::options::FilterOptions;
use crate::params::QueryParams;
use crate::query::WhereInput;
use crate::relations::RelationResolver;

/// Reserved select values with a fixed meaning for progress-like columns.
///
/// Progress is stored as a 0..1 fraction, so "complete" means exactly 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectSentinel {
    /// Column equals 0.
    Zero,
    /// Column differs from 0.
    NonZero,
    /// Column equals 1.
    Complete,
    /// Column differs from 1 or is null.
    Incomplete,
}

impl SelectSentinel {
    /// Recognise a sentinel value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "zero" => Some(Self::Zero),
            "non_zero" => Some(Self::NonZero),
            "complete" => Some(Self::Complete),
            "incomplete" => Some(Self::Incomplete),
            _ => None,
        }
    }

    /// The fragment this sentinel stands for on `column`.
    pub fn to_filter(self, column: &str) -> Filter {
        match self {
            Self::Zero => Filter::Equals(column.into(), FilterValue::Int(0)),
            Self::NonZero => Filter::NotEquals(column.into(), FilterValue::Int(0)),
            Self::Complete => Filter::Equals(column.into(), FilterValue::Int(1)),
            Self::Incomplete => Filter::Or(vec![
                Filter::NotEquals(column.into(), FilterValue::Int(1)),
                Filter::IsNull(column.into()),
            ]),
        }
    }
}

/// Compiles an entity's quick-filter descriptors against runtime parameters.
#[derive(Debug, Clone)]
pub struct FilterCompiler<'a> {
    entity: &'a EntitySchema,
    options: FilterOptions,
    resolver: RelationResolver,
}

impl<'a> FilterCompiler<'a> {
    /// Create a compiler with default options.
    pub fn new(entity: &'a EntitySchema) -> Self {
        Self::with_options(entity, FilterOptions::default())
    }

    /// Create a compiler with explicit options.
    pub fn with_options(entity: &'a EntitySchema, options: FilterOptions) -> Self {
        let resolver = RelationResolver::new(&options);
        Self {
            entity,
            options,
            resolver,
        }
    }

    /// Compile every descriptor, in declaration order.
    pub fn compile(&self, params: &QueryParams) -> Vec<Filter> {
        self.entity
            .filters
            .iter()
            .filter_map(|descriptor| self.compile_descriptor(descriptor, params))
            .collect()
    }

    /// Compile and merge into `where_input`.
    pub fn apply(&self, where_input: &mut WhereInput, params: &QueryParams) {
        where_input.merge_fragments(self.compile(params));
    }

    /// Compile a single descriptor.
    pub fn compile_descriptor(
        &self,
        descriptor: &FilterDescriptor,
        params: &QueryParams,
    ) -> Option<Filter> {
        let fragment = match descriptor.kind {
            FilterKind::Select => self.compile_select(descriptor, params),
            FilterKind::DateRange => self.compile_date_range(descriptor, params),
            FilterKind::NumberRange => self.compile_number_range(descriptor, params),
            FilterKind::Checkbox => self.compile_checkbox(descriptor, params),
        };

        if fragment.is_none() {
            return None;
        }
        if self.options.log_fragments {
            debug!(
                entity = %self.entity.name(),
                field = %descriptor.field,
                kind = descriptor.kind.as_str(),
                fragment = ?fragment,
                "compiled filter fragment"
            );
        }
        Some(fragment)
    }

    fn compile_select(&self, descriptor: &FilterDescriptor, params: &QueryParams) -> Filter {
        let param = self.options.filter_param(&descriptor.field, None);
        let Some(raw) = params.value(&param) else {
            return Filter::None;
        };
        if self.options.is_all(raw) {
            return Filter::None;
        }

        Filter::or(
            descriptor
                .target_fields()
                .into_iter()
                .map(|target| self.select_fragment(&param, target, raw)),
        )
    }

    fn select_fragment(&self, param: &str, target: &str, raw: &str) -> Filter {
        let field = self.entity.get_field(target);

        if let Some(sentinel) = SelectSentinel::parse(raw) {
            return sentinel.to_filter(&self.column(target));
        }

        match field {
            Some(field) if field.multi_valued && raw.contains(self.options.delimiter.as_str()) => {
                Filter::or(
                    raw.split(self.options.delimiter.as_str())
                        .map(str::trim)
                        .filter(|v| !v.is_empty() && !self.options.is_all(v))
                        .map(|value| self.value_fragment(param, target, Some(field), value)),
                )
            }
            _ => self.value_fragment(param, target, field, raw),
        }
    }

    fn value_fragment(
        &self,
        param: &str,
        target: &str,
        field: Option<&FieldDescriptor>,
        raw: &str,
    ) -> Filter {
        let Some(field) = field else {
            return Filter::equals(target, raw);
        };

        if field.is_relational() {
            let column = self.resolver.resolve_storage_field(field);
            return match self.resolver.coerce_relation_value(raw, &column) {
                Some(value) => Filter::Equals(column, value.into()),
                None => {
                    self.dropped(param, raw, "not a valid relation value");
                    Filter::None
                }
            };
        }

        if field.is_free_text() {
            return Filter::ContainsInsensitive(target.into(), raw.into());
        }
        match parse_scalar(field.kind, raw) {
            Some(value) => Filter::Equals(target.into(), value),
            None => {
                self.dropped(param, raw, "value does not match the field type");
                Filter::None
            }
        }
    }

    fn compile_date_range(&self, descriptor: &FilterDescriptor, params: &QueryParams) -> Filter {
        let gte = self
            .bound(descriptor, params, "from", parse_day)
            .map(|day| FilterValue::DateTime(start_of_day(day)));
        let lte = self
            .bound(descriptor, params, "to", parse_day)
            .map(|day| FilterValue::DateTime(end_of_day(day)));
        self.range_over_targets(descriptor, gte, lte)
    }

    fn compile_number_range(&self, descriptor: &FilterDescriptor, params: &QueryParams) -> Filter {
        let gte = self.bound(descriptor, params, "min", parse_number);
        let lte = self.bound(descriptor, params, "max", parse_number);
        self.range_over_targets(descriptor, gte, lte)
    }

    fn compile_checkbox(&self, descriptor: &FilterDescriptor, params: &QueryParams) -> Filter {
        let param = self.options.filter_param(&descriptor.field, None);
        let Some(raw) = params.value(&param) else {
            return Filter::None;
        };
        let checked = match raw.to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => {
                self.dropped(&param, raw, "not a checkbox value");
                return Filter::None;
            }
        };

        Filter::or(
            descriptor
                .target_fields()
                .into_iter()
                .map(|target| Filter::Equals(self.column(target), FilterValue::Bool(checked))),
        )
    }

    fn bound<T>(
        &self,
        descriptor: &FilterDescriptor,
        params: &QueryParams,
        suffix: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let param = self.options.filter_param(&descriptor.field, Some(suffix));
        let raw = params.value(&param)?;
        let parsed = parse(raw);
        if parsed.is_none() {
            self.dropped(&param, raw, "unparseable range bound");
        }
        parsed
    }

    fn range_over_targets(
        &self,
        descriptor: &FilterDescriptor,
        gte: Option<FilterValue>,
        lte: Option<FilterValue>,
    ) -> Filter {
        if gte.is_none() && lte.is_none() {
            return Filter::None;
        }
        Filter::or(
            descriptor
                .target_fields()
                .into_iter()
                .map(|target| Filter::range(self.column(target), gte.clone(), lte.clone())),
        )
    }

    fn column(&self, target: &str) -> String {
        match self.entity.get_field(target) {
            Some(field) => self.resolver.resolve_storage_field(field),
            None => target.to_string(),
        }
    }

    fn dropped(&self, param: &str, raw: &str, reason: &str) {
        if self.options.log_dropped_params {
            warn!(
                entity = %self.entity.name(),
                param = %param,
                value = %raw,
                reason,
                "dropping filter parameter"
            );
        }
    }
}

/// Compile `entity`'s quick filters with default options.
pub fn compile_filters(entity: &EntitySchema, params: &QueryParams) -> Vec<Filter> {
    FilterCompiler::new(entity).compile(params)
}
