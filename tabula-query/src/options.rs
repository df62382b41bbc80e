//! Runtime options shared by the filter compiler, the search composer and the diff engine.

use tabula_schema::TabulaConfig;

use crate::logging;

/// Parameter naming and logging options, projected from `tabula.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    /// Prefix of quick-filter parameters (`filter_`).
    pub filter_prefix: String,
    /// Prefix of advanced-search parameters (`advanced_`).
    pub advanced_prefix: String,
    /// Parameter carrying the advanced-search combinator.
    pub logic_param: String,
    /// Separator of multi-valued parameters.
    pub delimiter: String,
    /// Select value meaning "no filter".
    pub all_sentinel: String,
    /// Primary-key column name.
    pub primary_key: String,
    /// Log each compiled fragment at debug level.
    pub log_fragments: bool,
    /// Warn when a malformed parameter is dropped.
    pub log_dropped_params: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::from_config(&TabulaConfig::default())
    }
}

impl FilterOptions {
    /// Build options from a loaded configuration.
    pub fn from_config(config: &TabulaConfig) -> Self {
        let filters = &config.filters;
        Self {
            filter_prefix: filters.filter_prefix.clone(),
            advanced_prefix: filters.advanced_prefix.clone(),
            logic_param: filters.logic_param.clone(),
            delimiter: filters.delimiter.clone(),
            all_sentinel: filters.all_sentinel.clone(),
            primary_key: filters.primary_key.clone(),
            log_fragments: config.debug.log_fragments || logging::is_debug_enabled(),
            log_dropped_params: config.debug.log_dropped_params,
        }
    }

    /// Name of a quick-filter parameter, e.g. `filter_created_at_from`.
    pub fn filter_param(&self, field: &str, suffix: Option<&str>) -> String {
        param_name(&self.filter_prefix, field, suffix)
    }

    /// Name of an advanced-search parameter, e.g. `advanced_total_min`.
    pub fn advanced_param(&self, field: &str, suffix: Option<&str>) -> String {
        param_name(&self.advanced_prefix, field, suffix)
    }

    /// Check if a select value means "no filter".
    pub fn is_all(&self, value: &str) -> bool {
        value.eq_ignore_ascii_case(&self.all_sentinel)
    }
}

impl From<&TabulaConfig> for FilterOptions {
    fn from(config: &TabulaConfig) -> Self {
        Self::from_config(config)
    }
}

fn param_name(prefix: &str, field: &str, suffix: Option<&str>) -> String {
    match suffix {
        Some(suffix) => format!("{}{}_{}", prefix, field, suffix),
        None => format!("{}{}", prefix, field),
    }
}
