//! Configuration file parsing for `tabula.toml`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{SchemaError, SchemaResult};

/// Main configuration structure for `tabula.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TabulaConfig {
    /// Catalog file configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Query-parameter conventions for filters and advanced search.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl TabulaConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content);
        let config: Self =
            toml::from_str(&expanded).map_err(|e| SchemaError::TomlError { source: e })?;
        config.filters.validate()?;
        Ok(config)
    }

    /// Apply environment-specific overrides.
    pub fn with_environment(mut self, env: &str) -> Self {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(catalog) = overrides.catalog {
                self.catalog = catalog;
            }
            if let Some(debug) = overrides.debug {
                if let Some(log_fragments) = debug.log_fragments {
                    self.debug.log_fragments = log_fragments;
                }
                if let Some(log_dropped_params) = debug.log_dropped_params {
                    self.debug.log_dropped_params = log_dropped_params;
                }
            }
        }
        self
    }
}

/// Catalog file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Path to the entity catalog (`.toml` or `.json`).
    #[serde(default = "default_catalog_path")]
    pub path: String,

    /// Validate the catalog when it is loaded.
    #[serde(default = "default_true")]
    pub validate: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            validate: true,
        }
    }
}

fn default_catalog_path() -> String { "catalog.toml".to_string() }
fn default_true() -> bool { true }

/// Query-parameter conventions shared by the filter compiler and the search composer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Prefix of quick-filter parameters.
    #[serde(default = "default_filter_prefix")]
    pub filter_prefix: String,

    /// Prefix of advanced-search parameters.
    #[serde(default = "default_advanced_prefix")]
    pub advanced_prefix: String,

    /// Parameter carrying the advanced-search combinator.
    #[serde(default = "default_logic_param")]
    pub logic_param: String,

    /// Separator of multi-valued filter parameters.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Select value meaning "no filter".
    #[serde(default = "default_all_sentinel")]
    pub all_sentinel: String,

    /// Primary-key column name.
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_prefix: default_filter_prefix(),
            advanced_prefix: default_advanced_prefix(),
            logic_param: default_logic_param(),
            delimiter: default_delimiter(),
            all_sentinel: default_all_sentinel(),
            primary_key: default_primary_key(),
        }
    }
}

impl FilterConfig {
    fn validate(&self) -> SchemaResult<()> {
        if self.delimiter.is_empty() {
            return Err(SchemaError::ConfigError {
                message: "filters.delimiter must not be empty".to_string(),
            });
        }
        if self.primary_key.is_empty() {
            return Err(SchemaError::ConfigError {
                message: "filters.primary_key must not be empty".to_string(),
            });
        }
        if self.filter_prefix == self.advanced_prefix {
            return Err(SchemaError::ConfigError {
                message: "filters.filter_prefix and filters.advanced_prefix must differ"
                    .to_string(),
            });
        }
        Ok(())
    }
}

fn default_filter_prefix() -> String { "filter_".to_string() }
fn default_advanced_prefix() -> String { "advanced_".to_string() }
fn default_logic_param() -> String { "advanced_logic".to_string() }
fn default_delimiter() -> String { ",".to_string() }
fn default_all_sentinel() -> String { "all".to_string() }
fn default_primary_key() -> String { "id".to_string() }

/// Debug/logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every compiled predicate fragment at debug level.
    #[serde(default)]
    pub log_fragments: bool,

    /// Warn when a malformed parameter is dropped.
    #[serde(default = "default_true")]
    pub log_dropped_params: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_fragments: false,
            log_dropped_params: true,
        }
    }
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Catalog overrides.
    pub catalog: Option<CatalogConfig>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_fragments.
    pub log_fragments: Option<bool>,

    /// Override log_dropped_params.
    pub log_dropped_params: Option<bool>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();
    let Ok(re) = regex_lite::Regex::new(r"\$\{([^}]+)\}") else {
        return result;
    };

    for cap in re.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}
