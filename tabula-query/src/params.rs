//! Flat, string-valued query parameters as they arrive from a list page.
//!
//! ```rust
//! use tabula_query::QueryParams;
//!
//! let params = QueryParams::from_query_string("filter_status=active&advanced_name=Acme%20Co");
//! assert_eq!(params.get("filter_status"), Some("active"));
//! assert_eq!(params.get("advanced_name"), Some("Acme Co"));
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A flat string-keyed, string-valued parameter map (HTTP query-string shape).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams {
    values: IndexMap<String, String>,
}

impl QueryParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. When a key repeats, the last value wins.
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Set a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Builder form of [`QueryParams::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a raw parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Get a trimmed parameter value, treating blank values as absent.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Check if a parameter is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over parameters whose key starts with `prefix`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.values
            .iter()
            .filter(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for QueryParams {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query_string_decodes() {
        let params = QueryParams::from_query_string("?filter_customer_id=42&advanced_name=a+b%2Cc");
        assert_eq!(params.get("filter_customer_id"), Some("42"));
        assert_eq!(params.get("advanced_name"), Some("a b,c"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_value_treats_blank_as_absent() {
        let params = QueryParams::from([("filter_status", "  "), ("filter_kind", " pallet ")]);
        assert_eq!(params.value("filter_status"), None);
        assert_eq!(params.value("filter_kind"), Some("pallet"));
        assert!(params.contains("filter_status"));
    }

    #[test]
    fn test_with_prefix() {
        let params = QueryParams::new()
            .with("filter_status", "active")
            .with("advanced_name", "Acme")
            .with("advanced_logic", "OR");
        let advanced: Vec<_> = params.with_prefix("advanced_").map(|(k, _)| k).collect();
        assert_eq!(advanced, vec!["advanced_name", "advanced_logic"]);
    }
}
