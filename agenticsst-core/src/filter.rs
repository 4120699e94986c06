//! Analysis filter parameters
//!
//! Filters select the slice of the document corpus an analysis or generated
//! script applies to (sector, company size, regulation themes, ...). They
//! double as cache addresses, so their serialized form must be deterministic:
//! the same logical filters must always produce the same bytes, regardless of
//! the order the caller added them in.

use crate::error::{KeyError, SstResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Free-text value (sector name, regulation reference, ...)
    Text(String),
    /// Numeric value (company size, scenario duration, ...)
    Number(i64),
    /// Boolean toggle (e.g. "include archived documents")
    Toggle(bool),
    /// List of values (selected themes, article numbers, ...)
    Many(Vec<String>),
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Number(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Toggle(v)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

/// An ordered set of named filter parameters.
///
/// Backed by a `BTreeMap` so iteration (and therefore canonical
/// serialization) is always sorted by parameter name, independent of
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisFilters {
    params: BTreeMap<String, FilterValue>,
}

impl AnalysisFilters {
    /// Create an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a parameter, builder-style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Add or replace a parameter in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FilterValue>) {
        self.params.insert(name.into(), value.into());
    }

    /// Look up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.params.get(name)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True when no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate parameters in canonical (name-sorted) order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Canonical JSON form: name-sorted object, no insignificant whitespace.
    ///
    /// This is the input to cache-key derivation; two filter sets with the
    /// same parameters always canonicalize to the same string.
    pub fn canonical_json(&self) -> SstResult<String> {
        serde_json::to_string(&self.params).map_err(|e| {
            KeyError::Serialization {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_json_is_order_insensitive() {
        let a = AnalysisFilters::new()
            .with("sector", "construction")
            .with("group_size", 25i64);
        let b = AnalysisFilters::new()
            .with("group_size", 25i64)
            .with("sector", "construction");

        assert_eq!(
            a.canonical_json().expect("canonical"),
            b.canonical_json().expect("canonical")
        );
    }

    #[test]
    fn test_canonical_json_sorted_keys() {
        let filters = AnalysisFilters::new()
            .with("zone", "06")
            .with("article", "51")
            .with("mandatory", true);
        let json = filters.canonical_json().expect("canonical");
        let article = json.find("article").expect("article present");
        let mandatory = json.find("mandatory").expect("mandatory present");
        let zone = json.find("zone").expect("zone present");
        assert!(article < mandatory && mandatory < zone);
    }

    #[test]
    fn test_set_replaces_value() {
        let mut filters = AnalysisFilters::new().with("sector", "mining");
        filters.set("sector", "construction");
        assert_eq!(
            filters.get("sector"),
            Some(&FilterValue::Text("construction".to_string()))
        );
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn test_value_conversions() {
        let filters = AnalysisFilters::new()
            .with("themes", vec!["falls".to_string(), "machinery".to_string()])
            .with("strict", false)
            .with("size", 10i64);
        assert!(matches!(filters.get("themes"), Some(FilterValue::Many(v)) if v.len() == 2));
        assert!(matches!(filters.get("strict"), Some(FilterValue::Toggle(false))));
        assert!(matches!(filters.get("size"), Some(FilterValue::Number(10))));
    }
}
