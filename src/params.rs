//! Path and query parameters captured for one request.

use std::collections::HashMap;

use serde::Serialize;

use crate::trie::PARAM_PREFIX;

/// One captured `(key, value)` pair.
///
/// For path captures the key keeps its declared marker (`:id`), so it matches
/// the registered segment exactly. Query keys are stored as sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamUnit {
    key: String,
    value: String,
}

impl ParamUnit {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    Path,
    Query,
}

/// Parameter store kept inside a [`Context`](crate::Context).
///
/// The maps are cleared, not dropped, between requests so their capacity is
/// reused by the next request drawn from the pool.
#[derive(Clone, Debug, Default, Serialize)]
pub struct HttpParams {
    path: HashMap<String, String>,
    query: HashMap<String, String>,
}

impl HttpParams {
    pub fn add(&mut self, kind: ParamKind, unit: ParamUnit) {
        let ParamUnit { key, value } = unit;
        match kind {
            ParamKind::Path => self.path.insert(key, value),
            ParamKind::Query => self.query.insert(key, value),
        };
    }

    /// Looks up a parameter by its stored key. Empty values count as absent.
    pub fn get(&self, kind: ParamKind, key: &str) -> Option<&str> {
        let map = match kind {
            ParamKind::Path => &self.path,
            ParamKind::Query => &self.query,
        };
        map.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// Path parameter by bare name: `path_param("id")` reads the `:id` capture.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        let mut key = String::with_capacity(name.len() + 1);
        key.push(PARAM_PREFIX);
        key.push_str(name);
        self.get(ParamKind::Path, &key)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.get(ParamKind::Query, name)
    }

    pub fn contains_query(&self, name: &str) -> bool {
        self.query.contains_key(name)
    }

    pub fn query_len(&self) -> usize {
        self.query.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.query.is_empty()
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.query.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_param_uses_bare_name() {
        let mut params = HttpParams::default();
        params.add(ParamKind::Path, ParamUnit::new(":id", "7"));

        assert_eq!(params.path_param("id"), Some("7"));
        assert_eq!(params.get(ParamKind::Path, ":id"), Some("7"));
        assert_eq!(params.path_param(":id"), None);
        assert_eq!(params.query_param("id"), None);
    }

    #[test]
    fn empty_value_is_absent() {
        let mut params = HttpParams::default();
        params.add(ParamKind::Query, ParamUnit::new("q", ""));
        assert_eq!(params.query_param("q"), None);
    }

    #[test]
    fn clear_empties_both_maps() {
        let mut params = HttpParams::default();
        params.add(ParamKind::Path, ParamUnit::new(":id", "1"));
        params.add(ParamKind::Query, ParamUnit::new("page", "2"));
        assert!(!params.is_empty());

        params.clear();
        assert!(params.is_empty());
    }

    #[test]
    fn serializes_as_path_and_query() {
        let mut params = HttpParams::default();
        params.add(ParamKind::Query, ParamUnit::new("page", "2"));
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"{"path":{},"query":{"page":"2"}}"#);
    }
}
