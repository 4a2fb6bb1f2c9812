//! Backend request parameters.

use std::fmt;

use serde::{Serialize, Serializer, ser::SerializeMap};

/// Request handler for searches.
pub const SELECT_HANDLER: &str = "/select";

/// An ordered multimap of request parameters, ready for the transport.
///
/// Parameter names keep the position of their first insertion; values of one name keep
/// insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendRequest {
    /// Request handler path.
    handler: String,
    /// Parameters in insertion order.
    params: Vec<(String, Vec<String>)>,
}

impl Default for BackendRequest {
    fn default() -> Self {
        Self::new(SELECT_HANDLER)
    }
}

impl BackendRequest {
    /// Creates an empty request for `handler`.
    pub fn new(handler: impl Into<String>) -> Self {
        Self {
            handler: handler.into(),
            params: Vec::new(),
        }
    }

    /// Request handler path.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Replaces every value of `name` with `value`.
    pub fn set(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => *values = vec![value],
            None => self.params.push((name.to_string(), vec![value])),
        }
    }

    /// Appends `value` to the values of `name`.
    pub fn add(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value),
            None => self.params.push((name.to_string(), vec![value])),
        }
    }

    /// Removes every value of `name`.
    pub fn remove(&mut self, name: &str) {
        self.params.retain(|(n, _)| n != name);
    }

    /// First value of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Every value of `name`.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// Returns true if `name` has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.params.iter().any(|(n, _)| n == name)
    }

    /// Page size, if set.
    pub fn rows(&self) -> Option<usize> {
        self.get("rows").and_then(|v| v.parse().ok())
    }

    /// Page offset, if set.
    pub fn start(&self) -> Option<usize> {
        self.get("start").and_then(|v| v.parse().ok())
    }

    /// Filter-query fragments.
    pub fn filter_queries(&self) -> &[String] {
        self.get_all("fq")
    }

    /// Facet field entries, exclusion prefixes included.
    pub fn facet_fields(&self) -> &[String] {
        self.get_all("facet.field")
    }

    /// Every `(name, value)` pair in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .flat_map(|(n, values)| values.iter().map(move |v| (n.as_str(), v.as_str())))
    }

    /// Number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns true if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for BackendRequest {
    /// One `name=value` line per value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            writeln!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl Serialize for BackendRequest {
    /// Serializes as a map of name to value list, in insertion order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.params.len()))?;
        for (name, values) in &self.params {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}
