//! Typed access to the generic document tree.
//!
//! Documents reach the core as an order-preserving `serde_yaml::Mapping`.
//! [`TreeReader`] wraps one mapping node together with the label of the
//! object it represents, so that every extraction failure is reported as a
//! schema violation naming the offending key, value and object.

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Renders a tree value for use in diagnostics.
///
/// Scalars are rendered bare (`foo`, `42`, `true`); collections fall back to
/// their flow-style YAML form.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{:?}", other)),
    }
}

/// Read-only, typed view over a single mapping node.
#[derive(Debug, Clone, Copy)]
pub struct TreeReader<'a> {
    node: &'a Mapping,
    object: &'a str,
}

impl<'a> TreeReader<'a> {
    pub fn new(node: &'a Mapping, object: &'a str) -> Self {
        Self { node, object }
    }

    /// Raw value for `key`. A YAML `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.node.get(key).filter(|value| !value.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.mismatch(key, other, "string")),
        }
    }

    pub fn require_string(&self, key: &str) -> Result<String> {
        self.get_string(key)?
            .ok_or_else(|| Error::missing(key, self.object))
    }

    /// Returns a copy of the mapping under `key`.
    pub fn get_map(&self, key: &str) -> Result<Option<Mapping>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Mapping(m)) => Ok(Some(m.clone())),
            Some(other) => Err(self.mismatch(key, other, "mapping")),
        }
    }

    /// Returns the mapping under `key`, or an empty one when absent.
    pub fn get_map_or_default(&self, key: &str) -> Result<Mapping> {
        Ok(self.get_map(key)?.unwrap_or_default())
    }

    pub fn get_list(&self, key: &str) -> Result<Option<&'a [Value]>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Sequence(seq)) => Ok(Some(seq.as_slice())),
            Some(other) => Err(self.mismatch(key, other, "list")),
        }
    }

    /// Borrows every element of the list under `key` as a mapping.
    pub fn get_list_of_maps(&self, key: &str) -> Result<Vec<&'a Mapping>> {
        let Some(items) = self.get_list(key)? else {
            return Ok(Vec::new());
        };
        items
            .iter()
            .map(|item| match item {
                Value::Mapping(m) => Ok(m),
                other => Err(self.mismatch(key, other, "list of mappings")),
            })
            .collect()
    }

    pub fn get_list_of_strings(&self, key: &str) -> Result<Option<Vec<String>>> {
        let Some(items) = self.get_list(key)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.mismatch(key, other, "list of strings")),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn mismatch(&self, key: &str, value: &Value, expected: &'static str) -> Error {
        Error::wrong_type(key, &stringify(value), expected, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_get_string() {
        let map = node("name: foo\ncount: 3");
        let reader = TreeReader::new(&map, "MTA module");
        assert_eq!(reader.get_string("name").unwrap(), Some("foo".to_string()));
        assert_eq!(reader.get_string("absent").unwrap(), None);

        let err = reader.get_string("count").unwrap_err();
        assert!(err.to_string().contains("\"count\""));
        assert!(err.to_string().contains("MTA module"));
    }

    #[test]
    fn test_require_string_reports_missing_key() {
        let map = node("type: java");
        let reader = TreeReader::new(&map, "MTA module");
        let err = reader.require_string("name").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing mandatory element \"name\" for object \"MTA module\""
        );
    }

    #[test]
    fn test_null_is_absent() {
        let map = node("properties: ~");
        let reader = TreeReader::new(&map, "MTA module");
        assert!(!reader.contains("properties"));
        assert!(reader.get_map_or_default("properties").unwrap().is_empty());
    }

    #[test]
    fn test_get_list_of_maps() {
        let map = node("modules:\n  - name: a\n  - name: b");
        let reader = TreeReader::new(&map, "MTA deployment descriptor");
        let modules = reader.get_list_of_maps("modules").unwrap();
        assert_eq!(modules.len(), 2);
        assert!(reader.get_list_of_maps("resources").unwrap().is_empty());
    }

    #[test]
    fn test_get_list_of_maps_rejects_scalars() {
        let map = node("modules:\n  - a");
        let reader = TreeReader::new(&map, "MTA deployment descriptor");
        assert!(reader.get_list_of_maps("modules").is_err());
    }

    #[test]
    fn test_get_list_of_strings() {
        let map = node("deployed-after: [db, api]");
        let reader = TreeReader::new(&map, "MTA module");
        assert_eq!(
            reader.get_list_of_strings("deployed-after").unwrap(),
            Some(vec!["db".to_string(), "api".to_string()])
        );
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&Value::String("x".into())), "x");
        assert_eq!(stringify(&Value::Bool(true)), "true");
        assert_eq!(stringify(&Value::Null), "null");
    }
}
