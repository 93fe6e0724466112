//! # Element Schemas and Validation
//!
//! Every document kind (deployment descriptor, extension descriptor, target,
//! platform) is described by a tree of [`MapElement`]s listing the keys an
//! element may carry, the type of each value, whether it is mandatory, and
//! whether its value must be unique among all elements of the same kind.
//!
//! ## Key Components
//!
//! - **`Element`**: The expected shape of a single value.
//! - **`MapElement`** / **`Field`**: A mapping node and its known keys.
//! - **`SchemaValidator`**: Walks a document against its schema and reports
//!   the first structural problem as a schema violation.
//! - **`registry`**: The per-version catalog of element schemas.
//!
//! Uniqueness comes in two scopes. Document-wide fields are tracked per
//! `(object label, key)` across the whole document, so a provided dependency
//! name must be unique among all modules, not just within its owning module.
//! Sibling-scoped fields (type templates, target overrides) only need to be
//! unique within the list that holds them.

pub mod registry;

use std::collections::{HashMap, HashSet};

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::tree::stringify;

pub use registry::SchemaRegistry;

/// Document keys shared by the schemas, the parsers and the mergers.
pub mod keys {
    pub const SCHEMA_VERSION: &str = crate::version::SCHEMA_VERSION_KEY;
    pub const ID: &str = "ID";
    pub const VERSION: &str = "version";
    pub const EXTENDS: &str = "extends";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const DESCRIPTION: &str = "description";
    pub const PROPERTIES: &str = "properties";
    pub const PARAMETERS: &str = "parameters";
    pub const MODULES: &str = "modules";
    pub const RESOURCES: &str = "resources";
    pub const PROVIDES: &str = "provides";
    pub const REQUIRES: &str = "requires";
    pub const DEPLOYED_AFTER: &str = "deployed-after";
    pub const TARGETS: &str = "targets";
    pub const PLATFORMS: &str = "platforms";
    pub const MODULE_TYPES: &str = "module-types";
    pub const RESOURCE_TYPES: &str = "resource-types";
    pub const DEPLOYER: &str = "deployer";
}

/// Object labels used in diagnostics. These strings are part of the
/// external error contract and must not be reworded.
pub mod labels {
    pub const DEPLOYMENT_DESCRIPTOR: &str = "MTA deployment descriptor";
    pub const EXTENSION_DESCRIPTOR: &str = "MTA extension descriptor";
    pub const MODULE: &str = "MTA module";
    pub const EXTENSION_MODULE: &str = "MTA extension module";
    pub const PROVIDED_DEPENDENCY: &str = "MTA provided dependency";
    pub const EXTENSION_PROVIDED_DEPENDENCY: &str = "MTA extension provided dependency";
    pub const REQUIRED_DEPENDENCY: &str = "MTA required dependency";
    pub const RESOURCE: &str = "MTA resource";
    pub const EXTENSION_RESOURCE: &str = "MTA extension resource";
    pub const TARGET: &str = "target";
    pub const PLATFORM: &str = "platform";
    pub const MODULE_TYPE: &str = "module type";
    pub const RESOURCE_TYPE: &str = "resource type";
    pub const TARGET_MODULE: &str = "target module override";
    pub const TARGET_RESOURCE: &str = "target resource override";
    pub const DOCUMENT: &str = "document";
}

/// Expected shape of a value in the document tree.
#[derive(Debug, Clone)]
pub enum Element {
    /// A string scalar.
    String,
    /// A boolean scalar.
    Bool,
    /// A schema version: a string or a number.
    Version,
    /// A mapping with arbitrary content (properties, parameters).
    AnyMap,
    /// A mapping with a known set of keys.
    Map(MapElement),
    /// A list whose items all have the given shape.
    List(Box<Element>),
    /// Either a bare name or a mapping with a known set of keys.
    NameOrMap(MapElement),
}

impl Element {
    pub fn list_of(item: Element) -> Self {
        Element::List(Box::new(item))
    }

    fn expected(&self) -> &'static str {
        match self {
            Element::String => "string",
            Element::Bool => "bool",
            Element::Version => "version",
            Element::AnyMap | Element::Map(_) => "mapping",
            Element::List(_) => "list",
            Element::NameOrMap(_) => "string or mapping",
        }
    }
}

/// Scope in which the value of a field must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniqueness {
    None,
    /// Unique among the items of the list holding the element.
    Siblings,
    /// Unique among all elements of the same kind in the whole document.
    Document,
}

/// One known key of a [`MapElement`].
#[derive(Debug, Clone)]
pub struct Field {
    pub key: &'static str,
    pub element: Element,
    pub required: bool,
    pub unique: Uniqueness,
}

impl Field {
    pub fn optional(key: &'static str, element: Element) -> Self {
        Self {
            key,
            element,
            required: false,
            unique: Uniqueness::None,
        }
    }

    pub fn required(key: &'static str, element: Element) -> Self {
        Self {
            required: true,
            ..Self::optional(key, element)
        }
    }

    /// Marks the value as unique among all elements of the same kind.
    pub fn unique(mut self) -> Self {
        self.unique = Uniqueness::Document;
        self
    }

    /// Marks the value as unique within its enclosing list only.
    pub fn unique_among_siblings(mut self) -> Self {
        self.unique = Uniqueness::Siblings;
        self
    }
}

/// Schema of a mapping node.
#[derive(Debug, Clone)]
pub struct MapElement {
    pub object: &'static str,
    pub fields: Vec<Field>,
}

impl MapElement {
    pub fn new(object: &'static str) -> Self {
        Self {
            object,
            fields: Vec::new(),
        }
    }

    /// Adds a field, replacing any existing field with the same key.
    pub fn with(mut self, field: Field) -> Self {
        self.fields.retain(|existing| existing.key != field.key);
        self.fields.push(field);
        self
    }

    /// Adds `field` only when `enabled` holds.
    pub fn with_if(self, enabled: bool, field: Field) -> Self {
        if enabled {
            self.with(field)
        } else {
            self
        }
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }
}

/// Validates documents against a [`MapElement`] schema.
///
/// A validator instance covers exactly one document: uniqueness is tracked
/// across everything it has seen.
#[derive(Debug, Default)]
pub struct SchemaValidator {
    seen: HashMap<(&'static str, &'static str), HashSet<String>>,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a whole document with a fresh validator.
    pub fn validate_document(document: &Mapping, schema: &MapElement) -> Result<()> {
        Self::new().validate(document, schema)
    }

    /// Validates one mapping node, stopping at the first violation.
    pub fn validate(&mut self, node: &Mapping, schema: &MapElement) -> Result<()> {
        for field in &schema.fields {
            let value = node.get(field.key).filter(|value| !value.is_null());
            match value {
                None if field.required => return Err(Error::missing(field.key, schema.object)),
                None => {}
                Some(value) => {
                    self.validate_value(field.key, value, &field.element, schema.object)?;
                    if field.unique == Uniqueness::Document {
                        self.check_unique(schema.object, field.key, value)?;
                    }
                }
            }
        }

        for key in node.keys() {
            if let Some(key) = key.as_str() {
                if schema.field(key).is_none() {
                    debug!("Ignoring unknown key '{}' of {}", key, schema.object);
                }
            }
        }
        Ok(())
    }

    fn validate_value(
        &mut self,
        key: &'static str,
        value: &Value,
        element: &Element,
        object: &'static str,
    ) -> Result<()> {
        let mismatch = || Error::wrong_type(key, &stringify(value), element.expected(), object);
        match (element, value) {
            (Element::String, Value::String(_))
            | (Element::Bool, Value::Bool(_))
            | (Element::Version, Value::String(_) | Value::Number(_))
            | (Element::AnyMap, Value::Mapping(_)) => Ok(()),
            (Element::Map(schema), Value::Mapping(node)) => self.validate(node, schema),
            (Element::List(item), Value::Sequence(items)) => {
                let mut siblings: HashMap<&'static str, HashSet<String>> = HashMap::new();
                for item_value in items {
                    self.validate_value(key, item_value, item, object)?;
                    if let (Element::Map(schema), Value::Mapping(node)) = (item.as_ref(), item_value)
                    {
                        check_siblings(schema, node, &mut siblings)?;
                    }
                }
                Ok(())
            }
            (Element::NameOrMap(_), Value::String(_)) => Ok(()),
            (Element::NameOrMap(schema), Value::Mapping(node)) => self.validate(node, schema),
            _ => Err(mismatch()),
        }
    }

    fn check_unique(
        &mut self,
        object: &'static str,
        key: &'static str,
        value: &Value,
    ) -> Result<()> {
        let rendered = stringify(value);
        let seen = self.seen.entry((object, key)).or_default();
        if !seen.insert(rendered.clone()) {
            return Err(Error::not_unique(key, &rendered, object));
        }
        Ok(())
    }
}

fn check_siblings(
    schema: &MapElement,
    node: &Mapping,
    siblings: &mut HashMap<&'static str, HashSet<String>>,
) -> Result<()> {
    for field in schema
        .fields
        .iter()
        .filter(|field| field.unique == Uniqueness::Siblings)
    {
        if let Some(value) = node.get(field.key) {
            let rendered = stringify(value);
            if !siblings.entry(field.key).or_default().insert(rendered.clone()) {
                return Err(Error::not_unique(field.key, &rendered, schema.object));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViolationKind;

    fn item_schema() -> MapElement {
        MapElement::new("item")
            .with(Field::required("name", Element::String).unique())
            .with(Field::optional("flag", Element::Bool))
    }

    fn list_schema() -> MapElement {
        MapElement::new("container").with(Field::optional(
            "items",
            Element::list_of(Element::Map(item_schema())),
        ))
    }

    fn doc(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_valid_document() {
        let document = doc("items:\n  - name: a\n  - name: b\n    flag: true");
        assert!(SchemaValidator::validate_document(&document, &list_schema()).is_ok());
    }

    #[test]
    fn test_missing_required_key() {
        let document = doc("items:\n  - flag: true");
        let err = SchemaValidator::validate_document(&document, &list_schema()).unwrap_err();
        assert!(matches!(
            err,
            Error::SchemaViolation {
                kind: ViolationKind::Missing,
                ..
            }
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let document = doc("items:\n  - name: a\n    flag: maybe");
        let err = SchemaValidator::validate_document(&document, &list_schema()).unwrap_err();
        match err {
            Error::SchemaViolation {
                kind, key, value, object,
            } => {
                assert_eq!(kind, ViolationKind::WrongType { expected: "bool" });
                assert_eq!(key, "flag");
                assert_eq!(value, "maybe");
                assert_eq!(object, "item");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_names() {
        let document = doc("items:\n  - name: a\n  - name: a");
        let err = SchemaValidator::validate_document(&document, &list_schema()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value \"a\" for key \"name\" not unique for object \"item\""
        );
    }

    #[test]
    fn test_name_or_map() {
        let schema = MapElement::new("container").with(Field::optional(
            "requires",
            Element::list_of(Element::NameOrMap(item_schema())),
        ));
        let document = doc("requires:\n  - a\n  - name: b");
        assert!(SchemaValidator::validate_document(&document, &schema).is_ok());

        let document = doc("requires:\n  - [a]");
        assert!(SchemaValidator::validate_document(&document, &schema).is_err());
    }

    #[test]
    fn test_sibling_uniqueness_is_scoped_to_the_list() {
        let entry = MapElement::new("entry")
            .with(Field::required("name", Element::String).unique_among_siblings());
        let group = MapElement::new("group").with(Field::optional(
            "entries",
            Element::list_of(Element::Map(entry)),
        ));
        let schema = MapElement::new("container").with(Field::optional(
            "groups",
            Element::list_of(Element::Map(group)),
        ));

        let document = doc("groups:\n  - entries: [{name: a}]\n  - entries: [{name: a}]");
        assert!(SchemaValidator::validate_document(&document, &schema).is_ok());

        let document = doc("groups:\n  - entries: [{name: a}, {name: a}]");
        let err = SchemaValidator::validate_document(&document, &schema).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Value \"a\" for key \"name\" not unique for object \"entry\""
        );
    }

    #[test]
    fn test_with_replaces_existing_field() {
        let schema = item_schema().with(Field::optional("name", Element::String));
        assert_eq!(schema.fields.len(), 2);
        assert!(!schema.field("name").unwrap().required);
    }
}
