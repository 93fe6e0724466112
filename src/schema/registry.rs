//! Per-version catalog of element schemas.
//!
//! The catalog for a major version is the version-1 field set of every
//! element plus the fields each later version introduces: `parameters` from
//! version 2 and `deployed-after` from version 3. Catalogs are built once and
//! shared read-only by every parser.

use std::sync::LazyLock;

use super::keys::*;
use super::labels;
use super::{Element, Field, MapElement};
use crate::error::{Error, Result};
use crate::version::{SchemaVersion, MAX_SUPPORTED_MAJOR, MIN_SUPPORTED_MAJOR};

/// The element schemas of one major schema version.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    pub major: u32,
    pub deployment_descriptor: MapElement,
    pub extension_descriptor: MapElement,
    pub target: MapElement,
    pub platform: MapElement,
}

static REGISTRIES: LazyLock<Vec<SchemaRegistry>> = LazyLock::new(|| {
    (MIN_SUPPORTED_MAJOR..=MAX_SUPPORTED_MAJOR)
        .map(SchemaRegistry::build)
        .collect()
});

impl SchemaRegistry {
    /// Returns the shared catalog for `version`'s major.
    pub fn for_version(version: SchemaVersion) -> Result<&'static SchemaRegistry> {
        REGISTRIES
            .iter()
            .find(|registry| registry.major == version.major)
            .ok_or_else(|| Error::UnsupportedSchemaVersion {
                version: version.to_string(),
            })
    }

    fn build(major: u32) -> Self {
        let caps = Capabilities::of(major);
        Self {
            major,
            deployment_descriptor: deployment_descriptor(caps),
            extension_descriptor: extension_descriptor(caps),
            target: target(caps),
            platform: platform(caps),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Capabilities {
    parameters: bool,
    deployed_after: bool,
}

impl Capabilities {
    fn of(major: u32) -> Self {
        let version = SchemaVersion::new(major, 0);
        Self {
            parameters: version.supports_parameters(),
            deployed_after: version.supports_deployed_after(),
        }
    }
}

fn unique_name() -> Field {
    Field::required(NAME, Element::String).unique()
}

fn sibling_unique_name() -> Field {
    Field::required(NAME, Element::String).unique_among_siblings()
}

fn properties() -> Field {
    Field::optional(PROPERTIES, Element::AnyMap)
}

fn parameters() -> Field {
    Field::optional(PARAMETERS, Element::AnyMap)
}

fn list_of(key: &'static str, element: MapElement) -> Field {
    Field::optional(key, Element::list_of(Element::Map(element)))
}

fn provided_dependency(object: &'static str) -> MapElement {
    MapElement::new(object)
        .with(unique_name())
        .with(properties())
}

fn required_dependency(caps: Capabilities) -> MapElement {
    MapElement::new(labels::REQUIRED_DEPENDENCY)
        .with(Field::required(NAME, Element::String))
        .with(properties())
        .with_if(caps.parameters, parameters())
}

fn module(caps: Capabilities) -> MapElement {
    MapElement::new(labels::MODULE)
        .with(unique_name())
        .with(Field::required(TYPE, Element::String))
        .with(Field::optional(DESCRIPTION, Element::String))
        .with(properties())
        .with_if(caps.parameters, parameters())
        .with(list_of(PROVIDES, provided_dependency(labels::PROVIDED_DEPENDENCY)))
        .with(Field::optional(
            REQUIRES,
            Element::list_of(Element::NameOrMap(required_dependency(caps))),
        ))
        .with_if(
            caps.deployed_after,
            Field::optional(DEPLOYED_AFTER, Element::list_of(Element::String)),
        )
}

fn resource(caps: Capabilities) -> MapElement {
    MapElement::new(labels::RESOURCE)
        .with(unique_name())
        .with(Field::optional(TYPE, Element::String))
        .with(Field::optional(DESCRIPTION, Element::String))
        .with(properties())
        .with_if(caps.parameters, parameters())
}

fn deployment_descriptor(caps: Capabilities) -> MapElement {
    MapElement::new(labels::DEPLOYMENT_DESCRIPTOR)
        .with(Field::required(SCHEMA_VERSION, Element::Version))
        .with(Field::required(ID, Element::String))
        .with(Field::optional(VERSION, Element::String))
        .with(Field::optional(DESCRIPTION, Element::String))
        .with_if(caps.parameters, parameters())
        .with(list_of(MODULES, module(caps)))
        .with(list_of(RESOURCES, resource(caps)))
}

fn extension_module(caps: Capabilities) -> MapElement {
    MapElement::new(labels::EXTENSION_MODULE)
        .with(unique_name())
        .with(properties())
        .with_if(caps.parameters, parameters())
        .with(list_of(
            PROVIDES,
            provided_dependency(labels::EXTENSION_PROVIDED_DEPENDENCY),
        ))
}

fn extension_resource(caps: Capabilities) -> MapElement {
    MapElement::new(labels::EXTENSION_RESOURCE)
        .with(unique_name())
        .with(properties())
        .with_if(caps.parameters, parameters())
}

fn extension_descriptor(caps: Capabilities) -> MapElement {
    MapElement::new(labels::EXTENSION_DESCRIPTOR)
        .with(Field::optional(SCHEMA_VERSION, Element::Version))
        .with(Field::optional(ID, Element::String))
        .with(Field::optional(EXTENDS, Element::String))
        .with(Field::optional(DESCRIPTION, Element::String))
        .with_if(caps.parameters, parameters())
        .with(list_of(MODULES, extension_module(caps)))
        .with(list_of(RESOURCES, extension_resource(caps)))
        .with(list_of(TARGETS, target(caps)))
}

fn module_type(caps: Capabilities) -> MapElement {
    MapElement::new(labels::MODULE_TYPE)
        .with(sibling_unique_name())
        .with(Field::optional(DEPLOYER, Element::String))
        .with(properties())
        .with_if(caps.parameters, parameters())
}

fn resource_type(caps: Capabilities) -> MapElement {
    MapElement::new(labels::RESOURCE_TYPE)
        .with(sibling_unique_name())
        .with(properties())
        .with_if(caps.parameters, parameters())
}

fn override_entry(object: &'static str, caps: Capabilities) -> MapElement {
    MapElement::new(object)
        .with(sibling_unique_name())
        .with(properties())
        .with_if(caps.parameters, parameters())
}

/// Fields shared by targets and platforms.
fn environment(object: &'static str, caps: Capabilities) -> MapElement {
    MapElement::new(object)
        .with(sibling_unique_name())
        .with(Field::optional(TYPE, Element::String))
        .with(Field::optional(DESCRIPTION, Element::String))
        .with(properties())
        .with_if(caps.parameters, parameters())
        .with(list_of(MODULE_TYPES, module_type(caps)))
        .with(list_of(RESOURCE_TYPES, resource_type(caps)))
}

fn target(caps: Capabilities) -> MapElement {
    environment(labels::TARGET, caps)
        .with(list_of(MODULES, override_entry(labels::TARGET_MODULE, caps)))
        .with(list_of(
            RESOURCES,
            override_entry(labels::TARGET_RESOURCE, caps),
        ))
}

fn platform(caps: Capabilities) -> MapElement {
    environment(labels::PLATFORM, caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_schema(major: u32) -> MapElement {
        let registry = SchemaRegistry::for_version(SchemaVersion::new(major, 0)).unwrap();
        match &registry
            .deployment_descriptor
            .field(MODULES)
            .unwrap()
            .element
        {
            Element::List(item) => match item.as_ref() {
                Element::Map(schema) => schema.clone(),
                other => panic!("unexpected element {:?}", other),
            },
            other => panic!("unexpected element {:?}", other),
        }
    }

    #[test]
    fn test_registries_for_all_supported_versions() {
        for major in MIN_SUPPORTED_MAJOR..=MAX_SUPPORTED_MAJOR {
            let registry = SchemaRegistry::for_version(SchemaVersion::new(major, 0)).unwrap();
            assert_eq!(registry.major, major);
        }
        assert!(SchemaRegistry::for_version(SchemaVersion::new(9, 0)).is_err());
    }

    #[test]
    fn test_version_fields_are_cumulative() {
        let v1 = module_schema(1);
        let v2 = module_schema(2);
        let v3 = module_schema(3);

        assert!(v1.field(PARAMETERS).is_none());
        assert!(v2.field(PARAMETERS).is_some());
        assert!(v2.field(DEPLOYED_AFTER).is_none());
        assert!(v3.field(PARAMETERS).is_some());
        assert!(v3.field(DEPLOYED_AFTER).is_some());

        for field in &v1.fields {
            assert!(v2.field(field.key).is_some(), "v2 lost field {}", field.key);
        }
        for field in &v2.fields {
            assert!(v3.field(field.key).is_some(), "v3 lost field {}", field.key);
        }
    }

    #[test]
    fn test_extension_labels() {
        let registry = SchemaRegistry::for_version(SchemaVersion::V1).unwrap();
        assert_eq!(
            registry.extension_descriptor.object,
            labels::EXTENSION_DESCRIPTOR
        );
        assert!(!registry
            .extension_descriptor
            .field(SCHEMA_VERSION)
            .unwrap()
            .required);
    }
}
