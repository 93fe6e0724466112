//! # Descriptor Parsers
//!
//! Turns generic document trees into the versioned model. Parsing is a
//! two-step process for every document:
//!
//! 1. **Validation**: the whole tree is checked against the element schema
//!    of its version, so structural problems (missing keys, wrong types,
//!    duplicate names) are reported before anything is built.
//! 2. **Extraction**: the element parsers read the validated tree into the
//!    builders of [`crate::model::builders`].
//!
//! [`DescriptorParser`] handles deployment and extension descriptors, which
//! declare their own `_schema-version`. [`ConfigurationParser`] handles
//! targets and platforms, which carry no version and are read with the version
//! the parser was created for.

mod elements;

use log::debug;
use serde_yaml::Mapping;

use crate::error::{Error, Result};
use crate::model::{DeploymentDescriptor, ExtensionDescriptor, Platform, Target};
use crate::schema::keys::{PLATFORMS, TARGETS};
use crate::schema::{labels, Element, Field, MapElement, SchemaRegistry, SchemaValidator};
use crate::version::{SchemaVersion, SCHEMA_VERSION_KEY};

/// Parses a deployment descriptor, taking the schema version from the document.
///
/// # Examples
///
/// ```
/// use mta_descriptor::parsers::parse_deployment_descriptor;
///
/// let document = serde_yaml::from_str(
///     "_schema-version: \"2.1\"\nID: shop\nmodules:\n  - name: api\n    type: java\n",
/// )
/// .unwrap();
/// let descriptor = parse_deployment_descriptor(&document).unwrap();
/// assert_eq!(descriptor.id(), "shop");
/// assert_eq!(descriptor.modules()[0].name(), "api");
/// ```
pub fn parse_deployment_descriptor(document: &Mapping) -> Result<DeploymentDescriptor> {
    let version = SchemaVersion::detect(document)?
        .ok_or_else(|| Error::missing(SCHEMA_VERSION_KEY, labels::DEPLOYMENT_DESCRIPTOR))?;
    DescriptorParser::new(version).parse_deployment_descriptor(document)
}

/// Parses deployment and extension descriptors.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorParser {
    version: SchemaVersion,
}

impl DescriptorParser {
    /// Creates a parser that falls back to `version` for documents that do
    /// not declare one.
    pub fn new(version: SchemaVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    fn version_of(&self, document: &Mapping) -> Result<SchemaVersion> {
        Ok(SchemaVersion::detect(document)?.unwrap_or(self.version))
    }

    pub fn parse_deployment_descriptor(&self, document: &Mapping) -> Result<DeploymentDescriptor> {
        let version = self.version_of(document)?;
        let registry = SchemaRegistry::for_version(version)?;
        SchemaValidator::validate_document(document, &registry.deployment_descriptor)?;
        debug!("Parsing deployment descriptor with schema version {}", version);
        elements::deployment_descriptor(document, version)
    }

    pub fn parse_extension_descriptor(&self, document: &Mapping) -> Result<ExtensionDescriptor> {
        let version = self.version_of(document)?;
        let registry = SchemaRegistry::for_version(version)?;
        SchemaValidator::validate_document(document, &registry.extension_descriptor)?;
        debug!("Parsing extension descriptor with schema version {}", version);
        elements::extension_descriptor(document, version)
    }
}

/// Parses targets and platforms for a fixed schema version.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationParser {
    version: SchemaVersion,
}

impl ConfigurationParser {
    pub fn new(version: SchemaVersion) -> Self {
        Self { version }
    }

    pub fn parse_target(&self, document: &Mapping) -> Result<Target> {
        let registry = SchemaRegistry::for_version(self.version)?;
        SchemaValidator::validate_document(document, &registry.target)?;
        elements::target(document, self.version)
    }

    pub fn parse_platform(&self, document: &Mapping) -> Result<Platform> {
        let registry = SchemaRegistry::for_version(self.version)?;
        SchemaValidator::validate_document(document, &registry.platform)?;
        elements::platform(document, self.version)
    }

    /// Parses a document holding either a `targets` list or a single target.
    pub fn parse_targets(&self, document: &Mapping) -> Result<Vec<Target>> {
        if !document.contains_key(TARGETS) {
            return Ok(vec![self.parse_target(document)?]);
        }
        let registry = SchemaRegistry::for_version(self.version)?;
        let schema = list_document(TARGETS, &registry.target);
        SchemaValidator::validate_document(document, &schema)?;
        list_items(document, TARGETS)
            .map(|node| elements::target(node, self.version))
            .collect()
    }

    /// Parses a document holding either a `platforms` list or a single platform.
    pub fn parse_platforms(&self, document: &Mapping) -> Result<Vec<Platform>> {
        if !document.contains_key(PLATFORMS) {
            return Ok(vec![self.parse_platform(document)?]);
        }
        let registry = SchemaRegistry::for_version(self.version)?;
        let schema = list_document(PLATFORMS, &registry.platform);
        SchemaValidator::validate_document(document, &schema)?;
        list_items(document, PLATFORMS)
            .map(|node| elements::platform(node, self.version))
            .collect()
    }
}

fn list_document(key: &'static str, item: &MapElement) -> MapElement {
    MapElement::new(labels::DOCUMENT).with(Field::required(
        key,
        Element::list_of(Element::Map(item.clone())),
    ))
}

/// Items of an already validated list of mappings.
fn list_items<'a>(document: &'a Mapping, key: &str) -> impl Iterator<Item = &'a Mapping> {
    document
        .get(key)
        .and_then(|value| value.as_sequence())
        .into_iter()
        .flatten()
        .filter_map(|item| item.as_mapping())
}
