//! Reading descriptor documents into the generic tree.
//!
//! YAML is a superset of JSON, so one loader covers `.mtad`, `.mtaext`,
//! `.yaml` and `.json` documents alike.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::model::{DeploymentDescriptor, ExtensionDescriptor, Platform, Target};
use crate::parsers::{parse_deployment_descriptor, ConfigurationParser, DescriptorParser};
use crate::schema::labels;
use crate::tree::stringify;

/// Deserializes `text` into a document tree.
///
/// The top level must be a mapping.
pub fn parse_document(text: &str) -> Result<Mapping> {
    match serde_yaml::from_str::<Value>(text)? {
        Value::Mapping(document) => Ok(document),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::wrong_type(
            "top level",
            &stringify(&other),
            "mapping",
            labels::DOCUMENT,
        )),
    }
}

/// Renders a model entity, typically a merged descriptor, as YAML.
pub fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| Error::Serialization {
        message: e.to_string(),
    })
}

pub fn load_document(path: &Path) -> Result<Mapping> {
    debug!("Loading document {}", path.display());
    let text = fs::read_to_string(path)?;
    parse_document(&text)
}

pub fn load_deployment_descriptor(path: &Path) -> Result<DeploymentDescriptor> {
    parse_deployment_descriptor(&load_document(path)?)
}

/// Loads an extension descriptor; documents without a declared version take
/// the version of the descriptor they extend.
pub fn load_extension_descriptor(
    path: &Path,
    base: &DeploymentDescriptor,
) -> Result<ExtensionDescriptor> {
    DescriptorParser::new(base.schema_version()).parse_extension_descriptor(&load_document(path)?)
}

/// Loads the targets of a target document, read with the descriptor's version.
pub fn load_targets(path: &Path, base: &DeploymentDescriptor) -> Result<Vec<Target>> {
    ConfigurationParser::new(base.schema_version()).parse_targets(&load_document(path)?)
}

pub fn load_platforms(path: &Path, base: &DeploymentDescriptor) -> Result<Vec<Platform>> {
    ConfigurationParser::new(base.schema_version()).parse_platforms(&load_document(path)?)
}
