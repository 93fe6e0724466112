//! Per-element extraction from already validated tree nodes.
//!
//! Every function here reads the version-1 fields of its element into the
//! base builder, then composes the version extensions on top of it when the
//! schema version has them.

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};
use crate::model::builders::{
    DescriptorBuilder, ElementOverrideBuilder, ExtensionDescriptorBuilder, ExtensionModuleBuilder,
    ExtensionResourceBuilder, ModuleBuilder, ModuleTypeBuilder, PlatformBuilder,
    ProvidedDependencyBuilder, RequiredDependencyBuilder, ResourceBuilder, ResourceTypeBuilder,
    TargetBuilder,
};
use crate::model::{
    Build, DeploymentDescriptor, ElementOverride, ExtensionDescriptor, ExtensionModule,
    ExtensionResource, Module, ModuleType, ParametersContainer, Platform, ProvidedDependency,
    RequiredDependency, Resource, ResourceType, Target,
};
use crate::schema::keys::*;
use crate::schema::labels;
use crate::tree::{stringify, TreeReader};
use crate::version::SchemaVersion;

/// Adds the version-2 `parameters` field to `builder` when `version` has it.
fn build_with_parameters<B>(
    builder: B,
    reader: &TreeReader<'_>,
    version: SchemaVersion,
) -> Result<B::Output>
where
    B: Build,
    B::Output: ParametersContainer,
{
    if !version.supports_parameters() {
        return builder.build();
    }
    let mut builder = builder.with_parameters();
    builder.parameters(reader.get_map(PARAMETERS)?);
    builder.build()
}

fn parse_list<T>(
    reader: &TreeReader<'_>,
    key: &str,
    parse: impl Fn(&Mapping) -> Result<T>,
) -> Result<Vec<T>> {
    reader
        .get_list_of_maps(key)?
        .into_iter()
        .map(parse)
        .collect()
}

pub(crate) fn provided_dependency(
    node: &Mapping,
    object: &'static str,
) -> Result<ProvidedDependency> {
    let reader = TreeReader::new(node, object);
    let mut builder = ProvidedDependencyBuilder::new();
    builder
        .name(reader.require_string(NAME)?)
        .properties(reader.get_map(PROPERTIES)?);
    builder.build()
}

/// A required dependency is either a bare name or a mapping.
pub(crate) fn required_dependency(
    item: &Value,
    version: SchemaVersion,
) -> Result<RequiredDependency> {
    let mut builder = RequiredDependencyBuilder::new(version);
    match item {
        Value::String(name) => {
            builder.name(name.as_str());
            builder.build()
        }
        Value::Mapping(node) => {
            let reader = TreeReader::new(node, labels::REQUIRED_DEPENDENCY);
            builder
                .name(reader.require_string(NAME)?)
                .properties(reader.get_map(PROPERTIES)?);
            build_with_parameters(builder, &reader, version)
        }
        other => Err(Error::wrong_type(
            REQUIRES,
            &stringify(other),
            "string or mapping",
            labels::MODULE,
        )),
    }
}

pub(crate) fn module(node: &Mapping, version: SchemaVersion) -> Result<Module> {
    let reader = TreeReader::new(node, labels::MODULE);
    let required = reader
        .get_list(REQUIRES)?
        .unwrap_or_default()
        .iter()
        .map(|item| required_dependency(item, version))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = ModuleBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .module_type(reader.require_string(TYPE)?)
        .description(reader.get_string(DESCRIPTION)?)
        .properties(reader.get_map(PROPERTIES)?)
        .provided_dependencies(parse_list(&reader, PROVIDES, |node| {
            provided_dependency(node, labels::PROVIDED_DEPENDENCY)
        })?)
        .required_dependencies(required);

    if !version.supports_parameters() {
        return builder.build();
    }
    let mut builder = builder.with_parameters();
    builder.parameters(reader.get_map(PARAMETERS)?);

    if !version.supports_deployed_after() {
        return builder.build();
    }
    let mut builder = builder.with_deployed_after();
    builder.deployed_after(reader.get_list_of_strings(DEPLOYED_AFTER)?);
    builder.build()
}

pub(crate) fn resource(node: &Mapping, version: SchemaVersion) -> Result<Resource> {
    let reader = TreeReader::new(node, labels::RESOURCE);
    let mut builder = ResourceBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .resource_type(reader.get_string(TYPE)?)
        .description(reader.get_string(DESCRIPTION)?)
        .properties(reader.get_map(PROPERTIES)?);
    build_with_parameters(builder, &reader, version)
}

pub(crate) fn deployment_descriptor(
    node: &Mapping,
    version: SchemaVersion,
) -> Result<DeploymentDescriptor> {
    let reader = TreeReader::new(node, labels::DEPLOYMENT_DESCRIPTOR);
    let mut builder = DescriptorBuilder::new(version);
    builder
        .id(reader.require_string(ID)?)
        .app_version(reader.get_string(VERSION)?)
        .description(reader.get_string(DESCRIPTION)?)
        .modules(parse_list(&reader, MODULES, |node| module(node, version))?)
        .resources(parse_list(&reader, RESOURCES, |node| resource(node, version))?);
    build_with_parameters(builder, &reader, version)
}

pub(crate) fn module_type(node: &Mapping, version: SchemaVersion) -> Result<ModuleType> {
    let reader = TreeReader::new(node, labels::MODULE_TYPE);
    let mut builder = ModuleTypeBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .deployer(reader.get_string(DEPLOYER)?)
        .properties(reader.get_map(PROPERTIES)?);
    build_with_parameters(builder, &reader, version)
}

pub(crate) fn resource_type(node: &Mapping, version: SchemaVersion) -> Result<ResourceType> {
    let reader = TreeReader::new(node, labels::RESOURCE_TYPE);
    let mut builder = ResourceTypeBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .properties(reader.get_map(PROPERTIES)?);
    build_with_parameters(builder, &reader, version)
}

fn element_override(
    node: &Mapping,
    object: &'static str,
    version: SchemaVersion,
) -> Result<ElementOverride> {
    let reader = TreeReader::new(node, object);
    let mut builder = ElementOverrideBuilder::new(version, object);
    builder
        .name(reader.require_string(NAME)?)
        .properties(reader.get_map(PROPERTIES)?);
    build_with_parameters(builder, &reader, version)
}

pub(crate) fn target(node: &Mapping, version: SchemaVersion) -> Result<Target> {
    let reader = TreeReader::new(node, labels::TARGET);
    let mut builder = TargetBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .kind(reader.get_string(TYPE)?)
        .description(reader.get_string(DESCRIPTION)?)
        .properties(reader.get_map(PROPERTIES)?)
        .module_types(parse_list(&reader, MODULE_TYPES, |node| {
            module_type(node, version)
        })?)
        .resource_types(parse_list(&reader, RESOURCE_TYPES, |node| {
            resource_type(node, version)
        })?);
    builder
        .module_overrides(parse_list(&reader, MODULES, |node| {
            element_override(node, labels::TARGET_MODULE, version)
        })?)
        .resource_overrides(parse_list(&reader, RESOURCES, |node| {
            element_override(node, labels::TARGET_RESOURCE, version)
        })?);
    build_with_parameters(builder, &reader, version)
}

pub(crate) fn platform(node: &Mapping, version: SchemaVersion) -> Result<Platform> {
    let reader = TreeReader::new(node, labels::PLATFORM);
    let mut builder = PlatformBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .kind(reader.get_string(TYPE)?)
        .description(reader.get_string(DESCRIPTION)?)
        .properties(reader.get_map(PROPERTIES)?)
        .module_types(parse_list(&reader, MODULE_TYPES, |node| {
            module_type(node, version)
        })?)
        .resource_types(parse_list(&reader, RESOURCE_TYPES, |node| {
            resource_type(node, version)
        })?);
    build_with_parameters(builder, &reader, version)
}

fn extension_module(node: &Mapping, version: SchemaVersion) -> Result<ExtensionModule> {
    let reader = TreeReader::new(node, labels::EXTENSION_MODULE);
    let mut builder = ExtensionModuleBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .properties(reader.get_map(PROPERTIES)?)
        .provided_dependencies(parse_list(&reader, PROVIDES, |node| {
            provided_dependency(node, labels::EXTENSION_PROVIDED_DEPENDENCY)
        })?);
    build_with_parameters(builder, &reader, version)
}

fn extension_resource(node: &Mapping, version: SchemaVersion) -> Result<ExtensionResource> {
    let reader = TreeReader::new(node, labels::EXTENSION_RESOURCE);
    let mut builder = ExtensionResourceBuilder::new(version);
    builder
        .name(reader.require_string(NAME)?)
        .properties(reader.get_map(PROPERTIES)?);
    build_with_parameters(builder, &reader, version)
}

pub(crate) fn extension_descriptor(
    node: &Mapping,
    version: SchemaVersion,
) -> Result<ExtensionDescriptor> {
    let reader = TreeReader::new(node, labels::EXTENSION_DESCRIPTOR);
    let mut builder = ExtensionDescriptorBuilder::new(version);
    builder
        .id(reader.get_string(ID)?)
        .extends(reader.get_string(EXTENDS)?)
        .description(reader.get_string(DESCRIPTION)?)
        .modules(parse_list(&reader, MODULES, |node| {
            extension_module(node, version)
        })?)
        .resources(parse_list(&reader, RESOURCES, |node| {
            extension_resource(node, version)
        })?)
        .targets(parse_list(&reader, TARGETS, |node| target(node, version))?);
    build_with_parameters(builder, &reader, version)
}
