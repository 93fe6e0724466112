//! # Versioned Descriptor Model
//!
//! The entity types produced by the parsers: deployment and extension
//! descriptors, their modules, resources and dependencies, and the targets
//! and platforms that carry environment-specific overrides.
//!
//! ## Versioning
//!
//! Every entity records the schema version it was built for. Fields that only
//! exist from a later version on (`parameters` from 2, `deployed-after` from
//! 3) are guarded by their getters: asking a version-1 module for its
//! parameters fails with [`Error::UnsupportedOperation`] instead of returning
//! an empty default.
//!
//! ## Construction and Mutation
//!
//! Entities are created through the builders in [`builders`] and are
//! read-only afterwards. The only in-place changes are made by the mergers
//! and by the dependency resolver's explicit deployed-after write-back, both
//! through crate-internal accessors.

pub mod builders;

use serde::Serialize;
use serde_yaml::Mapping;

use crate::error::{Error, Result};
use crate::version::SchemaVersion;

pub use builders::{Build, DeployedAfterExt, ParametersExt};

/// An order-preserving mapping of property or parameter names to values.
pub type PropertyMap = Mapping;

fn unsupported(field: &str, version: SchemaVersion) -> Error {
    Error::UnsupportedOperation {
        field: field.to_string(),
        version: version.to_string(),
    }
}

fn is_empty_map(map: &PropertyMap) -> bool {
    map.is_empty()
}

/// Entities that gain a `parameters` mapping from schema version 2 on.
pub trait ParametersContainer {
    fn schema_version(&self) -> SchemaVersion;

    #[doc(hidden)]
    fn parameters_slot(&mut self) -> &mut PropertyMap;

    #[doc(hidden)]
    fn parameters_ref(&self) -> &PropertyMap;

    /// The parameters of the entity.
    ///
    /// Fails with [`Error::UnsupportedOperation`] for version-1 entities.
    fn parameters(&self) -> Result<&PropertyMap> {
        if self.schema_version().supports_parameters() {
            Ok(self.parameters_ref())
        } else {
            Err(unsupported("parameters", self.schema_version()))
        }
    }

    /// Mutable access used by the mergers.
    fn parameters_mut(&mut self) -> Result<&mut PropertyMap> {
        if self.schema_version().supports_parameters() {
            Ok(self.parameters_slot())
        } else {
            Err(unsupported("parameters", self.schema_version()))
        }
    }
}

macro_rules! parameters_container {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl ParametersContainer for $entity {
                fn schema_version(&self) -> SchemaVersion {
                    self.schema_version
                }

                fn parameters_slot(&mut self) -> &mut PropertyMap {
                    &mut self.parameters
                }

                fn parameters_ref(&self) -> &PropertyMap {
                    &self.parameters
                }
            }
        )+
    };
}

parameters_container!(
    DeploymentDescriptor,
    Module,
    RequiredDependency,
    Resource,
    ModuleType,
    ResourceType,
    ElementOverride,
    Target,
    Platform,
    ExtensionDescriptor,
    ExtensionModule,
    ExtensionResource,
);

/// Root aggregate: everything that gets deployed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeploymentDescriptor {
    #[serde(rename = "_schema-version")]
    pub(crate) schema_version: SchemaVersion,
    #[serde(rename = "ID")]
    pub(crate) id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) modules: Vec<Module>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) resources: Vec<Resource>,
}

impl DeploymentDescriptor {
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub(crate) fn modules_mut(&mut self) -> &mut [Module] {
        &mut self.modules
    }

    pub(crate) fn resources_mut(&mut self) -> &mut [Resource] {
        &mut self.resources
    }
}

/// A deployable unit of the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Module {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) module_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
    #[serde(rename = "provides", skip_serializing_if = "Vec::is_empty")]
    pub(crate) provided_dependencies: Vec<ProvidedDependency>,
    #[serde(rename = "requires", skip_serializing_if = "Vec::is_empty")]
    pub(crate) required_dependencies: Vec<RequiredDependency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) deployed_after: Option<Vec<String>>,
}

impl Module {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn provided_dependencies(&self) -> &[ProvidedDependency] {
        &self.provided_dependencies
    }

    pub fn required_dependencies(&self) -> &[RequiredDependency] {
        &self.required_dependencies
    }

    /// Names of the dependencies this module requires, in declaration order.
    pub fn required_dependency_names(&self) -> impl Iterator<Item = &str> {
        self.required_dependencies.iter().map(|dep| dep.name())
    }

    /// The explicit deployed-after list.
    ///
    /// `Ok(None)` means the module does not declare one. Fails with
    /// [`Error::UnsupportedOperation`] before schema version 3.
    pub fn deployed_after(&self) -> Result<Option<&[String]>> {
        if self.schema_version.supports_deployed_after() {
            Ok(self.deployed_after.as_deref())
        } else {
            Err(unsupported("deployed-after", self.schema_version))
        }
    }

    pub(crate) fn set_deployed_after(&mut self, modules: Vec<String>) -> Result<()> {
        if !self.schema_version.supports_deployed_after() {
            return Err(unsupported("deployed-after", self.schema_version));
        }
        self.deployed_after = Some(modules);
        Ok(())
    }

    pub(crate) fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }

    pub(crate) fn provided_dependencies_mut(&mut self) -> &mut [ProvidedDependency] {
        &mut self.provided_dependencies
    }
}

/// A named capability a module exposes to others.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvidedDependency {
    pub(crate) name: String,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
}

/// Extension descriptors refine provided dependencies with the same shape.
pub type ExtensionProvidedDependency = ProvidedDependency;

impl ProvidedDependency {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub(crate) fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }
}

/// A reference from a module to a provided dependency or a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequiredDependency {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
}

impl RequiredDependency {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// The declared value of `key`: parameters win over properties from
    /// version 2 on, version-1 dependencies only have properties.
    pub fn declared(&self, key: &str) -> Option<&serde_yaml::Value> {
        let from_parameters = if self.schema_version.supports_parameters() {
            self.parameters.get(key)
        } else {
            None
        };
        from_parameters.or_else(|| self.properties.get(key))
    }
}

/// A service or other backing entity modules can require.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
}

impl Resource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub(crate) fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }
}

/// Deployer and property templates for modules of one type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleType {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) deployer: Option<String>,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
}

impl ModuleType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deployer(&self) -> Option<&str> {
        self.deployer.as_deref()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// Property templates for resources of one type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceType {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
}

impl ResourceType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// Target overrides for one module or resource, addressed by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementOverride {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
}

impl ElementOverride {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

/// An environment with its supported types and per-element overrides.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Target {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) target_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) module_types: Vec<ModuleType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) resource_types: Vec<ResourceType>,
    #[serde(rename = "modules", skip_serializing_if = "Vec::is_empty")]
    pub(crate) module_overrides: Vec<ElementOverride>,
    #[serde(rename = "resources", skip_serializing_if = "Vec::is_empty")]
    pub(crate) resource_overrides: Vec<ElementOverride>,
}

impl Target {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_type(&self) -> Option<&str> {
        self.target_type.as_deref()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn module_types(&self) -> &[ModuleType] {
        &self.module_types
    }

    pub fn resource_types(&self) -> &[ResourceType] {
        &self.resource_types
    }

    pub fn module_overrides(&self) -> &[ElementOverride] {
        &self.module_overrides
    }

    pub fn resource_overrides(&self) -> &[ElementOverride] {
        &self.resource_overrides
    }
}

/// A deployment platform and the module/resource types it supports.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Platform {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) platform_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) module_types: Vec<ModuleType>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) resource_types: Vec<ResourceType>,
}

impl Platform {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform_type(&self) -> Option<&str> {
        self.platform_type.as_deref()
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn module_types(&self) -> &[ModuleType] {
        &self.module_types
    }

    pub fn resource_types(&self) -> &[ResourceType] {
        &self.resource_types
    }
}

/// A sparse overlay refining a deployment descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionDescriptor {
    #[serde(rename = "_schema-version")]
    pub(crate) schema_version: SchemaVersion,
    #[serde(rename = "ID", skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) modules: Vec<ExtensionModule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) resources: Vec<ExtensionResource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) targets: Vec<Target>,
}

impl ExtensionDescriptor {
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn extends(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    pub fn modules(&self) -> &[ExtensionModule] {
        &self.modules
    }

    pub fn resources(&self) -> &[ExtensionResource] {
        &self.resources
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }
}

/// Overrides for one base module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionModule {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
    #[serde(rename = "provides", skip_serializing_if = "Vec::is_empty")]
    pub(crate) provided_dependencies: Vec<ExtensionProvidedDependency>,
}

impl ExtensionModule {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn provided_dependencies(&self) -> &[ExtensionProvidedDependency] {
        &self.provided_dependencies
    }
}

/// Overrides for one base resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtensionResource {
    #[serde(skip)]
    pub(crate) schema_version: SchemaVersion,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) properties: PropertyMap,
    #[serde(skip_serializing_if = "is_empty_map")]
    pub(crate) parameters: PropertyMap,
}

impl ExtensionResource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}
