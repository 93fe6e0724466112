//! # Entity Builders
//!
//! Builders are the only mutable intermediate of the model. Each one
//! accumulates field values through setters and produces one immutable
//! entity from [`Build::build`], or a single [`Error::Validation`] listing
//! every problem it found.
//!
//! ## Version Composition
//!
//! The base builder of each entity kind covers the version-1 field set.
//! Later versions wrap it instead of subclassing it:
//!
//! - [`ParametersExt`] adds the `parameters` setter (version 2).
//! - [`DeployedAfterExt`] adds the `deployed-after` setter (version 3,
//!   modules only).
//!
//! Wrappers dereference to the builder they wrap, so every base setter stays
//! available with unchanged behavior:
//!
//! ```
//! use mta_descriptor::model::builders::ModuleBuilder;
//! use mta_descriptor::model::{Build, ParametersContainer};
//! use mta_descriptor::version::SchemaVersion;
//!
//! let mut builder = ModuleBuilder::new(SchemaVersion::V3)
//!     .with_parameters()
//!     .with_deployed_after();
//! builder.name("web").module_type("javascript.nodejs");
//! builder.deployed_after(vec!["api".to_string()]);
//!
//! let module = builder.build().unwrap();
//! assert!(module.parameters().unwrap().is_empty());
//! assert_eq!(module.deployed_after().unwrap().unwrap(), ["api"]);
//! ```
//!
//! Setters of optional collections accept `None` as "use the default", which
//! is always an empty mapping or list.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use super::{
    unsupported, DeploymentDescriptor, ElementOverride, ExtensionDescriptor, ExtensionModule,
    ExtensionProvidedDependency, ExtensionResource, Module, ModuleType, ParametersContainer,
    Platform, PropertyMap, ProvidedDependency, RequiredDependency, Resource, ResourceType, Target,
};
use crate::error::{Error, Result};
use crate::schema::labels;
use crate::version::SchemaVersion;

/// Produces an immutable entity from accumulated field values.
pub trait Build: Sized {
    type Output;

    fn build(self) -> Result<Self::Output>;

    /// Extends this builder with the version-2 `parameters` field.
    fn with_parameters(self) -> ParametersExt<Self>
    where
        Self::Output: ParametersContainer,
    {
        ParametersExt {
            base: self,
            parameters: None,
        }
    }

    /// Extends this module builder with the version-3 `deployed-after` field.
    fn with_deployed_after(self) -> DeployedAfterExt<Self>
    where
        Self: Build<Output = Module>,
    {
        DeployedAfterExt {
            base: self,
            deployed_after: None,
        }
    }
}

/// Collects builder problems into one aggregated validation error.
struct Problems {
    object: &'static str,
    problems: Vec<String>,
}

impl Problems {
    fn new(object: &'static str) -> Self {
        Self {
            object,
            problems: Vec::new(),
        }
    }

    /// Returns the value of a mandatory field, recording a problem when unset.
    fn require(&mut self, value: Option<String>, field: &str) -> String {
        value.unwrap_or_else(|| {
            self.problems.push(format!("{} is not set", field));
            String::new()
        })
    }

    fn unique_names<'a>(&mut self, names: impl IntoIterator<Item = &'a str>, object: &str) {
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name) {
                self.problems.push(Error::not_unique("name", name, object).to_string());
            }
        }
    }

    fn finish(self) -> Result<()> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation {
                object: self.object.to_string(),
                problems: self.problems,
            })
        }
    }
}

/// Version-2 extension: adds `parameters` to any builder whose entity has them.
#[derive(Debug, Clone)]
pub struct ParametersExt<B> {
    base: B,
    parameters: Option<PropertyMap>,
}

impl<B> ParametersExt<B> {
    pub fn parameters(&mut self, parameters: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.parameters = parameters.into();
        self
    }
}

impl<B> Deref for ParametersExt<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.base
    }
}

impl<B> DerefMut for ParametersExt<B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut self.base
    }
}

impl<B> Build for ParametersExt<B>
where
    B: Build,
    B::Output: ParametersContainer,
{
    type Output = B::Output;

    fn build(self) -> Result<B::Output> {
        let mut entity = self.base.build()?;
        *entity.parameters_mut()? = self.parameters.unwrap_or_default();
        Ok(entity)
    }
}

/// Version-3 extension: adds the explicit `deployed-after` list to modules.
#[derive(Debug, Clone)]
pub struct DeployedAfterExt<B> {
    base: B,
    deployed_after: Option<Vec<String>>,
}

impl<B> DeployedAfterExt<B> {
    /// Sets the explicit ordering constraint. `None` leaves it undeclared.
    pub fn deployed_after(&mut self, modules: impl Into<Option<Vec<String>>>) -> &mut Self {
        self.deployed_after = modules.into();
        self
    }
}

impl<B> Deref for DeployedAfterExt<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.base
    }
}

impl<B> DerefMut for DeployedAfterExt<B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut self.base
    }
}

impl<B: Build<Output = Module>> Build for DeployedAfterExt<B> {
    type Output = Module;

    fn build(self) -> Result<Module> {
        let mut module = self.base.build()?;
        if !module.schema_version.supports_deployed_after() {
            return Err(unsupported("deployed-after", module.schema_version));
        }
        if let Some(modules) = self.deployed_after {
            module.set_deployed_after(modules)?;
        }
        Ok(module)
    }
}

pub type ModuleBuilderV2 = ParametersExt<ModuleBuilder>;
pub type ModuleBuilderV3 = DeployedAfterExt<ModuleBuilderV2>;

#[derive(Debug, Clone, Default)]
pub struct ProvidedDependencyBuilder {
    name: Option<String>,
    properties: Option<PropertyMap>,
}

impl ProvidedDependencyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }
}

impl Build for ProvidedDependencyBuilder {
    type Output = ProvidedDependency;

    fn build(self) -> Result<ProvidedDependency> {
        let mut problems = Problems::new(labels::PROVIDED_DEPENDENCY);
        let name = problems.require(self.name, "name");
        problems.finish()?;
        Ok(ProvidedDependency {
            name,
            properties: self.properties.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct RequiredDependencyBuilder {
    version: SchemaVersion,
    name: Option<String>,
    properties: Option<PropertyMap>,
}

impl RequiredDependencyBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            properties: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }
}

impl Build for RequiredDependencyBuilder {
    type Output = RequiredDependency;

    fn build(self) -> Result<RequiredDependency> {
        let mut problems = Problems::new(labels::REQUIRED_DEPENDENCY);
        let name = problems.require(self.name, "name");
        problems.finish()?;
        Ok(RequiredDependency {
            schema_version: self.version,
            name,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModuleBuilder {
    version: SchemaVersion,
    name: Option<String>,
    module_type: Option<String>,
    description: Option<String>,
    properties: Option<PropertyMap>,
    provided_dependencies: Option<Vec<ProvidedDependency>>,
    required_dependencies: Option<Vec<RequiredDependency>>,
}

impl ModuleBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            module_type: None,
            description: None,
            properties: None,
            provided_dependencies: None,
            required_dependencies: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn module_type(&mut self, module_type: impl Into<String>) -> &mut Self {
        self.module_type = Some(module_type.into());
        self
    }

    pub fn description(&mut self, description: impl Into<Option<String>>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }

    pub fn provided_dependencies(
        &mut self,
        dependencies: impl Into<Option<Vec<ProvidedDependency>>>,
    ) -> &mut Self {
        self.provided_dependencies = dependencies.into();
        self
    }

    pub fn required_dependencies(
        &mut self,
        dependencies: impl Into<Option<Vec<RequiredDependency>>>,
    ) -> &mut Self {
        self.required_dependencies = dependencies.into();
        self
    }
}

impl Build for ModuleBuilder {
    type Output = Module;

    fn build(self) -> Result<Module> {
        let mut problems = Problems::new(labels::MODULE);
        let name = problems.require(self.name, "name");
        let module_type = problems.require(self.module_type, "type");
        let provided_dependencies = self.provided_dependencies.unwrap_or_default();
        problems.unique_names(
            provided_dependencies.iter().map(|dep| dep.name()),
            labels::PROVIDED_DEPENDENCY,
        );
        problems.finish()?;

        Ok(Module {
            schema_version: self.version,
            name,
            module_type,
            description: self.description,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
            provided_dependencies,
            required_dependencies: self.required_dependencies.unwrap_or_default(),
            deployed_after: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResourceBuilder {
    version: SchemaVersion,
    name: Option<String>,
    resource_type: Option<String>,
    description: Option<String>,
    properties: Option<PropertyMap>,
}

impl ResourceBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            resource_type: None,
            description: None,
            properties: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn resource_type(&mut self, resource_type: impl Into<Option<String>>) -> &mut Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn description(&mut self, description: impl Into<Option<String>>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }
}

impl Build for ResourceBuilder {
    type Output = Resource;

    fn build(self) -> Result<Resource> {
        let mut problems = Problems::new(labels::RESOURCE);
        let name = problems.require(self.name, "name");
        problems.finish()?;
        Ok(Resource {
            schema_version: self.version,
            name,
            resource_type: self.resource_type,
            description: self.description,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorBuilder {
    version: SchemaVersion,
    id: Option<String>,
    app_version: Option<String>,
    description: Option<String>,
    modules: Option<Vec<Module>>,
    resources: Option<Vec<Resource>>,
}

impl DescriptorBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            id: None,
            app_version: None,
            description: None,
            modules: None,
            resources: None,
        }
    }

    pub fn id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    /// The application version (the document's `version` key).
    pub fn app_version(&mut self, version: impl Into<Option<String>>) -> &mut Self {
        self.app_version = version.into();
        self
    }

    pub fn description(&mut self, description: impl Into<Option<String>>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn modules(&mut self, modules: impl Into<Option<Vec<Module>>>) -> &mut Self {
        self.modules = modules.into();
        self
    }

    pub fn resources(&mut self, resources: impl Into<Option<Vec<Resource>>>) -> &mut Self {
        self.resources = resources.into();
        self
    }
}

impl Build for DescriptorBuilder {
    type Output = DeploymentDescriptor;

    fn build(self) -> Result<DeploymentDescriptor> {
        let mut problems = Problems::new(labels::DEPLOYMENT_DESCRIPTOR);
        let id = problems.require(self.id, "ID");
        let modules = self.modules.unwrap_or_default();
        let resources = self.resources.unwrap_or_default();
        problems.unique_names(modules.iter().map(|m| m.name()), labels::MODULE);
        problems.unique_names(resources.iter().map(|r| r.name()), labels::RESOURCE);
        problems.unique_names(
            modules
                .iter()
                .flat_map(|m| m.provided_dependencies.iter().map(|dep| dep.name())),
            labels::PROVIDED_DEPENDENCY,
        );
        problems.finish()?;

        Ok(DeploymentDescriptor {
            schema_version: self.version,
            id,
            version: self.app_version,
            description: self.description,
            parameters: PropertyMap::new(),
            modules,
            resources,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ModuleTypeBuilder {
    version: SchemaVersion,
    name: Option<String>,
    deployer: Option<String>,
    properties: Option<PropertyMap>,
}

impl ModuleTypeBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            deployer: None,
            properties: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn deployer(&mut self, deployer: impl Into<Option<String>>) -> &mut Self {
        self.deployer = deployer.into();
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }
}

impl Build for ModuleTypeBuilder {
    type Output = ModuleType;

    fn build(self) -> Result<ModuleType> {
        let mut problems = Problems::new(labels::MODULE_TYPE);
        let name = problems.require(self.name, "name");
        problems.finish()?;
        Ok(ModuleType {
            schema_version: self.version,
            name,
            deployer: self.deployer,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResourceTypeBuilder {
    version: SchemaVersion,
    name: Option<String>,
    properties: Option<PropertyMap>,
}

impl ResourceTypeBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            properties: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }
}

impl Build for ResourceTypeBuilder {
    type Output = ResourceType;

    fn build(self) -> Result<ResourceType> {
        let mut problems = Problems::new(labels::RESOURCE_TYPE);
        let name = problems.require(self.name, "name");
        problems.finish()?;
        Ok(ResourceType {
            schema_version: self.version,
            name,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ElementOverrideBuilder {
    version: SchemaVersion,
    object: &'static str,
    name: Option<String>,
    properties: Option<PropertyMap>,
}

impl ElementOverrideBuilder {
    /// `object` is the label of the override kind, used in diagnostics.
    pub fn new(version: SchemaVersion, object: &'static str) -> Self {
        Self {
            version,
            object,
            name: None,
            properties: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }
}

impl Build for ElementOverrideBuilder {
    type Output = ElementOverride;

    fn build(self) -> Result<ElementOverride> {
        let mut problems = Problems::new(self.object);
        let name = problems.require(self.name, "name");
        problems.finish()?;
        Ok(ElementOverride {
            schema_version: self.version,
            name,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
        })
    }
}

/// Fields shared by targets and platforms.
#[derive(Debug, Clone)]
struct EnvironmentFields {
    version: SchemaVersion,
    name: Option<String>,
    kind: Option<String>,
    description: Option<String>,
    properties: Option<PropertyMap>,
    module_types: Option<Vec<ModuleType>>,
    resource_types: Option<Vec<ResourceType>>,
}

impl EnvironmentFields {
    fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            kind: None,
            description: None,
            properties: None,
            module_types: None,
            resource_types: None,
        }
    }
}

macro_rules! environment_setters {
    ($builder:ty) => {
        impl $builder {
            pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
                self.fields.name = Some(name.into());
                self
            }

            /// The environment kind (the document's `type` key).
            pub fn kind(&mut self, kind: impl Into<Option<String>>) -> &mut Self {
                self.fields.kind = kind.into();
                self
            }

            pub fn description(&mut self, description: impl Into<Option<String>>) -> &mut Self {
                self.fields.description = description.into();
                self
            }

            pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
                self.fields.properties = properties.into();
                self
            }

            pub fn module_types(
                &mut self,
                module_types: impl Into<Option<Vec<ModuleType>>>,
            ) -> &mut Self {
                self.fields.module_types = module_types.into();
                self
            }

            pub fn resource_types(
                &mut self,
                resource_types: impl Into<Option<Vec<ResourceType>>>,
            ) -> &mut Self {
                self.fields.resource_types = resource_types.into();
                self
            }
        }
    };
}

#[derive(Debug, Clone)]
pub struct TargetBuilder {
    fields: EnvironmentFields,
    module_overrides: Option<Vec<ElementOverride>>,
    resource_overrides: Option<Vec<ElementOverride>>,
}

environment_setters!(TargetBuilder);

impl TargetBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            fields: EnvironmentFields::new(version),
            module_overrides: None,
            resource_overrides: None,
        }
    }

    pub fn module_overrides(
        &mut self,
        overrides: impl Into<Option<Vec<ElementOverride>>>,
    ) -> &mut Self {
        self.module_overrides = overrides.into();
        self
    }

    pub fn resource_overrides(
        &mut self,
        overrides: impl Into<Option<Vec<ElementOverride>>>,
    ) -> &mut Self {
        self.resource_overrides = overrides.into();
        self
    }
}

impl Build for TargetBuilder {
    type Output = Target;

    fn build(self) -> Result<Target> {
        let fields = self.fields;
        let mut problems = Problems::new(labels::TARGET);
        let name = problems.require(fields.name, "name");
        let module_overrides = self.module_overrides.unwrap_or_default();
        let resource_overrides = self.resource_overrides.unwrap_or_default();
        problems.unique_names(
            module_overrides.iter().map(|o| o.name()),
            labels::TARGET_MODULE,
        );
        problems.unique_names(
            resource_overrides.iter().map(|o| o.name()),
            labels::TARGET_RESOURCE,
        );
        problems.finish()?;

        Ok(Target {
            schema_version: fields.version,
            name,
            target_type: fields.kind,
            description: fields.description,
            properties: fields.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
            module_types: fields.module_types.unwrap_or_default(),
            resource_types: fields.resource_types.unwrap_or_default(),
            module_overrides,
            resource_overrides,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PlatformBuilder {
    fields: EnvironmentFields,
}

environment_setters!(PlatformBuilder);

impl PlatformBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            fields: EnvironmentFields::new(version),
        }
    }
}

impl Build for PlatformBuilder {
    type Output = Platform;

    fn build(self) -> Result<Platform> {
        let fields = self.fields;
        let mut problems = Problems::new(labels::PLATFORM);
        let name = problems.require(fields.name, "name");
        problems.finish()?;

        Ok(Platform {
            schema_version: fields.version,
            name,
            platform_type: fields.kind,
            description: fields.description,
            properties: fields.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
            module_types: fields.module_types.unwrap_or_default(),
            resource_types: fields.resource_types.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExtensionModuleBuilder {
    version: SchemaVersion,
    name: Option<String>,
    properties: Option<PropertyMap>,
    provided_dependencies: Option<Vec<ExtensionProvidedDependency>>,
}

impl ExtensionModuleBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            properties: None,
            provided_dependencies: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }

    pub fn provided_dependencies(
        &mut self,
        dependencies: impl Into<Option<Vec<ExtensionProvidedDependency>>>,
    ) -> &mut Self {
        self.provided_dependencies = dependencies.into();
        self
    }
}

impl Build for ExtensionModuleBuilder {
    type Output = ExtensionModule;

    fn build(self) -> Result<ExtensionModule> {
        let mut problems = Problems::new(labels::EXTENSION_MODULE);
        let name = problems.require(self.name, "name");
        let provided_dependencies = self.provided_dependencies.unwrap_or_default();
        problems.unique_names(
            provided_dependencies.iter().map(|dep| dep.name()),
            labels::EXTENSION_PROVIDED_DEPENDENCY,
        );
        problems.finish()?;
        Ok(ExtensionModule {
            schema_version: self.version,
            name,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
            provided_dependencies,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExtensionResourceBuilder {
    version: SchemaVersion,
    name: Option<String>,
    properties: Option<PropertyMap>,
}

impl ExtensionResourceBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            name: None,
            properties: None,
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn properties(&mut self, properties: impl Into<Option<PropertyMap>>) -> &mut Self {
        self.properties = properties.into();
        self
    }
}

impl Build for ExtensionResourceBuilder {
    type Output = ExtensionResource;

    fn build(self) -> Result<ExtensionResource> {
        let mut problems = Problems::new(labels::EXTENSION_RESOURCE);
        let name = problems.require(self.name, "name");
        problems.finish()?;
        Ok(ExtensionResource {
            schema_version: self.version,
            name,
            properties: self.properties.unwrap_or_default(),
            parameters: PropertyMap::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExtensionDescriptorBuilder {
    version: SchemaVersion,
    id: Option<String>,
    extends: Option<String>,
    description: Option<String>,
    modules: Option<Vec<ExtensionModule>>,
    resources: Option<Vec<ExtensionResource>>,
    targets: Option<Vec<Target>>,
}

impl ExtensionDescriptorBuilder {
    pub fn new(version: SchemaVersion) -> Self {
        Self {
            version,
            id: None,
            extends: None,
            description: None,
            modules: None,
            resources: None,
            targets: None,
        }
    }

    pub fn id(&mut self, id: impl Into<Option<String>>) -> &mut Self {
        self.id = id.into();
        self
    }

    pub fn extends(&mut self, extends: impl Into<Option<String>>) -> &mut Self {
        self.extends = extends.into();
        self
    }

    pub fn description(&mut self, description: impl Into<Option<String>>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn modules(&mut self, modules: impl Into<Option<Vec<ExtensionModule>>>) -> &mut Self {
        self.modules = modules.into();
        self
    }

    pub fn resources(
        &mut self,
        resources: impl Into<Option<Vec<ExtensionResource>>>,
    ) -> &mut Self {
        self.resources = resources.into();
        self
    }

    pub fn targets(&mut self, targets: impl Into<Option<Vec<Target>>>) -> &mut Self {
        self.targets = targets.into();
        self
    }
}

impl Build for ExtensionDescriptorBuilder {
    type Output = ExtensionDescriptor;

    fn build(self) -> Result<ExtensionDescriptor> {
        let mut problems = Problems::new(labels::EXTENSION_DESCRIPTOR);
        let modules = self.modules.unwrap_or_default();
        let resources = self.resources.unwrap_or_default();
        let targets = self.targets.unwrap_or_default();
        problems.unique_names(modules.iter().map(|m| m.name()), labels::EXTENSION_MODULE);
        problems.unique_names(
            resources.iter().map(|r| r.name()),
            labels::EXTENSION_RESOURCE,
        );
        problems.unique_names(
            modules
                .iter()
                .flat_map(|m| m.provided_dependencies.iter().map(|dep| dep.name())),
            labels::EXTENSION_PROVIDED_DEPENDENCY,
        );
        problems.unique_names(targets.iter().map(|t| t.name()), labels::TARGET);
        problems.finish()?;

        Ok(ExtensionDescriptor {
            schema_version: self.version,
            id: self.id,
            extends: self.extends,
            description: self.description,
            parameters: PropertyMap::new(),
            modules,
            resources,
            targets,
        })
    }
}
