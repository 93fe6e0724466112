//! # Descriptor Lookup
//!
//! Name-based access to the entities of a built descriptor. A
//! [`DescriptorHandler`] indexes a deployment descriptor once when it is
//! created; every lookup afterwards is a hash map probe. Absent names are a
//! normal outcome and come back as `None`.
//!
//! Required dependencies name either a resource or a provided dependency.
//! [`DescriptorHandler::find_dependency`] returns the match as a
//! [`DependencyRef`] tagged by kind. A name declared as both kinds makes the
//! reference ambiguous, which is reported when the index is built.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{
    DeploymentDescriptor, ExtensionDescriptor, ExtensionModule, ExtensionProvidedDependency,
    ExtensionResource, Module, ModuleType, Platform, ProvidedDependency, Resource, ResourceType,
    Target,
};

/// The entity a required dependency name resolves to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DependencyRef<'a> {
    Resource(&'a Resource),
    ProvidedDependency {
        module: &'a Module,
        dependency: &'a ProvidedDependency,
    },
}

impl<'a> DependencyRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            DependencyRef::Resource(resource) => resource.name(),
            DependencyRef::ProvidedDependency { dependency, .. } => dependency.name(),
        }
    }

    /// The module providing the dependency, if it is not a resource.
    pub fn owning_module(&self) -> Option<&'a Module> {
        match self {
            DependencyRef::Resource(_) => None,
            DependencyRef::ProvidedDependency { module, .. } => Some(module),
        }
    }
}

/// Lookup index over a deployment descriptor.
#[derive(Debug, Clone)]
pub struct DescriptorHandler<'a> {
    descriptor: &'a DeploymentDescriptor,
    modules: HashMap<&'a str, usize>,
    resources: HashMap<&'a str, usize>,
    provided: HashMap<&'a str, (usize, usize)>,
}

impl<'a> DescriptorHandler<'a> {
    /// Indexes `descriptor`.
    ///
    /// Fails with [`Error::AmbiguousReference`] when a name is used for both a
    /// resource and a provided dependency.
    pub fn new(descriptor: &'a DeploymentDescriptor) -> Result<Self> {
        let modules = index_names(descriptor.modules().iter().map(|m| m.name()));
        let resources = index_names(descriptor.resources().iter().map(|r| r.name()));
        let provided = index_provided(
            descriptor
                .modules()
                .iter()
                .map(|m| m.provided_dependencies()),
        );

        if let Some(name) = descriptor
            .resources()
            .iter()
            .map(|r| r.name())
            .find(|name| provided.contains_key(name))
        {
            return Err(Error::AmbiguousReference {
                name: name.to_string(),
            });
        }

        Ok(Self {
            descriptor,
            modules,
            resources,
            provided,
        })
    }

    pub fn descriptor(&self) -> &'a DeploymentDescriptor {
        self.descriptor
    }

    pub fn find_module(&self, name: &str) -> Option<&'a Module> {
        self.modules
            .get(name)
            .map(|&index| &self.descriptor.modules()[index])
    }

    /// Declared position of the named module.
    pub fn module_position(&self, name: &str) -> Option<usize> {
        self.modules.get(name).copied()
    }

    pub fn find_resource(&self, name: &str) -> Option<&'a Resource> {
        self.resources
            .get(name)
            .map(|&index| &self.descriptor.resources()[index])
    }

    pub fn resource_position(&self, name: &str) -> Option<usize> {
        self.resources.get(name).copied()
    }

    /// The provided dependency named `name` together with its owning module.
    pub fn find_provided_dependency(
        &self,
        name: &str,
    ) -> Option<(&'a Module, &'a ProvidedDependency)> {
        self.provided.get(name).map(|&(module, dependency)| {
            let module = &self.descriptor.modules()[module];
            (module, &module.provided_dependencies()[dependency])
        })
    }

    /// Resolves a required dependency name to a resource or provided dependency.
    pub fn find_dependency(&self, name: &str) -> Option<DependencyRef<'a>> {
        if let Some(resource) = self.find_resource(name) {
            return Some(DependencyRef::Resource(resource));
        }
        self.find_provided_dependency(name)
            .map(|(module, dependency)| DependencyRef::ProvidedDependency { module, dependency })
    }
}

/// Lookup index over an extension descriptor.
#[derive(Debug, Clone)]
pub struct ExtensionHandler<'a> {
    extension: &'a ExtensionDescriptor,
    modules: HashMap<&'a str, usize>,
    resources: HashMap<&'a str, usize>,
    provided: HashMap<&'a str, (usize, usize)>,
}

impl<'a> ExtensionHandler<'a> {
    pub fn new(extension: &'a ExtensionDescriptor) -> Self {
        Self {
            extension,
            modules: index_names(extension.modules().iter().map(|m| m.name())),
            resources: index_names(extension.resources().iter().map(|r| r.name())),
            provided: index_provided(
                extension
                    .modules()
                    .iter()
                    .map(|m| m.provided_dependencies()),
            ),
        }
    }

    pub fn find_module(&self, name: &str) -> Option<&'a ExtensionModule> {
        self.modules
            .get(name)
            .map(|&index| &self.extension.modules()[index])
    }

    pub fn find_resource(&self, name: &str) -> Option<&'a ExtensionResource> {
        self.resources
            .get(name)
            .map(|&index| &self.extension.resources()[index])
    }

    pub fn find_provided_dependency(
        &self,
        name: &str,
    ) -> Option<(&'a ExtensionModule, &'a ExtensionProvidedDependency)> {
        self.provided.get(name).map(|&(module, dependency)| {
            let module = &self.extension.modules()[module];
            (module, &module.provided_dependencies()[dependency])
        })
    }

    /// The extension's target named `name`, or `default` when it has none.
    pub fn find_target(&self, name: &str, default: Option<&'a Target>) -> Option<&'a Target> {
        find_target(self.extension.targets(), name, default)
    }
}

/// The target named `name`, or `default` when none matches.
pub fn find_target<'t>(
    targets: &'t [Target],
    name: &str,
    default: Option<&'t Target>,
) -> Option<&'t Target> {
    targets
        .iter()
        .find(|target| target.name() == name)
        .or(default)
}

/// The platform named `name`; without a name the first platform is selected.
pub fn find_platform<'p>(platforms: &'p [Platform], name: Option<&str>) -> Option<&'p Platform> {
    match name {
        Some(name) => platforms.iter().find(|platform| platform.name() == name),
        None => platforms.first(),
    }
}

/// An environment that declares module and resource type templates.
pub trait TypeCatalog {
    fn module_types(&self) -> &[ModuleType];

    fn resource_types(&self) -> &[ResourceType];

    fn find_module_type(&self, name: &str) -> Option<&ModuleType> {
        self.module_types().iter().find(|t| t.name() == name)
    }

    fn find_resource_type(&self, name: &str) -> Option<&ResourceType> {
        self.resource_types().iter().find(|t| t.name() == name)
    }
}

impl TypeCatalog for Target {
    fn module_types(&self) -> &[ModuleType] {
        Target::module_types(self)
    }

    fn resource_types(&self) -> &[ResourceType] {
        Target::resource_types(self)
    }
}

impl TypeCatalog for Platform {
    fn module_types(&self) -> &[ModuleType] {
        Platform::module_types(self)
    }

    fn resource_types(&self) -> &[ResourceType] {
        Platform::resource_types(self)
    }
}

/// First occurrence wins; builders already reject duplicates.
fn index_names<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    let mut index = HashMap::new();
    for (position, name) in names.enumerate() {
        index.entry(name).or_insert(position);
    }
    index
}

fn index_provided<'a>(
    modules: impl Iterator<Item = &'a [ProvidedDependency]>,
) -> HashMap<&'a str, (usize, usize)> {
    let mut index = HashMap::new();
    for (module, provided) in modules.enumerate() {
        for (dependency, entry) in provided.iter().enumerate() {
            index.entry(entry.name()).or_insert((module, dependency));
        }
    }
    index
}
