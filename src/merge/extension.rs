//! Extension descriptor layer.

use log::{debug, warn};

use super::{ensure_parameters_fit, merge_parameters, merge_properties, TargetMerger};
use crate::error::Result;
use crate::handler::{DescriptorHandler, ExtensionHandler};
use crate::model::{
    DeploymentDescriptor, ExtensionDescriptor, ExtensionModule, ExtensionResource,
    ParametersContainer,
};

/// Merges an extension descriptor into the descriptor it extends.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionMerger<'e> {
    extension: &'e ExtensionDescriptor,
    target: Option<&'e str>,
}

impl<'e> ExtensionMerger<'e> {
    pub fn new(extension: &'e ExtensionDescriptor) -> Self {
        Self {
            extension,
            target: None,
        }
    }

    /// Also merges the extension's target named `name`, before the extension
    /// itself.
    pub fn with_target(mut self, name: &'e str) -> Self {
        self.target = Some(name);
        self
    }

    pub fn merge(&self, descriptor: &mut DeploymentDescriptor) -> Result<()> {
        let extension = self.extension;
        let entries = extension
            .modules()
            .iter()
            .map(|module| module as &dyn ParametersContainer)
            .chain(
                extension
                    .resources()
                    .iter()
                    .map(|resource| resource as &dyn ParametersContainer),
            );
        ensure_parameters_fit(
            descriptor.schema_version(),
            std::iter::once(extension as &dyn ParametersContainer).chain(entries),
        )?;

        if let Some(name) = self.target {
            match ExtensionHandler::new(extension).find_target(name, None) {
                Some(target) => TargetMerger::new(target).merge(descriptor)?,
                None => warn!("Extension declares no target '{}'", name),
            }
        }

        let (modules, resources) = {
            let handler = DescriptorHandler::new(descriptor)?;
            let modules: Vec<(usize, &ExtensionModule)> = extension
                .modules()
                .iter()
                .filter_map(|module| {
                    let index = handler.module_position(module.name());
                    if index.is_none() {
                        warn!("Ignoring extension of unknown module '{}'", module.name());
                    }
                    index.map(|index| (index, module))
                })
                .collect();
            let resources: Vec<(usize, &ExtensionResource)> = extension
                .resources()
                .iter()
                .filter_map(|resource| {
                    let index = handler.resource_position(resource.name());
                    if index.is_none() {
                        warn!("Ignoring extension of unknown resource '{}'", resource.name());
                    }
                    index.map(|index| (index, resource))
                })
                .collect();
            (modules, resources)
        };
        debug!(
            "Merging extension {}: {} modules, {} resources",
            extension.id().unwrap_or("<anonymous>"),
            modules.len(),
            resources.len()
        );

        merge_parameters(descriptor, extension, "the descriptor");

        let module_slots = descriptor.modules_mut();
        for (index, entry) in modules {
            let module = &mut module_slots[index];
            let context = format!("module '{}'", module.name());
            merge_properties(module.properties_mut(), entry.properties(), &context);
            merge_parameters(module, entry, &context);

            for provided in entry.provided_dependencies() {
                let base = module
                    .provided_dependencies_mut()
                    .iter_mut()
                    .find(|dependency| dependency.name() == provided.name());
                match base {
                    Some(base) => {
                        let context = format!("provided dependency '{}'", provided.name());
                        merge_properties(base.properties_mut(), provided.properties(), &context);
                    }
                    None => warn!(
                        "Ignoring extension of unknown provided dependency '{}' of module '{}'",
                        provided.name(),
                        entry.name()
                    ),
                }
            }
        }

        let resource_slots = descriptor.resources_mut();
        for (index, entry) in resources {
            let resource = &mut resource_slots[index];
            let context = format!("resource '{}'", resource.name());
            merge_properties(resource.properties_mut(), entry.properties(), &context);
            merge_parameters(resource, entry, &context);
        }
        Ok(())
    }
}
