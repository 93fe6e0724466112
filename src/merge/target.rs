//! Target and platform layers.

use log::{debug, warn};

use super::{
    apply_defaults, default_parameters, ensure_parameters_fit, merge_parameters, merge_properties,
    type_templates,
};
use crate::error::Result;
use crate::handler::{DescriptorHandler, TypeCatalog};
use crate::model::{DeploymentDescriptor, ElementOverride, ParametersContainer, Platform, Target};

/// Merges a target's overrides and type templates into a descriptor.
#[derive(Debug, Clone, Copy)]
pub struct TargetMerger<'t> {
    target: &'t Target,
}

impl<'t> TargetMerger<'t> {
    pub fn new(target: &'t Target) -> Self {
        Self { target }
    }

    pub fn merge(&self, descriptor: &mut DeploymentDescriptor) -> Result<()> {
        let target = self.target;
        let overrides = target
            .module_overrides()
            .iter()
            .chain(target.resource_overrides())
            .map(|entry| entry as &dyn ParametersContainer);
        ensure_parameters_fit(
            descriptor.schema_version(),
            overrides.chain(type_templates(target)),
        )?;

        let (modules, resources) = {
            let handler = DescriptorHandler::new(descriptor)?;
            (
                locate(target.module_overrides(), "module", target.name(), |name| {
                    handler.module_position(name)
                }),
                locate(target.resource_overrides(), "resource", target.name(), |name| {
                    handler.resource_position(name)
                }),
            )
        };
        debug!(
            "Merging target '{}': {} module and {} resource overrides",
            target.name(),
            modules.len(),
            resources.len()
        );

        let module_slots = descriptor.modules_mut();
        for (index, entry) in modules {
            let module = &mut module_slots[index];
            let context = format!("module '{}'", module.name());
            merge_properties(module.properties_mut(), entry.properties(), &context);
            merge_parameters(module, entry, &context);
        }
        let resource_slots = descriptor.resources_mut();
        for (index, entry) in resources {
            let resource = &mut resource_slots[index];
            let context = format!("resource '{}'", resource.name());
            merge_properties(resource.properties_mut(), entry.properties(), &context);
            merge_parameters(resource, entry, &context);
        }

        apply_type_defaults(descriptor, target);
        Ok(())
    }
}

/// Merges a platform's type templates into a descriptor.
#[derive(Debug, Clone, Copy)]
pub struct PlatformMerger<'p> {
    platform: &'p Platform,
}

impl<'p> PlatformMerger<'p> {
    pub fn new(platform: &'p Platform) -> Self {
        Self { platform }
    }

    pub fn merge(&self, descriptor: &mut DeploymentDescriptor) -> Result<()> {
        ensure_parameters_fit(descriptor.schema_version(), type_templates(self.platform))?;
        debug!("Merging platform '{}'", self.platform.name());
        apply_type_defaults(descriptor, self.platform);
        Ok(())
    }
}

/// Positions of the overridden entities; unknown names are dropped.
fn locate<'o>(
    overrides: &'o [ElementOverride],
    kind: &str,
    source: &str,
    position: impl Fn(&str) -> Option<usize>,
) -> Vec<(usize, &'o ElementOverride)> {
    overrides
        .iter()
        .filter_map(|entry| match position(entry.name()) {
            Some(index) => Some((index, entry)),
            None => {
                warn!(
                    "Ignoring override for unknown {} '{}' in '{}'",
                    kind,
                    entry.name(),
                    source
                );
                None
            }
        })
        .collect()
}

fn apply_type_defaults(descriptor: &mut DeploymentDescriptor, catalog: &impl TypeCatalog) {
    for module in descriptor.modules_mut() {
        if let Some(module_type) = catalog.find_module_type(module.module_type()) {
            apply_defaults(module.properties_mut(), module_type.properties());
            default_parameters(module, module_type);
        }
    }
    for resource in descriptor.resources_mut() {
        let resource_type = resource
            .resource_type()
            .and_then(|name| catalog.find_resource_type(name));
        if let Some(resource_type) = resource_type {
            apply_defaults(resource.properties_mut(), resource_type.properties());
            default_parameters(resource, resource_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParametersContainer;
    use crate::parsers::{parse_deployment_descriptor, ConfigurationParser};
    use crate::version::SchemaVersion;

    fn descriptor() -> DeploymentDescriptor {
        let yaml = r#"
_schema-version: 2
ID: shop
modules:
  - name: api
    type: java
    properties: {memory: 512M, env: {A: a}}
  - name: web
    type: javascript
    properties: {memory: 256M}
resources:
  - name: db
    type: postgresql
"#;
        parse_deployment_descriptor(&serde_yaml::from_str(yaml).unwrap()).unwrap()
    }

    fn target(yaml: &str) -> Target {
        ConfigurationParser::new(SchemaVersion::V2)
            .parse_target(&serde_yaml::from_str(yaml).unwrap())
            .unwrap()
    }

    const DEV: &str = r#"
name: dev
modules:
  - name: api
    properties: {memory: 1G, env: {B: b}}
    parameters: {instances: 2}
  - name: ghost
    properties: {memory: 4G}
resource-types:
  - name: postgresql
    properties: {plan: small}
"#;

    #[test]
    fn test_target_override_is_local() {
        let mut merged = descriptor();
        let before = merged.clone();
        TargetMerger::new(&target(DEV)).merge(&mut merged).unwrap();

        let api = &merged.modules()[0];
        assert_eq!(api.properties()["memory"], "1G");
        assert_eq!(api.properties()["env"]["A"], "a");
        assert_eq!(api.properties()["env"]["B"], "b");
        assert_eq!(api.parameters().unwrap()["instances"], 2);

        assert_eq!(merged.modules()[1], before.modules()[1]);
        assert_eq!(merged.modules().len(), 2);
        assert_eq!(merged.resources()[0].properties()["plan"], "small");
    }

    #[test]
    fn test_target_parameters_need_a_version_2_descriptor() {
        let yaml = "_schema-version: 1\nID: shop\nmodules:\n  - name: api\n    type: java\n";
        let base = parse_deployment_descriptor(&serde_yaml::from_str(yaml).unwrap()).unwrap();

        let mut merged = base.clone();
        let err = TargetMerger::new(&target(DEV)).merge(&mut merged).unwrap_err();
        assert!(err.to_string().contains("parameters"));
        assert_eq!(merged, base);
    }

    #[test]
    fn test_target_merge_is_idempotent() {
        let target = target(DEV);
        let mut once = descriptor();
        TargetMerger::new(&target).merge(&mut once).unwrap();
        let mut twice = once.clone();
        TargetMerger::new(&target).merge(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_target_is_a_no_op() {
        let mut merged = descriptor();
        TargetMerger::new(&target("name: empty")).merge(&mut merged).unwrap();
        assert_eq!(merged, descriptor());
    }

    #[test]
    fn test_module_type_defaults_do_not_override() {
        let target = target(
            "name: dev\nmodule-types:\n  - name: java\n    properties: {memory: 2G, buildpack: java_bp}\n",
        );
        let mut merged = descriptor();
        TargetMerger::new(&target).merge(&mut merged).unwrap();
        let api = &merged.modules()[0];
        assert_eq!(api.properties()["memory"], "512M");
        assert_eq!(api.properties()["buildpack"], "java_bp");
    }

    #[test]
    fn test_platform_defaults() {
        let platform = ConfigurationParser::new(SchemaVersion::V2)
            .parse_platform(
                &serde_yaml::from_str(
                    "name: cf\nmodule-types:\n  - name: javascript\n    parameters: {memory: 128M}\n",
                )
                .unwrap(),
            )
            .unwrap();
        let mut merged = descriptor();
        PlatformMerger::new(&platform).merge(&mut merged).unwrap();
        assert_eq!(merged.modules()[1].parameters().unwrap()["memory"], "128M");
        assert!(merged.modules()[0].parameters().unwrap().is_empty());
    }
}
