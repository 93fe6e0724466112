//! # Descriptor Merging
//!
//! Layers environment and extension overrides onto a base deployment
//! descriptor, in place.
//!
//! ## Merge Rules
//!
//! - Overrides address existing modules and resources by name. Entries naming
//!   something the base does not declare are ignored with a warning; merging
//!   never introduces new modules or resources.
//! - Override properties and parameters replace same-named keys of the base
//!   entity. Keys the override does not mention stay untouched. When both
//!   sides hold a mapping under the same key, that mapping is merged key by
//!   key one level down; deeper values are replaced wholesale.
//! - Module and resource type templates act as defaults: they only fill keys
//!   the entity does not already have.
//! - Parameters are only merged when both sides have them (schema version 2
//!   and later).
//!
//! Every merger indexes the descriptor before touching it, so a merge either
//! fails up front or applies completely. A layer carrying parameters cannot
//! be merged into a descriptor whose schema version has none; the merge
//! fails with [`Error::UnsupportedOperation`] instead of dropping them.
//!
//! ## Layers
//!
//! [`merge_layers`] applies a target first, then an extension descriptor.
//! Each layer is complete before the next one starts; later layers win.

mod extension;
mod target;

use log::debug;
use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::handler::TypeCatalog;
use crate::model::{
    DeploymentDescriptor, ExtensionDescriptor, ParametersContainer, PropertyMap, Target,
};
use crate::tree::stringify;
use crate::version::SchemaVersion;

pub use extension::ExtensionMerger;
pub use target::{PlatformMerger, TargetMerger};

/// Merges `source` into `target` one level deep.
///
/// `context` names the merged entity in log output.
///
/// # Examples
///
/// ```
/// use mta_descriptor::merge::merge_properties;
/// use mta_descriptor::model::PropertyMap;
///
/// let mut base: PropertyMap = serde_yaml::from_str("memory: 512M\nenv: {A: a, B: b}").unwrap();
/// let overrides: PropertyMap = serde_yaml::from_str("memory: 1G\nenv: {B: x}").unwrap();
/// merge_properties(&mut base, &overrides, "module 'api'");
///
/// let expected: PropertyMap = serde_yaml::from_str("memory: 1G\nenv: {A: a, B: x}").unwrap();
/// assert_eq!(base, expected);
/// ```
pub fn merge_properties(target: &mut PropertyMap, source: &PropertyMap, context: &str) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(Value::Mapping(existing)), Value::Mapping(nested)) => {
                for (nested_key, nested_value) in nested {
                    replace(existing, nested_key, nested_value, context);
                }
            }
            _ => replace(target, key, value, context),
        }
    }
}

fn replace(target: &mut PropertyMap, key: &Value, value: &Value, context: &str) {
    match target.get(key) {
        Some(existing) if existing == value => {}
        Some(_) => {
            debug!("Overriding '{}' of {}", stringify(key), context);
            target.insert(key.clone(), value.clone());
        }
        None => {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Fills the keys of `target` that are absent with the values of `defaults`.
pub fn apply_defaults(target: &mut PropertyMap, defaults: &PropertyMap) {
    for (key, value) in defaults {
        if !target.contains_key(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

/// Merges parameters when both entities have them.
fn merge_parameters(
    target: &mut impl ParametersContainer,
    source: &impl ParametersContainer,
    context: &str,
) {
    if let (Ok(source), Ok(target)) = (source.parameters(), target.parameters_mut()) {
        merge_properties(target, source, context);
    }
}

/// Applies parameter defaults when both entities have them.
fn default_parameters(target: &mut impl ParametersContainer, source: &impl ParametersContainer) {
    if let (Ok(source), Ok(target)) = (source.parameters(), target.parameters_mut()) {
        apply_defaults(target, source);
    }
}

/// Fails when one of `sources` carries parameters that a descriptor of
/// `version` cannot hold.
fn ensure_parameters_fit<'s>(
    version: SchemaVersion,
    sources: impl IntoIterator<Item = &'s dyn ParametersContainer>,
) -> Result<()> {
    if version.supports_parameters() {
        return Ok(());
    }
    let carries_parameters = |source: &dyn ParametersContainer| {
        source
            .parameters()
            .is_ok_and(|parameters| !parameters.is_empty())
    };
    if sources.into_iter().any(carries_parameters) {
        return Err(Error::UnsupportedOperation {
            field: "parameters".to_string(),
            version: version.to_string(),
        });
    }
    Ok(())
}

/// The type templates of a target or platform.
fn type_templates(catalog: &impl TypeCatalog) -> impl Iterator<Item = &dyn ParametersContainer> {
    let modules = catalog
        .module_types()
        .iter()
        .map(|entry| entry as &dyn ParametersContainer);
    let resources = catalog
        .resource_types()
        .iter()
        .map(|entry| entry as &dyn ParametersContainer);
    modules.chain(resources)
}

/// Applies a target, then an extension descriptor, to `descriptor`.
///
/// Either layer may be absent; with neither the descriptor is unchanged.
pub fn merge_layers(
    descriptor: &mut DeploymentDescriptor,
    target: Option<&Target>,
    extension: Option<&ExtensionDescriptor>,
) -> Result<()> {
    if let Some(target) = target {
        TargetMerger::new(target).merge(descriptor)?;
    }
    if let Some(extension) = extension {
        ExtensionMerger::new(extension).merge(descriptor)?;
    }
    Ok(())
}
