//! # Merge Command Implementation
//!
//! This module implements the `merge` subcommand, which applies the layered
//! overrides of a deployment and prints the merged descriptor as YAML.
//!
//! ## Layers
//!
//! The descriptor is merged in this order, each layer optional:
//!
//! 1. **Target**: selected by `--target` from `--target-file`, or from the
//!    extension's own targets. Its module and resource overrides replace
//!    properties and its type templates fill in missing ones.
//! 2. **Extension**: descriptor parameters, modules, provided dependencies
//!    and resources from `--extension`.
//! 3. **Platform**: type templates from `--platform-file`.
//!
//! Input files are never modified.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use log::info;
use std::path::PathBuf;

use mta_descriptor::handler::{find_platform, find_target};
use mta_descriptor::loader;
use mta_descriptor::merge::{merge_layers, PlatformMerger};
use mta_descriptor::model::{DeploymentDescriptor, ExtensionDescriptor, Target};

/// Apply target, extension and platform overrides to a descriptor
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Path to the deployment descriptor (YAML or JSON).
    #[arg(value_name = "DESCRIPTOR")]
    pub descriptor: PathBuf,

    /// Document holding a target or a `targets` list.
    #[arg(long, value_name = "FILE")]
    pub target_file: Option<PathBuf>,

    /// Name of the target to apply; defaults to the first one available.
    #[arg(long, value_name = "NAME", env = "MTA_TARGET")]
    pub target: Option<String>,

    /// Extension descriptor to apply after the target.
    #[arg(long, value_name = "FILE")]
    pub extension: Option<PathBuf>,

    /// Document holding a platform or a `platforms` list.
    #[arg(long, value_name = "FILE")]
    pub platform_file: Option<PathBuf>,

    /// Name of the platform to apply; defaults to the first one.
    #[arg(long, value_name = "NAME", requires = "platform_file")]
    pub platform: Option<String>,
}

/// Execute the `merge` command.
pub fn execute(args: MergeArgs) -> Result<()> {
    let descriptor = merged_descriptor(&args)?;
    print!("{}", loader::to_yaml(&descriptor)?);
    Ok(())
}

fn merged_descriptor(args: &MergeArgs) -> Result<DeploymentDescriptor> {
    let mut descriptor = loader::load_deployment_descriptor(&args.descriptor)
        .with_context(|| format!("Failed to load descriptor {}", args.descriptor.display()))?;

    let extension = args
        .extension
        .as_ref()
        .map(|path| {
            loader::load_extension_descriptor(path, &descriptor)
                .with_context(|| format!("Failed to load extension {}", path.display()))
        })
        .transpose()?;

    let targets = match &args.target_file {
        Some(path) => loader::load_targets(path, &descriptor)
            .with_context(|| format!("Failed to load targets {}", path.display()))?,
        None => Vec::new(),
    };
    let target = select_target(&targets, extension.as_ref(), args.target.as_deref())?;
    if let Some(target) = target {
        info!("Applying target '{}'", target.name());
    }

    merge_layers(&mut descriptor, target, extension.as_ref())?;

    if let Some(path) = &args.platform_file {
        let platforms = loader::load_platforms(path, &descriptor)
            .with_context(|| format!("Failed to load platforms {}", path.display()))?;
        let platform = find_platform(&platforms, args.platform.as_deref()).ok_or_else(|| {
            anyhow!(
                "Platform '{}' not found in {}",
                args.platform.as_deref().unwrap_or_default(),
                path.display()
            )
        })?;
        info!("Applying platform '{}'", platform.name());
        PlatformMerger::new(platform).merge(&mut descriptor)?;
    }

    Ok(descriptor)
}

/// Picks the target from the target file first, then from the extension.
///
/// A requested name that matches nothing is an error; without a name the
/// first available target is used.
fn select_target<'t>(
    targets: &'t [Target],
    extension: Option<&'t ExtensionDescriptor>,
    name: Option<&str>,
) -> Result<Option<&'t Target>> {
    let extension_targets = extension.map(|e| e.targets()).unwrap_or_default();
    match name {
        Some(name) => find_target(targets, name, None)
            .or_else(|| find_target(extension_targets, name, None))
            .map(Some)
            .ok_or_else(|| anyhow!("Target '{}' not found", name)),
        None => Ok(targets.first().or_else(|| extension_targets.first())),
    }
}
