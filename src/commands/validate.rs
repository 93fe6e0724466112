//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a
//! deployment descriptor and, optionally, extension descriptors against the
//! schema of their version.
//!
//! ## Functionality
//!
//! - **Schema Validation**: Parses the descriptor, reporting missing keys,
//!   wrong value types and duplicate names.
//! - **Reference Validation**: Builds the lookup index, which rejects names
//!   used for both a resource and a provided dependency.
//! - **Extension Validation**: Parses every extension and warns when it does
//!   not extend the validated descriptor. Every invalid extension is reported
//!   before the command fails.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use mta_descriptor::handler::DescriptorHandler;
use mta_descriptor::loader;
use mta_descriptor::output::{OutputConfig, Status};

/// Validate a deployment descriptor
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the deployment descriptor (YAML or JSON).
    #[arg(value_name = "DESCRIPTOR")]
    pub descriptor: PathBuf,

    /// Extension descriptors to validate against the descriptor.
    #[arg(long = "extension", value_name = "FILE")]
    pub extensions: Vec<PathBuf>,
}

/// Execute the `validate` command.
///
/// `color_flag` is the value of the global `--color` flag.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{}",
        out.status(
            Status::Scan,
            &format!("Validating descriptor: {}", args.descriptor.display())
        )
    );

    let descriptor = loader::load_deployment_descriptor(&args.descriptor).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load descriptor {}: {}",
            args.descriptor.display(),
            e
        )
    })?;
    DescriptorHandler::new(&descriptor)?;
    println!("{}", out.status(Status::Ok, "Descriptor is valid"));

    println!("\n{}", out.status(Status::Info, "Descriptor Summary:"));
    println!("   ID: {}", out.name(descriptor.id()));
    println!("   Schema version: {}", descriptor.schema_version());
    println!("   Modules: {}", descriptor.modules().len());
    println!("   Resources: {}", descriptor.resources().len());

    if let Some(description) = descriptor.description() {
        println!("   Description: {}", description);
    }

    let mut failed = 0;
    for path in &args.extensions {
        let extension = match loader::load_extension_descriptor(path, &descriptor) {
            Ok(extension) => extension,
            Err(e) => {
                failed += 1;
                println!(
                    "{}",
                    out.status(
                        Status::Error,
                        &out.failure(&format!("Extension {}: {}", path.display(), e))
                    )
                );
                continue;
            }
        };
        match extension.extends() {
            Some(extends) if extends != descriptor.id() => println!(
                "{}",
                out.status(
                    Status::Warn,
                    &format!(
                        "Extension {} extends '{}', not '{}'",
                        path.display(),
                        extends,
                        descriptor.id()
                    )
                )
            ),
            _ => println!(
                "{}",
                out.status(
                    Status::Ok,
                    &format!("Extension {} is valid", path.display())
                )
            ),
        }
    }

    if failed > 0 {
        anyhow::bail!("{} extension descriptor(s) failed validation", failed);
    }
    Ok(())
}
