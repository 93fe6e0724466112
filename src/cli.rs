//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// MTA Descriptor - Validate, order and merge MTA deployment descriptors
#[derive(Parser, Debug)]
#[command(name = "mta-descriptor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a deployment descriptor and its extensions
    Validate(commands::validate::ValidateArgs),

    /// Print the deployment order of a descriptor's modules
    Order(commands::order::OrderArgs),

    /// Apply target and extension overrides and print the merged descriptor
    Merge(commands::merge::MergeArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Order(args) => commands::order::execute(args, &self.color),
            Commands::Merge(args) => commands::merge::execute(args),
        }
    }
}

/// Logs go to stderr so that command output stays machine-readable.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A logger may already be installed when commands run inside tests.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mta-descriptor",
            "order",
            "mtad.yaml",
            "--color",
            "never",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.color, "never");
        assert_eq!(cli.log_level, "debug");
        assert!(matches!(cli.command, Commands::Order(_)));
    }
}
