//! # Output Configuration
//!
//! Controls how the command-line tool decorates its output: status markers,
//! colors and the dependency tree glyphs all follow one policy.
//!
//! The policy respects the following flags and environment variables:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ```
//! use mta_descriptor::output::{OutputConfig, Status};
//!
//! let out = OutputConfig::from_env_and_flag("never");
//! assert_eq!(out.status(Status::Ok, "descriptor is valid"), "[OK] descriptor is valid");
//! ```

use std::env;

use console::style;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

/// Outcome kinds that get a marker in command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Scan,
    Ok,
    Info,
    Warn,
    Error,
}

impl Status {
    fn markers(self) -> (&'static str, &'static str) {
        match self {
            Status::Scan => ("🔍", "[SCAN]"),
            Status::Ok => ("✅", "[OK]"),
            Status::Info => ("📊", "[INFO]"),
            Status::Warn => ("⚠️", "[WARN]"),
            Status::Error => ("❌", "[ERR]"),
        }
    }
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// `color_flag` is the value of `--color`: `always` forces colors on
    /// (overriding `NO_COLOR`), `never` forces them off, anything else
    /// detects support from the environment and the terminal.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// A status line: the marker of `status` followed by `message`.
    pub fn status(&self, status: Status, message: &str) -> String {
        let (emoji_marker, plain) = status.markers();
        format!("{} {}", emoji(self, emoji_marker, plain), message)
    }

    /// Highlights an entity name (module, resource, target).
    pub fn name(&self, name: &str) -> String {
        if self.use_color {
            style(name).cyan().bold().to_string()
        } else {
            name.to_string()
        }
    }

    /// Renders a failure message.
    pub fn failure(&self, message: &str) -> String {
        if self.use_color {
            style(message).red().to_string()
        } else {
            message.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
