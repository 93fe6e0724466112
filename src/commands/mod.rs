//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `mta-descriptor` command-line tool. Each subcommand is defined in its own
//! file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `mta_descriptor` library.

pub mod merge;
pub mod order;
pub mod validate;
