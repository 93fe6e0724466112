//! # Error Handling
//!
//! This module defines the centralized error type for descriptor processing.
//! It uses the `thiserror` library to build a single `Error` enum that covers
//! every failure the core can report, from schema violations during parsing
//! to cycles found while ordering modules.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Each variant carries the structured detail a
//!   caller needs to produce a precise diagnostic (offending key, value and
//!   object label for schema violations, the full path for cycles, and so on).
//!
//! - **`ViolationKind`**: Distinguishes the three structural problems the
//!   schema validator can find: a missing key, a value of the wrong type, and
//!   a name that collides with a sibling.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Errors are never retried or swallowed inside the core. They propagate with
//! `?` to the immediate caller, which decides how to report them.

use std::fmt;

use thiserror::Error;

/// The structural problem behind a [`Error::SchemaViolation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A key marked as required by the schema is absent.
    Missing,
    /// The value does not have the type the schema expects.
    WrongType {
        /// Name of the expected type (e.g. `"string"`, `"mapping"`).
        expected: &'static str,
    },
    /// A name-unique value collides with a previously seen one.
    NotUnique,
}

/// Main error type for descriptor processing
#[derive(Error, Debug)]
pub enum Error {
    /// A document does not match the schema of its element.
    ///
    /// The message format is part of the external contract; uniqueness
    /// violations in particular must read exactly
    /// `Value "<value>" for key "<key>" not unique for object "<object>"`.
    #[error("{}", describe_violation(kind, key, value, object))]
    SchemaViolation {
        kind: ViolationKind,
        key: String,
        value: String,
        object: String,
    },

    /// The `_schema-version` of a document is malformed or not supported.
    #[error("Unsupported schema version: \"{version}\"")]
    UnsupportedSchemaVersion { version: String },

    /// A dependency name could not be resolved to an existing entity.
    #[error("Unresolved dependency \"{dependency}\" of module \"{module}\"")]
    DanglingDependency { module: String, dependency: String },

    /// The module dependency graph contains a cycle.
    ///
    /// `cycle` holds the full path; its first and last entries are equal.
    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// A name is declared by more than one kind of entity.
    #[error("Ambiguous reference \"{name}\": declared as both a resource and a provided dependency")]
    AmbiguousReference { name: String },

    /// A field was accessed that the schema version of the model does not have.
    #[error("Unsupported operation: {field} is not available in schema version {version}")]
    UnsupportedOperation { field: String, version: String },

    /// A builder could not produce a valid entity.
    #[error("Invalid {object}: {}", problems.join(", "))]
    Validation {
        object: String,
        problems: Vec<String>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An error occurred during serialization.
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl Error {
    /// Builds a uniqueness violation for `value` of `key` in `object`.
    pub fn not_unique(key: &str, value: &str, object: &str) -> Self {
        Error::SchemaViolation {
            kind: ViolationKind::NotUnique,
            key: key.to_string(),
            value: value.to_string(),
            object: object.to_string(),
        }
    }

    /// Builds a missing-key violation.
    pub fn missing(key: &str, object: &str) -> Self {
        Error::SchemaViolation {
            kind: ViolationKind::Missing,
            key: key.to_string(),
            value: String::new(),
            object: object.to_string(),
        }
    }

    /// Builds a type mismatch violation.
    pub fn wrong_type(key: &str, value: &str, expected: &'static str, object: &str) -> Self {
        Error::SchemaViolation {
            kind: ViolationKind::WrongType { expected },
            key: key.to_string(),
            value: value.to_string(),
            object: object.to_string(),
        }
    }
}

fn describe_violation(kind: &ViolationKind, key: &str, value: &str, object: &str) -> String {
    match kind {
        ViolationKind::Missing => {
            format!("Missing mandatory element \"{}\" for object \"{}\"", key, object)
        }
        ViolationKind::WrongType { expected } => format!(
            "Invalid value \"{}\" for key \"{}\" of object \"{}\", expected {}",
            value, key, object, expected
        ),
        ViolationKind::NotUnique => format!(
            "Value \"{}\" for key \"{}\" not unique for object \"{}\"",
            value, key, object
        ),
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Missing => write!(f, "missing"),
            ViolationKind::WrongType { expected } => write!(f, "expected {}", expected),
            ViolationKind::NotUnique => write!(f, "not unique"),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
