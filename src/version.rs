//! # Schema Version Resolution
//!
//! Every deployment and extension descriptor declares the schema it was
//! written against under the `_schema-version` key. The version decides which
//! optional fields exist in the model and which element schema the parsers
//! validate against.
//!
//! ## Accepted Forms
//!
//! Authors write the version in four ways, all of which normalize to the same
//! `(major, minor)` pair:
//!
//! - a plain integer: `_schema-version: 2`
//! - a dotted number: `_schema-version: 2.1`
//! - a quoted integer: `_schema-version: "2"`
//! - a quoted dotted number: `_schema-version: "2.1"`
//!
//! The minor part defaults to `0` when absent. A trailing patch component
//! (`"3.1.0"`) is accepted and dropped.
//!
//! An unquoted dotted number is a YAML float, so trailing zeros of the minor
//! part are gone before the version is read: `2.10` reads as `2.1`. Minor
//! versions of two or more digits must be quoted (`"2.10"`).

use std::fmt;

use serde::{Serialize, Serializer};
use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// Key holding the schema version in descriptor documents.
pub const SCHEMA_VERSION_KEY: &str = "_schema-version";

/// Lowest supported major schema version.
pub const MIN_SUPPORTED_MAJOR: u32 = 1;

/// Highest supported major schema version.
pub const MAX_SUPPORTED_MAJOR: u32 = 3;

/// A normalized `(major, minor)` schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVersion {
    pub major: u32,
    pub minor: u32,
}

impl SchemaVersion {
    pub const V1: SchemaVersion = SchemaVersion::new(1, 0);
    pub const V2: SchemaVersion = SchemaVersion::new(2, 0);
    pub const V3: SchemaVersion = SchemaVersion::new(3, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses a version from its textual form and checks the supported range.
    ///
    /// # Examples
    ///
    /// ```
    /// use mta_descriptor::version::SchemaVersion;
    ///
    /// assert_eq!(SchemaVersion::parse("2").unwrap(), SchemaVersion::new(2, 0));
    /// assert_eq!(SchemaVersion::parse("3.1").unwrap(), SchemaVersion::new(3, 1));
    /// assert!(SchemaVersion::parse("7").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedSchemaVersion {
            version: text.to_string(),
        };

        let mut parts = text.trim().split('.');
        let major = parts
            .next()
            .and_then(|part| part.parse::<u32>().ok())
            .ok_or_else(unsupported)?;
        let minor = match parts.next() {
            Some(part) => part.parse::<u32>().map_err(|_| unsupported())?,
            None => 0,
        };
        if let Some(patch) = parts.next() {
            patch.parse::<u32>().map_err(|_| unsupported())?;
        }
        if parts.next().is_some() {
            return Err(unsupported());
        }

        if !(MIN_SUPPORTED_MAJOR..=MAX_SUPPORTED_MAJOR).contains(&major) {
            return Err(unsupported());
        }
        Ok(Self::new(major, minor))
    }

    /// Normalizes a raw `_schema-version` value (number or string).
    ///
    /// Numbers are read through their shortest float form, so `2.10` and
    /// `2.1` are the same version; only the quoted `"2.10"` has minor 10.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Self::parse(text),
            Value::Number(number) => Self::parse(&number.to_string()),
            other => Err(Error::UnsupportedSchemaVersion {
                version: crate::tree::stringify(other),
            }),
        }
    }

    /// Reads the declared version of a document, if any.
    pub fn detect(document: &Mapping) -> Result<Option<Self>> {
        document
            .get(SCHEMA_VERSION_KEY)
            .map(Self::from_value)
            .transpose()
    }

    /// Whether entities of this version carry a `parameters` mapping.
    pub fn supports_parameters(&self) -> bool {
        self.major >= 2
    }

    /// Whether modules of this version carry an explicit `deployed-after` list.
    pub fn supports_deployed_after(&self) -> bool {
        self.major >= 3
    }
}

/// Serialized in its dotted textual form, as written in documents.
impl Serialize for SchemaVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
