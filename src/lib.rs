//! # MTA Deployment Descriptor Library
//!
//! This library provides the core functionality for processing multi-target
//! application (MTA) deployment descriptors: validated parsing into a
//! versioned model, dependency-respecting deployment ordering, and layering
//! of target and extension overrides. It is designed to be used by the
//! `mta-descriptor` command-line tool but can also be integrated into any
//! deployment orchestrator.
//!
//! ## Quick Example
//!
//! ```
//! use mta_descriptor::handler::DescriptorHandler;
//! use mta_descriptor::loader::parse_document;
//! use mta_descriptor::parsers::parse_deployment_descriptor;
//! use mta_descriptor::resolver::SortOptions;
//!
//! let document = parse_document(r#"
//! _schema-version: "2.1"
//! ID: shop
//! modules:
//!   - name: web
//!     type: javascript
//!     requires: [api-url]
//!   - name: api
//!     type: java
//!     provides: [{name: api-url}]
//! "#).unwrap();
//!
//! let descriptor = parse_deployment_descriptor(&document).unwrap();
//! let handler = DescriptorHandler::new(&descriptor).unwrap();
//! let order = handler.modules_for_deployment(SortOptions::default()).unwrap();
//! assert_eq!(order.names(), ["api", "web"]);
//! ```
//!
//! ## Core Concepts
//!
//! - **Schema (`schema`, `version`)**: Per-version element schemas and the
//!   `_schema-version` rules. Every document is validated before anything is
//!   built from it.
//! - **Model (`model`)**: Immutable entities produced by builders. Later
//!   schema versions extend the version-1 builders by composition.
//! - **Parsers (`parsers`, `tree`)**: Typed extraction from the generic
//!   document tree into the model.
//! - **Lookup (`handler`)**: Name indexes over built descriptors.
//! - **Ordering (`resolver`)**: Explicit and inferred module dependencies,
//!   topologically sorted with cycle detection.
//! - **Merging (`merge`)**: Target, platform and extension overrides applied
//!   to a base descriptor.
//!
//! ## Processing Flow
//!
//! 1.  **Load**: Read YAML or JSON into a generic tree (`loader`).
//! 2.  **Parse**: Validate the tree and build the model (`parsers`).
//! 3.  **Merge**: Apply target and extension layers (`merge`).
//! 4.  **Resolve**: Compute the deployment order (`resolver`).

pub mod defaults;
pub mod error;
pub mod handler;
pub mod loader;
pub mod merge;
pub mod model;
pub mod output;
pub mod parsers;
pub mod resolver;
pub mod schema;
pub mod tree;
pub mod version;

#[cfg(test)]
mod resolver_proptest;
