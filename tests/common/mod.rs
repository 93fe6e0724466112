//! Shared test utilities for integration and E2E tests.
//!
//! This module provides descriptor fixtures and a temporary workspace to
//! write them into before invoking the library or the CLI binary.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("mtad.yaml", descriptors::SHOP_V3);
//!     fixture.command().arg("order").arg("mtad.yaml").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{descriptor, descriptors};
    pub use super::TestFixture;
}

/// Descriptor documents shared by the test suites.
#[allow(dead_code)]
pub mod descriptors {
    /// Three modules where `web` needs `api` and `api` needs `db`.
    pub const SHOP_V2: &str = r#"
_schema-version: "2.1"
ID: com.example.shop
version: 1.0.0
parameters:
  region: eu10
modules:
  - name: web
    type: javascript.nodejs
    properties:
      memory: 256M
    requires:
      - name: api-url
      - name: uaa
  - name: api
    type: java.tomcat
    properties:
      memory: 512M
      instances: 1
    provides:
      - name: api-url
        properties:
          url: https://api.example.com
    requires:
      - name: db-credentials
  - name: db
    type: com.sap.xs.hdi
    provides:
      - name: db-credentials
resources:
  - name: uaa
    type: com.sap.xs.uaa
    parameters:
      service-plan: application
"#;

    /// The same shop with explicit ordering.
    pub const SHOP_V3: &str = r#"
_schema-version: 3
ID: com.example.shop
modules:
  - name: web
    type: javascript.nodejs
    deployed-after: [api]
  - name: api
    type: java.tomcat
    deployed-after: [db]
  - name: db
    type: com.sap.xs.hdi
"#;

    /// `db` requires the url of `web`, closing a loop.
    pub const CYCLIC: &str = r#"
_schema-version: 2
ID: com.example.cyclic
modules:
  - name: db
    type: com.sap.xs.hdi
    provides:
      - name: db-credentials
    requires:
      - name: web-url
  - name: web
    type: javascript.nodejs
    provides:
      - name: web-url
    requires:
      - name: api-url
  - name: api
    type: java.tomcat
    provides:
      - name: api-url
    requires:
      - name: db-credentials
"#;

    /// Overrides for `SHOP_V2`.
    pub const SHOP_EXTENSION: &str = r#"
_schema-version: 2
ID: com.example.shop.prod
extends: com.example.shop
parameters:
  region: us10
modules:
  - name: api
    properties:
      instances: 4
    provides:
      - name: api-url
        properties:
          url: https://api.prod.example.com
resources:
  - name: uaa
    parameters:
      service-plan: broker
"#;

    /// Targets for `SHOP_V2`.
    pub const SHOP_TARGETS: &str = r#"
targets:
  - name: dev
    modules:
      - name: api
        properties:
          memory: 1G
  - name: prod
    modules:
      - name: api
        properties:
          memory: 2G
    module-types:
      - name: java.tomcat
        properties:
          buildpack: sap_java_buildpack
"#;
}

/// Parses a deployment descriptor from YAML text.
#[allow(dead_code)]
pub fn descriptor(yaml: &str) -> mta_descriptor::model::DeploymentDescriptor {
    let document = mta_descriptor::loader::parse_document(yaml).expect("Failed to parse YAML");
    mta_descriptor::parsers::parse_deployment_descriptor(&document)
        .expect("Failed to parse descriptor")
}

/// A temporary directory holding descriptor documents.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_file("mtad.yaml", descriptors::SHOP_V2)
///     .with_file("prod.mtaext", descriptors::SHOP_EXTENSION);
///
/// fixture
///     .command()
///     .args(["merge", "mtad.yaml", "--extension", "prod.mtaext"])
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of a file in the fixture.
    #[allow(dead_code)]
    pub fn file(&self, path: &str) -> PathBuf {
        self.temp_dir.path().join(path)
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mta-descriptor");
        cmd.current_dir(self.path()).env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
