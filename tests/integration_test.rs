//! Integration tests for descriptor processing
//!
//! These tests drive the public library API the way a deployment pipeline
//! does: load documents, index them, merge the override layers and compute
//! the deployment order.
//!
//! ## Test Coverage
//!
//! These integration tests verify:
//! - Deployment ordering, cycle reporting and parallel deployments
//! - Uniqueness diagnostics for base and extension descriptors
//! - Locality and idempotence of target and extension merges
//! - Schema version normalization and serialization round trips

mod common;

use common::prelude::*;
use mta_descriptor::error::{Error, ViolationKind};
use mta_descriptor::handler::{find_target, DescriptorHandler};
use mta_descriptor::loader;
use mta_descriptor::merge::{merge_layers, ExtensionMerger, TargetMerger};
use mta_descriptor::model::{DeploymentDescriptor, ParametersContainer};
use mta_descriptor::parsers::{ConfigurationParser, DescriptorParser};
use mta_descriptor::resolver::{migrate_deployed_after, ModuleDependencyResolver, SortOptions};
use mta_descriptor::version::SchemaVersion;

fn order(descriptor: &DeploymentDescriptor, options: SortOptions) -> Result<Vec<String>, Error> {
    let handler = DescriptorHandler::new(descriptor)?;
    let order = ModuleDependencyResolver::new(&handler, options).resolve()?;
    Ok(order.names().into_iter().map(String::from).collect())
}

#[test]
fn test_providers_are_deployed_first() {
    let shop = descriptor(descriptors::SHOP_V2);
    assert_eq!(
        order(&shop, SortOptions::default()).unwrap(),
        ["db", "api", "web"]
    );
}

#[test]
fn test_inferred_and_explicit_orders_match() {
    let inferred = descriptor(descriptors::SHOP_V2);
    let explicit = descriptor(descriptors::SHOP_V3);
    assert_eq!(
        order(&inferred, SortOptions::default()).unwrap(),
        order(&explicit, SortOptions::default()).unwrap()
    );
}

#[test]
fn test_cycle_error_names_the_whole_path() {
    let cyclic = descriptor(descriptors::CYCLIC);
    match order(&cyclic, SortOptions::default()).unwrap_err() {
        Error::CyclicDependency { cycle } => {
            assert_eq!(cycle, ["db", "web", "api", "db"]);
        }
        other => panic!("expected a cycle, got {other}"),
    }
}

#[test]
fn test_parallel_deployments_keep_only_hard_dependencies() {
    let yaml = r#"
_schema-version: 2
ID: parallel
parameters:
  enable-parallel-deployments: true
modules:
  - name: web
    type: javascript
    requires:
      - name: api-url
  - name: worker
    type: java
    requires:
      - name: api-url
        parameters:
          dependency-type: hard
  - name: api
    type: java
    provides:
      - name: api-url
"#;
    let parallel = descriptor(yaml);
    let options = SortOptions::from_descriptor(&parallel);
    assert!(options.parallel_deployments);
    assert_eq!(
        order(&parallel, options).unwrap(),
        ["web", "api", "worker"]
    );
    assert_eq!(
        order(&parallel, SortOptions::default()).unwrap(),
        ["api", "web", "worker"]
    );
}

#[test]
fn test_migrated_descriptor_keeps_its_order() {
    let yaml = descriptors::SHOP_V2.replace("_schema-version: \"2.1\"", "_schema-version: 3");
    let mut shop = descriptor(&yaml);
    let before = order(&shop, SortOptions::default()).unwrap();

    let updated = migrate_deployed_after(&mut shop, &SortOptions::default()).unwrap();
    assert_eq!(updated, 3);
    assert_eq!(
        shop.modules()[0].deployed_after().unwrap(),
        Some(&["api".to_string()][..])
    );
    assert_eq!(order(&shop, SortOptions::default()).unwrap(), before);
}

#[test]
fn test_duplicate_provided_dependency_across_modules() {
    let yaml = r#"
_schema-version: 2
ID: dup
modules:
  - name: a
    type: java
    provides:
      - name: shared
  - name: b
    type: java
    provides:
      - name: shared
"#;
    let document = loader::parse_document(yaml).unwrap();
    let err = DescriptorParser::new(SchemaVersion::V2)
        .parse_deployment_descriptor(&document)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Value "shared" for key "name" not unique for object "MTA provided dependency""#
    );
}

#[test]
fn test_duplicate_extension_resources() {
    let yaml = r#"
extends: com.example.shop
resources:
  - name: uaa
  - name: uaa
"#;
    let document = loader::parse_document(yaml).unwrap();
    let err = DescriptorParser::new(SchemaVersion::V2)
        .parse_extension_descriptor(&document)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Value "uaa" for key "name" not unique for object "MTA extension resource""#
    );
}

#[test]
fn test_duplicate_extension_provided_dependencies() {
    let across_modules = r#"
extends: com.example.shop
modules:
  - name: api
    provides:
      - name: x
  - name: db
    provides:
      - name: x
"#;
    let within_module = r#"
extends: com.example.shop
modules:
  - name: api
    provides:
      - name: x
      - name: x
"#;
    for yaml in [across_modules, within_module] {
        let document = loader::parse_document(yaml).unwrap();
        let err = DescriptorParser::new(SchemaVersion::V2)
            .parse_extension_descriptor(&document)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Value "x" for key "name" not unique for object "MTA extension provided dependency""#
        );
    }
}

#[test]
fn test_missing_id_is_reported() {
    let document = loader::parse_document("_schema-version: 2\nmodules: []\n").unwrap();
    match DescriptorParser::new(SchemaVersion::V2)
        .parse_deployment_descriptor(&document)
        .unwrap_err()
    {
        Error::SchemaViolation {
            kind, key, object, ..
        } => {
            assert_eq!(kind, ViolationKind::Missing);
            assert_eq!(key, "ID");
            assert_eq!(object, "MTA deployment descriptor");
        }
        other => panic!("expected a schema violation, got {other}"),
    }
}

#[test]
fn test_schema_versions_are_normalized() {
    for (declared, expected) in [("2", "2.0"), ("\"2.1\"", "2.1"), ("3.0.1", "3.0")] {
        let yaml = format!("_schema-version: {declared}\nID: v\n");
        let parsed = descriptor(&yaml);
        assert_eq!(parsed.schema_version().to_string(), expected);
    }
}

#[test]
fn test_unsupported_schema_version() {
    let document = loader::parse_document("_schema-version: 4\nID: v\n").unwrap();
    let err = mta_descriptor::parsers::parse_deployment_descriptor(&document).unwrap_err();
    assert!(matches!(err, Error::UnsupportedSchemaVersion { .. }));
}

#[test]
fn test_target_merge_is_local_and_idempotent() {
    let shop = descriptor(descriptors::SHOP_V2);
    let targets = ConfigurationParser::new(shop.schema_version())
        .parse_targets(&loader::parse_document(descriptors::SHOP_TARGETS).unwrap())
        .unwrap();
    let prod = find_target(&targets, "prod", None).unwrap();

    let mut once = shop.clone();
    TargetMerger::new(prod).merge(&mut once).unwrap();
    let mut twice = once.clone();
    TargetMerger::new(prod).merge(&mut twice).unwrap();
    assert_eq!(once, twice);

    let api = &once.modules()[1];
    assert_eq!(api.properties()["memory"], "2G");
    assert_eq!(api.properties()["instances"], 1);
    assert_eq!(api.properties()["buildpack"], "sap_java_buildpack");
    assert_eq!(once.modules()[0], shop.modules()[0]);
    assert_eq!(once.modules()[2], shop.modules()[2]);
}

#[test]
fn test_layers_apply_target_then_extension() {
    let mut shop = descriptor(descriptors::SHOP_V2);
    let targets = ConfigurationParser::new(shop.schema_version())
        .parse_targets(&loader::parse_document(descriptors::SHOP_TARGETS).unwrap())
        .unwrap();
    let extension = DescriptorParser::new(shop.schema_version())
        .parse_extension_descriptor(&loader::parse_document(descriptors::SHOP_EXTENSION).unwrap())
        .unwrap();

    merge_layers(&mut shop, Some(&targets[0]), Some(&extension)).unwrap();

    assert_eq!(shop.parameters().unwrap()["region"], "us10");
    let api = &shop.modules()[1];
    assert_eq!(api.properties()["memory"], "1G");
    assert_eq!(api.properties()["instances"], 4);
    assert_eq!(
        api.provided_dependencies()[0].properties()["url"],
        "https://api.prod.example.com"
    );
    assert_eq!(
        shop.resources()[0].parameters().unwrap()["service-plan"],
        "broker"
    );
}

#[test]
fn test_extension_merge_is_idempotent() {
    let shop = descriptor(descriptors::SHOP_V2);
    let extension = DescriptorParser::new(shop.schema_version())
        .parse_extension_descriptor(&loader::parse_document(descriptors::SHOP_EXTENSION).unwrap())
        .unwrap();

    let mut once = shop.clone();
    ExtensionMerger::new(&extension).merge(&mut once).unwrap();
    let mut twice = once.clone();
    ExtensionMerger::new(&extension).merge(&mut twice).unwrap();
    assert_eq!(once, twice);
    assert_ne!(once, shop);
}

#[test]
fn test_serialized_descriptor_parses_back() {
    let shop = descriptor(descriptors::SHOP_V2);
    let yaml = serde_yaml::to_string(&shop).unwrap();
    assert_eq!(descriptor(&yaml), shop);
}

#[test]
fn test_load_from_fixture_files() {
    let fixture = TestFixture::new()
        .with_file("mtad.yaml", descriptors::SHOP_V2)
        .with_file("prod.mtaext", descriptors::SHOP_EXTENSION)
        .with_file("targets.yaml", descriptors::SHOP_TARGETS);

    let shop = loader::load_deployment_descriptor(&fixture.file("mtad.yaml")).unwrap();
    let extension =
        loader::load_extension_descriptor(&fixture.file("prod.mtaext"), &shop).unwrap();
    let targets = loader::load_targets(&fixture.file("targets.yaml"), &shop).unwrap();

    assert_eq!(extension.extends(), Some(shop.id()));
    assert_eq!(
        targets.iter().map(|t| t.name()).collect::<Vec<_>>(),
        ["dev", "prod"]
    );
}
