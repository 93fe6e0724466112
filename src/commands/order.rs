//! # Order Command Implementation
//!
//! This module implements the `order` subcommand, which prints the order in
//! which the modules of a deployment descriptor are deployed.
//!
//! ## Functionality
//!
//! - **Deployment Order**: Lists modules so that each comes after the modules
//!   it depends on, as text or as JSON.
//! - **Dependency Tree**: With `--tree`, shows every module with the modules
//!   it is deployed after.
//! - **Parallel Deployments**: Honors the descriptor's
//!   `enable-parallel-deployments` parameter, or `--parallel`, so that only
//!   hard dependencies constrain the order.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::{Args, ValueEnum};
use ptree::{print_tree, TreeItem};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use mta_descriptor::defaults;
use mta_descriptor::handler::DescriptorHandler;
use mta_descriptor::loader;
use mta_descriptor::output::{OutputConfig, Status};
use mta_descriptor::resolver::{ModuleDependencies, ModuleDependencyResolver, SortOptions};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print the deployment order of a descriptor's modules
#[derive(Args, Debug)]
pub struct OrderArgs {
    /// Path to the deployment descriptor (YAML or JSON).
    #[arg(value_name = "DESCRIPTOR")]
    pub descriptor: PathBuf,

    /// Only hard dependencies constrain the order.
    ///
    /// Also enabled by the descriptor parameter `enable-parallel-deployments`.
    #[arg(long, env = "MTA_PARALLEL_DEPLOYMENTS")]
    pub parallel: bool,

    /// Key under which required dependencies declare their type.
    #[arg(
        long,
        value_name = "KEY",
        env = "MTA_DEPENDENCY_TYPE_PROPERTY",
        default_value = defaults::DEPENDENCY_TYPE_PROPERTY
    )]
    pub dependency_type_property: String,

    /// Dependency type that always constrains the order.
    #[arg(
        long,
        value_name = "TYPE",
        env = "MTA_HARD_DEPENDENCY_TYPE",
        default_value = defaults::HARD_DEPENDENCY_TYPE
    )]
    pub hard_dependency_type: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Show the dependency tree instead of the flat order.
    #[arg(long)]
    pub tree: bool,
}

/// Execute the `order` command.
pub fn execute(args: OrderArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let descriptor = loader::load_deployment_descriptor(&args.descriptor).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load descriptor {}: {}",
            args.descriptor.display(),
            e
        )
    })?;

    let from_descriptor = SortOptions::from_descriptor(&descriptor);
    let options = SortOptions {
        parallel_deployments: args.parallel || from_descriptor.parallel_deployments,
        dependency_type_property: args.dependency_type_property,
        hard_dependency_type: args.hard_dependency_type,
    };

    let handler = DescriptorHandler::new(&descriptor)?;
    let resolver = ModuleDependencyResolver::new(&handler, options);
    let order = resolver.resolve()?;

    if args.tree {
        let graph = resolver.dependency_graph()?;
        let root = build_tree(descriptor.id(), &graph);
        print_tree(&root).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "id": descriptor.id(),
                "parallel": resolver.options().parallel_deployments,
                "order": order,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "{}",
                out.status(
                    Status::Info,
                    &format!("Deployment order for {}:", out.name(descriptor.id()))
                )
            );
            for (position, name) in order.names().iter().enumerate() {
                println!("   {}. {}", position + 1, name);
            }
        }
    }
    Ok(())
}

/// Builds the tree rooted at the descriptor: each module lists the modules
/// it is deployed after. A module is expanded once; later occurrences are
/// leaves marked `(see above)`.
fn build_tree(id: &str, graph: &[ModuleDependencies<'_>]) -> TreeNode {
    let edges: HashMap<&str, &[&str]> = graph
        .iter()
        .map(|entry| (entry.module.name(), entry.dependencies.as_slice()))
        .collect();
    let mut expanded = HashSet::new();
    TreeNode {
        label: id.to_string(),
        children: graph
            .iter()
            .map(|entry| build_module_node(entry.module.name(), &edges, &mut expanded))
            .collect(),
    }
}

fn build_module_node<'g>(
    name: &'g str,
    edges: &HashMap<&'g str, &'g [&'g str]>,
    expanded: &mut HashSet<&'g str>,
) -> TreeNode {
    if !expanded.insert(name) {
        return TreeNode {
            label: format!("{} (see above)", name),
            children: Vec::new(),
        };
    }
    // The graph is acyclic once the order resolved.
    let children = edges
        .get(name)
        .map(|dependencies| {
            dependencies
                .iter()
                .map(|&dependency| build_module_node(dependency, edges, expanded))
                .collect()
        })
        .unwrap_or_default();
    TreeNode {
        label: name.to_string(),
        children,
    }
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug, PartialEq)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mta_descriptor::parsers::parse_deployment_descriptor;

    #[test]
    fn test_build_tree() {
        let descriptor = parse_deployment_descriptor(
            &serde_yaml::from_str(
                r#"
_schema-version: 3
ID: shop
modules:
  - {name: web, type: js, deployed-after: [api]}
  - {name: api, type: java, deployed-after: [db]}
  - {name: db, type: hdb}
"#,
            )
            .unwrap(),
        )
        .unwrap();
        let handler = DescriptorHandler::new(&descriptor).unwrap();
        let graph = ModuleDependencyResolver::new(&handler, SortOptions::default())
            .dependency_graph()
            .unwrap();

        let tree = build_tree("shop", &graph);
        assert_eq!(tree.label, "shop");
        assert_eq!(tree.children.len(), 3);
        let web = &tree.children[0];
        assert_eq!(web.children[0].label, "api");
        assert_eq!(web.children[0].children[0].label, "db");
        assert_eq!(tree.children[1].label, "api (see above)");
        assert_eq!(tree.children[2].label, "db (see above)");
        assert!(tree.children[2].children.is_empty());
    }

    fn count_nodes(node: &TreeNode) -> usize {
        1 + node.children.iter().map(count_nodes).sum::<usize>()
    }

    #[test]
    fn test_shared_dependencies_are_expanded_once() {
        let modules = 30;
        let mut yaml = String::from("_schema-version: 3\nID: dense\nmodules:\n");
        for i in 0..modules {
            let after: Vec<String> = (0..i).map(|j| format!("m{j}")).collect();
            yaml.push_str(&format!(
                "  - name: m{i}\n    type: t\n    deployed-after: [{}]\n",
                after.join(", ")
            ));
        }
        let document = serde_yaml::from_str(&yaml).unwrap();
        let descriptor = parse_deployment_descriptor(&document).unwrap();
        let handler = DescriptorHandler::new(&descriptor).unwrap();
        let graph = ModuleDependencyResolver::new(&handler, SortOptions::default())
            .dependency_graph()
            .unwrap();

        let tree = build_tree("dense", &graph);
        let edges: usize = graph.iter().map(|entry| entry.dependencies.len()).sum();
        assert_eq!(count_nodes(&tree), 1 + modules + edges);
    }

    #[test]
    fn test_execute_missing_descriptor() {
        let args = OrderArgs {
            descriptor: PathBuf::from("/nonexistent/mtad.yaml"),
            parallel: false,
            dependency_type_property: defaults::DEPENDENCY_TYPE_PROPERTY.to_string(),
            hard_dependency_type: defaults::HARD_DEPENDENCY_TYPE.to_string(),
            format: OutputFormat::Text,
            tree: false,
        };
        assert!(execute(args, "never").is_err());
    }
}
