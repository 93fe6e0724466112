//! # Module Dependency Resolution
//!
//! Computes the order in which the modules of a deployment descriptor are
//! deployed: every module comes after all the modules it depends on.
//!
//! ## Dependency Sets
//!
//! The dependencies of a module come from one of two places:
//!
//! - **Explicit**: from schema version 3 on, a module may declare the modules
//!   it is deployed after. A declared list is authoritative.
//! - **Inferred**: every required dependency that resolves to a provided
//!   dependency makes the providing module a dependency. With parallel
//!   deployments enabled only hard-typed dependencies count; the others may
//!   deploy concurrently. Resources never add ordering constraints.
//!
//! Version-3 modules that declare no list fall back to the inferred set.
//!
//! [`DependencyCollector::collect`] only computes the set. Writing it back
//! onto a module as its explicit deployed-after list is the separate
//! [`apply_deployed_after`] step, used by [`migrate_deployed_after`] to move
//! a descriptor to explicit ordering.
//!
//! ## Ordering
//!
//! A depth-first topological sort visits modules in declaration order, so the
//! relative order of independent modules is preserved. Reaching a module that
//! is still on the visitation stack fails with [`Error::CyclicDependency`]
//! carrying the whole cycle.

use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_yaml::Value;

use crate::defaults;
use crate::error::{Error, Result};
use crate::handler::DescriptorHandler;
use crate::model::{DeploymentDescriptor, Module, ParametersContainer};

/// Caller-supplied inputs of dependency inference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOptions {
    /// Whether only hard dependencies constrain the order.
    pub parallel_deployments: bool,
    /// Key holding the dependency type of a required dependency.
    pub dependency_type_property: String,
    /// Dependency type treated as hard.
    pub hard_dependency_type: String,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            parallel_deployments: false,
            dependency_type_property: defaults::DEPENDENCY_TYPE_PROPERTY.to_string(),
            hard_dependency_type: defaults::HARD_DEPENDENCY_TYPE.to_string(),
        }
    }
}

impl SortOptions {
    /// Default options with the parallel flag taken from the descriptor's
    /// `enable-parallel-deployments` parameter. Version-1 descriptors never
    /// deploy in parallel.
    pub fn from_descriptor(descriptor: &DeploymentDescriptor) -> Self {
        let parallel_deployments = descriptor
            .parameters()
            .ok()
            .and_then(|parameters| parameters.get(defaults::PARALLEL_DEPLOYMENTS_PARAMETER))
            .map(is_enabled)
            .unwrap_or(false);
        Self {
            parallel_deployments,
            ..Self::default()
        }
    }
}

fn is_enabled(value: &Value) -> bool {
    match value {
        Value::Bool(enabled) => *enabled,
        Value::String(text) => text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Computes the dependency set of single modules.
#[derive(Debug, Clone, Copy)]
pub struct DependencyCollector<'h, 'a> {
    handler: &'h DescriptorHandler<'a>,
    options: &'h SortOptions,
}

impl<'h, 'a> DependencyCollector<'h, 'a> {
    pub fn new(handler: &'h DescriptorHandler<'a>, options: &'h SortOptions) -> Self {
        Self { handler, options }
    }

    /// Names of the modules `module` must be deployed after.
    ///
    /// An explicit deployed-after list wins; without one the set is inferred.
    pub fn collect(&self, module: &'a Module) -> Result<Vec<&'a str>> {
        match explicit_dependencies(module) {
            Some(declared) => self.resolve_explicit(module, declared),
            None => self.infer(module),
        }
    }

    /// Owning modules of the provided dependencies `module` requires.
    pub fn infer(&self, module: &'a Module) -> Result<Vec<&'a str>> {
        let mut dependencies = Vec::new();
        for required in module.required_dependencies() {
            let target = self.handler.find_dependency(required.name()).ok_or_else(|| {
                Error::DanglingDependency {
                    module: module.name().to_string(),
                    dependency: required.name().to_string(),
                }
            })?;
            // Resources never constrain the order.
            let Some(owner) = target.owning_module() else {
                continue;
            };
            if owner.name() == module.name() {
                continue;
            }
            let dependency_type = required.declared(&self.options.dependency_type_property);
            if self.options.parallel_deployments && !self.is_hard(dependency_type) {
                trace!(
                    "Module '{}' may deploy in parallel with '{}'",
                    module.name(),
                    owner.name()
                );
                continue;
            }
            push_unique(&mut dependencies, owner.name());
        }
        Ok(dependencies)
    }

    fn resolve_explicit(&self, module: &'a Module, declared: &'a [String]) -> Result<Vec<&'a str>> {
        let mut dependencies = Vec::new();
        for name in declared {
            let dependency = self.handler.find_module(name).ok_or_else(|| {
                Error::DanglingDependency {
                    module: module.name().to_string(),
                    dependency: name.clone(),
                }
            })?;
            push_unique(&mut dependencies, dependency.name());
        }
        Ok(dependencies)
    }

    fn is_hard(&self, dependency_type: Option<&Value>) -> bool {
        dependency_type
            .and_then(Value::as_str)
            .is_some_and(|kind| kind == self.options.hard_dependency_type)
    }
}

/// The declared deployed-after list, for modules whose version has one.
fn explicit_dependencies(module: &Module) -> Option<&[String]> {
    module.deployed_after().ok().flatten()
}

fn push_unique<'a>(names: &mut Vec<&'a str>, name: &'a str) {
    if !names.contains(&name) {
        names.push(name);
    }
}

/// Writes a computed dependency set back onto `module` as its explicit
/// deployed-after list.
pub fn apply_deployed_after(module: &mut Module, dependencies: Vec<String>) -> Result<()> {
    debug!(
        "Setting deployed-after of module '{}' to {:?}",
        module.name(),
        dependencies
    );
    module.set_deployed_after(dependencies)
}

/// Gives every module of a version-3 descriptor that declares no
/// deployed-after list the inferred one. Returns the number of modules
/// updated.
pub fn migrate_deployed_after(
    descriptor: &mut DeploymentDescriptor,
    options: &SortOptions,
) -> Result<usize> {
    let updates = {
        let handler = DescriptorHandler::new(descriptor)?;
        let collector = DependencyCollector::new(&handler, options);
        let mut updates = Vec::new();
        for (index, module) in descriptor.modules().iter().enumerate() {
            if module.deployed_after()?.is_none() {
                let inferred = collector.infer(module)?;
                let names = inferred.into_iter().map(String::from).collect::<Vec<_>>();
                updates.push((index, names));
            }
        }
        updates
    };

    let count = updates.len();
    let modules = descriptor.modules_mut();
    for (index, dependencies) in updates {
        apply_deployed_after(&mut modules[index], dependencies)?;
    }
    Ok(count)
}

/// A module together with the modules it is deployed after.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDependencies<'a> {
    pub module: &'a Module,
    pub dependencies: Vec<&'a str>,
}

/// Orders the modules of an indexed descriptor.
#[derive(Debug, Clone)]
pub struct ModuleDependencyResolver<'h, 'a> {
    handler: &'h DescriptorHandler<'a>,
    options: SortOptions,
}

impl<'h, 'a> ModuleDependencyResolver<'h, 'a> {
    pub fn new(handler: &'h DescriptorHandler<'a>, options: SortOptions) -> Self {
        Self { handler, options }
    }

    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// The dependency set of every module, in declaration order.
    pub fn dependency_graph(&self) -> Result<Vec<ModuleDependencies<'a>>> {
        let collector = DependencyCollector::new(self.handler, &self.options);
        self.handler
            .descriptor()
            .modules()
            .iter()
            .map(|module| {
                Ok(ModuleDependencies {
                    module,
                    dependencies: collector.collect(module)?,
                })
            })
            .collect()
    }

    /// Computes the deployment order.
    ///
    /// # Examples
    ///
    /// ```
    /// use mta_descriptor::handler::DescriptorHandler;
    /// use mta_descriptor::parsers::parse_deployment_descriptor;
    /// use mta_descriptor::resolver::{ModuleDependencyResolver, SortOptions};
    ///
    /// let document = serde_yaml::from_str(r#"
    /// _schema-version: 3
    /// ID: shop
    /// modules:
    ///   - name: web
    ///     type: javascript
    ///     deployed-after: [api]
    ///   - name: api
    ///     type: java
    /// "#).unwrap();
    /// let descriptor = parse_deployment_descriptor(&document).unwrap();
    /// let handler = DescriptorHandler::new(&descriptor).unwrap();
    ///
    /// let order = ModuleDependencyResolver::new(&handler, SortOptions::default())
    ///     .resolve()
    ///     .unwrap();
    /// assert_eq!(order.to_string(), "api -> web");
    /// ```
    pub fn resolve(&self) -> Result<DeploymentOrder<'a>> {
        let graph = self.dependency_graph()?;
        let mut sort = TopologicalSort {
            graph: &graph,
            handler: self.handler,
            placed: HashSet::new(),
            visiting: HashSet::new(),
            order: Vec::with_capacity(graph.len()),
        };
        for index in 0..graph.len() {
            sort.visit(index)?;
        }
        debug!("Resolved deployment order of {} modules", sort.order.len());
        Ok(DeploymentOrder {
            modules: sort.order,
        })
    }
}

/// Depth-first sort over an explicit frame stack.
struct TopologicalSort<'g, 'h, 'a> {
    graph: &'g [ModuleDependencies<'a>],
    handler: &'h DescriptorHandler<'a>,
    placed: HashSet<usize>,
    visiting: HashSet<usize>,
    order: Vec<&'a Module>,
}

impl<'a> TopologicalSort<'_, '_, 'a> {
    /// Places `root` after everything it depends on.
    fn visit(&mut self, root: usize) -> Result<()> {
        if self.placed.contains(&root) {
            return Ok(());
        }
        // Current path: each module with the next dependency to look at.
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
        self.visiting.insert(root);

        while let Some(frame) = frames.last_mut() {
            let (index, next) = *frame;
            let node = &self.graph[index];
            let Some(dependency) = node.dependencies.get(next) else {
                frames.pop();
                self.visiting.remove(&index);
                self.placed.insert(index);
                self.order.push(node.module);
                continue;
            };
            frame.1 += 1;

            // Collected names always resolve to declared modules.
            let Some(position) = self.handler.module_position(dependency) else {
                continue;
            };
            if self.placed.contains(&position) {
                continue;
            }
            if self.visiting.contains(&position) {
                return Err(self.cycle(&frames, position));
            }
            self.visiting.insert(position);
            frames.push((position, 0));
        }
        Ok(())
    }

    /// The path from the first visit of `closing` back to it.
    fn cycle(&self, frames: &[(usize, usize)], closing: usize) -> Error {
        let start = frames
            .iter()
            .position(|&(index, _)| index == closing)
            .unwrap_or_default();
        let mut cycle: Vec<String> = frames[start..]
            .iter()
            .map(|&(index, _)| self.graph[index].module.name().to_string())
            .collect();
        cycle.push(self.graph[closing].module.name().to_string());
        Error::CyclicDependency { cycle }
    }
}

/// Modules in deployment order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentOrder<'a> {
    modules: Vec<&'a Module>,
}

impl<'a> DeploymentOrder<'a> {
    pub fn modules(&self) -> &[&'a Module] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Display for DeploymentOrder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(" -> "))
    }
}

/// Serialized as the list of module names.
impl Serialize for DeploymentOrder<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.modules.len()))?;
        for module in &self.modules {
            seq.serialize_element(module.name())?;
        }
        seq.end()
    }
}

impl<'a> DescriptorHandler<'a> {
    /// Modules of the indexed descriptor in deployment order.
    pub fn modules_for_deployment(&self, options: SortOptions) -> Result<DeploymentOrder<'a>> {
        ModuleDependencyResolver::new(self, options).resolve()
    }
}
