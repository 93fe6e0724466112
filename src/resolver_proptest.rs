//! Property-based tests for deployment ordering.
//!
//! These tests use proptest to generate random module graphs and verify that
//! the resolved order, or the reported cycle, is consistent with the graph.

#[cfg(test)]
mod proptest_tests {
    use crate::error::Error;
    use crate::handler::DescriptorHandler;
    use crate::model::DeploymentDescriptor;
    use crate::parsers::parse_deployment_descriptor;
    use crate::resolver::{ModuleDependencyResolver, SortOptions};
    use proptest::prelude::*;

    /// Adjacency matrix: `graph[i][j]` means module `i` is deployed after `j`.
    fn any_graph() -> impl Strategy<Value = Vec<Vec<bool>>> {
        (1usize..8).prop_flat_map(|n| {
            prop::collection::vec(prop::collection::vec(any::<bool>(), n), n)
        })
    }

    /// Graphs whose edges only point at later-declared modules.
    fn acyclic_graph() -> impl Strategy<Value = Vec<Vec<bool>>> {
        any_graph().prop_map(|mut graph| {
            for (i, row) in graph.iter_mut().enumerate() {
                for edge in row.iter_mut().take(i + 1) {
                    *edge = false;
                }
            }
            graph
        })
    }

    fn edges(row: &[bool]) -> impl Iterator<Item = usize> + '_ {
        row.iter()
            .enumerate()
            .filter(|(_, edge)| **edge)
            .map(|(j, _)| j)
    }

    fn explicit_descriptor(graph: &[Vec<bool>]) -> DeploymentDescriptor {
        let mut yaml = String::from("_schema-version: 3\nID: generated\nmodules:\n");
        for (i, row) in graph.iter().enumerate() {
            let after: Vec<String> = edges(row).map(|j| format!("m{}", j)).collect();
            yaml.push_str(&format!(
                "  - name: m{}\n    type: generic\n    deployed-after: [{}]\n",
                i,
                after.join(", ")
            ));
        }
        parse_deployment_descriptor(&serde_yaml::from_str(&yaml).unwrap()).unwrap()
    }

    fn inferred_descriptor(graph: &[Vec<bool>]) -> DeploymentDescriptor {
        let mut yaml = String::from("_schema-version: 2\nID: generated\nmodules:\n");
        for (i, row) in graph.iter().enumerate() {
            yaml.push_str(&format!(
                "  - name: m{}\n    type: generic\n    provides:\n      - name: p{}\n",
                i, i
            ));
            let requires: Vec<String> = edges(row)
                .map(|j| format!("      - name: p{}\n", j))
                .collect();
            if !requires.is_empty() {
                yaml.push_str("    requires:\n");
                yaml.push_str(&requires.concat());
            }
        }
        parse_deployment_descriptor(&serde_yaml::from_str(&yaml).unwrap()).unwrap()
    }

    fn resolve(descriptor: &DeploymentDescriptor) -> Result<Vec<usize>, Error> {
        let handler = DescriptorHandler::new(descriptor)?;
        let order = ModuleDependencyResolver::new(&handler, SortOptions::default()).resolve()?;
        Ok(order
            .names()
            .iter()
            .map(|name| name[1..].parse().unwrap())
            .collect())
    }

    proptest! {
        /// Property: every module is placed exactly once, after its dependencies
        #[test]
        fn acyclic_graphs_order_dependencies_first(graph in acyclic_graph()) {
            let order = resolve(&explicit_descriptor(&graph)).unwrap();
            prop_assert_eq!(order.len(), graph.len());

            let mut position = vec![usize::MAX; graph.len()];
            for (at, &module) in order.iter().enumerate() {
                prop_assert_eq!(position[module], usize::MAX, "m{} placed twice", module);
                position[module] = at;
            }
            for (i, row) in graph.iter().enumerate() {
                for j in edges(row) {
                    prop_assert!(
                        position[j] < position[i],
                        "m{} deployed before its dependency m{}",
                        i,
                        j
                    );
                }
            }
        }

        /// Property: a reported cycle is a closed path of real edges
        #[test]
        fn cycles_are_reported_as_closed_paths(graph in any_graph()) {
            match resolve(&explicit_descriptor(&graph)) {
                Ok(order) => {
                    let position: Vec<usize> = (0..graph.len())
                        .map(|m| order.iter().position(|&o| o == m).unwrap())
                        .collect();
                    for (i, row) in graph.iter().enumerate() {
                        for j in edges(row) {
                            prop_assert!(position[j] < position[i]);
                        }
                    }
                }
                Err(Error::CyclicDependency { cycle }) => {
                    prop_assert!(cycle.len() >= 2);
                    prop_assert_eq!(cycle.first(), cycle.last());
                    for pair in cycle.windows(2) {
                        let from: usize = pair[0][1..].parse().unwrap();
                        let to: usize = pair[1][1..].parse().unwrap();
                        prop_assert!(graph[from][to], "{} -> {} is not an edge", pair[0], pair[1]);
                    }
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        /// Property: inferred and declared dependencies give the same order
        #[test]
        fn inferred_and_explicit_orders_agree(graph in acyclic_graph()) {
            let explicit = resolve(&explicit_descriptor(&graph)).unwrap();
            let inferred = resolve(&inferred_descriptor(&graph)).unwrap();
            prop_assert_eq!(explicit, inferred);
        }

        /// Property: resolution is deterministic
        #[test]
        fn resolution_is_deterministic(graph in any_graph()) {
            let descriptor = explicit_descriptor(&graph);
            let first = resolve(&descriptor).map_err(|e| e.to_string());
            let second = resolve(&descriptor).map_err(|e| e.to_string());
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn independent_modules_keep_declared_order() {
        let graph = vec![vec![false; 5]; 5];
        assert_eq!(
            resolve(&explicit_descriptor(&graph)).unwrap(),
            vec![0, 1, 2, 3, 4]
        );
    }
}
