//! Per-root footprint results.

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexSet;
use log::debug;
use rayon::prelude::*;
use serde::Serialize;

use super::exclusive::compute_exclusive;
use crate::graph::DependencyGraph;

/// Footprint attributed to one root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusivityResult {
    /// Root package name
    pub name: String,
    /// The root's own size
    pub direct_size: u64,
    /// Sum of the sizes of the exclusive members
    pub exclusive_size: u64,
    /// `direct_size + exclusive_size`
    pub total_size: u64,
    /// Packages counted as exclusive to this root
    #[serde(rename = "exclusiveDependencyNames")]
    pub exclusive_members: BTreeSet<String>,
}

impl ExclusivityResult {
    /// Sums sizes for `root` and its exclusive members.
    ///
    /// A root absent from the graph has a direct size of zero; members
    /// without a node contribute nothing.
    pub fn summarize(root: &str, graph: &DependencyGraph, members: BTreeSet<String>) -> Self {
        let direct_size = graph.size_of(root);
        let exclusive_size = members.iter().map(|m| graph.size_of(m)).sum();

        Self {
            name: root.to_string(),
            direct_size,
            exclusive_size,
            total_size: direct_size + exclusive_size,
            exclusive_members: members,
        }
    }

    /// Number of exclusive members.
    pub fn exclusive_count(&self) -> usize {
        self.exclusive_members.len()
    }
}

/// Attributes footprint to a single root.
///
/// This is the raw per-root exclusive set. No first-claim de-duplication
/// against other roots is applied, so a package credited to an earlier root
/// by [`attribute_all`] can still show up here.
///
/// # Example
///
/// ```rust
/// use dep_hunter::attribution::attribute;
/// use dep_hunter::graph::{build_graph, InMemoryResolver};
/// use std::collections::HashMap;
///
/// let resolver = InMemoryResolver::new()
///     .with_package("a", "1.0.0", &["x"])
///     .with_package("x", "1.0.0", &[]);
/// let roots = vec!["a".to_string()];
/// let mut graph = build_graph(&roots, &resolver).unwrap();
/// graph.apply_sizes(&HashMap::from([("a".to_string(), 10), ("x".to_string(), 32)]));
///
/// let result = attribute("a", &graph, &roots);
/// assert_eq!(result.direct_size, 10);
/// assert_eq!(result.exclusive_size, 32);
/// assert_eq!(result.total_size, 42);
/// ```
pub fn attribute(root: &str, graph: &DependencyGraph, all_roots: &[String]) -> ExclusivityResult {
    ExclusivityResult::summarize(root, graph, compute_exclusive(root, graph, all_roots))
}

/// Attributes footprint to every root.
///
/// Duplicate roots are collapsed and results come back in first-seen root
/// order. Exclusivity sets are computed one root per rayon worker. A package
/// that passes the exclusivity test for several roots is credited to the
/// first of them only, so no byte is counted twice across results.
pub fn attribute_all(graph: &DependencyGraph, roots: &[String]) -> Vec<ExclusivityResult> {
    let unique: IndexSet<&str> = roots.iter().map(String::as_str).collect();
    let all_roots: Vec<String> = unique.iter().map(|r| r.to_string()).collect();

    let candidates: Vec<BTreeSet<String>> = all_roots
        .par_iter()
        .map(|root| compute_exclusive(root, graph, &all_roots))
        .collect();

    let mut claimed: HashSet<String> = HashSet::new();
    all_roots
        .iter()
        .zip(candidates)
        .map(|(root, mut members)| {
            members.retain(|m| !claimed.contains(m));
            claimed.extend(members.iter().cloned());
            let result = ExclusivityResult::summarize(root, graph, members);
            debug!(
                "{}: direct {} + exclusive {} ({} packages)",
                result.name,
                result.direct_size,
                result.exclusive_size,
                result.exclusive_count()
            );
            result
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, InMemoryResolver};
    use std::collections::HashMap;

    fn roots(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn sized(graph: &mut DependencyGraph, sizes: &[(&str, u64)]) {
        let sizes: HashMap<String, u64> = sizes.iter().map(|(n, s)| (n.to_string(), *s)).collect();
        graph.apply_sizes(&sizes);
    }

    fn members(result: &ExclusivityResult) -> Vec<&str> {
        result.exclusive_members.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_shared_intermediate_scenario() {
        // a -> x -> y, b -> x
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &["x"])
            .with_package("x", "1.0.0", &["y"])
            .with_package("y", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        let results = attribute_all(&graph, &all);
        assert_eq!(results.len(), 2);
        assert_eq!(members(&results[0]), vec!["y"]);
        assert!(results[1].exclusive_members.is_empty());
    }

    #[test]
    fn test_first_claim_follows_declaration_order() {
        // a -> x -> y, b -> x
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &["x"])
            .with_package("x", "1.0.0", &["y"])
            .with_package("y", "1.0.0", &[]);
        let graph = build_graph(&roots(&["a", "b"]), &resolver).unwrap();

        let swapped = roots(&["b", "a"]);
        let results = attribute_all(&graph, &swapped);
        assert_eq!(results[0].name, "b");
        assert_eq!(members(&results[0]), vec!["y"]);
        assert_eq!(results[1].name, "a");
        assert!(results[1].exclusive_members.is_empty());

        // Single-root attribution is not de-duplicated
        assert_eq!(members(&attribute("a", &graph, &swapped)), vec!["y"]);
        assert_eq!(members(&attribute("b", &graph, &swapped)), vec!["y"]);
    }

    #[test]
    fn test_directly_shared_scenario() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &["x"])
            .with_package("x", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        for result in attribute_all(&graph, &all) {
            assert!(result.exclusive_members.is_empty());
        }
    }

    #[test]
    fn test_unshared_subtree_scenario_and_sum_law() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &[])
            .with_package("x", "1.0.0", &["y"])
            .with_package("y", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let mut graph = build_graph(&all, &resolver).unwrap();
        sized(&mut graph, &[("a", 100), ("b", 7), ("x", 20), ("y", 3)]);

        let results = attribute_all(&graph, &all);
        let a = &results[0];
        assert_eq!(members(a), vec!["x", "y"]);
        assert_eq!(a.direct_size, 100);
        assert_eq!(a.exclusive_size, 23);
        assert_eq!(a.total_size, 123);

        let b = &results[1];
        assert!(b.exclusive_members.is_empty());
        assert_eq!(b.total_size, 7);
    }

    #[test]
    fn test_absent_root_yields_zeros() {
        let resolver = InMemoryResolver::new().with_package("a", "1.0.0", &[]);
        let all = roots(&["a", "not-installed"]);
        let graph = build_graph(&all, &resolver).unwrap();

        let results = attribute_all(&graph, &all);
        let missing = &results[1];
        assert_eq!(missing.name, "not-installed");
        assert_eq!(missing.direct_size, 0);
        assert_eq!(missing.exclusive_size, 0);
        assert_eq!(missing.total_size, 0);
        assert!(missing.exclusive_members.is_empty());
    }

    #[test]
    fn test_duplicate_roots_collapse_in_order() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &[])
            .with_package("b", "1.0.0", &[]);
        let all = roots(&["b", "a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        let names: Vec<_> = attribute_all(&graph, &all)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_no_package_counted_twice() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &["x"])
            .with_package("c", "1.0.0", &["m"])
            .with_package("x", "1.0.0", &["y", "z"])
            .with_package("m", "1.0.0", &["z"])
            .with_package("y", "1.0.0", &[])
            .with_package("z", "1.0.0", &[]);
        let all = roots(&["a", "b", "c"]);
        let graph = build_graph(&all, &resolver).unwrap();

        let results = attribute_all(&graph, &all);
        let mut seen = HashSet::new();
        for result in &results {
            for member in &result.exclusive_members {
                assert!(seen.insert(member.clone()), "{} counted twice", member);
            }
        }
    }

    #[test]
    fn test_unresolved_dependency_is_not_counted() {
        let resolver = InMemoryResolver::new().with_package("a", "1.0.0", &["ghost"]);
        let all = roots(&["a"]);
        let mut graph = build_graph(&all, &resolver).unwrap();
        sized(&mut graph, &[("a", 5), ("ghost", 1_000)]);

        let result = attribute("a", &graph, &all);
        assert!(result.exclusive_members.is_empty());
        assert_eq!(result.total_size, 5);
    }

    #[test]
    fn test_result_serializes_export_contract() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("x", "1.0.0", &[]);
        let all = roots(&["a"]);
        let graph = build_graph(&all, &resolver).unwrap();

        let value = serde_json::to_value(attribute("a", &graph, &all)).unwrap();
        assert_eq!(value["name"], "a");
        assert_eq!(value["directSize"], 0);
        assert_eq!(value["exclusiveSize"], 0);
        assert_eq!(value["totalSize"], 0);
        assert_eq!(value["exclusiveDependencyNames"][0], "x");
    }
}
