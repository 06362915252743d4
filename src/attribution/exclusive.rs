//! Exclusivity test for transitive dependencies.
//!
//! A package reachable from a root is exclusive to it when none of its
//! direct dependents ties it to another root: no other root depends on it
//! directly, and no intermediate dependent has a closure that reaches a
//! different root.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, trace};

use crate::graph::DependencyGraph;

/// Memoised forward closures of dependents, scoped to one root.
struct ClosureCache<'g> {
    graph: &'g DependencyGraph,
    closures: HashMap<&'g str, HashSet<&'g str>>,
}

impl<'g> ClosureCache<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            closures: HashMap::new(),
        }
    }

    fn closure(&mut self, name: &'g str) -> &HashSet<&'g str> {
        let graph = self.graph;
        self.closures
            .entry(name)
            .or_insert_with(|| graph.reachable(name))
    }
}

/// Computes the packages reachable exclusively through `root`.
///
/// Only resolved packages are candidates; dangling names and the other
/// roots are never reported. A root that is absent from the graph yields an
/// empty set.
///
/// # Example
///
/// ```rust
/// use dep_hunter::attribution::compute_exclusive;
/// use dep_hunter::graph::{build_graph, InMemoryResolver};
///
/// let resolver = InMemoryResolver::new()
///     .with_package("a", "1.0.0", &["x"])
///     .with_package("b", "1.0.0", &["x", "y"])
///     .with_package("x", "1.0.0", &[])
///     .with_package("y", "1.0.0", &[]);
/// let roots = vec!["a".to_string(), "b".to_string()];
/// let graph = build_graph(&roots, &resolver).unwrap();
///
/// assert!(compute_exclusive("a", &graph, &roots).is_empty());
/// assert_eq!(
///     compute_exclusive("b", &graph, &roots).into_iter().collect::<Vec<_>>(),
///     vec!["y"]
/// );
/// ```
pub fn compute_exclusive(
    root: &str,
    graph: &DependencyGraph,
    all_roots: &[String],
) -> BTreeSet<String> {
    if !graph.is_known(root) {
        debug!("Root '{}' is not in the graph, nothing is exclusive to it", root);
        return BTreeSet::new();
    }

    let roots: HashSet<&str> = all_roots.iter().map(String::as_str).collect();
    let mut cache = ClosureCache::new(graph);
    let mut exclusive = BTreeSet::new();

    for candidate in graph.reachable(root) {
        if !graph.contains(candidate) || roots.contains(candidate) {
            continue;
        }
        if is_exclusive_to(candidate, root, &roots, graph, &mut cache) {
            exclusive.insert(candidate.to_string());
        }
    }

    debug!(
        "{} of the packages reachable from '{}' are exclusive to it",
        exclusive.len(),
        root
    );
    exclusive
}

fn is_exclusive_to<'g>(
    candidate: &'g str,
    root: &str,
    roots: &HashSet<&str>,
    graph: &'g DependencyGraph,
    cache: &mut ClosureCache<'g>,
) -> bool {
    for dependent in graph.dependents(candidate) {
        if dependent == root {
            continue;
        }
        if roots.contains(dependent) {
            trace!("'{}' is shared: root '{}' depends on it", candidate, dependent);
            return false;
        }

        let closure = cache.closure(dependent);
        // A dependent that leads back into `root` stays inside its subtree.
        if closure.contains(root) {
            continue;
        }
        if closure.iter().any(|name| roots.contains(*name)) {
            trace!(
                "'{}' is shared: dependent '{}' reaches another root",
                candidate,
                dependent
            );
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, InMemoryResolver};

    fn roots(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn exclusive(graph: &DependencyGraph, root: &str, all: &[String]) -> Vec<String> {
        compute_exclusive(root, graph, all).into_iter().collect()
    }

    #[test]
    fn test_unshared_chain_is_exclusive() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &[])
            .with_package("x", "1.0.0", &["y"])
            .with_package("y", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert_eq!(exclusive(&graph, "a", &all), vec!["x", "y"]);
        assert!(exclusive(&graph, "b", &all).is_empty());
    }

    #[test]
    fn test_package_with_two_root_dependents_is_shared() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &["x"])
            .with_package("x", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert!(exclusive(&graph, "a", &all).is_empty());
        assert!(exclusive(&graph, "b", &all).is_empty());
    }

    #[test]
    fn test_per_root_check_through_shared_intermediate() {
        // a -> x -> y, b -> x: x is shared, y's only dependent x reaches no root
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x"])
            .with_package("b", "1.0.0", &["x"])
            .with_package("x", "1.0.0", &["y"])
            .with_package("y", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert_eq!(exclusive(&graph, "a", &all), vec!["y"]);
    }

    #[test]
    fn test_multi_hop_sharing_is_detected() {
        // a -> p -> {c, q}, q -> m -> b: p's closure reaches root b two hops away
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["p"])
            .with_package("b", "1.0.0", &[])
            .with_package("p", "1.0.0", &["c", "q"])
            .with_package("q", "1.0.0", &["m"])
            .with_package("m", "1.0.0", &["b"])
            .with_package("c", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        let result = exclusive(&graph, "a", &all);
        assert_eq!(result, vec!["p"]);
        assert!(!result.contains(&"c".to_string()));
    }

    #[test]
    fn test_dependent_cycling_back_to_root_stays_exclusive() {
        // a -> p -> {c, a}
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["p"])
            .with_package("b", "1.0.0", &[])
            .with_package("p", "1.0.0", &["c", "a"])
            .with_package("c", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert_eq!(exclusive(&graph, "a", &all), vec!["c", "p"]);
    }

    #[test]
    fn test_other_roots_are_never_members() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["b"])
            .with_package("b", "1.0.0", &["y"])
            .with_package("y", "1.0.0", &[]);
        let all = roots(&["a", "b"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert!(!exclusive(&graph, "a", &all).contains(&"b".to_string()));
    }

    #[test]
    fn test_root_depending_on_itself_does_not_self_count() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["a", "x"])
            .with_package("x", "1.0.0", &[]);
        let all = roots(&["a"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert_eq!(exclusive(&graph, "a", &all), vec!["x"]);
    }

    #[test]
    fn test_absent_root_is_empty() {
        let resolver = InMemoryResolver::new().with_package("a", "1.0.0", &[]);
        let all = roots(&["a", "missing"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert!(compute_exclusive("missing", &graph, &all).is_empty());
        assert!(compute_exclusive("never-mentioned", &graph, &all).is_empty());
    }

    #[test]
    fn test_unresolved_names_are_never_members() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x", "ghost"])
            .with_package("x", "1.0.0", &["phantom"]);
        let all = roots(&["a"]);
        let graph = build_graph(&all, &resolver).unwrap();

        assert_eq!(exclusive(&graph, "a", &all), vec!["x"]);
    }
}
