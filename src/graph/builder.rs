//! Graph construction from installed manifests.
//!
//! Walks the reachability closure of the roots under a
//! [`ManifestResolver`], visiting every name at most once. The walk uses
//! an explicit work queue, so arbitrarily deep dependency chains cannot
//! exhaust the call stack.

use std::collections::{HashSet, VecDeque};

use log::{debug, info, warn};
use rayon::prelude::*;
use thiserror::Error;

use super::dependency_graph::{DependencyGraph, PackageNode};
use super::resolver::{ManifestResolver, ResolveError, ResolvedManifest};

/// Errors that abort graph construction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BuildError {
    #[error("No root packages supplied")]
    NoRoots,
}

/// Traversal state scoped to a single build.
///
/// The visited set is shared across all roots, so a package reachable from
/// several roots is still resolved only once.
struct Traversal {
    visited: HashSet<String>,
    queue: VecDeque<String>,
}

impl Traversal {
    fn new(roots: &[String]) -> Result<Self, BuildError> {
        if roots.is_empty() {
            return Err(BuildError::NoRoots);
        }

        let mut traversal = Self {
            visited: HashSet::with_capacity(roots.len()),
            queue: VecDeque::with_capacity(roots.len()),
        };
        for root in roots {
            traversal.enqueue(root);
        }
        Ok(traversal)
    }

    /// Queues `name` unless it was seen before.
    fn enqueue(&mut self, name: &str) -> bool {
        if !self.visited.insert(name.to_string()) {
            return false;
        }
        self.queue.push_back(name.to_string());
        true
    }

    /// Applies one resolution outcome to the graph. This is the only place
    /// the graph is written during a build.
    fn record(
        &mut self,
        graph: &mut DependencyGraph,
        name: &str,
        outcome: Result<ResolvedManifest, ResolveError>,
    ) {
        let manifest = match outcome {
            Ok(manifest) => manifest,
            Err(e) if e.is_missing() => {
                debug!("Skipping {}: {}", name, e);
                return;
            }
            Err(e) => {
                warn!("Skipping {}: {}", name, e);
                return;
            }
        };

        for dep in &manifest.dependencies {
            graph.add_edge(name, dep);
            self.enqueue(dep);
        }

        let mut node = PackageNode::new(name, manifest.version, manifest.dependencies);
        node.path = manifest.path;
        graph.add_package(node);
    }
}

/// Builds the dependency graph reachable from `roots`.
///
/// Resolution failures for individual packages are logged and skipped; the
/// failing name remains a valid edge target without becoming a node.
///
/// # Errors
///
/// Returns [`BuildError::NoRoots`] when `roots` is empty.
///
/// # Example
///
/// ```rust
/// use dep_hunter::graph::{build_graph, InMemoryResolver};
///
/// let resolver = InMemoryResolver::new()
///     .with_package("a", "1.0.0", &["x"])
///     .with_package("x", "1.0.0", &["missing"]);
///
/// let graph = build_graph(&["a".to_string()], &resolver).unwrap();
/// assert_eq!(graph.package_count(), 2);
/// assert!(graph.is_known("missing"));
/// assert!(!graph.contains("missing"));
/// ```
pub fn build_graph<R>(roots: &[String], resolver: &R) -> Result<DependencyGraph, BuildError>
where
    R: ManifestResolver + ?Sized,
{
    let mut traversal = Traversal::new(roots)?;
    let mut graph = DependencyGraph::with_capacity(roots.len() * 8, roots.len() * 16);

    while let Some(name) = traversal.queue.pop_front() {
        let outcome = resolver.resolve(&name);
        traversal.record(&mut graph, &name, outcome);
    }

    info!(
        "Built dependency graph: {} packages, {} edges, {} unresolved",
        graph.package_count(),
        graph.edge_count(),
        graph.unresolved().len()
    );
    Ok(graph)
}

/// Builds the dependency graph, resolving each breadth-first level in
/// parallel.
///
/// Resolution runs on the rayon pool; results are applied to the graph by
/// the calling thread in frontier order, so the resulting graph has the
/// same packages and edges as [`build_graph`].
///
/// # Errors
///
/// Returns [`BuildError::NoRoots`] when `roots` is empty.
pub fn build_graph_parallel<R>(
    roots: &[String],
    resolver: &R,
) -> Result<DependencyGraph, BuildError>
where
    R: ManifestResolver + Sync + ?Sized,
{
    let mut traversal = Traversal::new(roots)?;
    let mut graph = DependencyGraph::with_capacity(roots.len() * 8, roots.len() * 16);
    let mut level = 0usize;

    loop {
        let frontier: Vec<String> = traversal.queue.drain(..).collect();
        if frontier.is_empty() {
            break;
        }
        debug!("Resolving level {} ({} packages)", level, frontier.len());

        let outcomes: Vec<_> = frontier
            .into_par_iter()
            .map(|name| {
                let outcome = resolver.resolve(&name);
                (name, outcome)
            })
            .collect();

        for (name, outcome) in outcomes {
            traversal.record(&mut graph, &name, outcome);
        }
        level += 1;
    }

    info!(
        "Built dependency graph in {} levels: {} packages, {} edges, {} unresolved",
        level,
        graph.package_count(),
        graph.edge_count(),
        graph.unresolved().len()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{InMemoryResolver, NodeModulesResolver};
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn roots(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    /// Diamond with a cycle and a dangling dependency:
    /// a -> {x, y}, b -> {y}, x -> {z}, y -> {z, ghost}, z -> {x}
    fn sample_resolver() -> InMemoryResolver {
        InMemoryResolver::new()
            .with_package("a", "1.0.0", &["x", "y"])
            .with_package("b", "2.0.0", &["y"])
            .with_package("x", "1.1.0", &["z"])
            .with_package("y", "1.2.0", &["z", "ghost"])
            .with_package("z", "0.1.0", &["x"])
    }

    fn names(graph: &DependencyGraph) -> BTreeSet<String> {
        graph.packages().map(|p| p.name.clone()).collect()
    }

    fn edges(graph: &DependencyGraph) -> BTreeSet<(String, String)> {
        graph
            .edges()
            .into_iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_build_empty_roots_fails() {
        let resolver = sample_resolver();
        assert_eq!(build_graph(&[], &resolver).unwrap_err(), BuildError::NoRoots);
        assert_eq!(
            build_graph_parallel(&[], &resolver).unwrap_err(),
            BuildError::NoRoots
        );
    }

    #[test]
    fn test_build_graph_nodes_and_edges() {
        let resolver = sample_resolver();
        let graph = build_graph(&roots(&["a", "b"]), &resolver).unwrap();

        assert_eq!(
            names(&graph),
            ["a", "b", "x", "y", "z"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<String>>()
        );
        assert_eq!(graph.edge_count(), 7);
        assert!(graph.dependencies("y").contains("ghost"));
        assert!(!graph.contains("ghost"));
        assert_eq!(graph.get_node("y").unwrap().dependencies, vec!["z", "ghost"]);
    }

    #[test]
    fn test_build_graph_handles_cycles() {
        let resolver = InMemoryResolver::new()
            .with_package("a", "1.0.0", &["b"])
            .with_package("b", "1.0.0", &["a"]);

        let graph = build_graph(&roots(&["a"]), &resolver).unwrap();
        assert_eq!(graph.package_count(), 2);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_build_graph_duplicate_roots_idempotent() {
        let resolver = sample_resolver();
        let once = build_graph(&roots(&["a", "b"]), &resolver).unwrap();
        let twice = build_graph(&roots(&["a", "b", "a", "b"]), &resolver).unwrap();

        assert_eq!(names(&once), names(&twice));
        assert_eq!(edges(&once), edges(&twice));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let resolver = sample_resolver();
        let first = build_graph(&roots(&["b", "a"]), &resolver).unwrap();
        let second = build_graph(&roots(&["b", "a"]), &resolver).unwrap();

        assert_eq!(names(&first), names(&second));
        assert_eq!(edges(&first), edges(&second));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let resolver = sample_resolver();
        let sequential = build_graph(&roots(&["a", "b"]), &resolver).unwrap();
        let parallel = build_graph_parallel(&roots(&["a", "b"]), &resolver).unwrap();

        assert_eq!(names(&sequential), names(&parallel));
        assert_eq!(edges(&sequential), edges(&parallel));
    }

    #[test]
    fn test_unresolved_root_has_no_node() {
        let resolver = sample_resolver();
        let graph = build_graph(&roots(&["a", "not-installed"]), &resolver).unwrap();

        assert!(!graph.contains("not-installed"));
        assert!(graph.contains("a"));
    }

    #[test]
    fn test_build_from_node_modules() {
        let temp = TempDir::new().unwrap();
        let write = |name: &str, manifest: &str| {
            let dir = temp.path().join("node_modules").join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("package.json"), manifest).unwrap();
        };
        write("app-lib", r#"{"version": "1.0.0", "dependencies": {"helper": "^1"}}"#);
        write("helper", r#"{"version": "1.4.0", "dependencies": {"gone": "^2"}}"#);
        write("broken", "{");

        let resolver = NodeModulesResolver::new(temp.path());
        let graph = build_graph(&roots(&["app-lib", "broken"]), &resolver).unwrap();

        assert_eq!(graph.package_count(), 2);
        assert_eq!(graph.get_node("helper").unwrap().version, "1.4.0");
        assert!(graph.get_node("helper").unwrap().path.is_some());
        assert!(graph.is_known("gone"));
        assert!(!graph.contains("broken"));
    }
}
