//! Dependency graph implementation using petgraph.
//!
//! Provides a directed graph keyed by package name, with forward
//! ("depends on") and reverse ("depended on by") views and iterative
//! reachability queries.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;

/// An installed package discovered while walking the dependency tree.
///
/// Only packages whose manifest could be resolved become nodes. Names that
/// are merely referenced as dependencies stay bare vertices of the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    /// Package name (e.g., "react", "@babel/core")
    pub name: String,
    /// Installed version, informational only
    pub version: String,
    /// Declared dependency names, in manifest order
    pub dependencies: Vec<String>,
    /// Installed footprint in bytes, assigned after construction
    pub size: u64,
    /// Install directory, when the package was resolved from disk
    pub path: Option<PathBuf>,
}

impl PackageNode {
    /// Creates a new package node with a size of zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dep_hunter::graph::PackageNode;
    ///
    /// let node = PackageNode::new("react", "18.2.0", vec!["loose-envify".to_string()]);
    /// assert_eq!(node.name, "react");
    /// assert_eq!(node.size, 0);
    /// ```
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            dependencies,
            size: 0,
            path: None,
        }
    }

    /// Sets the install directory of this package.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// A directed graph of package dependencies.
///
/// Every name ever mentioned, resolved or not, is a vertex of the
/// underlying `DiGraph`, so forward and reverse edges are two views of
/// the same edge list and can never drift apart. Resolved packages
/// additionally carry a [`PackageNode`].
///
/// # Example
///
/// ```rust
/// use dep_hunter::graph::{DependencyGraph, PackageNode};
///
/// let mut graph = DependencyGraph::new();
/// graph.add_package(PackageNode::new("react-dom", "18.2.0", vec!["react".into()]));
/// graph.add_package(PackageNode::new("react", "18.2.0", vec![]));
/// graph.add_edge("react-dom", "react");
///
/// assert_eq!(graph.package_count(), 2);
/// assert!(graph.dependents("react").contains("react-dom"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Vertices are package names; edges point from dependent to dependency
    graph: DiGraph<String, ()>,
    /// Maps package names to their vertex for O(1) lookup
    node_indices: HashMap<String, NodeIndex>,
    /// Resolved packages only
    packages: HashMap<String, PackageNode>,
}

impl DependencyGraph {
    /// Creates a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new graph with pre-allocated capacity.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            node_indices: HashMap::with_capacity(nodes),
            packages: HashMap::with_capacity(nodes),
        }
    }

    /// Adds a resolved package.
    ///
    /// The first package registered under a name wins; later additions for
    /// the same name are no-ops.
    ///
    /// # Returns
    ///
    /// `true` if the package was inserted, `false` if the name was taken.
    pub fn add_package(&mut self, package: PackageNode) -> bool {
        if self.packages.contains_key(&package.name) {
            return false;
        }

        self.vertex(&package.name);
        self.packages.insert(package.name.clone(), package);
        true
    }

    /// Records that `from` depends on `to`.
    ///
    /// Either endpoint may be unresolved. Repeating an edge has no effect.
    ///
    /// # Returns
    ///
    /// `true` if the edge was new.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        let from_idx = self.vertex(from);
        let to_idx = self.vertex(to);

        if self.graph.contains_edge(from_idx, to_idx) {
            return false;
        }
        self.graph.add_edge(from_idx, to_idx, ());
        true
    }

    /// Returns the vertex for `name`, creating it if needed.
    fn vertex(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(name) {
            return idx;
        }

        let idx = self.graph.add_node(name.to_string());
        self.node_indices.insert(name.to_string(), idx);
        idx
    }

    /// Gets a resolved package by name.
    pub fn get_node(&self, name: &str) -> Option<&PackageNode> {
        self.packages.get(name)
    }

    /// Gets a mutable reference to a resolved package by name.
    pub fn get_node_mut(&mut self, name: &str) -> Option<&mut PackageNode> {
        self.packages.get_mut(name)
    }

    /// Checks if a resolved package exists under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Checks if `name` appears anywhere in the graph, as a package or as a
    /// dangling edge target.
    pub fn is_known(&self, name: &str) -> bool {
        self.node_indices.contains_key(name)
    }

    /// Iterates over all resolved packages in unspecified order.
    pub fn packages(&self) -> impl Iterator<Item = &PackageNode> {
        self.packages.values()
    }

    /// Names referenced as dependencies that never resolved to a package.
    pub fn unresolved(&self) -> BTreeSet<&str> {
        self.graph
            .node_weights()
            .map(String::as_str)
            .filter(|name| !self.packages.contains_key(*name))
            .collect()
    }

    /// Gets the direct dependencies of a package (forward edges).
    ///
    /// # Example
    ///
    /// ```rust
    /// use dep_hunter::graph::{DependencyGraph, PackageNode};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_package(PackageNode::new("my-app", "1.0.0", vec![]));
    /// graph.add_edge("my-app", "react");
    ///
    /// let deps = graph.dependencies("my-app");
    /// assert_eq!(deps.len(), 1);
    /// assert!(deps.contains("react"));
    /// ```
    pub fn dependencies(&self, name: &str) -> BTreeSet<&str> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Gets the direct dependents of a package (reverse edges).
    pub fn dependents(&self, name: &str) -> BTreeSet<&str> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> BTreeSet<&str> {
        let Some(&idx) = self.node_indices.get(name) else {
            return BTreeSet::new();
        };

        self.graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n))
            .map(String::as_str)
            .collect()
    }

    /// Returns every edge as a `(dependent, dependency)` pair.
    pub fn edges(&self) -> BTreeSet<(&str, &str)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .filter_map(|(a, b)| Some((self.graph.node_weight(a)?, self.graph.node_weight(b)?)))
            .map(|(a, b)| (a.as_str(), b.as_str()))
            .collect()
    }

    /// Computes the transitive closure of forward edges from `name`.
    ///
    /// The walk is an iterative breadth-first search visiting each name
    /// once. The starting name is never part of the result, even when a
    /// cycle leads back to it. Unknown names have an empty closure.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dep_hunter::graph::DependencyGraph;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_edge("a", "b");
    /// graph.add_edge("b", "c");
    /// graph.add_edge("c", "a");
    ///
    /// let closure = graph.reachable("a");
    /// assert!(closure.contains("b") && closure.contains("c"));
    /// assert!(!closure.contains("a"));
    /// ```
    pub fn reachable(&self, name: &str) -> HashSet<&str> {
        let Some(&start) = self.node_indices.get(name) else {
            return HashSet::new();
        };

        let mut bfs = Bfs::new(&self.graph, start);
        let mut closure = HashSet::new();
        while let Some(idx) = bfs.next(&self.graph) {
            if idx == start {
                continue;
            }
            if let Some(weight) = self.graph.node_weight(idx) {
                closure.insert(weight.as_str());
            }
        }
        closure
    }

    /// Applies size information to packages in the graph.
    ///
    /// Names without a resolved package are ignored.
    ///
    /// # Returns
    ///
    /// The number of packages that were updated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dep_hunter::graph::{DependencyGraph, PackageNode};
    /// use std::collections::HashMap;
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_package(PackageNode::new("react", "18.2.0", vec![]));
    ///
    /// let mut sizes = HashMap::new();
    /// sizes.insert("react".to_string(), 10_000_u64);
    /// sizes.insert("missing".to_string(), 5_u64);
    ///
    /// assert_eq!(graph.apply_sizes(&sizes), 1);
    /// assert_eq!(graph.get_node("react").unwrap().size, 10_000);
    /// ```
    pub fn apply_sizes(&mut self, sizes: &HashMap<String, u64>) -> usize {
        let mut updated = 0;

        for (name, &size) in sizes {
            if let Some(node) = self.get_node_mut(name) {
                node.size = size;
                updated += 1;
            }
        }

        updated
    }

    /// Size of a package, zero for unknown or unresolved names.
    pub fn size_of(&self, name: &str) -> u64 {
        self.packages.get(name).map_or(0, |node| node.size)
    }

    /// Sum of the sizes of all resolved packages.
    pub fn total_size(&self) -> u64 {
        self.packages.values().map(|node| node.size).sum()
    }

    /// Returns the number of resolved packages.
    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    /// Returns the number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Checks if the graph holds no names at all.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
