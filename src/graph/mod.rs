//! Graph module for dependency relationship modeling.
//!
//! This module provides the [`DependencyGraph`] keyed by package name, the
//! [`ManifestResolver`] abstraction over installed manifests, and the
//! builders that walk the installed tree from a set of roots.
//!
//! # Example
//!
//! ```rust
//! use dep_hunter::graph::{build_graph, InMemoryResolver};
//!
//! let resolver = InMemoryResolver::new()
//!     .with_package("react-dom", "18.2.0", &["react", "scheduler"])
//!     .with_package("react", "18.2.0", &[])
//!     .with_package("scheduler", "0.23.0", &[]);
//!
//! let graph = build_graph(&["react-dom".to_string()], &resolver).unwrap();
//!
//! assert_eq!(graph.package_count(), 3);
//! assert_eq!(graph.edge_count(), 2);
//! ```

mod builder;
mod dependency_graph;
mod resolver;

pub use builder::{build_graph, build_graph_parallel, BuildError};
pub use dependency_graph::{DependencyGraph, PackageNode};
pub use resolver::{
    InMemoryResolver, ManifestResolver, NodeModulesResolver, ResolveError, ResolvedManifest,
    UNKNOWN_VERSION,
};
