//! Footprint attribution for direct dependencies.
//!
//! Given a built [`DependencyGraph`](crate::graph::DependencyGraph) and the
//! project's roots, this module works out which transitive packages exist
//! only because of a particular root, and sums their sizes.
//!
//! # Example
//!
//! ```rust
//! use dep_hunter::attribution::attribute_all;
//! use dep_hunter::graph::{build_graph, InMemoryResolver};
//!
//! let resolver = InMemoryResolver::new()
//!     .with_package("express", "4.18.2", &["body-parser", "debug"])
//!     .with_package("morgan", "1.10.0", &["debug"])
//!     .with_package("body-parser", "1.20.1", &[])
//!     .with_package("debug", "2.6.9", &[]);
//! let roots = vec!["express".to_string(), "morgan".to_string()];
//! let graph = build_graph(&roots, &resolver).unwrap();
//!
//! let results = attribute_all(&graph, &roots);
//! assert!(results[0].exclusive_members.contains("body-parser"));
//! assert!(!results[0].exclusive_members.contains("debug"));
//! ```

mod exclusive;
mod result;

pub use exclusive::compute_exclusive;
pub use result::{attribute, attribute_all, ExclusivityResult};
