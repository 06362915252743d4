//! Parser module for dep-hunter.
//!
//! Reads npm `package.json` manifests: the project's own manifest, which
//! supplies the roots of the analysis, and the manifests of installed
//! packages, which supply graph edges.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dep_hunter::parser::discover_dependencies;
//!
//! let deps = discover_dependencies(Path::new("."))?;
//! for root in deps.roots(false) {
//!     println!("{}", root);
//! }
//! ```

pub mod package_json;
pub mod types;

pub use package_json::{
    discover_dependencies, parse_file, parse_str, ParseError, ParseResult, MANIFEST_FILE,
};

pub use types::{PackageJson, ProjectDependencies};
