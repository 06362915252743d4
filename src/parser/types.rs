//! Shared types for manifest parsing.
//!
//! This module defines the data structures used to represent npm
//! package manifests, both for the project under analysis and for every
//! installed package found under `node_modules`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Represents the structure of a package.json file.
///
/// Only the fields needed for footprint attribution are captured. Dependency
/// tables use [`IndexMap`] so that names keep the order in which the manifest
/// declares them.
///
/// # Example
///
/// ```
/// use dep_hunter::parser::PackageJson;
///
/// let json = r#"{"name": "my-app", "version": "1.0.0"}"#;
/// let pkg: PackageJson = serde_json::from_str(json).unwrap();
/// assert_eq!(pkg.name, Some("my-app".to_string()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageJson {
    /// The name of the package.
    pub name: Option<String>,

    /// The version of the package (semver format).
    pub version: Option<String>,

    /// Production dependencies required at runtime.
    pub dependencies: Option<IndexMap<String, String>>,

    /// Development-only dependencies (testing, building, etc.).
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: Option<IndexMap<String, String>>,
}

impl PackageJson {
    /// Names of the production dependencies, in declaration order.
    pub fn dependency_names(&self) -> Vec<String> {
        self.dependencies
            .as_ref()
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Names of the development dependencies, in declaration order.
    pub fn dev_dependency_names(&self) -> Vec<String> {
        self.dev_dependencies
            .as_ref()
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if the package declares any dependencies at all.
    pub fn has_dependencies(&self) -> bool {
        self.dependencies.as_ref().is_some_and(|d| !d.is_empty())
            || self
                .dev_dependencies
                .as_ref()
                .is_some_and(|d| !d.is_empty())
    }
}

/// The direct dependencies declared by the project under analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDependencies {
    /// Project name from the manifest, if declared.
    pub name: Option<String>,
    /// Production dependencies, in declaration order.
    pub direct: Vec<String>,
    /// Development dependencies, in declaration order.
    pub dev: Vec<String>,
    /// Project root the manifest was read from.
    pub path: PathBuf,
}

impl ProjectDependencies {
    /// Returns the roots to analyze.
    ///
    /// Development dependencies are appended after the production ones when
    /// `include_dev` is set.
    pub fn roots(&self, include_dev: bool) -> Vec<String> {
        let mut roots = self.direct.clone();
        if include_dev {
            roots.extend(self.dev.iter().cloned());
        }
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_names_keep_declaration_order() {
        let json = r#"{
            "name": "ordered",
            "dependencies": {"zod": "^3.0.0", "axios": "^1.0.0", "lodash": "^4.0.0"}
        }"#;
        let pkg: PackageJson = serde_json::from_str(json).unwrap();

        assert_eq!(pkg.dependency_names(), vec!["zod", "axios", "lodash"]);
        assert!(pkg.dev_dependency_names().is_empty());
    }

    #[test]
    fn test_has_dependencies() {
        let empty = PackageJson::default();
        assert!(!empty.has_dependencies());

        let json = r#"{"devDependencies": {"jest": "^29.0.0"}}"#;
        let pkg: PackageJson = serde_json::from_str(json).unwrap();
        assert!(pkg.has_dependencies());
    }

    #[test]
    fn test_roots_with_and_without_dev() {
        let deps = ProjectDependencies {
            direct: vec!["react".to_string()],
            dev: vec!["jest".to_string()],
            path: PathBuf::from("."),
            ..Default::default()
        };

        assert_eq!(deps.roots(false), vec!["react"]);
        assert_eq!(deps.roots(true), vec!["react", "jest"]);
    }
}
