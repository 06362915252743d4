//! Manifest resolution for installed packages.
//!
//! A [`ManifestResolver`] answers one question for the graph builder:
//! given a package name, what version is installed and what does it
//! declare as dependencies?

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

use crate::parser::{self, ParseError, MANIFEST_FILE};

/// Version reported for installed packages whose manifest has none.
pub const UNKNOWN_VERSION: &str = "unknown";

/// The resolved manifest of an installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    /// Installed version
    pub version: String,
    /// Declared dependency names, in manifest order
    pub dependencies: Vec<String>,
    /// Install directory, if the package lives on disk
    pub path: Option<PathBuf>,
}

impl ResolvedManifest {
    /// Creates a manifest without an install directory.
    pub fn new(version: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            version: version.into(),
            dependencies,
            path: None,
        }
    }
}

/// Errors raised when a package cannot be resolved.
///
/// None of these abort an analysis: the graph builder logs them and keeps
/// the name as a dangling edge target.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Package '{name}' is not installed (looked in {})", .path.display())]
    NotInstalled { name: String, path: PathBuf },

    #[error("Package '{name}' has no package.json at {}", .path.display())]
    MissingManifest { name: String, path: PathBuf },

    #[error("Failed to read manifest of '{name}': {source}")]
    Manifest {
        name: String,
        #[source]
        source: ParseError,
    },

    #[error("Package '{0}' is unknown")]
    Unknown(String),
}

impl ResolveError {
    /// Returns true when the package is simply absent, as opposed to present
    /// but broken.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            ResolveError::NotInstalled { .. } | ResolveError::Unknown(_)
        )
    }
}

/// Looks up the installed manifest of a package by name.
///
/// Implementations must be deterministic for a given on-disk state within
/// one analysis run.
pub trait ManifestResolver {
    /// Resolves `name` to its installed manifest.
    fn resolve(&self, name: &str) -> Result<ResolvedManifest, ResolveError>;
}

/// Resolves packages from a flat `node_modules` directory.
///
/// Scoped names such as `@babel/core` map to nested directories.
#[derive(Debug, Clone)]
pub struct NodeModulesResolver {
    node_modules: PathBuf,
}

impl NodeModulesResolver {
    /// Creates a resolver for `<project>/node_modules`.
    pub fn new(project: &Path) -> Self {
        Self {
            node_modules: project.join("node_modules"),
        }
    }

    /// Install directory for `name`.
    ///
    /// Names with empty, `.` or `..` segments have no install directory, so a
    /// manifest can never point the resolver outside `node_modules`.
    pub fn package_dir(&self, name: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = name.split('/').collect();
        if segments
            .iter()
            .any(|part| part.is_empty() || *part == "." || *part == ".." || part.contains('\\'))
        {
            return None;
        }

        Some(
            segments
                .into_iter()
                .fold(self.node_modules.clone(), |dir, part| dir.join(part)),
        )
    }
}

impl ManifestResolver for NodeModulesResolver {
    fn resolve(&self, name: &str) -> Result<ResolvedManifest, ResolveError> {
        let Some(dir) = self.package_dir(name) else {
            warn!("Ignoring invalid package name '{}'", name);
            return Err(ResolveError::NotInstalled {
                name: name.to_string(),
                path: self.node_modules.clone(),
            });
        };
        if !dir.is_dir() {
            return Err(ResolveError::NotInstalled {
                name: name.to_string(),
                path: dir,
            });
        }

        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(ResolveError::MissingManifest {
                name: name.to_string(),
                path: manifest_path,
            });
        }

        let pkg = parser::parse_file(&manifest_path).map_err(|source| ResolveError::Manifest {
            name: name.to_string(),
            source,
        })?;

        Ok(ResolvedManifest {
            version: pkg.version.clone().unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            dependencies: pkg.dependency_names(),
            path: Some(dir),
        })
    }
}

/// Resolves packages from an in-memory table.
///
/// # Example
///
/// ```rust
/// use dep_hunter::graph::{InMemoryResolver, ManifestResolver};
///
/// let resolver = InMemoryResolver::new()
///     .with_package("express", "4.18.2", &["body-parser"])
///     .with_package("body-parser", "1.20.1", &[]);
///
/// assert_eq!(resolver.resolve("express").unwrap().dependencies, vec!["body-parser"]);
/// assert!(resolver.resolve("koa").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryResolver {
    manifests: HashMap<String, ResolvedManifest>,
}

impl InMemoryResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package with its declared dependencies.
    pub fn with_package(mut self, name: &str, version: &str, dependencies: &[&str]) -> Self {
        self.insert(
            name,
            ResolvedManifest::new(version, dependencies.iter().map(|d| d.to_string()).collect()),
        );
        self
    }

    /// Registers a manifest under `name`, replacing any previous one.
    pub fn insert(&mut self, name: &str, manifest: ResolvedManifest) {
        self.manifests.insert(name.to_string(), manifest);
    }
}

impl ManifestResolver for InMemoryResolver {
    fn resolve(&self, name: &str) -> Result<ResolvedManifest, ResolveError> {
        self.manifests
            .get(name)
            .cloned()
            .ok_or_else(|| ResolveError::Unknown(name.to_string()))
    }
}
