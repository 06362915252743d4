//! Parser for npm package.json files.
//!
//! This module reads project and installed-package manifests and
//! extracts the dependency names used to seed and grow the graph.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use super::types::{PackageJson, ProjectDependencies};

/// File name of an npm manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// Errors that can occur during package.json parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse JSON content.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// No manifest exists at the expected location.
    #[error("No package.json found at {}", .0.display())]
    MissingManifest(PathBuf),
}

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a package.json file from a file path.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use dep_hunter::parser::package_json::parse_file;
///
/// let pkg = parse_file(Path::new("package.json")).unwrap();
/// println!("Package: {:?}", pkg.name);
/// ```
pub fn parse_file(path: &Path) -> ParseResult<PackageJson> {
    let content = fs::read_to_string(path)?;
    parse_str(&content)
}

/// Parses a package.json from a string.
///
/// # Example
///
/// ```
/// use dep_hunter::parser::package_json::parse_str;
///
/// let json = r#"{"name": "my-app", "version": "1.0.0"}"#;
/// let pkg = parse_str(json).unwrap();
/// assert_eq!(pkg.name, Some("my-app".to_string()));
/// ```
pub fn parse_str(content: &str) -> ParseResult<PackageJson> {
    let pkg: PackageJson = serde_json::from_str(content)?;
    Ok(pkg)
}

/// Reads the project manifest at `<project>/package.json` and returns its
/// direct and development dependency names.
///
/// # Errors
///
/// Returns [`ParseError::MissingManifest`] when the project has no
/// package.json, or a read/JSON error when it cannot be parsed.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use dep_hunter::parser::discover_dependencies;
///
/// let deps = discover_dependencies(Path::new("."))?;
/// println!("{} direct dependencies", deps.direct.len());
/// ```
pub fn discover_dependencies(project: &Path) -> ParseResult<ProjectDependencies> {
    let manifest_path = project.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return Err(ParseError::MissingManifest(manifest_path));
    }

    let pkg = parse_file(&manifest_path)?;
    let deps = ProjectDependencies {
        name: pkg.name.clone(),
        direct: pkg.dependency_names(),
        dev: pkg.dev_dependency_names(),
        path: project.to_path_buf(),
    };
    debug!(
        "Discovered {} direct and {} dev dependencies in {}",
        deps.direct.len(),
        deps.dev.len(),
        manifest_path.display()
    );

    Ok(deps)
}
