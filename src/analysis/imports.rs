//! Regex-based import scanning for JavaScript/TypeScript.
//!
//! This is a token scan, not a parse: imports inside comments or strings are
//! counted too. That trade-off keeps the scan fast and grammar-free.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that can occur while scanning a project for imports.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Project directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// `import x from 'y'`, `import { x } from 'y'`, `import 'y'`
static ES_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+(?:[\w{},\s*]+\s+from\s+)?['"]([^'"]+)['"]"#)
        .expect("ES import pattern is valid")
});

/// `require('y')`
static REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"require\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .expect("require pattern is valid")
});

/// `import('y')`
static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s*\(\s*['"]([^'"]+)['"]\s*\)"#)
        .expect("dynamic import pattern is valid")
});

fn patterns() -> [&'static Regex; 3] {
    [&*ES_IMPORT, &*REQUIRE, &*DYNAMIC_IMPORT]
}

/// Source file flavour, determined from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
    Tsx,
    Jsx,
}

impl SourceLanguage {
    /// Determine language from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            "jsx" => Some(SourceLanguage::Jsx),
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Every import path matched in `source`, one entry per match.
fn import_matches(source: &str) -> impl Iterator<Item = &str> {
    patterns().into_iter().flat_map(move |pattern| {
        pattern
            .captures_iter(source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
    })
}

/// Returns the distinct import paths in `source`, in first-seen order per
/// pattern.
///
/// # Example
///
/// ```rust
/// use dep_hunter::analysis::parse_imports;
///
/// let source = r#"
///     import React from 'react';
///     import { render } from "react-dom";
///     const express = require('express');
///     const lazy = await import('lodash/debounce');
///     import { useState } from 'react';
/// "#;
/// assert_eq!(
///     parse_imports(source),
///     vec!["react", "react-dom", "express", "lodash/debounce"]
/// );
/// ```
pub fn parse_imports(source: &str) -> Vec<String> {
    let mut seen = indexmap::IndexSet::new();
    for path in import_matches(source) {
        seen.insert(path);
    }
    seen.into_iter().map(str::to_string).collect()
}

/// Maps an import path to the package it belongs to.
///
/// Relative and absolute paths, and scopes without a package name, yield
/// `None`.
///
/// # Example
///
/// ```rust
/// use dep_hunter::analysis::extract_dependency_name;
///
/// assert_eq!(extract_dependency_name("lodash/fp/curry"), Some("lodash"));
/// assert_eq!(extract_dependency_name("@babel/core/lib/parser"), Some("@babel/core"));
/// assert_eq!(extract_dependency_name("./utils"), None);
/// assert_eq!(extract_dependency_name("@scope"), None);
/// ```
pub fn extract_dependency_name(import_path: &str) -> Option<&str> {
    if import_path.is_empty() || import_path.starts_with('.') || import_path.starts_with('/') {
        return None;
    }

    if import_path.starts_with('@') {
        let mut parts = import_path.splitn(3, '/');
        let scope = parts.next()?;
        let name = parts.next()?;
        return Some(&import_path[..scope.len() + 1 + name.len()]);
    }

    import_path.split('/').next()
}

/// Counts import matches per tracked dependency in one source text.
///
/// Every match counts, so a package imported twice in a file scores two.
pub fn count_source_imports<'a>(
    source: &str,
    tracked: &BTreeSet<&'a str>,
) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for path in import_matches(source) {
        if let Some(name) = extract_dependency_name(path).and_then(|n| tracked.get(n)) {
            *counts.entry(*name).or_insert(0) += 1;
        }
    }
    counts
}

/// Collects the source files under `root`, skipping ignored directories.
pub fn source_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| SourceLanguage::from_path(e.path()).is_some())
        .map(|e| e.into_path())
        .collect()
}

/// Counts how often each of `dependencies` is imported in the project.
///
/// Every dependency appears in the result, with zero when it is never
/// imported. Entries keep the order of `dependencies`. Files are read in
/// parallel; unreadable files are logged and skipped.
pub fn count_imports(root: &Path, dependencies: &[String]) -> ScanResult<IndexMap<String, usize>> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let tracked: BTreeSet<&str> = dependencies.iter().map(String::as_str).collect();
    let files = source_files(root);
    debug!("Scanning {} source files under {}", files.len(), root.display());

    let totals = files
        .par_iter()
        .filter_map(|path| match fs::read_to_string(path) {
            Ok(source) => Some(count_source_imports(&source, &tracked)),
            Err(e) => {
                warn!("Error reading file {}: {}", path.display(), e);
                None
            }
        })
        .reduce(HashMap::new, |mut acc, counts| {
            for (name, count) in counts {
                *acc.entry(name).or_insert(0) += count;
            }
            acc
        });

    Ok(dependencies
        .iter()
        .map(|dep| (dep.clone(), totals.get(dep.as_str()).copied().unwrap_or(0)))
        .collect())
}

/// Check if a directory should be ignored during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    matches!(
        name.as_ref(),
        "node_modules" | ".git" | "dist" | "build" | ".next" | "coverage" | ".turbo"
    )
}
