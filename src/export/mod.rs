//! Export functionality for footprint analysis results.
//!
//! This module provides exporters for outputting analysis results in
//! various formats: a coloured console table, JSON, and Markdown.

pub mod json;
pub mod markdown;
pub mod table;

use crate::attribution::ExclusivityResult;
use serde::Serialize;
use std::io::{self, Write};

/// Dependencies imported fewer times than this are removal candidates.
pub const LOW_USAGE_THRESHOLD: usize = 5;

/// Maximum number of removal candidates listed in reports.
pub const REMOVAL_CANDIDATE_LIMIT: usize = 5;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Console table - coloured, human-readable
    #[default]
    Table,
    /// JSON format - machine-readable, full data
    Json,
    /// Markdown format - documentation/reporting
    Markdown,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" | "text" => Ok(ExportFormat::Table),
            "json" => Ok(ExportFormat::Json),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            _ => Err(format!(
                "Unknown export format: '{}'. Valid formats: table, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Table => write!(f, "table"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// One analyzed direct dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRow {
    pub name: String,
    /// Number of import sites in the project's sources
    pub usage: usize,
    pub direct_size: u64,
    pub exclusive_size: u64,
    pub total_size: u64,
    /// Number of exclusive transitive dependencies
    pub exclusive_deps: usize,
    pub exclusive_dependency_names: Vec<String>,
}

impl AnalysisRow {
    pub fn new(result: &ExclusivityResult, usage: usize) -> Self {
        Self {
            name: result.name.clone(),
            usage,
            direct_size: result.direct_size,
            exclusive_size: result.exclusive_size,
            total_size: result.total_size,
            exclusive_deps: result.exclusive_count(),
            exclusive_dependency_names: result.exclusive_members.iter().cloned().collect(),
        }
    }

    pub fn is_unused(&self) -> bool {
        self.usage == 0
    }
}

/// Data container for export operations.
///
/// Holds all the analysis results that can be exported.
#[derive(Debug, Clone, Default)]
pub struct ExportData {
    /// Project name
    pub project_name: String,
    /// One row per analyzed root, in declaration order
    pub rows: Vec<AnalysisRow>,
}

impl ExportData {
    pub fn new(project_name: impl Into<String>, rows: Vec<AnalysisRow>) -> Self {
        Self {
            project_name: project_name.into(),
            rows,
        }
    }

    /// Rows ordered by usage, least used first. Ties keep declaration order.
    pub fn by_usage(&self) -> Vec<&AnalysisRow> {
        let mut rows: Vec<&AnalysisRow> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.usage);
        rows
    }

    /// Least-used rows with the biggest footprint first.
    pub fn removal_candidates(&self) -> Vec<&AnalysisRow> {
        let mut candidates: Vec<&AnalysisRow> = self
            .by_usage()
            .into_iter()
            .filter(|r| r.usage < LOW_USAGE_THRESHOLD)
            .collect();
        candidates.sort_by(|a, b| b.total_size.cmp(&a.total_size));
        candidates.truncate(REMOVAL_CANDIDATE_LIMIT);
        candidates
    }

    /// Total footprint of dependencies that are never imported.
    pub fn unused_total(&self) -> u64 {
        self.rows
            .iter()
            .filter(|r| r.is_unused())
            .map(|r| r.total_size)
            .sum()
    }

    /// Sum of every row's total size.
    pub fn total_footprint(&self) -> u64 {
        self.rows.iter().map(|r| r.total_size).sum()
    }
}

/// Trait for exporters.
pub trait Exporter {
    /// Export the data to the given writer.
    fn export<W: Write>(&self, data: &ExportData, writer: &mut W) -> io::Result<()>;
}

/// Export data in the specified format.
pub fn export<W: Write>(
    format: ExportFormat,
    data: &ExportData,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        ExportFormat::Table => table::TableExporter.export(data, writer),
        ExportFormat::Json => json::JsonExporter.export(data, writer),
        ExportFormat::Markdown => markdown::MarkdownExporter.export(data, writer),
    }
}

/// Export data to a string.
pub fn export_to_string(format: ExportFormat, data: &ExportData) -> io::Result<String> {
    let mut buffer = Vec::new();
    export(format, data, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
