//! dep-hunter - Dependency footprint analyzer for Node.js projects
//!
//! This crate builds the installed dependency graph of a project, measures
//! every package, and attributes to each direct dependency the transitive
//! packages that exist only because of it. Combined with import counts from
//! the project's sources, the result shows which dependencies cost the most
//! for how little use.

pub mod analysis;
pub mod analyzer;
pub mod attribution;
pub mod config;
pub mod export;
pub mod graph;
pub mod parser;
pub mod size;

pub use analyzer::{run_analysis, run_analysis_with_progress, AnalysisReport};
pub use config::AnalyzeConfig;
