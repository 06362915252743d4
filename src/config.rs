//! Command-line configuration for an analysis run.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::export::ExportFormat;
use crate::size::remote::{DEFAULT_CONCURRENCY, DEFAULT_REQUEST_INTERVAL};
use crate::size::{SizeCache, SizeSource};

/// Options of `dep-hunter analyze`.
#[derive(Debug, Clone, Args)]
pub struct AnalyzeConfig {
    /// Path to the Node.js project to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Include devDependencies in the analysis
    #[arg(long)]
    pub include_dev: bool,

    /// Output results as JSON (shorthand for --format json)
    #[arg(long, conflicts_with = "format")]
    pub json: bool,

    /// Output format: table, json or markdown
    #[arg(short, long, default_value = "table")]
    pub format: ExportFormat,

    /// Where package sizes come from
    #[arg(long, value_enum, default_value_t = SizeSource::Local)]
    pub size_source: SizeSource,

    /// Directory holding the remote size cache (defaults to ~/.dep-hunter)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Minimum milliseconds between remote size requests
    #[arg(long, default_value_t = DEFAULT_REQUEST_INTERVAL.as_millis() as u64)]
    pub request_interval_ms: u64,

    /// Maximum remote size requests in flight
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Resolve the dependency graph with one worker per package
    #[arg(long)]
    pub parallel: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            include_dev: false,
            json: false,
            format: ExportFormat::Table,
            size_source: SizeSource::Local,
            cache_dir: None,
            request_interval_ms: DEFAULT_REQUEST_INTERVAL.as_millis() as u64,
            concurrency: DEFAULT_CONCURRENCY,
            parallel: false,
        }
    }
}

impl AnalyzeConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// The format to write, with `--json` taking precedence.
    pub fn output_format(&self) -> ExportFormat {
        if self.json {
            ExportFormat::Json
        } else {
            self.format
        }
    }

    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }

    /// Location of the remote size cache, if one can be determined.
    pub fn cache_path(&self) -> Option<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Some(SizeCache::path_in(dir)),
            None => SizeCache::default_path(),
        }
    }
}
