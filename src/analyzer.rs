//! The end-to-end analysis pipeline.
//!
//! discover manifest → count imports → build graph → measure sizes →
//! attribute footprint → report rows

use std::collections::HashMap;
use std::fs;

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::analysis::count_imports;
use crate::attribution::{attribute_all, ExclusivityResult};
use crate::config::AnalyzeConfig;
use crate::export::{AnalysisRow, ExportData};
use crate::graph::{build_graph, build_graph_parallel, DependencyGraph, NodeModulesResolver};
use crate::parser::{discover_dependencies, ProjectDependencies};
use crate::size::{
    local_sizes, BundlephobiaClient, RemoteSizeCalculator, SizeCache, SizeFetcher, SizeSource,
};

/// Everything an analysis run produced.
#[derive(Debug)]
pub struct AnalysisReport {
    pub project: ProjectDependencies,
    /// Roots that were analyzed, in declaration order
    pub roots: Vec<String>,
    pub graph: DependencyGraph,
    /// Import counts per root
    pub usage: IndexMap<String, usize>,
    pub results: Vec<ExclusivityResult>,
}

impl AnalysisReport {
    /// False when the manifest declares no production dependencies, in which
    /// case nothing was analyzed.
    pub fn has_dependencies(&self) -> bool {
        !self.project.direct.is_empty()
    }

    pub fn project_name(&self) -> String {
        self.project
            .name
            .clone()
            .or_else(|| {
                self.project
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "project".to_string())
    }

    /// One row per root, in declaration order.
    pub fn rows(&self) -> Vec<AnalysisRow> {
        self.results
            .iter()
            .map(|r| AnalysisRow::new(r, self.usage.get(&r.name).copied().unwrap_or(0)))
            .collect()
    }

    pub fn export_data(&self) -> ExportData {
        ExportData::new(self.project_name(), self.rows())
    }
}

/// Runs the pipeline, logging each step.
pub fn run_analysis(config: &AnalyzeConfig) -> Result<AnalysisReport> {
    run_analysis_with_progress(config, |step| info!("{}", step))
}

/// Runs the pipeline, reporting each step to `progress`.
pub fn run_analysis_with_progress<P>(
    config: &AnalyzeConfig,
    mut progress: P,
) -> Result<AnalysisReport>
where
    P: FnMut(&str),
{
    if !config.path.exists() {
        bail!("Path {} does not exist", config.path.display());
    }
    let path = fs::canonicalize(&config.path)
        .with_context(|| format!("Failed to resolve path {}", config.path.display()))?;

    let project = discover_dependencies(&path)
        .with_context(|| format!("Failed to read the manifest in {}", path.display()))?;

    if project.direct.is_empty() {
        debug!("No production dependencies declared, skipping analysis");
        return Ok(AnalysisReport {
            project,
            roots: Vec::new(),
            graph: DependencyGraph::new(),
            usage: IndexMap::new(),
            results: Vec::new(),
        });
    }
    progress(&format!("Found {} direct dependencies", project.direct.len()));

    let roots = project.roots(config.include_dev);

    progress("Counting imports...");
    let usage = count_imports(&path, &roots).context("Failed to scan source files")?;

    progress("Building dependency graph...");
    let resolver = NodeModulesResolver::new(&path);
    let mut graph = if config.parallel {
        build_graph_parallel(&roots, &resolver)?
    } else {
        build_graph(&roots, &resolver)?
    };

    progress("Calculating sizes...");
    let sizes = collect_sizes(&graph, config)?;
    let applied = graph.apply_sizes(&sizes);
    debug!("Applied {} sizes ({})", applied, config.size_source);

    let results = attribute_all(&graph, &roots);

    Ok(AnalysisReport {
        project,
        roots,
        graph,
        usage,
        results,
    })
}

fn collect_sizes(graph: &DependencyGraph, config: &AnalyzeConfig) -> Result<HashMap<String, u64>> {
    match config.size_source {
        SizeSource::Local => Ok(local_sizes(graph)),
        SizeSource::Bundlephobia => {
            let cache = match config.cache_path() {
                Some(path) => SizeCache::load(path),
                None => {
                    warn!("No home directory found, size cache will not be persisted");
                    SizeCache::in_memory()
                }
            };
            let client = BundlephobiaClient::new().context("Failed to create HTTP client")?;
            let calculator = RemoteSizeCalculator::new(client, cache)
                .with_request_interval(config.request_interval())
                .with_concurrency(config.concurrency);

            remote_sizes(graph, &calculator)
        }
    }
}

/// Looks up every resolved package through `calculator` and persists the
/// cache afterwards. A cache that cannot be saved is only logged.
pub fn remote_sizes<F: SizeFetcher>(
    graph: &DependencyGraph,
    calculator: &RemoteSizeCalculator<F>,
) -> Result<HashMap<String, u64>> {
    let packages: Vec<(String, String)> = graph
        .packages()
        .map(|p| (p.name.clone(), p.version.clone()))
        .collect();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let sizes = runtime.block_on(calculator.sizes_for(&packages));

    if let Err(e) = calculator.save_cache() {
        warn!("Failed to save size cache: {}", e);
    }
    Ok(sizes)
}
