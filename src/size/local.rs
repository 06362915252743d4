//! Installed-size back-end: walks package directories on disk.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, trace, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::graph::DependencyGraph;

/// Sums the lengths of all files below `path`.
///
/// Entries that cannot be read are skipped. A missing directory has a size
/// of zero. Symbolic links are not followed.
pub fn directory_size(path: &Path) -> u64 {
    let mut total = 0u64;

    for entry in WalkDir::new(path) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                warn!("Error calculating size for {}: {}", path.display(), e);
                return 0;
            }
            Err(e) => {
                trace!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => total += meta.len(),
            Err(e) => trace!("Skipping {}: {}", entry.path().display(), e),
        }
    }

    total
}

/// Measures every resolved package in the graph that has an install
/// directory. Packages are measured in parallel.
pub fn local_sizes(graph: &DependencyGraph) -> HashMap<String, u64> {
    let packages: Vec<_> = graph.packages().collect();
    debug!("Measuring {} installed packages", packages.len());

    packages
        .par_iter()
        .map(|package| {
            let size = package.path.as_deref().map_or(0, directory_size);
            (package.name.clone(), size)
        })
        .collect()
}
