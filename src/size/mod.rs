//! Package size back-ends.
//!
//! Sizes are attached to graph nodes after the graph is built. Two
//! back-ends are available:
//!
//! - **Local**: walk each package's install directory and sum file sizes
//! - **Bundlephobia**: ask the bundlephobia API for the gzipped bundle size,
//!   with an on-disk cache, a request rate governor and in-flight
//!   de-duplication
//!
//! Either way a size that cannot be determined is reported as zero.
//!
//! # Example
//!
//! ```ignore
//! use dep_hunter::size::{local, format_size};
//!
//! let sizes = local::local_sizes(&graph);
//! graph.apply_sizes(&sizes);
//! println!("{}", format_size(graph.total_size()));
//! ```

pub mod cache;
pub mod local;
pub mod remote;

use thiserror::Error;

pub use cache::{CachedSize, SizeCache};
pub use local::{directory_size, local_sizes};
pub use remote::{
    BundleSize, BundlephobiaClient, RateGovernor, RemoteSizeCalculator, SizeFetcher,
};

/// Where package sizes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SizeSource {
    /// Sum of installed file sizes under node_modules
    #[default]
    Local,
    /// Gzipped bundle size reported by bundlephobia.com
    Bundlephobia,
}

impl std::fmt::Display for SizeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeSource::Local => write!(f, "local"),
            SizeSource::Bundlephobia => write!(f, "bundlephobia"),
        }
    }
}

/// Errors raised by the size back-ends.
#[derive(Error, Debug)]
pub enum SizeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Size lookup for {package} failed with status {status}")]
    Status { package: String, status: u16 },

    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No size known for {0}")]
    NotFound(String),
}

/// Format bytes as human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_size_source_display() {
        assert_eq!(SizeSource::Local.to_string(), "local");
        assert_eq!(SizeSource::Bundlephobia.to_string(), "bundlephobia");
        assert_eq!(SizeSource::default(), SizeSource::Local);
    }
}
