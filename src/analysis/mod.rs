//! Source code analysis for dep-hunter.
//!
//! Counts how often each dependency is imported by the project's own
//! JavaScript/TypeScript sources. Three import forms are recognised:
//!
//! - ES `import ... from 'x'` and side-effect `import 'x'`
//! - CommonJS `require('x')`
//! - dynamic `import('x')`
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dep_hunter::analysis::count_imports;
//!
//! let deps = vec!["express".to_string(), "lodash".to_string()];
//! let usage = count_imports(Path::new("."), &deps)?;
//! for (package, count) in &usage {
//!     println!("{}: imported {} times", package, count);
//! }
//! ```

pub mod imports;

pub use imports::{
    count_imports, count_source_imports, extract_dependency_name, parse_imports, source_files,
    ScanError, ScanResult, SourceLanguage,
};
