//! Source discovery: find files to sweep.
//!
//! This module handles the first stage of the pipeline - discovering which
//! files to scan. It provides:
//!
//! - **Directory pruning**: skip build output and dependency directories by name
//! - **File filtering**: allowed extensions plus include/exclude glob patterns
//! - **Lazy walking**: stream matching paths without collecting the tree first
//!
//! ## Example
//!
//! ```rust
//! use logsweeplib::source::{walk, FilterConfig};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::create_dir(dir.path().join("node_modules")).unwrap();
//! fs::write(dir.path().join("node_modules/dep.js"), "").unwrap();
//! fs::write(dir.path().join("app.ts"), "").unwrap();
//!
//! let filter = FilterConfig::new().exclude("**/*.d.ts").unwrap();
//! let files: Vec<_> = walk(dir.path(), &filter).unwrap().filter_map(Result::ok).collect();
//! assert_eq!(files, vec![dir.path().join("app.ts")]);
//! ```

pub mod filter;

pub use filter::{
    discover_files, walk, FilterConfig, Walk, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXTENSIONS,
};
