//! # logsweeplib
//!
//! Finds `console.log` calls (or any dotted call you name) across a
//! JavaScript/TypeScript tree and disables, restores, or deletes them.
//!
//! ## Overview
//!
//! Every located call is classified by state:
//!
//! - **Active**: live code
//! - **LineCommented**: inside a hand-written `//` comment
//! - **BlockCommented**: inside a `/* */` comment
//! - **TaggedDisabled**: commented out by this library with [`DISABLE_MARKER`]
//!
//! and one [`Mode`] decides what happens to each state:
//!
//! | mode | active | line/block commented | tagged disabled |
//! |---|---|---|---|
//! | `disable` | comment out | keep | keep |
//! | `restore` | keep | keep | uncomment |
//! | `delete-all` | delete | delete | delete |
//! | `delete-active` | delete | keep | keep |
//! | `delete-commented` | keep | delete | keep |
//!
//! Disabling only ever adds the marker in front of the original bytes, so
//! `restore` after `disable` gives back the file byte for byte.
//!
//! ## Features
//!
//! - **Delimiter-aware matching**: strings, template literals with nested
//!   `${}`, regex literals, and comments inside the arguments never end a call
//! - **Statement-only edits**: calls used as values are reported, not touched
//! - **Parallel**: files are processed on a `rayon` pool
//! - **Census and dry run**: count without writing, or see what would change
//!
//! ## Example
//!
//! ```rust
//! use logsweeplib::{census, run, FilterConfig, Mode, SweepOptions};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::write(dir.path().join("app.js"), "console.log('hi');\n// console.log('old');\n").unwrap();
//!
//! // Count by state
//! let report = census(dir.path(), &SweepOptions::new()).unwrap();
//! assert_eq!(report.counts.active, 1);
//! assert_eq!(report.counts.line_commented, 1);
//!
//! // Delete only the hand-commented call
//! let options = SweepOptions::new().filter(FilterConfig::new().extensions(&["js"]));
//! let report = run(dir.path(), Mode::DeleteCommented, &options).unwrap();
//! assert_eq!(report.total_occurrences_changed, 1);
//! assert_eq!(fs::read_to_string(dir.path().join("app.js")).unwrap(), "console.log('hi');\n");
//! ```

pub mod error;
pub mod options;
pub mod output;
pub mod report;
pub mod rewrite;
pub mod scan;
pub mod source;
pub mod sweep;
pub mod transform;

pub use error::SweepError;
pub use options::SweepOptions;
pub use output::{write_csv, write_csv_file};
pub use report::{ExtensionStats, FileResult, FileStatus, PathIssue, Report, StateCounts};
pub use rewrite::{process_file, read_source, write_source};
pub use scan::{
    scan, Occurrence, ScanResult, SkipReason, SkippedOccurrence, State, Target, DISABLE_MARKER,
};
pub use source::{discover_files, walk, FilterConfig, Walk};
pub use sweep::{census, run};
pub use transform::{apply, transform_source, Action, Mode, Transformed};

/// Result type for logsweeplib operations
pub type Result<T> = std::result::Result<T, SweepError>;
