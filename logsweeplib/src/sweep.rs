//! High-level sweep API.
//!
//! The orchestrator drives walk, scan, transform, and rewrite for every file
//! below a root and folds the outcomes into one [`Report`]. Files are handled
//! in parallel; each worker builds its own partial report and the partials are
//! merged by a single reduce.

use std::path::Path;

use log::{info, warn};
use rayon::prelude::*;

use crate::error::SweepError;
use crate::options::SweepOptions;
use crate::report::Report;
use crate::rewrite::process_file;
use crate::source::walk;
use crate::transform::Mode;
use crate::Result;

/// Apply `mode` to every matching file below `root`.
///
/// Per-path problems (unreadable directories, binary files, failed writes) are
/// recorded in the report and never stop the run. Only setup problems such as
/// a missing root are returned as errors.
///
/// # Example
///
/// ```rust
/// use logsweeplib::{run, Mode, SweepOptions};
/// use std::fs;
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// fs::write(dir.path().join("app.js"), "console.log(1);\nstart();\n").unwrap();
///
/// let report = run(dir.path(), Mode::Disable, &SweepOptions::new()).unwrap();
/// assert_eq!(report.total_occurrences_changed, 1);
///
/// let restored = run(dir.path(), Mode::Restore, &SweepOptions::new()).unwrap();
/// assert_eq!(restored.total_occurrences_changed, 1);
/// assert_eq!(fs::read_to_string(dir.path().join("app.js")).unwrap(), "console.log(1);\nstart();\n");
/// ```
pub fn run(root: impl AsRef<Path>, mode: Mode, options: &SweepOptions) -> Result<Report> {
    sweep(root.as_ref(), Some(mode), options)
}

/// Count occurrences by state below `root` without changing anything.
pub fn census(root: impl AsRef<Path>, options: &SweepOptions) -> Result<Report> {
    sweep(root.as_ref(), None, options)
}

fn sweep(root: &Path, mode: Option<Mode>, options: &SweepOptions) -> Result<Report> {
    let files = walk(root, &options.filter)?;
    let dry_run = options.dry_run && mode.is_some();

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = options.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|e| SweepError::ThreadPool(e.to_string()))?;

    info!(
        "{} {} in {}",
        mode.map_or("counting", Mode::name),
        options.target,
        root.display()
    );

    let target = &options.target;
    let mut report = pool.install(|| {
        files
            .par_bridge()
            .map(|entry| {
                let mut partial = Report::new(mode, dry_run);
                match entry {
                    Ok(path) => partial.add_file(process_file(&path, mode, target, dry_run)),
                    Err(SweepError::PathUnreadable { path, source }) => {
                        warn!("cannot read '{}': {}", path.display(), source);
                        partial.add_issue(path, source.to_string());
                    }
                    Err(e) => {
                        warn!("{e}");
                        partial.add_issue(root.to_path_buf(), e.to_string());
                    }
                }
                partial
            })
            .reduce(|| Report::new(mode, dry_run), |a, b| a + b)
    });
    report.sort();

    info!(
        "{} file(s) scanned, {} occurrence(s) found, {} changed, {} failed write(s)",
        report.total_files_scanned,
        report.total_occurrences_found,
        report.total_occurrences_changed,
        report.failed_writes
    );
    Ok(report)
}
