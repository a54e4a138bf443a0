//! Options controlling a sweep.

use crate::scan::Target;
use crate::source::FilterConfig;

/// Options for a transform run or a census.
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Which directories and files are visited
    pub filter: FilterConfig,
    /// The call to look for
    pub target: Target,
    /// Compute results without writing any file
    pub dry_run: bool,
    /// Worker threads (None = one per logical CPU)
    pub threads: Option<usize>,
}

impl SweepOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set file filter.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Look for a different call than `console.log`.
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Report what would change without writing.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Limit the worker pool. Zero means the default size.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = (threads > 0).then_some(threads);
        self
    }
}
