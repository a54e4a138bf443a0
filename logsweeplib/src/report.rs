//! Per-file and per-run results.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scan::{Occurrence, SkippedOccurrence, State};
use crate::transform::Mode;

/// Occurrence counts by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub active: u64,
    pub line_commented: u64,
    pub block_commented: u64,
    pub tagged_disabled: u64,
}

impl StateCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the states of scanned occurrences.
    pub fn from_occurrences(occurrences: &[Occurrence]) -> Self {
        let mut counts = Self::new();
        for occurrence in occurrences {
            counts.record(occurrence.state);
        }
        counts
    }

    pub fn record(&mut self, state: State) {
        match state {
            State::Active => self.active += 1,
            State::LineCommented => self.line_commented += 1,
            State::BlockCommented => self.block_commented += 1,
            State::TaggedDisabled => self.tagged_disabled += 1,
        }
    }

    /// Hand-written comments plus tool-disabled calls
    pub fn commented(&self) -> u64 {
        self.line_commented + self.block_commented + self.tagged_disabled
    }

    pub fn total(&self) -> u64 {
        self.active + self.commented()
    }
}

impl Add for StateCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            active: self.active + other.active,
            line_commented: self.line_commented + other.line_commented,
            block_commented: self.block_commented + other.block_commented,
            tagged_disabled: self.tagged_disabled + other.tagged_disabled,
        }
    }
}

impl AddAssign for StateCounts {
    fn add_assign(&mut self, other: Self) {
        self.active += other.active;
        self.line_commented += other.line_commented;
        self.block_commented += other.block_commented;
        self.tagged_disabled += other.tagged_disabled;
    }
}

/// Totals for one file extension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionStats {
    /// Files with this extension that were read successfully
    pub files: u64,
    /// State counts before transformation
    pub counts: StateCounts,
    pub found: u64,
    pub changed: u64,
}

impl AddAssign for ExtensionStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.counts += other.counts;
        self.found += other.found;
        self.changed += other.changed;
    }
}

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum FileStatus {
    /// Nothing to change, file left alone
    Unchanged,
    /// New text written back
    Rewritten,
    /// Dry run: new text computed but not written
    WouldRewrite,
    /// Binary or not valid UTF-8
    NotText(String),
    /// Could not be opened or read
    Unreadable(String),
    /// New text computed but writing it failed
    WriteFailed(String),
}

/// Result of processing a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub path: PathBuf,
    /// Lowercased extension without the dot
    pub extension: String,
    /// State counts of the original text
    pub counts: StateCounts,
    pub occurrences_found: u64,
    pub occurrences_changed: u64,
    pub bytes_before: u64,
    pub bytes_after: u64,
    pub status: FileStatus,
    pub skipped: Vec<SkippedOccurrence>,
}

impl FileResult {
    /// A file that could not be processed at all.
    pub fn failed(path: PathBuf, extension: String, status: FileStatus) -> Self {
        Self {
            path,
            extension,
            counts: StateCounts::new(),
            occurrences_found: 0,
            occurrences_changed: 0,
            bytes_before: 0,
            bytes_after: 0,
            status,
            skipped: Vec::new(),
        }
    }

    /// True when the file was (or in a dry run would be) rewritten
    pub fn is_changed(&self) -> bool {
        matches!(self.status, FileStatus::Rewritten | FileStatus::WouldRewrite)
    }

    /// True when the text was read and scanned
    pub fn was_scanned(&self) -> bool {
        !matches!(
            self.status,
            FileStatus::NotText(_) | FileStatus::Unreadable(_)
        )
    }
}

/// A path the walk could not descend into or read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathIssue {
    pub path: PathBuf,
    pub message: String,
}

/// Aggregated result of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Mode applied, `None` for a read-only census
    pub mode: Option<Mode>,
    pub dry_run: bool,
    pub total_files_scanned: u64,
    pub total_occurrences_found: u64,
    pub total_occurrences_changed: u64,
    /// Files rewritten (or that would be, in a dry run)
    pub files_written: u64,
    pub failed_writes: u64,
    pub decode_skips: u64,
    /// Occurrences left untouched and flagged
    pub skipped_occurrences: u64,
    /// State counts across all scanned files, before transformation
    pub counts: StateCounts,
    pub per_extension: BTreeMap<String, ExtensionStats>,
    pub per_file: Vec<FileResult>,
    /// Directories or files that could not be read
    pub issues: Vec<PathIssue>,
}

impl Report {
    pub fn new(mode: Option<Mode>, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            ..Self::default()
        }
    }

    /// Fold one file's outcome into the totals.
    pub fn add_file(&mut self, file: FileResult) {
        match &file.status {
            FileStatus::NotText(_) => self.decode_skips += 1,
            FileStatus::Unreadable(message) => self.issues.push(PathIssue {
                path: file.path.clone(),
                message: message.clone(),
            }),
            FileStatus::WriteFailed(_) => self.failed_writes += 1,
            FileStatus::Rewritten | FileStatus::WouldRewrite => self.files_written += 1,
            FileStatus::Unchanged => {}
        }

        if file.was_scanned() {
            self.total_files_scanned += 1;
            self.total_occurrences_found += file.occurrences_found;
            self.total_occurrences_changed += file.occurrences_changed;
            self.skipped_occurrences += file.skipped.len() as u64;
            self.counts += file.counts;
            *self
                .per_extension
                .entry(file.extension.clone())
                .or_default() += ExtensionStats {
                files: 1,
                counts: file.counts,
                found: file.occurrences_found,
                changed: file.occurrences_changed,
            };
        }

        self.per_file.push(file);
    }

    /// Record a path the walk could not read.
    pub fn add_issue(&mut self, path: PathBuf, message: impl Into<String>) {
        self.issues.push(PathIssue {
            path,
            message: message.into(),
        });
    }

    /// Unreadable paths count as failures
    pub fn unreadable_paths(&self) -> u64 {
        self.issues.len() as u64
    }

    /// True when any write failed or any path could not be read.
    pub fn has_failures(&self) -> bool {
        self.failed_writes > 0 || !self.issues.is_empty()
    }

    /// Order per-file results and issues by path.
    pub fn sort(&mut self) {
        self.per_file.sort_by(|a, b| a.path.cmp(&b.path));
        self.issues.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

impl AddAssign for Report {
    fn add_assign(&mut self, other: Self) {
        self.mode = self.mode.or(other.mode);
        self.dry_run |= other.dry_run;
        self.total_files_scanned += other.total_files_scanned;
        self.total_occurrences_found += other.total_occurrences_found;
        self.total_occurrences_changed += other.total_occurrences_changed;
        self.files_written += other.files_written;
        self.failed_writes += other.failed_writes;
        self.decode_skips += other.decode_skips;
        self.skipped_occurrences += other.skipped_occurrences;
        self.counts += other.counts;
        for (extension, stats) in other.per_extension {
            *self.per_extension.entry(extension).or_default() += stats;
        }
        self.per_file.extend(other.per_file);
        self.issues.extend(other.issues);
    }
}

impl Add for Report {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::SkipReason;

    fn file(path: &str, extension: &str, status: FileStatus, active: u64) -> FileResult {
        FileResult {
            path: PathBuf::from(path),
            extension: extension.to_string(),
            counts: StateCounts {
                active,
                ..StateCounts::default()
            },
            occurrences_found: active,
            occurrences_changed: if status == FileStatus::Rewritten {
                active
            } else {
                0
            },
            bytes_before: 10,
            bytes_after: 10,
            status,
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_state_counts_totals() {
        let mut counts = StateCounts::new();
        for state in [
            State::Active,
            State::Active,
            State::LineCommented,
            State::BlockCommented,
            State::TaggedDisabled,
        ] {
            counts.record(state);
        }
        assert_eq!(counts.active, 2);
        assert_eq!(counts.commented(), 3);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_add_file_accumulates_by_status() {
        let mut report = Report::new(Some(Mode::Disable), false);
        report.add_file(file("a.js", "js", FileStatus::Rewritten, 2));
        report.add_file(file("b.ts", "ts", FileStatus::Unchanged, 0));
        report.add_file(file("c.js", "js", FileStatus::WriteFailed("denied".into()), 1));
        report.add_file(FileResult::failed(
            PathBuf::from("d.js"),
            "js".into(),
            FileStatus::NotText("binary".into()),
        ));

        assert_eq!(report.total_files_scanned, 3);
        assert_eq!(report.total_occurrences_found, 3);
        assert_eq!(report.total_occurrences_changed, 2);
        assert_eq!(report.files_written, 1);
        assert_eq!(report.failed_writes, 1);
        assert_eq!(report.decode_skips, 1);
        assert_eq!(report.per_extension["js"].files, 2);
        assert_eq!(report.per_extension["ts"].files, 1);
        assert_eq!(report.per_file.len(), 4);
        assert!(report.has_failures());
    }

    #[test]
    fn test_unreadable_file_is_an_issue() {
        let mut report = Report::default();
        report.add_file(FileResult::failed(
            PathBuf::from("locked.js"),
            "js".into(),
            FileStatus::Unreadable("permission denied".into()),
        ));
        assert_eq!(report.unreadable_paths(), 1);
        assert_eq!(report.total_files_scanned, 0);
        assert!(report.has_failures());
    }

    #[test]
    fn test_reports_merge() {
        let mut left = Report::new(Some(Mode::DeleteAll), true);
        left.add_file(file("b.js", "js", FileStatus::WouldRewrite, 1));
        let mut right = Report::default();
        let mut skipped = file("a.js", "js", FileStatus::Unchanged, 1);
        skipped.skipped.push(SkippedOccurrence {
            line: 1,
            offset: 0,
            reason: SkipReason::Unbalanced,
        });
        right.add_file(skipped);
        right.add_issue(PathBuf::from("private"), "permission denied");

        let mut merged = left + right;
        merged.sort();
        assert_eq!(merged.mode, Some(Mode::DeleteAll));
        assert!(merged.dry_run);
        assert_eq!(merged.total_files_scanned, 2);
        assert_eq!(merged.skipped_occurrences, 1);
        assert_eq!(merged.per_extension["js"].counts.active, 2);
        assert_eq!(merged.per_file[0].path, PathBuf::from("a.js"));
        assert_eq!(merged.issues.len(), 1);
    }
}
