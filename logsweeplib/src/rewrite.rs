//! Reading, transforming, and writing back a single file.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};

use crate::error::SweepError;
use crate::report::{FileResult, FileStatus, StateCounts};
use crate::scan::{scan, SkipReason, Target};
use crate::transform::{apply, Mode};
use crate::Result;

/// Bytes inspected for a NUL when deciding whether a file is binary.
const BINARY_PROBE: usize = 8000;

/// Read a file as UTF-8 text.
///
/// Files with a NUL byte near the start, or that are not valid UTF-8, are
/// rejected with [`SweepError::Decode`].
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| SweepError::PathUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.iter().take(BINARY_PROBE).any(|&b| b == 0) {
        return Err(SweepError::Decode {
            path: path.to_path_buf(),
            message: "binary content".to_string(),
        });
    }
    String::from_utf8(bytes).map_err(|e| SweepError::Decode {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Replace a file's contents with `text`.
///
/// The handle is scoped to this call and is closed on every path, including
/// a failed write or flush.
pub fn write_source(path: &Path, text: &str) -> Result<()> {
    let to_error = |source| SweepError::WriteFailure {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(text.as_bytes()).map_err(to_error)?;
    writer.flush().map_err(to_error)?;
    writer.get_ref().sync_all().map_err(to_error)?;
    Ok(())
}

/// Lowercased extension of `path`, without the dot.
pub(crate) fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Scan one file and, when `mode` is given, transform it.
///
/// With no mode the file is only counted. The file is written back only when
/// the new text differs from the original and `dry_run` is off. Failures are
/// recorded in the returned status rather than returned as errors.
pub fn process_file(
    path: &Path,
    mode: Option<Mode>,
    target: &Target,
    dry_run: bool,
) -> FileResult {
    let extension = extension_of(path);
    let text = match read_source(path) {
        Ok(text) => text,
        Err(SweepError::Decode { message, .. }) => {
            warn!("skipping {}: {}", path.display(), message);
            return FileResult::failed(path.to_path_buf(), extension, FileStatus::NotText(message));
        }
        Err(e) => {
            warn!("{e}");
            let message = match e {
                SweepError::PathUnreadable { source, .. } => source.to_string(),
                other => other.to_string(),
            };
            return FileResult::failed(
                path.to_path_buf(),
                extension,
                FileStatus::Unreadable(message),
            );
        }
    };

    let found = scan(&text, target);
    let counts = StateCounts::from_occurrences(&found.occurrences);
    let mut result = FileResult {
        path: path.to_path_buf(),
        extension,
        counts,
        occurrences_found: found.occurrences.len() as u64,
        occurrences_changed: 0,
        bytes_before: text.len() as u64,
        bytes_after: text.len() as u64,
        status: FileStatus::Unchanged,
        skipped: found.skipped.clone(),
    };

    let Some(mode) = mode else {
        return result;
    };

    let transformed = apply(&text, &found, mode);
    result.skipped = transformed.skipped;
    for skipped in &result.skipped {
        if skipped.reason == SkipReason::Unbalanced {
            warn!(
                "{}:{}: no closing delimiter found, left untouched",
                path.display(),
                skipped.line
            );
        } else {
            debug!(
                "{}:{}: left untouched ({:?})",
                path.display(),
                skipped.line,
                skipped.reason
            );
        }
    }
    if transformed.text == text {
        return result;
    }

    result.occurrences_changed = transformed.changed as u64;
    result.bytes_after = transformed.text.len() as u64;
    if dry_run {
        result.status = FileStatus::WouldRewrite;
        return result;
    }

    match write_source(path, &transformed.text) {
        Ok(()) => {
            debug!(
                "{}: {} {} occurrence(s)",
                path.display(),
                mode,
                transformed.changed
            );
            result.status = FileStatus::Rewritten;
        }
        Err(e) => {
            warn!("{e}");
            let message = match e {
                SweepError::WriteFailure { source, .. } => source.to_string(),
                other => other.to_string(),
            };
            result.status = FileStatus::WriteFailed(message);
            result.occurrences_changed = 0;
            result.bytes_after = result.bytes_before;
        }
    }
    result
}
