//! Table rendering for CLI output

use std::fmt::Write;
use std::path::Path;

use console::Style;
use logsweeplib::{FileResult, FileStatus, Report, SkipReason, StateCounts};

const NAME_WIDTH: usize = 12;
const FILE_NAME_WIDTH: usize = 48;
const CELL_WIDTH: usize = 9;
const COLUMNS: [&str; 7] = ["Files", "Active", "Line", "Block", "Tagged", "Found", "Changed"];

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() > max_len {
        let keep: String = chars[chars.len() - (max_len - 2)..].iter().collect();
        format!("..{keep}")
    } else {
        name.to_string()
    }
}

/// Convert a path to a relative path from the base directory.
pub fn make_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

fn cells(files: u64, counts: &StateCounts, found: u64, changed: u64) -> String {
    [
        files,
        counts.active,
        counts.line_commented,
        counts.block_commented,
        counts.tagged_disabled,
        found,
        changed,
    ]
    .iter()
    .map(|v| format!("{:>width$}", v, width = CELL_WIDTH))
    .collect::<Vec<_>>()
    .join(" ")
}

fn header_row(name: &str, name_width: usize) -> String {
    let columns = COLUMNS
        .iter()
        .map(|c| format!("{:>width$}", c, width = CELL_WIDTH))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{:<width$}{}", name, columns, width = name_width)
}

fn separator(name_width: usize) -> String {
    "-".repeat(name_width + (CELL_WIDTH + 1) * COLUMNS.len() - 1)
}

fn status_label(file: &FileResult) -> &'static str {
    match file.status {
        FileStatus::Unchanged => "",
        FileStatus::Rewritten => "rewritten",
        FileStatus::WouldRewrite => "would rewrite",
        FileStatus::NotText(_) => "not text",
        FileStatus::Unreadable(_) => "unreadable",
        FileStatus::WriteFailed(_) => "write failed",
    }
}

fn reason_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Unbalanced => "no closing delimiter",
        SkipReason::NotStatement => "not a statement",
        SkipReason::UnsafeToDisable => "code follows on the same line",
        SkipReason::UnsafeJoin => "deletion would form a comment delimiter",
    }
}

/// Render the run summary as a plain text table.
///
/// Rows are per extension, or per file when `by_file` is set, followed by a
/// total row and the failure counters.
pub fn render_report(report: &Report, base: &Path, by_file: bool) -> String {
    let heading = Style::new().bold();
    let warn = Style::new().yellow();
    let error = Style::new().red().bold();
    let mut out = String::new();

    let title = match report.mode {
        Some(mode) if report.dry_run => format!("{mode} (dry run)"),
        Some(mode) => mode.to_string(),
        None => "count".to_string(),
    };
    let _ = writeln!(out, "{}", heading.apply_to(title));

    let (name, name_width) = if by_file {
        ("File", FILE_NAME_WIDTH)
    } else {
        ("Extension", NAME_WIDTH)
    };
    let _ = writeln!(out, "{}", heading.apply_to(header_row(name, name_width)));
    let _ = writeln!(out, "{}", separator(name_width));

    if by_file {
        for file in report.per_file.iter().filter(|f| f.was_scanned()) {
            let label = truncate_name(&make_relative(&file.path, base), name_width - 2);
            let _ = writeln!(
                out,
                "{:<width$}{} {}",
                label,
                cells(1, &file.counts, file.occurrences_found, file.occurrences_changed),
                status_label(file),
                width = name_width
            );
        }
    } else {
        for (extension, stats) in &report.per_extension {
            let _ = writeln!(
                out,
                "{:<width$}{}",
                format!(".{extension}"),
                cells(stats.files, &stats.counts, stats.found, stats.changed),
                width = name_width
            );
        }
    }

    let _ = writeln!(out, "{}", separator(name_width));
    let _ = writeln!(
        out,
        "{:<width$}{}",
        "Total",
        cells(
            report.total_files_scanned,
            &report.counts,
            report.total_occurrences_found,
            report.total_occurrences_changed
        ),
        width = name_width
    );

    if report.mode.is_some() {
        let verb = if report.dry_run {
            "Files that would change"
        } else {
            "Files written"
        };
        let _ = writeln!(out, "\n{verb}: {}", report.files_written);
    }
    if report.skipped_occurrences > 0 {
        let line = format!("Skipped occurrences: {}", report.skipped_occurrences);
        let _ = writeln!(out, "{}", warn.apply_to(line));
        if by_file {
            for file in &report.per_file {
                for skipped in &file.skipped {
                    let _ = writeln!(
                        out,
                        "  {}:{}: {}",
                        make_relative(&file.path, base),
                        skipped.line,
                        reason_label(skipped.reason)
                    );
                }
            }
        }
    }
    if report.decode_skips > 0 {
        let line = format!("Not text, skipped: {}", report.decode_skips);
        let _ = writeln!(out, "{}", warn.apply_to(line));
    }
    if report.failed_writes > 0 {
        let line = format!("Failed writes: {}", report.failed_writes);
        let _ = writeln!(out, "{}", error.apply_to(line));
    }
    if report.unreadable_paths() > 0 {
        let line = format!("Unreadable paths: {}", report.unreadable_paths());
        let _ = writeln!(out, "{}", error.apply_to(line));
        for issue in &report.issues {
            let _ = writeln!(
                out,
                "  {}: {}",
                make_relative(&issue.path, base),
                issue.message
            );
        }
    }

    out
}
