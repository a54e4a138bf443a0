//! CSV export of a [`Report`].
//!
//! One header line, one row per file extension, and a closing total row keyed
//! by the mode name (`count` for a census).

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::report::{ExtensionStats, Report};
use crate::Result;

pub const CSV_HEADER: [&str; 9] = [
    "dimension",
    "key",
    "files",
    "active",
    "line_commented",
    "block_commented",
    "tagged_disabled",
    "found",
    "changed",
];

fn row(dimension: &str, key: &str, stats: &ExtensionStats) -> [String; 9] {
    [
        dimension.to_string(),
        key.to_string(),
        stats.files.to_string(),
        stats.counts.active.to_string(),
        stats.counts.line_commented.to_string(),
        stats.counts.block_commented.to_string(),
        stats.counts.tagged_disabled.to_string(),
        stats.found.to_string(),
        stats.changed.to_string(),
    ]
}

/// Write the report's counters as CSV to any writer.
pub fn write_csv<W: Write>(report: &Report, out: W) -> Result<()> {
    let mut writer = Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;

    for (extension, stats) in &report.per_extension {
        writer.write_record(row("extension", extension, stats))?;
    }

    let total = ExtensionStats {
        files: report.total_files_scanned,
        counts: report.counts,
        found: report.total_occurrences_found,
        changed: report.total_occurrences_changed,
    };
    let key = report.mode.map_or("count", |mode| mode.name());
    writer.write_record(row("total", key, &total))?;

    writer.flush()?;
    Ok(())
}

/// Write the report's counters to a CSV file, replacing it if present.
pub fn write_csv_file(report: &Report, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    write_csv(report, file)
}
