//! # logsweep
//!
//! A CLI tool for disabling, restoring, or deleting `console.log` calls across
//! a JavaScript/TypeScript project.
//!
//! ## Overview
//!
//! logsweep is built on top of logsweeplib. It walks a source tree, finds
//! every call of the target (default `console.log`), and applies exactly one
//! mode per run. Disabled calls carry a fixed marker so they can be restored
//! byte for byte later.
//!
//! ## Usage
//!
//! ```bash
//! # Comment out every active console.log under src/
//! logsweep src --disable
//!
//! # Bring them back
//! logsweep src --restore
//!
//! # See what deleting hand-commented calls would do
//! logsweep . --delete-commented --dry-run --by-file
//!
//! # Count calls by state and export CSV
//! logsweep count . --csv report.csv
//!
//! # Target another call and include build directories
//! logsweep . --delete-all --target console.debug --include-dir dist
//! ```

mod logging;
mod render;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgGroup, ArgMatches, Command};
use log::info;
use logsweeplib::{census, run, write_csv_file, FilterConfig, Mode, Report, SweepOptions, Target};

/// Arguments shared by the root command and `count`
fn common_args() -> Vec<Arg> {
    vec![
        Arg::new("path")
            .help("File or directory to sweep (defaults to current directory)")
            .default_value("."),
        Arg::new("exclude-dir")
            .long("exclude-dir")
            .value_name("NAME")
            .action(ArgAction::Append)
            .help("Also skip directories with this name (can be specified multiple times)"),
        Arg::new("include-dir")
            .long("include-dir")
            .value_name("NAME")
            .action(ArgAction::Append)
            .help("Walk into a directory that is skipped by default, e.g. dist"),
        Arg::new("no-default-excludes")
            .long("no-default-excludes")
            .action(ArgAction::SetTrue)
            .help("Do not skip node_modules, dist, build, out, lib, .git"),
        Arg::new("ext")
            .long("ext")
            .value_name("EXT")
            .value_delimiter(',')
            .help("File extensions to process (comma-separated, default: js,jsx,ts,tsx)"),
        Arg::new("include")
            .short('i')
            .long("include")
            .action(ArgAction::Append)
            .help("Include files matching glob pattern"),
        Arg::new("exclude")
            .short('e')
            .long("exclude")
            .action(ArgAction::Append)
            .help("Exclude files matching glob pattern"),
        Arg::new("target")
            .short('t')
            .long("target")
            .default_value("console.log")
            .help("Dotted call to look for"),
        Arg::new("threads")
            .short('j')
            .long("threads")
            .value_parser(value_parser!(usize))
            .help("Worker threads (default: one per CPU)"),
        Arg::new("csv")
            .long("csv")
            .value_name("FILE")
            .help("Also write per-extension counters to a CSV file"),
        Arg::new("output")
            .short('o')
            .long("output")
            .value_parser(["table", "json"])
            .default_value("table")
            .help("Output format"),
        Arg::new("by-file")
            .short('f')
            .long("by-file")
            .action(ArgAction::SetTrue)
            .help("Show breakdown by file"),
        Arg::new("verbose")
            .short('v')
            .long("verbose")
            .action(ArgAction::SetTrue)
            .help("Log per-file details to stderr"),
    ]
}

/// Build the clap Command structure
fn build_command() -> Command {
    let modes = [
        (Mode::Disable, "Comment out active calls with a restorable marker"),
        (Mode::Restore, "Uncomment calls disabled by --disable"),
        (Mode::DeleteAll, "Delete every call, commented or not"),
        (Mode::DeleteActive, "Delete active calls only"),
        (Mode::DeleteCommented, "Delete hand-commented calls only"),
    ];

    let mut cmd = Command::new("logsweep")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Disable, restore, or delete console.log calls across a JavaScript/TypeScript tree")
        .args(common_args())
        .subcommand_negates_reqs(true)
        .args_conflicts_with_subcommands(true);

    for (mode, help) in modes {
        cmd = cmd.arg(
            Arg::new(mode.name())
                .long(mode.name())
                .action(ArgAction::SetTrue)
                .help(help),
        );
    }

    cmd.group(
        ArgGroup::new("mode")
            .args(Mode::ALL.map(Mode::name))
            .required(true)
            .multiple(false),
    )
    .arg(
        Arg::new("dry-run")
            .short('n')
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Report what would change without writing any file"),
    )
    .subcommand(
        Command::new("count")
            .about("Count calls by state without changing anything")
            .args(common_args()),
    )
}

/// The mode flag given on the command line
fn selected_mode(matches: &ArgMatches) -> Option<Mode> {
    Mode::ALL.into_iter().find(|mode| matches.get_flag(mode.name()))
}

/// Build filter config from matches
fn build_filter(matches: &ArgMatches) -> anyhow::Result<FilterConfig> {
    let mut filter = FilterConfig::new();

    if matches.get_flag("no-default-excludes") {
        filter = filter.clear_excluded_dirs();
    }
    if let Some(dirs) = matches.get_many::<String>("include-dir") {
        for dir in dirs {
            filter = filter.allow_dir(dir);
        }
    }
    if let Some(dirs) = matches.get_many::<String>("exclude-dir") {
        for dir in dirs {
            filter = filter.exclude_dir(dir);
        }
    }
    if let Some(extensions) = matches.get_many::<String>("ext") {
        let extensions: Vec<&String> = extensions.collect();
        filter = filter.extensions(&extensions);
    }
    if let Some(includes) = matches.get_many::<String>("include") {
        for pattern in includes {
            filter = filter.include(pattern)?;
        }
    }
    if let Some(excludes) = matches.get_many::<String>("exclude") {
        for pattern in excludes {
            filter = filter.exclude(pattern)?;
        }
    }

    Ok(filter)
}

/// Build sweep options from matches
fn build_options(matches: &ArgMatches, dry_run: bool) -> anyhow::Result<SweepOptions> {
    let target: Target = matches
        .get_one::<String>("target")
        .map(|s| s.as_str())
        .unwrap_or("console.log")
        .parse()?;
    let threads = matches.get_one::<usize>("threads").copied().unwrap_or(0);

    Ok(SweepOptions::new()
        .filter(build_filter(matches)?)
        .target(target)
        .dry_run(dry_run)
        .threads(threads))
}

/// Run a mode (or a census when `mode` is None) and print the outcome
fn execute(matches: &ArgMatches, mode: Option<Mode>, dry_run: bool) -> anyhow::Result<Report> {
    let path = matches
        .get_one::<String>("path")
        .map(|s| s.as_str())
        .unwrap_or(".");
    let options = build_options(matches, dry_run)?;

    let report = match mode {
        Some(mode) => run(path, mode, &options)?,
        None => census(path, &options)?,
    };

    if let Some(csv_path) = matches.get_one::<String>("csv") {
        write_csv_file(&report, csv_path)
            .with_context(|| format!("failed to write CSV to {csv_path}"))?;
        info!("wrote {csv_path}");
    }

    let output = matches
        .get_one::<String>("output")
        .map(|s| s.as_str())
        .unwrap_or("table");
    if output == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!(
            "{}",
            render::render_report(&report, Path::new(path), matches.get_flag("by-file"))
        );
    }

    Ok(report)
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();

    let (sub, mode, dry_run) = match matches.subcommand() {
        Some(("count", sub)) => (sub, None, false),
        _ => (
            &matches,
            selected_mode(&matches),
            matches.get_flag("dry-run"),
        ),
    };
    logging::init_logger(sub.get_flag("verbose"));

    match execute(sub, mode, dry_run) {
        Ok(report) if report.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
