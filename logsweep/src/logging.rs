//! Logger setup for the CLI.

use std::env;
use std::io::Write;

use log::LevelFilter;

/// Initialize the logger from the verbose flag or `RUST_LOG`.
///
/// `--verbose` forces debug output. Otherwise `RUST_LOG` is honoured when
/// set, and warnings are shown by default. Records go to stderr so table and
/// JSON output on stdout stay clean.
pub fn init_logger(verbose: bool) {
    if !verbose && env::var("RUST_LOG").is_ok() {
        env_logger::init();
        return;
    }

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{}: {}",
                record.level().as_str().to_lowercase(),
                record.args()
            )
        })
        .init();
}
