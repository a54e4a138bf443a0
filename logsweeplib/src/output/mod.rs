//! Output formatting: persist a report for other tools.
//!
//! The library only produces data. The CLI decides how to render it for a
//! terminal; this module covers the machine-readable exports.
//!
//! - **CSV**: per-extension counters plus a total row, see [`write_csv`]
//!
//! ## Example
//!
//! ```rust
//! use logsweeplib::output::write_csv;
//! use logsweeplib::Report;
//!
//! let mut buf = Vec::new();
//! write_csv(&Report::default(), &mut buf).unwrap();
//! assert!(String::from_utf8(buf).unwrap().starts_with("dimension,key,files"));
//! ```

pub mod csv;

pub use self::csv::{write_csv, write_csv_file, CSV_HEADER};
