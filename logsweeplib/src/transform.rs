//! Applying one mode to the occurrences of a single file.
//!
//! The new text is built in one left-to-right pass over gap and occurrence
//! segments. Bytes outside occurrence spans are copied unchanged, except for
//! the whitespace and line break of a line that a deletion leaves empty.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SweepError;
use crate::scan::marker::{self, indent_width, is_blank};
use crate::scan::{scan, Occurrence, ScanResult, SkipReason, SkippedOccurrence, State, Target};

/// The single transformation applied during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Comment out active calls with the disable marker
    Disable,
    /// Strip the disable marker from tool-disabled calls
    Restore,
    /// Delete every occurrence regardless of state
    DeleteAll,
    /// Delete active calls only
    DeleteActive,
    /// Delete hand-commented calls only
    DeleteCommented,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Disable,
        Mode::Restore,
        Mode::DeleteAll,
        Mode::DeleteActive,
        Mode::DeleteCommented,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Disable => "disable",
            Mode::Restore => "restore",
            Mode::DeleteAll => "delete-all",
            Mode::DeleteActive => "delete-active",
            Mode::DeleteCommented => "delete-commented",
        }
    }

    /// What this mode does to an occurrence in `state`.
    pub fn action(self, state: State) -> Action {
        use State::*;
        match (self, state) {
            (Mode::Disable, Active) => Action::Comment,
            (Mode::Restore, TaggedDisabled) => Action::Uncomment,
            (Mode::DeleteAll, _) => Action::Delete,
            (Mode::DeleteActive, Active) => Action::Delete,
            (Mode::DeleteCommented, LineCommented | BlockCommented) => Action::Delete,
            _ => Action::Keep,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disable" => Ok(Mode::Disable),
            "restore" => Ok(Mode::Restore),
            "delete-all" => Ok(Mode::DeleteAll),
            "delete-active" | "delete-active-only" => Ok(Mode::DeleteActive),
            "delete-commented" | "delete-commented-only" => Ok(Mode::DeleteCommented),
            other => Err(SweepError::InvalidMode(other.to_string())),
        }
    }
}

/// Per-occurrence edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Keep,
    Comment,
    Uncomment,
    Delete,
}

/// Output of transforming one file's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    pub text: String,
    /// Occurrences actually rewritten
    pub changed: usize,
    /// Calls left untouched, from scanning and from this transform, by offset
    pub skipped: Vec<SkippedOccurrence>,
}

/// Scan `text` for `target` and apply `mode`.
///
/// # Example
///
/// ```rust
/// use logsweeplib::{transform_source, Mode, Target};
///
/// let out = transform_source("console.log(1);\n", Mode::Disable, &Target::default());
/// assert_eq!(out.text, "// logsweep:off console.log(1);\n");
/// assert_eq!(out.changed, 1);
/// ```
pub fn transform_source(text: &str, mode: Mode, target: &Target) -> Transformed {
    let found = scan(text, target);
    apply(text, &found, mode)
}

/// Apply `mode` to already scanned occurrences of `text`.
pub fn apply(text: &str, found: &ScanResult, mode: Mode) -> Transformed {
    let (actions, mut skipped) = plan(text, &found.occurrences, mode);
    skipped.extend(found.skipped.iter().copied());

    let mut editor = Editor::new(text);
    for (occurrence, action) in found.occurrences.iter().zip(actions) {
        let span = occurrence.span.clone();
        match action {
            Action::Keep => {}
            Action::Comment => editor.replace(span.clone(), &marker::wrap(&text[span])),
            Action::Uncomment => editor.replace(span.clone(), &marker::unwrap(&text[span])),
            Action::Delete => {
                if !editor.delete(span.clone()) {
                    skipped.push(SkippedOccurrence {
                        line: occurrence.line,
                        offset: span.start,
                        reason: SkipReason::UnsafeJoin,
                    });
                }
            }
        }
    }

    skipped.sort_by_key(|s| s.offset);
    let changed = editor.changed;
    Transformed {
        text: editor.finish(),
        changed,
        skipped,
    }
}

/// Decide each occurrence's action.
///
/// Commenting a call turns the rest of its last line into comment text, so a
/// disable is only planned when that rest is blank, is already a line
/// comment, or is the next call being disabled. The check runs right to left
/// so a chain of calls on one line is decided from its end.
fn plan(
    text: &str,
    occurrences: &[Occurrence],
    mode: Mode,
) -> (Vec<Action>, Vec<SkippedOccurrence>) {
    let src = text.as_bytes();
    let mut actions: Vec<Action> = occurrences.iter().map(|o| mode.action(o.state)).collect();
    let mut skipped = Vec::new();

    for index in (0..occurrences.len()).rev() {
        if actions[index] != Action::Comment {
            continue;
        }
        let end = occurrences[index].span.end;
        let tail = &src[end..line_end(src, end)];
        let next_code = end + indent_width(tail);
        let safe = is_blank(tail)
            || src[next_code..].starts_with(b"//")
            || occurrences.get(index + 1).is_some_and(|next| {
                next.span.start == next_code && actions[index + 1] == Action::Comment
            });
        if !safe {
            actions[index] = Action::Keep;
            skipped.push(SkippedOccurrence {
                line: occurrences[index].line,
                offset: occurrences[index].span.start,
                reason: SkipReason::UnsafeToDisable,
            });
        }
    }

    (actions, skipped)
}

/// Position of the `\n` ending the line containing `from`, or the text length.
fn line_end(src: &[u8], from: usize) -> usize {
    src[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(src.len(), |offset| from + offset)
}

fn is_horizontal_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Builds the output text from gaps and edited occurrences.
struct Editor<'a> {
    text: &'a str,
    out: String,
    cursor: usize,
    changed: usize,
    /// Output offsets where a deletion removed a whole line
    sites: Vec<usize>,
}

impl<'a> Editor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            out: String::with_capacity(text.len()),
            cursor: 0,
            changed: 0,
            sites: Vec::new(),
        }
    }

    fn replace(&mut self, span: Range<usize>, replacement: &str) {
        self.out.push_str(&self.text[self.cursor..span.start]);
        self.out.push_str(replacement);
        self.cursor = span.end;
        self.changed += 1;
    }

    /// Remove `span`, taking its line with it when nothing else is left on it.
    ///
    /// Returns false, leaving the output untouched, when the bytes on either
    /// side of the removed text would join into a comment delimiter.
    fn delete(&mut self, span: Range<usize>) -> bool {
        let src = self.text.as_bytes();
        let len = src.len();
        let out_mark = self.out.len();
        let cursor_mark = self.cursor;
        let sites_mark = self.sites.len();

        let end_of_line = line_end(src, span.end);
        let tail_blank = is_blank(&src[span.end..end_of_line]);

        let mut start = span.start;
        if tail_blank {
            while start > self.cursor && is_horizontal_space(src[start - 1]) {
                start -= 1;
            }
        }
        self.out.push_str(&self.text[self.cursor..start]);
        self.cursor = span.end;

        let line_start = self.out.rfind('\n').map_or(0, |i| i + 1);
        let line_blank = is_blank(self.out[line_start..].as_bytes());

        if line_blank && tail_blank {
            self.out.truncate(line_start);
            if end_of_line < len {
                self.cursor = end_of_line + 1;
            } else {
                self.cursor = len;
                if self.out.ends_with('\n') {
                    self.out.pop();
                    if self.out.ends_with('\r') {
                        self.out.pop();
                    }
                }
            }
            self.sites.push(self.out.len());
        } else if line_blank || tail_blank {
            while self.cursor < len && is_horizontal_space(src[self.cursor]) {
                self.cursor += 1;
            }
        }

        let joined = [
            self.out.as_bytes().last().copied(),
            src.get(self.cursor).copied(),
        ];
        if matches!(
            joined,
            [Some(b'/'), Some(b'/')] | [Some(b'/'), Some(b'*')] | [Some(b'*'), Some(b'/')]
        ) {
            self.out.truncate(out_mark);
            self.cursor = cursor_mark;
            self.sites.truncate(sites_mark);
            return false;
        }

        self.changed += 1;
        true
    }

    /// Copy the final gap and merge blank runs that met at deletion sites.
    ///
    /// When a removed line had blank lines both above and below it, the
    /// merged run is cut back to the longer of the two original runs. Blank
    /// lines that never touched a deletion are left alone.
    fn finish(mut self) -> String {
        self.out.push_str(&self.text[self.cursor..]);

        let mut sites = std::mem::take(&mut self.sites);
        sites.dedup();
        for &site in sites.iter().rev() {
            if site > self.out.len() {
                continue;
            }
            let above = blank_lines_above(&self.out, site);
            let below = blank_lines_below(&self.out, site);
            let surplus = above.len().min(below.len());
            if surplus > 0 {
                let remove_to = below[surplus - 1];
                self.out.replace_range(site..remove_to, "");
            }
        }
        self.out
    }
}

/// Start offsets of the blank lines directly above line start `site`,
/// nearest first.
fn blank_lines_above(out: &str, site: usize) -> Vec<usize> {
    let bytes = out.as_bytes();
    let mut starts = Vec::new();
    let mut pos = site;
    while pos > 0 && bytes[pos - 1] == b'\n' {
        let start = out[..pos - 1].rfind('\n').map_or(0, |i| i + 1);
        if !is_blank(&bytes[start..pos - 1]) {
            break;
        }
        starts.push(start);
        pos = start;
    }
    starts
}

/// End offsets (just past the newline) of the blank lines starting at `site`.
fn blank_lines_below(out: &str, site: usize) -> Vec<usize> {
    let bytes = out.as_bytes();
    let mut ends = Vec::new();
    let mut pos = site;
    while let Some(offset) = bytes[pos..].iter().position(|&b| b == b'\n') {
        if !is_blank(&bytes[pos..pos + offset]) {
            break;
        }
        pos += offset + 1;
        ends.push(pos);
    }
    ends
}
