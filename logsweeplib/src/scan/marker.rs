//! The reserved disable marker.
//!
//! Disabling a call prefixes every non-blank line of the statement with
//! [`DISABLE_MARKER`]: the first line right before the callee, following lines
//! right after their indentation. Restoring removes exactly those bytes, so
//! `unwrap(wrap(text)) == text` for any input.
//!
//! The marker is itself a line comment, which is what makes the wrapped code
//! inert. Its fixed text is what separates tool-authored disables from a
//! developer's own `// console.log(...)`.

use super::balance::{match_call, CallMatch, Halt};

/// Literal prefix written in front of every disabled line.
pub const DISABLE_MARKER: &str = "// logsweep:off ";

/// True when every byte is ASCII whitespace (newlines included).
pub(crate) fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_whitespace)
}

/// Width of the leading run of spaces and tabs.
pub(crate) fn indent_width(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count()
}

/// Prefix each non-blank line of `statement` with the marker.
pub fn wrap(statement: &str) -> String {
    let mut out = String::with_capacity(statement.len() + DISABLE_MARKER.len());
    for (index, line) in statement.split_inclusive('\n').enumerate() {
        if index == 0 {
            out.push_str(DISABLE_MARKER);
            out.push_str(line);
            continue;
        }
        let indent = indent_width(line.as_bytes());
        if is_blank(line.as_bytes()) {
            out.push_str(line);
        } else {
            out.push_str(&line[..indent]);
            out.push_str(DISABLE_MARKER);
            out.push_str(&line[indent..]);
        }
    }
    out
}

/// Remove the marker from each line of a disabled statement.
pub fn unwrap(disabled: &str) -> String {
    let mut out = String::with_capacity(disabled.len());
    for (index, line) in disabled.split_inclusive('\n').enumerate() {
        if index == 0 {
            out.push_str(line.strip_prefix(DISABLE_MARKER).unwrap_or(line));
            continue;
        }
        let indent = indent_width(line.as_bytes());
        match line[indent..].strip_prefix(DISABLE_MARKER) {
            Some(rest) => {
                out.push_str(&line[..indent]);
                out.push_str(rest);
            }
            None => out.push_str(line),
        }
    }
    out
}

/// A run of unwrapped text and where it came from in the source.
#[derive(Debug, Clone, Copy)]
struct Segment {
    unwrapped: usize,
    original: usize,
}

/// Unwrapped view of marker-prefixed lines, grown one line at a time.
struct Unwrapped<'a> {
    src: &'a [u8],
    text: Vec<u8>,
    segments: Vec<Segment>,
    next_line: usize,
}

impl<'a> Unwrapped<'a> {
    fn new(src: &'a [u8], content_start: usize) -> Self {
        let mut view = Self {
            src,
            text: Vec::new(),
            segments: Vec::new(),
            next_line: content_start,
        };
        let end = view.line_end(content_start);
        view.push(content_start, end);
        view.next_line = end;
        view
    }

    fn line_end(&self, from: usize) -> usize {
        self.src[from..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.src.len(), |offset| from + offset + 1)
    }

    fn push(&mut self, start: usize, end: usize) {
        if start == end {
            return;
        }
        self.segments.push(Segment {
            unwrapped: self.text.len(),
            original: start,
        });
        self.text.extend_from_slice(&self.src[start..end]);
    }

    /// Append the next source line if it continues the disabled statement.
    fn extend(&mut self) -> bool {
        let start = self.next_line;
        if start >= self.src.len() {
            return false;
        }
        let end = self.line_end(start);
        let line = &self.src[start..end];
        let indent = indent_width(line);
        let marker = DISABLE_MARKER.as_bytes();

        if is_blank(line) {
            self.push(start, end);
        } else if line[indent..].starts_with(marker) {
            self.push(start, start + indent);
            self.push(start + indent + marker.len(), end);
        } else {
            return false;
        }
        self.next_line = end;
        true
    }

    /// Map an exclusive end offset in the unwrapped text back to the source.
    fn original_end(&self, end: usize) -> usize {
        let last = end - 1;
        self.segments
            .iter()
            .rev()
            .find(|segment| segment.unwrapped <= last)
            .map_or(end, |segment| segment.original + (last - segment.unwrapped) + 1)
    }
}

/// Match a tool-disabled call whose marker starts at `start`.
///
/// Continuation lines are accepted while they are blank or carry the marker
/// after their indentation. The returned end is a source offset.
pub(crate) fn match_tagged(src: &[u8], start: usize, callee: &[u8]) -> CallMatch {
    let marker = DISABLE_MARKER.as_bytes();
    if !src[start..].starts_with(marker) {
        return CallMatch::NotCall;
    }

    let mut view = Unwrapped::new(src, start + marker.len());
    loop {
        match match_call(&view.text, 0, view.text.len(), callee) {
            CallMatch::Complete(end) => return CallMatch::Complete(view.original_end(end)),
            CallMatch::Unbalanced(Halt::Incomplete) => {
                if !view.extend() {
                    return CallMatch::Unbalanced(Halt::Incomplete);
                }
            }
            other => return other,
        }
    }
}
