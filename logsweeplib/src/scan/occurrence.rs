//! Locating and classifying log-call occurrences in one file.
//!
//! A single left-to-right pass walks the file in code mode, stepping over
//! strings, templates, and regex literals with the balanced scanner. Comments
//! are inspected for commented-out calls. Each located call is classified as
//! active, line-commented, block-commented, or tagged-disabled.
//!
//! Active calls are only accepted in statement position: at the start of the
//! input, after `;`, `{` or `}`, or after a line break that can end the
//! previous statement. A call used as a value (`x = console.log(y)`, an arrow
//! body, an argument) or as the bare body of `if (...)`/`else` is reported as
//! skipped instead, since removing it would change the surrounding code.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::balance::{
    ident_end, is_ident_byte, match_call, skip_block_comment, skip_line_comment, skip_regex,
    skip_string, skip_template, CallMatch, Halt, REGEX_KEYWORDS,
};
use super::marker::{self, DISABLE_MARKER};
use super::Target;

/// Classification of a located call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    /// Live, uncommented call
    Active,
    /// Inside a `//` comment not written by this tool
    LineCommented,
    /// Inside a `/* */` comment
    BlockCommented,
    /// Disabled by this tool, carries [`DISABLE_MARKER`]
    TaggedDisabled,
}

/// One located call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    /// Byte range of the whole statement, including any comment marker
    pub span: Range<usize>,
    pub state: State,
    /// 1-based line of `span.start`
    pub line: usize,
}

/// Why a call was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The argument list has no confident closing delimiter
    Unbalanced,
    /// The call is part of a larger expression or a bare control-flow body
    NotStatement,
    /// Code follows the call on its last line, a line comment would swallow it
    UnsafeToDisable,
    /// Deleting the call would glue two characters into a comment delimiter
    UnsafeJoin,
}

/// A call that was found but not transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedOccurrence {
    pub line: usize,
    pub offset: usize,
    pub reason: SkipReason,
}

/// Everything a scan found in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Occurrences in source order, non-overlapping
    pub occurrences: Vec<Occurrence>,
    /// Calls in code that could not be delimited or are not statements
    pub skipped: Vec<SkippedOccurrence>,
}

/// What the previous significant token was, for statement and regex decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    /// `;`, `{` or `}`
    Terminator,
    /// Any other punctuation, including `(` and `,`
    Operator,
    /// Identifier, literal, `)` or `]`
    Value,
    /// `return`, `typeof` and friends
    Keyword,
    /// `if (...)`, `else`, `do` and similar: what follows is their body
    ControlHeader,
}

const CONTROL_WORDS: &[&[u8]] = &[b"if", b"for", b"while", b"with", b"switch", b"catch"];
const BODY_WORDS: &[&[u8]] = &[b"else", b"do"];
const LABEL_WORDS: &[&[u8]] = &[b"case", b"default"];

/// Offsets of every line start, for turning byte offsets into line numbers.
#[derive(Debug)]
pub(crate) struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub(crate) fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    pub(crate) fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}

struct Scanner<'a> {
    text: &'a str,
    src: &'a [u8],
    target: &'a Target,
    lines: LineIndex,
    pos: usize,
    prev: Prev,
    line_break: bool,
    control_word: bool,
    case_label: bool,
    parens: Vec<bool>,
    result: ScanResult,
}

/// Scan one file's text for occurrences of `target`.
///
/// # Example
///
/// ```rust
/// use logsweeplib::scan::{scan, State, Target};
///
/// let source = "console.log(1);\n// console.log(2);\nconst s = \"console.log(3)\";\n";
/// let result = scan(source, &Target::default());
///
/// let states: Vec<State> = result.occurrences.iter().map(|o| o.state).collect();
/// assert_eq!(states, vec![State::Active, State::LineCommented]);
/// ```
pub fn scan(text: &str, target: &Target) -> ScanResult {
    if !text.contains(target.name()) {
        return ScanResult::default();
    }
    Scanner::new(text, target).run()
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, target: &'a Target) -> Self {
        Self {
            text,
            src: text.as_bytes(),
            target,
            lines: LineIndex::new(text),
            pos: 0,
            prev: Prev::Start,
            line_break: false,
            control_word: false,
            case_label: false,
            parens: Vec::new(),
            result: ScanResult::default(),
        }
    }

    fn run(mut self) -> ScanResult {
        let len = self.src.len();
        while self.pos < len {
            let b = self.src[self.pos];
            let next = self.src.get(self.pos + 1).copied();
            match b {
                b'\n' => {
                    self.line_break = true;
                    self.pos += 1;
                }
                _ if b.is_ascii_whitespace() => self.pos += 1,
                b'/' if next == Some(b'/') => self.line_comment(),
                b'/' if next == Some(b'*') => self.block_comment(),
                b'/' if self.regex_allowed() => match skip_regex(self.src, self.pos, len) {
                    Ok(end) => self.token(end, Prev::Value),
                    Err(_) => self.token(self.pos + 1, Prev::Operator),
                },
                b'\'' | b'"' => match skip_string(self.src, self.pos, len) {
                    Ok(end) => self.token(end, Prev::Value),
                    Err(_) => {
                        let end = skip_line_comment(self.src, self.pos, len);
                        self.token(end, Prev::Value);
                    }
                },
                b'`' => match skip_template(self.src, self.pos, len) {
                    Ok(end) => self.token(end, Prev::Value),
                    Err(Halt::Incomplete) => self.pos = len,
                    Err(Halt::Malformed) => self.token(self.pos + 1, Prev::Value),
                },
                b'(' => {
                    self.parens.push(self.control_word);
                    self.token(self.pos + 1, Prev::Operator);
                }
                b')' => {
                    let closes_header = self.parens.pop().unwrap_or(false);
                    let prev = if closes_header {
                        Prev::ControlHeader
                    } else {
                        Prev::Value
                    };
                    self.token(self.pos + 1, prev);
                }
                b';' | b'{' | b'}' => self.token(self.pos + 1, Prev::Terminator),
                b':' if self.case_label => self.token(self.pos + 1, Prev::Terminator),
                b']' => self.token(self.pos + 1, Prev::Value),
                _ if is_ident_byte(b) => self.word(),
                _ => self.token(self.pos + 1, Prev::Operator),
            }
        }
        self.result
    }

    fn token(&mut self, end: usize, prev: Prev) {
        self.pos = end;
        self.prev = prev;
        self.line_break = false;
        self.control_word = false;
        if prev == Prev::Terminator {
            self.case_label = false;
        }
    }

    fn regex_allowed(&self) -> bool {
        !matches!(self.prev, Prev::Value)
    }

    fn statement_position(&self) -> bool {
        match self.prev {
            Prev::Start | Prev::Terminator => true,
            Prev::Value | Prev::Keyword => self.line_break,
            Prev::Operator | Prev::ControlHeader => false,
        }
    }

    fn word(&mut self) {
        let start = self.pos;
        let len = self.src.len();

        match match_call(self.src, start, len, self.target.callee()) {
            CallMatch::Complete(end) => {
                let terminated = self.src[end - 1] == b';';
                if self.statement_position() && (terminated || !self.continues_after(end)) {
                    self.push(start..end, State::Active);
                } else {
                    self.skip(start, SkipReason::NotStatement);
                }
                let prev = if terminated {
                    Prev::Terminator
                } else {
                    Prev::Value
                };
                self.token(end, prev);
                return;
            }
            CallMatch::Unbalanced(_) => self.skip(start, SkipReason::Unbalanced),
            CallMatch::NotCall => {}
        }

        let end = ident_end(self.src, start, len);
        let word = &self.src[start..end];
        // A property name such as `p.catch` is never a keyword
        let member = self.src[..start]
            .iter()
            .rev()
            .find(|b| !b.is_ascii_whitespace())
            == Some(&b'.');
        if member {
            self.token(end, Prev::Value);
        } else if CONTROL_WORDS.contains(&word) {
            self.token(end, Prev::ControlHeader);
            self.control_word = true;
        } else if BODY_WORDS.contains(&word) {
            self.token(end, Prev::ControlHeader);
        } else if LABEL_WORDS.contains(&word) {
            self.token(end, Prev::Keyword);
            self.case_label = true;
        } else if REGEX_KEYWORDS.contains(&word) {
            self.token(end, Prev::Keyword);
        } else {
            self.token(end, Prev::Value);
        }
    }

    /// True when the expression carries on after a call ending at `end` with
    /// no `;`, making the call one operand of a larger statement.
    ///
    /// Across a line break only tokens that cannot start a new statement
    /// (operators, `(`, `[`, `.`, `in`) continue it.
    fn continues_after(&self, end: usize) -> bool {
        let src = self.src;
        let len = src.len();
        let mut pos = end;
        let mut line_break = false;
        while pos < len {
            match src[pos] {
                b'\n' => {
                    line_break = true;
                    pos += 1;
                }
                b if b.is_ascii_whitespace() => pos += 1,
                b'/' if src.get(pos + 1) == Some(&b'/') => pos = skip_line_comment(src, pos, len),
                b'/' if src.get(pos + 1) == Some(&b'*') => match skip_block_comment(src, pos, len) {
                    Ok(next) => {
                        line_break |= src[pos..next].contains(&b'\n');
                        pos = next;
                    }
                    Err(_) => return false,
                },
                _ => break,
            }
        }

        let Some(&b) = src.get(pos) else {
            return false;
        };
        let next = src.get(pos + 1).copied();
        match b {
            b';' | b'}' | b')' => false,
            b'+' | b'-' if next == Some(b) => !line_break,
            b'!' if next != Some(b'=') => !line_break,
            b'~' | b'{' | b'\'' | b'"' => !line_break,
            _ if is_ident_byte(b) => {
                let word = &src[pos..ident_end(src, pos, len)];
                word == b"in" || word == b"instanceof" || !line_break
            }
            _ => true,
        }
    }

    fn line_comment(&mut self) {
        let start = self.pos;
        let len = self.src.len();

        if self.text[start..].starts_with(DISABLE_MARKER) {
            if let CallMatch::Complete(end) =
                marker::match_tagged(self.src, start, self.target.callee())
            {
                self.push(start..end, State::TaggedDisabled);
                if self.src[start..end].contains(&b'\n') {
                    self.line_break = true;
                }
                // The rest of the last disabled line is still comment text
                // unless it opens another comment.
                let line_end = skip_line_comment(self.src, end, len);
                let rest = &self.src[end..line_end];
                let indent = marker::indent_width(rest);
                self.pos = if marker::is_blank(rest) || rest[indent..].starts_with(b"//") {
                    end
                } else {
                    line_end
                };
                return;
            }
        }

        let end = skip_line_comment(self.src, start, len);
        self.commented_line(start, end);
        self.pos = end;
    }

    fn commented_line(&mut self, start: usize, end: usize) {
        let body = &self.text[start + 2..end];
        let callee = self.target.callee();
        for (offset, _) in body.match_indices(self.target.name()) {
            let candidate = start + 2 + offset;
            if let CallMatch::Complete(_) = match_call(self.src, candidate, end, callee) {
                let line_end = if self.src[end - 1] == b'\r' {
                    end - 1
                } else {
                    end
                };
                self.push(start..line_end, State::LineCommented);
                return;
            }
        }
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        let len = self.src.len();
        match skip_block_comment(self.src, start, len) {
            Ok(end) => {
                if self.src[start..end].contains(&b'\n') {
                    self.line_break = true;
                }
                self.commented_block(start, end);
                self.pos = end;
            }
            Err(_) => self.pos = len,
        }
    }

    fn commented_block(&mut self, start: usize, end: usize) {
        let body_start = start + 2;
        let body_end = end - 2;
        let body = &self.text[body_start..body_end];
        let callee = self.target.callee();
        let mut cursor = body_start;

        for (offset, _) in body.match_indices(self.target.name()) {
            let candidate = body_start + offset;
            if candidate < cursor {
                continue;
            }
            if let CallMatch::Complete(call_end) =
                match_call(self.src, candidate, body_end, callee)
            {
                let whole_comment = body.trim_matches(|c: char| c.is_ascii_whitespace())
                    == &self.text[candidate..call_end];
                let span = if whole_comment {
                    start..end
                } else {
                    candidate..call_end
                };
                self.push(span, State::BlockCommented);
                cursor = call_end;
            }
        }
    }

    fn push(&mut self, span: Range<usize>, state: State) {
        let line = self.lines.line_of(span.start);
        self.result.occurrences.push(Occurrence { span, state, line });
    }

    fn skip(&mut self, offset: usize, reason: SkipReason) {
        let line = self.lines.line_of(offset);
        self.result.skipped.push(SkippedOccurrence {
            line,
            offset,
            reason,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_default(text: &str) -> ScanResult {
        scan(text, &Target::default())
    }

    fn states(text: &str) -> Vec<State> {
        scan_default(text)
            .occurrences
            .iter()
            .map(|o| o.state)
            .collect()
    }

    fn spans(text: &str) -> Vec<&str> {
        scan_default(text)
            .occurrences
            .iter()
            .map(|o| &text[o.span.clone()])
            .collect()
    }

    #[test]
    fn active_call_spans_statement() {
        let text = "  console.log(\"a\", f(1,2));\n";
        assert_eq!(spans(text), vec!["console.log(\"a\", f(1,2));"]);
        assert_eq!(states(text), vec![State::Active]);
    }

    #[test]
    fn template_with_paren_is_one_occurrence() {
        let text = "console.log(`template ${a + \"(\" } end`);\n";
        assert_eq!(spans(text), vec![text.trim_end()]);
    }

    #[test]
    fn line_comment_spans_to_end_of_line() {
        let text = "foo();\n// console.log(\"x\"); old\r\nbar();\n";
        assert_eq!(spans(text), vec!["// console.log(\"x\"); old"]);
        assert_eq!(states(text), vec![State::LineCommented]);
    }

    #[test]
    fn block_comment_holding_only_the_call() {
        let text = "/* console.log(x); */\n";
        assert_eq!(spans(text), vec!["/* console.log(x); */"]);
        assert_eq!(states(text), vec![State::BlockCommented]);
    }

    #[test]
    fn block_comment_with_other_text() {
        let text = "/*\n * debugging:\n * console.log(a)\n * console.log(b)\n */\n";
        assert_eq!(spans(text), vec!["console.log(a)", "console.log(b)"]);
        assert_eq!(
            states(text),
            vec![State::BlockCommented, State::BlockCommented]
        );
    }

    #[test]
    fn tagged_disabled_includes_marker() {
        let text = "    // logsweep:off console.log(x);\n";
        assert_eq!(spans(text), vec!["// logsweep:off console.log(x);"]);
        assert_eq!(states(text), vec![State::TaggedDisabled]);
    }

    #[test]
    fn tagged_chain_on_one_line() {
        let text = "// logsweep:off console.log(a); // logsweep:off console.log(b);\n";
        assert_eq!(
            states(text),
            vec![State::TaggedDisabled, State::TaggedDisabled]
        );
    }

    #[test]
    fn text_after_tagged_call_stays_comment() {
        let text = "// logsweep:off console.log(a); console.log(b);\n";
        assert_eq!(states(text), vec![State::TaggedDisabled]);
    }

    #[test]
    fn calls_inside_strings_are_ignored() {
        let text = "const a = \"console.log(1)\";\nconst b = 'console.log(2)';\nconst c = `console.log(3)`;\n";
        assert!(scan_default(text).occurrences.is_empty());
        assert!(scan_default(text).skipped.is_empty());
    }

    #[test]
    fn boundary_identifiers_never_match() {
        let text = "superconsole.log(x);\nconsole.logger(x);\nmyconsole.log(y);\n";
        let result = scan_default(text);
        assert!(result.occurrences.is_empty());
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn expression_position_is_skipped() {
        let text = "const x = console.log(1);\nfoo(console.log(2));\nconst f = () => console.log(3);\n";
        let result = scan_default(text);
        assert!(result.occurrences.is_empty());
        assert_eq!(result.skipped.len(), 3);
        assert!(result
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::NotStatement));
        assert_eq!(
            result.skipped.iter().map(|s| s.line).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn bare_control_flow_body_is_skipped() {
        let text = "if (debug)\n  console.log(x)\nelse\n  console.log(y)\n";
        let result = scan_default(text);
        assert!(result.occurrences.is_empty());
        assert_eq!(result.skipped.len(), 2);
    }

    #[test]
    fn statement_positions_are_accepted() {
        let text = "function f() { console.log(1); }\nfoo()\nconsole.log(2)\nif (x) {\n  console.log(3)\n}\n";
        assert_eq!(
            states(text),
            vec![State::Active, State::Active, State::Active]
        );
    }

    #[test]
    fn call_continued_on_same_line_is_skipped() {
        for text in [
            "console.log(\"a\"), process.exit(0);\n",
            "console.log(x) || fallback();\n",
            "console.log(x).then(done);\n",
            "console.log(x) /* why */ ? a() : b();\n",
        ] {
            let result = scan_default(text);
            assert!(result.occurrences.is_empty(), "{text:?}");
            assert_eq!(result.skipped.len(), 1, "{text:?}");
            assert_eq!(result.skipped[0].reason, SkipReason::NotStatement);
        }
    }

    #[test]
    fn call_continued_on_next_line_is_skipped() {
        let result = scan_default("console.log(x)\n  .then(done)\n");
        assert!(result.occurrences.is_empty());
        assert_eq!(result.skipped[0].reason, SkipReason::NotStatement);
    }

    #[test]
    fn next_statement_after_line_break_is_not_a_continuation() {
        let text = "console.log(a)\n!ready && init()\nconsole.log(b) // note\ncount++\nif (x) { console.log(c) }\n";
        assert_eq!(
            states(text),
            vec![State::Active, State::Active, State::Active]
        );
        assert!(scan_default(text).skipped.is_empty());
    }

    #[test]
    fn property_names_are_not_control_words() {
        let text = "p.catch(handle)\nconsole.log(\"done\")\nq.if(y)\nconsole.log(2)\n";
        assert_eq!(states(text), vec![State::Active, State::Active]);
        assert!(scan_default(text).skipped.is_empty());
    }

    #[test]
    fn switch_case_bodies_are_statements() {
        let text = "switch (x) {\n  case 1: console.log(1); break;\n  default:\n    console.log(2);\n}\n";
        assert_eq!(states(text), vec![State::Active, State::Active]);
        assert!(scan_default(text).skipped.is_empty());
    }

    #[test]
    fn unterminated_call_is_flagged() {
        let text = "foo();\nconsole.log(\"never closed";
        let result = scan_default(text);
        assert!(result.occurrences.is_empty());
        assert_eq!(result.skipped.len(), 1);
        assert_eq!(result.skipped[0].reason, SkipReason::Unbalanced);
        assert_eq!(result.skipped[0].line, 2);
    }

    #[test]
    fn regex_literal_does_not_hide_calls() {
        let text = "const re = /\"/;\nconsole.log(re);\n";
        assert_eq!(states(text), vec![State::Active]);
    }

    #[test]
    fn spans_are_increasing_and_disjoint() {
        let text = "console.log(1); console.log(2);\n/* console.log(3) */ // console.log(4)\n// logsweep:off console.log(5);\nconsole.log(\n  6\n);\n";
        let result = scan_default(text);
        assert_eq!(result.occurrences.len(), 6);
        for pair in result.occurrences.windows(2) {
            assert!(pair[0].span.end <= pair[1].span.start);
            assert!(pair[0].span.start < pair[1].span.start);
        }
    }

    #[test]
    fn custom_target() {
        let target = Target::new("console.debug").unwrap();
        let text = "console.log(1);\nconsole.debug(2);\n";
        let result = scan(text, &target);
        assert_eq!(result.occurrences.len(), 1);
        assert_eq!(result.occurrences[0].line, 2);
    }

    #[test]
    fn line_index_numbers_lines() {
        let index = LineIndex::new("a\nb\n\nc");
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(4), 3);
        assert_eq!(index.line_of(5), 4);
    }
}
