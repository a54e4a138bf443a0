//! Balanced token scanning for call expressions.
//!
//! Given a candidate call site, the scanner walks forward through the argument
//! list tracking delimiter depth while stepping over string literals, template
//! literals (including nested `${ }` substitutions), regex literals, and
//! comments. A `)` inside any of those never closes the call.
//!
//! All positions are byte offsets. Every function takes an exclusive `limit`
//! so callers can confine a scan to a comment body or a single line.

/// Why a scan stopped without reaching its closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
    /// Input ran out before the construct was closed
    Incomplete,
    /// A delimiter closed out of order, or a quoted string hit a line break
    Malformed,
}

/// Result of skipping one lexical construct: the position just past it.
pub type Scan = std::result::Result<usize, Halt>;

/// Outcome of matching a call of the target at a candidate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMatch {
    /// The statement ends at this exclusive offset (after an optional `;`)
    Complete(usize),
    /// The candidate is not a call of the target
    NotCall,
    /// The argument list could not be delimited
    Unbalanced(Halt),
}

/// Keywords after which a `/` starts a regex literal rather than a division.
pub(crate) const REGEX_KEYWORDS: &[&[u8]] = &[
    b"return",
    b"typeof",
    b"instanceof",
    b"in",
    b"of",
    b"new",
    b"delete",
    b"void",
    b"throw",
    b"case",
    b"do",
    b"else",
    b"yield",
    b"await",
];

/// Identifier bytes. Non-ASCII bytes are treated as identifier characters so
/// a multi-byte name is never split.
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// End of the identifier (or number) run starting at `pos`.
pub fn ident_end(src: &[u8], mut pos: usize, limit: usize) -> usize {
    while pos < limit && is_ident_byte(src[pos]) {
        pos += 1;
    }
    pos
}

fn peek(src: &[u8], pos: usize, limit: usize) -> Option<u8> {
    if pos < limit {
        src.get(pos).copied()
    } else {
        None
    }
}

/// Match a call of `callee` starting exactly at `start`.
///
/// The callee must sit on word boundaries: not preceded by an identifier
/// character or a `.` (so `myconsole.log` and `window.console.log` are
/// rejected), and not followed by an identifier character (so
/// `console.logger` is rejected). After optional whitespace an opening `(`
/// must follow. A `;` directly after the closing `)` belongs to the statement.
///
/// # Example
///
/// ```rust
/// use logsweeplib::scan::balance::{match_call, CallMatch};
///
/// let src = br#"console.log("a", f(1, 2));"#;
/// assert_eq!(match_call(src, 0, src.len(), b"console.log"), CallMatch::Complete(src.len()));
/// ```
pub fn match_call(src: &[u8], start: usize, limit: usize, callee: &[u8]) -> CallMatch {
    let Some(candidate) = src.get(start..limit) else {
        return CallMatch::NotCall;
    };
    if !candidate.starts_with(callee) {
        return CallMatch::NotCall;
    }
    if start > 0 && (is_ident_byte(src[start - 1]) || src[start - 1] == b'.') {
        return CallMatch::NotCall;
    }

    let mut pos = start + callee.len();
    if peek(src, pos, limit).is_some_and(is_ident_byte) {
        return CallMatch::NotCall;
    }
    while pos < limit && src[pos].is_ascii_whitespace() {
        pos += 1;
    }
    match peek(src, pos, limit) {
        None => return CallMatch::Unbalanced(Halt::Incomplete),
        Some(b'(') => {}
        Some(_) => return CallMatch::NotCall,
    }

    match code_until(src, pos + 1, limit, b')') {
        Ok(close) => {
            let mut end = close + 1;
            if peek(src, end, limit) == Some(b';') {
                end += 1;
            }
            CallMatch::Complete(end)
        }
        Err(halt) => CallMatch::Unbalanced(halt),
    }
}

/// Scan code until `closer` appears at depth zero and return its position.
///
/// Parentheses, brackets, and braces must nest properly; a mismatched closer
/// is `Malformed`. Running into `limit` is `Incomplete`.
pub fn code_until(src: &[u8], mut pos: usize, limit: usize, closer: u8) -> Scan {
    let mut expected: Vec<u8> = Vec::new();
    let mut regex_ok = true;

    while pos < limit {
        let b = src[pos];
        match b {
            b'(' | b'[' | b'{' => {
                expected.push(closing(b));
                regex_ok = true;
                pos += 1;
            }
            b')' | b']' | b'}' => {
                match expected.pop() {
                    Some(want) if want == b => {}
                    Some(_) => return Err(Halt::Malformed),
                    None if b == closer => return Ok(pos),
                    None => return Err(Halt::Malformed),
                }
                regex_ok = b == b'}';
                pos += 1;
            }
            b'\'' | b'"' => {
                pos = skip_string(src, pos, limit)?;
                regex_ok = false;
            }
            b'`' => {
                pos = skip_template(src, pos, limit)?;
                regex_ok = false;
            }
            b'/' if peek(src, pos + 1, limit) == Some(b'/') => {
                pos = skip_line_comment(src, pos, limit);
            }
            b'/' if peek(src, pos + 1, limit) == Some(b'*') => {
                pos = skip_block_comment(src, pos, limit)?;
            }
            b'/' if regex_ok => {
                pos = skip_regex(src, pos, limit)?;
                regex_ok = false;
            }
            _ if is_ident_byte(b) => {
                let end = ident_end(src, pos, limit);
                regex_ok = REGEX_KEYWORDS.contains(&&src[pos..end]);
                pos = end;
            }
            _ if b.is_ascii_whitespace() => pos += 1,
            _ => {
                regex_ok = true;
                pos += 1;
            }
        }
    }

    Err(Halt::Incomplete)
}

fn closing(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        _ => b'}',
    }
}

/// Skip a `'` or `"` string starting at `pos`.
pub fn skip_string(src: &[u8], pos: usize, limit: usize) -> Scan {
    let quote = src[pos];
    let mut pos = pos + 1;
    while pos < limit {
        match src[pos] {
            b'\\' => pos += 2,
            b'\n' => return Err(Halt::Malformed),
            b if b == quote => return Ok(pos + 1),
            _ => pos += 1,
        }
    }
    Err(Halt::Incomplete)
}

/// Skip a template literal starting at the backtick at `pos`.
///
/// `${ ... }` substitutions are scanned as code, so strings, comments, and
/// nested templates inside them are honoured.
pub fn skip_template(src: &[u8], pos: usize, limit: usize) -> Scan {
    let mut pos = pos + 1;
    while pos < limit {
        match src[pos] {
            b'\\' => pos += 2,
            b'`' => return Ok(pos + 1),
            b'$' if peek(src, pos + 1, limit) == Some(b'{') => {
                pos = code_until(src, pos + 2, limit, b'}')? + 1;
            }
            _ => pos += 1,
        }
    }
    Err(Halt::Incomplete)
}

/// Skip a `//` comment; returns the position of the terminating newline
/// (which is not consumed) or `limit`.
pub fn skip_line_comment(src: &[u8], pos: usize, limit: usize) -> usize {
    src[pos..limit]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(limit, |offset| pos + offset)
}

/// Skip a `/* */` comment starting at `pos`.
pub fn skip_block_comment(src: &[u8], pos: usize, limit: usize) -> Scan {
    let body = pos + 2;
    if body > limit {
        return Err(Halt::Incomplete);
    }
    src[body..limit]
        .windows(2)
        .position(|w| w == b"*/")
        .map(|offset| body + offset + 2)
        .ok_or(Halt::Incomplete)
}

/// Skip a regex literal starting at the `/` at `pos`, including its flags.
pub fn skip_regex(src: &[u8], pos: usize, limit: usize) -> Scan {
    let mut pos = pos + 1;
    let mut in_class = false;
    while pos < limit {
        match src[pos] {
            b'\\' => pos += 2,
            b'\n' => return Err(Halt::Malformed),
            b'[' => {
                in_class = true;
                pos += 1;
            }
            b']' => {
                in_class = false;
                pos += 1;
            }
            b'/' if !in_class => return Ok(ident_end(src, pos + 1, limit)),
            _ => pos += 1,
        }
    }
    Err(Halt::Incomplete)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALLEE: &[u8] = b"console.log";

    fn call(src: &str) -> CallMatch {
        match_call(src.as_bytes(), 0, src.len(), CALLEE)
    }

    fn call_end(src: &str) -> usize {
        match call(src) {
            CallMatch::Complete(end) => end,
            other => panic!("expected a complete call in {src:?}, got {other:?}"),
        }
    }

    #[test]
    fn simple_call_with_semicolon() {
        let src = "console.log(x);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn semicolon_is_optional() {
        assert_eq!(call_end("console.log(x)\nfoo()"), 14);
    }

    #[test]
    fn semicolon_must_follow_immediately() {
        assert_eq!(call_end("console.log(x) ;"), 14);
    }

    #[test]
    fn nested_calls_and_commas() {
        let src = r#"console.log("a", f(1,2));"#;
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn object_and_array_arguments() {
        let src = "console.log({ a: [1, (2)], b: { c: 3 } });";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn paren_inside_strings_does_not_close() {
        let src = r#"console.log(")", '(', "\")");"#;
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn template_with_substitution_containing_paren_string() {
        let src = r#"console.log(`template ${a + "(" } end`);"#;
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn nested_template_in_substitution() {
        let src = "console.log(`outer ${`inner ${f(`)`)}`} done`);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn line_comment_inside_arguments() {
        let src = "console.log(a, // close ) here\n  b);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn line_comment_inside_substitution() {
        let src = "console.log(`${a // )\n}`);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn block_comment_inside_arguments() {
        let src = "console.log(a /* ) */, b);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn regex_literal_argument() {
        let src = r"console.log(/\(/.test(s), /[)]/g);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn division_is_not_a_regex() {
        let src = "console.log(a / b, (c) / 2);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn escaped_backslash_ends_string() {
        let src = r#"console.log("\\", ")");"#;
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn whitespace_before_paren() {
        let src = "console.log (x);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn multi_line_call() {
        let src = "console.log(\n  a,\n  b\n);";
        assert_eq!(call_end(src), src.len());
    }

    #[test]
    fn longer_identifiers_are_not_calls() {
        assert_eq!(call("console.logger(x);"), CallMatch::NotCall);
        let src = "superconsole.log(x);";
        assert_eq!(
            match_call(src.as_bytes(), 5, src.len(), CALLEE),
            CallMatch::NotCall
        );
    }

    #[test]
    fn other_receiver_is_not_a_call() {
        let src = "window.console.log(x);";
        assert_eq!(
            match_call(src.as_bytes(), 7, src.len(), CALLEE),
            CallMatch::NotCall
        );
    }

    #[test]
    fn reference_without_call() {
        assert_eq!(call("console.log;"), CallMatch::NotCall);
        assert_eq!(call("console.log?.(x);"), CallMatch::NotCall);
    }

    #[test]
    fn unterminated_string_at_end_of_file() {
        assert_eq!(
            call("console.log(\"abc"),
            CallMatch::Unbalanced(Halt::Incomplete)
        );
    }

    #[test]
    fn string_broken_by_newline() {
        assert_eq!(
            call("console.log(\"abc\n);"),
            CallMatch::Unbalanced(Halt::Malformed)
        );
    }

    #[test]
    fn mismatched_delimiters() {
        assert_eq!(
            call("console.log([1, 2);"),
            CallMatch::Unbalanced(Halt::Malformed)
        );
    }

    #[test]
    fn limit_confines_the_scan() {
        let src = "console.log(a */ )";
        assert_eq!(
            match_call(src.as_bytes(), 0, 14, CALLEE),
            CallMatch::Unbalanced(Halt::Incomplete)
        );
    }

    #[test]
    fn skip_block_comment_finds_close() {
        let src = b"/* a ) b */x";
        assert_eq!(skip_block_comment(src, 0, src.len()), Ok(11));
        assert_eq!(
            skip_block_comment(b"/* open", 0, 7),
            Err(Halt::Incomplete)
        );
    }

    #[test]
    fn skip_line_comment_stops_at_newline() {
        let src = b"// x\ny";
        assert_eq!(skip_line_comment(src, 0, src.len()), 4);
        assert_eq!(skip_line_comment(b"// x", 0, 4), 4);
    }
}
