//! CIF tokenizer.
//!
//! The scan state lives in an explicit [`TokenizerState`] and every scanning
//! routine is a free function that advances it. Tokens never copy text: each
//! one is a byte span into the source buffer plus an escape flag.
//!
//! Deliberate deviations from the CIF 1.1 grammar:
//!
//! - Only the keywords `data_`, `save_` and `loop_` are case-insensitive.
//! - The bare tokens `.` and `?` are ordinary values at this level.
//! - A backslash before a line break in a text field is kept as-is.

const TAB: u8 = b'\t';
const LF: u8 = b'\n';
const CR: u8 = b'\r';
const SPACE: u8 = b' ';

/// Classification of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// `data_NAME` block header.
    Data,
    /// `save_NAME` frame header, or the bare `save_` terminator.
    Save,
    /// The `loop_` keyword.
    Loop,
    /// A bare, quoted, or semicolon-delimited value.
    Value,
    /// A `_category.field` data name.
    ColumnName,
    /// A `#` comment running to the end of the line.
    Comment,
    /// End of input.
    End,
}

/// A classified span of the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Token classification.
    pub kind: TokenType,
    /// Byte offset of the first character (quotes already excluded).
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// Set for quoted and semicolon-delimited values.
    pub escaped: bool,
}

/// Mutable scan state shared by all tokenizer routines.
#[derive(Debug, Clone)]
pub struct TokenizerState<'a> {
    pub(crate) data: &'a str,
    pub(crate) position: usize,
    pub(crate) length: usize,
    pub(crate) line_number: usize,
    pub(crate) token_type: TokenType,
    pub(crate) token_start: usize,
    pub(crate) token_end: usize,
    pub(crate) is_escaped: bool,
}

impl<'a> TokenizerState<'a> {
    /// Create a tokenizer positioned before the first token of `data`.
    pub fn new(data: &'a str) -> Self {
        Self {
            data,
            position: 0,
            length: data.len(),
            line_number: 1,
            token_type: TokenType::End,
            token_start: 0,
            token_end: 0,
            is_escaped: false,
        }
    }

    /// The source buffer.
    pub fn data(&self) -> &'a str {
        self.data
    }

    /// Current byte offset of the scanner.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total length of the source buffer in bytes.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` for an empty source buffer.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// 1-based line number of the scanner.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The most recently classified token.
    pub fn token(&self) -> Token {
        Token {
            kind: self.token_type,
            start: self.token_start,
            end: self.token_end,
            escaped: self.is_escaped,
        }
    }

    /// Text of the current token.
    pub fn token_str(&self) -> &'a str {
        self.data.get(self.token_start..self.token_end).unwrap_or("")
    }

    #[inline]
    fn byte_at(&self, index: usize) -> Option<u8> {
        self.data.as_bytes().get(index).copied()
    }
}

impl<'a> Iterator for TokenizerState<'a> {
    type Item = Token;

    /// Yields non-comment tokens until [`TokenType::End`] (not included).
    fn next(&mut self) -> Option<Token> {
        move_next(self);
        match self.token_type {
            TokenType::End => None,
            _ => Some(self.token()),
        }
    }
}

/// Eat everything until whitespace or a line break.
pub fn eat_value(state: &mut TokenizerState<'_>) {
    let bytes = state.data.as_bytes();
    while state.position < state.length {
        match bytes[state.position] {
            TAB | LF | CR | SPACE => break,
            _ => state.position += 1,
        }
    }
    state.token_end = state.position;
}

/// Eat a value quoted with `quote`, starting at the opening quote.
///
/// A quote only closes the value when followed by whitespace or end of input,
/// so `'a'b'` reads as `a'b`. A value still open at a line break ends there
/// and keeps its opening quote, unescaped.
pub fn eat_escaped(state: &mut TokenizerState<'_>, quote: u8) {
    let bytes = state.data.as_bytes();
    state.position += 1;
    while state.position < state.length {
        let c = bytes[state.position];
        if c == quote {
            match state.byte_at(state.position + 1) {
                None | Some(TAB | LF | CR | SPACE) => {
                    state.token_start += 1;
                    state.token_end = state.position;
                    state.is_escaped = true;
                    state.position += 1;
                    return;
                }
                Some(_) => state.position += 1,
            }
        } else if c == LF || c == CR {
            state.token_end = state.position;
            return;
        } else {
            state.position += 1;
        }
    }
    state.token_end = state.position;
}

/// Eat a semicolon text field, starting at the `;` that opens a line.
///
/// The field closes at the next `;` that begins a line. The value excludes
/// both semicolons and any line breaks right before the closing one. Every
/// line crossed is counted. An unterminated field consumes the rest of the
/// input and yields an empty, unescaped value.
pub fn eat_multiline(state: &mut TokenizerState<'_>) {
    let bytes = state.data.as_bytes();
    let mut prev = b';';
    let mut pos = state.position + 1;
    while pos < state.length {
        let c = bytes[pos];
        if c == b';' && (prev == LF || prev == CR) {
            state.position = pos + 1;
            state.token_start += 1;

            let mut end = pos;
            while end > state.token_start && matches!(bytes[end - 1], LF | CR) {
                end -= 1;
            }
            state.token_end = end;
            state.is_escaped = true;
            return;
        }
        if c == CR || (c == LF && prev != CR) {
            state.line_number += 1;
        }
        prev = c;
        pos += 1;
    }

    state.position = pos;
    state.token_end = state.token_start;
}

/// Skip to the end of a comment line, leaving the line break in place.
pub fn skip_comment_line(state: &mut TokenizerState<'_>) {
    let bytes = state.data.as_bytes();
    while state.position < state.length {
        if matches!(bytes[state.position], LF | CR) {
            return;
        }
        state.position += 1;
    }
}

/// Skip spaces, tabs and line breaks, counting lines.
///
/// `\r\n` counts as one line break. Returns the last whitespace byte seen, or
/// `\n` if there was none, so callers can tell whether the next token begins
/// a line.
pub fn skip_whitespace(state: &mut TokenizerState<'_>) -> u8 {
    let bytes = state.data.as_bytes();
    let mut prev = LF;
    while state.position < state.length {
        let c = bytes[state.position];
        match c {
            TAB | SPACE => {}
            LF => {
                if prev != CR {
                    state.line_number += 1;
                }
            }
            CR => state.line_number += 1,
            _ => return prev,
        }
        prev = c;
        state.position += 1;
    }
    prev
}

/// Case-insensitive match of the first four bytes of the current token.
fn is_keyword(state: &TokenizerState<'_>, keyword: &[u8; 4]) -> bool {
    state.data.as_bytes()[state.token_start..state.token_start + 4].eq_ignore_ascii_case(keyword)
}

fn classify_bare(state: &TokenizerState<'_>) -> TokenType {
    let bytes = state.data.as_bytes();
    if bytes[state.token_start] == b'_' {
        return TokenType::ColumnName;
    }
    let len = state.token_end - state.token_start;
    if len < 5 || bytes[state.token_start + 4] != b'_' {
        return TokenType::Value;
    }
    if is_keyword(state, b"data") {
        TokenType::Data
    } else if is_keyword(state, b"save") {
        TokenType::Save
    } else if len == 5 && is_keyword(state, b"loop") {
        TokenType::Loop
    } else {
        TokenType::Value
    }
}

/// Scan and classify the next token, comments included.
pub fn move_next_internal(state: &mut TokenizerState<'_>) {
    let prev = skip_whitespace(state);

    if state.position >= state.length {
        state.token_type = TokenType::End;
        state.token_start = state.length;
        state.token_end = state.length;
        state.is_escaped = false;
        return;
    }

    state.token_start = state.position;
    state.token_end = state.position;
    state.is_escaped = false;

    let c = state.data.as_bytes()[state.position];
    state.token_type = match c {
        b'#' => {
            skip_comment_line(state);
            TokenType::Comment
        }
        b'"' | b'\'' => {
            eat_escaped(state, c);
            TokenType::Value
        }
        b';' => {
            if prev == LF || prev == CR {
                eat_multiline(state);
            } else {
                eat_value(state);
            }
            TokenType::Value
        }
        _ => {
            eat_value(state);
            classify_bare(state)
        }
    };
}

/// Move to the next token, skipping comments.
pub fn move_next(state: &mut TokenizerState<'_>) {
    move_next_internal(state);
    while state.token_type == TokenType::Comment {
        move_next_internal(state);
    }
}

/// Byte offset of the first `.` in the current token, or its end if none.
pub(crate) fn namespace_end(state: &TokenizerState<'_>) -> usize {
    state.data.as_bytes()[state.token_start..state.token_end]
        .iter()
        .position(|&b| b == b'.')
        .map_or(state.token_end, |i| state.token_start + i)
}

/// Whether the current token is `data[start..end]` or starts with it followed by `.`.
pub(crate) fn is_namespace(state: &TokenizerState<'_>, start: usize, end: usize) -> bool {
    let bytes = state.data.as_bytes();
    let ns = &bytes[start..end];
    let token = &bytes[state.token_start..state.token_end];
    if token.len() < ns.len() || &token[..ns.len()] != ns {
        return false;
    }
    token.len() == ns.len() || token[ns.len()] == b'.'
}
