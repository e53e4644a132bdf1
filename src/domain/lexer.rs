// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # SQL Tokenizer
//!
//! A single left-to-right pass that splits Oracle SQL text into tokens.
//!
//! The tokenizer is deliberately shallow: it only knows enough to tell
//! comments, string literals and quoted identifiers apart from the words the
//! qualifier cares about. It never fails. Unterminated comments and literals
//! simply run to the end of the input, and every byte of the input belongs to
//! exactly one token, so slicing the source by token offsets reproduces it.

/// What a token is, as far as the qualifier is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    /// `-- ...` up to (not including) the newline.
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `'...'`, `N'...'` or Oracle alternative quoting `q'[...]'`.
    StringLiteral,
    /// `"..."`
    QuotedIdent,
    /// Unquoted identifier or keyword.
    Word,
    Number,
    /// Any other single character (operators, `.`, `,`, parentheses...).
    Punct(char),
}

/// A token with byte offsets into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Returns the slice of `source` covered by this token.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Whitespace and comments carry no meaning for clause detection.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    /// True for anything that can name a table: a bare word or a quoted identifier.
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::QuotedIdent)
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'#'
}

fn skip_while(bytes: &[u8], mut pos: usize, pred: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && pred(bytes[pos]) {
        pos += 1;
    }
    pos
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// Scans a `'...'` literal starting at the opening quote. `''` is an escaped quote.
fn scan_string(bytes: &[u8], open: usize) -> usize {
    let mut pos = open + 1;
    while pos < bytes.len() {
        if bytes[pos] == b'\'' {
            if bytes.get(pos + 1) == Some(&b'\'') {
                pos += 2;
                continue;
            }
            return pos + 1;
        }
        pos += 1;
    }
    bytes.len()
}

/// Scans `q'<delim>...<close>'` starting at the `q`.
fn scan_q_quote(bytes: &[u8], q: usize) -> usize {
    let Some(&open) = bytes.get(q + 2) else {
        return bytes.len();
    };
    let close = match open {
        b'[' => b']',
        b'{' => b'}',
        b'(' => b')',
        b'<' => b'>',
        other => other,
    };
    match find_from(bytes, q + 3, &[close, b'\'']) {
        Some(i) => i + 2,
        None => bytes.len(),
    }
}

fn scan_quoted_ident(bytes: &[u8], open: usize) -> usize {
    let mut pos = open + 1;
    while pos < bytes.len() {
        if bytes[pos] == b'"' {
            if bytes.get(pos + 1) == Some(&b'"') {
                pos += 2;
                continue;
            }
            return pos + 1;
        }
        pos += 1;
    }
    bytes.len()
}

fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut pos = skip_while(bytes, start, |c| c.is_ascii_digit());
    if bytes.get(pos) == Some(&b'.') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
        pos = skip_while(bytes, pos + 1, |c| c.is_ascii_digit());
    }
    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            pos = skip_while(bytes, exp, |c| c.is_ascii_digit());
        }
    }
    pos
}

/// Splits `sql` into tokens covering every byte of the input.
pub fn tokenize(sql: &str) -> Vec<Token> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let next = bytes.get(pos + 1).copied();
        let kind = match bytes[pos] {
            b if b.is_ascii_whitespace() => {
                pos = skip_while(bytes, pos, |c| c.is_ascii_whitespace());
                TokenKind::Whitespace
            }
            b'-' if next == Some(b'-') => {
                pos = find_from(bytes, pos, b"\n").unwrap_or(bytes.len());
                TokenKind::LineComment
            }
            b'/' if next == Some(b'*') => {
                pos = find_from(bytes, pos + 2, b"*/").map_or(bytes.len(), |i| i + 2);
                TokenKind::BlockComment
            }
            b'\'' => {
                pos = scan_string(bytes, pos);
                TokenKind::StringLiteral
            }
            b'q' | b'Q' if next == Some(b'\'') => {
                pos = scan_q_quote(bytes, pos);
                TokenKind::StringLiteral
            }
            b'n' | b'N' if next == Some(b'\'') => {
                pos = scan_string(bytes, pos + 1);
                TokenKind::StringLiteral
            }
            b'"' => {
                pos = scan_quoted_ident(bytes, pos);
                TokenKind::QuotedIdent
            }
            b if is_ident_start(b) => {
                pos = skip_while(bytes, pos, is_ident_continue);
                TokenKind::Word
            }
            b if b.is_ascii_digit() => {
                pos = scan_number(bytes, pos);
                TokenKind::Number
            }
            _ => match sql[pos..].chars().next() {
                Some(ch) => {
                    pos += ch.len_utf8();
                    TokenKind::Punct(ch)
                }
                None => break,
            },
        };
        tokens.push(Token {
            kind,
            start,
            end: pos,
        });
    }

    tokens
}
