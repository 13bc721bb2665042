//! Hand-written raw scanner producing `(RawTag, len)` pairs.
//!
//! The scanner operates on a [`Cursor`] and produces [`RawToken`] values with
//! zero heap allocation. It does not resolve keywords, validate escapes, or
//! parse numeric values; consumers look at the token text when they care.
//!
//! # Design
//!
//! Main dispatch covers all 256 byte values. Each arm calls a focused method
//! that advances the cursor and returns `RawToken { tag, len }`.
//!
//! String forms: regular `"..."`, verbatim `@"..."`, raw `"""..."""`,
//! interpolated `$"...{expr}..."` (and `$@`/`@$` verbatim variants). Holes
//! of interpolated strings are scanned with the full token dispatch, so
//! nested strings and braces inside a hole never end the outer literal early.

use crate::cursor::Cursor;
use crate::tag::{RawTag, RawToken};

/// Pure, allocation-free scanner.
///
/// Produces one token at a time. Error conditions are encoded as `RawTag`
/// variants, not as `Result::Err`.
pub struct RawScanner<'a> {
    cursor: Cursor<'a>,
    /// Only whitespace seen since the last newline. A `#` here starts a
    /// preprocessor directive.
    at_line_start: bool,
}

impl<'a> RawScanner<'a> {
    /// Create a new scanner from a cursor.
    pub fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            at_line_start: true,
        }
    }

    /// Produce the next raw token.
    ///
    /// Returns `RawTag::Eof` with `len == 0` when the source is exhausted.
    /// Subsequent calls after EOF continue to return `Eof`.
    pub fn next_token(&mut self) -> RawToken {
        let start = self.cursor.pos();
        let line_start = self.at_line_start;
        let token = match self.cursor.current() {
            0 => self.eof(start),
            b' ' | b'\t' | 0x0B | 0x0C => self.whitespace(start),
            b'\r' => self.carriage_return(start),
            b'\n' => self.single(start, RawTag::Newline),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | 0x80..=0xFF => self.identifier(start),
            b'0'..=b'9' => self.number(start),
            b'"' => self.quote(start),
            b'\'' => self.char_literal(start),
            b'@' => self.at_sign(start),
            b'$' => self.dollar(start),
            b'/' => self.slash_or_comment(start),
            b'#' if line_start => self.directive(start),
            b'{' => self.single(start, RawTag::OpenBrace),
            b'}' => self.single(start, RawTag::CloseBrace),
            b'(' => self.single(start, RawTag::OpenParen),
            b')' => self.single(start, RawTag::CloseParen),
            b'[' => self.single(start, RawTag::OpenBracket),
            b']' => self.single(start, RawTag::CloseBracket),
            b';' => self.single(start, RawTag::Semicolon),
            b',' => self.single(start, RawTag::Comma),
            b'.' => self.dot(start),
            b':' => self.colon(start),
            b'<' => self.less(start),
            b'>' => self.greater(start),
            b'=' => self.equal(start),
            b'?' => self.question(start),
            b'+' | b'-' | b'*' | b'%' | b'&' | b'|' | b'^' | b'!' | b'~' | b'#' | b'\\'
            | b'`' => self.operator(start),
            // Control characters (excluding \t, \n, \r, VT, FF) and DEL
            1..=8 | 14..=31 | 127 => self.single(start, RawTag::InvalidByte),
        };

        self.at_line_start = match token.tag {
            RawTag::Newline => true,
            RawTag::Whitespace | RawTag::BlockComment => line_start,
            _ => false,
        };
        token
    }

    #[inline]
    fn token(&self, start: u32, tag: RawTag) -> RawToken {
        RawToken {
            tag,
            len: self.cursor.pos() - start,
        }
    }

    /// Single-byte token: advance one byte and emit the given tag.
    #[inline]
    fn single(&mut self, start: u32, tag: RawTag) -> RawToken {
        self.cursor.advance();
        self.token(start, tag)
    }

    // ─── EOF ─────────────────────────────────────────────────────

    fn eof(&mut self, start: u32) -> RawToken {
        if self.cursor.is_eof() {
            RawToken {
                tag: RawTag::Eof,
                len: 0,
            }
        } else {
            self.single(start, RawTag::InteriorNull)
        }
    }

    // ─── Whitespace & Newlines ───────────────────────────────────

    fn whitespace(&mut self, start: u32) -> RawToken {
        self.cursor
            .eat_while(|b| matches!(b, b' ' | b'\t' | 0x0B | 0x0C));
        self.token(start, RawTag::Whitespace)
    }

    fn carriage_return(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume '\r'
        if self.cursor.current() == b'\n' {
            self.cursor.advance();
        }
        // Lone \r is a line terminator too.
        self.token(start, RawTag::Newline)
    }

    // ─── Comments & Directives ───────────────────────────────────

    fn slash_or_comment(&mut self, start: u32) -> RawToken {
        match self.cursor.peek() {
            b'/' => {
                self.cursor.eat_until_newline_or_eof();
                self.token(start, RawTag::LineComment)
            }
            b'*' => {
                self.cursor.advance_n(2);
                if self.cursor.eat_block_comment_body() {
                    self.token(start, RawTag::BlockComment)
                } else {
                    self.token(start, RawTag::UnterminatedComment)
                }
            }
            _ => self.operator(start),
        }
    }

    fn directive(&mut self, start: u32) -> RawToken {
        self.cursor.eat_until_newline_or_eof();
        self.token(start, RawTag::Directive)
    }

    // ─── Identifiers & Numbers ───────────────────────────────────

    fn identifier(&mut self, start: u32) -> RawToken {
        self.cursor.advance();
        self.cursor.eat_while(is_ident_continue);
        self.token(start, RawTag::Ident)
    }

    fn number(&mut self, start: u32) -> RawToken {
        let is_hex = self.cursor.current() == b'0' && matches!(self.cursor.peek(), b'x' | b'X');
        let mut last = 0u8;
        loop {
            let b = self.cursor.current();
            let accept = if b.is_ascii_alphanumeric() || b == b'_' {
                true
            } else if b == b'.' {
                self.cursor.peek().is_ascii_digit()
            } else if b == b'+' || b == b'-' {
                !is_hex && matches!(last, b'e' | b'E')
            } else {
                false
            };
            if !accept {
                break;
            }
            last = b;
            self.cursor.advance();
        }
        self.token(start, RawTag::Number)
    }

    // ─── Punctuation & Operators ─────────────────────────────────

    fn dot(&mut self, start: u32) -> RawToken {
        if self.cursor.peek() == b'.' {
            self.cursor.advance_n(2);
            self.token(start, RawTag::Operator)
        } else {
            self.single(start, RawTag::Dot)
        }
    }

    fn colon(&mut self, start: u32) -> RawToken {
        if self.cursor.peek() == b':' {
            self.cursor.advance_n(2);
            self.token(start, RawTag::Operator)
        } else {
            self.single(start, RawTag::Colon)
        }
    }

    fn less(&mut self, start: u32) -> RawToken {
        match self.cursor.peek() {
            b'=' => {
                self.cursor.advance_n(2);
                self.token(start, RawTag::Operator)
            }
            b'<' => {
                self.cursor.advance_n(2);
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                }
                self.token(start, RawTag::Operator)
            }
            _ => self.single(start, RawTag::Lt),
        }
    }

    /// `>` is always a single token so nested generic closers (`>>`) split.
    fn greater(&mut self, start: u32) -> RawToken {
        if self.cursor.peek() == b'=' {
            self.cursor.advance_n(2);
            self.token(start, RawTag::Operator)
        } else {
            self.single(start, RawTag::Gt)
        }
    }

    fn equal(&mut self, start: u32) -> RawToken {
        match self.cursor.peek() {
            b'=' => {
                self.cursor.advance_n(2);
                self.token(start, RawTag::Operator)
            }
            b'>' => {
                self.cursor.advance_n(2);
                self.token(start, RawTag::FatArrow)
            }
            _ => self.single(start, RawTag::Eq),
        }
    }

    fn question(&mut self, start: u32) -> RawToken {
        match self.cursor.peek() {
            b'?' => {
                self.cursor.advance_n(2);
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                }
                self.token(start, RawTag::Operator)
            }
            b'.' => {
                self.cursor.advance_n(2);
                self.token(start, RawTag::Operator)
            }
            _ => self.single(start, RawTag::Question),
        }
    }

    /// Generic operator: one byte, an optional doubled byte (`++`, `&&`),
    /// `->`, and an optional trailing `=`.
    fn operator(&mut self, start: u32) -> RawToken {
        let first = self.cursor.current();
        self.cursor.advance();
        let next = self.cursor.current();
        if (matches!(first, b'+' | b'-' | b'&' | b'|') && next == first)
            || (first == b'-' && next == b'>')
        {
            self.cursor.advance();
        } else if next == b'=' && first != b'~' {
            self.cursor.advance();
        }
        self.token(start, RawTag::Operator)
    }

    // ─── String & Char Literals ──────────────────────────────────

    fn quote(&mut self, start: u32) -> RawToken {
        if self.cursor.peek() == b'"' && self.cursor.peek2() == b'"' {
            self.raw_string(start)
        } else {
            self.cursor.advance(); // consume opening '"'
            self.regular_string_body(start)
        }
    }

    fn regular_string_body(&mut self, start: u32) -> RawToken {
        loop {
            match self.cursor.current() {
                b'"' => {
                    self.cursor.advance();
                    return self.token(start, RawTag::String);
                }
                b'\\' => {
                    self.cursor.advance();
                    if !matches!(self.cursor.current(), b'\n' | b'\r') && !self.cursor.is_eof() {
                        self.cursor.advance_char();
                    }
                }
                b'\n' | b'\r' => return self.token(start, RawTag::UnterminatedString),
                0 if self.cursor.is_eof() => {
                    return self.token(start, RawTag::UnterminatedString);
                }
                _ => self.cursor.advance_char(),
            }
        }
    }

    /// Body of `@"..."`; the cursor sits after the opening quote.
    fn verbatim_string_body(&mut self, start: u32) -> RawToken {
        loop {
            match self.cursor.current() {
                b'"' if self.cursor.peek() == b'"' => self.cursor.advance_n(2),
                b'"' => {
                    self.cursor.advance();
                    return self.token(start, RawTag::String);
                }
                0 if self.cursor.is_eof() => {
                    return self.token(start, RawTag::UnterminatedString);
                }
                _ => self.cursor.advance_char(),
            }
        }
    }

    /// `"""..."""` with any run of three or more quotes as delimiter.
    fn raw_string(&mut self, start: u32) -> RawToken {
        let open = self.eat_quote_run();
        loop {
            match self.cursor.current() {
                b'"' => {
                    if self.eat_quote_run() >= open {
                        return self.token(start, RawTag::String);
                    }
                }
                0 if self.cursor.is_eof() => {
                    return self.token(start, RawTag::UnterminatedString);
                }
                _ => self.cursor.advance_char(),
            }
        }
    }

    fn eat_quote_run(&mut self) -> u32 {
        let before = self.cursor.pos();
        self.cursor.eat_while(|b| b == b'"');
        self.cursor.pos() - before
    }

    /// Body of `$"..."` / `$@"..."`; the cursor sits after the opening quote.
    fn interpolated_string_body(&mut self, start: u32, verbatim: bool) -> RawToken {
        loop {
            match self.cursor.current() {
                b'"' if verbatim && self.cursor.peek() == b'"' => self.cursor.advance_n(2),
                b'"' => {
                    self.cursor.advance();
                    return self.token(start, RawTag::String);
                }
                b'\\' if !verbatim => {
                    self.cursor.advance();
                    if !self.cursor.is_eof() {
                        self.cursor.advance_char();
                    }
                }
                b'\n' | b'\r' if !verbatim => {
                    return self.token(start, RawTag::UnterminatedString);
                }
                b'{' if self.cursor.peek() == b'{' => self.cursor.advance_n(2),
                b'{' => {
                    self.cursor.advance();
                    if !self.interpolation_hole() {
                        return self.token(start, RawTag::UnterminatedString);
                    }
                }
                0 if self.cursor.is_eof() => {
                    return self.token(start, RawTag::UnterminatedString);
                }
                _ => self.cursor.advance_char(),
            }
        }
    }

    /// Scan an interpolation hole up to and including its closing `}`.
    ///
    /// Returns `false` if EOF is reached first.
    fn interpolation_hole(&mut self) -> bool {
        let mut depth = 1u32;
        loop {
            match self.cursor.current() {
                b'{' => {
                    depth += 1;
                    self.cursor.advance();
                }
                b'}' => {
                    self.cursor.advance();
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                _ => {
                    if self.next_token().tag == RawTag::Eof {
                        return false;
                    }
                }
            }
        }
    }

    fn at_sign(&mut self, start: u32) -> RawToken {
        match (self.cursor.peek(), self.cursor.peek2()) {
            (b'"', _) => {
                self.cursor.advance_n(2);
                self.verbatim_string_body(start)
            }
            (b'$', b'"') => {
                self.cursor.advance_n(3);
                self.interpolated_string_body(start, true)
            }
            (b, _) if is_ident_continue(b) => {
                // Verbatim identifier (`@class`).
                self.cursor.advance();
                self.identifier(start)
            }
            _ => self.single(start, RawTag::InvalidByte),
        }
    }

    fn dollar(&mut self, start: u32) -> RawToken {
        let mut probe = self.cursor;
        probe.eat_while(|b| b == b'$');
        let is_raw = probe.current() == b'"' && probe.peek() == b'"' && probe.peek2() == b'"';
        if is_raw {
            self.cursor = probe;
            return self.raw_string(start);
        }
        match (self.cursor.peek(), self.cursor.peek2()) {
            (b'"', _) => {
                self.cursor.advance_n(2);
                self.interpolated_string_body(start, false)
            }
            (b'@', b'"') => {
                self.cursor.advance_n(3);
                self.interpolated_string_body(start, true)
            }
            _ => self.single(start, RawTag::Operator),
        }
    }

    fn char_literal(&mut self, start: u32) -> RawToken {
        self.cursor.advance(); // consume opening '\''
        loop {
            match self.cursor.current() {
                b'\'' => {
                    self.cursor.advance();
                    return self.token(start, RawTag::Char);
                }
                b'\\' => {
                    self.cursor.advance();
                    if !matches!(self.cursor.current(), b'\n' | b'\r') && !self.cursor.is_eof() {
                        self.cursor.advance_char();
                    }
                }
                b'\n' | b'\r' => return self.token(start, RawTag::UnterminatedChar),
                0 if self.cursor.is_eof() => return self.token(start, RawTag::UnterminatedChar),
                _ => self.cursor.advance_char(),
            }
        }
    }
}

impl Iterator for RawScanner<'_> {
    type Item = RawToken;

    fn next(&mut self) -> Option<RawToken> {
        let tok = self.next_token();
        if tok.tag == RawTag::Eof {
            None
        } else {
            Some(tok)
        }
    }
}

/// 256-byte lookup table for identifier continuation bytes.
/// `true` for a-z, A-Z, 0-9, underscore, and every non-ASCII byte (so UTF-8
/// encoded identifiers stay in one token).
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static IS_IDENT_CONTINUE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0u16;
    while i < 256 {
        table[i as usize] = matches!(
            i as u8,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | 0x80..=0xFF
        );
        i += 1;
    }
    table
};

#[inline]
fn is_ident_continue(b: u8) -> bool {
    IS_IDENT_CONTINUE_TABLE[b as usize]
}
