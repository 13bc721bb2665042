//! Positioned tokens.

use std::fmt;

use crate::cursor::Cursor;
use crate::raw_scanner::RawScanner;
use crate::tag::RawTag;

/// Byte range `[start, end)` in the source.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Length in bytes.
    #[inline]
    pub const fn len(self) -> u32 {
        self.end - self.start
    }

    /// `true` for zero-length spans.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// Source text covered by this span (`""` if out of range).
    pub fn text(self, source: &str) -> &str {
        source.get(self.start as usize..self.end as usize).unwrap_or("")
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A token with its position.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub tag: RawTag,
    pub span: Span,
}

impl Token {
    /// Source text of this token.
    #[inline]
    pub fn text(self, source: &str) -> &str {
        self.span.text(source)
    }

    /// `true` if this is an identifier spelled exactly `word`.
    #[inline]
    pub fn is_word(self, source: &str, word: &str) -> bool {
        self.tag == RawTag::Ident && self.text(source) == word
    }
}

/// Tokenize a source string, trivia included, `Eof` excluded.
///
/// Token spans tile the source: concatenating every token's text yields the
/// input again.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut scanner = RawScanner::new(Cursor::new(source));
    let mut tokens = Vec::new();
    let mut pos = 0u32;
    loop {
        let raw = scanner.next_token();
        if raw.tag == RawTag::Eof {
            break;
        }
        tokens.push(Token {
            tag: raw.tag,
            span: Span::new(pos, pos + raw.len),
        });
        pos += raw.len;
    }
    tokens
}

/// Tokenize and drop trivia.
pub fn significant_tokens(source: &str) -> Vec<Token> {
    let mut tokens = tokenize(source);
    tokens.retain(|t| !t.tag.is_trivia());
    tokens
}
