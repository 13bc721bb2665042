//! Raw token tags.

/// Kind of a raw token.
///
/// Punctuation the declaration parser cares about gets its own tag; every
/// other operator is folded into [`RawTag::Operator`] and distinguished by
/// its text.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum RawTag {
    // Literals and names
    Ident,
    Number,
    String,
    Char,

    // Delimiters
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,

    // Punctuation
    Semicolon,
    Comma,
    Dot,
    Colon,
    Lt,
    Gt,
    Eq,
    Question,
    FatArrow,
    Operator,

    // Trivia
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
    Directive,

    // Errors
    UnterminatedString,
    UnterminatedChar,
    UnterminatedComment,
    InteriorNull,
    InvalidByte,

    Eof,
}

impl RawTag {
    /// `true` for tokens that carry no meaning: whitespace, newlines,
    /// comments and preprocessor lines.
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            RawTag::Whitespace
                | RawTag::Newline
                | RawTag::LineComment
                | RawTag::BlockComment
                | RawTag::UnterminatedComment
                | RawTag::Directive
        )
    }

    /// `true` for error tags.
    #[inline]
    pub fn is_error(self) -> bool {
        matches!(
            self,
            RawTag::UnterminatedString
                | RawTag::UnterminatedChar
                | RawTag::UnterminatedComment
                | RawTag::InteriorNull
                | RawTag::InvalidByte
        )
    }

    /// Stable one-byte code, used when hashing token streams.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name for diagnostics and debug dumps.
    pub fn name(self) -> &'static str {
        match self {
            RawTag::Ident => "identifier",
            RawTag::Number => "number",
            RawTag::String => "string",
            RawTag::Char => "char",
            RawTag::OpenBrace => "'{'",
            RawTag::CloseBrace => "'}'",
            RawTag::OpenParen => "'('",
            RawTag::CloseParen => "')'",
            RawTag::OpenBracket => "'['",
            RawTag::CloseBracket => "']'",
            RawTag::Semicolon => "';'",
            RawTag::Comma => "','",
            RawTag::Dot => "'.'",
            RawTag::Colon => "':'",
            RawTag::Lt => "'<'",
            RawTag::Gt => "'>'",
            RawTag::Eq => "'='",
            RawTag::Question => "'?'",
            RawTag::FatArrow => "'=>'",
            RawTag::Operator => "operator",
            RawTag::Whitespace => "whitespace",
            RawTag::Newline => "newline",
            RawTag::LineComment => "line comment",
            RawTag::BlockComment => "block comment",
            RawTag::Directive => "preprocessor directive",
            RawTag::UnterminatedString => "unterminated string",
            RawTag::UnterminatedChar => "unterminated char",
            RawTag::UnterminatedComment => "unterminated comment",
            RawTag::InteriorNull => "interior null",
            RawTag::InvalidByte => "invalid byte",
            RawTag::Eof => "end of file",
        }
    }
}

/// A raw token: tag plus byte length. Position is implicit in the scan.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RawToken {
    pub tag: RawTag,
    pub len: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivia_classification() {
        assert!(RawTag::Whitespace.is_trivia());
        assert!(RawTag::LineComment.is_trivia());
        assert!(RawTag::Directive.is_trivia());
        assert!(!RawTag::Ident.is_trivia());
        assert!(!RawTag::Eof.is_trivia());
    }

    #[test]
    fn codes_are_distinct() {
        assert_ne!(RawTag::Ident.code(), RawTag::Number.code());
        assert_ne!(RawTag::Lt.code(), RawTag::Gt.code());
    }

    #[test]
    fn error_tags() {
        assert!(RawTag::InvalidByte.is_error());
        assert!(!RawTag::String.is_error());
    }
}
