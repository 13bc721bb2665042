//! Byte cursor over source text.
//!
//! The cursor advances through the buffer byte-by-byte. Reads past the end
//! return `0x00`, so scanning loops terminate on the virtual sentinel without
//! their own bounds checks.
//!
//! # Interior Null Bytes
//!
//! A null at `pos < len` is an interior null (error token); a null at
//! `pos >= len` is EOF. Use [`Cursor::is_eof`] to tell them apart.

/// Cheap, copyable cursor over a source string.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: u32,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at position 0.
    ///
    /// Sources longer than `u32::MAX` bytes are truncated to that length.
    pub fn new(src: &'a str) -> Self {
        let src = if u32::try_from(src.len()).is_ok() {
            src
        } else {
            let mut end = u32::MAX as usize;
            while !src.is_char_boundary(end) {
                end -= 1;
            }
            &src[..end]
        };
        Cursor { src, pos: 0 }
    }

    /// Byte at the current position, or `0x00` past the end.
    #[inline]
    pub fn current(&self) -> u8 {
        self.byte_at(self.pos as usize)
    }

    /// Byte one position ahead of current.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.byte_at(self.pos as usize + 1)
    }

    /// Byte two positions ahead of current.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.byte_at(self.pos as usize + 2)
    }

    #[inline]
    fn byte_at(&self, index: usize) -> u8 {
        self.src.as_bytes().get(index).copied().unwrap_or(0)
    }

    /// Advance by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advance by `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// `true` once every source byte has been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos as usize >= self.src.len()
    }

    /// Current byte offset in the source.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Length of the source in bytes.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Cursor::new truncates sources to u32::MAX bytes"
    )]
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.src.len() as u32
    }

    /// Source text between two offsets.
    ///
    /// Offsets that do not fall on character boundaries yield `""`.
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        self.src.get(start as usize..end as usize).unwrap_or("")
    }

    /// Advance while `pred` returns `true` for the current byte.
    ///
    /// `pred(0)` must return `false` or the loop only stops at EOF.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Number of bytes in the UTF-8 character starting with `byte`.
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Advance past one full UTF-8 character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.pos = (self.pos + width).min(self.source_len());
    }

    /// Advance to the next `\n` byte, or to EOF if there is none.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offset < source_len which fits in u32"
    )]
    pub fn eat_until_newline_or_eof(&mut self) {
        let remaining = self.remaining();
        match memchr::memchr2(b'\n', b'\r', remaining) {
            Some(offset) => self.pos += offset as u32,
            None => self.pos = self.source_len(),
        }
    }

    /// Advance past the next `*/`, or to EOF. Returns `true` if the
    /// terminator was found.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "offsets are bounded by source_len which fits in u32"
    )]
    pub fn eat_block_comment_body(&mut self) -> bool {
        let remaining = self.remaining();
        for offset in memchr::memchr_iter(b'*', remaining) {
            if remaining.get(offset + 1) == Some(&b'/') {
                self.pos += offset as u32 + 2;
                return true;
            }
        }
        self.pos = self.source_len();
        false
    }

    fn remaining(&self) -> &'a [u8] {
        self.src.as_bytes().get(self.pos as usize..).unwrap_or(&[])
    }
}
