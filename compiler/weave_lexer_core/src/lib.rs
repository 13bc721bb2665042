//! Weave Lexer Core - Trivia-Aware Tokenizer
//!
//! Splits C-family source text into `(RawTag, len)` pairs without allocating
//! per token. Trivia (whitespace, newlines, comments, preprocessor lines) is
//! kept as tokens of its own so callers can either skip it or reproduce the
//! source exactly.
//!
//! # Architecture
//!
//! ```text
//! &str ──► Cursor ──► RawScanner ──► RawToken { tag, len }
//!                                        │
//!                          tokenize() ──►  Vec<Token { tag, span }>
//! ```
//!
//! The scanner never fails: malformed input produces error tags
//! (`UnterminatedString`, `InvalidByte`, ...) and scanning continues.

mod cursor;
mod raw_scanner;
mod tag;
mod token;

pub use cursor::Cursor;
pub use raw_scanner::RawScanner;
pub use tag::{RawTag, RawToken};
pub use token::{significant_tokens, tokenize, Span, Token};
