//! Declaration-shape walker.
//!
//! Walks the significant tokens of one file member by member. Every token is
//! routed to exactly one of two hashers:
//!
//! - **declaration**: namespace and type headers, member signatures, accessor
//!   keywords, field and property initialisers, enum bodies, `using`
//!   directives, anything the walker does not recognise
//! - **body**: method/constructor/operator/accessor blocks and expression
//!   bodies (`=> expr;`)
//!
//! The walker never fails. Unbalanced braces close at end of file, stray
//! closing braces are hashed as declaration shape.
//!
//! Preprocessor lines are trivia to the lexer but not to the walker: each
//! directive other than `#region`/`#endregion` is hashed as declaration
//! shape together with the number of significant tokens before it, so
//! flipping `#if DEBUG` to `#if !DEBUG` or moving an `#endif` changes the
//! declaration hash.
//!
//! # Member Classification
//!
//! A member header runs up to the first `;`, `{`, `=>` or `}` at paren and
//! bracket depth 0. A `=` at depth 0 switches to initializer mode, where the
//! header runs to the next `;` regardless of braces or arrows.
//!
//! | Header contains                 | Terminator | Treatment                 |
//! |---------------------------------|------------|---------------------------|
//! | `namespace N`                   | `{` / `;`  | scope push, walk members  |
//! | `class`/`struct`/`record`/...   | `{`        | record type, walk members |
//! | `enum E`                        | `{`        | whole body is declaration |
//! | `(` at depth 0                  | `{`        | block body                |
//! | no `(`                          | `{`        | accessor list             |
//! | anything                        | `=>`       | expression body           |
//! | anything                        | `;`        | declaration               |

use std::hash::Hasher;

use rustc_hash::FxHasher;
use weave_ir::TypeName;
use weave_lexer_core::{tokenize, RawTag, Token};

/// Kind of a declared type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Record,
    Enum,
}

impl TypeKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "class" => Some(TypeKind::Class),
            "struct" => Some(TypeKind::Struct),
            "interface" => Some(TypeKind::Interface),
            "record" => Some(TypeKind::Record),
            "enum" => Some(TypeKind::Enum),
            _ => None,
        }
    }
}

/// One type declaration found in a file.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct DeclaredType {
    /// Fully-qualified name, generic arity appended as `` `N ``.
    pub name: TypeName,
    pub kind: TypeKind,
    /// Declared with the `partial` modifier.
    pub is_partial: bool,
}

/// Structural facts collected while walking a file.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct FileShape {
    /// Types in declaration order, nested types after their container.
    pub types: Vec<DeclaredType>,
    /// Imported namespaces (`using` targets, aliases resolved to their target).
    pub usings: Vec<String>,
    /// Attribute names as written (last segment of a qualified name).
    pub attributes: Vec<String>,
}

/// Output of one walk.
#[derive(Clone, Debug)]
pub(crate) struct WalkOutput {
    pub declaration_hash: u64,
    pub body_hash: u64,
    pub shape: FileShape,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Terminator {
    Semicolon,
    OpenBrace,
    FatArrow,
    CloseBrace,
    Eof,
}

/// Header token range `[start, end)`; `end` indexes the terminator.
#[derive(Copy, Clone, Debug)]
struct Header {
    start: usize,
    end: usize,
    term: Terminator,
    has_initializer: bool,
}

impl Header {
    fn new(start: usize, end: usize, term: Terminator, has_initializer: bool) -> Self {
        Header {
            start,
            end,
            term,
            has_initializer,
        }
    }

    fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

enum HeaderKind {
    Namespace(Vec<String>),
    Type {
        kind: TypeKind,
        name: String,
        is_partial: bool,
    },
}

#[derive(Copy, Clone)]
enum Sink {
    Declaration,
    Body,
}

pub(crate) struct ShapeWalker<'src> {
    src: &'src str,
    tokens: Vec<Token>,
    pos: usize,
    declaration: FxHasher,
    body: FxHasher,
    /// Enclosing namespace segments and type names.
    scope: Vec<String>,
    shape: FileShape,
}

impl<'src> ShapeWalker<'src> {
    pub(crate) fn walk(src: &'src str) -> WalkOutput {
        let mut tokens = tokenize(src);
        let mut declaration = FxHasher::default();
        hash_directives(src, &tokens, &mut declaration);
        tokens.retain(|t| !t.tag.is_trivia());

        let mut walker = ShapeWalker {
            src,
            tokens,
            pos: 0,
            declaration,
            body: FxHasher::default(),
            scope: Vec::new(),
            shape: FileShape::default(),
        };
        walker.walk_members(false);
        WalkOutput {
            declaration_hash: walker.declaration.finish(),
            body_hash: walker.body.finish(),
            shape: walker.shape,
        }
    }

    // ─── Token access ────────────────────────────────────────────

    fn tag_at(&self, index: usize) -> Option<RawTag> {
        self.tokens.get(index).map(|t| t.tag)
    }

    fn text_at(&self, index: usize) -> &'src str {
        self.tokens.get(index).map_or("", |t| t.span.text(self.src))
    }

    fn is_ident_at(&self, index: usize) -> bool {
        self.tag_at(index) == Some(RawTag::Ident)
    }

    fn hash_range(&mut self, start: usize, end: usize, sink: Sink) {
        for index in start..end.min(self.tokens.len()) {
            self.hash_token(index, sink);
        }
    }

    fn hash_token(&mut self, index: usize, sink: Sink) {
        let Some(&token) = self.tokens.get(index) else {
            return;
        };
        let text = token.span.text(self.src);
        let hasher = match sink {
            Sink::Declaration => &mut self.declaration,
            Sink::Body => &mut self.body,
        };
        hasher.write_u8(token.tag.code());
        hasher.write(text.as_bytes());
        hasher.write_u8(0xff);
    }

    /// Hash the current token and advance.
    fn bump(&mut self, sink: Sink) {
        self.hash_token(self.pos, sink);
        self.pos += 1;
    }

    // ─── Members ─────────────────────────────────────────────────

    /// Walk members until the closing brace of the current block (consumed)
    /// or EOF. At file level stray closing braces are hashed and skipped.
    fn walk_members(&mut self, nested: bool) {
        while let Some(tag) = self.tag_at(self.pos) {
            if tag == RawTag::CloseBrace {
                self.bump(Sink::Declaration);
                if nested {
                    return;
                }
                continue;
            }
            self.walk_member();
        }
    }

    fn walk_member(&mut self) {
        let header = self.scan_header(self.pos);
        let attrs_end = self.collect_attributes(header.start, header.end);
        self.hash_range(header.start, header.end, Sink::Declaration);
        self.pos = header.end;
        self.record_using(attrs_end, header);

        if header.has_initializer {
            if header.term == Terminator::Semicolon {
                self.bump(Sink::Declaration);
            }
            return;
        }

        match self.classify_header(attrs_end, header.end) {
            Some(HeaderKind::Namespace(segments)) => self.walk_namespace(header, segments),
            Some(HeaderKind::Type {
                kind,
                name,
                is_partial,
            }) => self.walk_type(header, kind, name, is_partial),
            None => self.walk_plain_member(header),
        }
    }

    fn walk_namespace(&mut self, header: Header, segments: Vec<String>) {
        match header.term {
            Terminator::OpenBrace => {
                self.bump(Sink::Declaration);
                let depth = self.scope.len();
                self.scope.extend(segments);
                self.walk_members(true);
                self.scope.truncate(depth);
            }
            Terminator::Semicolon => {
                // File-scoped namespace: applies to the rest of the file.
                self.bump(Sink::Declaration);
                self.scope.extend(segments);
            }
            Terminator::FatArrow | Terminator::CloseBrace | Terminator::Eof => {}
        }
    }

    fn walk_type(&mut self, header: Header, kind: TypeKind, name: String, is_partial: bool) {
        let full_name = if self.scope.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", self.scope.join("."), name)
        };
        self.shape.types.push(DeclaredType {
            name: TypeName::from(full_name),
            kind,
            is_partial,
        });

        match header.term {
            Terminator::OpenBrace if kind == TypeKind::Enum => {
                self.skip_block(Sink::Declaration);
            }
            Terminator::OpenBrace => {
                self.bump(Sink::Declaration);
                self.scope.push(name);
                self.walk_members(true);
                self.scope.pop();
            }
            Terminator::Semicolon => self.bump(Sink::Declaration),
            Terminator::FatArrow => {
                self.bump(Sink::Declaration);
                self.skip_expression(Sink::Body);
            }
            Terminator::CloseBrace | Terminator::Eof => {}
        }
    }

    fn walk_plain_member(&mut self, header: Header) {
        match header.term {
            Terminator::Semicolon => self.bump(Sink::Declaration),
            Terminator::OpenBrace if header.is_empty() => self.skip_block(Sink::Declaration),
            Terminator::OpenBrace if self.has_top_level_paren(header.start, header.end) => {
                self.skip_block(Sink::Body);
            }
            Terminator::OpenBrace => self.walk_accessors(),
            Terminator::FatArrow => {
                self.bump(Sink::Declaration);
                self.skip_expression(Sink::Body);
            }
            Terminator::CloseBrace | Terminator::Eof => {}
        }
    }

    /// Accessor list of a property, indexer or event. The cursor sits on `{`.
    fn walk_accessors(&mut self) {
        self.bump(Sink::Declaration);
        loop {
            let header = self.scan_header(self.pos);
            self.collect_attributes(header.start, header.end);
            self.hash_range(header.start, header.end, Sink::Declaration);
            self.pos = header.end;
            match header.term {
                Terminator::Semicolon => self.bump(Sink::Declaration),
                Terminator::OpenBrace => self.skip_block(Sink::Body),
                Terminator::FatArrow => {
                    self.bump(Sink::Declaration);
                    self.skip_expression(Sink::Body);
                }
                Terminator::CloseBrace => {
                    self.bump(Sink::Declaration);
                    break;
                }
                Terminator::Eof => return,
            }
        }

        // `int P { get; } = 1;`
        if self.tag_at(self.pos) == Some(RawTag::Eq) {
            let header = self.scan_header(self.pos);
            self.hash_range(header.start, header.end, Sink::Declaration);
            self.pos = header.end;
            if header.term == Terminator::Semicolon {
                self.bump(Sink::Declaration);
            }
        }
    }

    // ─── Scanning helpers ────────────────────────────────────────

    fn scan_header(&self, start: usize) -> Header {
        let mut depth = 0usize;
        let mut brace_depth = 0usize;
        let mut has_initializer = false;
        let mut index = start;
        while let Some(tag) = self.tag_at(index) {
            match tag {
                RawTag::OpenParen | RawTag::OpenBracket => depth += 1,
                RawTag::CloseParen | RawTag::CloseBracket => depth = depth.saturating_sub(1),
                RawTag::Eq if depth == 0 && brace_depth == 0 => has_initializer = true,
                RawTag::OpenBrace if has_initializer => brace_depth += 1,
                RawTag::CloseBrace if has_initializer && brace_depth > 0 => brace_depth -= 1,
                RawTag::Semicolon if depth == 0 && brace_depth == 0 => {
                    return Header::new(start, index, Terminator::Semicolon, has_initializer);
                }
                RawTag::CloseBrace if depth == 0 => {
                    return Header::new(start, index, Terminator::CloseBrace, has_initializer);
                }
                RawTag::OpenBrace if depth == 0 => {
                    return Header::new(start, index, Terminator::OpenBrace, false);
                }
                RawTag::FatArrow if depth == 0 && !has_initializer => {
                    return Header::new(start, index, Terminator::FatArrow, false);
                }
                _ => {}
            }
            index += 1;
        }
        Header::new(start, index, Terminator::Eof, has_initializer)
    }

    /// Skip a brace-balanced block starting at `{`, hashing every token.
    fn skip_block(&mut self, sink: Sink) {
        let mut depth = 0usize;
        while let Some(tag) = self.tag_at(self.pos) {
            match tag {
                RawTag::OpenBrace => depth += 1,
                RawTag::CloseBrace => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump(sink);
            if depth == 0 {
                return;
            }
        }
    }

    /// Skip an expression body up to and including its `;`.
    ///
    /// Stops before a `}` that closes the enclosing block.
    fn skip_expression(&mut self, sink: Sink) {
        let mut depth = 0usize;
        while let Some(tag) = self.tag_at(self.pos) {
            match tag {
                RawTag::OpenBrace | RawTag::OpenParen | RawTag::OpenBracket => depth += 1,
                RawTag::CloseBrace if depth == 0 => return,
                RawTag::CloseBrace | RawTag::CloseParen | RawTag::CloseBracket => {
                    depth = depth.saturating_sub(1);
                }
                RawTag::Semicolon if depth == 0 => {
                    self.bump(sink);
                    return;
                }
                _ => {}
            }
            self.bump(sink);
        }
    }

    fn has_top_level_paren(&self, start: usize, end: usize) -> bool {
        let mut depth = 0usize;
        for index in start..end {
            match self.tag_at(index) {
                Some(RawTag::OpenParen) if depth == 0 => return true,
                Some(RawTag::OpenBracket) => depth += 1,
                Some(RawTag::CloseBracket) => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        false
    }

    /// Find the namespace or type keyword of a header, if any.
    ///
    /// Only keywords before the first top-level `(` count, so a method's
    /// `where T : class` constraint is not mistaken for a type declaration.
    fn classify_header(&self, start: usize, end: usize) -> Option<HeaderKind> {
        let mut depth = 0usize;
        for index in start..end {
            match self.tag_at(index)? {
                RawTag::OpenParen if depth == 0 => return None,
                RawTag::OpenParen | RawTag::OpenBracket => depth += 1,
                RawTag::CloseParen | RawTag::CloseBracket => depth = depth.saturating_sub(1),
                RawTag::Ident if depth == 0 => {
                    let word = self.text_at(index);
                    if word == "delegate" {
                        return None;
                    }
                    if word == "namespace" {
                        let (segments, _) = self.dotted_name(index + 1, end);
                        return Some(HeaderKind::Namespace(segments));
                    }
                    if let Some(kind) = TypeKind::from_keyword(word) {
                        let mut name_index = index + 1;
                        if kind == TypeKind::Record
                            && matches!(self.text_at(name_index), "class" | "struct")
                        {
                            name_index += 1;
                        }
                        if name_index >= end || !self.is_ident_at(name_index) {
                            return None;
                        }
                        let is_partial = (start..index).any(|i| {
                            self.tag_at(i) == Some(RawTag::Ident) && self.text_at(i) == "partial"
                        });
                        let arity = self.generic_arity(name_index + 1, end);
                        let base = self.text_at(name_index);
                        let name = if arity == 0 {
                            base.to_string()
                        } else {
                            format!("{base}`{arity}")
                        };
                        return Some(HeaderKind::Type {
                            kind,
                            name,
                            is_partial,
                        });
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Number of type parameters in a `<...>` list starting at `index`.
    fn generic_arity(&self, index: usize, end: usize) -> usize {
        if self.tag_at(index) != Some(RawTag::Lt) {
            return 0;
        }
        let mut depth = 0usize;
        let mut commas = 0usize;
        for i in index..end {
            match self.tag_at(i) {
                Some(RawTag::Lt) => depth += 1,
                Some(RawTag::Gt) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return commas + 1;
                    }
                }
                Some(RawTag::Comma) if depth == 1 => commas += 1,
                _ => {}
            }
        }
        commas + 1
    }

    /// Read `A.B.C` (or `global::A.B`) starting at `index`.
    ///
    /// Returns the segments and the index after the name.
    fn dotted_name(&self, mut index: usize, end: usize) -> (Vec<String>, usize) {
        let mut segments = Vec::new();
        while index < end && self.is_ident_at(index) {
            let word = self.text_at(index);
            let separator = self.tag_at(index + 1);
            let is_alias_qualifier =
                separator == Some(RawTag::Operator) && self.text_at(index + 1) == "::";
            if !is_alias_qualifier {
                segments.push(word.to_string());
            }
            if index + 1 < end && (separator == Some(RawTag::Dot) || is_alias_qualifier) {
                index += 2;
            } else {
                index += 1;
                break;
            }
        }
        (segments, index)
    }

    /// Record a `using` directive's target namespace.
    fn record_using(&mut self, start: usize, header: Header) {
        if header.term != Terminator::Semicolon {
            return;
        }
        let mut index = start;
        if self.text_at(index) == "global" && self.is_ident_at(index) {
            index += 1;
        }
        if !(self.is_ident_at(index) && self.text_at(index) == "using") {
            return;
        }
        index += 1;
        if self.text_at(index) == "static" {
            index += 1;
        }
        if self.is_ident_at(index) && self.tag_at(index + 1) == Some(RawTag::Eq) {
            index += 2;
        }
        let (segments, _) = self.dotted_name(index, header.end);
        if !segments.is_empty() {
            self.shape.usings.push(segments.join("."));
        }
    }

    /// Parse leading `[...]` attribute lists. Returns the index after them.
    fn collect_attributes(&mut self, start: usize, end: usize) -> usize {
        let mut index = start;
        while index < end && self.tag_at(index) == Some(RawTag::OpenBracket) {
            let close = self.matching_bracket(index, end);
            self.parse_attribute_list(index + 1, close);
            index = close + 1;
        }
        index.min(end)
    }

    fn matching_bracket(&self, open: usize, end: usize) -> usize {
        let mut depth = 0usize;
        for index in open..end {
            match self.tag_at(index) {
                Some(RawTag::OpenBracket) => depth += 1,
                Some(RawTag::CloseBracket) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return index;
                    }
                }
                _ => {}
            }
        }
        end
    }

    /// `[target: A, B(args), global::N.C]`: records `A`, `B`, `C`.
    fn parse_attribute_list(&mut self, start: usize, end: usize) {
        let mut index = start;
        if self.is_ident_at(index) && self.tag_at(index + 1) == Some(RawTag::Colon) {
            index += 2;
        }
        let mut expect_name = true;
        let mut depth = 0usize;
        while index < end {
            match self.tag_at(index) {
                Some(RawTag::Ident) if expect_name && depth == 0 => {
                    let (segments, next) = self.dotted_name(index, end);
                    if let Some(last) = segments.last() {
                        self.shape.attributes.push(last.clone());
                    }
                    expect_name = false;
                    index = next;
                    continue;
                }
                Some(RawTag::OpenParen | RawTag::OpenBracket) => depth += 1,
                Some(RawTag::CloseParen | RawTag::CloseBracket) => {
                    depth = depth.saturating_sub(1);
                }
                Some(RawTag::Comma) if depth == 0 => expect_name = true,
                _ => {}
            }
            index += 1;
        }
    }
}

/// Hash every directive that can change what compiles, keyed by its
/// position among the significant tokens. Directive words are hashed
/// without their spacing or trailing comment.
fn hash_directives(src: &str, tokens: &[Token], hasher: &mut FxHasher) {
    let mut significant = 0usize;
    for token in tokens {
        if token.tag != RawTag::Directive {
            if !token.tag.is_trivia() {
                significant += 1;
            }
            continue;
        }
        let text = token.span.text(src);
        let text = text.split_once("//").map_or(text, |(code, _)| code);
        let text = text.trim_start().trim_start_matches('#');
        let mut words = text.split_whitespace().peekable();
        if matches!(words.peek(), Some(&("region" | "endregion"))) {
            continue;
        }
        hasher.write_u8(RawTag::Directive.code());
        hasher.write_usize(significant);
        for word in words {
            hasher.write(word.as_bytes());
            hasher.write_u8(0xff);
        }
        hasher.write_u8(0xfe);
    }
}

#[cfg(test)]
mod tests;
