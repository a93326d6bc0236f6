//! Recursive-descent declaration parser.
//!
//! Understands the declaration-level subset of C++ that annotated headers
//! use. Function bodies, initialisers and template declarations are
//! skipped by brace matching. A declaration that cannot be parsed becomes
//! an [`CursorKind::Invalid`] node and the parser resynchronises at the
//! next `;` or closing brace.

mod decl;
mod types;

use refl_ir::Span;
use rustc_hash::FxHashMap;

use crate::lexer::{LineIndex, Token, TokenKind};
use crate::model::{Cursor, CursorKind, Diagnostic, Severity};

/// Parse failure inside one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ParseError {
    pub message: String,
    pub span: Span,
}

pub(crate) type PResult<T> = Result<T, ParseError>;

/// Parser over a preprocessed token stream.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    index: &'a LineIndex,
    diagnostics: Vec<Diagnostic>,
    /// Enum constants seen so far, for initialisers that refer to them.
    enum_constants: FxHashMap<String, i64>,
    keep_free_declarations: bool,
}

impl<'a> Parser<'a> {
    /// `tokens` must end with an end-of-input token.
    pub fn new(tokens: &'a [Token], index: &'a LineIndex) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind == TokenKind::Eof),
            "token stream must end with Eof"
        );
        Parser {
            tokens,
            pos: 0,
            index,
            diagnostics: Vec::new(),
            enum_constants: FxHashMap::default(),
            keep_free_declarations: true,
        }
    }

    /// Drop namespace-scope functions and variables from the output.
    #[must_use]
    pub fn without_free_declarations(mut self) -> Self {
        self.keep_free_declarations = false;
        self
    }

    /// Seed enum constants known from a preamble.
    pub fn add_enum_constant(&mut self, name: impl Into<String>, value: i64) {
        self.enum_constants.insert(name.into(), value);
    }

    /// Parse the whole stream into top-level declarations.
    pub fn parse(mut self) -> (Vec<Cursor>, Vec<Diagnostic>) {
        let decls = self.scope(false);
        (decls, self.diagnostics)
    }

    // Token access

    #[inline]
    fn current(&self) -> &'a Token {
        self.peek(0)
    }

    /// Token `n` positions ahead, clamped to the end-of-input token.
    #[inline]
    fn peek(&self, n: usize) -> &'a Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    #[inline]
    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    #[inline]
    fn at_ident(&self, text: &str) -> bool {
        self.current().is_ident(text)
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Consume the current token. Never moves past end of input.
    fn bump(&mut self) -> &'a Token {
        let token = self.current();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, text: &str) -> bool {
        if self.at_ident(text) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            span: self.current().span,
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<&'a Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<&'a Token> {
        if self.at(TokenKind::Ident) && !is_reserved(&self.current().text) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> ParseError {
        let found = match self.current().kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", self.current().text),
        };
        self.error_here(format!("expected {what}, found {found}"))
    }

    fn location(&self, span: Span) -> refl_ir::SourceLocation {
        self.index.location(span)
    }

    fn diagnostic(&mut self, severity: Severity, span: Span, message: String) {
        let (line, column) = self.index.line_col(span.start);
        self.diagnostics.push(Diagnostic {
            severity,
            message,
            line,
            column,
        });
    }

    // Skipping

    /// Skip a bracketed group starting at the current opening token.
    ///
    /// Returns the tokens strictly inside the group.
    fn skip_group(&mut self) -> &'a [Token] {
        let (open, close) = match self.current().kind {
            TokenKind::LParen => (TokenKind::LParen, TokenKind::RParen),
            TokenKind::LBrace => (TokenKind::LBrace, TokenKind::RBrace),
            TokenKind::LBracket => (TokenKind::LBracket, TokenKind::RBracket),
            _ => return &[],
        };
        self.bump();
        let start = self.pos;
        let mut depth = 1usize;
        while !self.at_eof() {
            let kind = self.current().kind;
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
                if depth == 0 {
                    let inner = &self.tokens[start..self.pos];
                    self.bump();
                    return inner;
                }
            }
            self.bump();
        }
        &self.tokens[start..self.pos]
    }

    /// Skip a template argument or parameter list starting at `<`.
    fn skip_angles(&mut self) -> &'a [Token] {
        if !self.at(TokenKind::Lt) {
            return &[];
        }
        self.bump();
        let start = self.pos;
        let mut depth = 1usize;
        while !self.at_eof() {
            match self.current().kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::Shr => depth = depth.saturating_sub(2),
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    self.skip_group();
                    continue;
                }
                TokenKind::Semi | TokenKind::RBrace => break,
                _ => {}
            }
            if depth == 0 {
                let inner = &self.tokens[start..self.pos];
                self.bump();
                return inner;
            }
            self.bump();
        }
        &self.tokens[start..self.pos]
    }

    /// Skip the rest of a declaration: up to and including a `;` at depth
    /// zero, or through a brace-enclosed body (plus an optional `;`).
    /// Stops in front of an unmatched `}`.
    fn skip_declaration(&mut self) {
        loop {
            match self.current().kind {
                TokenKind::Eof | TokenKind::RBrace => return,
                TokenKind::Semi => {
                    self.bump();
                    return;
                }
                TokenKind::LBrace => {
                    self.skip_group();
                    self.eat(TokenKind::Semi);
                    return;
                }
                TokenKind::LParen | TokenKind::LBracket => {
                    self.skip_group();
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    /// Skip tokens of an expression up to (not including) a `,`, `;` or
    /// closing token at depth zero, or any kind in `stop`.
    fn skip_expression(&mut self, stop: &[TokenKind]) -> &'a [Token] {
        let start = self.pos;
        loop {
            let kind = self.current().kind;
            if stop.contains(&kind)
                || matches!(
                    kind,
                    TokenKind::Eof
                        | TokenKind::Comma
                        | TokenKind::Semi
                        | TokenKind::RParen
                        | TokenKind::RBrace
                        | TokenKind::RBracket
                )
            {
                break;
            }
            if matches!(
                kind,
                TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket
            ) {
                self.skip_group();
            } else {
                self.bump();
            }
        }
        &self.tokens[start..self.pos]
    }

    // Scopes

    /// Declarations up to end of input, or up to an unmatched `}` when
    /// `braced`.
    fn scope(&mut self, braced: bool) -> Vec<Cursor> {
        let mut decls = Vec::new();
        loop {
            if self.at_eof() {
                if braced {
                    let span = self.current().span;
                    self.diagnostic(Severity::Error, span, "expected '}'".to_string());
                }
                break;
            }
            if braced && self.at(TokenKind::RBrace) {
                break;
            }

            let start = self.pos;
            match self.namespace_item() {
                Ok(mut items) => decls.append(&mut items),
                Err(err) => decls.push(self.invalid(err)),
            }
            if self.pos == start {
                self.bump();
            }
        }
        decls
    }

    /// Record a parse error and resynchronise.
    fn invalid(&mut self, err: ParseError) -> Cursor {
        tracing::debug!(message = %err.message, "invalid declaration");
        self.diagnostic(Severity::Error, err.span, err.message);
        let cursor = Cursor::new(CursorKind::Invalid, "", self.location(err.span));
        self.skip_declaration();
        cursor
    }
}

/// Words that never name a type or a declaration.
fn is_reserved(word: &str) -> bool {
    matches!(
        word,
        "alignas"
            | "alignof"
            | "break"
            | "case"
            | "catch"
            | "class"
            | "const"
            | "constexpr"
            | "consteval"
            | "constinit"
            | "continue"
            | "default"
            | "delete"
            | "do"
            | "else"
            | "enum"
            | "explicit"
            | "extern"
            | "for"
            | "friend"
            | "goto"
            | "if"
            | "inline"
            | "mutable"
            | "namespace"
            | "new"
            | "noexcept"
            | "operator"
            | "private"
            | "protected"
            | "public"
            | "return"
            | "sizeof"
            | "static"
            | "static_assert"
            | "struct"
            | "switch"
            | "template"
            | "this"
            | "throw"
            | "try"
            | "typedef"
            | "typename"
            | "union"
            | "using"
            | "virtual"
            | "volatile"
            | "while"
    )
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
