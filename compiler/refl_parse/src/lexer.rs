//! Logos-based C++ tokenizer.
//!
//! Comments and whitespace are skipped. Keywords are not distinguished from
//! identifiers here; the parser matches them by text.

use std::fmt;

use logos::Logos;
use refl_ir::{SourceLocation, Span};

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f\v]+")]
#[logos(skip r"//[^\n]*")]
enum RawToken {
    #[token("/*", block_comment)]
    BlockComment,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    #[regex(r"(0[xX][0-9a-fA-F']+|0[bB][01']+|[0-9][0-9']*)[uUlLzZ]*")]
    Int,

    #[regex(r"([0-9][0-9']*\.[0-9']*|\.[0-9][0-9']*)([eE][+-]?[0-9]+)?[fFlL]?")]
    #[regex(r"[0-9][0-9']*[eE][+-]?[0-9]+[fFlL]?")]
    Float,

    #[regex(r#"(u8|u|U|L)?"([^"\\\n]|\\.)*""#)]
    Str,

    #[regex(r"(u8|u|U|L)?'([^'\\\n]|\\.)+'")]
    Char,

    #[token("::")]
    ColonColon,
    #[token("->")]
    Arrow,
    #[token("...")]
    Ellipsis,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("%=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token("<<=")]
    #[token(">>=")]
    AssignOp,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("#")]
    Hash,
    #[token("##")]
    HashHash,
}

/// Skip to the closing `*/`; an unterminated comment is an error.
fn block_comment(lex: &mut logos::Lexer<'_, RawToken>) -> logos::FilterResult<(), ()> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::FilterResult::Skip
        }
        None => {
            lex.bump(lex.remainder().len());
            logos::FilterResult::Error(())
        }
    }
}

/// Token classification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Int,
    Float,
    Str,
    Char,
    ColonColon,
    Arrow,
    Ellipsis,
    AmpAmp,
    PipePipe,
    Shl,
    Shr,
    EqEq,
    NotEq,
    LtEq,
    GtEq,
    PlusPlus,
    MinusMinus,
    AssignOp,
    Lt,
    Gt,
    Eq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Question,
    Colon,
    Semi,
    Comma,
    Dot,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Hash,
    HashHash,
    /// Character sequence no rule matches.
    Unknown,
    Eof,
}

impl From<RawToken> for TokenKind {
    fn from(raw: RawToken) -> Self {
        match raw {
            // Always skipped or reported by its callback
            RawToken::BlockComment => TokenKind::Unknown,
            RawToken::Ident => TokenKind::Ident,
            RawToken::Int => TokenKind::Int,
            RawToken::Float => TokenKind::Float,
            RawToken::Str => TokenKind::Str,
            RawToken::Char => TokenKind::Char,
            RawToken::ColonColon => TokenKind::ColonColon,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            RawToken::Shl => TokenKind::Shl,
            RawToken::Shr => TokenKind::Shr,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::PlusPlus => TokenKind::PlusPlus,
            RawToken::MinusMinus => TokenKind::MinusMinus,
            RawToken::AssignOp => TokenKind::AssignOp,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Question => TokenKind::Question,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Semi => TokenKind::Semi,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Dot => TokenKind::Dot,
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::Hash => TokenKind::Hash,
            RawToken::HashHash => TokenKind::HashHash,
        }
    }
}

/// A lexed token with its own text.
///
/// Tokens produced by macro expansion carry the span of the macro use, so
/// their text cannot be sliced back out of the file.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: Box<str>,
    pub span: Span,
    /// Whitespace (or a comment) separated this token from the previous one.
    pub space_before: bool,
}

impl Token {
    /// End-of-input marker at `offset`.
    pub fn eof(offset: u32) -> Self {
        Token {
            kind: TokenKind::Eof,
            text: Box::from(""),
            span: Span::new(offset, offset),
            space_before: false,
        }
    }

    /// Identifier (or keyword) with exactly this spelling.
    #[inline]
    pub fn is_ident(&self, text: &str) -> bool {
        self.kind == TokenKind::Ident && &*self.text == text
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}) @ {:?}", self.kind, self.text, self.span)
    }
}

/// Literal the lexer could not close.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub offset: u32,
    pub what: &'static str,
}

/// Tokenize `source`, offsetting spans by `base`.
///
/// No end-of-input token is appended.
pub fn tokenize(source: &str, base: u32) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = RawToken::lexer(source);
    let mut prev_end = 0usize;

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let slice = lexer.slice();
        let space_before = range.start > prev_end;
        let kind = match result {
            Ok(raw) => TokenKind::from(raw),
            Err(()) => {
                let offset = base.saturating_add(u32::try_from(range.start).unwrap_or(u32::MAX));
                if slice.starts_with('"') || slice.ends_with('"') {
                    return Err(LexError {
                        offset,
                        what: "string",
                    });
                }
                if slice.starts_with("/*") {
                    return Err(LexError {
                        offset,
                        what: "comment",
                    });
                }
                if slice.starts_with('\'') {
                    return Err(LexError {
                        offset,
                        what: "character",
                    });
                }
                TokenKind::Unknown
            }
        };
        let span = Span::from_range(range.start..range.end);
        tokens.push(Token {
            kind,
            text: Box::from(slice),
            span: Span::new(
                span.start.saturating_add(base),
                span.end.saturating_add(base),
            ),
            space_before,
        });
        prev_end = range.end;
    }

    Ok(tokens)
}

/// Rebuild source text from tokens, keeping single spaces where the
/// original had whitespace.
pub fn spell(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && token.space_before {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}

/// Contents of a string literal token with escapes processed.
///
/// Encoding prefixes (`u8`, `u`, `U`, `L`) are dropped.
pub fn unquote(literal: &str) -> String {
    let body = literal
        .find('"')
        .and_then(|start| literal.get(start + 1..literal.len().saturating_sub(1)))
        .unwrap_or("");
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some('0') => result.push('\0'),
                Some(c @ ('\\' | '"' | '\'' | '?')) => result.push(c),
                Some(c) => {
                    // Unknown escape - keep as-is
                    result.push('\\');
                    result.push(c);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Byte offset to line/column mapping for one file.
#[derive(Clone, Debug)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .match_indices('\n')
                .map(|(i, _)| u32::try_from(i + 1).unwrap_or(u32::MAX)),
        );
        LineIndex { line_starts }
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let start = self.line_starts[line.saturating_sub(1)];
        let line = u32::try_from(line).unwrap_or(u32::MAX);
        (line.max(1), offset - start + 1)
    }

    /// Main-file location of a span.
    pub fn location(&self, span: Span) -> SourceLocation {
        let (line, column) = self.line_col(span.start);
        SourceLocation::new(line, column, span)
    }
}

#[cfg(test)]
mod tests;
