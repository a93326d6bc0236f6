//! Line-oriented preprocessor.
//!
//! Handles conditionals, object-like macro expansion and `#include`
//! bookkeeping, and produces the token stream the parser consumes.
//! Function-like macros are recorded but their invocations are left in the
//! stream untouched. Included files are never read.
//!
//! Comments are blanked to spaces before anything else, so byte offsets in
//! the output refer to the original text.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::error::FrontendError;
use crate::eval::{evaluate, EvalError};
use crate::lexer::{tokenize, LexError, LineIndex, Token, TokenKind};
use crate::model::{Diagnostic, IncludeDirective, MacroDef, Severity};

/// Token stream and side tables produced by [`Preprocessor::run`].
#[derive(Debug)]
pub struct Preprocessed {
    /// Tokens of active regions, terminated by an end-of-input token.
    pub tokens: Vec<Token>,
    pub includes: Vec<IncludeDirective>,
    pub macros: BTreeMap<String, MacroDef>,
    pub diagnostics: Vec<Diagnostic>,
}

struct Macro {
    def: MacroDef,
    /// Replacement list, lexed once at definition.
    tokens: Vec<Token>,
}

/// One open `#if` group.
struct Conditional {
    parent_active: bool,
    /// Some branch of this group has already been selected.
    taken: bool,
    active: bool,
    seen_else: bool,
    line: u32,
}

/// Preprocessor for one file.
pub struct Preprocessor<'a> {
    path: &'a Path,
    include_dirs: &'a [PathBuf],
    macros: FxHashMap<String, Macro>,
    conditionals: Vec<Conditional>,
    includes: Vec<IncludeDirective>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Preprocessor<'a> {
    pub fn new(path: &'a Path, include_dirs: &'a [PathBuf]) -> Self {
        Preprocessor {
            path,
            include_dirs,
            macros: FxHashMap::default(),
            conditionals: Vec::new(),
            includes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Define (or redefine) a macro before the file is processed.
    pub fn define(&mut self, name: impl Into<String>, def: MacroDef) {
        let tokens = tokenize(&def.body, 0).unwrap_or_default();
        self.macros.insert(name.into(), Macro { def, tokens });
    }

    pub fn undef(&mut self, name: &str) {
        self.macros.remove(name);
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    /// Preprocess `source`.
    pub fn run(mut self, source: &str) -> Result<Preprocessed, FrontendError> {
        let index = LineIndex::new(source);
        let clean = blank_comments(source).map_err(|offset| FrontendError::UnterminatedComment {
            path: self.path.to_path_buf(),
            line: index.line_col(offset).0,
        })?;

        let mut tokens = Vec::new();
        let mut chunk: Option<(usize, usize)> = None;
        let mut lines = LineIter::new(&clean);

        while let Some((start, line)) = lines.next() {
            let line_no = index.line_col(to_u32(start)).0;
            let trimmed = line.trim_start();

            if let Some(directive) = trimmed.strip_prefix('#') {
                if let Some((from, to)) = chunk.take() {
                    self.lex_chunk(&clean[from..to], from, &index, &mut tokens)?;
                }
                let mut text = directive.to_string();
                while text.trim_end().ends_with('\\') {
                    let cut = text.trim_end().len() - 1;
                    text.truncate(cut);
                    match lines.next() {
                        Some((_, next)) => {
                            text.push(' ');
                            text.push_str(next);
                        }
                        None => break,
                    }
                }
                self.directive(&text, line_no)?;
            } else if self.is_active() {
                let end = start + line.len();
                chunk = Some(match chunk {
                    Some((from, _)) => (from, end),
                    None => (start, end),
                });
            } else if let Some((from, to)) = chunk.take() {
                self.lex_chunk(&clean[from..to], from, &index, &mut tokens)?;
            }
        }
        if let Some((from, to)) = chunk.take() {
            self.lex_chunk(&clean[from..to], from, &index, &mut tokens)?;
        }

        if let Some(open) = self.conditionals.last() {
            return Err(FrontendError::UnbalancedConditional {
                path: self.path.to_path_buf(),
                line: open.line,
                message: "unterminated conditional directive",
            });
        }

        tokens.push(Token::eof(to_u32(source.len())));
        Ok(Preprocessed {
            tokens,
            includes: self.includes,
            macros: self
                .macros
                .into_iter()
                .map(|(name, m)| (name, m.def))
                .collect(),
            diagnostics: self.diagnostics,
        })
    }

    fn is_active(&self) -> bool {
        self.conditionals.last().map_or(true, |c| c.active)
    }

    fn lex_chunk(
        &self,
        text: &str,
        base: usize,
        index: &LineIndex,
        out: &mut Vec<Token>,
    ) -> Result<(), FrontendError> {
        let raw = tokenize(text, to_u32(base)).map_err(|LexError { offset, what }| {
            FrontendError::UnterminatedLiteral {
                path: self.path.to_path_buf(),
                line: index.line_col(offset).0,
                what,
            }
        })?;
        let mut active = Vec::new();
        self.expand(raw, out, &mut active);
        Ok(())
    }

    /// Expand object-like macros in `tokens`.
    ///
    /// `active` holds the macros currently being expanded; a macro never
    /// expands inside its own replacement.
    fn expand(&self, tokens: Vec<Token>, out: &mut Vec<Token>, active: &mut Vec<String>) {
        for token in tokens {
            let replacement = (token.kind == TokenKind::Ident)
                .then(|| self.macros.get(&*token.text))
                .flatten()
                .filter(|m| !m.def.is_function_like())
                .filter(|_| !active.iter().any(|a| **a == *token.text));
            let Some(m) = replacement else {
                out.push(token);
                continue;
            };

            let body: Vec<Token> = m
                .tokens
                .iter()
                .enumerate()
                .map(|(i, t)| Token {
                    span: token.span,
                    space_before: if i == 0 { token.space_before } else { t.space_before },
                    ..t.clone()
                })
                .collect();
            active.push(token.text.to_string());
            self.expand(body, out, active);
            active.pop();
        }
    }

    fn diagnostic(&mut self, severity: Severity, line: u32, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            message,
            line,
            column: 1,
        });
    }

    fn directive(&mut self, text: &str, line: u32) -> Result<(), FrontendError> {
        let text = text.trim();
        let name_len = text
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(text.len());
        let (name, rest) = text.split_at(name_len);
        let rest = rest.trim();

        match name {
            "if" | "ifdef" | "ifndef" => {
                let parent_active = self.is_active();
                let cond = parent_active && self.condition(name, rest, line);
                self.conditionals.push(Conditional {
                    parent_active,
                    taken: cond,
                    active: cond,
                    seen_else: false,
                    line,
                });
            }
            "elif" | "elifdef" | "elifndef" => {
                let (parent_active, taken) = match self.conditionals.last() {
                    Some(c) if c.seen_else => return Err(self.unbalanced(line, "#elif after #else")),
                    Some(c) => (c.parent_active, c.taken),
                    None => return Err(self.unbalanced(line, "#elif without #if")),
                };
                let kind = match name {
                    "elifdef" => "ifdef",
                    "elifndef" => "ifndef",
                    _ => "if",
                };
                let cond = parent_active && !taken && self.condition(kind, rest, line);
                if let Some(c) = self.conditionals.last_mut() {
                    c.active = cond;
                    c.taken |= cond;
                }
            }
            "else" => {
                match self.conditionals.last() {
                    Some(c) if c.seen_else => return Err(self.unbalanced(line, "#else after #else")),
                    Some(_) => {}
                    None => return Err(self.unbalanced(line, "#else without #if")),
                }
                let Some(c) = self.conditionals.last_mut() else {
                    return Ok(());
                };
                c.active = c.parent_active && !c.taken;
                c.taken = true;
                c.seen_else = true;
            }
            "endif" => {
                if self.conditionals.pop().is_none() {
                    return Err(self.unbalanced(line, "#endif without #if"));
                }
            }
            _ if !self.is_active() => {}
            "define" => self.define_directive(rest, line),
            "undef" => {
                let name = rest.split_whitespace().next().unwrap_or_default();
                self.macros.remove(name);
            }
            "include" | "include_next" | "import" => self.include_directive(rest, line),
            "error" => self.diagnostic(Severity::Error, line, format!("#error {rest}")),
            "warning" => self.diagnostic(Severity::Warning, line, format!("#warning {rest}")),
            "pragma" | "line" | "ident" | "" => {}
            other => self.diagnostic(
                Severity::Warning,
                line,
                format!("unknown preprocessor directive '#{other}'"),
            ),
        }
        Ok(())
    }

    fn unbalanced(&self, line: u32, message: &'static str) -> FrontendError {
        FrontendError::UnbalancedConditional {
            path: self.path.to_path_buf(),
            line,
            message,
        }
    }

    fn define_directive(&mut self, rest: &str, line: u32) {
        let name_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        let (name, after) = rest.split_at(name_len);
        if name.is_empty() {
            self.diagnostic(Severity::Warning, line, "macro name missing in #define".to_string());
            return;
        }

        // `NAME(` without whitespace starts a parameter list
        let def = match after.strip_prefix('(') {
            Some(params) => {
                let (params, body) = params.split_once(')').unwrap_or((params, ""));
                MacroDef {
                    params: Some(
                        params
                            .split(',')
                            .map(str::trim)
                            .filter(|p| !p.is_empty())
                            .map(str::to_string)
                            .collect(),
                    ),
                    body: body.trim().to_string(),
                }
            }
            None => MacroDef::object(after.trim()),
        };

        if self.macros.get(name).is_some_and(|m| m.def != def) {
            self.diagnostic(Severity::Warning, line, format!("'{name}' macro redefined"));
        }
        self.define(name, def);
    }

    fn include_directive(&mut self, rest: &str, line: u32) {
        let (spelled, angled) = if let Some(quoted) = rest.strip_prefix('"') {
            (quoted.split('"').next().unwrap_or_default(), false)
        } else if let Some(angled) = rest.strip_prefix('<') {
            (angled.split('>').next().unwrap_or_default(), true)
        } else {
            self.diagnostic(
                Severity::Warning,
                line,
                format!("unsupported #include form '{rest}'"),
            );
            return;
        };
        let resolved = self.resolve_include(spelled, angled);
        self.includes.push(IncludeDirective {
            spelled: spelled.to_string(),
            angled,
            resolved,
            line,
        });
    }

    /// First existing file for an include on the search path.
    fn resolve_include(&self, spelled: &str, angled: bool) -> Option<PathBuf> {
        let local = (!angled)
            .then(|| self.path.parent())
            .flatten()
            .map(Path::to_path_buf);
        local
            .into_iter()
            .chain(self.include_dirs.iter().cloned())
            .map(|dir| dir.join(spelled))
            .find(|candidate| candidate.is_file())
    }

    /// Evaluate the condition of an `#if`, `#ifdef` or `#ifndef`.
    ///
    /// Malformed expressions are reported and count as false.
    fn condition(&mut self, kind: &str, rest: &str, line: u32) -> bool {
        match kind {
            "ifdef" | "ifndef" => {
                let name = rest.split_whitespace().next().unwrap_or_default();
                (kind == "ifdef") == self.macros.contains_key(name)
            }
            _ => match self.evaluate_if(rest) {
                Ok(value) => value != 0,
                Err(err) => {
                    self.diagnostic(
                        Severity::Warning,
                        line,
                        format!("cannot evaluate '#if {rest}': {err}"),
                    );
                    false
                }
            },
        }
    }

    fn evaluate_if(&self, text: &str) -> Result<i64, EvalError> {
        let raw = tokenize(text, 0).map_err(|_| EvalError::Unexpected(text.to_string()))?;
        let resolved = self.resolve_defined(raw);
        let mut expanded = Vec::new();
        self.expand(resolved, &mut expanded, &mut Vec::new());
        let folded = self.fold_builtin_calls(expanded);
        // Identifiers left after expansion evaluate to zero
        evaluate(&folded, &|_| Some(0))
    }

    /// Replace `defined X` and `defined(X)` with `1` or `0`.
    fn resolve_defined(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut iter = tokens.into_iter().peekable();
        while let Some(token) = iter.next() {
            if !token.is_ident("defined") {
                out.push(token);
                continue;
            }
            let parenthesized = iter.next_if(|t| t.kind == TokenKind::LParen).is_some();
            let name = iter.next_if(|t| t.kind == TokenKind::Ident);
            if parenthesized {
                iter.next_if(|t| t.kind == TokenKind::RParen);
            }
            let defined = name.is_some_and(|n| self.macros.contains_key(&*n.text));
            out.push(int_token(i64::from(defined), &token));
        }
        out
    }

    /// Replace `name(…)` calls with their value: `__has_include` is
    /// resolved on the search path, every other call is zero.
    fn fold_builtin_calls(&self, tokens: Vec<Token>) -> Vec<Token> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            let is_call = token.kind == TokenKind::Ident
                && tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::LParen);
            if !is_call {
                out.push(token.clone());
                i += 1;
                continue;
            }

            let open = i + 1;
            let mut depth = 0usize;
            let mut close = open;
            for (j, t) in tokens.iter().enumerate().skip(open) {
                match t.kind {
                    TokenKind::LParen => depth += 1,
                    TokenKind::RParen => {
                        depth -= 1;
                        if depth == 0 {
                            close = j;
                            break;
                        }
                    }
                    _ => {}
                }
                close = j;
            }

            let value = if token.is_ident("__has_include") || token.is_ident("__has_include_next") {
                let inner = &tokens[open + 1..close.max(open + 1)];
                let angled = inner.first().map(|t| t.kind) == Some(TokenKind::Lt);
                let spelled: String = if angled {
                    inner
                        .iter()
                        .skip(1)
                        .take_while(|t| t.kind != TokenKind::Gt)
                        .map(|t| &*t.text)
                        .collect()
                } else {
                    inner
                        .first()
                        .map(|t| crate::lexer::unquote(&t.text))
                        .unwrap_or_default()
                };
                i64::from(self.resolve_include(&spelled, angled).is_some())
            } else {
                0
            };
            out.push(int_token(value, token));
            i = close + 1;
        }
        out
    }
}

fn int_token(value: i64, at: &Token) -> Token {
    Token {
        kind: TokenKind::Int,
        text: value.to_string().into_boxed_str(),
        span: at.span,
        space_before: at.space_before,
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Lines of `text` with their starting byte offsets, without terminators.
struct LineIter<'s> {
    text: &'s str,
    pos: usize,
}

impl<'s> LineIter<'s> {
    fn new(text: &'s str) -> Self {
        LineIter { text, pos: 0 }
    }
}

impl<'s> Iterator for LineIter<'s> {
    type Item = (usize, &'s str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos > self.text.len() || (self.pos == self.text.len() && !self.text.is_empty()) {
            return None;
        }
        let start = self.pos;
        let rest = &self.text[start..];
        let len = rest.find('\n').unwrap_or(rest.len());
        self.pos = start + len + 1;
        Some((start, rest[..len].trim_end_matches('\r')))
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Replace every comment byte with a space, keeping newlines.
///
/// Returns the offset of an unterminated block comment.
fn blank_comments(source: &str) -> Result<String, u32> {
    let bytes = source.as_bytes();
    let mut out = bytes.to_vec();
    let len = bytes.len();
    let mut i = 0;

    while i < len {
        match bytes[i] {
            quote @ (b'"' | b'\'') => {
                // `1'000` is a digit separator, not a character literal
                if quote == b'\'' && i > 0 && is_ident_byte(bytes[i - 1]) {
                    i += 1;
                    continue;
                }
                i += 1;
                while i < len && bytes[i] != quote && bytes[i] != b'\n' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < len && bytes[i] != b'\n' {
                    out[i] = b' ';
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let start = i;
                out[i] = b' ';
                out[i + 1] = b' ';
                i += 2;
                loop {
                    if i + 1 >= len {
                        return Err(to_u32(start));
                    }
                    if bytes[i] == b'*' && bytes[i + 1] == b'/' {
                        out[i] = b' ';
                        out[i + 1] = b' ';
                        i += 2;
                        break;
                    }
                    if bytes[i] != b'\n' {
                        out[i] = b' ';
                    }
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    // Whole comments are blanked, so no multi-byte sequence is split
    Ok(String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
