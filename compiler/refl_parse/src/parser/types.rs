//! Type specifiers, declarator operators and qualified names.

use super::{is_reserved, PResult, Parser};
use crate::lexer::{Token, TokenKind};
use crate::model::TypeRef;

/// Keywords that combine into a fundamental type.
fn is_fundamental_word(word: &str) -> bool {
    matches!(
        word,
        "signed"
            | "unsigned"
            | "short"
            | "long"
            | "int"
            | "char"
            | "bool"
            | "float"
            | "double"
            | "void"
            | "wchar_t"
            | "char8_t"
            | "char16_t"
            | "char32_t"
            | "auto"
            | "__int64"
    )
}

/// Canonical spelling of a fundamental keyword sequence:
/// `long int` is `long`, `signed` is `int`, `unsigned` is `unsigned int`.
pub(crate) fn canonical_fundamental(words: &[&str]) -> String {
    let unsigned = words.contains(&"unsigned");
    let signed = words.contains(&"signed");
    let shorts = words.iter().filter(|w| **w == "short").count();
    let longs = words.iter().filter(|w| **w == "long").count()
        + 2 * words.iter().filter(|w| **w == "__int64").count();
    let core = words.iter().copied().find(|w| {
        !matches!(*w, "signed" | "unsigned" | "short" | "long" | "int" | "__int64")
    });

    match core {
        Some("char") if unsigned => "unsigned char".to_string(),
        Some("char") if signed => "signed char".to_string(),
        Some("double") if longs > 0 => "long double".to_string(),
        Some(core) => core.to_string(),
        None => {
            let size = if shorts > 0 {
                "short"
            } else if longs >= 2 {
                "long long"
            } else if longs == 1 {
                "long"
            } else {
                "int"
            };
            if unsigned {
                format!("unsigned {size}")
            } else {
                size.to_string()
            }
        }
    }
}

fn is_word(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident | TokenKind::Int | TokenKind::Float | TokenKind::Str | TokenKind::Char
    )
}

/// Spell tokens with a space only between adjacent words and after commas.
pub(crate) fn normalize_spelling(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<TokenKind> = None;
    for token in tokens {
        if let Some(prev) = prev {
            if (is_word(prev) && is_word(token.kind)) || prev == TokenKind::Comma {
                out.push(' ');
            }
        }
        out.push_str(&token.text);
        prev = Some(token.kind);
    }
    out
}

impl Parser<'_> {
    /// `[::] name [<args>] (:: name [<args>])*`
    pub(super) fn qualified_name(&mut self) -> PResult<String> {
        let mut name = String::new();
        if self.eat(TokenKind::ColonColon) {
            name.push_str("::");
        }
        loop {
            self.eat_ident("template");
            let ident = self.expect_ident("a name")?;
            name.push_str(&ident.text);
            if self.at(TokenKind::Lt) {
                let args = self.skip_angles();
                name.push('<');
                name.push_str(&normalize_spelling(args));
                // A closing `>>` ends nested lists that are still open in `args`
                let open: i32 = args
                    .iter()
                    .map(|t| match t.kind {
                        TokenKind::Lt => 1,
                        TokenKind::Gt => -1,
                        TokenKind::Shr => -2,
                        _ => 0,
                    })
                    .sum();
                for _ in 0..=open.max(0) {
                    name.push('>');
                }
            }
            if self.at(TokenKind::ColonColon) && self.peek(1).kind == TokenKind::Ident {
                self.bump();
                name.push_str("::");
                continue;
            }
            return Ok(name);
        }
    }

    /// Type specifier sequence, without declarator operators.
    pub(super) fn type_specifier(&mut self) -> PResult<TypeRef> {
        let mut is_const = false;
        let mut is_volatile = false;
        let mut fundamentals: Vec<&str> = Vec::new();
        let mut named: Option<String> = None;

        loop {
            let token = self.current();
            if token.kind == TokenKind::ColonColon && named.is_none() && fundamentals.is_empty() {
                named = Some(self.qualified_name()?);
                continue;
            }
            if token.kind != TokenKind::Ident {
                break;
            }
            match &*token.text {
                "const" => is_const = true,
                "volatile" => is_volatile = true,
                "typename" | "struct" | "class" | "union" | "enum" => {}
                word if is_fundamental_word(word) && named.is_none() => fundamentals.push(word),
                "decltype" if named.is_none() && fundamentals.is_empty() => {
                    self.bump();
                    let inner = self.skip_group();
                    named = Some(format!("decltype({})", normalize_spelling(inner)));
                    continue;
                }
                word if named.is_none() && fundamentals.is_empty() && !is_reserved(word) => {
                    named = Some(self.qualified_name()?);
                    continue;
                }
                _ => break,
            }
            self.bump();
        }

        let base = match named {
            Some(named) => named,
            None if !fundamentals.is_empty() => canonical_fundamental(&fundamentals),
            None => return Err(self.unexpected("a type")),
        };
        let mut ty = TypeRef {
            spelling: String::new(),
            base,
            is_const,
            is_volatile,
            ..TypeRef::default()
        };
        ty.spelling = base_spelling(&ty);
        Ok(ty)
    }

    /// Pointer and reference operators following a type specifier.
    pub(super) fn declarator_operators(&mut self, ty: &mut TypeRef) {
        loop {
            match self.current().kind {
                TokenKind::Star => {
                    self.bump();
                    ty.pointer_depth = ty.pointer_depth.saturating_add(1);
                    ty.spelling.push('*');
                    while self.at_ident("const") || self.at_ident("volatile") {
                        let qualifier = self.bump();
                        ty.spelling.push(' ');
                        ty.spelling.push_str(&qualifier.text);
                    }
                }
                TokenKind::Amp => {
                    self.bump();
                    ty.is_lvalue_ref = true;
                    ty.spelling.push('&');
                }
                TokenKind::AmpAmp => {
                    self.bump();
                    ty.is_rvalue_ref = true;
                    ty.spelling.push_str("&&");
                }
                TokenKind::Ellipsis => {
                    self.bump();
                    ty.spelling.push_str("...");
                }
                _ => return,
            }
        }
    }

    /// Full type: specifiers plus declarator operators.
    pub(super) fn full_type(&mut self) -> PResult<TypeRef> {
        let mut ty = self.type_specifier()?;
        self.declarator_operators(&mut ty);
        Ok(ty)
    }
}

fn base_spelling(ty: &TypeRef) -> String {
    let mut spelling = String::new();
    if ty.is_const {
        spelling.push_str("const ");
    }
    if ty.is_volatile {
        spelling.push_str("volatile ");
    }
    spelling.push_str(&ty.base);
    spelling
}
