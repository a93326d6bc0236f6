use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source, 0)
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn test_lex_declaration() {
    assert_eq!(
        kinds("class Foo : public Bar { int x = 42; };"),
        vec![
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Colon,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::LBrace,
            TokenKind::Ident,
            TokenKind::Ident,
            TokenKind::Eq,
            TokenKind::Int,
            TokenKind::Semi,
            TokenKind::RBrace,
            TokenKind::Semi,
        ]
    );
}

#[test]
fn test_lex_numbers() {
    assert_eq!(
        kinds("0x1F 0b101 1'000 42u 3.5f .5 1e10 2.0"),
        vec![
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Int,
            TokenKind::Float,
            TokenKind::Float,
            TokenKind::Float,
            TokenKind::Float,
        ]
    );
}

#[test]
fn test_lex_skips_comments() {
    let tokens = tokenize("a /* b */ c // d\ne", 0).unwrap_or_default();
    let texts: Vec<_> = tokens.iter().map(|t| &*t.text).collect();
    assert_eq!(texts, vec!["a", "c", "e"]);
}

#[test]
fn test_lex_block_comment_edges() {
    let tokens = tokenize("a /** b **/ c /* x * / y */d", 0).unwrap_or_default();
    let texts: Vec<_> = tokens.iter().map(|t| &*t.text).collect();
    assert_eq!(texts, vec!["a", "c", "d"]);
    // A comment separates tokens like whitespace
    assert!(tokens[2].space_before);

    assert_eq!(
        tokenize("x /* never closed", 0).err(),
        Some(LexError {
            offset: 2,
            what: "comment",
        })
    );
}

#[test]
fn test_lex_punctuation_longest_match() {
    assert_eq!(
        kinds(":: -> ... >> <<= &&"),
        vec![
            TokenKind::ColonColon,
            TokenKind::Arrow,
            TokenKind::Ellipsis,
            TokenKind::Shr,
            TokenKind::AssignOp,
            TokenKind::AmpAmp,
        ]
    );
}

#[test]
fn test_lex_prefixed_literals() {
    let tokens = tokenize(r#"u8"text" L'x' u8"#, 0).unwrap_or_default();
    assert_eq!(tokens[0].kind, TokenKind::Str);
    assert_eq!(tokens[1].kind, TokenKind::Char);
    assert_eq!(tokens[2].kind, TokenKind::Ident);
}

#[test]
fn test_spans_are_offset() {
    let tokens = tokenize("ab cd", 100).unwrap_or_default();
    assert_eq!(tokens[1].span, Span::new(103, 105));
    assert!(tokens[1].space_before);
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("const char* s = \"abc\n;", 10);
    assert_eq!(
        err,
        Err(LexError {
            offset: 26,
            what: "string"
        })
    );
}

#[test]
fn test_unknown_character() {
    assert_eq!(kinds("a @ b")[1], TokenKind::Unknown);
}

#[test]
fn test_spell_keeps_spacing() {
    let tokens = tokenize(r#"DisplayName="Foo", ReadOnly"#, 0).unwrap_or_default();
    assert_eq!(spell(&tokens), r#"DisplayName="Foo", ReadOnly"#);
}

#[test]
fn test_unquote() {
    assert_eq!(unquote(r#""a\"b\\n""#), "a\"b\\n");
    assert_eq!(unquote(r#"u8"x\ty""#), "x\ty");
    assert_eq!(unquote(r#""""#), "");
}

#[test]
fn test_line_index() {
    let index = LineIndex::new("ab\ncd\n\nef");
    assert_eq!(index.line_col(0), (1, 1));
    assert_eq!(index.line_col(1), (1, 2));
    assert_eq!(index.line_col(3), (2, 1));
    assert_eq!(index.line_col(6), (3, 1));
    assert_eq!(index.line_col(8), (4, 2));
    let loc = index.location(Span::new(4, 5));
    assert_eq!((loc.line, loc.column, loc.in_main_file), (2, 2, true));
}
