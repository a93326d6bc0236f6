use super::*;
use crate::lexer::tokenize;
use pretty_assertions::assert_eq;

fn eval_str(source: &str) -> Result<i64, EvalError> {
    let tokens = tokenize(source, 0).unwrap_or_default();
    evaluate(&tokens, &|name| match name {
        "A" => Some(1),
        "B" => Some(4),
        _ => None,
    })
}

#[test]
fn test_precedence() {
    assert_eq!(eval_str("1 + 2 * 3"), Ok(7));
    assert_eq!(eval_str("(1 + 2) * 3"), Ok(9));
    assert_eq!(eval_str("10 - 4 - 3"), Ok(3));
    assert_eq!(eval_str("1 << 4 | 1"), Ok(17));
}

#[test]
fn test_logic_and_comparison() {
    assert_eq!(eval_str("!0 && 2 > 1"), Ok(1));
    assert_eq!(eval_str("0 || 0"), Ok(0));
    assert_eq!(eval_str("3 == 3 ? 10 : 20"), Ok(10));
    assert_eq!(eval_str("0 ? 1 : 0 ? 2 : 3"), Ok(3));
}

#[test]
fn test_identifiers() {
    assert_eq!(eval_str("A | B"), Ok(5));
    assert_eq!(eval_str("Flags::B + 1"), Ok(5));
    assert_eq!(eval_str("true + true"), Ok(2));
    assert_eq!(
        eval_str("C"),
        Err(EvalError::UnknownIdentifier("C".to_string()))
    );
}

#[test]
fn test_literals() {
    assert_eq!(eval_str("0x10"), Ok(16));
    assert_eq!(eval_str("0b11"), Ok(3));
    assert_eq!(eval_str("010"), Ok(8));
    assert_eq!(eval_str("1'000u"), Ok(1000));
    assert_eq!(eval_str("'A'"), Ok(65));
    assert_eq!(eval_str("-1"), Ok(-1));
    assert_eq!(eval_str("~0"), Ok(-1));
    assert_eq!(eval_str("0xFFFFFFFFFFFFFFFF"), Ok(-1));
}

#[test]
fn test_errors() {
    assert_eq!(eval_str("1 / 0"), Err(EvalError::DivisionByZero));
    assert_eq!(eval_str(""), Err(EvalError::Empty));
    assert_eq!(eval_str("1 2"), Err(EvalError::Unexpected("2".to_string())));
    assert_eq!(eval_str("(1"), Err(EvalError::Empty));
}
