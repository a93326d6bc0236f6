//! Integer constant-expression evaluation.
//!
//! Shared by `#if` directives and enum constant initialisers. Arithmetic
//! wraps on overflow, matching what a compiler does for `i64`.

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

/// Why an expression has no value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("unexpected '{0}' in constant expression")]
    Unexpected(String),
    #[error("invalid integer literal '{0}'")]
    BadLiteral(String),
    #[error("division by zero")]
    DivisionByZero,
}

/// Evaluate `tokens` as an integer constant expression.
///
/// Identifiers go through `resolve`; `true` and `false` are built in.
pub fn evaluate(tokens: &[Token], resolve: &dyn Fn(&str) -> Option<i64>) -> Result<i64, EvalError> {
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }
    let mut eval = Evaluator {
        tokens,
        pos: 0,
        resolve,
    };
    let value = eval.expr(0)?;
    match eval.peek() {
        None => Ok(value),
        Some(token) => Err(EvalError::Unexpected(token.text.to_string())),
    }
}

/// Value of an integer literal token such as `0x1F`, `1'000u` or `017`.
pub fn parse_int_literal(text: &str) -> Result<i64, EvalError> {
    let bad = || EvalError::BadLiteral(text.to_string());
    let digits: String = text
        .trim_end_matches(['u', 'U', 'l', 'L', 'z', 'Z'])
        .chars()
        .filter(|&c| c != '\'')
        .collect();
    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (2, bin)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits.as_str())
    };
    u64::from_str_radix(body, radix)
        .map(reinterpret_unsigned)
        .map_err(|_| bad())
}

#[expect(
    clippy::cast_possible_wrap,
    reason = "unsigned literals above i64::MAX keep their bit pattern"
)]
fn reinterpret_unsigned(value: u64) -> i64 {
    value as i64
}

/// Value of a character literal token such as `'a'` or `'\n'`.
fn parse_char_literal(text: &str) -> Result<i64, EvalError> {
    let bad = || EvalError::BadLiteral(text.to_string());
    let start = text.find('\'').ok_or_else(bad)?;
    let body = text
        .get(start + 1..text.len().saturating_sub(1))
        .ok_or_else(bad)?;
    let mut chars = body.chars();
    let c = match chars.next() {
        Some('\\') => match chars.next() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('0') => '\0',
            Some(c) => c,
            None => return Err(bad()),
        },
        Some(c) => c,
        None => return Err(bad()),
    };
    Ok(i64::from(u32::from(c)))
}

struct Evaluator<'a> {
    tokens: &'a [Token],
    pos: usize,
    resolve: &'a dyn Fn(&str) -> Option<i64>,
}

/// Binding power of a binary operator (higher binds tighter).
fn binary_power(kind: TokenKind) -> Option<u8> {
    Some(match kind {
        TokenKind::PipePipe => 2,
        TokenKind::AmpAmp => 3,
        TokenKind::Pipe => 4,
        TokenKind::Caret => 5,
        TokenKind::Amp => 6,
        TokenKind::EqEq | TokenKind::NotEq => 7,
        TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => 8,
        TokenKind::Shl | TokenKind::Shr => 9,
        TokenKind::Plus | TokenKind::Minus => 10,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 11,
        _ => return None,
    })
}

impl<'a> Evaluator<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), EvalError> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(()),
            Some(token) => Err(EvalError::Unexpected(token.text.to_string())),
            None => Err(EvalError::Empty),
        }
    }

    fn expr(&mut self, min_power: u8) -> Result<i64, EvalError> {
        let mut lhs = self.unary()?;

        loop {
            let Some(kind) = self.peek().map(|t| t.kind) else {
                break;
            };
            if kind == TokenKind::Question {
                if min_power > 1 {
                    break;
                }
                self.pos += 1;
                let then = self.expr(0)?;
                self.expect(TokenKind::Colon)?;
                let otherwise = self.expr(1)?;
                lhs = if lhs != 0 { then } else { otherwise };
                continue;
            }
            let Some(power) = binary_power(kind) else {
                break;
            };
            if power <= min_power {
                break;
            }
            self.pos += 1;
            let rhs = self.expr(power)?;
            lhs = apply(kind, lhs, rhs)?;
        }

        Ok(lhs)
    }

    fn unary(&mut self) -> Result<i64, EvalError> {
        let Some(token) = self.bump() else {
            return Err(EvalError::Empty);
        };
        match token.kind {
            TokenKind::Bang => Ok(i64::from(self.unary()? == 0)),
            TokenKind::Tilde => Ok(!self.unary()?),
            TokenKind::Minus => Ok(self.unary()?.wrapping_neg()),
            TokenKind::Plus => self.unary(),
            TokenKind::LParen => {
                let value = self.expr(0)?;
                self.expect(TokenKind::RParen)?;
                Ok(value)
            }
            TokenKind::Int => parse_int_literal(&token.text),
            TokenKind::Char => parse_char_literal(&token.text),
            TokenKind::Ident => match &*token.text {
                "true" => Ok(1),
                "false" => Ok(0),
                name => {
                    let name = name.to_string();
                    // `Enum::Value` resolves on its last segment
                    let mut resolved = name.clone();
                    while self.peek().map(|t| t.kind) == Some(TokenKind::ColonColon) {
                        self.pos += 1;
                        match self.bump() {
                            Some(t) if t.kind == TokenKind::Ident => resolved = t.text.to_string(),
                            Some(t) => return Err(EvalError::Unexpected(t.text.to_string())),
                            None => return Err(EvalError::Empty),
                        }
                    }
                    (self.resolve)(&resolved).ok_or(EvalError::UnknownIdentifier(resolved))
                }
            },
            _ => Err(EvalError::Unexpected(token.text.to_string())),
        }
    }
}

fn apply(op: TokenKind, lhs: i64, rhs: i64) -> Result<i64, EvalError> {
    let shift = |v: i64| u32::try_from(v & 63).unwrap_or(0);
    Ok(match op {
        TokenKind::PipePipe => i64::from(lhs != 0 || rhs != 0),
        TokenKind::AmpAmp => i64::from(lhs != 0 && rhs != 0),
        TokenKind::Pipe => lhs | rhs,
        TokenKind::Caret => lhs ^ rhs,
        TokenKind::Amp => lhs & rhs,
        TokenKind::EqEq => i64::from(lhs == rhs),
        TokenKind::NotEq => i64::from(lhs != rhs),
        TokenKind::Lt => i64::from(lhs < rhs),
        TokenKind::Gt => i64::from(lhs > rhs),
        TokenKind::LtEq => i64::from(lhs <= rhs),
        TokenKind::GtEq => i64::from(lhs >= rhs),
        TokenKind::Shl => lhs.wrapping_shl(shift(rhs)),
        TokenKind::Shr => lhs.wrapping_shr(shift(rhs)),
        TokenKind::Plus => lhs.wrapping_add(rhs),
        TokenKind::Minus => lhs.wrapping_sub(rhs),
        TokenKind::Star => lhs.wrapping_mul(rhs),
        TokenKind::Slash | TokenKind::Percent if rhs == 0 => {
            return Err(EvalError::DivisionByZero);
        }
        TokenKind::Slash => lhs.wrapping_div(rhs),
        TokenKind::Percent => lhs.wrapping_rem(rhs),
        _ => return Err(EvalError::Unexpected(format!("{op:?}"))),
    })
}

#[cfg(test)]
mod tests;
