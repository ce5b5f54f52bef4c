//! Lexer for numeric range expressions using logos

use logos::Logos;

/// Tokens of the range mini-language.
///
/// There is no skip pattern: whitespace is a lexing error, which is exactly
/// the behavior the input filter wants. The size grammar's ` x ` separator is
/// handled above the lexer, before individual sides reach it.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of decimal digits, kept as raw text so leading zeros stay visible
    #[regex("[0-9]+", |lex| lex.slice().to_string())]
    Digits(String),

    /// Closed-range separator `..`
    #[token("..")]
    DotDot,

    /// A single `.`, only ever a half-typed `..`
    #[token(".")]
    Dot,

    /// Open-upward suffix `+`
    #[token("+")]
    Plus,

    /// Open-downward suffix `-`
    #[token("-")]
    Minus,
}

/// Lex a raw field value. Returns `None` if any character fails to lex
/// (whitespace, letters, signs in the wrong place).
pub fn lex(input: &str) -> Option<Vec<Token>> {
    Token::lexer(input).collect::<Result<Vec<_>, _>>().ok()
}

/// A digit run with the properties the grammar rules care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    pub value: u64,
    pub leading_zero: bool,
}

impl Number {
    pub fn from_digits(digits: &str) -> Self {
        Self {
            // Absurdly long digit runs saturate rather than fail; the value
            // is only compared against range endpoints and minimums.
            value: digits.parse().unwrap_or(u64::MAX),
            leading_zero: digits.len() > 1 && digits.starts_with('0'),
        }
    }
}

/// The syntactic shape of a single range expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Empty input
    Empty,
    /// `n`
    Exact(Number),
    /// `n+`
    OpenUp(Number),
    /// `n-`
    OpenDown(Number),
    /// `n.` or `n..` — a range still being typed
    RangePartial(Number),
    /// `n..m`
    Range(Number, Number),
    /// Anything the grammar can never accept
    Malformed,
}

/// Classify a raw value into its syntactic shape.
pub fn classify(raw: &str) -> Shape {
    let Some(tokens) = lex(raw) else {
        return Shape::Malformed;
    };
    match tokens.as_slice() {
        [] => Shape::Empty,
        [Token::Digits(n)] => Shape::Exact(Number::from_digits(n)),
        [Token::Digits(n), Token::Plus] => Shape::OpenUp(Number::from_digits(n)),
        [Token::Digits(n), Token::Minus] => Shape::OpenDown(Number::from_digits(n)),
        [Token::Digits(n), Token::Dot] | [Token::Digits(n), Token::DotDot] => {
            Shape::RangePartial(Number::from_digits(n))
        }
        [Token::Digits(n), Token::DotDot, Token::Digits(m)] => {
            Shape::Range(Number::from_digits(n), Number::from_digits(m))
        }
        _ => Shape::Malformed,
    }
}
