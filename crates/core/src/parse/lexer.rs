use std::fmt;

use crate::expression::Comparison;

use super::ParseError;

/// A lexical token of the expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    Number(f64),
    /// A bracketed unit suffix such as `[lbf/in^2]`, without the brackets.
    Unit(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
    Equals,
    Compare(Comparison),
}

impl Token {
    /// Returns the identifier text, if this is an identifier.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(ident) => write!(f, "{ident}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Unit(unit) => write!(f, "[{unit}]"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Caret => write!(f, "^"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::Equals => write!(f, "="),
            Self::Compare(comparison) => write!(f, "{}", comparison.symbol()),
        }
    }
}

/// Splits text into tokens.
///
/// Identifiers match `[A-Za-z_][A-Za-z0-9_]*`. Numbers accept a decimal
/// point and an exponent (`1.5e-3`). `**` is read as `^`.
///
/// # Errors
///
/// Returns an error on characters outside the language, malformed numbers,
/// or an unterminated unit bracket.
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut position = 0;

    while position < chars.len() {
        let ch = chars[position];
        let next = chars.get(position + 1).copied();

        if ch.is_whitespace() {
            position += 1;
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = position;
            while position < chars.len()
                && (chars[position].is_ascii_alphanumeric() || chars[position] == '_')
            {
                position += 1;
            }
            tokens.push(Token::Ident(chars[start..position].iter().collect()));
            continue;
        }

        if ch.is_ascii_digit() || (ch == '.' && next.is_some_and(|c| c.is_ascii_digit())) {
            let (value, end) = lex_number(&chars, position)?;
            tokens.push(Token::Number(value));
            position = end;
            continue;
        }

        let (token, width) = match (ch, next) {
            ('[', _) => {
                let close = chars[position..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or(ParseError::UnterminatedUnit(position))?;
                let unit: String = chars[position + 1..position + close].iter().collect();
                (Token::Unit(unit.trim().to_string()), close + 1)
            }
            ('*', Some('*')) => (Token::Caret, 2),
            ('<', Some('=')) => (Token::Compare(Comparison::Le), 2),
            ('>', Some('=')) => (Token::Compare(Comparison::Ge), 2),
            ('=', Some('=')) => (Token::Compare(Comparison::Eq), 2),
            ('!', Some('=')) => (Token::Compare(Comparison::Ne), 2),
            ('<', _) => (Token::Compare(Comparison::Lt), 1),
            ('>', _) => (Token::Compare(Comparison::Gt), 1),
            ('=', _) => (Token::Equals, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('/', _) => (Token::Slash, 1),
            ('^', _) => (Token::Caret, 1),
            ('(', _) => (Token::LParen, 1),
            (')', _) => (Token::RParen, 1),
            (',', _) => (Token::Comma, 1),
            _ => return Err(ParseError::UnexpectedChar { ch, position }),
        };
        tokens.push(token);
        position += width;
    }

    Ok(tokens)
}

/// Reads a number starting at `start`, returning its value and end position.
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), ParseError> {
    let mut end = start;
    while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
        end += 1;
    }

    if end < chars.len() && matches!(chars[end], 'e' | 'E') {
        let mut exponent_end = end + 1;
        if exponent_end < chars.len() && matches!(chars[exponent_end], '+' | '-') {
            exponent_end += 1;
        }
        if exponent_end < chars.len() && chars[exponent_end].is_ascii_digit() {
            while exponent_end < chars.len() && chars[exponent_end].is_ascii_digit() {
                exponent_end += 1;
            }
            end = exponent_end;
        }
    }

    let text: String = chars[start..end].iter().collect();
    text.parse()
        .map(|value| (value, end))
        .map_err(|_| ParseError::InvalidNumber(text))
}
