//! A recursive-descent parser for arithmetic expressions and equations.
//!
//! The grammar, lowest precedence first:
//!
//! ```text
//! equation   := expression '=' expression
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := ('-' | '+') unary | power
//! power      := primary ('^' unary)?
//! primary    := NUMBER UNIT? | IDENT '(' arguments ')' | IDENT | '(' expression ')'
//! ```
//!
//! Identifiers are turned into expressions by a [`Resolver`]. The default
//! resolver, [`FreeSymbols`], maps every identifier to a variable reference;
//! a `HashMap<String, Expression>` restricts parsing to a fixed symbol table.

mod lexer;

use std::collections::HashMap;

use thiserror::Error;

pub use lexer::{Token, tokenize};

use crate::{
    Equation, Expression, Quantity, Unit, UnitError,
    expression::{BinaryOperator, Condition, UnaryFunction},
};

/// Errors that can occur while parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unexpected character `{ch}` at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("unterminated unit starting at position {0}")]
    UnterminatedUnit(usize),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error("unexpected `{found}`, expected {expected}")]
    Unexpected {
        found: String,
        expected: &'static str,
    },

    #[error("unexpected end of input, expected {0}")]
    UnexpectedEnd(&'static str),

    #[error("unresolved identifier `{0}`")]
    Unresolved(String),

    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    #[error("`{function}` takes {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    #[error("equation has no `=`")]
    MissingEquals,
}

/// Turns identifiers into expression nodes during parsing.
pub trait Resolver {
    /// Returns the expression an identifier stands for, if it is defined.
    fn resolve(&self, identifier: &str) -> Option<Expression>;
}

/// Resolves every identifier to a variable reference with the same symbol.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeSymbols;

impl Resolver for FreeSymbols {
    fn resolve(&self, identifier: &str) -> Option<Expression> {
        Some(Expression::var(identifier))
    }
}

impl Resolver for HashMap<String, Expression> {
    fn resolve(&self, identifier: &str) -> Option<Expression> {
        self.get(identifier).cloned()
    }
}

/// Parses an expression, mapping identifiers to variable references.
///
/// # Errors
///
/// Returns an error if the text is not a well-formed expression.
pub fn parse_expression(text: &str) -> Result<Expression, ParseError> {
    parse_expression_with(text, &FreeSymbols)
}

/// Parses an expression, resolving identifiers through `resolver`.
///
/// # Errors
///
/// Returns an error if the text is not a well-formed expression or an
/// identifier does not resolve.
pub fn parse_expression_with(text: &str, resolver: &dyn Resolver) -> Result<Expression, ParseError> {
    let mut parser = Parser::new(tokenize(text)?, resolver);
    let expression = parser.expression()?;
    parser.finish()?;
    Ok(expression)
}

/// Parses an equation of the form `lhs = rhs`.
///
/// # Errors
///
/// Returns an error if either side is malformed or there is no `=`.
pub fn parse_equation(name: impl Into<String>, text: &str) -> Result<Equation, ParseError> {
    let mut parser = Parser::new(tokenize(text)?, &FreeSymbols);
    let lhs = parser.expression()?;
    if !parser.eat(&Token::Equals) {
        return match parser.peek() {
            Some(token) => Err(ParseError::Unexpected {
                found: token.to_string(),
                expected: "`=`",
            }),
            None => Err(ParseError::MissingEquals),
        };
    }
    let rhs = parser.expression()?;
    parser.finish()?;
    Ok(Equation::new(name, lhs, rhs))
}

/// Parser state over a token stream.
struct Parser<'r> {
    tokens: Vec<Token>,
    position: usize,
    resolver: &'r dyn Resolver,
}

impl<'r> Parser<'r> {
    fn new(tokens: Vec<Token>, resolver: &'r dyn Resolver) -> Self {
        Self {
            tokens,
            position: 0,
            resolver,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, description: &'static str) -> Result<(), ParseError> {
        match self.advance() {
            Some(token) if &token == expected => Ok(()),
            Some(token) => Err(ParseError::Unexpected {
                found: token.to_string(),
                expected: description,
            }),
            None => Err(ParseError::UnexpectedEnd(description)),
        }
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(ParseError::Unexpected {
                found: token.to_string(),
                expected: "end of input",
            }),
        }
    }

    fn expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.term()?;
        loop {
            let operator = match self.peek() {
                Some(Token::Plus) => BinaryOperator::Add,
                Some(Token::Minus) => BinaryOperator::Sub,
                _ => return Ok(left),
            };
            self.position += 1;
            left = Expression::binary(operator, left, self.term()?);
        }
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.unary()?;
        loop {
            let operator = match self.peek() {
                Some(Token::Star) => BinaryOperator::Mul,
                Some(Token::Slash) => BinaryOperator::Div,
                _ => return Ok(left),
            };
            self.position += 1;
            left = Expression::binary(operator, left, self.unary()?);
        }
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        if self.eat(&Token::Minus) {
            return Ok(Expression::unary(UnaryFunction::Neg, self.unary()?));
        }
        if self.eat(&Token::Plus) {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(Expression::binary(BinaryOperator::Pow, base, exponent));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        match self.advance() {
            Some(Token::Number(value)) => {
                if let Some(Token::Unit(unit)) = self.peek() {
                    let unit = Unit::parse(unit)?;
                    self.position += 1;
                    return Ok(Expression::constant(Quantity::new(value, unit)));
                }
                Ok(Expression::number(value))
            }
            Some(Token::Ident(identifier)) => {
                if self.eat(&Token::LParen) {
                    return self.call(&identifier);
                }
                self.resolver
                    .resolve(&identifier)
                    .ok_or(ParseError::Unresolved(identifier))
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                self.expect(&Token::RParen, "`)`")?;
                Ok(inner)
            }
            Some(token) => Err(ParseError::Unexpected {
                found: token.to_string(),
                expected: "a number, identifier or `(`",
            }),
            None => Err(ParseError::UnexpectedEnd("a number, identifier or `(`")),
        }
    }

    /// Parses the arguments of a function call; the `(` is already consumed.
    fn call(&mut self, function: &str) -> Result<Expression, ParseError> {
        if function == "if" {
            let condition = self.condition()?;
            self.expect(&Token::Comma, "`,`")?;
            let then = self.expression()?;
            self.expect(&Token::Comma, "`,`")?;
            let otherwise = self.expression()?;
            self.expect(&Token::RParen, "`)`")?;
            return Ok(Expression::conditional(condition, then, otherwise));
        }

        let mut arguments = vec![self.expression()?];
        while self.eat(&Token::Comma) {
            arguments.push(self.expression()?);
        }
        self.expect(&Token::RParen, "`)`")?;

        if let Some(unary) = UnaryFunction::from_name(function) {
            let found = arguments.len();
            let Some(operand) = arguments.pop().filter(|_| found == 1) else {
                return Err(ParseError::Arity {
                    function: function.to_string(),
                    expected: 1,
                    found,
                });
            };
            return Ok(Expression::unary(unary, operand));
        }

        if let Some(operator) = BinaryOperator::from_function_name(function) {
            if arguments.len() < 2 {
                return Err(ParseError::Arity {
                    function: function.to_string(),
                    expected: 2,
                    found: arguments.len(),
                });
            }
            let mut arguments = arguments.into_iter();
            let first = arguments.next().ok_or(ParseError::UnexpectedEnd("an argument"))?;
            return Ok(arguments.fold(first, |acc, next| Expression::binary(operator, acc, next)));
        }

        Err(ParseError::UnknownFunction(function.to_string()))
    }

    fn condition(&mut self) -> Result<Condition, ParseError> {
        let left = self.expression()?;
        let comparison = match self.advance() {
            Some(Token::Compare(comparison)) => comparison,
            Some(token) => {
                return Err(ParseError::Unexpected {
                    found: token.to_string(),
                    expected: "a comparison",
                });
            }
            None => return Err(ParseError::UnexpectedEnd("a comparison")),
        };
        let right = self.expression()?;
        Ok(Condition {
            comparison,
            left,
            right,
        })
    }
}
