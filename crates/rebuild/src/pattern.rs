use std::collections::{HashMap, HashSet};

use skein_core::{
    Expression,
    expression::{BinaryOperator, UnaryFunction},
    parse::{Token, parse_expression_with, tokenize},
};
use tracing::debug;

/// Names that look like identifiers but denote functions, not variables.
const CALL_NAMES: [&str; 3] = ["max", "min", "if"];

/// Returns `true` if `word` is the name of a built-in function.
#[must_use]
pub fn is_function_name(word: &str) -> bool {
    CALL_NAMES.contains(&word) || UnaryFunction::from_name(word).is_some()
}

/// Reads malformed variable names as arithmetic text and rebuilds them as
/// expression trees.
///
/// A malformed name such as `"(D - (T - c) * 2.0)"` is what remains when an
/// expression was flattened to text before its variables were namespaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionParser;

impl ExpressionParser {
    /// Extracts the identifiers embedded in a malformed name, in order of
    /// first appearance, skipping function names.
    ///
    /// Identifiers are read with the expression tokenizer, so the `e5` in
    /// `2e5` and the `in` in `0.125[in]` are not variables. Text that does not
    /// tokenize holds no identifiers.
    #[must_use]
    pub fn base_variables(&self, text: &str) -> Vec<String> {
        let tokens = match tokenize(text) {
            Ok(tokens) => tokens,
            Err(error) => {
                debug!(text, %error, "malformed name does not tokenize");
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        tokens
            .iter()
            .filter_map(Token::as_ident)
            .filter(|ident| !is_function_name(ident) && seen.insert(*ident))
            .map(ToString::to_string)
            .collect()
    }

    /// Rebuilds `text` as an expression after renaming identifiers through
    /// `mapping`.
    ///
    /// Identifiers absent from `mapping` are kept as written. Every identifier
    /// must end up in `allowed`, the live symbols, or the rebuild fails.
    #[must_use]
    pub fn rebuild(
        &self,
        text: &str,
        mapping: &HashMap<String, String>,
        allowed: &HashSet<String>,
    ) -> Option<Expression> {
        let tokens = match tokenize(text) {
            Ok(tokens) => tokens,
            Err(error) => {
                debug!(text, %error, "malformed pattern does not tokenize");
                return None;
            }
        };

        let substituted: Vec<Token> = tokens
            .into_iter()
            .map(|token| match token {
                Token::Ident(ident) => {
                    Token::Ident(mapping.get(&ident).cloned().unwrap_or(ident))
                }
                other => other,
            })
            .collect();
        let stripped = strip_outer_parens(&substituted);

        if let Some(expression) = simple_pattern(stripped, allowed) {
            return Some(expression);
        }
        general_pattern(stripped, allowed)
    }
}

/// Removes one pair of parentheses if it wraps the whole token sequence.
fn strip_outer_parens(tokens: &[Token]) -> &[Token] {
    let [Token::LParen, inner @ .., Token::RParen] = tokens else {
        return tokens;
    };

    let mut depth = 0_i32;
    for token in inner {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth -= 1;
                if depth < 0 {
                    // The first `(` closes early, as in `(a) * (b)`.
                    return tokens;
                }
            }
            _ => {}
        }
    }

    if depth == 0 { inner } else { tokens }
}

/// Recognizes `var * const`, `var / var`, `var ± const` and `var ± var`
/// without running the full parser.
fn simple_pattern(tokens: &[Token], allowed: &HashSet<String>) -> Option<Expression> {
    let [Token::Ident(left), operator, right] = tokens else {
        return None;
    };
    if !allowed.contains(left) {
        return None;
    }

    let operator = match operator {
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Sub,
        Token::Star => BinaryOperator::Mul,
        Token::Slash => BinaryOperator::Div,
        _ => return None,
    };

    let right = match (operator, right) {
        (BinaryOperator::Mul | BinaryOperator::Add | BinaryOperator::Sub, Token::Number(value)) => {
            Expression::number(*value)
        }
        (
            BinaryOperator::Div | BinaryOperator::Add | BinaryOperator::Sub,
            Token::Ident(symbol),
        ) if allowed.contains(symbol) => Expression::var(symbol.clone()),
        _ => return None,
    };

    Some(Expression::binary(operator, Expression::var(left.clone()), right))
}

/// Parses the pattern with a symbol table holding only references to the
/// live identifiers it contains.
fn general_pattern(tokens: &[Token], allowed: &HashSet<String>) -> Option<Expression> {
    let symbols: HashMap<String, Expression> = tokens
        .iter()
        .filter_map(Token::as_ident)
        .filter(|ident| allowed.contains(*ident))
        .map(|ident| (ident.to_string(), Expression::var(ident)))
        .collect();

    let text = tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    match parse_expression_with(&text, &symbols) {
        Ok(expression) => Some(expression),
        Err(error) => {
            debug!(%text, %error, "rebuilt pattern does not parse");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed(symbols: &[&str]) -> HashSet<String> {
        symbols.iter().map(ToString::to_string).collect()
    }

    fn mapping(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    #[test]
    fn extracts_base_variables() {
        let parser = ExpressionParser;

        assert_eq!(
            parser.base_variables("(D - (T - c) * 2.0)"),
            vec!["D", "T", "c"]
        );
        assert_eq!(
            parser.base_variables("sqrt(A) + max(x, 2e5) + x"),
            vec!["A", "x"]
        );
        assert_eq!(parser.base_variables("D - 0.125[in]"), vec!["D"]);
        assert!(parser.base_variables("D $ 2").is_empty());
    }

    #[test]
    fn only_parser_functions_are_function_names() {
        for name in ["sqrt", "ln", "log10", "max", "min", "if"] {
            assert!(is_function_name(name), "{name}");
        }
        assert!(!is_function_name("log"));
    }

    #[test]
    fn rebuilds_pattern_with_unit_constant() {
        let parser = ExpressionParser;
        let allowed = allowed(&["branch_D"]);

        let rebuilt = parser
            .rebuild("(D - 0.125[in])", &mapping(&[("D", "branch_D")]), &allowed)
            .unwrap();

        let inch = skein_core::Unit::parse("in").unwrap();
        let expected = Expression::var("branch_D")
            - Expression::constant(skein_core::Quantity::new(0.125, inch));
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn strips_only_wrapping_parentheses() {
        let wrapped = tokenize("(a + b)").unwrap();
        let split = tokenize("(a) * (b)").unwrap();

        assert_eq!(strip_outer_parens(&wrapped).len(), 3);
        assert_eq!(strip_outer_parens(&split).len(), split.len());
    }

    #[test]
    fn simple_patterns_take_the_fast_path() {
        let allowed = allowed(&["ns_a", "ns_b"]);
        let tokens = tokenize("ns_a / ns_b").unwrap();

        assert_eq!(
            simple_pattern(&tokens, &allowed),
            Some(Expression::var("ns_a") / Expression::var("ns_b"))
        );
        assert_eq!(
            simple_pattern(&tokenize("ns_a * 2").unwrap(), &allowed),
            Some(Expression::var("ns_a") * 2.0)
        );
        assert_eq!(simple_pattern(&tokenize("ns_a * ns_b * 2").unwrap(), &allowed), None);
    }

    #[test]
    fn rebuilds_nested_pattern() {
        let parser = ExpressionParser;
        let mapping = mapping(&[("D", "branch_D"), ("T", "branch_T"), ("c", "branch_c")]);
        let allowed = allowed(&["branch_D", "branch_T", "branch_c"]);

        let rebuilt = parser
            .rebuild("(D - (T - c) * 2.0)", &mapping, &allowed)
            .unwrap();

        let expected = Expression::var("branch_D")
            - (Expression::var("branch_T") - Expression::var("branch_c")) * 2.0;
        assert_eq!(rebuilt, expected);
    }

    #[test]
    fn unmapped_identifiers_fail() {
        let parser = ExpressionParser;
        let allowed = allowed(&["branch_D"]);

        assert_eq!(
            parser.rebuild("D - Q", &mapping(&[("D", "branch_D")]), &allowed),
            None
        );
        assert_eq!(parser.rebuild("D $ 2", &HashMap::new(), &allowed), None);
    }
}
