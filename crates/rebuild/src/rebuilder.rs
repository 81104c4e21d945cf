use std::collections::{HashMap, HashSet};

use skein_core::{Expression, expression::Condition};
use tracing::debug;

use crate::{ExpressionParser, NamespaceMapper};

/// Repairs an expression tree bottom-up.
///
/// Variable references found in the live set are kept. Any other reference
/// is read as a malformed textual pattern and rebuilt through the
/// [`ExpressionParser`]. A parent node is produced only if all of its children
/// were repaired.
#[derive(Debug)]
pub struct CompositeExpressionRebuilder<'a> {
    live: &'a HashSet<String>,
    mapper: &'a mut NamespaceMapper,
    parser: ExpressionParser,
}

impl<'a> CompositeExpressionRebuilder<'a> {
    pub fn new(live: &'a HashSet<String>, mapper: &'a mut NamespaceMapper) -> Self {
        Self {
            live,
            mapper,
            parser: ExpressionParser,
        }
    }

    /// Returns the repaired tree, or `None` if any reference cannot be rebound.
    pub fn rebuild(&mut self, expression: &Expression) -> Option<Expression> {
        match expression {
            Expression::Variable(symbol) if self.live.contains(symbol) => {
                Some(expression.clone())
            }
            Expression::Variable(symbol) => self.rebuild_reference(symbol),
            Expression::Constant(_) => Some(expression.clone()),
            Expression::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.rebuild(left)?;
                let right = self.rebuild(right)?;
                Some(Expression::binary(*operator, left, right))
            }
            Expression::Unary { function, operand } => {
                let operand = self.rebuild(operand)?;
                Some(Expression::unary(*function, operand))
            }
            Expression::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let condition = Condition {
                    comparison: condition.comparison,
                    left: self.rebuild(&condition.left)?,
                    right: self.rebuild(&condition.right)?,
                };
                let then = self.rebuild(then)?;
                let otherwise = self.rebuild(otherwise)?;
                Some(Expression::conditional(condition, then, otherwise))
            }
        }
    }

    /// Rebuilds a reference whose name is not a live symbol.
    fn rebuild_reference(&mut self, text: &str) -> Option<Expression> {
        let bases = self.parser.base_variables(text);
        if bases.is_empty() {
            debug!(text, "malformed reference holds no identifiers");
            return None;
        }

        let mut mapping = HashMap::with_capacity(bases.len());
        for base in bases {
            let target = if self.live.contains(&base) {
                base.clone()
            } else {
                self.mapper.resolve(&base)?
            };
            mapping.insert(base, target);
        }

        self.parser.rebuild(text, &mapping, self.live)
    }
}
