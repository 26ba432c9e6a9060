//! WHERE clause parsing and evaluation
//!
//! Grammar, AND binding tighter than OR:
//! ```text
//! or_expr   := and_expr (OR and_expr)*
//! and_expr  := condition (AND condition)*
//! condition := '(' or_expr ')' | column comparison_op literal
//! ```

use crate::{
    error::{Error, Result},
    sql::{
        parser::{
            ast::{Condition, LogicalOperator, Operator},
            lexer::{Token, TokenKind},
        },
        schema::find_column,
        types::{compare, unquote},
    },
};

/// Recursive-descent parser over the token slice of a WHERE clause
pub struct ConditionParser<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> ConditionParser<'a> {
    /// Parses the whole slice into a single condition tree
    pub fn parse(tokens: &'a [Token]) -> Result<Condition> {
        if tokens.is_empty() {
            return Err(Error::parse("Missing condition after WHERE."));
        }
        let mut parser = Self { tokens, index: 0 };
        let condition = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(Error::parse(format!(
                "Unexpected token in condition: {}",
                token
            )));
        }
        Ok(condition)
    }

    fn parse_or(&mut self) -> Result<Condition> {
        let mut left = self.parse_and()?;
        while self.next_if_logical(LogicalOperator::Or) {
            let right = self.parse_and()?;
            left = Condition::or(left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Condition> {
        let mut left = self.parse_condition()?;
        while self.next_if_logical(LogicalOperator::And) {
            let right = self.parse_condition()?;
            left = Condition::and(left, right);
        }
        Ok(left)
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        if self.next_if(|t| t.is(TokenKind::Symbol, "(")).is_some() {
            let condition = self.parse_or()?;
            if self.next_if(|t| t.is(TokenKind::Symbol, ")")).is_none() {
                return Err(Error::parse("Expected ')' in condition."));
            }
            return Ok(condition);
        }

        let column = self.next_of(&[TokenKind::Identifier], "column name")?;
        let operator = self.next_of(&[TokenKind::ComparisonOperator], "comparison operator")?;
        let operator = Operator::from_str(&operator.text).ok_or_else(|| {
            Error::parse(format!("Unknown comparison operator: {}", operator))
        })?;
        let value = self.next_of(
            &[TokenKind::String, TokenKind::Number, TokenKind::Identifier],
            "value",
        )?;

        Ok(Condition::comparison(
            column.text.clone(),
            operator,
            unquote(&value.text),
        ))
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn next_if<F: Fn(&Token) -> bool>(&mut self, predicate: F) -> Option<&'a Token> {
        let token = self.peek().filter(|t| predicate(t))?;
        self.index += 1;
        Some(token)
    }

    fn next_if_logical(&mut self, operator: LogicalOperator) -> bool {
        let value = match operator {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
        };
        self.next_if(|t| t.is(TokenKind::LogicalOperator, value)).is_some()
    }

    /// Consumes the next token, which must be one of `kinds`
    fn next_of(&mut self, kinds: &[TokenKind], what: &str) -> Result<&'a Token> {
        match self.peek() {
            Some(token) if kinds.contains(&token.kind) => {
                self.index += 1;
                Ok(token)
            }
            Some(token) => Err(Error::parse(format!(
                "Expected {} in condition, found {}",
                what, token
            ))),
            None => Err(Error::parse(format!(
                "Incomplete condition, expected {}",
                what
            ))),
        }
    }
}

impl Condition {
    /// Evaluates the condition against one row
    ///
    /// A column that is not in the header makes its comparison false rather than
    /// failing the command.
    pub fn evaluate(&self, row: &[String], header: &[String]) -> bool {
        match self {
            Condition::Comparison {
                column,
                operator,
                value,
            } => find_column(header, column)
                .and_then(|i| row.get(i))
                .is_some_and(|cell| compare(cell, *operator, value)),
            Condition::Logical {
                operator,
                left,
                right,
            } => {
                let left = left.evaluate(row, header);
                let right = right.evaluate(row, header);
                match operator {
                    LogicalOperator::And => left && right,
                    LogicalOperator::Or => left || right,
                }
            }
        }
    }
}
