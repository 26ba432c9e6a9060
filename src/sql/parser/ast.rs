use std::fmt::Display;

/// Parsed statement, one variant per statement form
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// USE statement
    Use { database: String },
    /// CREATE DATABASE statement
    CreateDatabase { database: String },
    /// CREATE TABLE statement, `columns` never contains `id`
    CreateTable { table: String, columns: Vec<String> },
    /// INSERT statement, values are raw literal tokens (quotes still attached)
    Insert { table: String, values: Vec<String> },
    /// ALTER TABLE ... ADD | DROP statement
    Alter {
        table: String,
        action: AlterAction,
        column: String,
    },
    /// DROP TABLE statement
    DropTable { table: String },
    /// DROP DATABASE statement
    DropDatabase { database: String },
    /// JOIN statement: equality join of `left.left_column` with `right.right_column`
    Join {
        left: String,
        right: String,
        left_column: String,
        right_column: String,
    },
    /// SELECT statement
    Select {
        table: String,
        columns: Projection,
        condition: Option<Condition>,
    },
    /// UPDATE statement, assignments keep the raw literal tokens
    Update {
        table: String,
        assignments: Vec<(String, String)>,
        condition: Option<Condition>,
    },
    /// DELETE statement
    Delete {
        table: String,
        condition: Option<Condition>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterAction {
    Add,
    Drop,
}

/// Column list of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

/// WHERE clause expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column operator value`, value stored without its surrounding quotes
    Comparison {
        column: String,
        operator: Operator,
        value: String,
    },
    /// Binary AND / OR node
    Logical {
        operator: LogicalOperator,
        left: Box<Condition>,
        right: Box<Condition>,
    },
}

impl Condition {
    pub fn comparison(column: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Condition::Comparison {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn and(left: Condition, right: Condition) -> Self {
        Condition::Logical {
            operator: LogicalOperator::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Condition, right: Condition) -> Self {
        Condition::Logical {
            operator: LogicalOperator::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

/// Comparison operators usable in a WHERE clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Like,
}

impl Operator {
    pub fn from_str(op: &str) -> Option<Operator> {
        Some(match op.to_uppercase().as_ref() {
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            ">" => Operator::GreaterThan,
            "<" => Operator::LessThan,
            ">=" => Operator::GreaterThanOrEqual,
            "<=" => Operator::LessThanOrEqual,
            "LIKE" => Operator::Like,
            _ => return None,
        })
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LessThanOrEqual => "<=",
            Operator::Like => "LIKE",
        })
    }
}
