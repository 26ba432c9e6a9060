use std::cmp::Ordering;

use crate::sql::parser::{ast::Operator, lexer::is_number};

/// Placeholder stored in cells that have no value
pub const NULL: &str = "NULL";

/// Name of the implicit first column of every table
pub const ID_COLUMN: &str = "id";

/// A row is an ordered sequence of cells
pub type Row = Vec<String>;

/// Typed view of a cell or literal
///
/// Cells are stored untyped; whether a comparison is numeric or textual is decided
/// per comparison by looking at both operands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    Text(&'a str),
}

impl<'a> Value<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let raw = raw.trim();
        if is_number(raw) {
            if let Ok(n) = raw.parse() {
                return Value::Number(n);
            }
        }
        Value::Text(raw)
    }

    fn compare_numbers(a: f64, operator: Operator, b: f64) -> bool {
        let Some(ord) = a.partial_cmp(&b) else {
            return false;
        };
        match operator {
            Operator::Equal => ord == Ordering::Equal,
            Operator::NotEqual => ord != Ordering::Equal,
            Operator::GreaterThan => ord == Ordering::Greater,
            Operator::LessThan => ord == Ordering::Less,
            Operator::GreaterThanOrEqual => ord != Ordering::Less,
            Operator::LessThanOrEqual => ord != Ordering::Greater,
            Operator::Like => false,
        }
    }

    fn compare_text(a: &str, operator: Operator, b: &str) -> bool {
        let (a, b) = (a.to_lowercase(), b.to_lowercase());
        match operator {
            Operator::Equal => a == b,
            Operator::NotEqual => a != b,
            Operator::Like => a.contains(&b),
            _ => false,
        }
    }
}

/// Evaluates `cell operator literal`
///
/// Two numbers support every ordering operator; anything else compares as
/// case-insensitive text and supports `==`, `!=` and `LIKE` only. Unsupported
/// combinations are false.
pub fn compare(cell: &str, operator: Operator, literal: &str) -> bool {
    match (Value::parse(cell), Value::parse(literal)) {
        (Value::Number(a), Value::Number(b)) => Value::compare_numbers(a, operator, b),
        _ => Value::compare_text(cell.trim(), operator, literal),
    }
}

/// Strips one layer of surrounding single quotes, if present
pub fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(literal)
}

/// Join key equality: integers compare numerically, everything else as
/// case-insensitive text
pub fn join_keys_match(left: &str, right: &str) -> bool {
    let (left, right) = (left.trim(), right.trim());
    match (left.parse::<i64>(), right.parse::<i64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => left.eq_ignore_ascii_case(right),
    }
}

#[cfg(test)]
mod tests {
    use super::{Value, compare as cmp, join_keys_match, unquote};
    use crate::sql::parser::ast::Operator;

    #[test]
    fn test_value_parse() {
        assert_eq!(Value::parse(" 12 "), Value::Number(12.0));
        assert_eq!(Value::parse("-0.5"), Value::Number(-0.5));
        assert_eq!(Value::parse("12a"), Value::Text("12a"));
    }

    #[test]
    fn test_numeric_comparison() {
        assert!(cmp("1200", Operator::GreaterThan, "1000"));
        assert!(!cmp("800", Operator::GreaterThan, "1000"));
        // numeric, not lexicographic
        assert!(cmp("9", Operator::LessThan, "10"));
        assert!(cmp("10.0", Operator::Equal, "10"));
        assert!(cmp("-2.75", Operator::LessThanOrEqual, "-2.75"));
        assert!(cmp("+9.99", Operator::GreaterThanOrEqual, "9"));
        assert!(cmp("3", Operator::NotEqual, "4"));
        assert!(!cmp("3", Operator::Like, "3"));
    }

    #[test]
    fn test_text_comparison() {
        assert!(cmp("Laptop", Operator::Like, "lap"));
        assert!(!cmp("Phone", Operator::Like, "Lap"));
        assert!(cmp("Simon", Operator::Equal, "simon"));
        assert!(cmp("TRUE", Operator::Equal, "true"));
        assert!(cmp("Bob", Operator::NotEqual, "Alice"));
        assert!(!cmp("abc", Operator::GreaterThan, "abb"));
        // mixed number/text falls back to text
        assert!(!cmp("12", Operator::Equal, "twelve"));
        assert!(cmp("9.99kg", Operator::Like, "9"));
        // LIKE between two numbers is unsupported
        assert!(!cmp("12", Operator::Like, "1"));
        assert!(cmp("NULL", Operator::Equal, "null"));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("''"), "");
        assert_eq!(unquote("abc"), "abc");
        assert_eq!(unquote("'abc"), "'abc");
        assert_eq!(unquote("''x''"), "'x'");
    }

    #[test]
    fn test_join_keys_match() {
        assert!(join_keys_match("1", "01"));
        assert!(join_keys_match("Bob", "bob"));
        assert!(!join_keys_match("1", "1.0"));
        assert!(!join_keys_match("2", "3"));
    }
}
