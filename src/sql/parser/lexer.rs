//! Statement lexer - splits text into raw tokens and classifies each one

use std::{fmt::Display, iter::Peekable, str::Chars};

use crate::error::{Error, Result};

/// Single-character tokens that always stand on their own
const SYMBOLS: [char; 8] = ['(', ')', ',', ';', '*', '=', '<', '>'];

/// Two-character operators, recognised before their one-character prefixes
const COMPOUND_OPERATORS: [&str; 4] = ["<=", ">=", "==", "!="];

/// Lexical kind of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Symbol,
    LogicalOperator,
    ComparisonOperator,
    Number,
    String,
    Identifier,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::LogicalOperator => "LOGICAL_OPERATOR",
            TokenKind::ComparisonOperator => "COMPARISON_OPERATOR",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Identifier => "IDENTIFIER",
        })
    }
}

/// A raw token together with its classified kind
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
}

impl Token {
    /// Classifies a raw token. The first matching rule wins:
    /// keyword, symbol, logical operator, comparison operator, number, string, identifier.
    pub fn classify(text: String) -> Result<Token> {
        let kind = if Keyword::from_str(&text).is_some() {
            TokenKind::Keyword
        } else if is_symbol(&text) {
            TokenKind::Symbol
        } else if is_logical_operator(&text) {
            TokenKind::LogicalOperator
        } else if is_comparison_operator(&text) {
            TokenKind::ComparisonOperator
        } else if is_number(&text) {
            TokenKind::Number
        } else if is_string(&text) {
            TokenKind::String
        } else if is_identifier(&text) {
            TokenKind::Identifier
        } else {
            return Err(Error::parse(format!("Invalid token detected: {}", text)));
        };
        Ok(Token { text, kind })
    }

    pub fn is(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.text.eq_ignore_ascii_case(value)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Reserved keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Use,
    Select,
    From,
    Where,
    Set,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Table,
    Database,
    Alter,
    Into,
    Values,
    Add,
    Join,
    On,
}

impl Keyword {
    /// Attempts to parse a string as a keyword (case-insensitive)
    pub fn from_str(ident: &str) -> Option<Keyword> {
        Some(match ident.to_uppercase().as_ref() {
            "USE" => Keyword::Use,
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "SET" => Keyword::Set,
            "INSERT" => Keyword::Insert,
            "UPDATE" => Keyword::Update,
            "DELETE" => Keyword::Delete,
            "CREATE" => Keyword::Create,
            "DROP" => Keyword::Drop,
            "TABLE" => Keyword::Table,
            "DATABASE" => Keyword::Database,
            "ALTER" => Keyword::Alter,
            "INTO" => Keyword::Into,
            "VALUES" => Keyword::Values,
            "ADD" => Keyword::Add,
            "JOIN" => Keyword::Join,
            "ON" => Keyword::On,
            _ => return None,
        })
    }

    /// Returns the uppercase string representation of the keyword
    pub fn to_str(&self) -> &str {
        match self {
            Keyword::Use => "USE",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::Set => "SET",
            Keyword::Insert => "INSERT",
            Keyword::Update => "UPDATE",
            Keyword::Delete => "DELETE",
            Keyword::Create => "CREATE",
            Keyword::Drop => "DROP",
            Keyword::Table => "TABLE",
            Keyword::Database => "DATABASE",
            Keyword::Alter => "ALTER",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Add => "ADD",
            Keyword::Join => "JOIN",
            Keyword::On => "ON",
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

fn is_symbol(token: &str) -> bool {
    matches!(token, "(" | ")" | "," | ";" | "*" | "=")
}

fn is_logical_operator(token: &str) -> bool {
    token.eq_ignore_ascii_case("AND") || token.eq_ignore_ascii_case("OR")
}

fn is_comparison_operator(token: &str) -> bool {
    matches!(token, ">" | "<" | ">=" | "<=" | "==" | "!=") || token.eq_ignore_ascii_case("LIKE")
}

/// Optional sign, one or more digits, optional fraction
pub fn is_number(token: &str) -> bool {
    let unsigned = token.strip_prefix(['+', '-']).unwrap_or(token);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    digits(whole) && fraction.is_none_or(digits)
}

fn is_string(token: &str) -> bool {
    token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'')
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits statement text into raw tokens
///
/// Quoted spans are kept verbatim (quotes included) as a single token. Outside of
/// quotes, compound operators and symbols become tokens of their own and everything
/// else is split on whitespace.
pub struct Lexer<'a> {
    iter: Peekable<Chars<'a>>,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scan().transpose()
    }
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given statement text
    pub fn new(text: &'a str) -> Self {
        Self {
            iter: text.chars().peekable(),
        }
    }

    /// Consumes the next character if it satisfies the predicate
    fn next_if<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<char> {
        self.iter.peek().filter(|&c| predicate(*c))?;
        self.iter.next()
    }

    /// Consumes consecutive characters while they satisfy the predicate
    fn next_while<F: Fn(char) -> bool>(&mut self, predicate: F) -> Option<String> {
        let mut value = String::new();
        while let Some(c) = self.next_if(&predicate) {
            value.push(c);
        }
        Some(value).filter(|v| !v.is_empty())
    }

    fn erase_whitespace(&mut self) {
        self.next_while(|c| c.is_whitespace());
    }

    /// Returns the compound operator starting at the cursor, without consuming it
    fn peek_compound(&self) -> Option<&'static str> {
        let mut ahead = self.iter.clone();
        let first = ahead.next()?;
        let second = ahead.next()?;
        COMPOUND_OPERATORS.into_iter().find(|op| {
            let mut chars = op.chars();
            chars.next() == Some(first) && chars.next() == Some(second)
        })
    }

    fn scan(&mut self) -> Result<Option<String>> {
        self.erase_whitespace();
        if let Some(op) = self.peek_compound() {
            self.iter.next();
            self.iter.next();
            return Ok(Some(op.to_string()));
        }
        match self.iter.peek() {
            Some('\'') => self.scan_string().map(Some),
            Some(c) if SYMBOLS.contains(c) => Ok(self.iter.next().map(String::from)),
            Some(_) => Ok(self.scan_word()),
            None => Ok(None),
        }
    }

    /// Scans a quoted literal, keeping both quotes
    fn scan_string(&mut self) -> Result<String> {
        let mut val = String::new();
        if let Some(open) = self.iter.next() {
            val.push(open);
        }
        loop {
            match self.iter.next() {
                Some('\'') => break,
                Some(c) => val.push(c),
                None => return Err(Error::parse("unterminated string literal")),
            }
        }
        val.push('\'');
        Ok(val)
    }

    /// Scans up to the next whitespace, quote, symbol or compound operator
    fn scan_word(&mut self) -> Option<String> {
        let mut val = String::new();
        while self.peek_compound().is_none() {
            match self.next_if(|c| !c.is_whitespace() && c != '\'' && !SYMBOLS.contains(&c)) {
                Some(c) => val.push(c),
                None => break,
            }
        }
        Some(val).filter(|v| !v.is_empty())
    }
}

/// Tokenizes and classifies a whole statement
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    Lexer::new(text)
        .map(|raw| raw.and_then(Token::classify))
        .collect()
}
