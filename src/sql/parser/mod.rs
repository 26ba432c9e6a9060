use crate::error::{Error, Result};
use ast::{AlterAction, Command, Condition, Projection};
use condition::ConditionParser;
use lexer::{Keyword, Token, TokenKind};

pub mod ast;
pub mod condition;
pub mod lexer;

/// Statement parser - turns classified tokens into a [`Command`]
///
/// One recursive-descent routine per statement keyword. Database and table
/// names are folded to lower case; column names keep their case.
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// Tokenizes and classifies the statement text
    pub fn new(input: &str) -> Result<Self> {
        Ok(Parser {
            tokens: lexer::tokenize(input)?,
            index: 0,
        })
    }

    /// Parses the statement; it must end with `;` and nothing may follow it
    pub fn parse(mut self) -> Result<Command> {
        let command = self.parse_statement()?;
        if !self.match_tokens(TokenKind::Symbol, &[";"]) {
            return Err(Error::parse("Missing semicolon at the end."));
        }
        if let Some(token) = self.peek() {
            return Err(Error::parse(format!(
                "Unexpected token after semicolon: {}",
                token
            )));
        }
        Ok(command)
    }

    fn parse_statement(&mut self) -> Result<Command> {
        let keyword = match self.peek() {
            Some(token) if token.kind == TokenKind::Keyword => Keyword::from_str(&token.text),
            _ => None,
        };
        match keyword {
            Some(Keyword::Use) => self.parse_use(),
            Some(Keyword::Create) => self.parse_create(),
            Some(Keyword::Drop) => self.parse_drop(),
            Some(Keyword::Alter) => self.parse_alter(),
            Some(Keyword::Insert) => self.parse_insert(),
            Some(Keyword::Select) => self.parse_select(),
            Some(Keyword::Update) => self.parse_update(),
            Some(Keyword::Delete) => self.parse_delete(),
            Some(Keyword::Join) => self.parse_join(),
            _ => Err(Error::parse("Unknown or invalid command.")),
        }
    }

    /// USE name ;
    fn parse_use(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["USE"])?;
        let database = self.next_name()?;
        Ok(Command::Use { database })
    }

    /// CREATE DATABASE name ; | CREATE TABLE name [ ( column (, column)* ) ] ;
    fn parse_create(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["CREATE"])?;
        if self.match_tokens(TokenKind::Keyword, &["DATABASE"]) {
            let database = self.next_name()?;
            return Ok(Command::CreateDatabase { database });
        }
        if !self.match_tokens(TokenKind::Keyword, &["TABLE"]) {
            return Err(Error::parse("Expected DATABASE or TABLE after CREATE."));
        }

        let table = self.next_name()?;
        let mut columns: Vec<String> = Vec::new();
        if self.match_tokens(TokenKind::Symbol, &["("]) {
            loop {
                let column = self.expect(&[TokenKind::Identifier])?;
                if columns.iter().any(|c| c.eq_ignore_ascii_case(&column)) {
                    return Err(Error::schema(format!("Duplicate column name: {}", column)));
                }
                columns.push(column);
                if !self.match_tokens(TokenKind::Symbol, &[","]) {
                    break;
                }
            }
            self.expect_value(TokenKind::Symbol, &[")"])?;
        }
        columns.retain(|c| !c.eq_ignore_ascii_case("id"));
        Ok(Command::CreateTable { table, columns })
    }

    /// DROP TABLE name ; | DROP DATABASE name ;
    fn parse_drop(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["DROP"])?;
        let target = self.expect(&[TokenKind::Keyword])?;
        match Keyword::from_str(&target) {
            Some(Keyword::Table) => Ok(Command::DropTable {
                table: self.next_name()?,
            }),
            Some(Keyword::Database) => Ok(Command::DropDatabase {
                database: self.next_name()?,
            }),
            _ => Err(Error::parse("Expected TABLE or DATABASE in DROP command.")),
        }
    }

    /// ALTER TABLE name (ADD | DROP) column ;
    fn parse_alter(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["ALTER"])?;
        self.expect_value(TokenKind::Keyword, &["TABLE"])?;
        let table = self.next_name()?;
        let action = if self.match_tokens(TokenKind::Keyword, &["ADD"]) {
            AlterAction::Add
        } else if self.match_tokens(TokenKind::Keyword, &["DROP"]) {
            AlterAction::Drop
        } else {
            return Err(Error::parse("Expected ADD or DROP in ALTER TABLE."));
        };
        let column = self.expect(&[TokenKind::Identifier])?;
        Ok(Command::Alter {
            table,
            action,
            column,
        })
    }

    /// INSERT INTO name VALUES ( literal (, literal)* ) ;
    fn parse_insert(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["INSERT"])?;
        self.expect_value(TokenKind::Keyword, &["INTO"])?;
        let table = self.next_name()?;
        self.expect_value(TokenKind::Keyword, &["VALUES"])?;
        self.expect_value(TokenKind::Symbol, &["("])?;
        let mut values = Vec::new();
        loop {
            values.push(self.expect_literal()?);
            if !self.match_tokens(TokenKind::Symbol, &[","]) {
                break;
            }
        }
        self.expect_value(TokenKind::Symbol, &[")"])?;
        Ok(Command::Insert { table, values })
    }

    /// SELECT (* | column (, column)*) FROM name [WHERE condition] ;
    fn parse_select(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["SELECT"])?;
        let columns = if self.match_tokens(TokenKind::Symbol, &["*"]) {
            Projection::All
        } else {
            let mut columns = Vec::new();
            loop {
                columns.push(self.expect(&[TokenKind::Identifier])?);
                if !self.match_tokens(TokenKind::Symbol, &[","]) {
                    break;
                }
            }
            Projection::Columns(columns)
        };
        self.expect_value(TokenKind::Keyword, &["FROM"])?;
        let table = self.next_name()?;
        let condition = self.parse_where_clause()?;
        Ok(Command::Select {
            table,
            columns,
            condition,
        })
    }

    /// UPDATE name SET column = literal (, column = literal)* [WHERE condition] ;
    fn parse_update(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["UPDATE"])?;
        let table = self.next_name()?;
        if table == "id" {
            return Err(Error::parse("Cannot update ID column."));
        }
        self.expect_value(TokenKind::Keyword, &["SET"])?;
        let mut assignments = Vec::new();
        loop {
            let column = self.expect(&[TokenKind::Identifier])?;
            self.expect_value(TokenKind::Symbol, &["="])?;
            let value = self.expect_literal()?;
            assignments.push((column, value));
            if !self.match_tokens(TokenKind::Symbol, &[","]) {
                break;
            }
        }
        let condition = self.parse_where_clause()?;
        Ok(Command::Update {
            table,
            assignments,
            condition,
        })
    }

    /// DELETE FROM name [WHERE condition] ;
    fn parse_delete(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["DELETE"])?;
        self.expect_value(TokenKind::Keyword, &["FROM"])?;
        let table = self.next_name()?;
        let condition = self.parse_where_clause()?;
        Ok(Command::Delete { table, condition })
    }

    /// JOIN name AND name ON column AND column ;
    fn parse_join(&mut self) -> Result<Command> {
        self.expect_value(TokenKind::Keyword, &["JOIN"])?;
        let left = self.next_name()?;
        self.expect_value(TokenKind::LogicalOperator, &["AND"])?;
        let right = self.next_name()?;
        self.expect_value(TokenKind::Keyword, &["ON"])?;
        let left_column = self.expect(&[TokenKind::Identifier])?;
        self.expect_value(TokenKind::LogicalOperator, &["AND"])?;
        let right_column = self.expect(&[TokenKind::Identifier])?;
        Ok(Command::Join {
            left,
            right,
            left_column,
            right_column,
        })
    }

    /// Parses an optional WHERE clause
    ///
    /// The clause is every token up to the terminating `;`, with parentheses
    /// balanced; the slice is handed to the condition parser.
    fn parse_where_clause(&mut self) -> Result<Option<Condition>> {
        if !self.match_tokens(TokenKind::Keyword, &["WHERE"]) {
            return Ok(None);
        }
        let start = self.index;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.kind == TokenKind::Symbol {
                match token.text.as_str() {
                    ";" => break,
                    "(" => depth += 1,
                    ")" => {
                        depth = depth.checked_sub(1).ok_or_else(|| {
                            Error::parse("Unmatched closing parenthesis.")
                        })?
                    }
                    _ => {}
                }
            }
            self.index += 1;
        }
        if depth > 0 {
            return Err(Error::parse("Unmatched opening parenthesis."));
        }
        ConditionParser::parse(&self.tokens[start..self.index]).map(Some)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Consumes the next token only if it has `kind` and one of `values`
    fn match_tokens(&mut self, kind: TokenKind, values: &[&str]) -> bool {
        let matched = self
            .peek()
            .is_some_and(|t| values.iter().any(|v| t.is(kind, v)));
        if matched {
            self.index += 1;
        }
        matched
    }

    /// Consumes the next token, failing unless its kind is one of `kinds`
    ///
    /// `*` and the literals TRUE / FALSE are accepted whatever is expected; the
    /// latter are returned upper-cased.
    fn expect(&mut self, kinds: &[TokenKind]) -> Result<String> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| Error::parse("Unexpected end of command."))?;
        self.index += 1;

        if token.text == "*" {
            return Ok(token.text);
        }
        if token.text.eq_ignore_ascii_case("TRUE") || token.text.eq_ignore_ascii_case("FALSE") {
            return Ok(token.text.to_uppercase());
        }
        if kinds.contains(&token.kind) {
            return Ok(token.text);
        }
        Err(Error::parse(format!("Unexpected token: {}", token)))
    }

    /// Consumes the next token, which must have `kind` and one of `values`
    fn expect_value(&mut self, kind: TokenKind, values: &[&str]) -> Result<()> {
        let token = self.peek().cloned().ok_or_else(|| {
            Error::parse(format!(
                "Expected {}, found end of command.",
                values.join(" or ")
            ))
        })?;
        self.index += 1;
        if token.kind != kind {
            return Err(Error::parse(format!(
                "Expected {} but found {} ({})",
                kind, token.kind, token
            )));
        }
        if values.iter().any(|v| token.text.eq_ignore_ascii_case(v)) {
            return Ok(());
        }
        Err(Error::parse(format!("Unexpected value: {}", token)))
    }

    /// Database or table name, folded to lower case
    fn next_name(&mut self) -> Result<String> {
        Ok(self.expect(&[TokenKind::Identifier])?.to_lowercase())
    }

    /// Literal value of INSERT / SET, quotes kept
    fn expect_literal(&mut self) -> Result<String> {
        self.expect(&[TokenKind::String, TokenKind::Number, TokenKind::Identifier])
    }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::{
        error::{Error, Result},
        sql::parser::ast::{AlterAction, Command, Condition, Operator, Projection},
    };

    fn parse(sql: &str) -> Result<Command> {
        Parser::new(sql)?.parse()
    }

    fn assert_parse_error(sql: &str) {
        assert!(
            matches!(parse(sql), Err(Error::Parse(_))),
            "expected parse error for {:?}",
            sql
        );
    }

    #[test]
    fn test_parser_use_and_create_database() -> Result<()> {
        assert_eq!(
            parse("USE Shop;")?,
            Command::Use {
                database: "shop".to_string()
            }
        );
        assert_eq!(
            parse("create database shop ;")?,
            Command::CreateDatabase {
                database: "shop".to_string()
            }
        );
        assert_parse_error("USE shop");
        assert_parse_error("USE select;");
        Ok(())
    }

    #[test]
    fn test_parser_create_table() -> Result<()> {
        assert_eq!(
            parse("CREATE TABLE marks (name, mark, pass);")?,
            Command::CreateTable {
                table: "marks".to_string(),
                columns: vec!["name".into(), "mark".into(), "pass".into()],
            }
        );
        assert_eq!(
            parse("CREATE TABLE t (id, Name);")?,
            Command::CreateTable {
                table: "t".to_string(),
                columns: vec!["Name".into()],
            }
        );
        assert_eq!(
            parse("CREATE TABLE empty;")?,
            Command::CreateTable {
                table: "empty".to_string(),
                columns: vec![],
            }
        );
        assert!(matches!(
            parse("CREATE TABLE students (name, age, NAME);"),
            Err(Error::Schema(_))
        ));
        assert_parse_error("CREATE TABLE t (a, b;");
        assert_parse_error("CREATE INDEX t;");
        Ok(())
    }

    #[test]
    fn test_parser_drop_and_alter() -> Result<()> {
        assert_eq!(
            parse("DROP TABLE Marks;")?,
            Command::DropTable {
                table: "marks".to_string()
            }
        );
        assert_eq!(
            parse("DROP DATABASE shop;")?,
            Command::DropDatabase {
                database: "shop".to_string()
            }
        );
        assert_eq!(
            parse("ALTER TABLE students ADD grade;")?,
            Command::Alter {
                table: "students".to_string(),
                action: AlterAction::Add,
                column: "grade".to_string(),
            }
        );
        assert_eq!(
            parse("alter table students drop age;")?,
            Command::Alter {
                table: "students".to_string(),
                action: AlterAction::Drop,
                column: "age".to_string(),
            }
        );
        assert_parse_error("DROP INDEX x;");
        assert_parse_error("ALTER TABLE t RENAME a;");
        Ok(())
    }

    #[test]
    fn test_parser_insert() -> Result<()> {
        assert_eq!(
            parse("INSERT INTO marks VALUES ('Simon', 65, true, -2.75, NULL);")?,
            Command::Insert {
                table: "marks".to_string(),
                values: vec![
                    "'Simon'".into(),
                    "65".into(),
                    "TRUE".into(),
                    "-2.75".into(),
                    "NULL".into()
                ],
            }
        );
        assert_parse_error("INSERT INTO marks VALUES ();");
        assert_parse_error("INSERT INTO marks VALUES ('a', );");
        assert_parse_error("INSERT INTO marks ('a');");
        Ok(())
    }

    #[test]
    fn test_parser_select() -> Result<()> {
        assert_eq!(
            parse("SELECT * FROM marks;")?,
            Command::Select {
                table: "marks".to_string(),
                columns: Projection::All,
                condition: None,
            }
        );
        assert_eq!(
            parse("SELECT name, mark FROM marks WHERE (pass == TRUE);")?,
            Command::Select {
                table: "marks".to_string(),
                columns: Projection::Columns(vec!["name".into(), "mark".into()]),
                condition: Some(Condition::comparison("pass", Operator::Equal, "TRUE")),
            }
        );
        assert_parse_error("SELECT * FROM marks");
        assert_parse_error("SELECT * FROM marks; SELECT");
        assert_parse_error("SELECT FROM marks;");
        assert_parse_error("SELECT * FROM marks WHERE;");
        assert_parse_error("SELECT * FROM marks WHERE a == 1);");
        assert_parse_error("SELECT * FROM marks WHERE (a == 1;");
        Ok(())
    }

    #[test]
    fn test_parser_update() -> Result<()> {
        assert_eq!(
            parse("UPDATE marks SET mark = 38, name='Rob' WHERE name == 'Bob';")?,
            Command::Update {
                table: "marks".to_string(),
                assignments: vec![
                    ("mark".into(), "38".into()),
                    ("name".into(), "'Rob'".into())
                ],
                condition: Some(Condition::comparison("name", Operator::Equal, "Bob")),
            }
        );
        assert_parse_error("UPDATE id SET a = 1;");
        assert_parse_error("UPDATE marks SET mark == 1;");
        assert_parse_error("UPDATE marks SET;");
        Ok(())
    }

    #[test]
    fn test_parser_delete_and_join() -> Result<()> {
        assert_eq!(
            parse("DELETE FROM marks WHERE mark < 40;")?,
            Command::Delete {
                table: "marks".to_string(),
                condition: Some(Condition::comparison("mark", Operator::LessThan, "40")),
            }
        );
        assert_eq!(
            parse("DELETE FROM marks;")?,
            Command::Delete {
                table: "marks".to_string(),
                condition: None,
            }
        );
        assert_eq!(
            parse("JOIN coursework AND marks ON submission AND id;")?,
            Command::Join {
                left: "coursework".to_string(),
                right: "marks".to_string(),
                left_column: "submission".to_string(),
                right_column: "id".to_string(),
            }
        );
        assert_parse_error("JOIN a OR b ON x AND y;");
        assert_parse_error("JOIN a AND b ON x;");
        Ok(())
    }

    #[test]
    fn test_parser_unknown_command() {
        assert_parse_error("GRANT ALL;");
        assert_parse_error("FROM t;");
    }
}
