use std::fmt::Display;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{
            join::Join,
            mutation::{Delete, Insert, Update},
            query::Scan,
            schema::{Alter, CreateDatabase, CreateTable, DropDatabase, DropTable, UseDatabase},
        },
        engine::Context,
        parser::ast::Command,
        schema::{SEPARATOR, Table},
        types::Row,
    },
    storage::Storage,
};

mod join;
mod mutation;
mod query;
mod schema;

/// Statement executor
pub trait Executor<S: Storage> {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet>;
}

impl<S: Storage + 'static> dyn Executor<S> {
    pub fn build(command: Command) -> Box<dyn Executor<S>> {
        match command {
            Command::Use { database } => UseDatabase::new(database),
            Command::CreateDatabase { database } => CreateDatabase::new(database),
            Command::CreateTable { table, columns } => CreateTable::new(table, columns),
            Command::DropTable { table } => DropTable::new(table),
            Command::DropDatabase { database } => DropDatabase::new(database),
            Command::Alter {
                table,
                action,
                column,
            } => Alter::new(table, action, column),
            Command::Insert { table, values } => Insert::new(table, values),
            Command::Select {
                table,
                columns,
                condition,
            } => Scan::new(table, columns, condition),
            Command::Update {
                table,
                assignments,
                condition,
            } => Update::new(table, assignments, condition),
            Command::Delete { table, condition } => Delete::new(table, condition),
            Command::Join {
                left,
                right,
                left_column,
                right_column,
            } => Join::new(left, right, left_column, right_column),
        }
    }
}

/// Execution result
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    Use { database: String },
    CreateDatabase { database: String },
    CreateTable { table: String },
    DropTable { table: String },
    DropDatabase { database: String },
    Alter { table: String },
    Insert { table: String, id: u64 },
    Update { count: usize },
    Delete { count: usize },
    Scan { columns: Vec<String>, rows: Vec<Row> },
}

/// Response text: `[OK]`, followed by the header and rows for a scan
impl Display for ResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[OK]")?;
        if let ResultSet::Scan { columns, rows } = self {
            let separator = SEPARATOR.to_string();
            write!(f, "\n{}", columns.join(&separator))?;
            for row in rows {
                write!(f, "\n{}", row.join(&separator))?;
            }
        }
        Ok(())
    }
}

/// Loads a table of the active database
///
/// Fails when no database is selected or the table does not exist.
fn load_table<S: Storage>(ctx: &Context, storage: &S, table: &str) -> Result<(String, Table)> {
    let database = ctx.require_database()?;
    if !storage.table_exists(&database, table)? {
        return Err(Error::schema(format!("Table '{}' does not exist.", table)));
    }
    let lines = storage.read_table(&database, table)?;
    Ok((database, Table::from_lines(table, &lines)))
}

/// Like [`load_table`], but the table must also have a header
fn load_populated_table<S: Storage>(
    ctx: &Context,
    storage: &S,
    table: &str,
) -> Result<(String, Table)> {
    let (database, table) = load_table(ctx, storage, table)?;
    if !table.has_columns() {
        return Err(Error::schema(format!("Table '{}' is empty.", table.name)));
    }
    Ok((database, table))
}
