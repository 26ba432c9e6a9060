use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    sql::{
        executor::{Executor, ResultSet},
        parser::Parser,
        schema::Table,
    },
    storage::{IdMarks, Storage},
};

/// Session state threaded through every command: the active database and the
/// id high-water marks of its tables
#[derive(Debug, Default)]
pub struct Context {
    database: Option<String>,
    id_marks: IdMarks,
}

impl Context {
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Name of the active database, or a state error if none is selected
    pub fn require_database(&self) -> Result<String> {
        self.database.clone().ok_or_else(Error::no_database)
    }

    /// Makes `database` active and reloads its table list and id marks
    ///
    /// The mark of each table is the larger of its persisted mark and the
    /// highest id currently stored in it.
    pub fn switch_to<S: Storage>(&mut self, storage: &S, database: &str) -> Result<()> {
        let tables = storage.list_tables(database)?;
        let mut id_marks = storage.load_id_marks(database)?;
        id_marks.retain(|table, _| tables.contains(table));
        for table in &tables {
            let max_id = Table::from_lines(table.as_str(), &storage.read_table(database, table)?).max_id();
            let mark = id_marks.entry(table.clone()).or_default();
            *mark = (*mark).max(max_id);
        }
        info!(database, tables = tables.len(), "switched database");
        *self = Context {
            database: Some(database.to_string()),
            id_marks,
        };
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Context::default();
    }

    /// Next id for a row of `table`: one past the highest id ever handed out
    pub fn next_id(&self, table: &Table) -> Result<u64> {
        let mark = self.id_marks.get(&table.name).copied().unwrap_or(0);
        mark.max(table.max_id()).checked_add(1).ok_or_else(|| {
            Error::schema(format!("No ids left in table '{}'.", table.name))
        })
    }

    /// Records `id` as handed out and persists the marks
    pub fn record_id<S: Storage>(&mut self, storage: &mut S, table: &str, id: u64) -> Result<()> {
        let database = self.require_database()?;
        self.id_marks.insert(table.to_string(), id);
        storage.save_id_marks(&database, &self.id_marks)
    }

    /// Drops the id mark of a table so a table recreated under the same name
    /// starts again from id 1
    pub fn forget_table<S: Storage>(&mut self, storage: &mut S, table: &str) -> Result<()> {
        if self.id_marks.remove(table).is_some() {
            let database = self.require_database()?;
            storage.save_id_marks(&database, &self.id_marks)?;
        }
        Ok(())
    }
}

/// Statement session over a storage backend
///
/// Commands run strictly one at a time; callers sharing a session across
/// connections must serialise access to it.
pub struct Session<S: Storage> {
    storage: S,
    context: Context,
}

impl<S: Storage + 'static> Session<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            context: Context::default(),
        }
    }

    /// Parses and executes one statement
    pub fn execute(&mut self, text: &str) -> Result<ResultSet> {
        let command = Parser::new(text)?.parse()?;
        debug!(?command, "executing");
        <dyn Executor<S>>::build(command).execute(&mut self.context, &mut self.storage)
    }

    /// Executes one statement and renders the response text
    ///
    /// Success starts with `[OK]`, failure with `[ERROR]`.
    pub fn handle_command(&mut self, text: &str) -> String {
        if text.trim().is_empty() {
            return "[ERROR] Empty command received.".to_string();
        }
        match self.execute(text) {
            Ok(result) => result.to_string(),
            Err(err) => {
                debug!(%err, "command failed");
                format!("[ERROR] {}", err)
            }
        }
    }

    pub fn database(&self) -> Option<&str> {
        self.context.database()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
