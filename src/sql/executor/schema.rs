use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    sql::{
        engine::Context,
        executor::{Executor, ResultSet, load_table},
        parser::ast::AlterAction,
        schema::{Table, find_column, is_id_column},
        types::{ID_COLUMN, NULL},
    },
    storage::Storage,
};

/// USE executor
pub struct UseDatabase {
    database: String,
}

impl UseDatabase {
    pub fn new(database: String) -> Box<Self> {
        Box::new(Self { database })
    }
}

impl<S: Storage> Executor<S> for UseDatabase {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        if !storage.database_exists(&self.database)? {
            return Err(Error::schema(format!(
                "Database '{}' does not exist.",
                self.database
            )));
        }
        ctx.switch_to(storage, &self.database)?;
        Ok(ResultSet::Use {
            database: self.database,
        })
    }
}

/// CREATE DATABASE executor
pub struct CreateDatabase {
    database: String,
}

impl CreateDatabase {
    pub fn new(database: String) -> Box<Self> {
        Box::new(Self { database })
    }
}

impl<S: Storage> Executor<S> for CreateDatabase {
    fn execute(self: Box<Self>, _ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        if storage.database_exists(&self.database)? {
            return Err(Error::schema(format!(
                "Database '{}' already exists.",
                self.database
            )));
        }
        storage.create_database(&self.database)?;
        info!(database = %self.database, "created database");
        Ok(ResultSet::CreateDatabase {
            database: self.database,
        })
    }
}

/// CREATE TABLE executor
pub struct CreateTable {
    table: String,
    columns: Vec<String>,
}

impl CreateTable {
    pub fn new(table: String, columns: Vec<String>) -> Box<Self> {
        Box::new(Self { table, columns })
    }
}

impl<S: Storage> Executor<S> for CreateTable {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let database = ctx.require_database()?;
        if storage.table_exists(&database, &self.table)? {
            return Err(Error::schema(format!(
                "Table '{}' already exists.",
                self.table
            )));
        }

        // a table without columns stays header-less until something is added
        let header = if self.columns.is_empty() {
            Vec::new()
        } else {
            std::iter::once(ID_COLUMN.to_string())
                .chain(self.columns)
                .collect()
        };
        let table = Table::new(self.table, header);
        storage.create_table(&database, &table.name, &table.to_lines())?;
        ctx.forget_table(storage, &table.name)?;
        info!(database, table = %table.name, columns = table.header.len(), "created table");
        Ok(ResultSet::CreateTable { table: table.name })
    }
}

/// DROP TABLE executor
pub struct DropTable {
    table: String,
}

impl DropTable {
    pub fn new(table: String) -> Box<Self> {
        Box::new(Self { table })
    }
}

impl<S: Storage> Executor<S> for DropTable {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let database = ctx.require_database()?;
        if !storage.table_exists(&database, &self.table)? {
            return Err(Error::schema(format!(
                "Table '{}' does not exist.",
                self.table
            )));
        }
        storage.delete_table(&database, &self.table)?;
        ctx.forget_table(storage, &self.table)?;
        info!(database, table = %self.table, "dropped table");
        Ok(ResultSet::DropTable { table: self.table })
    }
}

/// DROP DATABASE executor
///
/// Every table is removed before the database itself. Failures are collected
/// so one stuck table does not stop the others from being removed.
pub struct DropDatabase {
    database: String,
}

impl DropDatabase {
    pub fn new(database: String) -> Box<Self> {
        Box::new(Self { database })
    }
}

impl<S: Storage> Executor<S> for DropDatabase {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        if !storage.database_exists(&self.database)? {
            return Err(Error::schema(format!(
                "Database '{}' does not exist.",
                self.database
            )));
        }

        let mut failed = false;
        for table in storage.list_tables(&self.database)? {
            if let Err(err) = storage.delete_table(&self.database, &table) {
                warn!(database = %self.database, table, %err, "unable to delete table");
                failed = true;
            }
        }
        if !failed {
            if let Err(err) = storage.delete_database(&self.database) {
                warn!(database = %self.database, %err, "unable to delete database");
                failed = true;
            }
        }
        if failed {
            return Err(Error::Io(format!(
                "Could not delete some files in database '{}'.",
                self.database
            )));
        }

        if ctx.database() == Some(self.database.as_str()) {
            ctx.clear();
        }
        info!(database = %self.database, "dropped database");
        Ok(ResultSet::DropDatabase {
            database: self.database,
        })
    }
}

/// ALTER TABLE executor
pub struct Alter {
    table: String,
    action: AlterAction,
    column: String,
}

impl Alter {
    pub fn new(table: String, action: AlterAction, column: String) -> Box<Self> {
        Box::new(Self {
            table,
            action,
            column,
        })
    }
}

impl<S: Storage> Executor<S> for Alter {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let Alter {
            table,
            action,
            column,
        } = *self;
        let (database, mut table) = load_table(ctx, storage, &table)?;
        if is_id_column(&column) {
            return Err(Error::schema("Cannot alter the id column."));
        }

        match action {
            AlterAction::Add => {
                if find_column(&table.header, &column).is_some() {
                    return Err(Error::schema(format!(
                        "Column '{}' already exists in table '{}'.",
                        column, table.name
                    )));
                }
                if !table.has_columns() {
                    table.header.push(ID_COLUMN.to_string());
                }
                table.header.push(column);
            }
            AlterAction::Drop => {
                let index = table.column_index(&column)?;
                table.header.remove(index);
                for row in table.rows.iter_mut() {
                    if index < row.len() {
                        row.remove(index);
                    }
                }
            }
        }

        let width = table.header.len();
        for row in table.rows.iter_mut() {
            row.resize(width, NULL.to_string());
        }
        storage.write_table(&database, &table.name, &table.to_lines())?;
        info!(database, table = %table.name, ?action, "altered table");
        Ok(ResultSet::Alter { table: table.name })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{Error, Result},
        sql::engine::Session,
        storage::{Storage, memory::MemoryStorage},
    };

    fn session() -> Result<Session<MemoryStorage>> {
        let mut session = Session::new(MemoryStorage::new());
        session.execute("CREATE DATABASE shop;")?;
        session.execute("USE shop;")?;
        Ok(session)
    }

    fn stored(session: &Session<MemoryStorage>, table: &str) -> Result<Vec<String>> {
        session.storage().read_table("shop", table)
    }

    #[test]
    fn test_create_database_twice() -> Result<()> {
        let mut s = session()?;
        assert!(matches!(
            s.execute("CREATE DATABASE Shop;"),
            Err(Error::Schema(_))
        ));
        Ok(())
    }

    #[test]
    fn test_use_missing_database_keeps_current() -> Result<()> {
        let mut s = session()?;
        assert!(matches!(s.execute("USE nowhere;"), Err(Error::Schema(_))));
        assert_eq!(s.database(), Some("shop"));
        Ok(())
    }

    #[test]
    fn test_create_table() -> Result<()> {
        let mut s = session()?;
        s.execute("CREATE TABLE Items (name, Price);")?;
        assert_eq!(stored(&s, "items")?, vec!["id\tname\tPrice"]);
        s.execute("CREATE TABLE bare;")?;
        assert!(stored(&s, "bare")?.is_empty());
        assert!(s.storage().table_exists("shop", "bare")?);
        assert!(matches!(
            s.execute("CREATE TABLE items (a);"),
            Err(Error::Schema(_))
        ));
        Ok(())
    }

    #[test]
    fn test_drop_table() -> Result<()> {
        let mut s = session()?;
        s.execute("CREATE TABLE items (name);")?;
        s.execute("DROP TABLE ITEMS;")?;
        assert!(!s.storage().table_exists("shop", "items")?);
        assert!(matches!(
            s.execute("DROP TABLE items;"),
            Err(Error::Schema(_))
        ));
        Ok(())
    }

    #[test]
    fn test_drop_database() -> Result<()> {
        let mut s = session()?;
        s.execute("CREATE DATABASE other;")?;
        s.execute("DROP DATABASE other;")?;
        assert_eq!(s.database(), Some("shop"));
        assert!(matches!(
            s.execute("DROP DATABASE other;"),
            Err(Error::Schema(_))
        ));
        Ok(())
    }

    #[test]
    fn test_alter_add_and_drop() -> Result<()> {
        let mut s = session()?;
        s.execute("CREATE TABLE items (name);")?;
        s.execute("INSERT INTO items VALUES ('pen');")?;
        s.execute("ALTER TABLE items ADD price;")?;
        assert_eq!(stored(&s, "items")?, vec!["id\tname\tprice", "1\tpen\tNULL"]);

        s.execute("ALTER TABLE items DROP NAME;")?;
        assert_eq!(stored(&s, "items")?, vec!["id\tprice", "1\tNULL"]);
        Ok(())
    }

    #[test]
    fn test_alter_add_then_drop_restores_table() -> Result<()> {
        let mut s = session()?;
        s.execute("CREATE TABLE items (name, price);")?;
        s.execute("INSERT INTO items VALUES ('pen', 2);")?;
        s.execute("INSERT INTO items VALUES ('pad', 4);")?;
        let before = stored(&s, "items")?;

        s.execute("ALTER TABLE items ADD x;")?;
        assert_eq!(stored(&s, "items")?[2], "2\tpad\t4\tNULL");
        s.execute("ALTER TABLE items DROP X;")?;
        assert_eq!(stored(&s, "items")?, before);
        Ok(())
    }

    #[test]
    fn test_alter_errors() -> Result<()> {
        let mut s = session()?;
        s.execute("CREATE TABLE items (name);")?;
        for sql in [
            "ALTER TABLE items ADD Name;",
            "ALTER TABLE items DROP price;",
            "ALTER TABLE items DROP id;",
            "ALTER TABLE items ADD ID;",
            "ALTER TABLE missing ADD price;",
        ] {
            assert!(matches!(s.execute(sql), Err(Error::Schema(_))), "{}", sql);
        }
        assert_eq!(stored(&s, "items")?, vec!["id\tname"]);
        Ok(())
    }

    #[test]
    fn test_alter_headerless_table() -> Result<()> {
        let mut s = session()?;
        s.execute("CREATE TABLE bare;")?;
        s.execute("ALTER TABLE bare ADD name;")?;
        assert_eq!(stored(&s, "bare")?, vec!["id\tname"]);
        Ok(())
    }
}
