use std::collections::BTreeMap;

use crate::{
    error::{Error, Result},
    storage::{IdMarks, Storage},
};

/// In-memory storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    databases: BTreeMap<String, MemoryDatabase>,
}

#[derive(Debug, Default)]
struct MemoryDatabase {
    tables: BTreeMap<String, Vec<String>>,
    id_marks: IdMarks,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn database(&self, database: &str) -> Result<&MemoryDatabase> {
        self.databases.get(database).ok_or_else(|| missing(database))
    }

    fn database_mut(&mut self, database: &str) -> Result<&mut MemoryDatabase> {
        self.databases
            .get_mut(database)
            .ok_or_else(|| missing(database))
    }
}

fn missing(database: &str) -> Error {
    Error::Io(format!("database directory '{}' not found", database))
}

impl Storage for MemoryStorage {
    fn database_exists(&self, database: &str) -> Result<bool> {
        Ok(self.databases.contains_key(database))
    }

    fn create_database(&mut self, database: &str) -> Result<()> {
        if self.databases.contains_key(database) {
            return Err(Error::Io(format!("database '{}' already exists", database)));
        }
        self.databases.insert(database.to_string(), MemoryDatabase::default());
        Ok(())
    }

    fn delete_database(&mut self, database: &str) -> Result<()> {
        if !self.database(database)?.tables.is_empty() {
            return Err(Error::Io(format!("database '{}' is not empty", database)));
        }
        self.databases.remove(database);
        Ok(())
    }

    fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        Ok(self.database(database)?.tables.keys().cloned().collect())
    }

    fn table_exists(&self, database: &str, table: &str) -> Result<bool> {
        Ok(self
            .databases
            .get(database)
            .is_some_and(|db| db.tables.contains_key(table)))
    }

    fn create_table(&mut self, database: &str, table: &str, lines: &[String]) -> Result<()> {
        let db = self.database_mut(database)?;
        if db.tables.contains_key(table) {
            return Err(Error::Io(format!("table file '{}' already exists", table)));
        }
        db.tables.insert(table.to_string(), lines.to_vec());
        Ok(())
    }

    fn read_table(&self, database: &str, table: &str) -> Result<Vec<String>> {
        Ok(self
            .databases
            .get(database)
            .and_then(|db| db.tables.get(table))
            .cloned()
            .unwrap_or_default())
    }

    fn write_table(&mut self, database: &str, table: &str, lines: &[String]) -> Result<()> {
        match self.database_mut(database)?.tables.get_mut(table) {
            Some(content) => {
                *content = lines.to_vec();
                Ok(())
            }
            None => Err(Error::schema(format!("Table '{}' does not exist.", table))),
        }
    }

    fn delete_table(&mut self, database: &str, table: &str) -> Result<()> {
        match self.database_mut(database)?.tables.remove(table) {
            Some(_) => Ok(()),
            None => Err(Error::Io(format!("table file '{}' not found", table))),
        }
    }

    fn load_id_marks(&self, database: &str) -> Result<IdMarks> {
        Ok(self.database(database)?.id_marks.clone())
    }

    fn save_id_marks(&mut self, database: &str, marks: &IdMarks) -> Result<()> {
        self.database_mut(database)?.id_marks = marks.clone();
        Ok(())
    }
}
