//! Table storage
//!
//! The executor only ever reads and writes whole tables through [`Storage`];
//! every operation is scoped to one database.

use std::collections::BTreeMap;

use crate::error::Result;

pub mod file;
pub mod memory;

/// Highest id ever handed out, per table
pub type IdMarks = BTreeMap<String, u64>;

/// Storage collaborator used by the executor
///
/// Tables are ordered lists of text lines: the header first, then one line per row.
pub trait Storage {
    fn database_exists(&self, database: &str) -> Result<bool>;
    fn create_database(&mut self, database: &str) -> Result<()>;
    /// Removes a database whose tables have already been deleted
    fn delete_database(&mut self, database: &str) -> Result<()>;
    /// Table names of a database, sorted
    fn list_tables(&self, database: &str) -> Result<Vec<String>>;

    fn table_exists(&self, database: &str, table: &str) -> Result<bool>;
    /// Creates a table holding `lines`; fails if it already exists
    fn create_table(&mut self, database: &str, table: &str, lines: &[String]) -> Result<()>;
    /// Reads every line of a table, or nothing if the table does not exist
    fn read_table(&self, database: &str, table: &str) -> Result<Vec<String>>;
    /// Replaces the whole content of an existing table
    fn write_table(&mut self, database: &str, table: &str, lines: &[String]) -> Result<()>;
    fn delete_table(&mut self, database: &str, table: &str) -> Result<()>;

    fn load_id_marks(&self, database: &str) -> Result<IdMarks>;
    fn save_id_marks(&mut self, database: &str, marks: &IdMarks) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::{IdMarks, Storage};
    use crate::{
        error::Result,
        storage::{file::FileStorage, memory::MemoryStorage},
    };

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|l| l.to_string()).collect()
    }

    fn test_database_lifecycle(mut store: impl Storage) -> Result<()> {
        assert!(!store.database_exists("shop")?);
        store.create_database("shop")?;
        assert!(store.database_exists("shop")?);
        assert!(store.create_database("shop").is_err());
        assert!(store.list_tables("shop")?.is_empty());

        store.create_table("shop", "items", &lines(&["id\tname"]))?;
        // a non-empty database cannot be removed
        assert!(store.delete_database("shop").is_err());
        store.delete_table("shop", "items")?;
        store.delete_database("shop")?;
        assert!(!store.database_exists("shop")?);
        Ok(())
    }

    fn test_table_content(mut store: impl Storage) -> Result<()> {
        store.create_database("shop")?;
        assert!(store.read_table("shop", "items")?.is_empty());
        assert!(store.write_table("shop", "items", &lines(&["id"])).is_err());

        store.create_table("shop", "items", &[])?;
        assert!(store.table_exists("shop", "items")?);
        assert!(store.read_table("shop", "items")?.is_empty());
        assert!(store.create_table("shop", "items", &[]).is_err());

        let content = lines(&["id\tname\tprice", "1\tLaptop\t1200", "2\t\t800"]);
        store.write_table("shop", "items", &content)?;
        assert_eq!(store.read_table("shop", "items")?, content);

        store.create_table("shop", "orders", &lines(&["id\titem"]))?;
        assert_eq!(store.list_tables("shop")?, vec!["items", "orders"]);

        store.delete_table("shop", "items")?;
        assert!(!store.table_exists("shop", "items")?);
        assert!(store.delete_table("shop", "items").is_err());
        Ok(())
    }

    fn test_id_marks(mut store: impl Storage) -> Result<()> {
        store.create_database("shop")?;
        assert!(store.load_id_marks("shop")?.is_empty());
        let mut marks = IdMarks::new();
        marks.insert("items".to_string(), 7);
        store.save_id_marks("shop", &marks)?;
        assert_eq!(store.load_id_marks("shop")?, marks);
        // id marks do not show up as tables
        assert!(store.list_tables("shop")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_memory() -> Result<()> {
        test_database_lifecycle(MemoryStorage::new())?;
        test_table_content(MemoryStorage::new())?;
        test_id_marks(MemoryStorage::new())?;
        Ok(())
    }

    #[test]
    fn test_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        test_database_lifecycle(FileStorage::new(dir.path().join("a"))?)?;
        test_table_content(FileStorage::new(dir.path().join("b"))?)?;
        test_id_marks(FileStorage::new(dir.path().join("c"))?)?;

        // database with persisted id marks can still be deleted
        let mut store = FileStorage::new(dir.path().join("c"))?;
        store.delete_database("shop")?;
        assert!(!store.database_exists("shop")?);
        Ok(())
    }
}
