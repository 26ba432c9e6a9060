use std::{
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    storage::{IdMarks, Storage},
};

/// Extension of table files
const TABLE_EXTENSION: &str = "tab";

/// File holding the persisted id high-water marks of a database
const ID_MARKS_FILE: &str = ".ids";

/// On-disk storage: one directory per database, one `<table>.tab` file per table
///
/// Cells are tab-separated, one row per line, header first. Table rewrites go
/// through a temporary file in the same directory that is then renamed over the
/// table, so a reader never sees a partially written table.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Opens the storage rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn database_dir(&self, database: &str) -> PathBuf {
        self.root.join(database)
    }

    fn table_path(&self, database: &str, table: &str) -> PathBuf {
        self.database_dir(database)
            .join(format!("{}.{}", table, TABLE_EXTENSION))
    }

    fn id_marks_path(&self, database: &str) -> PathBuf {
        self.database_dir(database).join(ID_MARKS_FILE)
    }

    /// Writes `bytes` to `path` by renaming a fully written temporary file over it
    fn replace_file(&self, database: &str, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.database_dir(database))?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        Ok(())
    }
}

fn encode_lines(lines: &[String]) -> Vec<u8> {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.into_bytes()
}

impl Storage for FileStorage {
    fn database_exists(&self, database: &str) -> Result<bool> {
        Ok(self.database_dir(database).is_dir())
    }

    fn create_database(&mut self, database: &str) -> Result<()> {
        fs::create_dir(self.database_dir(database))?;
        Ok(())
    }

    fn delete_database(&mut self, database: &str) -> Result<()> {
        let marks = self.id_marks_path(database);
        if marks.exists() {
            fs::remove_file(marks)?;
        }
        fs::remove_dir(self.database_dir(database))?;
        Ok(())
    }

    fn list_tables(&self, database: &str) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        for entry in fs::read_dir(self.database_dir(database))? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == TABLE_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    tables.push(stem.to_string());
                }
            }
        }
        tables.sort();
        Ok(tables)
    }

    fn table_exists(&self, database: &str, table: &str) -> Result<bool> {
        Ok(self.table_path(database, table).is_file())
    }

    fn create_table(&mut self, database: &str, table: &str, lines: &[String]) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.table_path(database, table))?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&encode_lines(lines))?;
        writer.flush()?;
        Ok(())
    }

    fn read_table(&self, database: &str, table: &str) -> Result<Vec<String>> {
        let path = self.table_path(database, table);
        if !path.is_file() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).inspect_err(|err| {
            warn!("unable to read table file {}: {}", path.display(), err);
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }

    fn write_table(&mut self, database: &str, table: &str, lines: &[String]) -> Result<()> {
        let path = self.table_path(database, table);
        if !path.is_file() {
            return Err(Error::schema(format!("Table '{}' does not exist.", table)));
        }
        debug!("rewriting {} ({} lines)", path.display(), lines.len());
        self.replace_file(database, &path, &encode_lines(lines))
    }

    fn delete_table(&mut self, database: &str, table: &str) -> Result<()> {
        fs::remove_file(self.table_path(database, table))?;
        Ok(())
    }

    fn load_id_marks(&self, database: &str) -> Result<IdMarks> {
        let path = self.id_marks_path(database);
        if !path.is_file() {
            return Ok(IdMarks::new());
        }
        Ok(bincode::deserialize(&fs::read(path)?)?)
    }

    fn save_id_marks(&mut self, database: &str, marks: &IdMarks) -> Result<()> {
        let bytes = bincode::serialize(marks)?;
        self.replace_file(database, &self.id_marks_path(database), &bytes)
    }
}
