use crate::{
    error::{Error, Result},
    sql::types::{ID_COLUMN, NULL, Row},
};

/// Cell separator of the on-disk line format
pub const SEPARATOR: char = '\t';

/// In-memory form of a table: an ordered header followed by ordered rows
///
/// `header[0]` is always `id` once the table has any columns. A table created
/// without columns has an empty header and no rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        Self {
            name: name.into(),
            header,
            rows: Vec::new(),
        }
    }

    /// Decodes the stored lines of a table
    ///
    /// The first line is the header. Rows shorter than the header are padded
    /// with `NULL`.
    pub fn from_lines(name: impl Into<String>, lines: &[String]) -> Self {
        let mut lines = lines.iter();
        let header = match lines.next() {
            Some(line) if !line.is_empty() => split_line(line),
            _ => Vec::new(),
        };
        let rows = lines
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut row = split_line(line);
                if row.len() < header.len() {
                    row.resize(header.len(), NULL.to_string());
                }
                row
            })
            .collect();
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    /// Encodes the table back into lines; a header-less table has no lines at all
    pub fn to_lines(&self) -> Vec<String> {
        if self.header.is_empty() {
            return Vec::new();
        }
        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .map(|cells| cells.join(&SEPARATOR.to_string()))
            .collect()
    }

    pub fn has_columns(&self) -> bool {
        !self.header.is_empty()
    }

    /// Returns the header index of a column (case-insensitive)
    pub fn column_index(&self, column: &str) -> Result<usize> {
        find_column(&self.header, column).ok_or_else(|| {
            Error::schema(format!(
                "Column '{}' does not exist in table '{}'.",
                column, self.name
            ))
        })
    }

    /// Highest numeric id among the rows, 0 for an empty table
    pub fn max_id(&self) -> u64 {
        self.rows
            .iter()
            .filter_map(|row| row.first()?.trim().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
    }
}

/// Case-insensitive column lookup in a header
pub fn find_column(header: &[String], column: &str) -> Option<usize> {
    header.iter().position(|c| c.eq_ignore_ascii_case(column))
}

pub fn is_id_column(column: &str) -> bool {
    column.eq_ignore_ascii_case(ID_COLUMN)
}

fn split_line(line: &str) -> Vec<String> {
    line.split(SEPARATOR).map(str::to_string).collect()
}
