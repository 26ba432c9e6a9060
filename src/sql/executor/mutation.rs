use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        engine::Context,
        executor::{Executor, ResultSet, load_populated_table, load_table},
        parser::ast::Condition,
        schema::{find_column, is_id_column},
        types::{ID_COLUMN, unquote},
    },
    storage::Storage,
};

/// Unquotes a literal for storage; cells may not contain line or cell separators
fn cell_value(literal: &str) -> Result<String> {
    let value = unquote(literal);
    if value.contains(['\t', '\n', '\r']) {
        return Err(Error::schema(format!(
            "Value {} contains a tab or line break.",
            literal
        )));
    }
    Ok(value.to_string())
}

/// INSERT executor
pub struct Insert {
    table: String,
    values: Vec<String>,
}

impl Insert {
    pub fn new(table: String, values: Vec<String>) -> Box<Self> {
        Box::new(Self { table, values })
    }
}

impl<S: Storage> Executor<S> for Insert {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let (database, mut table) = load_table(ctx, storage, &self.table)?;
        let values = self
            .values
            .iter()
            .map(|value| cell_value(value))
            .collect::<Result<Vec<_>>>()?;

        // a header-less table takes its column names from the first insert
        if !table.has_columns() {
            let mut header = vec![ID_COLUMN.to_string()];
            for value in &values {
                if is_id_column(value) || find_column(&header, value).is_some() {
                    return Err(Error::schema(format!("Invalid column name: {}", value)));
                }
                header.push(value.clone());
            }
            table.header = header;
        }

        let expected = table.header.len() - 1;
        if values.len() != expected {
            return Err(Error::schema(format!(
                "Column count mismatch: expected {} values, got {}.",
                expected,
                values.len()
            )));
        }

        let id = ctx.next_id(&table)?;
        let mut row = Vec::with_capacity(table.header.len());
        row.push(id.to_string());
        row.extend(values);
        table.rows.push(row);

        // the mark is persisted before the row that uses it
        ctx.record_id(storage, &table.name, id)?;
        storage.write_table(&database, &table.name, &table.to_lines())?;
        debug!(database, table = %table.name, id, "inserted row");
        Ok(ResultSet::Insert {
            table: table.name,
            id,
        })
    }
}

/// UPDATE executor
pub struct Update {
    table: String,
    assignments: Vec<(String, String)>,
    condition: Option<Condition>,
}

impl Update {
    pub fn new(
        table: String,
        assignments: Vec<(String, String)>,
        condition: Option<Condition>,
    ) -> Box<Self> {
        Box::new(Self {
            table,
            assignments,
            condition,
        })
    }
}

impl<S: Storage> Executor<S> for Update {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let (database, mut table) = load_populated_table(ctx, storage, &self.table)?;

        let mut assignments = Vec::with_capacity(self.assignments.len());
        for (column, value) in &self.assignments {
            if is_id_column(column) {
                return Err(Error::schema("Cannot update the id column."));
            }
            assignments.push((table.column_index(column)?, cell_value(value)?));
        }

        let mut count = 0;
        for row in table.rows.iter_mut() {
            if let Some(condition) = &self.condition {
                if !condition.evaluate(row, &table.header) {
                    continue;
                }
            }
            for (index, value) in &assignments {
                row[*index] = value.clone();
            }
            count += 1;
        }

        storage.write_table(&database, &table.name, &table.to_lines())?;
        debug!(database, table = %table.name, count, "updated rows");
        Ok(ResultSet::Update { count })
    }
}

/// DELETE executor
///
/// A DELETE without a WHERE clause matches no rows.
pub struct Delete {
    table: String,
    condition: Option<Condition>,
}

impl Delete {
    pub fn new(table: String, condition: Option<Condition>) -> Box<Self> {
        Box::new(Self { table, condition })
    }
}

impl<S: Storage> Executor<S> for Delete {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let (database, mut table) = load_populated_table(ctx, storage, &self.table)?;

        let before = table.rows.len();
        if let Some(condition) = &self.condition {
            let header = &table.header;
            table.rows.retain(|row| !condition.evaluate(row, header));
        }
        let count = before - table.rows.len();

        storage.write_table(&database, &table.name, &table.to_lines())?;
        debug!(database, table = %table.name, count, "deleted rows");
        Ok(ResultSet::Delete { count })
    }
}
