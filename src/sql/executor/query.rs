use tracing::debug;

use crate::{
    error::Result,
    sql::{
        engine::Context,
        executor::{Executor, ResultSet, load_populated_table},
        parser::ast::{Condition, Projection},
    },
    storage::Storage,
};

/// Table scan executor (SELECT)
pub struct Scan {
    table: String,
    columns: Projection,
    condition: Option<Condition>,
}

impl Scan {
    pub fn new(table: String, columns: Projection, condition: Option<Condition>) -> Box<Self> {
        Box::new(Self {
            table,
            columns,
            condition,
        })
    }
}

impl<S: Storage> Executor<S> for Scan {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let (_, table) = load_populated_table(ctx, storage, &self.table)?;

        let indexes: Vec<usize> = match &self.columns {
            Projection::All => (0..table.header.len()).collect(),
            Projection::Columns(columns) => columns
                .iter()
                .map(|column| table.column_index(column))
                .collect::<Result<Vec<_>>>()?,
        };

        let columns = indexes.iter().map(|&i| table.header[i].clone()).collect();
        let rows: Vec<_> = table
            .rows
            .iter()
            .filter(|row| {
                self.condition
                    .as_ref()
                    .is_none_or(|condition| condition.evaluate(row, &table.header))
            })
            .map(|row| {
                indexes
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        debug!(table = %table.name, rows = rows.len(), "scanned table");
        Ok(ResultSet::Scan { columns, rows })
    }
}
