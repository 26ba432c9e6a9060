use tracing::debug;

use crate::{
    error::Result,
    sql::{
        engine::Context,
        executor::{Executor, ResultSet, load_populated_table},
        types::join_keys_match,
    },
    storage::Storage,
};

/// JOIN executor: nested-loop equality join of two tables
///
/// The result header is `id`, then the remaining columns of the left table
/// (without its id and join column) prefixed `left.`, then the columns of the
/// right table without its join column, prefixed `right.`. Each joined row keeps
/// the id of its left row.
pub struct Join {
    left: String,
    right: String,
    left_column: String,
    right_column: String,
}

impl Join {
    pub fn new(left: String, right: String, left_column: String, right_column: String) -> Box<Self> {
        Box::new(Self {
            left,
            right,
            left_column,
            right_column,
        })
    }
}

impl<S: Storage> Executor<S> for Join {
    fn execute(self: Box<Self>, ctx: &mut Context, storage: &mut S) -> Result<ResultSet> {
        let (_, left) = load_populated_table(ctx, storage, &self.left)?;
        let (_, right) = load_populated_table(ctx, storage, &self.right)?;
        let left_key = left.column_index(&self.left_column)?;
        let right_key = right.column_index(&self.right_column)?;

        let left_kept: Vec<usize> = (1..left.header.len()).filter(|&i| i != left_key).collect();
        let right_kept: Vec<usize> = (0..right.header.len()).filter(|&i| i != right_key).collect();

        let mut columns = vec![left.header[0].clone()];
        columns.extend(left_kept.iter().map(|&i| format!("{}.{}", left.name, left.header[i])));
        columns.extend(right_kept.iter().map(|&i| format!("{}.{}", right.name, right.header[i])));

        let mut rows = Vec::new();
        for l in &left.rows {
            for r in &right.rows {
                if !join_keys_match(&l[left_key], &r[right_key]) {
                    continue;
                }
                let mut row = vec![l[0].clone()];
                row.extend(left_kept.iter().map(|&i| l[i].clone()));
                row.extend(right_kept.iter().map(|&i| r[i].clone()));
                rows.push(row);
            }
        }

        debug!(left = %left.name, right = %right.name, rows = rows.len(), "joined tables");
        Ok(ResultSet::Scan { columns, rows })
    }
}
