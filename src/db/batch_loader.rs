//! Batch Loader - transactional multi-row inserts
//!
//! Knows nothing about dimensions or facts: a batch of [`WarehouseRecord`]s
//! is written inside one transaction and either fully committed or fully
//! rolled back.

use crate::error::{EtlError, Result};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

/// Upper bound on bound parameters per statement (SQLite's default limit).
const MAX_BIND_PARAMS: usize = 32_766;

/// Rows per `INSERT` statement, before the parameter limit kicks in.
const MAX_ROWS_PER_STATEMENT: usize = 500;

/// A row that can be written to a warehouse table.
pub trait WarehouseRecord {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Values in `COLUMNS` order.
    fn values(&self) -> Vec<Value>;
}

pub struct BatchLoader<'c> {
    conn: &'c mut Connection,
}

impl<'c> BatchLoader<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    /// Inserts `rows` into `R::TABLE` as one transaction.
    ///
    /// On failure nothing from the batch remains and the error carries
    /// `batch_index`. An empty batch is a no-op.
    pub fn load<R: WarehouseRecord>(&mut self, batch_index: usize, rows: &[R]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let fail = |source: rusqlite::Error| EtlError::BatchInsert {
            table: R::TABLE,
            batch_index,
            source,
        };

        // Dropping an uncommitted transaction rolls it back.
        let tx = self.conn.transaction().map_err(fail)?;
        let group_size = rows_per_statement(R::COLUMNS.len());
        for group in rows.chunks(group_size) {
            let sql = insert_sql(R::TABLE, R::COLUMNS, group.len());
            let mut stmt = tx.prepare_cached(&sql).map_err(fail)?;
            stmt.execute(params_from_iter(group.iter().flat_map(R::values)))
                .map_err(fail)?;
        }
        tx.commit().map_err(fail)?;

        debug!(
            "Committed batch {} into {} ({} rows, {} per statement)",
            batch_index,
            R::TABLE,
            rows.len(),
            group_size
        );
        Ok(rows.len())
    }
}

fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMS / column_count.max(1)).clamp(1, MAX_ROWS_PER_STATEMENT)
}

fn insert_sql(table: &str, columns: &[&str], row_count: usize) -> String {
    let tuple = format!("({})", vec!["?"; columns.len()].join(", "));
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        table,
        columns.join(", "),
        vec![tuple.as_str(); row_count].join(", ")
    )
}
