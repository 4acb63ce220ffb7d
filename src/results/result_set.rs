use std::collections::HashMap;
use std::sync::Arc;

use super::row::{CustomDbRow, index_columns};
use crate::types::RowValues;

/// What the underlying client hands back for one statement.
///
/// `rows` is `None` when the statement produces no result columns at all (for example an
/// `INSERT` without `RETURNING`), and `Some` otherwise, possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// The rows returned by the statement, if it returns rows
    pub rows: Option<Vec<CustomDbRow>>,
    /// Rows returned or affected, as reported by the server
    pub row_count: u64,
}

impl ResultSet {
    /// A result for a statement that returns no row sequence.
    #[must_use]
    pub fn without_rows(row_count: u64) -> Self {
        Self {
            rows: None,
            row_count,
        }
    }

    /// Build a result from column names and per-row values, sharing one column index across
    /// every row.
    #[must_use]
    pub fn from_values(column_names: Vec<String>, values: Vec<Vec<RowValues>>) -> Self {
        let mut builder = RowsBuilder::new(column_names, values.len());
        for row_values in values {
            builder.push(row_values);
        }
        builder.finish()
    }

    /// Number of rows carried, zero when there is no row sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Incrementally assembles a row-bearing [`ResultSet`].
pub(crate) struct RowsBuilder {
    column_names: Arc<Vec<String>>,
    cache: Arc<HashMap<String, usize>>,
    rows: Vec<CustomDbRow>,
}

impl RowsBuilder {
    pub(crate) fn new(column_names: Vec<String>, capacity: usize) -> Self {
        let cache = Arc::new(index_columns(&column_names));
        Self {
            column_names: Arc::new(column_names),
            cache,
            rows: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, row_values: Vec<RowValues>) {
        self.rows.push(CustomDbRow::with_cache(
            self.column_names.clone(),
            self.cache.clone(),
            row_values,
        ));
    }

    pub(crate) fn finish(self) -> ResultSet {
        let row_count = self.rows.len() as u64;
        ResultSet {
            rows: Some(self.rows),
            row_count,
        }
    }
}
