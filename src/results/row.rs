use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::types::RowValues;

/// A row from a database query result
///
/// This struct represents a single row from a database query result,
/// with access to both the column names and the values.
#[derive(Debug, Clone)]
pub struct CustomDbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub rows: Vec<RowValues>,
    // Column name to index, shared across the rows of one result set
    #[doc(hidden)]
    pub(crate) column_index_cache: Arc<HashMap<String, usize>>,
}

impl PartialEq for CustomDbRow {
    fn eq(&self, other: &Self) -> bool {
        self.column_names == other.column_names && self.rows == other.rows
    }
}

impl CustomDbRow {
    /// Create a new database row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, rows: Vec<RowValues>) -> Self {
        let cache = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            rows,
            column_index_cache: cache,
        }
    }

    pub(crate) fn with_cache(
        column_names: Arc<Vec<String>>,
        column_index_cache: Arc<HashMap<String, usize>>,
        rows: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            rows,
            column_index_cache,
        }
    }

    /// Get the index of a column by name
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }

        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.rows.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.rows.get(index)
    }

    /// Iterate `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.rows.iter())
    }

    /// Render the row as a JSON object keyed by column name.
    ///
    /// When a column name repeats, the last occurrence wins.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();
        JsonValue::Object(map)
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        // first occurrence wins for lookups, same as a linear scan
        index.entry(name.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> CustomDbRow {
        CustomDbRow::new(
            Arc::new(vec!["id".into(), "name".into(), "meta".into()]),
            vec![
                RowValues::Int(7),
                RowValues::Text("ada".into()),
                RowValues::JSON(json!({"admin": true})),
            ],
        )
    }

    #[test]
    fn lookup_by_name_and_index() {
        let row = row();
        assert_eq!(row.get("name"), Some(&RowValues::Text("ada".into())));
        assert_eq!(row.get_by_index(0), Some(&RowValues::Int(7)));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn renders_as_json_object() {
        assert_eq!(
            row().to_json(),
            json!({"id": 7, "name": "ada", "meta": {"admin": true}})
        );
    }
}
