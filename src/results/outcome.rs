use super::{CustomDbRow, ResultSet};
use crate::statement::StatementKind;

/// The caller-facing shape of one executed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Every row of a `SELECT`, possibly none.
    Rows(Vec<CustomDbRow>),
    /// The single row returned by an `INSERT ... RETURNING`.
    Inserted(CustomDbRow),
    /// The rows returned by a multi-row `INSERT ... RETURNING`.
    InsertedMany(Vec<CustomDbRow>),
    /// Nothing to hand back.
    Empty,
}

impl QueryResult {
    /// Shape a raw result according to the statement that produced it.
    #[must_use]
    pub fn classify(kind: StatementKind, raw: ResultSet) -> Self {
        match kind {
            StatementKind::Select => QueryResult::Rows(raw.rows.unwrap_or_default()),
            StatementKind::Insert => match raw.rows {
                Some(mut rows) if rows.len() == 1 => rows
                    .pop()
                    .map_or(QueryResult::Empty, QueryResult::Inserted),
                Some(rows) if rows.len() > 1 => QueryResult::InsertedMany(rows),
                _ => QueryResult::Empty,
            },
            StatementKind::Other => QueryResult::Empty,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryResult::Empty)
    }

    /// The rows of a `Rows` or `InsertedMany` result.
    #[must_use]
    pub fn rows(&self) -> Option<&[CustomDbRow]> {
        match self {
            QueryResult::Rows(rows) | QueryResult::InsertedMany(rows) => Some(rows),
            _ => None,
        }
    }

    /// The row of an `Inserted` result.
    #[must_use]
    pub fn row(&self) -> Option<&CustomDbRow> {
        match self {
            QueryResult::Inserted(row) => Some(row),
            _ => None,
        }
    }

    /// Flatten into a row list, whatever the shape.
    #[must_use]
    pub fn into_rows(self) -> Vec<CustomDbRow> {
        match self {
            QueryResult::Rows(rows) | QueryResult::InsertedMany(rows) => rows,
            QueryResult::Inserted(row) => vec![row],
            QueryResult::Empty => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowValues;

    fn ids(n: i64) -> ResultSet {
        ResultSet::from_values(
            vec!["id".into()],
            (1..=n).map(|i| vec![RowValues::Int(i)]).collect(),
        )
    }

    #[test]
    fn select_is_always_a_sequence() {
        assert_eq!(
            QueryResult::classify(StatementKind::Select, ids(0)),
            QueryResult::Rows(vec![])
        );
        assert_eq!(
            QueryResult::classify(StatementKind::Select, ResultSet::without_rows(0)),
            QueryResult::Rows(vec![])
        );
        assert_eq!(QueryResult::classify(StatementKind::Select, ids(3)).rows().map(<[_]>::len), Some(3));
    }

    #[test]
    fn insert_shapes_by_row_count() {
        let one = QueryResult::classify(StatementKind::Insert, ids(1));
        assert_eq!(one.row().and_then(|r| r.get("id")), Some(&RowValues::Int(1)));

        let many = QueryResult::classify(StatementKind::Insert, ids(2));
        assert!(matches!(many, QueryResult::InsertedMany(ref rows) if rows.len() == 2));

        assert!(QueryResult::classify(StatementKind::Insert, ids(0)).is_empty());
        assert!(QueryResult::classify(StatementKind::Insert, ResultSet::without_rows(1)).is_empty());
    }

    #[test]
    fn other_statements_are_empty() {
        assert!(QueryResult::classify(StatementKind::Other, ids(4)).is_empty());
    }
}
