mod common;

use pg_adapter::prelude::*;
use pg_adapter::test_utils::{RecordedCall, Script, create_test_row};
use pg_adapter::ResultSet;
use serde_json::json;

use common::scripted_connection;

#[tokio::test]
async fn placeholders_become_positional_markers() -> Result<(), PgAdapterError> {
    let script = Script::new();
    let conn = scripted_connection(&script).await?;
    let values = [RowValues::Text("ada".into()), RowValues::Int(36)];

    conn.query("UPDATE users SET name = ? WHERE age = ?", Some(&values[..]))
        .await?;
    conn.query("DELETE FROM users", None).await?;
    conn.query("SELECT '?' AS q, ?", Some(&[RowValues::Float(0.5)][..]))
        .await?;

    assert_eq!(
        script.calls(),
        vec![
            RecordedCall {
                sql: "UPDATE users SET name = $1 WHERE age = $2".into(),
                values: Some(values.to_vec()),
            },
            RecordedCall {
                sql: "DELETE FROM users".into(),
                values: None,
            },
            RecordedCall {
                sql: "SELECT '$1' AS q, $2".into(),
                values: Some(vec![RowValues::Float(0.5)]),
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn select_resolves_to_rows_even_when_empty() -> Result<(), PgAdapterError> {
    let script = Script::new();
    script.push_rows(&["id"], vec![]);
    script.push_result(ResultSet::default());
    script.push_rows(
        &["id", "name"],
        vec![
            vec![RowValues::Int(1), RowValues::Text("ada".into())],
            vec![RowValues::Int(2), RowValues::Text("grace".into())],
        ],
    );
    let conn = scripted_connection(&script).await?;

    assert_eq!(conn.query("SELECT id FROM t", None).await?, QueryResult::Rows(vec![]));
    assert_eq!(conn.query("  select 1", None).await?, QueryResult::Rows(vec![]));

    let result = conn.query("SELECT id, name FROM users", None).await?;
    let rows = result.rows().unwrap_or_default();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("name"), Some(&RowValues::Text("grace".into())));
    assert_eq!(
        rows[0],
        create_test_row(
            vec!["id".into(), "name".into()],
            vec![RowValues::Int(1), RowValues::Text("ada".into())]
        )
    );
    Ok(())
}

#[tokio::test]
async fn insert_returning_shapes_by_row_count() -> Result<(), PgAdapterError> {
    let script = Script::new();
    script.push_rows(&["id"], vec![vec![RowValues::Int(10)]]);
    script.push_rows(&["id"], vec![vec![RowValues::Int(11)], vec![RowValues::Int(12)]]);
    script.push_rows(&["id"], vec![]);
    script.push_result(ResultSet::without_rows(1));
    let conn = scripted_connection(&script).await?;

    let one = conn
        .query("INSERT INTO t (a) VALUES (?) RETURNING id", Some(&[RowValues::Int(1)][..]))
        .await?;
    assert_eq!(one.row().and_then(|r| r.get("id")), Some(&RowValues::Int(10)));

    let two = conn
        .query("insert into t (a) values (1), (2) returning id", None)
        .await?;
    match two {
        QueryResult::InsertedMany(rows) => {
            let ids: Vec<_> = rows.iter().filter_map(|r| r.get("id").cloned()).collect();
            assert_eq!(ids, vec![RowValues::Int(11), RowValues::Int(12)]);
        }
        other => panic!("expected InsertedMany, got {other:?}"),
    }

    let none = conn
        .query("INSERT INTO t SELECT * FROM t WHERE false RETURNING id", None)
        .await?;
    assert!(none.is_empty());

    let no_returning = conn.query("INSERT INTO t (a) VALUES (3)", None).await?;
    assert!(no_returning.is_empty());
    Ok(())
}

#[tokio::test]
async fn other_statements_resolve_to_empty() -> Result<(), PgAdapterError> {
    let script = Script::new();
    for _ in 0..3 {
        script.push_rows(&["id"], vec![vec![RowValues::Int(1)]]);
    }
    let conn = scripted_connection(&script).await?;

    assert!(conn.query("UPDATE t SET a = 1 RETURNING id", None).await?.is_empty());
    assert!(conn.query("DELETE FROM t RETURNING id", None).await?.is_empty());
    assert!(conn.query("WITH x AS (SELECT 1) SELECT * FROM x", None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn execution_failures_carry_the_message() -> Result<(), PgAdapterError> {
    let script = Script::new();
    script.push_error("relation \"missing\" does not exist");
    let conn = scripted_connection(&script).await?;

    let err = conn.query("SELECT * FROM missing", None).await.unwrap_err();
    assert_eq!(
        err,
        PgAdapterError::QueryError("relation \"missing\" does not exist".into())
    );

    // the connection stays usable
    assert_eq!(conn.query("SELECT 1", None).await?, QueryResult::Rows(vec![]));
    Ok(())
}

#[tokio::test]
async fn invalid_values_fail_before_reaching_the_link() -> Result<(), PgAdapterError> {
    let script = Script::new();
    let conn = scripted_connection(&script).await?;

    for bad in [RowValues::Null, RowValues::Bool(false), RowValues::JSON(json!([1]))] {
        let values = [RowValues::Int(1), bad];
        let err = conn
            .query("SELECT ?, ?", Some(&values[..]))
            .await
            .unwrap_err();
        assert_eq!(err, PgAdapterError::QueryError("Invalid query value".into()));
    }
    assert!(script.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn untyped_arguments_are_checked() -> Result<(), PgAdapterError> {
    let script = Script::new();
    let conn = scripted_connection(&script).await?;

    let err = conn.query_json(&json!(12), None).await.unwrap_err();
    assert_eq!(err.message(), "Invalid query");

    let err = conn
        .query_json(&json!("SELECT ?"), Some(&json!("not a list")))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Invalid query values");

    let err = conn
        .query_json(&json!("SELECT ?"), Some(&json!([{"a": 1}])))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Invalid query value");
    assert!(script.calls().is_empty());

    conn.query_json(&json!("SELECT ?, ?"), Some(&json!(["x", 3])))
        .await?;
    conn.query_json(&json!("SELECT 1"), None).await?;
    assert_eq!(
        script.calls(),
        vec![
            RecordedCall {
                sql: "SELECT $1, $2".into(),
                values: Some(vec![RowValues::Text("x".into()), RowValues::Int(3)]),
            },
            RecordedCall {
                sql: "SELECT 1".into(),
                values: None,
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn concurrent_queries_on_one_connection() -> Result<(), PgAdapterError> {
    let script = Script::new();
    let conn = std::sync::Arc::new(scripted_connection(&script).await?);

    let mut handles = Vec::new();
    for i in 0..8 {
        let conn = conn.clone();
        handles.push(tokio::spawn(async move {
            conn.query("SELECT ?", Some(&[RowValues::Int(i)][..])).await
        }));
    }
    for handle in handles {
        let result = handle.await.map_err(|e| PgAdapterError::QueryError(e.to_string()))??;
        assert_eq!(result, QueryResult::Rows(vec![]));
    }
    assert_eq!(script.calls().len(), 8);
    Ok(())
}
