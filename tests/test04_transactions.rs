mod common;

use pg_adapter::prelude::*;
use pg_adapter::test_utils::{RecordedCall, Script};

use common::scripted_connection;

fn fixed(sql: &str) -> RecordedCall {
    RecordedCall {
        sql: sql.to_string(),
        values: None,
    }
}

#[tokio::test]
async fn each_boundary_issues_one_fixed_statement() -> Result<(), PgAdapterError> {
    let script = Script::new();
    let conn = scripted_connection(&script).await?;

    conn.begin_transaction().await?;
    conn.query("INSERT INTO t (a) VALUES (?)", Some(&[RowValues::Int(1)][..]))
        .await?;
    conn.commit().await?;
    conn.begin_transaction().await?;
    conn.rollback().await?;

    let calls = script.calls();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], fixed("BEGIN TRANSACTION;"));
    assert_eq!(calls[2], fixed("COMMIT;"));
    assert_eq!(calls[3], fixed("BEGIN TRANSACTION;"));
    assert_eq!(calls[4], fixed("ROLLBACK;"));
    Ok(())
}

#[tokio::test]
async fn failures_keep_their_message_under_their_own_kind() -> Result<(), PgAdapterError> {
    let script = Script::new();
    script
        .push_error("cannot begin: connection busy")
        .push_error("could not serialize access due to concurrent update")
        .push_error("no connection to the server");
    let conn = scripted_connection(&script).await?;

    assert_eq!(
        conn.begin_transaction().await.unwrap_err(),
        PgAdapterError::BeginTransactionError("cannot begin: connection busy".into())
    );
    assert_eq!(
        conn.commit().await.unwrap_err(),
        PgAdapterError::CommitError("could not serialize access due to concurrent update".into())
    );
    assert_eq!(
        conn.rollback().await.unwrap_err(),
        PgAdapterError::RollbackError("no connection to the server".into())
    );
    Ok(())
}

#[tokio::test]
async fn sequencing_is_left_to_the_caller() -> Result<(), PgAdapterError> {
    let script = Script::new();
    let conn = scripted_connection(&script).await?;

    // no BEGIN first; the statement still goes out
    conn.commit().await?;
    conn.rollback().await?;
    assert_eq!(script.calls(), vec![fixed("COMMIT;"), fixed("ROLLBACK;")]);
    Ok(())
}
