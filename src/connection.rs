use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::debug;

use crate::driver::{Driver, DriverInner};
use crate::error::{ErrorKind, PgAdapterError};
use crate::identity::{ConnectionId, DriverId};
use crate::link::Link;
use crate::results::QueryResult;
use crate::statement::StatementKind;
use crate::translation::{placeholder_count, rewrite_placeholders};
use crate::types::{RowValues, sql_from_json, validate_values, values_from_json};

const BEGIN_SQL: &str = "BEGIN TRANSACTION;";
const COMMIT_SQL: &str = "COMMIT;";
const ROLLBACK_SQL: &str = "ROLLBACK;";

/// A live link to the database, usable until [`Connection::close`] succeeds.
///
/// Every operation takes `&self`, so a connection can be shared behind an `Arc`; concurrent
/// queries are queued by the underlying client. Once closed, every operation fails with its own
/// error kind and [`crate::CLOSED_MESSAGE`].
pub struct Connection {
    id: ConnectionId,
    driver_id: DriverId,
    driver: Weak<DriverInner>,
    link: Box<dyn Link>,
    closed: AtomicBool,
    close_lock: Mutex<()>,
}

impl Connection {
    pub(crate) fn new(driver: &Driver, link: Box<dyn Link>) -> Self {
        Self {
            id: ConnectionId::next(),
            driver_id: driver.id(),
            driver: driver.downgrade(),
            link,
            closed: AtomicBool::new(false),
            close_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Identity of the driver that created this connection.
    #[must_use]
    pub fn driver_id(&self) -> DriverId {
        self.driver_id
    }

    /// The driver that created this connection, if it is still alive.
    #[must_use]
    pub fn driver(&self) -> Option<Driver> {
        Driver::upgrade(&self.driver)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self, kind: ErrorKind) -> Result<(), PgAdapterError> {
        if self.is_closed() {
            Err(PgAdapterError::closed(kind))
        } else {
            Ok(())
        }
    }

    /// Run one statement written with `?` placeholders.
    ///
    /// `values` must hold only text and numbers; `None` is passed to the database as absent.
    /// The result is shaped by the statement's leading keyword: `SELECT` yields
    /// [`QueryResult::Rows`], `INSERT` yields the returned row(s) if any, and everything else
    /// yields [`QueryResult::Empty`].
    ///
    /// # Errors
    /// Returns `PgAdapterError::QueryError` for invalid values, for any database failure, or
    /// once the connection is closed.
    pub async fn query(
        &self,
        sql: &str,
        values: Option<&[RowValues]>,
    ) -> Result<QueryResult, PgAdapterError> {
        self.ensure_open(ErrorKind::Query)?;
        self.run(sql, values).await
    }

    /// [`Connection::query`] for callers holding untyped arguments.
    ///
    /// # Errors
    /// Returns `PgAdapterError::QueryError` with `"Invalid query"` when `sql` is not a string,
    /// `"Invalid query values"` when `values` is not an array, `"Invalid query value"` when an
    /// element is neither a string nor a number, and otherwise as [`Connection::query`].
    pub async fn query_json(
        &self,
        sql: &JsonValue,
        values: Option<&JsonValue>,
    ) -> Result<QueryResult, PgAdapterError> {
        self.ensure_open(ErrorKind::Query)?;
        let sql = sql_from_json(sql)?;
        let values = values.map(values_from_json).transpose()?;
        self.run(sql, values.as_deref()).await
    }

    /// Execute `BEGIN TRANSACTION;`.
    ///
    /// # Errors
    /// Returns `PgAdapterError::BeginTransactionError` carrying the failure message.
    pub async fn begin_transaction(&self) -> Result<(), PgAdapterError> {
        self.run_fixed(BEGIN_SQL, ErrorKind::BeginTransaction).await
    }

    /// Execute `COMMIT;`.
    ///
    /// # Errors
    /// Returns `PgAdapterError::CommitError` carrying the failure message.
    pub async fn commit(&self) -> Result<(), PgAdapterError> {
        self.run_fixed(COMMIT_SQL, ErrorKind::Commit).await
    }

    /// Execute `ROLLBACK;`.
    ///
    /// # Errors
    /// Returns `PgAdapterError::RollbackError` carrying the failure message.
    pub async fn rollback(&self) -> Result<(), PgAdapterError> {
        self.run_fixed(ROLLBACK_SQL, ErrorKind::Rollback).await
    }

    /// End the underlying link.
    ///
    /// If ending fails the connection stays open and `close` may be retried.
    ///
    /// # Errors
    /// Returns `PgAdapterError::CloseError` carrying the failure message, or the closed message
    /// if the connection was already closed.
    pub async fn close(&self) -> Result<(), PgAdapterError> {
        self.ensure_open(ErrorKind::Close)?;
        let _guard = self.close_lock.lock().await;
        // another close may have finished while we waited
        self.ensure_open(ErrorKind::Close)?;

        self.link
            .end()
            .await
            .map_err(|e| PgAdapterError::CloseError(e.to_string()))?;
        self.closed.store(true, Ordering::Release);
        debug!(conn = %self.id, "postgres connection closed");
        Ok(())
    }

    async fn run_fixed(&self, sql: &str, kind: ErrorKind) -> Result<(), PgAdapterError> {
        self.ensure_open(kind)?;
        self.run(sql, None).await.map_err(|e| e.rekind(kind))?;
        Ok(())
    }

    async fn run(
        &self,
        sql: &str,
        values: Option<&[RowValues]>,
    ) -> Result<QueryResult, PgAdapterError> {
        if let Some(values) = values {
            validate_values(values)?;
        }

        let kind = StatementKind::of(sql);
        let text = rewrite_placeholders(sql);
        debug!(
            conn = %self.id,
            kind = ?kind,
            placeholders = placeholder_count(sql),
            params = values.map_or(0, <[RowValues]>::len),
            "postgres query"
        );

        let raw = self
            .link
            .query(&text, values)
            .await
            .map_err(|e| PgAdapterError::QueryError(e.to_string()))?;
        Ok(QueryResult::classify(kind, raw))
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("driver_id", &self.driver_id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
