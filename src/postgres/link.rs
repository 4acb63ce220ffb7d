use std::error::Error as _;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

use super::decode::{DecodePolicy, decode_rows};
use super::{ConnectionOptions, Params};
use crate::error::LinkError;
use crate::link::{Connector, Link};
use crate::results::ResultSet;
use crate::types::RowValues;

/// Opens `tokio-postgres` connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

#[async_trait]
impl Connector for PgConnector {
    async fn connect(
        &self,
        options: &ConnectionOptions,
        policy: DecodePolicy,
    ) -> Result<Box<dyn Link>, LinkError> {
        let password = options.resolve_password().await?;
        let cfg = options.to_pg_config(password.as_deref());

        debug!(
            host = %options.host,
            port = options.port,
            db = ?options.database,
            user = ?options.user,
            "postgres connect start"
        );
        let (client, connection) = cfg.connect(NoTls).await.map_err(pg_error)?;
        debug!("postgres connect established");

        let task = tokio::spawn(async move {
            let res = connection.await;
            if let Err(e) = &res {
                warn!(error = %e, "postgres connection task ended with an error");
            }
            res
        });

        Ok(Box::new(PgLink {
            client: RwLock::new(Some(client)),
            task: Mutex::new(Some(task)),
            policy,
        }))
    }
}

/// One `tokio-postgres` client plus the task driving its socket.
pub struct PgLink {
    client: RwLock<Option<Client>>,
    task: Mutex<Option<JoinHandle<Result<(), tokio_postgres::Error>>>>,
    policy: DecodePolicy,
}

#[async_trait]
impl Link for PgLink {
    async fn query(&self, sql: &str, values: Option<&[RowValues]>) -> Result<ResultSet, LinkError> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or("Connection terminated")?;

        let params = Params::convert(values);
        let stmt = client.prepare(sql).await.map_err(pg_error)?;

        if stmt.columns().is_empty() {
            let affected = client
                .execute(&stmt, params.as_refs())
                .await
                .map_err(pg_error)?;
            return Ok(ResultSet::without_rows(affected));
        }

        let column_names: Vec<String> = stmt
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect();
        let rows = client
            .query(&stmt, params.as_refs())
            .await
            .map_err(pg_error)?;
        decode_rows(column_names, &rows, self.policy)
    }

    /// Drop the client, which sends Terminate, and wait for the connection task.
    ///
    /// The client is gone even when the task reports an error, so after a failed `end` the
    /// link answers queries with "Connection terminated" and a repeated `end` succeeds.
    async fn end(&self) -> Result<(), LinkError> {
        drop(self.client.write().await.take());

        let Some(task) = self.task.lock().await.take() else {
            return Ok(());
        };
        task.await?.map_err(pg_error)
    }
}

impl std::fmt::Debug for PgLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgLink")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// The text a caller should see for a client error.
///
/// `tokio_postgres::Error` displays only its kind ("db error"), so take the server's message
/// for database errors and the underlying cause for everything else.
#[must_use]
pub(crate) fn error_message(e: &tokio_postgres::Error) -> String {
    if let Some(db) = e.as_db_error() {
        return db.message().to_string();
    }
    match e.source() {
        Some(cause) => cause.to_string(),
        None => e.to_string(),
    }
}

fn pg_error(e: tokio_postgres::Error) -> LinkError {
    error_message(&e).into()
}
