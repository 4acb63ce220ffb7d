//! The driver/connection contract an ORM programs against.
//!
//! Both traits are object safe so a caller can hold `Box<dyn DatabaseDriver>` without knowing
//! the backend.

use async_trait::async_trait;

use crate::connection::Connection;
use crate::driver::Driver;
use crate::error::PgAdapterError;
use crate::identity::{ConnectionId, DriverId};
use crate::results::QueryResult;
use crate::types::RowValues;

#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    fn driver_id(&self) -> DriverId;

    /// Open one new connection.
    async fn create_connection(&self) -> Result<Box<dyn DatabaseConnection>, PgAdapterError>;
}

#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    fn connection_id(&self) -> ConnectionId;

    /// Run one statement written with `?` placeholders.
    async fn query(
        &self,
        sql: &str,
        values: Option<&[RowValues]>,
    ) -> Result<QueryResult, PgAdapterError>;

    async fn begin_transaction(&self) -> Result<(), PgAdapterError>;

    async fn commit(&self) -> Result<(), PgAdapterError>;

    async fn rollback(&self) -> Result<(), PgAdapterError>;

    async fn close(&self) -> Result<(), PgAdapterError>;
}

#[async_trait]
impl DatabaseDriver for Driver {
    fn driver_id(&self) -> DriverId {
        self.id()
    }

    async fn create_connection(&self) -> Result<Box<dyn DatabaseConnection>, PgAdapterError> {
        Ok(Box::new(self.create().await?))
    }
}

#[async_trait]
impl DatabaseConnection for Connection {
    fn connection_id(&self) -> ConnectionId {
        self.id()
    }

    async fn query(
        &self,
        sql: &str,
        values: Option<&[RowValues]>,
    ) -> Result<QueryResult, PgAdapterError> {
        Connection::query(self, sql, values).await
    }

    async fn begin_transaction(&self) -> Result<(), PgAdapterError> {
        Connection::begin_transaction(self).await
    }

    async fn commit(&self) -> Result<(), PgAdapterError> {
        Connection::commit(self).await
    }

    async fn rollback(&self) -> Result<(), PgAdapterError> {
        Connection::rollback(self).await
    }

    async fn close(&self) -> Result<(), PgAdapterError> {
        Connection::close(self).await
    }
}
