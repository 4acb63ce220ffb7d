use std::sync::{Arc, Weak};

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::connection::Connection;
use crate::error::PgAdapterError;
use crate::identity::DriverId;
use crate::link::Connector;
use crate::postgres::{ConnectionOptions, DecodePolicy, PgConnector};

/// Holds connection settings and opens [`Connection`]s on request.
///
/// Cloning is cheap and yields a handle to the same driver; connections keep only a weak
/// reference back to it.
#[derive(Clone)]
pub struct Driver {
    inner: Arc<DriverInner>,
}

pub(crate) struct DriverInner {
    id: DriverId,
    options: ConnectionOptions,
    connector: Arc<dyn Connector>,
}

impl Driver {
    /// Driver backed by `tokio-postgres`.
    ///
    /// # Errors
    /// Returns `PgAdapterError::ConfigError` if the options fail validation.
    pub fn new(options: ConnectionOptions) -> Result<Self, PgAdapterError> {
        Self::with_connector(options, Arc::new(PgConnector))
    }

    /// Driver built from untyped options, as handed over by an ORM configuration layer.
    ///
    /// # Errors
    /// Returns `PgAdapterError::ConfigError` if `options` is not a JSON object or does not
    /// describe valid connection options.
    pub fn from_json(options: &JsonValue) -> Result<Self, PgAdapterError> {
        Self::new(ConnectionOptions::from_json(options)?)
    }

    /// Driver that opens its links through `connector`.
    ///
    /// # Errors
    /// Returns `PgAdapterError::ConfigError` if the options fail validation.
    pub fn with_connector(
        options: ConnectionOptions,
        connector: Arc<dyn Connector>,
    ) -> Result<Self, PgAdapterError> {
        options.validate()?;
        Ok(Self {
            inner: Arc::new(DriverInner {
                id: DriverId::next(),
                options,
                connector,
            }),
        })
    }

    #[must_use]
    pub fn id(&self) -> DriverId {
        self.inner.id
    }

    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.inner.options
    }

    /// Open one new connection.
    ///
    /// # Errors
    /// Returns `PgAdapterError::ConnectionCreationError` carrying the underlying message if the
    /// link cannot be established.
    pub async fn create(&self) -> Result<Connection, PgAdapterError> {
        let policy = DecodePolicy::from(&self.inner.options);
        let link = self
            .inner
            .connector
            .connect(&self.inner.options, policy)
            .await
            .map_err(|e| PgAdapterError::ConnectionCreationError(e.to_string()))?;

        let conn = Connection::new(self, link);
        debug!(driver = %self.inner.id, conn = %conn.id(), "postgres connection created");
        Ok(conn)
    }

    pub(crate) fn downgrade(&self) -> Weak<DriverInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn upgrade(inner: &Weak<DriverInner>) -> Option<Driver> {
        inner.upgrade().map(|inner| Driver { inner })
    }
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("id", &self.inner.id)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}
