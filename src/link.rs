//! Seam between the adapter and the native client that does the protocol work.

use async_trait::async_trait;

use crate::error::LinkError;
use crate::postgres::{ConnectionOptions, DecodePolicy};
use crate::results::ResultSet;
use crate::types::RowValues;

/// One live connection of the native client.
#[async_trait]
pub trait Link: Send + Sync {
    /// Run `sql` (already using `$N` placeholders) with `values` passed through untouched.
    async fn query(&self, sql: &str, values: Option<&[RowValues]>) -> Result<ResultSet, LinkError>;

    /// Terminate the connection.
    async fn end(&self) -> Result<(), LinkError>;
}

/// Opens [`Link`]s.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        options: &ConnectionOptions,
        policy: DecodePolicy,
    ) -> Result<Box<dyn Link>, LinkError>;
}
