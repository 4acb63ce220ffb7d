#![allow(dead_code)]

use std::sync::Arc;

use pg_adapter::prelude::*;
use pg_adapter::test_utils::{Script, ScriptedConnector};

/// Driver over a scripted link, plus the connector to inspect connect attempts.
pub fn scripted_driver(
    script: &Script,
    options: ConnectionOptions,
) -> Result<(Driver, Arc<ScriptedConnector>), PgAdapterError> {
    let connector = Arc::new(ScriptedConnector::new(script.clone()));
    let driver = Driver::with_connector(options, connector.clone())?;
    Ok((driver, connector))
}

/// An open connection over `script`.
pub async fn scripted_connection(script: &Script) -> Result<Connection, PgAdapterError> {
    let (driver, _) = scripted_driver(script, ConnectionOptions::new())?;
    driver.create().await
}
