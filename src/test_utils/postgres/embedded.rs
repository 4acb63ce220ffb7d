use super::super::SHARED_RUNTIME;
use crate::driver::Driver;
use crate::postgres::ConnectionOptions;

use postgresql_embedded::PostgreSQL;

/// Represents a running embedded `PostgreSQL` instance.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    pub port: u16,
    /// Options that reach the embedded server with working credentials
    pub options: ConnectionOptions,
}

/// Set up an embedded `PostgreSQL` instance for testing.
///
/// `options.database` names the database to create; host, port and credentials are replaced
/// with the embedded server's.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, if the database cannot
/// be created, or if the post-start connectivity check fails.
pub fn setup_postgres_embedded(
    options: &ConnectionOptions,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();

        // bundled binaries, so no download at test time
        postgresql.setup().await?;
        postgresql.start().await?;

        let settings = postgresql.settings();
        let port = settings.port;

        let db_name = options
            .database
            .clone()
            .unwrap_or_else(|| "pg_adapter_test".to_string());
        postgresql.create_database(&db_name).await?;

        let mut final_options = options.clone();
        final_options.host = settings.host.clone();
        final_options.port = port;
        final_options.user = Some(settings.username.clone());
        final_options.password = Some(settings.password.clone());
        final_options.database = Some(db_name);

        // Quick connection test
        let driver = Driver::new(final_options.clone())?;
        let conn = driver.create().await?;
        conn.query("SELECT 1", None).await?;
        conn.close().await?;

        Ok(EmbeddedPostgres {
            postgresql,
            port,
            options: final_options,
        })
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
