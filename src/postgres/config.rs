use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value as JsonValue;
use tokio_postgres::config::SslMode as PgSslMode;

use crate::error::{LinkError, PgAdapterError};

/// Future returned by a [`PasswordProvider`].
pub type PasswordFuture = Pin<Box<dyn Future<Output = Result<String, LinkError>> + Send>>;

/// Callback producing the password at connect time, e.g. for rotating credentials.
#[derive(Clone)]
pub struct PasswordProvider(Arc<dyn Fn() -> PasswordFuture + Send + Sync>);

impl PasswordProvider {
    pub fn new<F, Fut>(provider: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, LinkError>> + Send + 'static,
    {
        Self(Arc::new(move || -> PasswordFuture { Box::pin(provider()) }))
    }

    /// Invoke the callback.
    ///
    /// # Errors
    /// Returns whatever error the callback produces.
    pub async fn resolve(&self) -> Result<String, LinkError> {
        (self.0)().await
    }
}

impl fmt::Debug for PasswordProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordProvider(<fn>)")
    }
}

/// TLS negotiation requested from the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// Never use TLS.
    #[default]
    Disable,
    /// Use TLS if available, otherwise continue in plaintext.
    Prefer,
    /// Refuse to connect without TLS.
    Require,
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
        }
    }
}

/// Settings a [`crate::Driver`] opens its connections with.
///
/// Deserializes from a camelCase JSON object:
/// ```rust
/// use pg_adapter::postgres::ConnectionOptions;
///
/// let opts = ConnectionOptions::from_json(&serde_json::json!({
///     "user": "app",
///     "database": "orders",
///     "bigNumberStrings": true
/// }))
/// .unwrap();
/// assert_eq!(opts.port, 5432);
/// assert!(opts.big_number_strings);
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionOptions {
    pub user: Option<String>,
    pub database: Option<String>,
    pub password: Option<String>,
    /// Takes precedence over `password` when set.
    #[serde(skip)]
    pub password_provider: Option<PasswordProvider>,
    pub port: u16,
    pub host: String,
    pub ssl: SslMode,
    /// Decode BIGINT columns as exact text instead of `i64`.
    pub big_number_strings: bool,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            user: None,
            database: None,
            password: None,
            password_provider: None,
            port: 5432,
            host: "localhost".to_string(),
            ssl: SslMode::Disable,
            big_number_strings: false,
        }
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("user", &self.user)
            .field("database", &self.database)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("password_provider", &self.password_provider)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("ssl", &self.ssl)
            .field("big_number_strings", &self.big_number_strings)
            .finish()
    }
}

impl ConnectionOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options handed over as untyped JSON.
    ///
    /// # Errors
    /// Returns `PgAdapterError::ConfigError` if `value` is not a JSON object (arrays, null and
    /// primitives included) or if a field has the wrong type.
    pub fn from_json(value: &JsonValue) -> Result<Self, PgAdapterError> {
        if !value.is_object() {
            return Err(PgAdapterError::ConfigError(format!(
                "Invalid driver options: expected an object, got {}",
                json_type_name(value)
            )));
        }
        Self::deserialize(value)
            .map_err(|e| PgAdapterError::ConfigError(format!("Invalid driver options: {e}")))
    }

    #[must_use]
    pub fn with_password_provider(mut self, provider: PasswordProvider) -> Self {
        self.password_provider = Some(provider);
        self
    }

    /// Structural checks run when a driver is constructed.
    ///
    /// # Errors
    /// Returns `PgAdapterError::ConfigError` for an empty host or port 0.
    pub fn validate(&self) -> Result<(), PgAdapterError> {
        if self.host.trim().is_empty() {
            return Err(PgAdapterError::ConfigError("host is required".to_string()));
        }
        if self.port == 0 {
            return Err(PgAdapterError::ConfigError(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the password to connect with, calling the provider if one is set.
    ///
    /// # Errors
    /// Propagates the provider's error.
    pub async fn resolve_password(&self) -> Result<Option<String>, LinkError> {
        match &self.password_provider {
            Some(provider) => provider.resolve().await.map(Some),
            None => Ok(self.password.clone()),
        }
    }

    /// Build the `tokio-postgres` configuration for one connection attempt.
    #[must_use]
    pub fn to_pg_config(&self, password: Option<&str>) -> tokio_postgres::Config {
        let mut cfg = tokio_postgres::Config::new();
        cfg.host(&self.host).port(self.port).ssl_mode(self.ssl.into());
        if let Some(user) = &self.user {
            cfg.user(user);
        }
        if let Some(database) = &self.database {
            cfg.dbname(database);
        }
        if let Some(password) = password {
            cfg.password(password);
        }
        cfg
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
