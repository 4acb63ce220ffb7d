use thiserror::Error;

/// Message carried by every operation invoked on a closed connection.
pub const CLOSED_MESSAGE: &str = "Cannot perform further operations once the connection is closed";

/// Error produced by the native client behind a [`crate::link::Link`].
pub type LinkError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the driver and its connections.
///
/// Each variant carries the triggering failure's message verbatim, so `Display` prints only
/// that message; use [`PgAdapterError::kind`] to branch on the failure category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PgAdapterError {
    #[error("{0}")]
    ConfigError(String),

    #[error("{0}")]
    ConnectionCreationError(String),

    #[error("{0}")]
    QueryError(String),

    #[error("{0}")]
    CloseError(String),

    #[error("{0}")]
    BeginTransactionError(String),

    #[error("{0}")]
    CommitError(String),

    #[error("{0}")]
    RollbackError(String),
}

/// Failure category of a [`PgAdapterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    ConnectionCreation,
    Query,
    Close,
    BeginTransaction,
    Commit,
    Rollback,
}

impl PgAdapterError {
    /// Build an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Config => Self::ConfigError(message),
            ErrorKind::ConnectionCreation => Self::ConnectionCreationError(message),
            ErrorKind::Query => Self::QueryError(message),
            ErrorKind::Close => Self::CloseError(message),
            ErrorKind::BeginTransaction => Self::BeginTransactionError(message),
            ErrorKind::Commit => Self::CommitError(message),
            ErrorKind::Rollback => Self::RollbackError(message),
        }
    }

    /// The error returned by `kind` operations once the connection is closed.
    #[must_use]
    pub fn closed(kind: ErrorKind) -> Self {
        Self::new(kind, CLOSED_MESSAGE)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigError(_) => ErrorKind::Config,
            Self::ConnectionCreationError(_) => ErrorKind::ConnectionCreation,
            Self::QueryError(_) => ErrorKind::Query,
            Self::CloseError(_) => ErrorKind::Close,
            Self::BeginTransactionError(_) => ErrorKind::BeginTransaction,
            Self::CommitError(_) => ErrorKind::Commit,
            Self::RollbackError(_) => ErrorKind::Rollback,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::ConfigError(m)
            | Self::ConnectionCreationError(m)
            | Self::QueryError(m)
            | Self::CloseError(m)
            | Self::BeginTransactionError(m)
            | Self::CommitError(m)
            | Self::RollbackError(m) => m,
        }
    }

    /// Re-wrap this error's message under another kind.
    #[must_use]
    pub fn rekind(self, kind: ErrorKind) -> Self {
        match self {
            Self::ConfigError(m)
            | Self::ConnectionCreationError(m)
            | Self::QueryError(m)
            | Self::CloseError(m)
            | Self::BeginTransactionError(m)
            | Self::CommitError(m)
            | Self::RollbackError(m) => Self::new(kind, m),
        }
    }

    /// True when this error reports an operation on a closed connection.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.message() == CLOSED_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_carried_message() {
        let err = PgAdapterError::new(ErrorKind::Commit, "could not serialize access");
        assert_eq!(err.to_string(), "could not serialize access");
        assert_eq!(err.kind(), ErrorKind::Commit);
    }

    #[test]
    fn rekind_preserves_message() {
        let err = PgAdapterError::QueryError("deadlock detected".into()).rekind(ErrorKind::Rollback);
        assert_eq!(err, PgAdapterError::RollbackError("deadlock detected".into()));
    }

    #[test]
    fn closed_errors_share_the_fixed_message() {
        for kind in [ErrorKind::Close, ErrorKind::Query, ErrorKind::Commit] {
            let err = PgAdapterError::closed(kind);
            assert!(err.is_closed());
            assert_eq!(err.kind(), kind);
            assert_eq!(err.message(), CLOSED_MESSAGE);
        }
    }
}
