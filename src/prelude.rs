//! Convenient imports for common functionality.

pub use crate::connection::Connection;
pub use crate::contract::{DatabaseConnection, DatabaseDriver};
pub use crate::driver::Driver;
pub use crate::error::{CLOSED_MESSAGE, ErrorKind, PgAdapterError};
pub use crate::postgres::{ConnectionOptions, PasswordProvider, SslMode};
pub use crate::results::{CustomDbRow, QueryResult};
pub use crate::translation::rewrite_placeholders;
pub use crate::types::RowValues;
