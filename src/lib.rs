//! PostgreSQL driver/connection adapter for ORM layers.
//!
//! A [`Driver`] holds connection settings and opens [`Connection`]s. A connection rewrites `?`
//! placeholders into `$N`, runs statements through `tokio-postgres`, shapes results by the
//! statement's leading keyword, drives transaction boundaries, and refuses all work once
//! closed.
//!
//! ```rust,no_run
//! use pg_adapter::prelude::*;
//!
//! # async fn run() -> Result<(), PgAdapterError> {
//! let mut options = ConnectionOptions::new();
//! options.user = Some("app".into());
//! options.database = Some("orders".into());
//!
//! let driver = Driver::new(options)?;
//! let conn = driver.create().await?;
//!
//! conn.begin_transaction().await?;
//! let params = [RowValues::Text("A-1".into())];
//! let inserted = conn
//!     .query("INSERT INTO orders (sku) VALUES (?) RETURNING id", Some(&params[..]))
//!     .await?;
//! conn.commit().await?;
//!
//! if let QueryResult::Inserted(row) = inserted {
//!     println!("new id: {:?}", row.get("id"));
//! }
//! conn.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod contract;
pub mod driver;
pub mod error;
pub mod identity;
pub mod link;
pub mod postgres;
pub mod prelude;
pub mod results;
pub mod statement;
pub mod test_utils;
pub mod translation;
pub mod types;

pub use connection::Connection;
pub use contract::{DatabaseConnection, DatabaseDriver};
pub use driver::Driver;
pub use error::{CLOSED_MESSAGE, ErrorKind, LinkError, PgAdapterError};
pub use identity::{ConnectionId, DriverId};
pub use results::{CustomDbRow, QueryResult, ResultSet};
pub use types::RowValues;

#[doc(hidden)]
pub use test_utils::test_helpers;
