// PostgreSQL module - the native-client side of the adapter
//
// - config: connection options and their mapping onto tokio-postgres
// - params: parameter binding
// - decode: column decoding policy
// - link: the tokio-postgres backed Connector/Link

pub mod config;
pub mod decode;
pub mod link;
pub mod params;

pub use config::{ConnectionOptions, PasswordProvider, SslMode};
pub use decode::DecodePolicy;
pub use link::{PgConnector, PgLink};
pub use params::Params;
