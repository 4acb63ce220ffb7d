#[cfg(feature = "test-utils")]
use std::sync::LazyLock;
#[cfg(feature = "test-utils")]
use tokio::runtime::Runtime;

/// Shared tokio runtime for test utilities to avoid creating multiple runtimes
#[cfg(feature = "test-utils")]
pub(crate) static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// Embedded `PostgreSQL` for live tests
#[cfg(feature = "test-utils")]
pub mod postgres;

/// Scripted in-memory link for contract tests
#[cfg(feature = "scripted")]
pub mod scripted;
pub mod test_helpers;

#[cfg(feature = "scripted")]
pub use scripted::{RecordedCall, Script, ScriptedConnector, ScriptedLink};
pub use test_helpers::create_test_row;
