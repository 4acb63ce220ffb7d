//! Row, raw result and classified outcome types.

mod outcome;
pub(crate) mod result_set;
mod row;

pub use outcome::QueryResult;
pub use result_set::ResultSet;
pub use row::CustomDbRow;
