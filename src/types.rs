use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::error::PgAdapterError;

/// Values that can be stored in a database row or used as query parameters.
///
/// Query parameters are restricted to text and numbers; decoded columns may use any variant:
/// ```rust
/// use pg_adapter::prelude::*;
///
/// let params = vec![RowValues::Int(1), RowValues::Text("alice".into())];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value, also used for exact BIGINT and temporal columns
    Text(String),
    /// Boolean value
    Bool(bool),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text or number, the only shapes accepted as query parameters.
    #[must_use]
    pub fn is_bindable(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_) | Self::Text(_))
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&JsonValue> {
        if let RowValues::JSON(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Parse a TIMESTAMP column, which is decoded as PostgreSQL's raw text.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        let s = self.as_text()?;
        // "YYYY-MM-DD HH:MM:SS" with optional fractional seconds
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok()
    }

    /// Parse a DATE column, which is decoded as PostgreSQL's raw text.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.as_text()?, "%Y-%m-%d").ok()
    }

    /// JSON rendering used when a row is handed to callers as a plain object.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(JsonValue::Null, JsonValue::Number),
            RowValues::Text(s) => JsonValue::String(s.clone()),
            RowValues::Bool(b) => JsonValue::Bool(*b),
            RowValues::Null => JsonValue::Null,
            RowValues::JSON(v) => v.clone(),
            RowValues::Blob(bytes) => {
                JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect())
            }
        }
    }
}

/// Reject any parameter that is neither text nor a number.
///
/// # Errors
/// Returns `PgAdapterError::QueryError("Invalid query value")` on the first offending element.
pub fn validate_values(values: &[RowValues]) -> Result<(), PgAdapterError> {
    if values.iter().all(RowValues::is_bindable) {
        Ok(())
    } else {
        Err(PgAdapterError::QueryError("Invalid query value".to_string()))
    }
}

/// Convert an untyped SQL text argument.
///
/// # Errors
/// Returns `PgAdapterError::QueryError("Invalid query")` when `sql` is not a string.
pub fn sql_from_json(sql: &JsonValue) -> Result<&str, PgAdapterError> {
    sql.as_str()
        .ok_or_else(|| PgAdapterError::QueryError("Invalid query".to_string()))
}

/// Convert an untyped values argument into bindable parameters.
///
/// # Errors
/// Returns `PgAdapterError::QueryError` with `"Invalid query values"` when `values` is not an
/// array, or `"Invalid query value"` when an element is not a string or number.
pub fn values_from_json(values: &JsonValue) -> Result<Vec<RowValues>, PgAdapterError> {
    let items = values
        .as_array()
        .ok_or_else(|| PgAdapterError::QueryError("Invalid query values".to_string()))?;

    items
        .iter()
        .map(|item| match item {
            JsonValue::String(s) => Ok(RowValues::Text(s.clone())),
            JsonValue::Number(n) => Ok(n
                .as_i64()
                .map_or_else(|| RowValues::Float(n.as_f64().unwrap_or(f64::NAN)), RowValues::Int)),
            _ => Err(PgAdapterError::QueryError("Invalid query value".to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_text_and_numbers_are_bindable() {
        assert!(validate_values(&[RowValues::Int(1), RowValues::Float(1.5), RowValues::Text("a".into())]).is_ok());
        for bad in [RowValues::Null, RowValues::Bool(true), RowValues::Blob(vec![1]), RowValues::JSON(json!({}))] {
            let err = validate_values(&[RowValues::Int(1), bad]).unwrap_err();
            assert_eq!(err, PgAdapterError::QueryError("Invalid query value".into()));
        }
    }

    #[test]
    fn json_values_convert_or_reject() {
        let values = values_from_json(&json!(["bob", 7, 2.5])).unwrap();
        assert_eq!(
            values,
            vec![RowValues::Text("bob".into()), RowValues::Int(7), RowValues::Float(2.5)]
        );

        let err = values_from_json(&json!({"a": 1})).unwrap_err();
        assert_eq!(err.message(), "Invalid query values");
        let err = values_from_json(&json!([1, null])).unwrap_err();
        assert_eq!(err.message(), "Invalid query value");
        let err = values_from_json(&json!([[1]])).unwrap_err();
        assert_eq!(err.message(), "Invalid query value");
    }

    #[test]
    fn sql_must_be_a_string() {
        assert_eq!(sql_from_json(&json!("SELECT 1")).unwrap(), "SELECT 1");
        assert_eq!(sql_from_json(&json!(42)).unwrap_err().message(), "Invalid query");
    }

    #[test]
    fn temporal_text_parses() {
        let ts = RowValues::Text("2021-08-06 16:00:00".into());
        assert_eq!(
            ts.as_timestamp(),
            NaiveDateTime::parse_from_str("2021-08-06 16:00:00", "%Y-%m-%d %H:%M:%S").ok()
        );
        let frac = RowValues::Text("2021-08-06 16:00:00.25".into());
        assert!(frac.as_timestamp().is_some());
        assert_eq!(
            RowValues::Text("2021-08-06".into()).as_date(),
            NaiveDate::from_ymd_opt(2021, 8, 6)
        );
        assert_eq!(RowValues::Int(3).as_timestamp(), None);
    }
}
