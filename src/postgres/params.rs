use std::error::Error;
use std::fmt::Write;

use tokio_postgres::types::{Format, IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes::{BufMut, BytesMut};

use crate::types::RowValues;

/// Container for Postgres parameters with lifetime tracking
pub struct Params<'a> {
    references: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> Params<'a> {
    /// Borrow each value as a `ToSql` parameter; absent values bind nothing.
    #[must_use]
    pub fn convert(params: Option<&'a [RowValues]>) -> Params<'a> {
        let params = params.unwrap_or_default();
        let mut references = Vec::with_capacity(params.len());
        for p in params {
            references.push(p as &(dyn ToSql + Sync));
        }
        Params { references }
    }

    /// Get a reference to the underlying parameter array
    #[must_use]
    pub fn as_refs(&self) -> &[&(dyn ToSql + Sync)] {
        &self.references
    }
}

// Parameters travel in the text format so the server coerces them to whatever type it
// inferred for the placeholder, the same way it treats an untyped literal.
impl ToSql for RowValues {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Null => return Ok(IsNull::Yes),
            RowValues::Int(i) => out.put_slice(i.to_string().as_bytes()),
            RowValues::Float(f) => out.put_slice(float_text(*f).as_bytes()),
            RowValues::Text(s) => out.put_slice(s.as_bytes()),
            RowValues::Bool(b) => out.put_slice(if *b { b"true" } else { b"false" }),
            RowValues::JSON(v) => out.put_slice(v.to_string().as_bytes()),
            RowValues::Blob(bytes) => out.put_slice(bytea_hex(bytes).as_bytes()),
        }
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

fn float_text(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        f.to_string()
    }
}

fn bytea_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(2 + bytes.len() * 2);
    s.push_str("\\x");
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}
