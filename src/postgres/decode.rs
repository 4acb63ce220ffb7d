use std::fmt::Write;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde_json::Value;
use tokio_postgres::Row;
use tokio_postgres::types::{Date, FromSql, Kind, Timestamp, Type};
use uuid::Uuid;

use super::ConnectionOptions;
use crate::error::LinkError;
use crate::results::ResultSet;
use crate::results::result_set::RowsBuilder;
use crate::types::RowValues;

/// Column decoding rules for one connection.
///
/// The policy travels with the link it was created for, so drivers with different precision
/// modes never affect each other's connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodePolicy {
    /// Decode BIGINT as exact text rather than `i64`.
    pub big_number_strings: bool,
}

impl From<&ConnectionOptions> for DecodePolicy {
    fn from(options: &ConnectionOptions) -> Self {
        Self {
            big_number_strings: options.big_number_strings,
        }
    }
}

/// Column bytes as the server sent them, whatever the column type.
struct RawColumn<'a>(Option<&'a [u8]>);

impl<'a> FromSql<'a> for RawColumn<'a> {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, LinkError> {
        Ok(Self(Some(raw)))
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, LinkError> {
        Ok(Self(None))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Decode every row of a statement result, named by `column_names`.
///
/// # Errors
/// Returns the error of the first column whose bytes do not match its type.
pub fn decode_rows(
    column_names: Vec<String>,
    rows: &[Row],
    policy: DecodePolicy,
) -> Result<ResultSet, LinkError> {
    let column_count = column_names.len();
    let mut builder = RowsBuilder::new(column_names, rows.len());
    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(decode_value(row, idx, policy)?);
        }
        builder.push(row_values);
    }
    Ok(builder.finish())
}

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns an error if the column bytes are malformed for the column type.
pub fn decode_value(row: &Row, idx: usize, policy: DecodePolicy) -> Result<RowValues, LinkError> {
    let column = &row.columns()[idx];
    let RawColumn(raw) = row.try_get(idx)?;
    decode_raw(column.type_(), raw, policy)
        .map_err(|e| format!("error decoding column \"{}\": {e}", column.name()).into())
}

/// Map one binary-format column value to a `RowValues`.
///
/// `raw` is `None` for SQL NULL. Types without a dedicated rule come back as text for enums
/// and text-like types, and as raw bytes otherwise.
///
/// # Errors
/// Returns an error if `raw` is malformed for `ty`.
pub fn decode_raw(
    ty: &Type,
    raw: Option<&[u8]>,
    policy: DecodePolicy,
) -> Result<RowValues, LinkError> {
    let Some(raw) = raw else {
        return Ok(RowValues::Null);
    };

    let value = match *ty {
        Type::INT2 => RowValues::Int(i64::from(i16::from_sql(ty, raw)?)),
        Type::INT4 => RowValues::Int(i64::from(i32::from_sql(ty, raw)?)),
        Type::INT8 => {
            let v = i64::from_sql(ty, raw)?;
            if policy.big_number_strings {
                RowValues::Text(v.to_string())
            } else {
                RowValues::Int(v)
            }
        }
        Type::OID => RowValues::Int(i64::from(u32::from_sql(ty, raw)?)),
        Type::FLOAT4 => RowValues::Float(widen_float4(f32::from_sql(ty, raw)?)),
        Type::FLOAT8 => RowValues::Float(f64::from_sql(ty, raw)?),
        Type::NUMERIC => {
            let text = numeric_text(raw)?;
            match text.parse::<f64>() {
                Ok(f) => RowValues::Float(f),
                Err(_) => RowValues::Text(text),
            }
        }
        Type::DATE => RowValues::Text(match Date::<NaiveDate>::from_sql(ty, raw)? {
            Date::PosInfinity => "infinity".to_string(),
            Date::NegInfinity => "-infinity".to_string(),
            Date::Value(d) => date_text(d),
        }),
        Type::TIME => RowValues::Text(time_text(i64::from_be_bytes(raw.try_into()?))),
        Type::TIMESTAMP => RowValues::Text(match Timestamp::<NaiveDateTime>::from_sql(ty, raw)? {
            Timestamp::PosInfinity => "infinity".to_string(),
            Timestamp::NegInfinity => "-infinity".to_string(),
            Timestamp::Value(ts) => timestamp_text(ts, ""),
        }),
        Type::TIMESTAMPTZ => {
            RowValues::Text(match Timestamp::<DateTime<Utc>>::from_sql(ty, raw)? {
                Timestamp::PosInfinity => "infinity".to_string(),
                Timestamp::NegInfinity => "-infinity".to_string(),
                Timestamp::Value(ts) => timestamp_text(ts.naive_utc(), "+00"),
            })
        }
        Type::INTERVAL => RowValues::Text(interval_text(raw)?),
        Type::JSON | Type::JSONB => RowValues::JSON(Value::from_sql(ty, raw)?),
        Type::BOOL => RowValues::Bool(bool::from_sql(ty, raw)?),
        Type::BYTEA => RowValues::Blob(raw.to_vec()),
        Type::UUID => RowValues::Text(Uuid::from_sql(ty, raw)?.to_string()),
        _ if <&str as FromSql>::accepts(ty) => {
            RowValues::Text(<&str as FromSql>::from_sql(ty, raw)?.to_string())
        }
        // enum labels travel as their text
        _ if matches!(ty.kind(), Kind::Enum(_)) => {
            RowValues::Text(String::from_utf8_lossy(raw).into_owned())
        }
        _ => RowValues::Blob(raw.to_vec()),
    };

    Ok(value)
}

// Go through the shortest decimal form so 0.1::real reads back as 0.1.
fn widen_float4(f: f32) -> f64 {
    f.to_string().parse().unwrap_or(f64::from(f))
}

const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Render a binary NUMERIC the way PostgreSQL prints it.
///
/// The wire form is base-10000 digits with a weight (exponent of the first digit group) and
/// a display scale.
fn numeric_text(raw: &[u8]) -> Result<String, LinkError> {
    if raw.len() < 8 {
        return Err("invalid numeric value".into());
    }
    let int = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]);
    let word = |i: usize| u16::from_be_bytes([raw[i], raw[i + 1]]);

    let ndigits = usize::from(word(0));
    let weight = i32::from(int(2));
    let sign = word(4);
    let dscale = usize::from(word(6));
    if raw.len() != 8 + 2 * ndigits {
        return Err("invalid numeric value".into());
    }

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_string()),
        NUMERIC_PINF => return Ok("Infinity".to_string()),
        NUMERIC_NINF => return Ok("-Infinity".to_string()),
        _ => {}
    }

    let digits: Vec<i16> = (0..ndigits).map(|i| int(8 + 2 * i)).collect();
    let digit = |d: i32| {
        usize::try_from(d)
            .ok()
            .and_then(|d| digits.get(d))
            .copied()
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }
    if weight < 0 {
        out.push('0');
    } else {
        for d in 0..=weight {
            if d == 0 {
                let _ = write!(out, "{}", digit(d));
            } else {
                let _ = write!(out, "{:04}", digit(d));
            }
        }
    }

    if dscale > 0 {
        let mut frac = String::new();
        let mut d = weight + 1;
        while frac.len() < dscale {
            let _ = write!(frac, "{:04}", digit(d));
            d += 1;
        }
        frac.truncate(dscale);
        out.push('.');
        out.push_str(&frac);
    }
    Ok(out)
}

// PostgreSQL writes years before 1 AD as "0044-03-15 BC".
fn ymd_text(d: NaiveDate) -> (String, &'static str) {
    let (year, era) = if d.year() > 0 {
        (d.year(), "")
    } else {
        (1 - d.year(), " BC")
    };
    (format!("{year:04}-{:02}-{:02}", d.month(), d.day()), era)
}

fn date_text(d: NaiveDate) -> String {
    let (ymd, era) = ymd_text(d);
    format!("{ymd}{era}")
}

fn timestamp_text(ts: NaiveDateTime, offset: &str) -> String {
    let (ymd, era) = ymd_text(ts.date());
    let t = ts.time();
    let micros = i64::from(t.num_seconds_from_midnight()) * 1_000_000
        + i64::from(t.nanosecond() / 1_000);
    format!("{ymd} {}{offset}{era}", time_text(micros))
}

fn time_text(micros: i64) -> String {
    let micros = micros.unsigned_abs();
    let secs = micros / 1_000_000;
    clock_text(secs / 3600, secs / 60 % 60, secs % 60, micros % 1_000_000)
}

// Fractions print without trailing zeros; an all-zero fraction is dropped.
fn clock_text(hours: u64, minutes: u64, seconds: u64, micros: u64) -> String {
    let mut out = format!("{hours:02}:{minutes:02}:{seconds:02}");
    if micros != 0 {
        let frac = format!("{micros:06}");
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

/// Render a binary INTERVAL in PostgreSQL's default `postgres` interval style.
fn interval_text(raw: &[u8]) -> Result<String, LinkError> {
    if raw.len() != 16 {
        return Err("invalid interval value".into());
    }
    let micros = i64::from_be_bytes(raw[0..8].try_into()?);
    let days = i32::from_be_bytes(raw[8..12].try_into()?);
    let months = i32::from_be_bytes(raw[12..16].try_into()?);

    let mut out = String::new();
    let mut is_zero = true;
    let mut is_before = false;
    for (value, unit) in [(months / 12, "year"), (months % 12, "mon"), (days, "day")] {
        if value == 0 {
            continue;
        }
        let _ = write!(
            out,
            "{}{}{value} {unit}{}",
            if is_zero { "" } else { " " },
            if is_before && value > 0 { "+" } else { "" },
            if value == 1 { "" } else { "s" },
        );
        is_before = value < 0;
        is_zero = false;
    }

    if is_zero || micros != 0 {
        let sign = if micros < 0 {
            "-"
        } else if is_before {
            "+"
        } else {
            ""
        };
        let _ = write!(
            out,
            "{}{sign}{}",
            if is_zero { "" } else { " " },
            time_text(micros)
        );
    }
    Ok(out)
}
