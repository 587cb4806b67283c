//! Decoding payloads into flat name → value mappings.
//!
//! A payload is one document whose top level is a mapping from names to
//! scalars. Nested tables, arrays and nulls are rejected: silently dropping
//! part of a configuration is worse than refusing it.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{RegistryError, Result};
use crate::registry::value::Value;
use crate::settings::PayloadFormat;

pub fn decode(data: &[u8], format: PayloadFormat) -> Result<BTreeMap<String, Value>> {
    match format {
        PayloadFormat::Json => decode_json(data),
        PayloadFormat::Toml => decode_toml(data),
    }
}

fn decode_json(data: &[u8]) -> Result<BTreeMap<String, Value>> {
    let map: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(data).map_err(|e| RegistryError::Decode(e.to_string()))?;

    map.into_iter()
        .map(|(name, raw)| {
            let value = json_scalar(&name, raw)?;
            Ok((name, value))
        })
        .collect()
}

fn json_scalar(name: &str, raw: serde_json::Value) -> Result<Value> {
    use serde_json::Value as Json;

    match raw {
        Json::Bool(b) => Ok(Value::Bool(b)),
        Json::String(s) => Ok(Value::Text(s)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if n.is_u64() {
                Err(RegistryError::Decode(format!(
                    "{name}: integer {n} does not fit in int64"
                )))
            } else {
                n.as_f64().map(Value::Float).ok_or_else(|| {
                    RegistryError::Decode(format!("{name}: unsupported number {n}"))
                })
            }
        }
        Json::Null => Err(not_scalar(name, "null")),
        Json::Array(_) => Err(not_scalar(name, "array")),
        Json::Object(_) => Err(not_scalar(name, "object")),
    }
}

fn decode_toml(data: &[u8]) -> Result<BTreeMap<String, Value>> {
    let text = std::str::from_utf8(data).map_err(|e| RegistryError::Decode(e.to_string()))?;
    let table: toml::Table = text
        .parse()
        .map_err(|e: toml::de::Error| RegistryError::Decode(e.to_string()))?;

    table
        .into_iter()
        .map(|(name, raw)| {
            let value = toml_scalar(&name, raw)?;
            Ok((name, value))
        })
        .collect()
}

fn toml_scalar(name: &str, raw: toml::Value) -> Result<Value> {
    match raw {
        toml::Value::Integer(i) => Ok(Value::Int(i)),
        toml::Value::Float(f) => Ok(Value::Float(f)),
        toml::Value::Boolean(b) => Ok(Value::Bool(b)),
        toml::Value::String(s) => Ok(Value::Text(s)),
        toml::Value::Datetime(dt) => toml_datetime(name, dt).map(Value::Time),
        toml::Value::Array(_) => Err(not_scalar(name, "array")),
        toml::Value::Table(_) => Err(not_scalar(name, "table")),
    }
}

/// Offset datetimes keep their instant; local datetimes are read as UTC, the
/// same way the fixed text format is.
fn toml_datetime(name: &str, dt: toml::value::Datetime) -> Result<DateTime<Utc>> {
    let text = dt.to_string();
    let invalid = |reason: &str| {
        RegistryError::Decode(format!("{name}: datetime {text} {reason}"))
    };

    match (dt.date, dt.time, dt.offset) {
        (Some(_), Some(_), Some(_)) => DateTime::parse_from_rfc3339(&text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| invalid(&e.to_string())),
        (Some(date), Some(time), None) => {
            NaiveDate::from_ymd_opt(date.year.into(), date.month.into(), date.day.into())
                .and_then(|d| {
                    d.and_hms_nano_opt(
                        time.hour.into(),
                        time.minute.into(),
                        time.second.into(),
                        time.nanosecond,
                    )
                })
                .map(|t| t.and_utc())
                .ok_or_else(|| invalid("is out of range"))
        }
        _ => Err(invalid("needs a date and a time")),
    }
}

fn not_scalar(name: &str, found: &str) -> RegistryError {
    RegistryError::Decode(format!("{name}: expected a scalar, found {found}"))
}
