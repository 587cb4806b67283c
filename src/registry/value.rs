//! Typed configuration values.
//!
//! Every entry in the registry holds one [`Value`]. Its [`Kind`] is fixed the
//! first time the name is defined or loaded; later writes must agree with it,
//! with two sanctioned conversions handled by [`Value::conform`]:
//!
//! ```text
//! Float (whole number) → Int        decoders often read `2009` as `2009.0`
//! Int (|i| ≤ 2^53)     → Float      decoders read `1` as an integer
//! Text                 → Time       "YYYY-MM-DD HH:MM:SS", read as UTC
//! Text                 → Duration   "5s", "2h30m", ...
//! ```

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::error::{RegistryError, Result};
use crate::registry::duration::{format_duration, parse_duration};

/// Fixed textual format for timestamps.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The declared type of a configuration entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Float,
    Text,
    Bool,
    Time,
    Duration,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int => "int64",
            Kind::Float => "float64",
            Kind::Text => "string",
            Kind::Bool => "bool",
            Kind::Time => "time",
            Kind::Duration => "duration",
        };
        f.write_str(name)
    }
}

/// Largest integer magnitude an `f64` holds exactly.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

impl Kind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Kind::Int | Kind::Float)
    }
}

/// A configuration value of one of the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Time(DateTime<Utc>),
    Duration(Duration),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Text(_) => Kind::Text,
            Value::Bool(_) => Kind::Bool,
            Value::Time(_) => Kind::Time,
            Value::Duration(_) => Kind::Duration,
        }
    }

    /// Parse `input` as a value of `kind` using the fixed textual formats.
    ///
    /// `name` is only used to give errors context.
    pub fn parse(name: &str, kind: Kind, input: &str) -> Result<Value> {
        let parse_err = |reason: String| RegistryError::Parse {
            name: name.to_string(),
            kind,
            input: input.to_string(),
            reason,
        };

        match kind {
            Kind::Int => input
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| parse_err(e.to_string())),
            Kind::Float => input
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| parse_err(e.to_string())),
            Kind::Text => Ok(Value::Text(input.to_string())),
            Kind::Bool => parse_bool(input)
                .map(Value::Bool)
                .ok_or_else(|| parse_err("expected true or false".to_string())),
            Kind::Time => NaiveDateTime::parse_from_str(input, TIME_FORMAT)
                .map(|t| Value::Time(t.and_utc()))
                .map_err(|e| parse_err(e.to_string())),
            Kind::Duration => parse_duration(input)
                .map(Value::Duration)
                .map_err(parse_err),
        }
    }

    /// Convert this value so that it agrees with `expected`.
    ///
    /// Same-kind values pass through. Whole floats narrow to `Int`, integers
    /// that a float holds exactly widen to `Float`, text parses into `Time` or
    /// `Duration`. Anything else is a kind mismatch.
    pub fn conform(self, name: &str, expected: Kind) -> Result<Value> {
        let actual = self.kind();
        if actual == expected {
            return Ok(self);
        }

        match (self, expected) {
            (Value::Float(f), Kind::Int)
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
            {
                Ok(Value::Int(f as i64))
            }
            (Value::Int(i), Kind::Float) if i.unsigned_abs() <= MAX_EXACT_FLOAT_INT => {
                Ok(Value::Float(i as f64))
            }
            (Value::Text(text), Kind::Time | Kind::Duration) => Value::parse(name, expected, &text),
            (other, _) => Err(RegistryError::KindMismatch {
                name: name.to_string(),
                expected,
                actual,
                value: other.to_string(),
            }),
        }
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Canonical text of a value: base-10 integers, six-decimal floats,
/// `true`/`false`, RFC 3339 timestamps and canonical durations.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:.6}"),
            Value::Text(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Time(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Value::Duration(v) => f.write_str(&format_duration(*v)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Text(_) | Value::Time(_) | Value::Duration(_) => {
                serializer.collect_str(self)
            }
        }
    }
}

macro_rules! int_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

// Unsigned values above i64::MAX wrap, as any fixed-width cast would.
int_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Time(v.and_utc())
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Value::Duration(v)
    }
}
