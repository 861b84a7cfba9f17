//! Column values and their textual encodings.
//!
//! A [`Row`] is an ordered list of [`Value`]s, one per column. Values know how
//! to render themselves as MySQL literals (for `INSERT` statements) and as raw
//! CSV fields.

use std::borrow::Cow;
use std::fmt::Write as _;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of a table, in column order.
pub type Row = Vec<Value>;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single column value as produced by a row source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SQL `NULL`
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Character data
    Text(String),
    /// Binary data, rendered as a hex literal in SQL
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Appends this value as a MySQL literal.
    ///
    /// Strings use backslash escaping, binary data becomes `X'..'`.
    /// Non-finite floats have no numeric literal and are written as quoted
    /// strings.
    pub fn write_sql_literal(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("NULL"),
            Value::Bool(b) => out.push(if *b { '1' } else { '0' }),
            Value::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Value::UInt(n) => {
                let _ = write!(out, "{n}");
            }
            Value::Float(f) if f.is_finite() => {
                let _ = write!(out, "{f}");
            }
            Value::Float(f) => {
                let _ = write!(out, "'{f}'");
            }
            Value::Text(s) => {
                out.push('\'');
                escape_sql_string(s, out);
                out.push('\'');
            }
            Value::Bytes(bytes) if bytes.is_empty() => out.push_str("''"),
            Value::Bytes(bytes) => {
                out.push_str("X'");
                for byte in bytes {
                    let _ = write!(out, "{byte:02X}");
                }
                out.push('\'');
            }
            Value::DateTime(dt) => {
                let _ = write!(out, "'{}'", dt.format(DATETIME_FORMAT));
            }
        }
    }

    /// Returns this value as a MySQL literal.
    pub fn to_sql_literal(&self) -> String {
        let mut out = String::new();
        self.write_sql_literal(&mut out);
        out
    }

    /// Returns the raw CSV field for this value, or `None` for `NULL` so the
    /// caller can substitute its null token.
    pub fn csv_field(&self) -> Option<Cow<'_, [u8]>> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(Cow::Borrowed(if *b { &b"1"[..] } else { &b"0"[..] })),
            Value::Int(n) => Some(Cow::Owned(n.to_string().into_bytes())),
            Value::UInt(n) => Some(Cow::Owned(n.to_string().into_bytes())),
            Value::Float(f) => Some(Cow::Owned(f.to_string().into_bytes())),
            Value::Text(s) => Some(Cow::Borrowed(s.as_bytes())),
            Value::Bytes(bytes) => Some(Cow::Borrowed(bytes.as_slice())),
            Value::DateTime(dt) => Some(Cow::Owned(
                dt.format(DATETIME_FORMAT).to_string().into_bytes(),
            )),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// MySQL string escaping, matching `mysql_real_escape_string`.
fn escape_sql_string(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '\0' => out.push_str("\\0"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x08' => out.push_str("\\b"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1a' => out.push_str("\\Z"),
            '\\' => out.push_str("\\\\"),
            _ => out.push(ch),
        }
    }
}

/// Back-quotes an identifier, doubling embedded back-quotes.
pub fn quote_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
    out
}
