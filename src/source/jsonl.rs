//! JSON Lines row source.
//!
//! Each non-blank line holds one row, either as a JSON array of values in
//! column order or as a JSON object keyed by column name:
//!
//! ```text
//! [1, "alice", null]
//! {"id": 2, "name": "bob", "email": "bob@example.com"}
//! ```
//!
//! Without explicit columns the keys of the first object become the columns.
//! Nested arrays and objects are stored as their JSON text.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value as JsonValue;

use crate::error::{DumpError, Result};
use crate::value::{Row, Value};

use super::{ChunkIdentity, RowSource};

/// Default read buffer: 64KB
const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Streaming row source over a JSON Lines file.
pub struct JsonlRowSource<R: BufRead = BufReader<File>> {
    identity: ChunkIdentity,
    columns: Vec<String>,
    reader: Option<R>,
    line: String,
    line_number: u64,
    peeked: Option<JsonValue>,
}

impl JsonlRowSource {
    /// Opens a JSON Lines file.
    pub fn open(path: impl AsRef<Path>, identity: ChunkIdentity) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(
            BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file),
            identity,
        ))
    }
}

impl<R: BufRead> JsonlRowSource<R> {
    pub fn from_reader(reader: R, identity: ChunkIdentity) -> Self {
        Self {
            identity,
            columns: Vec::new(),
            reader: Some(reader),
            line: String::new(),
            line_number: 0,
            peeked: None,
        }
    }

    /// Uses explicit column names instead of deriving them from the data.
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Derives column names from the first row if it is a JSON object.
    ///
    /// The first row is parsed ahead and replayed by the next pull.
    pub fn detect_columns(mut self) -> Result<Self> {
        if self.columns.is_empty() {
            if let Some(first) = self.read_json()? {
                if let JsonValue::Object(map) = &first {
                    self.columns = map.keys().cloned().collect();
                }
                self.peeked = Some(first);
            }
        }
        Ok(self)
    }

    fn read_json(&mut self) -> Result<Option<JsonValue>> {
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        loop {
            self.line.clear();
            if reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_number += 1;
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_str(trimmed).map(Some).map_err(|err| {
                DumpError::row_decode(&self.identity.table, self.line_number, err.to_string())
            });
        }
    }

    fn decode(&self, json: JsonValue) -> Result<Row> {
        match json {
            JsonValue::Array(values) => {
                if !self.columns.is_empty() && values.len() != self.columns.len() {
                    return Err(DumpError::row_decode(
                        &self.identity.table,
                        self.line_number,
                        format!(
                            "expected {} values, found {}",
                            self.columns.len(),
                            values.len()
                        ),
                    ));
                }
                Ok(values.into_iter().map(json_to_value).collect())
            }
            JsonValue::Object(mut map) => {
                if self.columns.is_empty() {
                    return Err(DumpError::row_decode(
                        &self.identity.table,
                        self.line_number,
                        "object rows need column names",
                    ));
                }
                Ok(self
                    .columns
                    .iter()
                    .map(|column| map.remove(column).map_or(Value::Null, json_to_value))
                    .collect())
            }
            other => Err(DumpError::row_decode(
                &self.identity.table,
                self.line_number,
                format!("expected a JSON array or object, found {other}"),
            )),
        }
    }
}

fn json_to_value(json: JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(u) = n.as_u64() {
                Value::UInt(u)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => Value::Text(s),
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => Value::Text(nested.to_string()),
    }
}

impl<R: BufRead> RowSource for JsonlRowSource<R> {
    fn database_name(&self) -> &str {
        &self.identity.database
    }

    fn table_name(&self) -> &str {
        &self.identity.table
    }

    fn chunk_index(&self) -> u64 {
        self.identity.chunk_index
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Option<Result<Row>> {
        let json = match self.peeked.take() {
            Some(json) => json,
            None => match self.read_json() {
                Ok(Some(json)) => json,
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            },
        };
        Some(self.decode(json))
    }

    fn close(&mut self) -> Result<()> {
        self.reader = None;
        self.peeked = None;
        Ok(())
    }
}
