//! The row source contract consumed by the writer.
//!
//! - [`ChunkIdentity`] - which database, table and chunk a source belongs to
//! - [`RowSource`] - forward-only cursor over the rows of one chunk

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::value::Row;

/// Identity of one exported chunk of a table.
///
/// Read once when an export starts; the chunk index seeds the file namer's
/// sequence counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkIdentity {
    /// Database (schema) name
    pub database: String,
    /// Table name
    pub table: String,
    /// Sequence number of this chunk within the table
    pub chunk_index: u64,
}

impl ChunkIdentity {
    pub fn new(database: impl Into<String>, table: impl Into<String>, chunk_index: u64) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            chunk_index,
        }
    }
}

/// Forward-only cursor over the rows of one table chunk.
///
/// The writer pulls rows one at a time and never asks for a row twice.
/// [`close`](RowSource::close) is called exactly once per export, whether the
/// export succeeded or not.
///
/// # Object Safety
///
/// This trait is object-safe; the writer consumes `&mut dyn RowSource`.
///
/// # Example
///
/// ```rust
/// use tabledump::source::{RowSource, VecRowSource};
/// use tabledump::Value;
///
/// let mut source = VecRowSource::new("shop", "orders", 0)
///     .with_rows(vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
///
/// assert_eq!(source.table_name(), "orders");
/// assert_eq!(source.next_row().unwrap().unwrap(), vec![Value::Int(1)]);
/// ```
pub trait RowSource {
    /// Database the rows belong to.
    fn database_name(&self) -> &str;

    /// Table the rows belong to.
    fn table_name(&self) -> &str;

    /// Sequence number of this chunk within its table.
    fn chunk_index(&self) -> u64;

    /// Column names in row order, if known.
    ///
    /// Used for CSV headers and complete `INSERT` statements. Default: none.
    fn columns(&self) -> &[String] {
        &[]
    }

    /// Pulls the next row.
    ///
    /// Returns `None` once the source is exhausted and `Some(Err(..))` when a
    /// row cannot be decoded. A decoding failure is fatal for the export.
    fn next_row(&mut self) -> Option<Result<Row>>;

    /// Releases the underlying cursor.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Snapshot of the chunk identity.
    fn identity(&self) -> ChunkIdentity {
        ChunkIdentity::new(self.database_name(), self.table_name(), self.chunk_index())
    }
}
