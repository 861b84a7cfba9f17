//! In-memory row source.

use std::collections::VecDeque;

use crate::error::Result;
use crate::value::Row;

use super::{ChunkIdentity, RowSource};

/// Row source backed by a vector of rows.
///
/// Useful for tests and for callers that already hold a small result set.
/// Rows may also be queued as errors to simulate a cursor that fails
/// mid-stream.
#[derive(Debug)]
pub struct VecRowSource {
    identity: ChunkIdentity,
    columns: Vec<String>,
    rows: VecDeque<Result<Row>>,
    close_calls: usize,
}

impl VecRowSource {
    pub fn new(database: impl Into<String>, table: impl Into<String>, chunk_index: u64) -> Self {
        Self::from_identity(ChunkIdentity::new(database, table, chunk_index))
    }

    pub fn from_identity(identity: ChunkIdentity) -> Self {
        Self {
            identity,
            columns: Vec::new(),
            rows: VecDeque::new(),
            close_calls: 0,
        }
    }

    /// Sets the column names.
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Appends rows to the queue.
    #[must_use]
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows.into_iter().map(Ok));
        self
    }

    /// Appends a single entry, which may be an error.
    pub fn push(&mut self, row: Result<Row>) {
        self.rows.push_back(row);
    }

    /// Rows not yet pulled.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// How many times [`RowSource::close`] was called.
    pub fn close_calls(&self) -> usize {
        self.close_calls
    }
}

impl RowSource for VecRowSource {
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
        self.rows.pop_front()
    }

    fn close(&mut self) -> Result<()> {
        self.close_calls += 1;
        self.rows.clear();
        Ok(())
    }
}
