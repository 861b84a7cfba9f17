//! Row cursor shared by every file of one export.
//!
//! The cursor wraps the caller's [`RowSource`] for the duration of an export.
//! It holds back the one row that did not fit into the previous file,
//! checks the cancel flag before every pull, and releases the source exactly
//! once: explicitly through [`RowCursor::close`], or on drop if an error path
//! skipped that call.

use tracing::warn;

use crate::cancel::CancelFlag;
use crate::error::Result;
use crate::value::Row;

use super::RowSource;

pub struct RowCursor<'a> {
    source: &'a mut dyn RowSource,
    cancel: CancelFlag,
    held_back: Option<Row>,
    closed: bool,
}

impl<'a> RowCursor<'a> {
    pub fn new(source: &'a mut dyn RowSource, cancel: CancelFlag) -> Self {
        Self {
            source,
            cancel,
            held_back: None,
            closed: false,
        }
    }

    pub fn columns(&self) -> &[String] {
        self.source.columns()
    }

    /// Pulls the next row, preferring one that was held back.
    ///
    /// Returns `Ok(None)` only on true exhaustion of the source.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        self.cancel.check()?;
        if let Some(row) = self.held_back.take() {
            return Ok(Some(row));
        }
        self.source.next_row().transpose()
    }

    /// Returns a row that did not fit; the next [`next_row`](Self::next_row)
    /// yields it again.
    pub fn hold_back(&mut self, row: Row) {
        debug_assert!(self.held_back.is_none(), "only one row can be held back");
        self.held_back = Some(row);
    }

    /// Fails fast once the export has been cancelled.
    pub fn ensure_active(&self) -> Result<()> {
        self.cancel.check()
    }

    /// Releases the row source. Later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.held_back = None;
        self.source.close()
    }
}

impl Drop for RowCursor<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(table = self.source.table_name(), error = %err, "failed to release row source");
        }
    }
}
