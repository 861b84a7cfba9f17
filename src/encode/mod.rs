//! Format encoders.
//!
//! An encoder pulls rows from a [`RowCursor`] and writes their textual form
//! into one output file. It stops when the source is exhausted or when the
//! next row would push the file past its size budget; in the second case the
//! row is held back on the cursor for the next file. A row is never split
//! across two statements or two files.
//!
//! - [`statement`] - batched multi-row `INSERT` statements
//! - [`delimited`] - CSV records (requires the `csv-output` feature)

#[cfg(feature = "csv-output")]
pub mod delimited;
pub mod statement;

use crate::config::CsvOptions;
use crate::error::Result;
use crate::format::OutputFormat;
use crate::sink::ByteSink;
use crate::source::RowCursor;

/// Why an encoder returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// The row source has no more rows.
    Exhausted,
    /// The next row did not fit; it is held back for the next file.
    FileFull,
}

/// Result of encoding into one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    /// Rows written into this file
    pub rows: u64,
    pub outcome: EncodeOutcome,
}

impl Encoded {
    pub fn is_exhausted(&self) -> bool {
        self.outcome == EncodeOutcome::Exhausted
    }
}

/// Size limits applied while encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeBudget {
    /// Bytes per statement (SQL) or per write batch (CSV)
    pub statement_size: u64,
    /// Bytes per file; `None` never rolls over
    pub file_size: Option<u64>,
}

impl EncodeBudget {
    pub fn new(statement_size: u64, file_size: Option<u64>) -> Self {
        Self {
            statement_size,
            file_size,
        }
    }

    /// Whether a file holding `written` bytes may grow to `projected` bytes.
    ///
    /// An empty file always accepts its first row, however large.
    pub fn admits(&self, written: u64, projected: u64) -> bool {
        match self.file_size {
            None => true,
            Some(_) if written == 0 => true,
            Some(limit) => projected <= limit,
        }
    }
}

/// Format-specific settings for one export call.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions<'a> {
    /// Target table of `INSERT` statements
    pub table: &'a str,
    /// List column names in `INSERT` statements
    pub complete_insert: bool,
    pub csv: &'a CsvOptions,
}

/// Encodes rows into `sink` in the given format.
pub fn encode(
    format: OutputFormat,
    cursor: &mut RowCursor<'_>,
    sink: &mut dyn ByteSink,
    budget: &EncodeBudget,
    options: &EncodeOptions<'_>,
) -> Result<Encoded> {
    match format {
        OutputFormat::Sql => statement::encode_statements(cursor, sink, budget, options),
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => delimited::encode_records(cursor, sink, budget, options.csv),
        #[allow(unreachable_patterns)]
        _ => Err(crate::error::DumpError::UnsupportedFormat {
            format: "CSV",
            feature: "csv-output",
        }),
    }
}
