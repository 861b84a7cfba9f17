//! # Tabledump
//!
//! The output stage of a database dump tool: rows go in, size-bounded SQL or
//! CSV files come out.
//!
//! ## Overview
//!
//! A dump is written table by table, chunk by chunk. For each chunk the
//! writer pulls rows from a [`RowSource`](source::RowSource), encodes them
//! in the configured format and spreads them over as many files as the
//! file-size threshold demands:
//!
//! - **SQL** - multi-row `INSERT` statements, each kept under the statement size
//! - **CSV** - one record per row with configurable separator, delimiter and
//!   null token
//!
//! Files are named from a template such as `{{.DB}}.{{.Table}}.{{.Index}}`,
//! where the index starts at the chunk index and grows by one per file. A
//! file that would receive no rows is never created. Schema files for
//! databases and tables are written alongside the data.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabledump::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = DumpConfig::new("dump")
//!         .with_file_size(256 * 1024 * 1024)
//!         .with_statement_size(1_000_000);
//!     let writer = OutputWriter::new(config)?;
//!
//!     let mut source = VecRowSource::new("shop", "orders", 0)
//!         .with_columns(["id", "note"])
//!         .with_rows(vec![
//!             vec![Value::Int(1), Value::from("first")],
//!             vec![Value::Int(2), Value::Null],
//!         ]);
//!
//!     let stats = writer.write_table_data(&mut source)?;
//!     assert_eq!(stats.rows, 2);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`writer`] - [`Writer`](writer::Writer) trait, the export driver and metadata files
//! - [`source`] - [`RowSource`](source::RowSource) contract and bundled sources
//! - [`encode`] - SQL and CSV encoders
//! - [`sink`] - [`FileSink`](sink::FileSink), the byte-counting output file
//! - [`naming`] - output file templates and the file sequence counter
//! - [`config`] - [`DumpConfig`](config::DumpConfig), [`CsvOptions`](config::CsvOptions)
//! - [`format`] - [`OutputFormat`](format::OutputFormat)
//! - [`value`] - [`Value`] and [`Row`]
//! - [`error`] - Unified error types ([`DumpError`], [`Result`])
//! - [`prelude`] - Convenient re-exports

pub mod cancel;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod format;
pub mod naming;
pub mod sink;
pub mod source;
pub mod value;
pub mod writer;

// Re-export the main types at the crate root for convenience
pub use cancel::CancelFlag;
pub use error::{DumpError, Result};
pub use value::{Row, Value};

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use tabledump::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{CancelFlag, Row, Value};

    // Error types
    pub use crate::error::{DumpError, Result};

    // Configuration
    pub use crate::config::{CsvOptions, DumpConfig};
    pub use crate::format::OutputFormat;
    pub use crate::naming::OutputTemplate;

    // Row sources
    #[cfg(feature = "json-input")]
    pub use crate::source::JsonlRowSource;
    pub use crate::source::{ChunkIdentity, RowSource, VecRowSource};

    // Writers
    pub use crate::writer::{OutputWriter, TableDumpStats, Writer, create_writer};
}
