//! The export driver and sidecar metadata writer.
//!
//! [`Writer`] is the surface the rest of a dump tool talks to. One call to
//! [`write_table_data`](Writer::write_table_data) exports one chunk of a
//! table: it names a file, lets the configured encoder fill it until the
//! file-size threshold is reached, then moves on to the next name until the
//! row source is exhausted.
//!
//! # Example
//!
//! ```rust,no_run
//! use tabledump::config::DumpConfig;
//! use tabledump::source::VecRowSource;
//! use tabledump::writer::{OutputWriter, Writer};
//! use tabledump::Value;
//!
//! # fn main() -> tabledump::Result<()> {
//! let writer = OutputWriter::new(DumpConfig::new("dump").with_file_size(64 * 1024 * 1024))?;
//!
//! writer.write_database_meta("shop", "CREATE DATABASE `shop`")?;
//! writer.write_table_meta("shop", "orders", "CREATE TABLE `orders` (`id` int)")?;
//!
//! let mut source = VecRowSource::new("shop", "orders", 0)
//!     .with_rows(vec![vec![Value::Int(1)], vec![Value::Int(2)]]);
//! let stats = writer.write_table_data(&mut source)?;
//! println!("wrote {} rows into {} files", stats.rows, stats.files.len());
//! # Ok(())
//! # }
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::cancel::CancelFlag;
use crate::config::DumpConfig;
use crate::encode::statement::SESSION_PREAMBLE;
use crate::encode::{self, EncodeBudget, EncodeOptions};
use crate::error::{DumpError, Result};
use crate::naming::{FileNamer, file_name_problem};
use crate::sink::FileSink;
use crate::source::{ChunkIdentity, RowCursor, RowSource};

/// Writes the files of a dump.
///
/// Implementations hold only configuration, so one writer can serve several
/// tables exported concurrently.
pub trait Writer: Send + Sync {
    /// Writes `<db>-schema-create.sql`.
    fn write_database_meta(&self, database: &str, create_sql: &str) -> Result<()>;

    /// Writes `<db>.<table>-schema.sql`.
    fn write_table_meta(&self, database: &str, table: &str, create_sql: &str) -> Result<()>;

    /// Exports every row of `source` into one or more data files.
    ///
    /// The source is closed exactly once before this returns, whether the
    /// export succeeded or not.
    fn write_table_data(&self, source: &mut dyn RowSource) -> Result<TableDumpStats>;
}

/// What one `write_table_data` call produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableDumpStats {
    /// Data files in the order they were written
    pub files: Vec<PathBuf>,
    /// Rows written across all files
    pub rows: u64,
    /// Bytes written across all files
    pub bytes: u64,
}

/// File-backed [`Writer`].
#[derive(Debug, Clone)]
pub struct OutputWriter {
    config: DumpConfig,
    cancel: CancelFlag,
}

impl OutputWriter {
    /// Validates `config` and creates the output directory.
    pub fn new(config: DumpConfig) -> Result<Self> {
        config.validate()?;
        config.format.ensure_available()?;
        if config.file_size.is_some() && !config.output_file_template.uses_index() {
            warn!(
                template = %config.output_file_template,
                "file size is set but the template has no {{{{.Index}}}}; split files will overwrite each other"
            );
        }
        fs::create_dir_all(&config.output_dir)?;
        Ok(Self {
            config,
            cancel: CancelFlag::new(),
        })
    }

    /// Shares `cancel` with this writer; raising it aborts running exports.
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    fn meta_path(&self, name: String) -> Result<PathBuf> {
        if let Some(problem) = file_name_problem(&name) {
            return Err(DumpError::invalid_config(format!(
                "metadata file name '{name}' {problem}"
            )));
        }
        Ok(self.config.output_dir.join(name))
    }

    fn dump_chunk(
        &self,
        identity: &ChunkIdentity,
        cursor: &mut RowCursor<'_>,
    ) -> Result<TableDumpStats> {
        let mut namer = FileNamer::new(&self.config.output_file_template, identity);
        let budget = EncodeBudget::new(self.config.statement_size, self.config.file_size);
        let options = EncodeOptions {
            table: &identity.table,
            complete_insert: self.config.complete_insert,
            csv: &self.config.csv,
        };
        let extension = self.config.format.extension();
        let mut stats = TableDumpStats::default();

        loop {
            let name = namer.next_name()?;
            let path = self.config.output_dir.join(format!("{name}.{extension}"));
            let mut sink = FileSink::open(&path);

            let encoded = encode::encode(self.config.format, cursor, &mut sink, &budget, &options);
            let finished = sink.finish();
            let encoded = match (encoded, finished) {
                (Ok(encoded), Ok(())) => encoded,
                (Ok(_), Err(err)) => return Err(err.into()),
                (Err(err), Ok(())) => return Err(err),
                (Err(err), Err(close_err)) => {
                    warn!(path = %path.display(), error = %close_err, "failed to close output file");
                    return Err(err);
                }
            };

            if !sink.written_any() {
                break;
            }
            debug!(
                path = %path.display(),
                rows = encoded.rows,
                bytes = sink.bytes_written(),
                "finished data file"
            );
            stats.rows += encoded.rows;
            stats.bytes += sink.bytes_written();
            stats.files.push(path);

            if self.config.file_size.is_none() || encoded.is_exhausted() {
                break;
            }
        }
        Ok(stats)
    }
}

impl Writer for OutputWriter {
    fn write_database_meta(&self, database: &str, create_sql: &str) -> Result<()> {
        self.cancel.check()?;
        let path = self.meta_path(format!("{database}-schema-create.sql"))?;
        write_meta_file(&path, create_sql)
    }

    fn write_table_meta(&self, database: &str, table: &str, create_sql: &str) -> Result<()> {
        self.cancel.check()?;
        let path = self.meta_path(format!("{database}.{table}-schema.sql"))?;
        write_meta_file(&path, create_sql)
    }

    fn write_table_data(&self, source: &mut dyn RowSource) -> Result<TableDumpStats> {
        let identity = source.identity();
        let started = Instant::now();
        debug!(
            database = %identity.database,
            table = %identity.table,
            chunk = identity.chunk_index,
            "start dumping table"
        );

        let mut cursor = RowCursor::new(source, self.cancel.clone());
        let result = self.dump_chunk(&identity, &mut cursor);
        let released = cursor.close();

        let stats = match (result, released) {
            (Ok(stats), Ok(())) => stats,
            (Ok(_), Err(err)) | (Err(err), Ok(())) => return Err(err),
            (Err(err), Err(release_err)) => {
                warn!(table = %identity.table, error = %release_err, "failed to release row source");
                return Err(err);
            }
        };

        debug!(
            database = %identity.database,
            table = %identity.table,
            files = stats.files.len(),
            rows = stats.rows,
            bytes = stats.bytes,
            elapsed = ?started.elapsed(),
            "dumping table successfully"
        );
        Ok(stats)
    }
}

/// Writes the session comment and `create_sql` into `path`, adding the
/// terminating `;` and newline when missing.
fn write_meta_file(path: &Path, create_sql: &str) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(SESSION_PREAMBLE.as_bytes())?;

    let sql = create_sql.trim_end();
    writer.write_all(sql.as_bytes())?;
    if !sql.ends_with(';') {
        writer.write_all(b";")?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;

    debug!(path = %path.display(), "wrote metadata file");
    Ok(())
}

/// Creates a boxed writer for `config`.
///
/// # Example
///
/// ```rust,no_run
/// use tabledump::config::DumpConfig;
/// use tabledump::writer::create_writer;
///
/// let writer = create_writer(DumpConfig::new("dump"))?;
/// writer.write_database_meta("shop", "CREATE DATABASE `shop`")?;
/// # Ok::<(), tabledump::DumpError>(())
/// ```
pub fn create_writer(config: DumpConfig) -> Result<Box<dyn Writer>> {
    Ok(Box::new(OutputWriter::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::VecRowSource;
    use crate::value::Value;
    use tempfile::tempdir;

    #[test]
    fn test_writer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OutputWriter>();
    }

    #[test]
    fn test_new_creates_output_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("dump");
        OutputWriter::new(DumpConfig::new(&out)).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_own_cancel_flag_aborts_export() {
        let dir = tempdir().unwrap();
        let writer = OutputWriter::new(DumpConfig::new(dir.path()).with_file_size(4096)).unwrap();
        assert_eq!(writer.config().file_size, Some(4096));

        writer.cancel_flag().cancel();
        let mut source = VecRowSource::new("d", "t", 0).with_rows(vec![vec![Value::Int(1)]]);
        let err = writer.write_table_data(&mut source).unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(source.close_calls(), 1);
        assert!(!dir.path().join("d.t.0.sql").exists());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let dir = tempdir().unwrap();
        let config = DumpConfig::new(dir.path()).with_statement_size(0);
        assert!(OutputWriter::new(config).is_err());
    }

    #[test]
    fn test_meta_file_terminated_once() {
        let dir = tempdir().unwrap();
        let writer = OutputWriter::new(DumpConfig::new(dir.path())).unwrap();

        writer.write_database_meta("shop", "CREATE DATABASE `shop`").unwrap();
        writer
            .write_table_meta("shop", "orders", "CREATE TABLE `orders` (`id` int);\n")
            .unwrap();

        let db = fs::read_to_string(dir.path().join("shop-schema-create.sql")).unwrap();
        assert_eq!(db, "/*!40101 SET NAMES binary*/;\nCREATE DATABASE `shop`;\n");
        let table = fs::read_to_string(dir.path().join("shop.orders-schema.sql")).unwrap();
        assert_eq!(table, "/*!40101 SET NAMES binary*/;\nCREATE TABLE `orders` (`id` int);\n");
    }

    #[test]
    fn test_meta_rejects_path_in_name() {
        let dir = tempdir().unwrap();
        let writer = OutputWriter::new(DumpConfig::new(dir.path())).unwrap();
        assert!(writer.write_database_meta("../escape", "CREATE DATABASE x").is_err());
    }

    #[test]
    fn test_single_file_without_file_size() {
        let dir = tempdir().unwrap();
        let writer = OutputWriter::new(DumpConfig::new(dir.path())).unwrap();
        let mut source = VecRowSource::new("d", "t", 0)
            .with_rows((0..100).map(|i| vec![Value::Int(i)]).collect::<Vec<_>>());

        let stats = writer.write_table_data(&mut source).unwrap();
        assert_eq!(stats.files, vec![dir.path().join("d.t.0.sql")]);
        assert_eq!(stats.rows, 100);
        assert_eq!(source.close_calls(), 1);
    }

    #[test]
    fn test_cancelled_writer_releases_source() {
        let dir = tempdir().unwrap();
        let cancel = CancelFlag::new();
        let writer = OutputWriter::new(DumpConfig::new(dir.path()))
            .unwrap()
            .with_cancel_flag(cancel.clone());
        cancel.cancel();

        let mut source = VecRowSource::new("d", "t", 0).with_rows(vec![vec![Value::Int(1)]]);
        let err = writer.write_table_data(&mut source).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(source.close_calls(), 1);
        assert!(!dir.path().join("d.t.0.sql").exists());
    }
}
