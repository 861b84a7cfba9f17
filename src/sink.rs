//! Bounded file sink.
//!
//! [`FileSink`] is the byte sink behind one output data file. It counts every
//! byte that passes through it, which gives the encoders their file-size
//! accounting and the writer its "did this file receive anything" check.
//!
//! The destination is created (or truncated) on the first non-empty write.
//! A sink that never receives bytes leaves nothing on disk, so the empty
//! trailing file of a size-exact table never appears.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

/// Write buffer per open file: 64KB
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// A byte sink that knows how much it has accepted.
///
/// Encoders measure file size through this trait, so they run the same
/// against a [`FileSink`] or an in-memory buffer.
pub trait ByteSink: Write {
    /// Bytes accepted so far.
    fn bytes_written(&self) -> u64;
}

impl ByteSink for Vec<u8> {
    fn bytes_written(&self) -> u64 {
        self.len() as u64
    }
}

/// Byte sink for a single output file.
///
/// Call [`finish`](FileSink::finish) to flush and close the file and observe
/// errors. A sink dropped without `finish` still closes its file, logging any
/// flush failure.
///
/// # Example
///
/// ```rust,no_run
/// use std::io::Write;
/// use tabledump::sink::FileSink;
///
/// let mut sink = FileSink::open("out/db.t.0.sql");
/// assert!(!sink.written_any());
/// sink.write_all(b"INSERT INTO `t` VALUES\n(1);\n")?;
/// sink.finish()?;
/// assert!(sink.written_any());
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    bytes_written: u64,
    finished: bool,
}

impl FileSink {
    /// Prepares a sink for `path`. No file is touched until the first write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            bytes_written: 0,
            finished: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether any byte reached this sink.
    pub fn written_any(&self) -> bool {
        self.bytes_written > 0
    }

    /// Bytes accepted so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes and closes the file. Later calls are no-ops.
    pub fn finish(&mut self) -> io::Result<()> {
        self.finished = true;
        match self.writer.take() {
            Some(mut writer) => {
                writer.flush()?;
                trace!(path = %self.path.display(), bytes = self.bytes_written, "closed output file");
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        if self.finished {
            return Err(io::Error::other(format!(
                "write to closed output file {}",
                self.path.display()
            )));
        }
        if self.writer.is_none() {
            let file = File::create(&self.path)?;
            trace!(path = %self.path.display(), "created output file");
            self.writer = Some(BufWriter::with_capacity(WRITE_BUFFER_SIZE, file));
        }
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("output file is not open"))
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let written = self.writer()?.write(buf)?;
        self.bytes_written += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl ByteSink for FileSink {
    fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.flush() {
                warn!(path = %self.path.display(), error = %err, "failed to flush output file on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_no_write_creates_no_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.sql");

        let mut sink = FileSink::open(&path);
        sink.write_all(b"").unwrap();
        sink.finish().unwrap();

        assert!(!sink.written_any());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_counts_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let mut sink = FileSink::open(&path);
        sink.write_all(b"a,b\n").unwrap();
        sink.write_all(b"c,d\n").unwrap();
        sink.finish().unwrap();

        assert!(sink.written_any());
        assert_eq!(sink.bytes_written(), 8);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a,b\nc,d\n");
    }

    #[test]
    fn test_truncates_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "stale content that is long").unwrap();

        let mut sink = FileSink::open(&path);
        sink.write_all(b"new").unwrap();
        sink.finish().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_write_after_finish_fails() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::open(dir.path().join("x.sql"));
        sink.write_all(b"1").unwrap();
        sink.finish().unwrap();
        sink.finish().unwrap();
        assert!(sink.write_all(b"2").is_err());
    }

    #[test]
    fn test_drop_flushes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dropped.sql");
        {
            let mut sink = FileSink::open(&path);
            sink.write_all(b"payload").unwrap();
        }
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "payload");
    }

    #[test]
    fn test_create_failure_surfaces() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::open(dir.path().join("missing").join("x.sql"));
        assert!(sink.write_all(b"data").is_err());
        assert!(!sink.written_any());
    }
}
