//! Unified error types for tabledump.
//!
//! This module provides a single [`DumpError`] enum that covers every failure
//! the output engine can report. Errors are fatal for the table being exported:
//! the writer never retries, it propagates the first error to the caller.
//!
//! # Error Kinds
//!
//! - **Template errors** - the output file template is malformed or renders an
//!   unusable file name
//! - **I/O errors** - opening, writing or closing an output file failed
//! - **Row errors** - the row source yielded a row that could not be decoded,
//!   or failed while releasing its resources
//! - **Cancellation** - the shared cancel flag was raised mid-export

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for tabledump operations.
///
/// # Example
///
/// ```rust
/// use tabledump::error::Result;
///
/// fn my_function() -> Result<u64> {
///     // ... operations that may fail
///     Ok(0)
/// }
/// ```
pub type Result<T> = std::result::Result<T, DumpError>;

/// The error type for all tabledump operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DumpError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The output directory is not writable
    /// - Disk is full
    /// - A file handle could not be flushed on close
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The output file template is malformed or produced an unusable name.
    ///
    /// Malformed templates are rejected when the template is compiled;
    /// rendering only fails when the resulting name is not a plain file name.
    #[error("Invalid output file template '{template}': {message}")]
    Template {
        /// The template source text
        template: String,
        /// Description of what's wrong
        message: String,
    },

    /// The row source yielded a row that could not be decoded.
    #[error("Failed to decode row {row} of table {table}: {message}")]
    RowDecode {
        /// Table being exported
        table: String,
        /// 1-based position of the row in the source
        row: u64,
        /// Description of the decoding failure
        message: String,
    },

    /// The row source reported a failure of its own, e.g. while releasing
    /// its underlying cursor.
    #[error("Row source for table {table} failed: {message}")]
    Source {
        /// Table being exported
        table: String,
        /// Description of the failure
        message: String,
    },

    /// The configuration was rejected before any file was written.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The requested output format was compiled out.
    #[error("Output format {format} requires the '{feature}' feature to be enabled")]
    UnsupportedFormat {
        /// Display name of the format
        format: &'static str,
        /// Cargo feature that provides it
        feature: &'static str,
    },

    /// CSV encoding error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The export was cancelled through its cancel flag.
    #[error("Export cancelled")]
    Cancelled,
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl DumpError {
    /// Creates a template error.
    pub fn template(template: impl Into<String>, message: impl Into<String>) -> Self {
        DumpError::Template {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Creates a row decoding error.
    pub fn row_decode(table: impl Into<String>, row: u64, message: impl Into<String>) -> Self {
        DumpError::RowDecode {
            table: table.into(),
            row,
            message: message.into(),
        }
    }

    /// Creates a row source error.
    pub fn source(table: impl Into<String>, message: impl Into<String>) -> Self {
        DumpError::Source {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        DumpError::InvalidConfig(message.into())
    }

    /// Returns `true` if this error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DumpError::Cancelled)
    }

    /// Returns `true` if this is a template error.
    pub fn is_template(&self) -> bool {
        matches!(self, DumpError::Template { .. })
    }

    /// Returns `true` if this is an I/O error.
    pub fn is_io(&self) -> bool {
        matches!(self, DumpError::Io(_))
    }
}
