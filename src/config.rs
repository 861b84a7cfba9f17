//! Configuration types for the writer.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`DumpConfig`] - output directory, format, size budgets, file naming
//! - [`CsvOptions`] - delimited output settings
//!
//! # Example
//!
//! ```rust
//! use tabledump::config::{CsvOptions, DumpConfig};
//! use tabledump::format::OutputFormat;
//!
//! let config = DumpConfig::new("dump")
//!     .with_format(OutputFormat::Csv)
//!     .with_file_size(256 * 1024 * 1024)
//!     .with_csv(CsvOptions::new().with_null_value("NULL"));
//!
//! assert!(config.validate().is_ok());
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DumpError, Result};
use crate::format::OutputFormat;
use crate::naming::OutputTemplate;

/// Default statement size: 1,000,000 bytes
pub const DEFAULT_STATEMENT_SIZE: u64 = 1_000_000;

/// Default CSV null token
pub const DEFAULT_CSV_NULL_VALUE: &str = "\\N";

/// Configuration for delimited (CSV) output.
///
/// Separator and delimiter may span several bytes (`||`, `~~`). An empty
/// delimiter disables quoting entirely, so values containing the separator or
/// a line break are written as-is.
///
/// # Example
///
/// ```rust
/// use tabledump::config::CsvOptions;
///
/// let options = CsvOptions::new()
///     .with_separator("|")
///     .with_delimiter("'")
///     .with_header(false);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Token written for NULL values (default: `\N`)
    pub null_value: String,

    /// Field separator (default: `,`)
    pub separator: String,

    /// Quote character wrapped around fields that need it (default: `"`)
    pub delimiter: String,

    /// Emit a header record at the top of every file (default: true)
    pub header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            null_value: DEFAULT_CSV_NULL_VALUE.to_string(),
            separator: ",".to_string(),
            delimiter: "\"".to_string(),
            header: true,
        }
    }
}

impl CsvOptions {
    /// Creates options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the null token.
    #[must_use]
    pub fn with_null_value(mut self, token: impl Into<String>) -> Self {
        self.null_value = token.into();
        self
    }

    /// Sets the field separator.
    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the field delimiter (quote character).
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Enables or disables the header record.
    #[must_use]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Separator and quote byte when both fit in one byte each.
    ///
    /// Returns `None` for multi-byte options. The quote is `None` when quoting
    /// is disabled.
    pub fn single_byte_dialect(&self) -> Option<(u8, Option<u8>)> {
        match (self.separator.as_bytes(), self.delimiter.as_bytes()) {
            ([separator], []) => Some((*separator, None)),
            ([separator], [quote]) => Some((*separator, Some(*quote))),
            _ => None,
        }
    }

    /// Checks separator and delimiter.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(DumpError::invalid_config("CSV separator cannot be empty"));
        }
        if self.separator == self.delimiter {
            return Err(DumpError::invalid_config(
                "CSV separator and delimiter must differ",
            ));
        }
        if self.separator.contains(['\n', '\r']) {
            return Err(DumpError::invalid_config(
                "CSV separator cannot contain a line terminator",
            ));
        }
        if self.delimiter.contains(['\n', '\r']) {
            return Err(DumpError::invalid_config(
                "CSV delimiter cannot contain a line terminator",
            ));
        }
        Ok(())
    }
}

/// Writer configuration.
///
/// `file_size: None` means "unspecified": each chunk is written to a single
/// file, however large.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DumpConfig {
    /// Directory receiving every output file
    pub output_dir: PathBuf,

    /// Data file format (default: SQL)
    pub format: OutputFormat,

    /// Start a new data file before this many bytes would be exceeded
    pub file_size: Option<u64>,

    /// Start a new `INSERT` statement before this many bytes would be exceeded
    pub statement_size: u64,

    /// Data file base name template
    pub output_file_template: OutputTemplate,

    /// List column names in `INSERT` statements
    pub complete_insert: bool,

    /// Delimited output settings
    pub csv: CsvOptions,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: OutputFormat::default(),
            file_size: None,
            statement_size: DEFAULT_STATEMENT_SIZE,
            output_file_template: OutputTemplate::default(),
            complete_insert: false,
            csv: CsvOptions::default(),
        }
    }
}

impl DumpConfig {
    /// Creates a configuration writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Sets the data file format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the file size threshold. `0` leaves it unspecified.
    #[must_use]
    pub fn with_file_size(mut self, bytes: u64) -> Self {
        self.file_size = (bytes > 0).then_some(bytes);
        self
    }

    /// Sets the statement size threshold.
    #[must_use]
    pub fn with_statement_size(mut self, bytes: u64) -> Self {
        self.statement_size = bytes;
        self
    }

    /// Sets the file name template.
    #[must_use]
    pub fn with_template(mut self, template: OutputTemplate) -> Self {
        self.output_file_template = template;
        self
    }

    /// Enables or disables column lists in `INSERT` statements.
    #[must_use]
    pub fn with_complete_insert(mut self, enabled: bool) -> Self {
        self.complete_insert = enabled;
        self
    }

    /// Sets the CSV options.
    #[must_use]
    pub fn with_csv(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Checks the configuration before any file is written.
    pub fn validate(&self) -> Result<()> {
        if self.statement_size == 0 {
            return Err(DumpError::invalid_config("statement size must be positive"));
        }
        if self.file_size == Some(0) {
            return Err(DumpError::invalid_config(
                "file size must be positive; leave it unset to disable splitting",
            ));
        }
        if self.format == OutputFormat::Csv {
            self.csv.validate()?;
        }
        Ok(())
    }
}
