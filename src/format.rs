//! Output format types for the tabledump library.
//!
//! The writer supports a closed set of data file formats. Each format owns
//! its file extension and its encoder; the rollover driver is shared.
//!
//! # Example
//!
//! ```rust
//! use tabledump::format::OutputFormat;
//! use std::str::FromStr;
//!
//! let format = OutputFormat::from_str("csv").unwrap();
//! assert_eq!(format, OutputFormat::Csv);
//! assert_eq!(format.extension(), "csv");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::DumpError;

/// Data file format.
///
/// - [`Sql`](OutputFormat::Sql) - batched multi-row `INSERT` statements
/// - [`Csv`](OutputFormat::Csv) - one delimited record per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Batched `INSERT` statements (default)
    #[default]
    Sql,

    /// Delimited records (requires the `csv-output` feature)
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    ///
    /// # Example
    ///
    /// ```rust
    /// use tabledump::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Sql.extension(), "sql");
    /// assert_eq!(OutputFormat::Csv.extension(), "csv");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Sql => "sql",
            OutputFormat::Csv => "csv",
        }
    }

    /// Human-readable name, as shown in reports and errors.
    pub fn display_name(&self) -> &'static str {
        match self {
            OutputFormat::Sql => "SQL",
            OutputFormat::Csv => "CSV",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["sql", "csv"]
    }

    /// Cargo feature that provides this format, if any.
    pub fn required_feature(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Sql => None,
            OutputFormat::Csv => Some("csv-output"),
        }
    }

    /// Whether this format was compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            OutputFormat::Sql => true,
            OutputFormat::Csv => cfg!(feature = "csv-output"),
        }
    }

    /// Fails with [`DumpError::UnsupportedFormat`] when this format was not
    /// compiled in.
    pub fn ensure_available(&self) -> crate::error::Result<()> {
        match self.required_feature() {
            Some(feature) if !self.is_available() => Err(DumpError::UnsupportedFormat {
                format: self.display_name(),
                feature,
            }),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql" => Ok(OutputFormat::Sql),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}
