//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - CLI argument structure (for use with clap)
//! - [`parse_size`] - human-readable byte sizes such as `256MB`
//!
//! The binary feeds a JSON Lines file through the library writer, which makes
//! it handy for reproducing a dump layout without a live database.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{CsvOptions, DEFAULT_CSV_NULL_VALUE, DumpConfig};
use crate::error::Result;
use crate::format::OutputFormat;
use crate::naming::{DEFAULT_OUTPUT_FILE_TEMPLATE, OutputTemplate};
use crate::source::ChunkIdentity;

/// Write table rows from a JSON Lines file as size-bounded SQL or CSV dump
/// files.
#[derive(Parser, Debug, Clone)]
#[command(name = "tabledump")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    tabledump orders.jsonl --db shop --table orders
    tabledump orders.jsonl --db shop --table orders -o dump --filesize 256MB
    tabledump orders.jsonl --db shop --table orders --format csv --csv-null NULL
    tabledump orders.jsonl --db shop --table orders --template '{{.Table}}-{{.Index}}'")]
pub struct Args {
    /// Path to input file (JSON Lines, one row per line)
    pub input: PathBuf,

    /// Database name
    #[arg(long, value_name = "NAME")]
    pub db: String,

    /// Table name
    #[arg(long, value_name = "NAME")]
    pub table: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "sql")]
    pub format: OutputFormat,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Split data files at this size (e.g. 64MB); unset writes one file
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub filesize: Option<u64>,

    /// Start a new INSERT statement at this size
    #[arg(long, value_name = "SIZE", value_parser = parse_size, default_value = "1000000")]
    pub statement_size: u64,

    /// Data file name template
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE_TEMPLATE)]
    pub template: String,

    /// First file index
    #[arg(long, default_value_t = 0)]
    pub chunk_index: u64,

    /// Column names, comma separated (default: keys of the first object row)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Write this CREATE TABLE statement as the table schema file
    #[arg(long, value_name = "FILE")]
    pub schema_sql: Option<PathBuf>,

    /// Write this CREATE DATABASE statement as the database schema file
    #[arg(long, value_name = "FILE")]
    pub db_schema_sql: Option<PathBuf>,

    /// CSV token for NULL values
    #[arg(long, default_value = DEFAULT_CSV_NULL_VALUE)]
    pub csv_null: String,

    /// CSV field separator
    #[arg(long, default_value = ",")]
    pub csv_separator: String,

    /// CSV quote character; empty disables quoting
    #[arg(long, default_value = "\"")]
    pub csv_delimiter: String,

    /// Omit the CSV header record
    #[arg(long)]
    pub no_header: bool,

    /// List column names in INSERT statements
    #[arg(long)]
    pub complete_insert: bool,
}

impl Args {
    /// Builds and validates the writer configuration.
    pub fn to_config(&self) -> Result<DumpConfig> {
        let csv = CsvOptions::new()
            .with_null_value(&self.csv_null)
            .with_separator(&self.csv_separator)
            .with_delimiter(&self.csv_delimiter)
            .with_header(!self.no_header);

        let mut config = DumpConfig::new(&self.output)
            .with_format(self.format)
            .with_statement_size(self.statement_size)
            .with_template(OutputTemplate::parse(&self.template)?)
            .with_complete_insert(self.complete_insert)
            .with_csv(csv);
        if let Some(bytes) = self.filesize {
            config = config.with_file_size(bytes);
        }

        config.validate()?;
        Ok(config)
    }

    /// The chunk the input file represents.
    pub fn identity(&self) -> ChunkIdentity {
        ChunkIdentity::new(&self.db, &self.table, self.chunk_index)
    }
}

/// Parses a size string like `64MB`, `1.5GB` or `4096`.
///
/// Suffixes are binary multiples; a bare number is bytes.
#[allow(clippy::cast_sign_loss)]
pub fn parse_size(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().to_uppercase();

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("TB") {
        (n, 1024u64 * 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("GB") {
        (n, 1024u64 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024u64 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024u64)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1u64)
    } else {
        (s.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid size value: {s}"))?;
    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid size value: {s}"));
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["tabledump", "rows.jsonl", "--db", "d", "--table", "t"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("10B").unwrap(), 10);
        assert_eq!(parse_size("2KB").unwrap(), 2048);
        assert_eq!(parse_size("64mb").unwrap(), 64 * 1024 * 1024);
        assert_eq!(parse_size("1.5GB").unwrap(), 1536 * 1024 * 1024);
        assert_eq!(parse_size("1TB").unwrap(), 1024u64.pow(4));
        assert!(parse_size("lots").is_err());
        assert!(parse_size("-1MB").is_err());
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.format, OutputFormat::Sql);
        assert_eq!(args.filesize, None);
        assert_eq!(args.statement_size, 1_000_000);
        assert_eq!(args.template, DEFAULT_OUTPUT_FILE_TEMPLATE);
        assert_eq!(args.csv_null, "\\N");
        assert!(args.columns.is_empty());

        let config = args.to_config().unwrap();
        assert_eq!(config.file_size, None);
        assert!(config.csv.header);
    }

    #[test]
    fn test_full_flag_set() {
        let args = parse(&[
            "--format",
            "csv",
            "-o",
            "out",
            "--filesize",
            "1KB",
            "--template",
            "{{.Table}}-{{.Index}}",
            "--chunk-index",
            "3",
            "--columns",
            "id,name",
            "--csv-null",
            "NULL",
            "--csv-separator",
            ";",
            "--no-header",
        ]);
        assert_eq!(args.columns, vec!["id", "name"]);
        assert_eq!(args.identity(), ChunkIdentity::new("d", "t", 3));

        let config = args.to_config().unwrap();
        assert_eq!(config.format, OutputFormat::Csv);
        assert_eq!(config.file_size, Some(1024));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.csv.separator, ";");
        assert!(!config.csv.header);
    }

    #[test]
    fn test_bad_template_rejected() {
        let args = parse(&["--template", "{{.Nope}}"]);
        assert!(args.to_config().unwrap_err().is_template());
    }

    #[test]
    fn test_missing_table_rejected() {
        assert!(Args::try_parse_from(["tabledump", "rows.jsonl", "--db", "d"]).is_err());
    }
}
