//! # tabledump CLI
//!
//! Command-line interface for the tabledump library.

use std::fs;
use std::io;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use humansize::{BINARY, format_size};
use tracing_subscriber::EnvFilter;

use tabledump::cli::Args;
use tabledump::source::JsonlRowSource;
use tabledump::writer::{OutputWriter, Writer};
use tabledump::DumpError;

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout stays a clean report. `RUST_LOG` overrides
/// the `info` default.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<(), DumpError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    let writer = OutputWriter::new(args.to_config()?)?;
    let config = writer.config();

    println!("📦 tabledump v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:   {}", args.input.display());
    println!("💾 Output:  {}", config.output_dir.display());
    println!("🗃️  Table:   {}.{}", args.db, args.table);
    println!("📄 Format:  {}", config.format);
    match config.file_size {
        Some(bytes) => println!("✂️  Split:   every {}", format_size(bytes, BINARY)),
        None => println!("✂️  Split:   off"),
    }
    println!();

    let cancel = writer.cancel_flag().clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping...");
        cancel.cancel();
    })
    .map_err(|e| DumpError::Io(io::Error::other(format!("failed to set signal handler: {e}"))))?;

    if let Some(ref path) = args.db_schema_sql {
        writer.write_database_meta(&args.db, &fs::read_to_string(path)?)?;
        println!("🧾 Wrote database schema");
    }
    if let Some(ref path) = args.schema_sql {
        writer.write_table_meta(&args.db, &args.table, &fs::read_to_string(path)?)?;
        println!("🧾 Wrote table schema");
    }

    let source = JsonlRowSource::open(&args.input, args.identity())?;
    let mut source = if args.columns.is_empty() {
        source.detect_columns()?
    } else {
        source.with_columns(args.columns.iter().cloned())
    };

    println!("⏳ Writing rows...");
    let stats = writer.write_table_data(&mut source)?;
    let total_time = total_start.elapsed();

    println!();
    println!("✅ Done!");
    for file in &stats.files {
        println!("   {}", file.display());
    }

    println!();
    println!("📊 Summary:");
    println!("   Files:  {}", stats.files.len());
    println!("   Rows:   {}", stats.rows);
    println!("   Size:   {}", format_size(stats.bytes, BINARY));
    println!("   Time:   {:.2}s", total_time.as_secs_f64());

    Ok(())
}
