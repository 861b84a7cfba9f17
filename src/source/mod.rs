//! Row sources feeding the writer.
//!
//! The writer consumes rows through the [`RowSource`] trait: identity
//! accessors, a row-by-row pull, and a release operation. Executing SQL,
//! retrying queries and splitting tables into chunks all happen on the
//! other side of this trait.
//!
//! # Bundled Sources
//!
//! - [`VecRowSource`] - rows held in memory
//! - [`JsonlRowSource`] - rows streamed from a JSON Lines file (requires the
//!   `json-input` feature)
//!
//! # Example
//!
//! ```rust
//! use tabledump::source::{ChunkIdentity, RowSource, VecRowSource};
//! use tabledump::Value;
//!
//! let source = VecRowSource::new("shop", "orders", 2)
//!     .with_columns(["id", "total"])
//!     .with_rows(vec![vec![Value::Int(1), Value::Float(9.5)]]);
//!
//! assert_eq!(source.identity(), ChunkIdentity::new("shop", "orders", 2));
//! ```

mod cursor;
#[cfg(feature = "json-input")]
mod jsonl;
mod memory;
mod traits;

pub use cursor::RowCursor;
#[cfg(feature = "json-input")]
pub use jsonl::JsonlRowSource;
pub use memory::VecRowSource;
pub use traits::{ChunkIdentity, RowSource};
