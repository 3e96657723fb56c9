//! Line-oriented CSV reading with lazy counting, indexed access and typed queries.
//!
//! - First line is the header; names are trimmed and lower-cased.
//! - Data lines are split on a single delimiter. No quoting or escaping.
//! - Fully blank lines are skipped; lines with the wrong field count are errors.
//! - Optional fast row count: feature `fast_local`, local UTF-8 files only.
//!
//! Data shape:
//! - `CsvParser` owns the stream and a cursor into it
//! - `Row` maps header names to raw string values (access with `get(name)` or `get_as::<T>(name)`)
//!
//! ```no_run
//! use csv_query::CsvParser;
//!
//! # fn main() -> csv_query::CsvResult<()> {
//! let mut csv = CsvParser::open("access_log.csv")?;
//! for i in 0..csv.count()? {
//!     let row = csv.get(i)?;
//!     println!("{}: {}", row.get("time")?, row.get("result")?);
//! }
//! let failures = csv.where_greater_than("status", 399)?;
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
//
mod builder;
mod codec;
mod config;
mod error;
#[cfg(feature = "fast_local")]
mod fast;
mod header;
mod parser;
mod query;
mod row;
mod source;

pub use crate::builder::CsvParserBuilder;
pub use crate::codec::LineCodec;
pub use crate::config::{CsvConfiguration, DEFAULT_BUFFER_SIZE, DEFAULT_DELIMITER};
pub use crate::error::{CsvError, CsvParseError, CsvResult, KeyNotFound};
pub use crate::header::Header;
pub use crate::parser::{CsvParser, Cursor, Rows};
pub use crate::query::{Comparison, FieldPredicate};
pub use crate::row::{decode_row, Decoded, Row};
pub use crate::source::{FileLineSource, LineSource, StreamLineSource};
