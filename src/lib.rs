//! # flatdb — Minimal Single-Table Embedded Record Store
//!
//! flatdb stores records of one user-declared shape as binary rows in a
//! flat append-only log on any seekable byte stream, keeps an in-memory
//! index from record id to on-disk offset so lookups are O(1) instead of
//! O(n), and answers equality queries over designated columns.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │        Database (public API)        │
//! │  insert / find / drop / update /    │
//! │  pop / filter / iterate / defrag    │
//! ├──────────────────┬──────────────────┤
//! │  Schema          │  Index           │
//! │  column order,   │  id -> offset,   │
//! │  record codec    │  id -> value     │
//! ├──────────────────┴──────────────────┤
//! │        Binary Codec (encoding)      │
//! ├─────────────────────────────────────┤
//! │     Source (seekable byte stream)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! The engine is the sole mediator: it validates records through the
//! schema, serializes them through the codec, and updates the index on
//! every mutation. The index never touches the stream directly.
//!
//! ## On-Disk Format
//!
//! ```text
//! Log    := Row*
//! Row    := Header Payload
//! Header := id (8 bytes, big-endian u64)  size (unsigned varint)
//! ```
//!
//! The payload is the record's columns encoded in lexicographic column
//! order. Id 0 is reserved: a dropped row has its id and payload zeroed in
//! place (a tombstone) while its size field keeps the log scannable.
//! `defrag` rewrites the stream to reclaim tombstoned bytes.
//!
//! ## Usage
//!
//! ```ignore
//! use flatdb::{Column, ColumnType, ColumnValues, Database, Record, Value};
//!
//! #[derive(Debug, PartialEq)]
//! struct Car {
//!     year: u16,
//!     color: String,
//!     make: String,
//!     model: String,
//! }
//!
//! impl Record for Car {
//!     fn columns() -> Vec<Column> {
//!         vec![
//!             Column::new("Year", ColumnType::U16),
//!             Column::new("Color", ColumnType::Text),
//!             Column::new("Make", ColumnType::Text),
//!             Column::new("Model", ColumnType::Text),
//!         ]
//!     }
//!
//!     fn get(&self, column: &str) -> Option<Value> {
//!         match column {
//!             "Year" => Some(Value::from(self.year)),
//!             "Color" => Some(Value::from(self.color.as_str())),
//!             "Make" => Some(Value::from(self.make.as_str())),
//!             "Model" => Some(Value::from(self.model.as_str())),
//!             _ => None,
//!         }
//!     }
//!
//!     fn from_columns(mut values: ColumnValues) -> flatdb::Result<Self> {
//!         Ok(Self {
//!             year: values.take_as("Year")?,
//!             color: values.take_as("Color")?,
//!             make: values.take_as("Make")?,
//!             model: values.take_as("Model")?,
//!         })
//!     }
//! }
//!
//! let file = tempfile::tempfile()?;
//! let db: Database<Car, _> = Database::open(file)?;
//!
//! let id = db.insert(&Car {
//!     year: 2008,
//!     color: "brown".into(),
//!     make: "Mazda".into(),
//!     model: "Miata".into(),
//! })?;
//!
//! let car = db.find(id)?;
//! assert_eq!(car.model, "Miata");
//! ```
//!
//! Columns built with `.indexed()` keep their values cached in memory so
//! `filter` can skip non-matching rows without decoding them. The
//! trade-off is memory and a slower first open on large logs.
//!
//! Call `defrag` after dropping many rows to shrink the stream; it is good
//! practice before shutting down.

pub mod db;
pub mod encoding;
pub mod error;
pub mod schema;
pub mod source;
pub mod types;

pub use db::{Database, FilterQuery, Row, Rows, DELETED_ID};
pub use error::{Error, Result};
pub use schema::{Column, ColumnValues, Record, Schema};
pub use source::Source;
pub use types::{ColumnType, Value};
