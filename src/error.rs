//! Error taxonomy for flatdb.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants map
//! onto the failure classes callers can act on:
//!
//! - [`Error::NotFound`]: the requested id is absent from the primary index,
//!   or is the reserved tombstone id.
//! - [`Error::Schema`]: a record shape, column type, or filter query does not
//!   match the derived schema.
//! - [`Error::Corrupted`]: decoded bytes are structurally invalid (varint
//!   overflow, non-UTF-8 text, short row copy during defrag).
//! - [`Error::Io`]: any failure from the storage medium, including truncated
//!   reads. Propagated verbatim; nothing is retried.

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("given id was not found in the database")]
    NotFound,

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("corrupted row data: {0}")]
    Corrupted(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
