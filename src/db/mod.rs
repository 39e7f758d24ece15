//! # Storage Engine
//!
//! [`Database`] owns the byte stream, the derived schema, and the in-memory
//! indexes, and is the sole mediator between them. Rows live in a flat
//! append-only log:
//!
//! ```text
//! Row    := Header Payload
//! Header := id (8 bytes, big-endian u64)  size (unsigned varint)
//! ```
//!
//! The primary index maps each live id to the byte offset of its header.
//! For every column marked indexed, a secondary index maps id to that
//! column's decoded value, letting `filter` skip rows without decoding
//! them. Both are rebuilt from the log on open and mutated in lockstep on
//! every successful mutation.
//!
//! Dropping a row zeroes its id and payload in place, leaving its byte
//! footprint intact so the log stays scannable; `defrag` rewrites the
//! stream to reclaim the space.
//!
//! ## Concurrency
//!
//! One mutex guards the stream and both index structures together. Every
//! public operation holds it for its full duration, so operations are
//! serialized at the process level; a stalled read stalls all callers.
//! This trades throughput under concurrent writers for correctness under
//! concurrent callers. The id generator keeps its own lock around its RNG.

pub(crate) mod ids;

mod defrag;
mod drop;
mod filter;
mod find;
mod index;
mod insert;
mod iterate;
mod pop;

pub use filter::{FilterQuery, Row};
pub use iterate::Rows;

use std::io::{Seek, SeekFrom};
use std::marker::PhantomData;

use hashbrown::HashMap;
use parking_lot::Mutex;

use crate::encoding::varint::read_uvarint;
use crate::encoding::ROW_ID_LEN;
use crate::error::Result;
use crate::schema::{Record, Schema};
use crate::source::Source;
use crate::types::Value;
use ids::IdGenerator;

/// Id stored in the header of a tombstoned row. Never assigned to a live
/// record.
pub const DELETED_ID: u64 = 0;

/// A single-table record store over an abstract byte stream.
pub struct Database<R: Record, S: Source> {
    schema: Schema,
    state: Mutex<State<S>>,
    ids: IdGenerator,
    _record: PhantomData<fn() -> R>,
}

/// Everything the engine mutex guards: the stream and both index
/// structures, kept consistent as one unit.
pub(crate) struct State<S> {
    pub(crate) source: S,
    pub(crate) index: HashMap<u64, u64>,
    pub(crate) custom: HashMap<&'static str, HashMap<u64, Value>>,
}

impl<R: Record, S: Source> Database<R, S> {
    /// Opens a database on `source`, deriving the schema from `R` and
    /// populating the in-memory indexes with a full scan of the log.
    pub fn open(source: S) -> Result<Self> {
        let schema = Schema::derive::<R>()?;
        let custom = schema
            .indexed_columns()
            .map(|column| (column.name(), HashMap::new()))
            .collect();

        let db = Self {
            schema,
            state: Mutex::new(State {
                source,
                index: HashMap::new(),
                custom,
            }),
            ids: IdGenerator::new(),
            _record: PhantomData,
        };
        db.populate_index()?;
        Ok(db)
    }

    /// The derived schema for `R`.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Byte size (disk usage) of the database.
    pub fn size(&self) -> Result<u64> {
        let state = &mut *self.state.lock();
        Ok(state.source.seek(SeekFrom::End(0))?)
    }

    /// Number of live rows.
    pub fn row_count(&self) -> usize {
        self.state.lock().index.len()
    }

    /// True if the given id is live.
    pub fn has(&self, id: u64) -> bool {
        self.state.lock().index.contains_key(&id)
    }

    /// Releases the engine and hands back the underlying stream.
    pub fn into_source(self) -> S {
        self.state.into_inner().source
    }

    /// Decodes the row whose header starts at `offset`. The caller holds
    /// the state lock and got `offset` from the primary index, so the
    /// header is skipped without inspection.
    pub(crate) fn decode_at(&self, state: &mut State<S>, offset: u64) -> Result<R> {
        state
            .source
            .seek(SeekFrom::Start(offset + ROW_ID_LEN as u64))?;
        read_uvarint(&mut state.source)?;
        let (record, _) = self.schema.decode(&mut state.source)?;
        Ok(record)
    }
}
