//! Insert and update.

use std::io::{Seek, SeekFrom, Write};

use crate::encoding::encode_row_header;
use crate::error::Result;
use crate::schema::Record;
use crate::source::Source;

use super::{Database, State};

impl<R: Record, S: Source> Database<R, S> {
    /// Appends the record to the log under a fresh random id and returns
    /// the id. If the write fails, the indexes are untouched and the record
    /// is considered not inserted.
    pub fn insert(&self, record: &R) -> Result<u64> {
        let state = &mut *self.state.lock();
        let id = self
            .ids
            .generate(|candidate| state.index.contains_key(&candidate));
        self.insert_at(state, id, record)?;
        Ok(id)
    }

    /// Drops the row with the given id and reinserts the new record under
    /// the same id, as one atomic delete-then-append at the tail of the
    /// log. Fails with `NotFound` before writing anything if the id is not
    /// live.
    pub fn update(&self, id: u64, record: &R) -> Result<()> {
        let state = &mut *self.state.lock();
        self.drop_locked(state, id)?;
        self.insert_at(state, id, record)
    }

    pub(crate) fn insert_at(&self, state: &mut State<S>, id: u64, record: &R) -> Result<()> {
        let offset = state.source.seek(SeekFrom::End(0))?;

        let mut payload = Vec::new();
        let written = self.schema.encode(&mut payload, record)?;

        state.source.write_all(&encode_row_header(id, written as u64))?;
        state.source.write_all(&payload)?;

        // The row only becomes visible once it is fully on the stream.
        self.add_to_index(state, id, offset, record)
    }
}
