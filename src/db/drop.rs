//! Tombstone deletion.

use std::io::{Seek, SeekFrom, Write};

use crate::encoding::varint::read_uvarint;
use crate::error::{Error, Result};
use crate::schema::Record;
use crate::source::Source;

use super::{Database, State, DELETED_ID};

impl<R: Record, S: Source> Database<R, S> {
    /// Removes the row by zeroing it on disk and forgetting it from the
    /// indexes. The row's byte footprint is unchanged in length; only its
    /// content is blanked, so the log stays scannable.
    pub fn drop_row(&self, id: u64) -> Result<()> {
        let state = &mut *self.state.lock();
        self.drop_locked(state, id)
    }

    pub(crate) fn drop_locked(&self, state: &mut State<S>, id: u64) -> Result<()> {
        if id == DELETED_ID {
            return Err(Error::NotFound);
        }
        let offset = *state.index.get(&id).ok_or(Error::NotFound)?;

        state.source.seek(SeekFrom::Start(offset))?;
        state.source.write_all(&DELETED_ID.to_be_bytes())?;

        // The cursor now sits on the size varint; reading it both recovers
        // the payload length and advances to the payload start.
        let (size, _) = read_uvarint(&mut state.source)?;
        state.source.write_all(&vec![0u8; size as usize])?;

        Self::remove_from_index(state, id);
        Ok(())
    }
}
