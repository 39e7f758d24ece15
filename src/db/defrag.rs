//! Log compaction.

use std::io::{self, Read, Seek, SeekFrom, Write};

use hashbrown::HashMap;

use crate::encoding::varint::read_uvarint;
use crate::encoding::{encode_row_header, ROW_ID_LEN};
use crate::error::{Error, Result};
use crate::schema::Record;
use crate::source::Source;

use super::Database;

impl<R: Record, S: Source> Database<R, S> {
    /// Rewrites the stream to eliminate tombstoned byte ranges.
    ///
    /// Every live row (tombstones are skipped automatically, since they are
    /// not in the index) is copied header-then-payload to a scratch file,
    /// accumulating new offsets. The scratch content then replaces the
    /// stream from offset 0 and the stream is truncated to the new length.
    /// The primary index is swapped for the recomputed offsets; secondary
    /// indexes map id to value, not offset, and stay valid untouched.
    ///
    /// The scratch file is anonymous and already unlinked, so the operating
    /// system releases it on every exit path, panics and aborts included.
    pub fn defrag(&self) -> Result<()> {
        let mut scratch = tempfile::tempfile()?;
        let state = &mut *self.state.lock();

        let live: Vec<(u64, u64)> = state
            .index
            .iter()
            .map(|(&id, &cursor)| (id, cursor))
            .collect();

        let mut new_index = HashMap::with_capacity(live.len());
        let mut offset = 0u64;

        for (id, cursor) in live {
            state
                .source
                .seek(SeekFrom::Start(cursor + ROW_ID_LEN as u64))?;
            let (size, _) = read_uvarint(&mut state.source)?;

            let header = encode_row_header(id, size);
            scratch.write_all(&header)?;

            let copied = io::copy(&mut (&mut state.source).take(size), &mut scratch)?;
            if copied != size {
                return Err(Error::Corrupted(format!(
                    "row {id:#x} truncated during defrag"
                )));
            }

            new_index.insert(id, offset);
            offset += header.len() as u64 + size;
        }

        state.source.seek(SeekFrom::Start(0))?;
        scratch.seek(SeekFrom::Start(0))?;
        let new_size = io::copy(&mut scratch, &mut state.source)?;

        state.index = new_index;
        state.source.truncate(new_size)?;
        Ok(())
    }
}
