//! Primary and secondary index maintenance.

use std::io::{Seek, SeekFrom};

use crate::encoding::varint::read_uvarint;
use crate::encoding::{read_row_id, ROW_ID_LEN};
use crate::error::{Error, Result};
use crate::schema::Record;
use crate::source::Source;

use super::{Database, State, DELETED_ID};

impl<R: Record, S: Source> Database<R, S> {
    /// Records a live row in the primary index and every secondary index.
    pub(crate) fn add_to_index(
        &self,
        state: &mut State<S>,
        id: u64,
        offset: u64,
        record: &R,
    ) -> Result<()> {
        for column in self.schema.indexed_columns() {
            let value = record.get(column.name()).ok_or_else(|| {
                Error::Schema(format!(
                    "record has no value for indexed column '{}'",
                    column.name()
                ))
            })?;
            if let Some(map) = state.custom.get_mut(column.name()) {
                map.insert(id, value);
            }
        }
        state.index.insert(id, offset);
        Ok(())
    }

    /// Forgets a row from the primary index and every secondary index.
    pub(crate) fn remove_from_index(state: &mut State<S>, id: u64) {
        state.index.remove(&id);
        for map in state.custom.values_mut() {
            map.remove(&id);
        }
    }

    /// Rebuilds the primary index and all secondary indexes from scratch by
    /// scanning the log from offset 0. Tombstoned rows are skipped by their
    /// recorded size; their payload is zeroed and never decoded. Reaching
    /// end-of-stream while expecting a header terminates the scan cleanly.
    pub fn populate_index(&self) -> Result<()> {
        let state = &mut *self.state.lock();
        state.source.seek(SeekFrom::Start(0))?;
        state.index.clear();
        for map in state.custom.values_mut() {
            map.clear();
        }

        let mut offset = 0u64;
        loop {
            let id = match read_row_id(&mut state.source)? {
                Some(id) => id,
                None => return Ok(()),
            };
            let (size, varint_len) = read_uvarint(&mut state.source)?;

            if id != DELETED_ID {
                if state.custom.is_empty() {
                    state.index.insert(id, offset);
                } else {
                    // Secondary indexes need the column values back.
                    let (record, _): (R, usize) = self.schema.decode(&mut state.source)?;
                    self.add_to_index(state, id, offset, &record)?;
                }
            }

            offset += (ROW_ID_LEN + varint_len) as u64 + size;
            state.source.seek(SeekFrom::Start(offset))?;
        }
    }
}
