//! Atomic find-then-drop.

use crate::error::{Error, Result};
use crate::schema::Record;
use crate::source::Source;

use super::Database;

impl<R: Record, S: Source> Database<R, S> {
    /// Combines `find` and `drop_row` into one atomic operation. The
    /// decoded value is returned only after the row has been dropped
    /// cleanly; under concurrent callers racing on the same id, exactly
    /// one `pop` succeeds and the rest observe `NotFound`.
    pub fn pop(&self, id: u64) -> Result<R> {
        let state = &mut *self.state.lock();
        let offset = *state.index.get(&id).ok_or(Error::NotFound)?;

        let record = self.decode_at(state, offset)?;
        self.drop_locked(state, id)?;

        Ok(record)
    }
}
