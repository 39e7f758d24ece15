//! Point lookup by id.

use crate::error::{Error, Result};
use crate::schema::Record;
use crate::source::Source;

use super::Database;

impl<R: Record, S: Source> Database<R, S> {
    /// Looks the id up in the primary index and decodes its row.
    pub fn find(&self, id: u64) -> Result<R> {
        let state = &mut *self.state.lock();
        let offset = *state.index.get(&id).ok_or(Error::NotFound)?;
        self.decode_at(state, offset)
    }
}
