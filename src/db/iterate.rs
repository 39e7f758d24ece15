//! Lazy iteration over live rows.

use crate::error::Result;
use crate::schema::Record;
use crate::source::Source;

use super::{Database, Row};

/// Row iterator over the ids that were live when [`Database::iterate`] was
/// called. Ids dropped before their turn are skipped silently.
pub struct Rows<'a, R: Record, S: Source> {
    db: &'a Database<R, S>,
    ids: Vec<u64>,
    position: usize,
}

impl<R: Record, S: Source> Database<R, S> {
    /// Captures a snapshot of the live id set (taken under the engine lock,
    /// order unspecified) and returns an iterator decoding one row per
    /// step. Each step reacquires the lock, so a snapshot id is either
    /// fully decoded as of the moment its turn arrives, or skipped if it
    /// has been dropped by then.
    pub fn iterate(&self) -> Rows<'_, R, S> {
        let ids = self.state.lock().index.keys().copied().collect();
        Rows {
            db: self,
            ids,
            position: 0,
        }
    }
}

impl<R: Record, S: Source> Iterator for Rows<'_, R, S> {
    type Item = Result<Row<R>>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.position < self.ids.len() {
            let id = self.ids[self.position];
            self.position += 1;

            let state = &mut *self.db.state.lock();
            let Some(&offset) = state.index.get(&id) else {
                // Dropped since the snapshot.
                continue;
            };

            return match self.db.decode_at(state, offset) {
                Ok(record) => Some(Ok(Row { id, value: record })),
                Err(err) => Some(Err(err)),
            };
        }
        None
    }
}
