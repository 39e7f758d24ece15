//! Equality queries across live rows.

use hashbrown::HashMap;

use crate::error::{Error, Result};
use crate::schema::Record;
use crate::source::Source;
use crate::types::Value;

use super::Database;

/// Strict equality requirements, column name to expected value, ANDed
/// together.
pub type FilterQuery = HashMap<String, Value>;

/// A decoded row together with its unique id.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<R> {
    pub id: u64,
    pub value: R,
}

impl<R: Record, S: Source> Database<R, S> {
    /// Returns every live row whose columns equal all values in `query`.
    ///
    /// Rows are pruned through the secondary indexes first: a queried
    /// column that carries an index is compared in memory, and rows that
    /// cannot match are skipped without decoding. Surviving candidates are
    /// decoded and every query column is re-checked against the decoded
    /// record, indexed or not.
    ///
    /// Result order follows the primary index's map iteration order, which
    /// is unordered and not stable across calls.
    pub fn filter(&self, query: &FilterQuery) -> Result<Vec<Row<R>>> {
        for column in query.keys() {
            if self.schema.column(column).is_none() {
                return Err(Error::Schema(format!("unknown filter column '{column}'")));
            }
        }

        let state = &mut *self.state.lock();
        let candidates: Vec<(u64, u64)> = state
            .index
            .iter()
            .map(|(&id, &offset)| (id, offset))
            .collect();

        let mut results = Vec::new();
        'rows: for (id, offset) in candidates {
            for (column, expected) in query {
                if let Some(indexed) = state.custom.get(column.as_str()) {
                    match indexed.get(&id) {
                        Some(value) if value == expected => {}
                        _ => continue 'rows,
                    }
                }
            }

            let record = self.decode_at(state, offset)?;
            let matches = query
                .iter()
                .all(|(column, expected)| record.get(column).as_ref() == Some(expected));
            if matches {
                results.push(Row { id, value: record });
            }
        }

        Ok(results)
    }
}
