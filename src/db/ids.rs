//! Random row-id generation.
//!
//! Ids are random non-zero 64-bit numbers, unique against the live index.
//! The generator owns its RNG behind its own lock, decoupled from the
//! engine lock; the caller supplies the liveness check and holds the
//! engine lock around it.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::DELETED_ID;

pub(crate) struct IdGenerator {
    rng: Mutex<StdRng>,
}

impl IdGenerator {
    pub(crate) fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Draws ids until one is non-zero and not reported live by `in_use`.
    pub(crate) fn generate<F>(&self, mut in_use: F) -> u64
    where
        F: FnMut(u64) -> bool,
    {
        let mut rng = self.rng.lock();
        loop {
            let id: u64 = rng.gen();
            if id != DELETED_ID && !in_use(id) {
                return id;
            }
        }
    }
}
