//! Abstract storage medium.
//!
//! The engine works against any resource offering sequential and random
//! access reads, writes, all three seek origins, and truncate-to-length.
//! Reads and writes must move one shared cursor, like a file descriptor.
//! The engine never assumes buffering or concurrent-safe access; it
//! serializes all access itself behind one lock.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};

/// Long-term storage used by the database, usually a [`File`].
pub trait Source: Read + Write + Seek + Send {
    /// Shrinks or extends the resource to exactly `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl Source for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// In-memory stream, useful for tests and ephemeral stores.
impl Source for Cursor<Vec<u8>> {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.get_mut().truncate(len as usize);
        Ok(())
    }
}
