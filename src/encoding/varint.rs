//! # Unsigned Varint Encoding
//!
//! Length prefixes in the row log and in variable-size column encodings use
//! base-128 continuation varints, the same wire shape as protobuf/LEB128
//! unsigned varints:
//!
//! ```text
//! Each byte carries 7 value bits, least-significant group first.
//! The high bit is the continuation flag: 1 = more bytes follow.
//!
//! 0        -> 00
//! 127      -> 7f
//! 128      -> 80 01
//! 300      -> ac 02
//! u64::MAX -> ff ff ff ff ff ff ff ff ff 01   (10 bytes)
//! ```
//!
//! Two decode forms are provided: [`decode_uvarint`] over a byte slice and
//! [`read_uvarint`] over any reader. Both report the exact number of bytes
//! consumed so callers can locate the next field without a second pass.
//!
//! ## Error Handling
//!
//! A stream that ends while the continuation flag is still set surfaces as
//! an I/O error (`UnexpectedEof`). An encoding that continues past the
//! 64-bit range is reported as corruption.

use std::io::Read;

use crate::error::{Error, Result};

/// Maximum encoded length of a `u64` varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Encoded length of `value` without encoding it.
pub fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Encodes `value` into `buf` and returns the number of bytes written.
/// `buf` must hold at least [`MAX_VARINT_LEN`] bytes.
pub fn encode_uvarint(mut value: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Decodes a varint from the front of `buf`, returning the value and the
/// number of bytes consumed.
pub fn decode_uvarint(buf: &[u8]) -> Result<(u64, usize)> {
    read_uvarint(&mut &buf[..])
}

/// Reads a varint from `r` one byte at a time, returning the value and the
/// number of bytes consumed.
pub fn read_uvarint<R: Read>(r: &mut R) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut read = 0usize;

    loop {
        let mut byte = [0u8; 1];
        r.read_exact(&mut byte)?;
        read += 1;

        let b = byte[0];
        if read == MAX_VARINT_LEN && b > 1 {
            return Err(Error::Corrupted(
                "uvarint overflows a 64-bit integer".to_owned(),
            ));
        }

        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            return Ok((value, read));
        }
        shift += 7;
    }
}
