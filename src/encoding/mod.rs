//! # Binary Value Codec
//!
//! Recursive encode/decode of typed column values to and from byte streams,
//! independent of where the bytes are stored. The wire format, per column
//! type:
//!
//! | Type | Encoding |
//! |------|----------|
//! | bool | one byte, `00` or `01` |
//! | integers | big-endian at natural width |
//! | floats | IEEE-754 big-endian |
//! | complex | real part then imaginary part, each big-endian |
//! | fixed array | concatenated element encodings, no prefix |
//! | text | element-count varint + raw UTF-8 bytes |
//! | list | element-count varint + element encodings |
//!
//! The count prefix on variable-size values is an *element* count, not a
//! byte count; for text the elements are bytes, so the two coincide. Lists
//! whose elements are themselves variable-size encode each element with its
//! own prefix, recursively.
//!
//! Both directions report exact byte counts so callers can locate the next
//! field or row without a second pass.
//!
//! This module also owns the row header codec for the on-disk log:
//!
//! ```text
//! Row    := Header Payload
//! Header := id (8 bytes, big-endian u64)  size (unsigned varint)
//! ```

pub mod varint;

use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::types::{ColumnType, Value};
use varint::{encode_uvarint, read_uvarint, MAX_VARINT_LEN};

/// Byte length of the id field at the start of every row header.
pub const ROW_ID_LEN: usize = 8;

/// Builds a row header: big-endian id followed by the payload-size varint.
pub fn encode_row_header(id: u64, size: u64) -> Vec<u8> {
    let mut header = Vec::with_capacity(ROW_ID_LEN + MAX_VARINT_LEN);
    header.extend_from_slice(&id.to_be_bytes());
    let mut buf = [0u8; MAX_VARINT_LEN];
    let n = encode_uvarint(size, &mut buf);
    header.extend_from_slice(&buf[..n]);
    header
}

/// Reads the 8-byte row id, distinguishing clean end-of-log (`Ok(None)`,
/// zero bytes available) from a truncation inside the header (`Err`).
pub(crate) fn read_row_id<R: Read>(r: &mut R) -> Result<Option<u64>> {
    let mut buf = [0u8; ROW_ID_LEN];
    let mut filled = 0;
    while filled < ROW_ID_LEN {
        match r.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(u64::from_be_bytes(buf)))
}

fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<usize> {
    w.write_all(bytes)?;
    Ok(bytes.len())
}

fn write_uvarint<W: Write>(w: &mut W, value: u64) -> Result<usize> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let n = encode_uvarint(value, &mut buf);
    write_bytes(w, &buf[..n])
}

fn read_array<const N: usize, R: Read>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

/// Encodes `value` as a `ty` column, returning the number of bytes written.
/// The value must conform to the column type exactly.
pub fn encode_value<W: Write>(w: &mut W, ty: &ColumnType, value: &Value) -> Result<usize> {
    match (ty, value) {
        (ColumnType::Bool, Value::Bool(v)) => write_bytes(w, &[u8::from(*v)]),
        (ColumnType::I8, Value::I8(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::I16, Value::I16(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::I32, Value::I32(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::I64, Value::I64(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::U8, Value::U8(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::U16, Value::U16(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::U32, Value::U32(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::U64, Value::U64(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::F32, Value::F32(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::F64, Value::F64(v)) => write_bytes(w, &v.to_be_bytes()),
        (ColumnType::Complex32, Value::Complex32(re, im)) => {
            let mut buf = [0u8; 8];
            buf[..4].copy_from_slice(&re.to_be_bytes());
            buf[4..].copy_from_slice(&im.to_be_bytes());
            write_bytes(w, &buf)
        }
        (ColumnType::Complex64, Value::Complex64(re, im)) => {
            let mut buf = [0u8; 16];
            buf[..8].copy_from_slice(&re.to_be_bytes());
            buf[8..].copy_from_slice(&im.to_be_bytes());
            write_bytes(w, &buf)
        }
        (ColumnType::Array(elem, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(Error::Schema(format!(
                    "expected array of length {len}, got {}",
                    items.len()
                )));
            }
            let mut written = 0;
            for item in items {
                written += encode_value(w, elem, item)?;
            }
            Ok(written)
        }
        (ColumnType::Text, Value::Text(text)) => {
            let mut written = write_uvarint(w, text.len() as u64)?;
            written += write_bytes(w, text.as_bytes())?;
            Ok(written)
        }
        (ColumnType::List(elem), Value::List(items)) => {
            let mut written = write_uvarint(w, items.len() as u64)?;
            for item in items {
                written += encode_value(w, elem, item)?;
            }
            Ok(written)
        }
        (ty, value) => Err(Error::Schema(format!(
            "value {value:?} does not match column type {ty:?}"
        ))),
    }
}

/// Decodes one `ty` column from `r`, returning the value and the exact
/// number of bytes consumed.
pub fn decode_value<R: Read>(r: &mut R, ty: &ColumnType) -> Result<(Value, usize)> {
    match ty {
        ColumnType::Bool => {
            let buf = read_array::<1, _>(r)?;
            Ok((Value::Bool(buf[0] != 0), 1))
        }
        ColumnType::I8 => {
            let buf = read_array::<1, _>(r)?;
            Ok((Value::I8(i8::from_be_bytes(buf)), 1))
        }
        ColumnType::I16 => {
            let buf = read_array::<2, _>(r)?;
            Ok((Value::I16(i16::from_be_bytes(buf)), 2))
        }
        ColumnType::I32 => {
            let buf = read_array::<4, _>(r)?;
            Ok((Value::I32(i32::from_be_bytes(buf)), 4))
        }
        ColumnType::I64 => {
            let buf = read_array::<8, _>(r)?;
            Ok((Value::I64(i64::from_be_bytes(buf)), 8))
        }
        ColumnType::U8 => {
            let buf = read_array::<1, _>(r)?;
            Ok((Value::U8(buf[0]), 1))
        }
        ColumnType::U16 => {
            let buf = read_array::<2, _>(r)?;
            Ok((Value::U16(u16::from_be_bytes(buf)), 2))
        }
        ColumnType::U32 => {
            let buf = read_array::<4, _>(r)?;
            Ok((Value::U32(u32::from_be_bytes(buf)), 4))
        }
        ColumnType::U64 => {
            let buf = read_array::<8, _>(r)?;
            Ok((Value::U64(u64::from_be_bytes(buf)), 8))
        }
        ColumnType::F32 => {
            let buf = read_array::<4, _>(r)?;
            Ok((Value::F32(f32::from_be_bytes(buf)), 4))
        }
        ColumnType::F64 => {
            let buf = read_array::<8, _>(r)?;
            Ok((Value::F64(f64::from_be_bytes(buf)), 8))
        }
        ColumnType::Complex32 => {
            let buf = read_array::<8, _>(r)?;
            let re = f32::from_be_bytes(buf[..4].try_into().unwrap());
            let im = f32::from_be_bytes(buf[4..].try_into().unwrap());
            Ok((Value::Complex32(re, im), 8))
        }
        ColumnType::Complex64 => {
            let buf = read_array::<16, _>(r)?;
            let re = f64::from_be_bytes(buf[..8].try_into().unwrap());
            let im = f64::from_be_bytes(buf[8..].try_into().unwrap());
            Ok((Value::Complex64(re, im), 16))
        }
        ColumnType::Array(elem, len) => {
            let mut items = Vec::with_capacity(*len);
            let mut read = 0;
            for _ in 0..*len {
                let (item, n) = decode_value(r, elem)?;
                read += n;
                items.push(item);
            }
            Ok((Value::Array(items), read))
        }
        ColumnType::Text => {
            let (len, mut read) = read_uvarint(r)?;
            let mut bytes = vec![0u8; len as usize];
            r.read_exact(&mut bytes)?;
            read += bytes.len();
            let text = String::from_utf8(bytes)
                .map_err(|_| Error::Corrupted("text column is not valid UTF-8".to_owned()))?;
            Ok((Value::Text(text), read))
        }
        ColumnType::List(elem) => {
            let (count, mut read) = read_uvarint(r)?;
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let (item, n) = decode_value(r, elem)?;
                read += n;
                items.push(item);
            }
            Ok((Value::List(items), read))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    fn roundtrip(ty: &ColumnType, value: &Value, expected_hex: &str) {
        let mut encoded = Vec::new();
        let written = encode_value(&mut encoded, ty, value).unwrap();

        assert_eq!(written, encoded.len(), "byte count for {value:?}");
        assert_eq!(to_hex(&encoded), expected_hex, "encoding of {value:?}");

        let (decoded, read) = decode_value(&mut &encoded[..], ty).unwrap();
        assert_eq!(read, written, "bytes consumed for {value:?}");
        assert_eq!(&decoded, value, "roundtrip of {value:?}");
    }

    #[test]
    fn scalar_fixtures() {
        roundtrip(&ColumnType::I32, &Value::I32(-1), "ffffffff");
        roundtrip(&ColumnType::I32, &Value::I32(-0xffff), "ffff0001");
        roundtrip(&ColumnType::U32, &Value::U32(10), "0000000a");
        roundtrip(&ColumnType::U8, &Value::U8(1), "01");
        roundtrip(&ColumnType::Bool, &Value::Bool(true), "01");
        roundtrip(&ColumnType::Bool, &Value::Bool(false), "00");
    }

    #[test]
    fn array_fixtures() {
        roundtrip(
            &ColumnType::Array(Box::new(ColumnType::U8), 10),
            &Value::from([0u8; 10]),
            "00000000000000000000",
        );
        roundtrip(
            &ColumnType::Array(Box::new(ColumnType::U16), 5),
            &Value::Array(vec![
                Value::U16(0xffff),
                Value::U16(1),
                Value::U16(2),
                Value::U16(3),
                Value::U16(4),
            ]),
            "ffff0001000200030004",
        );
    }

    #[test]
    fn text_fixtures() {
        roundtrip(&ColumnType::Text, &Value::from("foobar"), "06666f6f626172");
        roundtrip(&ColumnType::Text, &Value::from(""), "00");
    }

    #[test]
    fn list_fixtures() {
        roundtrip(
            &ColumnType::List(Box::new(ColumnType::U8)),
            &Value::List(Vec::new()),
            "00",
        );
        roundtrip(
            &ColumnType::List(Box::new(ColumnType::U8)),
            &Value::from(vec![1u8, 2, 3]),
            "03010203",
        );
        roundtrip(
            &ColumnType::List(Box::new(ColumnType::U32)),
            &Value::from(vec![0xffffaaaau32, 0, 0xccccdddd]),
            "03ffffaaaa00000000ccccdddd",
        );
    }

    #[test]
    fn nested_list_fixtures() {
        roundtrip(
            &ColumnType::List(Box::new(ColumnType::Array(Box::new(ColumnType::U16), 2))),
            &Value::List(vec![
                Value::Array(vec![Value::U16(1), Value::U16(2)]),
                Value::Array(vec![Value::U16(3), Value::U16(4)]),
            ]),
            "020001000200030004",
        );
        roundtrip(
            &ColumnType::List(Box::new(ColumnType::List(Box::new(ColumnType::I32)))),
            &Value::List(vec![
                Value::from(vec![1i32, 2, 3]),
                Value::from(vec![4i32, 5, 6, 7]),
            ]),
            "02030000000100000002000000030400000004000000050000000600000007",
        );
        roundtrip(
            &ColumnType::List(Box::new(ColumnType::List(Box::new(ColumnType::Text)))),
            &Value::List(vec![
                Value::from(vec!["foo", "bar"]),
                Value::from(vec!["", "hello"]),
            ]),
            "020203666f6f0362617202000568656c6c6f",
        );
    }

    #[test]
    fn complex_roundtrip() {
        let ty = ColumnType::Complex64;
        let value = Value::Complex64(1.5, -2.25);
        let mut encoded = Vec::new();
        let written = encode_value(&mut encoded, &ty, &value).unwrap();
        assert_eq!(written, 16);

        let (decoded, read) = decode_value(&mut &encoded[..], &ty).unwrap();
        assert_eq!(read, 16);
        assert_eq!(decoded, value);
    }

    #[test]
    fn type_mismatch_is_schema_error() {
        let mut sink = Vec::new();
        let err = encode_value(&mut sink, &ColumnType::U32, &Value::U16(5)).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));

        let err = encode_value(
            &mut sink,
            &ColumnType::Array(Box::new(ColumnType::U8), 4),
            &Value::from([1u8, 2, 3]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn truncated_stream_is_io_error() {
        // Three bytes where a u32 needs four.
        let err = decode_value(&mut &[0u8, 1, 2][..], &ColumnType::U32).unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        // Count prefix promises two strings, stream holds one.
        let encoded = [0x02u8, 0x03, b'f', b'o', b'o'];
        let err = decode_value(
            &mut &encoded[..],
            &ColumnType::List(Box::new(ColumnType::Text)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn invalid_utf8_is_corruption() {
        let encoded = [0x02u8, 0xff, 0xfe];
        let err = decode_value(&mut &encoded[..], &ColumnType::Text).unwrap_err();
        assert!(matches!(err, Error::Corrupted(_)));
    }

    #[test]
    fn row_header_layout() {
        let header = encode_row_header(0x0102030405060708, 300);
        assert_eq!(to_hex(&header), "0102030405060708ac02");

        let mut cursor = &header[..];
        assert_eq!(read_row_id(&mut cursor).unwrap(), Some(0x0102030405060708));
        assert_eq!(read_uvarint(&mut cursor).unwrap(), (300, 2));
    }

    #[test]
    fn row_id_end_of_log() {
        assert_eq!(read_row_id(&mut &[][..]).unwrap(), None);

        // A partial id is a truncation, not a clean end.
        let err = read_row_id(&mut &[0u8, 1, 2][..]).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
