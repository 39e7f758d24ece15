//! # Column Types and Values
//!
//! The set of types a column may hold is a closed enumeration, so encoding
//! and decoding are exhaustive pattern matches rather than runtime type
//! inspection. A [`ColumnType`] describes the wire shape of a column; a
//! [`Value`] is one concrete instance of it.
//!
//! ## Type Categories
//!
//! | Category | Types | Wire layout |
//! |----------|-------|-------------|
//! | **Fixed** | bool, i8..i64, u8..u64, f32, f64, complex32, complex64, fixed arrays | Big-endian at natural width, no prefix |
//! | **Variable** | text, lists | Element-count varint + element encodings |
//!
//! ## Fixed-Width Sizes
//!
//! | Type | Size (bytes) |
//! |------|--------------|
//! | bool, i8, u8 | 1 |
//! | i16, u16 | 2 |
//! | i32, u32, f32 | 4 |
//! | i64, u64, f64, complex32 | 8 |
//! | complex64 | 16 |
//! | array of N fixed elements | N * element size |
//!
//! Record-typed columns and unsized integers are inexpressible by
//! construction. The one shape the enum can state but the store cannot
//! encode, an array with a variable-size element, is rejected when the
//! schema is derived.

use crate::error::{Error, Result};

/// Wire shape of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Complex32,
    Complex64,
    /// Fixed-length array. The element type must itself be fixed-size.
    Array(Box<ColumnType>, usize),
    /// UTF-8 text, encoded as a length-prefixed byte sequence.
    Text,
    /// Variable-length sequence of any column type, recursively.
    List(Box<ColumnType>),
}

impl ColumnType {
    /// Encoded width of the type, or `None` for variable-size types.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            ColumnType::Bool | ColumnType::I8 | ColumnType::U8 => Some(1),
            ColumnType::I16 | ColumnType::U16 => Some(2),
            ColumnType::I32 | ColumnType::U32 | ColumnType::F32 => Some(4),
            ColumnType::I64 | ColumnType::U64 | ColumnType::F64 | ColumnType::Complex32 => {
                Some(8)
            }
            ColumnType::Complex64 => Some(16),
            ColumnType::Array(elem, len) => elem.fixed_width().map(|width| width * len),
            ColumnType::Text | ColumnType::List(_) => None,
        }
    }

    /// True for types encoded with a leading element-count varint.
    pub fn is_variable_size(&self) -> bool {
        matches!(self, ColumnType::Text | ColumnType::List(_))
    }

    /// Checks that the type is usable as a schema column.
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            ColumnType::Array(elem, _) => {
                elem.validate()?;
                if elem.fixed_width().is_none() {
                    return Err(Error::Schema(format!(
                        "array element type {elem:?} is not fixed-size"
                    )));
                }
                Ok(())
            }
            ColumnType::List(elem) => elem.validate(),
            _ => Ok(()),
        }
    }
}

/// One concrete column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Complex32(f32, f32),
    Complex64(f64, f64),
    Array(Vec<Value>),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// True if the value matches the given column type exactly, including
    /// array lengths and element types all the way down.
    pub fn conforms_to(&self, ty: &ColumnType) -> bool {
        match (self, ty) {
            (Value::Bool(_), ColumnType::Bool)
            | (Value::I8(_), ColumnType::I8)
            | (Value::I16(_), ColumnType::I16)
            | (Value::I32(_), ColumnType::I32)
            | (Value::I64(_), ColumnType::I64)
            | (Value::U8(_), ColumnType::U8)
            | (Value::U16(_), ColumnType::U16)
            | (Value::U32(_), ColumnType::U32)
            | (Value::U64(_), ColumnType::U64)
            | (Value::F32(_), ColumnType::F32)
            | (Value::F64(_), ColumnType::F64)
            | (Value::Complex32(..), ColumnType::Complex32)
            | (Value::Complex64(..), ColumnType::Complex64)
            | (Value::Text(_), ColumnType::Text) => true,
            (Value::Array(items), ColumnType::Array(elem, len)) => {
                items.len() == *len && items.iter().all(|item| item.conforms_to(elem))
            }
            (Value::List(items), ColumnType::List(elem)) => {
                items.iter().all(|item| item.conforms_to(elem))
            }
            _ => false,
        }
    }
}

macro_rules! value_from_primitive {
    ($($variant:ident: $ty:ty),* $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    )*};
}

value_from_primitive! {
    Bool: bool,
    I8: i8,
    I16: i16,
    I32: i32,
    I64: i64,
    U8: u8,
    U16: u16,
    U32: u32,
    U64: u64,
    F32: f32,
    F64: f64,
    Text: String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(bytes: [u8; N]) -> Self {
        Value::Array(bytes.iter().map(|&b| Value::U8(b)).collect())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

macro_rules! primitive_try_from_value {
    ($($variant:ident: $ty:ty),* $(,)?) => {$(
        impl TryFrom<Value> for $ty {
            type Error = Error;

            fn try_from(value: Value) -> Result<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(Error::Schema(format!(
                        concat!("expected ", stringify!($variant), " value, got {:?}"),
                        other
                    ))),
                }
            }
        }
    )*};
}

primitive_try_from_value! {
    Bool: bool,
    I8: i8,
    I16: i16,
    I32: i32,
    I64: i64,
    U8: u8,
    U16: u16,
    U32: u32,
    U64: u64,
    F32: f32,
    F64: f64,
    Text: String,
}

impl<T: TryFrom<Value, Error = Error>> TryFrom<Value> for Vec<T> {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::try_from).collect(),
            other => Err(Error::Schema(format!("expected List value, got {other:?}"))),
        }
    }
}

impl<const N: usize> TryFrom<Value> for [u8; N] {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(Error::Schema(format!("expected Array value, got {other:?}")))
            }
        };
        let bytes = items
            .into_iter()
            .map(u8::try_from)
            .collect::<Result<Vec<u8>>>()?;
        bytes.try_into().map_err(|bytes: Vec<u8>| {
            Error::Schema(format!("expected array of {N} bytes, got {}", bytes.len()))
        })
    }
}
