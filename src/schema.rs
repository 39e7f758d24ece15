//! # Record Schema
//!
//! A [`Schema`] is the derived, immutable description of one record shape:
//! which columns it has, their wire types, and which of them carry a
//! secondary index. It is fixed once at engine construction and never
//! changes for the lifetime of the engine.
//!
//! Record shapes declare themselves through the [`Record`] trait, the
//! static replacement for runtime reflection: `columns()` enumerates the
//! shape once, `get` reads one column from a live record, and
//! `from_columns` rebuilds a record from decoded values.
//!
//! Columns are ordered lexicographically by name. This ordering is
//! load-bearing: it defines the wire layout of every row, so it must be
//! deterministic regardless of declaration order.
//!
//! ```ignore
//! use flatdb::{Column, ColumnType, ColumnValues, Record, Value};
//!
//! struct Car {
//!     year: u16,
//!     color: String,
//! }
//!
//! impl Record for Car {
//!     fn columns() -> Vec<Column> {
//!         vec![
//!             Column::new("Year", ColumnType::U16),
//!             Column::new("Color", ColumnType::Text).indexed(),
//!         ]
//!     }
//!
//!     fn get(&self, column: &str) -> Option<Value> {
//!         match column {
//!             "Year" => Some(Value::from(self.year)),
//!             "Color" => Some(Value::from(self.color.as_str())),
//!             _ => None,
//!         }
//!     }
//!
//!     fn from_columns(mut values: ColumnValues) -> flatdb::Result<Self> {
//!         Ok(Self {
//!             year: values.take_as("Year")?,
//!             color: values.take_as("Color")?,
//!         })
//!     }
//! }
//! ```

use std::io::{Read, Write};

use hashbrown::HashMap;

use crate::encoding::{decode_value, encode_value};
use crate::error::{Error, Result};
use crate::types::{ColumnType, Value};

/// A record shape storable in the database.
///
/// Implementations must keep the three methods consistent: every column
/// named by `columns()` must be readable through `get` and accepted back by
/// `from_columns`.
pub trait Record: Sized {
    /// Column declarations for this shape. Declaration order does not
    /// matter; the schema sorts by name.
    fn columns() -> Vec<Column>;

    /// Current value of the named column, or `None` for unknown names.
    fn get(&self, column: &str) -> Option<Value>;

    /// Rebuilds a record from decoded column values.
    fn from_columns(values: ColumnValues) -> Result<Self>;
}

/// One column declaration: name, wire type, and the secondary-index marker.
#[derive(Debug, Clone)]
pub struct Column {
    name: &'static str,
    ty: ColumnType,
    indexed: bool,
}

impl Column {
    pub fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            indexed: false,
        }
    }

    /// Marks the column as backed by an in-memory secondary index, used to
    /// prune `filter` scans without decoding rows.
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.ty
    }

    pub fn is_indexed(&self) -> bool {
        self.indexed
    }
}

/// Decoded column values handed to [`Record::from_columns`], keyed by
/// column name.
#[derive(Debug, Default)]
pub struct ColumnValues {
    values: HashMap<&'static str, Value>,
}

impl ColumnValues {
    pub(crate) fn insert(&mut self, name: &'static str, value: Value) {
        self.values.insert(name, value);
    }

    /// Removes and returns the value decoded for `column`.
    pub fn take(&mut self, column: &str) -> Result<Value> {
        self.values
            .remove(column)
            .ok_or_else(|| Error::Schema(format!("no decoded value for column '{column}'")))
    }

    /// Removes the value decoded for `column` and converts it to `T`.
    pub fn take_as<T>(&mut self, column: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = Error>,
    {
        T::try_from(self.take(column)?)
    }
}

/// The derived, immutable column list of a record shape.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Derives the schema of `T`: validates every column type, rejects
    /// duplicate names, and fixes the lexicographic column order.
    pub fn derive<T: Record>() -> Result<Self> {
        let mut columns = T::columns();
        if columns.is_empty() {
            return Err(Error::Schema("record declares no columns".to_owned()));
        }

        columns.sort_by(|a, b| a.name.cmp(b.name));
        for pair in columns.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(Error::Schema(format!(
                    "duplicate column '{}'",
                    pair[0].name
                )));
            }
        }

        for column in &columns {
            column.ty.validate().map_err(|err| match err {
                Error::Schema(msg) => {
                    Error::Schema(format!("column '{}': {msg}", column.name))
                }
                other => other,
            })?;
        }

        Ok(Self { columns })
    }

    /// Columns in wire order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub(crate) fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub(crate) fn indexed_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| column.indexed)
    }

    /// Encodes a whole record in wire order, returning the number of bytes
    /// written.
    pub fn encode<W: Write, T: Record>(&self, w: &mut W, record: &T) -> Result<usize> {
        let mut written = 0;
        for column in &self.columns {
            let value = record.get(column.name).ok_or_else(|| {
                Error::Schema(format!("record has no value for column '{}'", column.name))
            })?;
            if !value.conforms_to(&column.ty) {
                return Err(Error::Schema(format!(
                    "value for column '{}' does not match type {:?}",
                    column.name, column.ty
                )));
            }
            written += encode_value(w, &column.ty, &value)?;
        }
        Ok(written)
    }

    /// Decodes a whole record in wire order, returning it along with the
    /// number of bytes read.
    pub fn decode<R: Read, T: Record>(&self, r: &mut R) -> Result<(T, usize)> {
        let mut read = 0;
        let mut values = ColumnValues::default();
        for column in &self.columns {
            let (value, n) = decode_value(r, &column.ty)?;
            read += n;
            values.insert(column.name, value);
        }
        Ok((T::from_columns(values)?, read))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Person {
        name: String,
        age: u32,
        arr: [u8; 4],
        ints: Vec<u16>,
        data: Vec<u8>,
        empty: Vec<u8>,
        strings: Vec<String>,
    }

    impl Record for Person {
        fn columns() -> Vec<Column> {
            // Deliberately out of order; the schema must sort by name.
            vec![
                Column::new("Name", ColumnType::Text),
                Column::new("Strings", ColumnType::List(Box::new(ColumnType::Text))),
                Column::new("Age", ColumnType::U32),
                Column::new("Ints", ColumnType::List(Box::new(ColumnType::U16))),
                Column::new("Arr", ColumnType::Array(Box::new(ColumnType::U8), 4)),
                Column::new("Data", ColumnType::List(Box::new(ColumnType::U8))),
                Column::new("Empty", ColumnType::List(Box::new(ColumnType::U8))),
            ]
        }

        fn get(&self, column: &str) -> Option<Value> {
            match column {
                "Name" => Some(Value::from(self.name.as_str())),
                "Age" => Some(Value::from(self.age)),
                "Arr" => Some(Value::from(self.arr)),
                "Ints" => Some(Value::from(self.ints.clone())),
                "Data" => Some(Value::from(self.data.clone())),
                "Empty" => Some(Value::from(self.empty.clone())),
                "Strings" => Some(Value::from(self.strings.clone())),
                _ => None,
            }
        }

        fn from_columns(mut values: ColumnValues) -> Result<Self> {
            Ok(Self {
                name: values.take_as("Name")?,
                age: values.take_as("Age")?,
                arr: values.take_as("Arr")?,
                ints: values.take_as("Ints")?,
                data: values.take_as("Data")?,
                empty: values.take_as("Empty")?,
                strings: values.take_as("Strings")?,
            })
        }
    }

    #[test]
    fn columns_are_sorted_by_name() {
        let schema = Schema::derive::<Person>().unwrap();
        let names: Vec<&str> = schema.columns().iter().map(Column::name).collect();
        assert_eq!(
            names,
            ["Age", "Arr", "Data", "Empty", "Ints", "Name", "Strings"]
        );
    }

    #[test]
    fn person_wire_format_fixture() {
        let schema = Schema::derive::<Person>().unwrap();
        let person = Person {
            name: "bob".to_owned(),
            age: 20,
            arr: [1, 2, 3, 4],
            ints: vec![0xffff, 8],
            data: vec![1, 2, 3, 4],
            empty: Vec::new(),
            strings: vec!["welcome".to_owned(), "home".to_owned()],
        };

        let mut encoded = Vec::new();
        let written = schema.encode(&mut encoded, &person).unwrap();
        assert_eq!(written, encoded.len());
        assert_eq!(
            to_hex(&encoded),
            "000000140102030404010203040002ffff000803626f62020777656c636f6d6504686f6d65"
        );

        let (decoded, read): (Person, usize) = schema.decode(&mut &encoded[..]).unwrap();
        assert_eq!(read, written);
        assert_eq!(decoded, person);
    }

    #[test]
    fn empty_sequence_decodes_as_empty_not_absent() {
        let schema = Schema::derive::<Person>().unwrap();
        let person = Person {
            name: String::new(),
            age: 0,
            arr: [0; 4],
            ints: Vec::new(),
            data: Vec::new(),
            empty: Vec::new(),
            strings: Vec::new(),
        };

        let mut encoded = Vec::new();
        schema.encode(&mut encoded, &person).unwrap();
        let (decoded, _): (Person, usize) = schema.decode(&mut &encoded[..]).unwrap();
        assert_eq!(decoded.empty, Vec::<u8>::new());
        assert_eq!(decoded.strings, Vec::<String>::new());
    }

    struct BadArray;

    impl Record for BadArray {
        fn columns() -> Vec<Column> {
            vec![Column::new(
                "Texts",
                ColumnType::Array(Box::new(ColumnType::Text), 3),
            )]
        }

        fn get(&self, _column: &str) -> Option<Value> {
            None
        }

        fn from_columns(_values: ColumnValues) -> Result<Self> {
            Ok(Self)
        }
    }

    struct Duplicated;

    impl Record for Duplicated {
        fn columns() -> Vec<Column> {
            vec![
                Column::new("Name", ColumnType::Text),
                Column::new("Name", ColumnType::U8),
            ]
        }

        fn get(&self, _column: &str) -> Option<Value> {
            None
        }

        fn from_columns(_values: ColumnValues) -> Result<Self> {
            Ok(Self)
        }
    }

    struct Empty;

    impl Record for Empty {
        fn columns() -> Vec<Column> {
            Vec::new()
        }

        fn get(&self, _column: &str) -> Option<Value> {
            None
        }

        fn from_columns(_values: ColumnValues) -> Result<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn derive_rejects_unsupported_shapes() {
        assert!(matches!(
            Schema::derive::<BadArray>().unwrap_err(),
            Error::Schema(_)
        ));
        assert!(matches!(
            Schema::derive::<Duplicated>().unwrap_err(),
            Error::Schema(_)
        ));
        assert!(matches!(
            Schema::derive::<Empty>().unwrap_err(),
            Error::Schema(_)
        ));
    }

    #[derive(Debug)]
    struct WrongShape;

    impl Record for WrongShape {
        fn columns() -> Vec<Column> {
            vec![Column::new("Age", ColumnType::U16)]
        }

        fn get(&self, column: &str) -> Option<Value> {
            // Declares U16 but hands back a U32.
            match column {
                "Age" => Some(Value::U32(7)),
                _ => None,
            }
        }

        fn from_columns(_values: ColumnValues) -> Result<Self> {
            Ok(Self)
        }
    }

    #[test]
    fn encode_rejects_nonconforming_values() {
        let schema = Schema::derive::<WrongShape>().unwrap();
        let mut sink = Vec::new();
        let err = schema.encode(&mut sink, &WrongShape).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn indexed_marker_is_reported() {
        struct Tagged;

        impl Record for Tagged {
            fn columns() -> Vec<Column> {
                vec![
                    Column::new("Email", ColumnType::Text).indexed(),
                    Column::new("Age", ColumnType::U8),
                ]
            }

            fn get(&self, _column: &str) -> Option<Value> {
                None
            }

            fn from_columns(_values: ColumnValues) -> Result<Self> {
                Ok(Self)
            }
        }

        let schema = Schema::derive::<Tagged>().unwrap();
        let indexed: Vec<&str> = schema.indexed_columns().map(Column::name).collect();
        assert_eq!(indexed, ["Email"]);
        assert!(!schema.column("Age").unwrap().is_indexed());
    }
}
