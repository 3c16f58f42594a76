//! Record descriptors and column mapping
//!
//! A record type declares its fields once through [`record!`]; the
//! descriptor table drives column naming for typed fetches and value
//! extraction for INSERT and UPDATE.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use sqlchain::{record, Record};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Address {
//!     city: String,
//! }
//!
//! #[derive(Serialize, Deserialize)]
//! struct UserAccount {
//!     id: i64,
//!     user_name: String,
//!     email: String,
//!     address: Address,
//! }
//!
//! record!(UserAccount {
//!     id,
//!     user_name as "name",
//!     email,
//!     #[nested] address,
//! });
//!
//! assert_eq!(UserAccount::table_name(), "user_account");
//! assert_eq!(UserAccount::columns(), vec!["id", "name", "email"]);
//! ```

use crate::{Error, Result, Value};
use serde::ser::{self, Impossible};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Descriptor of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub ident: &'static str,
    pub rename: Option<&'static str>,
    pub nested: bool,
}

impl Field {
    pub const fn new(ident: &'static str) -> Self {
        Self {
            ident,
            rename: None,
            nested: false,
        }
    }

    /// Map the field to an explicit column name
    pub const fn renamed(self, column: &'static str) -> Self {
        Self {
            rename: Some(column),
            ..self
        }
    }

    /// Mark the field as a composite value. Without an explicit column
    /// name it is not stored as a column of its own.
    pub const fn nested(self) -> Self {
        Self {
            nested: true,
            ..self
        }
    }

    /// The column this field maps to, if any
    pub fn column(&self) -> Option<String> {
        match (self.rename, self.nested) {
            (Some(rename), _) => Some(rename.to_string()),
            (None, true) => None,
            (None, false) => Some(column_name(self.ident)),
        }
    }
}

/// Derive a column name from an identifier: split before every interior
/// uppercase letter, lowercase the pieces, join with `_`.
///
/// ```
/// use sqlchain::record::column_name;
///
/// assert_eq!(column_name("UserName"), "user_name");
/// assert_eq!(column_name("Name"), "name");
/// assert_eq!(column_name("ID"), "i_d");
/// ```
pub fn column_name(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, c) in ident.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// A type with a statically declared field table. Implement it with
/// [`record!`].
pub trait Record {
    /// Name of the Rust type
    fn type_name() -> &'static str;

    /// Field descriptors in declaration order
    fn fields() -> &'static [Field];

    /// Field values, aligned with [`Record::fields`]
    fn field_values(&self) -> Result<Vec<Value>>;

    /// Table used when a typed fetch runs without an explicit table
    fn table_name() -> String {
        column_name(Self::type_name())
    }

    /// Columns selected by typed fetches
    fn columns() -> Vec<String> {
        Self::fields().iter().filter_map(Field::column).collect()
    }
}

/// Serialize one field into a [`Value`]. Scalars map straight onto their
/// variant, so an `f32` stays single precision; anything composite goes
/// through JSON.
#[doc(hidden)]
pub fn to_field_value<T: Serialize + ?Sized>(field: &T) -> Result<Value> {
    match field.serialize(ScalarSerializer) {
        Ok(value) => Ok(value),
        Err(Composite) => Ok(Value::from_json(serde_json::to_value(field)?)),
    }
}

/// Raised by [`ScalarSerializer`] for values with inner structure
#[derive(Debug)]
struct Composite;

impl fmt::Display for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("composite value")
    }
}

impl std::error::Error for Composite {}

impl ser::Error for Composite {
    fn custom<M: fmt::Display>(_msg: M) -> Self {
        Composite
    }
}

type Scalar = std::result::Result<Value, Composite>;

struct ScalarSerializer;

impl ser::Serializer for ScalarSerializer {
    type Ok = Value;
    type Error = Composite;
    type SerializeSeq = Impossible<Value, Composite>;
    type SerializeTuple = Impossible<Value, Composite>;
    type SerializeTupleStruct = Impossible<Value, Composite>;
    type SerializeTupleVariant = Impossible<Value, Composite>;
    type SerializeMap = Impossible<Value, Composite>;
    type SerializeStruct = Impossible<Value, Composite>;
    type SerializeStructVariant = Impossible<Value, Composite>;

    fn serialize_bool(self, v: bool) -> Scalar {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Scalar {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Scalar {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Scalar {
        Ok(Value::Int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Scalar {
        Ok(Value::Int(v))
    }

    fn serialize_u8(self, v: u8) -> Scalar {
        Ok(Value::Int(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Scalar {
        Ok(Value::Int(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Scalar {
        Ok(Value::Int(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Scalar {
        Ok(i64::try_from(v).map_or(Value::UInt(v), Value::Int))
    }

    fn serialize_f32(self, v: f32) -> Scalar {
        Ok(Value::F32(v))
    }

    fn serialize_f64(self, v: f64) -> Scalar {
        Ok(Value::F64(v))
    }

    fn serialize_char(self, v: char) -> Scalar {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Scalar {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Scalar {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Scalar {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Scalar {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Scalar {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Scalar {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Scalar {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Scalar {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Scalar {
        Err(Composite)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self::SerializeSeq, Composite> {
        Err(Composite)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self::SerializeTuple, Composite> {
        Err(Composite)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleStruct, Composite> {
        Err(Composite)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeTupleVariant, Composite> {
        Err(Composite)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self::SerializeMap, Composite> {
        Err(Composite)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStruct, Composite> {
        Err(Composite)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self::SerializeStructVariant, Composite> {
        Err(Composite)
    }
}

/// Implement [`Record`] for a struct.
///
/// Fields are listed by name; `field as "column"` overrides the column name
/// and `#[nested] field` marks a composite field.
#[macro_export]
macro_rules! record {
    ($ty:ident { $( $(#[$attr:ident])? $field:ident $(as $column:literal)? ),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn type_name() -> &'static str {
                stringify!($ty)
            }

            fn fields() -> &'static [$crate::Field] {
                const FIELDS: &[$crate::Field] = &[
                    $( $crate::Field::new(stringify!($field)) $(.$attr())? $(.renamed($column))? ),*
                ];
                FIELDS
            }

            fn field_values(&self) -> $crate::Result<Vec<$crate::Value>> {
                Ok(vec![ $( $crate::record::to_field_value(&self.$field)? ),* ])
            }
        }
    };
}

/// Where a set of writable columns came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Record,
    Mapping,
}

/// Column/value pairs destined for an INSERT or UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct Writable {
    shape: Shape,
    entries: Vec<(String, Value)>,
}

impl Writable {
    /// Extract the columns of a record
    pub fn record<R: Record>(record: &R) -> Result<Self> {
        let values = record.field_values()?;
        let entries = R::fields()
            .iter()
            .zip(values)
            .filter_map(|(field, value)| field.column().map(|column| (column, value)))
            .collect();
        Ok(Self {
            shape: Shape::Record,
            entries,
        })
    }

    /// Wrap key-value pairs
    pub fn mapping<K, V, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            shape: Shape::Mapping,
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writable pairs in order, without the primary key. Null values are
    /// dropped when `skip_null` is set.
    pub fn extract(&self, primary_key: Option<&str>, skip_null: bool) -> Vec<(String, Value)> {
        self.entries
            .iter()
            .filter(|(column, _)| primary_key != Some(column.as_str()))
            .filter(|(_, value)| !(skip_null && value.is_null()))
            .cloned()
            .collect()
    }
}

/// Anything that can supply the columns of an INSERT or UPDATE
pub trait IntoWritable {
    fn into_writable(self) -> Result<Writable>;
}

impl IntoWritable for Writable {
    fn into_writable(self) -> Result<Writable> {
        Ok(self)
    }
}

impl<R: Record> IntoWritable for &R {
    fn into_writable(self) -> Result<Writable> {
        Writable::record(self)
    }
}

impl<K, V> IntoWritable for HashMap<K, V>
where
    K: Into<String> + Ord,
    V: Into<Value>,
{
    fn into_writable(self) -> Result<Writable> {
        // HashMap iteration order is random; sort for stable SQL text
        let mut pairs: Vec<(K, V)> = self.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(Writable::mapping(pairs))
    }
}

impl<K, V> IntoWritable for BTreeMap<K, V>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_writable(self) -> Result<Writable> {
        Ok(Writable::mapping(self))
    }
}

impl IntoWritable for serde_json::Map<String, serde_json::Value> {
    fn into_writable(self) -> Result<Writable> {
        Ok(Writable::mapping(self))
    }
}

impl IntoWritable for serde_json::Value {
    fn into_writable(self) -> Result<Writable> {
        match self {
            serde_json::Value::Object(map) => map.into_writable(),
            other => Err(Error::invalid_shape(format!(
                "expected a record or a key-value mapping, got {other}"
            ))),
        }
    }
}
