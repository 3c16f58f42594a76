//! Value types for SQL parameters

use serde::{Deserialize, Serialize};

/// A SQL value that can be used as a parameter or rendered as a literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// String value
    String(String),
    /// Bytes value
    Bytes(Vec<u8>),
    /// Structured JSON document
    Json(serde_json::Value),
    /// Array of values
    Array(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this is the "not supplied" value of its type.
    ///
    /// Null, empty strings, empty byte strings, empty lists, empty JSON
    /// documents and numeric zero count as zero. Booleans never do.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(_) => false,
            Value::Int(i) => *i == 0,
            Value::UInt(u) => *u == 0,
            Value::F32(f) => *f == 0.0,
            Value::F64(f) => *f == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::Array(arr) => arr.is_empty(),
            Value::Json(json) => match json {
                serde_json::Value::Null => true,
                serde_json::Value::Bool(_) => false,
                serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
                serde_json::Value::String(s) => s.is_empty(),
                serde_json::Value::Array(arr) => arr.is_empty(),
                serde_json::Value::Object(obj) => obj.is_empty(),
            },
        }
    }

    /// Whether this value carries nested structure (JSON documents and lists)
    pub fn is_structured(&self) -> bool {
        matches!(self, Value::Json(_) | Value::Array(_))
    }

    /// Build a bytes value
    pub fn bytes(val: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(val.into())
    }

    /// Convert a JSON value, keeping scalars as native variants
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::F64(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Json(other),
        }
    }

    /// Convert into a JSON value for serialization
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::UInt(u) => serde_json::Value::from(*u),
            Value::F32(f) => serde_json::Number::from_f64(f64::from(*f))
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::F64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
            Value::Json(j) => j.clone(),
            Value::Array(arr) => serde_json::Value::Array(arr.iter().map(Value::to_json).collect()),
        }
    }

    /// Flatten into the element list of an IN / NOT IN predicate.
    /// A scalar becomes a one-element list.
    pub fn into_list(self) -> Vec<Value> {
        match self {
            Value::Array(arr) => arr,
            Value::Json(serde_json::Value::Array(arr)) => {
                arr.into_iter().map(Value::from_json).collect()
            }
            other => vec![other],
        }
    }

    /// Extract array values if this is an Array variant
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(val: bool) -> Self {
        Value::Bool(val)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(val: $t) -> Self {
                    Value::$variant(val as $target)
                }
            }
        )*
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64, isize);
impl_from_int!(UInt, u64, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(val: f32) -> Self {
        Value::F32(val)
    }
}

impl From<f64> for Value {
    fn from(val: f64) -> Self {
        Value::F64(val)
    }
}

impl From<String> for Value {
    fn from(val: String) -> Self {
        Value::String(val)
    }
}

impl From<&String> for Value {
    fn from(val: &String) -> Self {
        Value::String(val.clone())
    }
}

impl From<&str> for Value {
    fn from(val: &str) -> Self {
        Value::String(val.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(val: serde_json::Value) -> Self {
        Value::from_json(val)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(vals: Vec<T>) -> Self {
        Value::Array(vals.into_iter().map(|v| v.into()).collect())
    }
}

impl<T> From<&[T]> for Value
where
    T: Clone + Into<Value>,
{
    fn from(vals: &[T]) -> Self {
        Value::Array(vals.iter().cloned().map(|v| v.into()).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_creation() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(42u32), Value::UInt(42));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(Value::from(()), Value::Null);
    }

    #[test]
    fn test_array_conversion() {
        let value = Value::from(vec![1, 2, 3]);
        assert_eq!(
            value,
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );

        let arr: &[&str] = &["a", "b"];
        assert_eq!(
            Value::from(arr),
            Value::Array(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(Some(42i64)), Value::Int(42));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn test_zero_values() {
        assert!(Value::Null.is_zero());
        assert!(Value::from("").is_zero());
        assert!(Value::from(0).is_zero());
        assert!(Value::from(0.0f64).is_zero());
        assert!(Value::from(Vec::<i32>::new()).is_zero());
        assert!(Value::Json(json!({})).is_zero());
        assert!(Value::bytes(Vec::new()).is_zero());

        assert!(!Value::from(false).is_zero());
        assert!(!Value::from("x").is_zero());
        assert!(!Value::from(-1).is_zero());
        assert!(!Value::from(vec![0]).is_zero());
    }

    #[test]
    fn test_json_scalars_follow_native_zero_rules() {
        assert!(Value::Json(json!(0)).is_zero());
        assert!(Value::Json(json!(0.0)).is_zero());
        assert!(Value::Json(json!(null)).is_zero());
        assert!(!Value::Json(json!(7)).is_zero());
        assert!(!Value::Json(json!(false)).is_zero());
        assert_eq!(
            Value::Json(json!(0)).is_zero(),
            Value::from_json(json!(0)).is_zero()
        );
    }

    #[test]
    fn test_from_json_keeps_scalars_native() {
        assert_eq!(Value::from(json!(7)), Value::Int(7));
        assert_eq!(Value::from(json!(u64::MAX)), Value::UInt(u64::MAX));
        assert_eq!(Value::from(json!(1.5)), Value::F64(1.5));
        assert_eq!(Value::from(json!("a")), Value::from("a"));
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!([1])), Value::Json(json!([1])));
    }

    #[test]
    fn test_into_list() {
        assert_eq!(Value::from(vec![1, 2]).into_list().len(), 2);
        assert_eq!(Value::Json(json!(["a", "b"])).into_list(), vec![Value::from("a"), Value::from("b")]);
        assert_eq!(Value::from(5).into_list(), vec![Value::Int(5)]);
    }

    #[test]
    fn test_to_json() {
        let value = Value::Array(vec![Value::Int(1), Value::from("x"), Value::Null]);
        assert_eq!(value.to_json(), json!([1, "x", null]));
        assert_eq!(Value::bytes(b"hi".to_vec()).to_json(), json!("hi"));
    }
}
