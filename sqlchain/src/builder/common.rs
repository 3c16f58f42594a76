//! Common types and conversion traits shared by the statement builders

use crate::{IntoOperator, Operator, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// How a predicate attaches to the ones before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner {
    And,
    Or,
}

impl fmt::Display for Joiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Joiner::And => write!(f, "and"),
            Joiner::Or => write!(f, "or"),
        }
    }
}

/// Payload of one WHERE predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Caller-supplied SQL, emitted verbatim in parentheses
    Raw(String),
    /// Column equalities joined with `and`, values inlined as literals
    Equals(Vec<(String, Value)>),
    /// Implicit equality `column = value`
    Pair(String, Value),
    /// `column op value`
    Compare(String, Operator, Value),
}

/// Trait for anything usable as a WHERE predicate
///
/// # Examples
/// ```
/// use sqlchain::{op, IntoPredicate, Predicate, Value};
///
/// assert_eq!(("age", 18).into_predicate(), Predicate::Pair("age".into(), Value::Int(18)));
/// assert!(matches!(("age", op::GT, 18).into_predicate(), Predicate::Compare(..)));
/// assert!(matches!("deleted_at is null".into_predicate(), Predicate::Raw(_)));
/// ```
pub trait IntoPredicate {
    fn into_predicate(self) -> Predicate;
}

impl IntoPredicate for Predicate {
    fn into_predicate(self) -> Predicate {
        self
    }
}

impl IntoPredicate for &str {
    fn into_predicate(self) -> Predicate {
        Predicate::Raw(self.to_string())
    }
}

impl IntoPredicate for String {
    fn into_predicate(self) -> Predicate {
        Predicate::Raw(self)
    }
}

impl<T> IntoPredicate for (&str, T)
where
    T: Into<Value>,
{
    fn into_predicate(self) -> Predicate {
        Predicate::Pair(self.0.to_string(), self.1.into())
    }
}

impl<T> IntoPredicate for (String, T)
where
    T: Into<Value>,
{
    fn into_predicate(self) -> Predicate {
        Predicate::Pair(self.0, self.1.into())
    }
}

impl<T, O> IntoPredicate for (&str, O, T)
where
    T: Into<Value>,
    O: IntoOperator,
{
    fn into_predicate(self) -> Predicate {
        Predicate::Compare(self.0.to_string(), self.1.into_operator(), self.2.into())
    }
}

impl<T, O> IntoPredicate for (String, O, T)
where
    T: Into<Value>,
    O: IntoOperator,
{
    fn into_predicate(self) -> Predicate {
        Predicate::Compare(self.0, self.1.into_operator(), self.2.into())
    }
}

impl<K, V> IntoPredicate for HashMap<K, V>
where
    K: Into<String> + Ord,
    V: Into<Value>,
{
    fn into_predicate(self) -> Predicate {
        let mut pairs: Vec<(K, V)> = self.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        Predicate::Equals(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> IntoPredicate for BTreeMap<K, V>
where
    K: Into<String>,
    V: Into<Value>,
{
    fn into_predicate(self) -> Predicate {
        Predicate::Equals(self.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoPredicate for serde_json::Map<String, serde_json::Value> {
    fn into_predicate(self) -> Predicate {
        Predicate::Equals(self.into_iter().map(|(k, v)| (k, Value::from_json(v))).collect())
    }
}

/// Trait to convert various types into a column list
pub trait IntoColumns {
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoColumns for &[&str] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

/// JOIN flavours; the joined table is always aliased `B`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinType::Inner => write!(f, "inner join"),
            JoinType::Left => write!(f, "left join"),
            JoinType::Right => write!(f, "right join"),
            JoinType::Full => write!(f, "full join"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op;
    use serde_json::json;

    #[test]
    fn test_tuple_predicates() {
        assert_eq!(
            ("name", "bob").into_predicate(),
            Predicate::Pair("name".to_string(), Value::from("bob"))
        );
        assert_eq!(
            ("age", ">=", 21).into_predicate(),
            Predicate::Compare("age".to_string(), Operator::GTE, Value::Int(21))
        );
        assert_eq!(
            (String::from("id"), op::IN, vec![1, 2]).into_predicate(),
            Predicate::Compare("id".to_string(), Operator::IN, Value::from(vec![1, 2]))
        );
    }

    #[test]
    fn test_map_predicates_have_stable_order() {
        let mut map = HashMap::new();
        map.insert("status", Value::from(1));
        map.insert("kind", Value::from("a"));
        assert_eq!(
            map.into_predicate(),
            Predicate::Equals(vec![
                ("kind".to_string(), Value::from("a")),
                ("status".to_string(), Value::Int(1)),
            ])
        );

        let json_map = match json!({"z": 1, "a": 2}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        // insertion order is preserved for JSON objects
        assert_eq!(
            json_map.into_predicate(),
            Predicate::Equals(vec![
                ("z".to_string(), Value::Int(1)),
                ("a".to_string(), Value::Int(2)),
            ])
        );
    }

    #[test]
    fn test_into_columns() {
        assert_eq!("id".into_columns(), vec!["id"]);
        assert_eq!(["id", "name"].into_columns(), vec!["id", "name"]);
        assert_eq!(vec!["a", "b"].into_columns(), vec!["a", "b"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Joiner::Or.to_string(), "or");
        assert_eq!(JoinType::Left.to_string(), "left join");
        assert_eq!(JoinType::Inner.to_string(), "inner join");
    }
}
