//! SQL comparison operators accepted in WHERE predicates

use crate::{Error, Result};
use std::fmt::{self, Display};

/// A whitelisted comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operator(&'static str);

impl Operator {
    pub const EQ: Self = Operator("=");
    pub const GT: Self = Operator(">");
    pub const LT: Self = Operator("<");
    pub const NEQ: Self = Operator("!=");
    pub const LTGT: Self = Operator("<>");
    pub const GTE: Self = Operator(">=");
    pub const LTE: Self = Operator("<=");
    pub const LIKE: Self = Operator("like");
    pub const IN: Self = Operator("in");
    pub const NOT_IN: Self = Operator("not in");

    const ALL: [Operator; 10] = [
        Self::EQ,
        Self::GT,
        Self::LT,
        Self::NEQ,
        Self::LTGT,
        Self::GTE,
        Self::LTE,
        Self::LIKE,
        Self::IN,
        Self::NOT_IN,
    ];

    /// Look up an operator token, ignoring case and surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use sqlchain::Operator;
    ///
    /// assert_eq!(Operator::parse("NOT IN").unwrap(), Operator::NOT_IN);
    /// assert!(Operator::parse("between").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self> {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.0 == normalized)
            .ok_or_else(|| Error::unsupported_operator(token))
    }

    /// Get the string representation of the operator
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Whether the right-hand side is a value list
    pub fn is_membership(&self) -> bool {
        *self == Self::IN || *self == Self::NOT_IN
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for types that can be converted to SQL operators
pub trait IntoOperator {
    fn into_operator(self) -> Operator;
}

impl IntoOperator for Operator {
    fn into_operator(self) -> Operator {
        self
    }
}

/// String tokens are checked against the whitelist. An unknown token is a
/// bug in the calling code, so it aborts instead of returning an error.
impl IntoOperator for &str {
    fn into_operator(self) -> Operator {
        match Operator::parse(self) {
            Ok(op) => op,
            Err(err) => {
                tracing::error!(target: "sqlchain::builder", operator = self, "where condition operator error");
                panic!("{err}")
            }
        }
    }
}

impl IntoOperator for String {
    fn into_operator(self) -> Operator {
        self.as_str().into_operator()
    }
}

/// Convenience module for operator constants
pub mod op {
    use super::Operator;

    pub const EQ: Operator = Operator::EQ;
    pub const GT: Operator = Operator::GT;
    pub const LT: Operator = Operator::LT;
    pub const NEQ: Operator = Operator::NEQ;
    pub const LTGT: Operator = Operator::LTGT;
    pub const GTE: Operator = Operator::GTE;
    pub const LTE: Operator = Operator::LTE;
    pub const LIKE: Operator = Operator::LIKE;
    pub const IN: Operator = Operator::IN;
    pub const NOT_IN: Operator = Operator::NOT_IN;
}
