//! Statement builder module

pub mod common;
pub mod predicate;
pub mod statement;

mod delete;
mod insert;
mod select;
mod update;

// Re-export types from submodules
pub use common::{IntoColumns, IntoPredicate, JoinType, Joiner, Predicate};
pub use predicate::{Inlined, Parameterized, PredicateRenderer, PredicateSet};
pub use statement::{Statement, DEFAULT_PRIMARY_KEY};
