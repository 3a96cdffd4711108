//! Errors raised while constructing expressions.

use thiserror::Error;

use crate::operator::{Arity, Operator};

/// Errors that can occur while building an expression.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExprError {
    /// The child count does not fit the operator's class.
    #[error("operator `{op}` takes {expected} children, got {found}")]
    InvalidArity {
        /// The operator being constructed.
        op: Operator,
        /// The arity the operator requires.
        expected: Arity,
        /// The number of children supplied.
        found: usize,
    },

    /// The string is not a known operator tag.
    #[error("unknown operator tag `{0}`")]
    UnknownOperator(String),
}
