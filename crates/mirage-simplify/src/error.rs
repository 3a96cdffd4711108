//! Errors raised by simplification.

use mirage_core::{ExprError, NumericError, Operator};
use thiserror::Error;

use crate::engine::RewriteStep;

/// Errors that can occur while simplifying an expression.
///
/// All of them are recoverable: the caller can report the error and keep
/// the unsimplified expression.
#[derive(Clone, Debug, Error)]
pub enum SimplifyError {
    /// A rule tried to build an operation with the wrong number of children.
    #[error(transparent)]
    InvalidArity(#[from] ExprError),

    /// Constant folding met an operation that is undefined for its operands.
    #[error("undefined operation `{op}`: {source}")]
    UndefinedOperation {
        /// The operator being folded.
        op: Operator,
        /// Why the operation is undefined.
        source: NumericError,
    },

    /// The rule set did not reach a fixpoint within the step bound.
    #[error("no fixpoint after {limit} rewrite steps; last steps: {}", format_steps(.recent))]
    NonTerminatingRewrite {
        /// The configured step bound.
        limit: usize,
        /// The most recent rewrite steps, oldest first.
        recent: Vec<RewriteStep>,
    },

    /// The expression is nested deeper than the configured bound.
    #[error("expression nesting exceeds {limit} levels")]
    TooDeep {
        /// The configured depth bound.
        limit: usize,
    },
}

impl SimplifyError {
    /// Wraps a folding failure of `op`.
    #[must_use]
    pub fn undefined(op: Operator, source: NumericError) -> Self {
        SimplifyError::UndefinedOperation { op, source }
    }
}

fn format_steps(steps: &[RewriteStep]) -> String {
    steps
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
