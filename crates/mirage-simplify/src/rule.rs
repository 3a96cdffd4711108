//! The rewrite rule abstraction.
//!
//! A rule pairs a cheap applicability test with a rewrite. Rules are keyed
//! by a [`Trigger`] so the engine only offers them nodes they can handle.

use mirage_core::{Expr, Operation, Operator, OperatorClass};

use crate::engine::SimplifierConfig;
use crate::error::SimplifyError;

/// The operator shapes a rule is offered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// A single operator.
    Operator(Operator),
    /// Any of the listed operators.
    AnyOf(&'static [Operator]),
    /// Every operator of a class, e.g. all semigroup operators.
    Class(OperatorClass),
    /// Every operation.
    Any,
}

impl Trigger {
    /// Returns true if a node with operator `op` should be offered to the rule.
    #[must_use]
    pub fn covers(self, op: Operator) -> bool {
        match self {
            Trigger::Operator(target) => target == op,
            Trigger::AnyOf(targets) => targets.contains(&op),
            Trigger::Class(class) => op.class() == class,
            Trigger::Any => true,
        }
    }
}

/// What a rule may know about the node it is looking at, beyond the node.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    parent: Option<Operator>,
    config: &'a SimplifierConfig,
}

impl<'a> RuleContext<'a> {
    /// Creates a context.
    #[must_use]
    pub fn new(parent: Option<Operator>, config: &'a SimplifierConfig) -> Self {
        Self { parent, config }
    }

    /// The operator of the enclosing node, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Operator> {
        self.parent
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &'a SimplifierConfig {
        self.config
    }
}

/// A rewrite rule.
///
/// Implementations must be pure: the same node and context always give the
/// same answer, and no state outside the returned expression changes. The
/// rewrite must preserve the value of the expression.
pub trait Rule: Send + Sync {
    /// A short, stable name used in logs and statistics.
    fn name(&self) -> &'static str;

    /// The operators this rule applies to.
    fn trigger(&self) -> Trigger;

    /// Cheap applicability test. "Does not apply" is `false`, never an error.
    fn matches(&self, node: &Operation, ctx: &RuleContext<'_>) -> bool;

    /// Produces the replacement for `node`.
    ///
    /// Only called when [`Rule::matches`] returned true. Returning the
    /// node unchanged counts as not applying.
    ///
    /// # Errors
    ///
    /// Returns an error if the rewrite would have to compute something
    /// undefined, such as a constant division by zero.
    fn rewrite(&self, node: &Operation, ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError>;
}
