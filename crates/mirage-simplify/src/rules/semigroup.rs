//! Structural rules for commutative semigroups.
//!
//! - `a + (b + c)` becomes `a + b + c`
//! - `a & a` becomes `a` for the idempotent operators `& | && ||`
//! - `a ^ a` becomes `0`, leaving one copy of every child with odd count

use mirage_core::{Expr, Multiset, Operation, Operator, OperatorClass};

use crate::error::SimplifyError;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleContext, Trigger};

const IDEMPOTENT: &[Operator] = &[Operator::BitAnd, Operator::BitOr, Operator::And, Operator::Or];

/// Merges children that use the same operator into their parent.
#[derive(Clone, Copy, Debug, Default)]
pub struct Flatten;

impl Rule for Flatten {
    fn name(&self) -> &'static str {
        "flatten"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Class(OperatorClass::Semigroup)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.multiset()
            .is_some_and(|set| set.any(|child, _| child.is_op(node.op())))
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some(set) = node.multiset() else {
            return Ok(Expr::from(node.clone()));
        };
        let (nested, mut flat) = set.partition(|child, _| child.is_op(node.op()));
        for (child, count) in nested {
            if let Some(inner) = child.as_operation().and_then(Operation::multiset) {
                for (grandchild, n) in inner.iter() {
                    flat.insert_many(grandchild.clone(), n.saturating_mul(count));
                }
            }
        }
        Ok(Expr::from_multiset(node.op(), flat)?)
    }
}

/// Collapses repeated children of idempotent operators.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idempotent;

impl Rule for Idempotent {
    fn name(&self) -> &'static str {
        "idempotent"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(IDEMPOTENT)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.multiset().is_some_and(|set| set.any(|_, count| count > 1))
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let children: Multiset = node
            .multiset()
            .into_iter()
            .flat_map(Multiset::keys)
            .cloned()
            .collect();
        Ok(Expr::from_multiset(node.op(), children)?)
    }
}

/// Cancels pairs of equal children under `^`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Involution;

impl Rule for Involution {
    fn name(&self) -> &'static str {
        "involution"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Operator(Operator::BitXor)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.multiset().is_some_and(|set| set.any(|_, count| count > 1))
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let children: Multiset = node
            .multiset()
            .into_iter()
            .flat_map(Multiset::iter)
            .filter(|&(_, count)| count % 2 == 1)
            .map(|(child, _)| child.clone())
            .collect();
        Ok(Expr::from_multiset(node.op(), children)?)
    }
}

/// Registers the semigroup family.
pub fn register(registry: &mut RuleRegistry) {
    registry.register(Flatten).register(Idempotent).register(Involution);
}
