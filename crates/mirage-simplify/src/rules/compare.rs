//! Comparison normalization.
//!
//! Only `== != < <=` exist as operators, so negations are rewritten into
//! their dual comparison and differences compared against zero are turned
//! into direct comparisons of the two sides.

use mirage_core::{Expr, Multiset, Operation, Operator};

use crate::error::SimplifyError;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleContext, Trigger};

const COMPARISONS: &[Operator] = &[Operator::Eq, Operator::Ne, Operator::Lt, Operator::Le];

/// `x == x` is true, `x < x` is false.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelfCompare;

impl Rule for SelfCompare {
    fn name(&self) -> &'static str {
        "self-compare"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(COMPARISONS)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.operands().is_some_and(|(lhs, rhs)| lhs == rhs)
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        Ok(Expr::bool(matches!(node.op(), Operator::Eq | Operator::Le)))
    }
}

/// Rewrites `!(a < b)` to `b <= a` and the other negated comparisons to
/// their duals.
#[derive(Clone, Copy, Debug, Default)]
pub struct NegatedCompare;

impl NegatedCompare {
    /// The comparison equivalent to the negation of `op`, and whether its
    /// operands swap.
    fn dual(op: Operator) -> Option<(Operator, bool)> {
        match op {
            Operator::Eq => Some((Operator::Ne, false)),
            Operator::Ne => Some((Operator::Eq, false)),
            Operator::Lt => Some((Operator::Le, true)),
            Operator::Le => Some((Operator::Lt, true)),
            _ => None,
        }
    }
}

impl Rule for NegatedCompare {
    fn name(&self) -> &'static str {
        "negated-compare"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Operator(Operator::Not)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.child(0)
            .and_then(Expr::op)
            .is_some_and(|op| op.is_comparison())
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some(inner) = node.child(0).and_then(Expr::as_operation) else {
            return Ok(Expr::from(node.clone()));
        };
        let (Some((op, swap)), Some((lhs, rhs))) = (Self::dual(inner.op()), inner.operands()) else {
            return Ok(Expr::from(node.clone()));
        };
        let (lhs, rhs) = if swap { (rhs, lhs) } else { (lhs, rhs) };
        Ok(Expr::operation(op, [lhs.clone(), rhs.clone()])?)
    }
}

/// Moves negative terms of a sum compared against zero to the other side:
/// `a + -1*b < 0` becomes `a < b`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubtractCompare;

/// A difference split into its positive and negated negative terms.
struct Difference {
    positive: Multiset,
    negative: Multiset,
    zero_on_left: bool,
}

impl SubtractCompare {
    fn split(node: &Operation) -> Option<Difference> {
        let (lhs, rhs) = node.operands()?;
        let (sum, zero_on_left) = if rhs.is_int(0) {
            (lhs, false)
        } else if lhs.is_int(0) {
            (rhs, true)
        } else {
            return None;
        };

        let terms: Multiset = match sum.as_operation().filter(|op| op.op() == Operator::Add) {
            Some(op) => op.multiset()?.clone(),
            None => std::iter::once(sum.clone()).collect(),
        };
        let mut positive = Multiset::new();
        let mut negative = Multiset::new();
        for (term, count) in terms.iter() {
            match negated_term(term) {
                Some(flipped) => negative.insert_many(flipped, count),
                None => positive.insert_many(term.clone(), count),
            }
        }
        (!negative.is_empty()).then_some(Difference {
            positive,
            negative,
            zero_on_left,
        })
    }
}

/// Returns `-term` if `term` is a negative constant or a product with a
/// negative coefficient.
fn negated_term(term: &Expr) -> Option<Expr> {
    if let Some(value) = term.as_constant() {
        return value.is_negative().then(|| Expr::from(value.negate()));
    }
    let set = term
        .as_operation()
        .filter(|node| node.op() == Operator::Mul)?
        .multiset()?;
    let (coefficient, value) = set.iter().find_map(|(child, count)| {
        child
            .as_constant()
            .filter(|value| count == 1 && value.is_negative())
            .map(|value| (child, value))
    })?;
    let mut rest = set.clone();
    rest.remove_one(coefficient);
    rest.insert(Expr::from(value.negate()));
    Expr::from_multiset(Operator::Mul, rest).ok()
}

impl Rule for SubtractCompare {
    fn name(&self) -> &'static str {
        "subtract-compare"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(COMPARISONS)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        Self::split(node).is_some()
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some(diff) = Self::split(node) else {
            return Ok(Expr::from(node.clone()));
        };
        let positive = Expr::from_multiset(Operator::Add, diff.positive)?;
        let negative = Expr::from_multiset(Operator::Add, diff.negative)?;
        let operands = if diff.zero_on_left {
            [negative, positive]
        } else {
            [positive, negative]
        };
        Ok(Expr::operation(node.op(), operands)?)
    }
}

/// `a == 0` becomes `!a` and `a != 0` becomes `!!a`.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompareZero;

impl CompareZero {
    fn operand(node: &Operation) -> Option<&Expr> {
        match node.operands()? {
            (lhs, rhs) if rhs.is_int(0) => Some(lhs),
            (lhs, rhs) if lhs.is_int(0) => Some(rhs),
            _ => None,
        }
    }
}

impl Rule for CompareZero {
    fn name(&self) -> &'static str {
        "compare-zero"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(&[Operator::Eq, Operator::Ne])
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        Self::operand(node).is_some()
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some(operand) = Self::operand(node) else {
            return Ok(Expr::from(node.clone()));
        };
        let not = operand.clone().logical_not();
        Ok(if node.op() == Operator::Ne { not.logical_not() } else { not })
    }
}

/// Registers the comparison family.
pub fn register(registry: &mut RuleRegistry) {
    registry
        .register(SelfCompare)
        .register(NegatedCompare)
        .register(SubtractCompare)
        .register(CompareZero);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{simplified, sym};

    #[test]
    fn test_self_comparisons() {
        let x = sym("x") + sym("y");
        assert_eq!(simplified(&x.clone().cmp_eq(x.clone())), Expr::int(1));
        assert_eq!(simplified(&x.clone().cmp_le(x.clone())), Expr::int(1));
        assert_eq!(simplified(&x.clone().cmp_ne(x.clone())), Expr::int(0));
        assert_eq!(simplified(&x.clone().cmp_lt(x)), Expr::int(0));
    }

    #[test]
    fn test_negation_uses_the_dual() {
        let (a, b) = (sym("a"), sym("b"));
        let lt = a.clone().cmp_lt(b.clone()).logical_not();
        assert_eq!(simplified(&lt), b.clone().cmp_le(a.clone()));
        let le = a.clone().cmp_le(b.clone()).logical_not();
        assert_eq!(simplified(&le), b.clone().cmp_lt(a.clone()));
        let eq = a.clone().cmp_eq(b.clone()).logical_not();
        assert_eq!(simplified(&eq), a.clone().cmp_ne(b.clone()));
        let ne = a.clone().cmp_ne(b.clone()).logical_not();
        assert_eq!(simplified(&ne), a.cmp_eq(b));
    }

    #[test]
    fn test_greater_than_is_built_from_less_than() {
        let (a, b) = (sym("a"), sym("b"));
        let gt = a.clone().cmp_gt(b.clone());
        assert_eq!(gt, b.clone().cmp_lt(a.clone()));
        assert_eq!(simplified(&gt.logical_not()), a.cmp_le(b));
    }

    #[test]
    fn test_difference_against_zero() {
        let (a, b) = (sym("a"), sym("b"));
        let diff = (a.clone() - b.clone()).cmp_lt(Expr::int(0));
        assert_eq!(simplified(&diff), a.clone().cmp_lt(b.clone()));

        let flipped = Expr::int(0).cmp_le(a.clone() - b.clone());
        assert_eq!(simplified(&flipped), b.clone().cmp_le(a.clone()));

        let eq = (a.clone() - b.clone()).cmp_eq(Expr::int(0));
        assert_eq!(simplified(&eq), a.cmp_eq(b));
    }

    #[test]
    fn test_negative_constant_moves_across() {
        let x = sym("x");
        let e = (x.clone() - Expr::int(5)).cmp_lt(Expr::int(0));
        assert_eq!(simplified(&e), x.cmp_lt(Expr::int(5)));
    }

    #[test]
    fn test_scaled_difference_keeps_coefficients() {
        let (a, b) = (sym("a"), sym("b"));
        let e = (a.clone() + b.clone() * Expr::int(-3)).cmp_le(Expr::int(0));
        assert_eq!(simplified(&e), a.cmp_le(b * Expr::int(3)));
    }

    #[test]
    fn test_equality_with_zero() {
        let x = sym("x");
        assert_eq!(simplified(&x.clone().cmp_eq(Expr::int(0))), x.clone().logical_not());
        assert_eq!(simplified(&Expr::int(0).cmp_eq(x.clone())), x.clone().logical_not());
        assert_eq!(
            simplified(&x.clone().cmp_ne(Expr::int(0))),
            x.logical_not().logical_not()
        );
    }

    #[test]
    fn test_comparison_equal_to_zero_is_negated() {
        let (a, b) = (sym("a"), sym("b"));
        let e = a.clone().cmp_lt(b.clone()).cmp_eq(Expr::int(0));
        assert_eq!(simplified(&e), b.cmp_le(a));
    }

    #[test]
    fn test_plain_comparisons_are_kept() {
        let (a, b) = (sym("a"), sym("b"));
        let e = a.cmp_lt(b);
        assert_eq!(simplified(&e), e);
    }
}
