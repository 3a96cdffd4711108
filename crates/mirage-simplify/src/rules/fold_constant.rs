//! Constant folding.
//!
//! Operations whose relevant children are constants are replaced by their
//! value. Semigroup operations fold their constant children into a single
//! constant and drop it when it is the identity, and absorbing constants
//! (`0` under `*`, a false operand under `&&`, ...) replace the whole node.
//! Folding never guesses: undefined operations surface as errors.

use mirage_core::eval;
use mirage_core::{Expr, Number, Operation, Operator, OperatorClass};

use crate::error::SimplifyError;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleContext, Trigger};

const ABSORBING: &[Operator] = &[
    Operator::Mul,
    Operator::BitAnd,
    Operator::BitOr,
    Operator::And,
    Operator::Or,
];

/// The value that makes `op` ignore every other operand.
fn absorbed(op: Operator, value: &Number) -> Option<Number> {
    match op {
        Operator::Mul if !value.is_truthy() => Some(value.clone()),
        Operator::BitAnd if value.is_int(0) => Some(Number::from(0i64)),
        Operator::BitOr if value.is_int(-1) => Some(Number::from(-1i64)),
        Operator::And if !value.is_truthy() => Some(Number::from_bool(false)),
        Operator::Or if value.is_truthy() => Some(Number::from_bool(true)),
        _ => None,
    }
}

/// Evaluates a unary operator on a constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldUnary;

impl Rule for FoldUnary {
    fn name(&self) -> &'static str {
        "fold-unary"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Class(OperatorClass::Unary)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.child(0).is_some_and(Expr::is_constant)
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some(value) = node.child(0).and_then(Expr::as_constant) else {
            return Ok(Expr::from(node.clone()));
        };
        eval::unary(node.op(), value)
            .map(Expr::from)
            .map_err(|source| SimplifyError::undefined(node.op(), source))
    }
}

/// Evaluates a binary operator on two constants.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldBinary;

impl Rule for FoldBinary {
    fn name(&self) -> &'static str {
        "fold-binary"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Class(OperatorClass::Binary)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.operands()
            .is_some_and(|(lhs, rhs)| lhs.is_constant() && rhs.is_constant())
    }

    fn rewrite(&self, node: &Operation, ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some((Some(lhs), Some(rhs))) = node
            .operands()
            .map(|(lhs, rhs)| (lhs.as_constant(), rhs.as_constant()))
        else {
            return Ok(Expr::from(node.clone()));
        };
        eval::binary(node.op(), lhs, rhs, ctx.config().word_bits)
            .map(Expr::from)
            .map_err(|source| SimplifyError::undefined(node.op(), source))
    }
}

/// Replaces a semigroup operation holding an absorbing constant by that
/// constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShortCircuit;

impl ShortCircuit {
    fn find(node: &Operation) -> Option<Number> {
        node.multiset()?
            .keys()
            .filter_map(Expr::as_constant)
            .find_map(|value| absorbed(node.op(), value))
    }
}

impl Rule for ShortCircuit {
    fn name(&self) -> &'static str {
        "short-circuit"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(ABSORBING)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        Self::find(node).is_some()
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        Ok(Self::find(node).map_or_else(|| Expr::from(node.clone()), Expr::from))
    }
}

/// Folds the constant children of a semigroup operation into one.
#[derive(Clone, Copy, Debug, Default)]
pub struct FoldNary;

impl Rule for FoldNary {
    fn name(&self) -> &'static str {
        "fold-nary"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Class(OperatorClass::Semigroup)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        let (Some(set), Some(identity)) = (node.multiset(), eval::identity(node.op())) else {
            return false;
        };
        let mut constants = set.iter().filter(|(child, _)| child.is_constant());
        match (constants.next(), constants.next()) {
            (Some(_), Some(_)) => true,
            (Some((only, count)), None) => count > 1 || only.as_constant() == Some(&identity),
            (None, _) => false,
        }
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let op = node.op();
        let (Some(set), Some(identity)) = (node.multiset(), eval::identity(op)) else {
            return Ok(Expr::from(node.clone()));
        };
        let (constants, mut rest) = set.partition(|child, _| child.is_constant());

        let mut acc = identity.clone();
        for (child, count) in constants.iter() {
            if let Some(value) = child.as_constant() {
                acc = eval::accumulate(op, &acc, value, count)
                    .map_err(|source| SimplifyError::undefined(op, source))?;
            }
        }
        if acc != identity {
            rest.insert(Expr::from(acc));
        }
        Ok(Expr::from_multiset(op, rest)?)
    }
}

/// Replaces a semigroup operation with no children by its identity and one
/// with a single child by that child.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaryBase;

impl Rule for NaryBase {
    fn name(&self) -> &'static str {
        "nary-base"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Class(OperatorClass::Semigroup)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.multiset()
            .is_some_and(|set| set.is_empty() || set.single().is_some_and(|(_, count)| count == 1))
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some(set) = node.multiset() else {
            return Ok(Expr::from(node.clone()));
        };
        match set.single() {
            Some((child, 1)) => Ok(child.clone()),
            Some(_) => Ok(Expr::from(node.clone())),
            None => Ok(eval::identity(node.op())
                .map_or_else(|| Expr::from(node.clone()), Expr::from)),
        }
    }
}

/// Picks the branch of a conditional whose condition is constant.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantCondition;

impl Rule for ConstantCondition {
    fn name(&self) -> &'static str {
        "constant-condition"
    }

    fn trigger(&self) -> Trigger {
        Trigger::Operator(Operator::Conditional)
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.child(0).is_some_and(Expr::is_constant)
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let branch = match node.child(0).and_then(Expr::as_constant) {
            Some(cond) if cond.is_truthy() => node.child(1),
            Some(_) => node.child(2),
            None => None,
        };
        Ok(branch.cloned().unwrap_or_else(|| Expr::from(node.clone())))
    }
}

/// Registers the constant folding family.
pub fn register(registry: &mut RuleRegistry) {
    registry
        .register(FoldUnary)
        .register(FoldBinary)
        .register(ShortCircuit)
        .register(FoldNary)
        .register(NaryBase)
        .register(ConstantCondition);
}
