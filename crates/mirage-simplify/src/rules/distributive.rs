//! Grouping of repeated terms and factoring.
//!
//! Repeated children become products or powers (`x + x` is `x * 2`, `x * x`
//! is `x ** 2`). Factoring pulls the most common factor out of a sum-like
//! operation over its distributive partner:
//!
//! | outer | inner |
//! |-------|-------|
//! | `+`   | `*`   |
//! | `\|`  | `&`   |
//! | `&`   | `\|`  |
//! | `\|\|`| `&&`  |
//! | `&&`  | `\|\|`|
//!
//! A term that is not an inner operation counts as `term ⋆ identity`, which
//! gives absorption: `a | (a & b)` factors to `a & (-1 | b)` and folds to `a`.

use std::collections::BTreeMap;

use mirage_core::{Expr, Multiset, Operation, Operator};

use crate::error::SimplifyError;
use crate::registry::RuleRegistry;
use crate::rule::{Rule, RuleContext, Trigger};

/// Rewrites repeated non-constant children of `+` and `*`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Repetition;

impl Rule for Repetition {
    fn name(&self) -> &'static str {
        "repetition"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(&[Operator::Add, Operator::Mul])
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.multiset()
            .is_some_and(|set| set.any(|child, count| count > 1 && !child.is_constant()))
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let Some(set) = node.multiset() else {
            return Ok(Expr::from(node.clone()));
        };
        let mut children = Multiset::new();
        for (child, count) in set.iter() {
            if count == 1 || child.is_constant() {
                children.insert_many(child.clone(), count);
                continue;
            }
            let times = Expr::constant(count);
            let grouped = match node.op() {
                Operator::Mul => Expr::operation(Operator::Pow, [child.clone(), times])?,
                _ => Expr::operation(Operator::Mul, [child.clone(), times])?,
            };
            children.insert(grouped);
        }
        Ok(Expr::from_multiset(node.op(), children)?)
    }
}

/// Factors the most common factor out of the terms of a distributive pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct Distribute;

impl Distribute {
    /// The inner operator distributing over `op`.
    fn inner(op: Operator) -> Option<Operator> {
        match op {
            Operator::Add => Some(Operator::Mul),
            Operator::BitOr => Some(Operator::BitAnd),
            Operator::BitAnd => Some(Operator::BitOr),
            Operator::Or => Some(Operator::And),
            Operator::And => Some(Operator::Or),
            _ => None,
        }
    }

    /// Distinct non-constant factors of `term` under `inner`.
    fn factors(term: &Expr, inner: Operator) -> Vec<&Expr> {
        match term.as_operation().and_then(Operation::multiset) {
            Some(set) if term.is_op(inner) => set.keys().filter(|f| !f.is_constant()).collect(),
            _ if term.is_constant() => Vec::new(),
            _ => vec![term],
        }
    }

    /// The factor shared by the most terms, if at least two share one.
    /// Ties go to the structurally smallest factor.
    fn common_factor(set: &Multiset, inner: Operator) -> Option<Expr> {
        let mut seen: BTreeMap<&Expr, usize> = BTreeMap::new();
        for term in set.keys() {
            for factor in Self::factors(term, inner) {
                *seen.entry(factor).or_insert(0) += 1;
            }
        }
        let mut best: Option<(&Expr, usize)> = None;
        for (factor, terms) in seen {
            if terms >= 2 && best.map_or(true, |(_, most)| terms > most) {
                best = Some((factor, terms));
            }
        }
        best.map(|(factor, _)| factor.clone())
    }

    /// Removes one `factor` from `term`, or `None` if it does not occur.
    fn cofactor(
        term: &Expr,
        inner: Operator,
        factor: &Expr,
    ) -> Result<Option<Expr>, SimplifyError> {
        if term == factor {
            return Ok(Some(Expr::from_multiset(inner, Multiset::new())?));
        }
        match term.as_operation().and_then(Operation::multiset) {
            Some(set) if term.is_op(inner) && set.contains(factor) => {
                let mut rest = set.clone();
                rest.remove_one(factor);
                Ok(Some(Expr::from_multiset(inner, rest)?))
            }
            _ => Ok(None),
        }
    }
}

impl Rule for Distribute {
    fn name(&self) -> &'static str {
        "distribute"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(&[
            Operator::Add,
            Operator::BitOr,
            Operator::BitAnd,
            Operator::Or,
            Operator::And,
        ])
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        match (node.multiset(), Self::inner(node.op())) {
            (Some(set), Some(inner)) => Self::common_factor(set, inner).is_some(),
            _ => false,
        }
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        let op = node.op();
        let (Some(set), Some(inner)) = (node.multiset(), Self::inner(op)) else {
            return Ok(Expr::from(node.clone()));
        };
        let Some(factor) = Self::common_factor(set, inner) else {
            return Ok(Expr::from(node.clone()));
        };

        let mut rest = Multiset::new();
        let mut cofactors = Multiset::new();
        for (term, count) in set.iter() {
            match Self::cofactor(term, inner, &factor)? {
                Some(cofactor) => cofactors.insert_many(cofactor, count),
                None => rest.insert_many(term.clone(), count),
            }
        }
        let grouped = Expr::from_multiset(op, cofactors)?;
        rest.insert(Expr::from_multiset(inner, [factor, grouped].into_iter().collect())?);
        Ok(Expr::from_multiset(op, rest)?)
    }
}

/// Registers the distributive family.
pub fn register(registry: &mut RuleRegistry) {
    registry.register(Repetition).register(Distribute);
}
