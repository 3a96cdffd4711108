//! Multiset storage for commutative semigroup children.
//!
//! Children of `+ * & | ^ && ||` carry no order, only multiplicity, so they
//! are kept as a map from child to count. The map is ordered by the
//! structural order of [`Expr`], which makes iteration deterministic and
//! equality independent of insertion order.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::expr::Expr;

/// A multiset of expressions. Counts are always at least 1.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Multiset {
    entries: BTreeMap<Expr, u64>,
}

impl Multiset {
    /// Creates an empty multiset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `expr`.
    pub fn insert(&mut self, expr: Expr) {
        self.insert_many(expr, 1);
    }

    /// Adds `count` occurrences of `expr`. A zero count is ignored.
    pub fn insert_many(&mut self, expr: Expr, count: u64) {
        if count > 0 {
            *self.entries.entry(expr).or_insert(0) += count;
        }
    }

    /// Removes one occurrence of `expr`, returning whether it was present.
    pub fn remove_one(&mut self, expr: &Expr) -> bool {
        match self.entries.get_mut(expr) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.entries.remove(expr);
                true
            }
            None => false,
        }
    }

    /// Returns the multiplicity of `expr` (0 if absent).
    #[must_use]
    pub fn count(&self, expr: &Expr) -> u64 {
        self.entries.get(expr).copied().unwrap_or(0)
    }

    /// Returns true if `expr` occurs at least once.
    #[must_use]
    pub fn contains(&self, expr: &Expr) -> bool {
        self.entries.contains_key(expr)
    }

    /// Returns the number of distinct children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the sum of all multiplicities.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.values().sum()
    }

    /// Returns true if there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(child, multiplicity)` pairs in structural order.
    pub fn iter(&self) -> impl Iterator<Item = (&Expr, u64)> + '_ {
        self.entries.iter().map(|(e, &c)| (e, c))
    }

    /// Iterates distinct children in structural order.
    pub fn keys(&self) -> impl Iterator<Item = &Expr> + '_ {
        self.entries.keys()
    }

    /// Returns the only entry, if there is exactly one distinct child.
    #[must_use]
    pub fn single(&self) -> Option<(&Expr, u64)> {
        if self.entries.len() == 1 {
            self.iter().next()
        } else {
            None
        }
    }

    /// Splits the entries by a predicate over `(child, multiplicity)`.
    ///
    /// Returns `(matching, rest)`.
    #[must_use]
    pub fn partition(&self, mut pred: impl FnMut(&Expr, u64) -> bool) -> (Multiset, Multiset) {
        let mut matching = Multiset::new();
        let mut rest = Multiset::new();
        for (child, count) in self.iter() {
            if pred(child, count) {
                matching.insert_many(child.clone(), count);
            } else {
                rest.insert_many(child.clone(), count);
            }
        }
        (matching, rest)
    }

    /// Returns true if any entry satisfies the predicate.
    pub fn any(&self, mut pred: impl FnMut(&Expr, u64) -> bool) -> bool {
        self.iter().any(|(child, count)| pred(child, count))
    }
}

impl FromIterator<Expr> for Multiset {
    fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
        let mut set = Multiset::new();
        set.extend(iter);
        set
    }
}

impl FromIterator<(Expr, u64)> for Multiset {
    fn from_iter<I: IntoIterator<Item = (Expr, u64)>>(iter: I) -> Self {
        let mut set = Multiset::new();
        set.extend(iter);
        set
    }
}

impl Extend<Expr> for Multiset {
    fn extend<I: IntoIterator<Item = Expr>>(&mut self, iter: I) {
        for expr in iter {
            self.insert(expr);
        }
    }
}

impl Extend<(Expr, u64)> for Multiset {
    fn extend<I: IntoIterator<Item = (Expr, u64)>>(&mut self, iter: I) {
        for (expr, count) in iter {
            self.insert_many(expr, count);
        }
    }
}

impl IntoIterator for Multiset {
    type Item = (Expr, u64);
    type IntoIter = btree_map::IntoIter<Expr, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
