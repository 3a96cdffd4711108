//! Expression node types.
//!
//! An [`Expr`] is a reference-counted handle to an immutable [`ExprNode`].
//! Cloning is cheap and shares the subtree; every transformation builds new
//! nodes instead of mutating old ones, so a subtree may safely appear in
//! many trees at once.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::ExprError;
use crate::multiset::Multiset;
use crate::number::Number;
use crate::operator::{Operator, OperatorClass};

/// An opaque symbol identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Creates a symbol from its name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// Returns the symbol name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Child storage of an [`Operation`], chosen by the operator class.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Children {
    /// Unordered children with multiplicities (semigroup operators).
    Multiset(Multiset),
    /// The single child of a unary operator.
    Unary(Expr),
    /// Ordered children of binary, ternary and call operators.
    Ordered(SmallVec<[Expr; 3]>),
}

/// An operator applied to its children.
///
/// The child storage always matches the operator class; this is checked
/// by every public constructor.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Operation {
    op: Operator,
    children: Children,
}

impl Operation {
    /// Creates an operation, placing `children` into the storage discipline
    /// of `op`.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::InvalidArity`] if the child count does not fit
    /// the operator.
    pub fn new(op: Operator, children: impl IntoIterator<Item = Expr>) -> Result<Self, ExprError> {
        let mut list: SmallVec<[Expr; 3]> = children.into_iter().collect();
        let arity_error = ExprError::InvalidArity {
            op,
            expected: op.arity(),
            found: list.len(),
        };
        if !op.arity().accepts(list.len()) {
            return Err(arity_error);
        }

        let children = match op.class() {
            OperatorClass::Semigroup => Children::Multiset(list.into_iter().collect()),
            OperatorClass::Unary => Children::Unary(list.pop().ok_or(arity_error)?),
            OperatorClass::Binary | OperatorClass::Ternary | OperatorClass::Variadic => {
                Children::Ordered(list)
            }
        };
        Ok(Self { op, children })
    }

    /// Creates a semigroup operation from an explicit multiset.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::InvalidArity`] if `op` is not a semigroup
    /// operator, since only those store multisets.
    pub fn from_multiset(op: Operator, children: Multiset) -> Result<Self, ExprError> {
        if !op.is_semigroup() {
            return Err(ExprError::InvalidArity {
                op,
                expected: op.arity(),
                found: usize::try_from(children.total()).unwrap_or(usize::MAX),
            });
        }
        Ok(Self {
            op,
            children: Children::Multiset(children),
        })
    }

    /// Builds an operation whose arity is known to be valid.
    pub(crate) fn fixed(op: Operator, children: Children) -> Self {
        debug_assert!(match &children {
            Children::Multiset(_) => op.is_semigroup(),
            Children::Unary(_) => op.class() == OperatorClass::Unary,
            Children::Ordered(list) => !op.is_semigroup() && op.arity().accepts(list.len()),
        });
        Self { op, children }
    }

    /// Returns the operator.
    #[must_use]
    pub fn op(&self) -> Operator {
        self.op
    }

    /// Returns the child storage.
    #[must_use]
    pub fn children(&self) -> &Children {
        &self.children
    }

    /// Returns the children of a semigroup operation.
    #[must_use]
    pub fn multiset(&self) -> Option<&Multiset> {
        match &self.children {
            Children::Multiset(set) => Some(set),
            _ => None,
        }
    }

    /// Returns the ordered children. Empty for semigroup operations.
    #[must_use]
    pub fn ordered(&self) -> &[Expr] {
        match &self.children {
            Children::Multiset(_) => &[],
            Children::Unary(child) => std::slice::from_ref(child),
            Children::Ordered(list) => list,
        }
    }

    /// Returns the `index`-th ordered child.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Expr> {
        self.ordered().get(index)
    }

    /// Returns the two children of a binary operation.
    #[must_use]
    pub fn operands(&self) -> Option<(&Expr, &Expr)> {
        match self.ordered() {
            [lhs, rhs] if self.op.class() == OperatorClass::Binary => Some((lhs, rhs)),
            _ => None,
        }
    }

    /// Iterates over the distinct children, ignoring multiplicities.
    pub fn iter_children(&self) -> impl Iterator<Item = &Expr> + '_ {
        self.multiset()
            .into_iter()
            .flat_map(|set| set.keys())
            .chain(self.ordered())
    }

    /// Rebuilds this operation with every child mapped through `f`.
    ///
    /// Multiset children that map to the same expression are merged and
    /// their multiplicities added. The operator and its class are kept, so
    /// the result is always well formed.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `f`.
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Self, E> {
        let children = match &self.children {
            Children::Multiset(set) => {
                let mut mapped = Multiset::new();
                for (child, count) in set.iter() {
                    mapped.insert_many(f(child)?, count);
                }
                Children::Multiset(mapped)
            }
            Children::Unary(child) => Children::Unary(f(child)?),
            Children::Ordered(list) => {
                Children::Ordered(list.iter().map(&mut f).collect::<Result<_, E>>()?)
            }
        };
        Ok(Self::fixed(self.op, children))
    }
}

/// An expression node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExprNode {
    /// A numeric literal.
    Constant(Number),
    /// A symbolic placeholder.
    Symbol(Symbol),
    /// An operator applied to children.
    Operation(Operation),
}

/// A shared, immutable expression tree.
///
/// Equality, hashing and ordering are structural. Semigroup operations
/// compare their children as multisets, so `a + b` equals `b + a`.
#[derive(Clone)]
pub struct Expr(Arc<ExprNode>);

impl Expr {
    /// Wraps a node.
    #[must_use]
    pub fn new(node: ExprNode) -> Self {
        Self(Arc::new(node))
    }

    /// Creates a constant.
    #[must_use]
    pub fn constant(value: impl Into<Number>) -> Self {
        Self::new(ExprNode::Constant(value.into()))
    }

    /// Creates an integer constant.
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::constant(value)
    }

    /// Creates a float constant.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Self::constant(value)
    }

    /// Creates the boolean constant `1` or `0`.
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::constant(Number::from_bool(value))
    }

    /// Creates a symbol.
    #[must_use]
    pub fn symbol(name: &str) -> Self {
        Self::new(ExprNode::Symbol(Symbol::new(name)))
    }

    /// Creates an operation from an operator tag and its children.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::InvalidArity`] if the child count does not fit
    /// the operator, e.g. `?:` with two children.
    pub fn operation(
        op: Operator,
        children: impl IntoIterator<Item = Expr>,
    ) -> Result<Self, ExprError> {
        Operation::new(op, children).map(Self::from)
    }

    /// Creates a semigroup operation from an explicit multiset.
    ///
    /// # Errors
    ///
    /// Returns [`ExprError::InvalidArity`] if `op` is not a semigroup
    /// operator.
    pub fn from_multiset(op: Operator, children: Multiset) -> Result<Self, ExprError> {
        Operation::from_multiset(op, children).map(Self::from)
    }

    /// Returns the underlying node.
    #[must_use]
    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    /// Returns the constant value, if this is a constant.
    #[must_use]
    pub fn as_constant(&self) -> Option<&Number> {
        match self.node() {
            ExprNode::Constant(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the symbol, if this is a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.node() {
            ExprNode::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the operation, if this is an operation.
    #[must_use]
    pub fn as_operation(&self) -> Option<&Operation> {
        match self.node() {
            ExprNode::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Returns the operator, if this is an operation.
    #[must_use]
    pub fn op(&self) -> Option<Operator> {
        self.as_operation().map(Operation::op)
    }

    /// Returns true if this is an operation with operator `op`.
    #[must_use]
    pub fn is_op(&self, op: Operator) -> bool {
        self.op() == Some(op)
    }

    /// Returns true if this is a constant.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        matches!(self.node(), ExprNode::Constant(_))
    }

    /// Returns true if this is a constant or a symbol.
    #[must_use]
    pub fn is_atomic(&self) -> bool {
        !matches!(self.node(), ExprNode::Operation(_))
    }

    /// Returns true if this is the integer constant `value`.
    #[must_use]
    pub fn is_int(&self, value: i64) -> bool {
        self.as_constant().is_some_and(|n| n.is_int(value))
    }

    /// Returns true if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(a: &Expr, b: &Expr) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Counts the nodes of this tree, with multiset children counted once
    /// per distinct entry.
    #[must_use]
    pub fn size(&self) -> usize {
        match self.node() {
            ExprNode::Constant(_) | ExprNode::Symbol(_) => 1,
            ExprNode::Operation(op) => match op.children() {
                Children::Multiset(set) => 1 + set.keys().map(Expr::size).sum::<usize>(),
                Children::Unary(child) => 1 + child.size(),
                Children::Ordered(list) => 1 + list.iter().map(Expr::size).sum::<usize>(),
            },
        }
    }
}

impl Expr {
    /// Returns the height of the tree, 1 for atoms.
    ///
    /// Runs without recursion, visiting each shared node once, so it can
    /// be used to reject trees too deep for recursive traversal.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut heights: FxHashMap<*const ExprNode, usize> = FxHashMap::default();
        let mut stack = vec![(self, false)];
        while let Some((expr, expanded)) = stack.pop() {
            let key = Arc::as_ptr(&expr.0);
            if heights.contains_key(&key) {
                continue;
            }
            let Some(node) = expr.as_operation() else {
                heights.insert(key, 1);
                continue;
            };
            if expanded {
                let tallest = node
                    .iter_children()
                    .filter_map(|child| heights.get(&Arc::as_ptr(&child.0)))
                    .max()
                    .copied()
                    .unwrap_or(0);
                heights.insert(key, tallest + 1);
            } else {
                stack.push((expr, true));
                stack.extend(node.iter_children().map(|child| (child, false)));
            }
        }
        heights.get(&Arc::as_ptr(&self.0)).copied().unwrap_or(1)
    }
}

// Unshared subtrees are released with an explicit stack instead of nested
// drop calls, so dropping a deep tree cannot overflow the call stack.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.0, &mut pending);
        while let Some(mut expr) = pending.pop() {
            detach_children(&mut expr.0, &mut pending);
        }
    }
}

fn detach_children(node: &mut Arc<ExprNode>, pending: &mut Vec<Expr>) {
    let Some(ExprNode::Operation(operation)) = Arc::get_mut(node) else {
        return;
    };
    match std::mem::replace(&mut operation.children, Children::Ordered(SmallVec::new())) {
        Children::Multiset(set) => pending.extend(set.into_iter().map(|(child, _)| child)),
        Children::Unary(child) => pending.push(child),
        Children::Ordered(list) => pending.extend(list),
    }
}

impl From<Operation> for Expr {
    fn from(op: Operation) -> Self {
        Self::new(ExprNode::Operation(op))
    }
}

impl From<Number> for Expr {
    fn from(value: Number) -> Self {
        Self::constant(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::float(value)
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Self::symbol(name)
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Expr::ptr_eq(self, other) || self.node() == other.node()
    }
}

impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node().hash(state);
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        if Expr::ptr_eq(self, other) {
            Ordering::Equal
        } else {
            self.node().cmp(other.node())
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(e: &Expr) -> u64 {
        let mut h = DefaultHasher::new();
        e.hash(&mut h);
        h.finish()
    }

    #[test]
    fn test_semigroup_children_are_a_multiset() {
        let (a, b) = (Expr::symbol("a"), Expr::symbol("b"));
        let ab = Expr::operation(Operator::Add, [a.clone(), b.clone()]).unwrap();
        let ba = Expr::operation(Operator::Add, [b.clone(), a.clone()]).unwrap();
        assert_eq!(ab, ba);
        assert_eq!(hash_of(&ab), hash_of(&ba));

        let aa = Expr::operation(Operator::Add, [a.clone(), a.clone()]).unwrap();
        let set = aa.as_operation().unwrap().multiset().unwrap();
        assert_eq!(set.count(&a), 2);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_binary_children_keep_order() {
        let (a, b) = (Expr::symbol("a"), Expr::symbol("b"));
        let ab = Expr::operation(Operator::Lt, [a.clone(), b.clone()]).unwrap();
        let ba = Expr::operation(Operator::Lt, [b, a]).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_invalid_arity() {
        let (a, b) = (Expr::symbol("a"), Expr::symbol("b"));
        let err = Expr::operation(Operator::Conditional, [a.clone(), b.clone()]).unwrap_err();
        assert_eq!(
            err,
            ExprError::InvalidArity {
                op: Operator::Conditional,
                expected: crate::Arity::Exactly(3),
                found: 2,
            }
        );
        assert!(Expr::operation(Operator::Not, [a.clone(), b]).is_err());
        assert!(Expr::operation(Operator::Call, []).is_err());
        assert!(Expr::operation(Operator::Add, []).is_ok());
        assert!(Expr::from_multiset(Operator::Lt, Multiset::new()).is_err());
    }

    #[test]
    fn test_unary_child_is_stored_directly() {
        let x = Expr::symbol("x");
        let not = Expr::operation(Operator::BitNot, [x.clone()]).unwrap();
        let op = not.as_operation().unwrap();
        assert!(matches!(op.children(), Children::Unary(child) if *child == x));
        assert_eq!(op.ordered(), std::slice::from_ref(&x));
    }

    #[test]
    fn test_constant_kinds_differ() {
        assert_ne!(Expr::int(1), Expr::float(1.0));
        assert_eq!(Expr::bool(true), Expr::int(1));
    }

    #[test]
    fn test_try_map_children_merges_counts() {
        let (a, b) = (Expr::symbol("a"), Expr::symbol("b"));
        let sum = Operation::new(Operator::Add, [a.clone(), b]).unwrap();
        let mapped = sum.try_map_children(|_| Ok::<_, ()>(a.clone())).unwrap();
        assert_eq!(mapped.multiset().unwrap().count(&a), 2);
    }

    fn nested(depth: usize) -> Expr {
        let x = Expr::symbol("x");
        (1..depth).fold(x.clone(), |inner, level| {
            let op = if level % 2 == 0 { Operator::Add } else { Operator::Mul };
            Expr::operation(op, [inner, x.clone()]).unwrap()
        })
    }

    #[test]
    fn test_depth() {
        assert_eq!(Expr::symbol("x").depth(), 1);
        assert_eq!(nested(5).depth(), 5);

        let shared = nested(3);
        let e = Expr::operation(Operator::Mul, [shared.clone(), shared, Expr::int(2)]).unwrap();
        assert_eq!(e.depth(), 4);
    }

    #[test]
    fn test_deep_trees_are_measured_and_dropped() {
        let deep = nested(100_000);
        assert_eq!(deep.depth(), 100_000);
        drop(deep);
    }

    #[test]
    fn test_dropping_keeps_shared_subtrees() {
        let inner = nested(10);
        let outer = Expr::operation(Operator::BitNot, [inner.clone()]).unwrap();
        drop(outer);
        assert_eq!(inner.depth(), 10);
        assert_eq!(inner, nested(10));
    }

    #[test]
    fn test_size() {
        let x = Expr::symbol("x");
        let e = Expr::operation(Operator::Add, [x.clone(), x.clone(), Expr::int(1)]).unwrap();
        assert_eq!(e.size(), 3);
    }
}
