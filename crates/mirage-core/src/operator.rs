//! Operator tags and their child-storage classes.
//!
//! Every operation node carries an [`Operator`]. The operator's
//! [`OperatorClass`] decides how children are stored: as a multiset for
//! commutative semigroup operators, or as an ordered sequence otherwise.

use std::fmt;
use std::str::FromStr;

use crate::error::ExprError;

/// How an operator stores its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OperatorClass {
    /// Associative and commutative; children form a multiset.
    Semigroup,
    /// Exactly one child.
    Unary,
    /// Exactly two ordered children.
    Binary,
    /// Exactly three ordered children (`?:`).
    Ternary,
    /// One or more ordered children (`fn`).
    Variadic,
}

/// The number of children an operator accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many children.
    Exactly(usize),
    /// At least this many children.
    AtLeast(usize),
}

impl Arity {
    /// Returns true if `count` children satisfy this arity.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// An operator tag.
///
/// There is deliberately no negation, subtraction, left shift, `>` or `>=`:
/// `-x` is `x * -1`, `x << y` is `x * 2 ** y`, and `a > b` is `b < a`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operator {
    /// `+`
    Add,
    /// `*`
    Mul,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `~`
    BitNot,
    /// `!`
    Not,
    /// `//` (floor division)
    FloorDiv,
    /// `/` (true division)
    TrueDiv,
    /// `%`
    Mod,
    /// `>>`
    Shr,
    /// `**`
    Pow,
    /// `rol` (rotate left)
    Rol,
    /// `ror` (rotate right)
    Ror,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `?:`
    Conditional,
    /// `fn`; the first child is the callee.
    Call,
}

impl Operator {
    /// All operators, in declaration order.
    pub const ALL: [Operator; 22] = [
        Operator::Add,
        Operator::Mul,
        Operator::BitAnd,
        Operator::BitOr,
        Operator::BitXor,
        Operator::And,
        Operator::Or,
        Operator::BitNot,
        Operator::Not,
        Operator::FloorDiv,
        Operator::TrueDiv,
        Operator::Mod,
        Operator::Shr,
        Operator::Pow,
        Operator::Rol,
        Operator::Ror,
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Conditional,
        Operator::Call,
    ];

    /// Returns the storage class of this operator.
    #[must_use]
    pub const fn class(self) -> OperatorClass {
        match self {
            Operator::Add
            | Operator::Mul
            | Operator::BitAnd
            | Operator::BitOr
            | Operator::BitXor
            | Operator::And
            | Operator::Or => OperatorClass::Semigroup,
            Operator::BitNot | Operator::Not => OperatorClass::Unary,
            Operator::FloorDiv
            | Operator::TrueDiv
            | Operator::Mod
            | Operator::Shr
            | Operator::Pow
            | Operator::Rol
            | Operator::Ror
            | Operator::Eq
            | Operator::Ne
            | Operator::Lt
            | Operator::Le => OperatorClass::Binary,
            Operator::Conditional => OperatorClass::Ternary,
            Operator::Call => OperatorClass::Variadic,
        }
    }

    /// Returns the number of children accepted by this operator.
    ///
    /// Semigroup operators accept any number of children, including zero.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self.class() {
            OperatorClass::Semigroup => Arity::AtLeast(0),
            OperatorClass::Unary => Arity::Exactly(1),
            OperatorClass::Binary => Arity::Exactly(2),
            OperatorClass::Ternary => Arity::Exactly(3),
            OperatorClass::Variadic => Arity::AtLeast(1),
        }
    }

    /// Returns true for commutative semigroup operators.
    #[must_use]
    pub const fn is_semigroup(self) -> bool {
        matches!(self.class(), OperatorClass::Semigroup)
    }

    /// Returns true for `==`, `!=`, `<` and `<=`.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Le
        )
    }

    /// Returns the textual tag of this operator.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Mul => "*",
            Operator::BitAnd => "&",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::BitNot => "~",
            Operator::Not => "!",
            Operator::FloorDiv => "//",
            Operator::TrueDiv => "/",
            Operator::Mod => "%",
            Operator::Shr => ">>",
            Operator::Pow => "**",
            Operator::Rol => "rol",
            Operator::Ror => "ror",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Conditional => "?:",
            Operator::Call => "fn",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Operator {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.tag() == s)
            .ok_or_else(|| ExprError::UnknownOperator(s.to_string()))
    }
}
