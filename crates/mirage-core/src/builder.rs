//! Ergonomic construction of expressions.
//!
//! Instruction-semantics code builds trees from operands, so the usual
//! operators are overloaded on [`Expr`]. Operators missing from the tag set
//! are expressed through the ones that exist:
//!
//! - `a - b` builds `a + b * -1`
//! - `-a` builds `a * -1`
//! - `a << b` builds `a * 2 ** b`
//! - `a > b` builds `b < a`, and `a >= b` builds `b <= a`
//!
//! Either side of an operator may also be an `i64`, which becomes an integer
//! constant.
//!
//! ```
//! use mirage_core::Expr;
//!
//! let (x, y) = (Expr::symbol("x"), Expr::symbol("y"));
//! let e = (x.clone() + y.clone()) * 2 - (x << 3);
//! assert_eq!(e.to_string(), "((-1*(x*(2**3)))+(2*(x+y)))");
//! ```

use std::ops;

use smallvec::{smallvec, SmallVec};

use crate::expr::{Children, Expr, Operation};
use crate::multiset::Multiset;
use crate::operator::Operator;

fn semigroup(op: Operator, lhs: Expr, rhs: Expr) -> Expr {
    let children: Multiset = [lhs, rhs].into_iter().collect();
    Expr::from(Operation::fixed(op, Children::Multiset(children)))
}

fn binary(op: Operator, lhs: Expr, rhs: Expr) -> Expr {
    Expr::from(Operation::fixed(op, Children::Ordered(smallvec![lhs, rhs])))
}

fn unary(op: Operator, child: Expr) -> Expr {
    Expr::from(Operation::fixed(op, Children::Unary(child)))
}

impl Expr {
    /// Builds `self // rhs` (floor division).
    #[must_use]
    pub fn floor_div(self, rhs: Expr) -> Expr {
        binary(Operator::FloorDiv, self, rhs)
    }

    /// Builds `self ** rhs`.
    #[must_use]
    pub fn pow(self, rhs: Expr) -> Expr {
        binary(Operator::Pow, self, rhs)
    }

    /// Builds `rol(self, amount)`.
    #[must_use]
    pub fn rol(self, amount: Expr) -> Expr {
        binary(Operator::Rol, self, amount)
    }

    /// Builds `ror(self, amount)`.
    #[must_use]
    pub fn ror(self, amount: Expr) -> Expr {
        binary(Operator::Ror, self, amount)
    }

    /// Builds `self && rhs`.
    #[must_use]
    pub fn logical_and(self, rhs: Expr) -> Expr {
        semigroup(Operator::And, self, rhs)
    }

    /// Builds `self || rhs`.
    #[must_use]
    pub fn logical_or(self, rhs: Expr) -> Expr {
        semigroup(Operator::Or, self, rhs)
    }

    /// Builds `!self`.
    #[must_use]
    pub fn logical_not(self) -> Expr {
        unary(Operator::Not, self)
    }

    /// Builds `self == rhs`.
    #[must_use]
    pub fn cmp_eq(self, rhs: Expr) -> Expr {
        binary(Operator::Eq, self, rhs)
    }

    /// Builds `self != rhs`.
    #[must_use]
    pub fn cmp_ne(self, rhs: Expr) -> Expr {
        binary(Operator::Ne, self, rhs)
    }

    /// Builds `self < rhs`.
    #[must_use]
    pub fn cmp_lt(self, rhs: Expr) -> Expr {
        binary(Operator::Lt, self, rhs)
    }

    /// Builds `self <= rhs`.
    #[must_use]
    pub fn cmp_le(self, rhs: Expr) -> Expr {
        binary(Operator::Le, self, rhs)
    }

    /// Builds `self > rhs` as `rhs < self`.
    #[must_use]
    pub fn cmp_gt(self, rhs: Expr) -> Expr {
        binary(Operator::Lt, rhs, self)
    }

    /// Builds `self >= rhs` as `rhs <= self`.
    #[must_use]
    pub fn cmp_ge(self, rhs: Expr) -> Expr {
        binary(Operator::Le, rhs, self)
    }

    /// Builds `cond ? then : otherwise`.
    #[must_use]
    pub fn if_then_else(cond: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::from(Operation::fixed(
            Operator::Conditional,
            Children::Ordered(smallvec![cond, then, otherwise]),
        ))
    }

    /// Builds `fn(callee, args...)`.
    #[must_use]
    pub fn call(callee: Expr, args: impl IntoIterator<Item = Expr>) -> Expr {
        let mut children: SmallVec<[Expr; 3]> = smallvec![callee];
        children.extend(args);
        Expr::from(Operation::fixed(Operator::Call, Children::Ordered(children)))
    }
}

macro_rules! impl_binary_ops {
    ($($trait:ident, $method:ident => $build:ident($op:expr);)*) => {
        $(
            impl ops::$trait for Expr {
                type Output = Expr;

                fn $method(self, rhs: Expr) -> Expr {
                    $build($op, self, rhs)
                }
            }
        )*
    };
}

impl_binary_ops! {
    Add, add => semigroup(Operator::Add);
    Mul, mul => semigroup(Operator::Mul);
    BitAnd, bitand => semigroup(Operator::BitAnd);
    BitOr, bitor => semigroup(Operator::BitOr);
    BitXor, bitxor => semigroup(Operator::BitXor);
    Div, div => binary(Operator::TrueDiv);
    Rem, rem => binary(Operator::Mod);
    Shr, shr => binary(Operator::Shr);
}

impl ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        self + -rhs
    }
}

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self * Expr::int(-1)
    }
}

impl ops::Shl for Expr {
    type Output = Expr;

    fn shl(self, rhs: Expr) -> Expr {
        self * Expr::int(2).pow(rhs)
    }
}

macro_rules! impl_int_operands {
    ($($trait:ident, $method:ident;)*) => {
        $(
            impl ops::$trait<i64> for Expr {
                type Output = Expr;

                fn $method(self, rhs: i64) -> Expr {
                    ops::$trait::$method(self, Expr::int(rhs))
                }
            }

            impl ops::$trait<Expr> for i64 {
                type Output = Expr;

                fn $method(self, rhs: Expr) -> Expr {
                    ops::$trait::$method(Expr::int(self), rhs)
                }
            }
        )*
    };
}

impl_int_operands! {
    Add, add;
    Sub, sub;
    Mul, mul;
    Div, div;
    Rem, rem;
    BitAnd, bitand;
    BitOr, bitor;
    BitXor, bitxor;
    Shl, shl;
    Shr, shr;
}

/// `!expr` is the bitwise complement `~expr`; see [`Expr::logical_not`].
impl ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        unary(Operator::BitNot, self)
    }
}
