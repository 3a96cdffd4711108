//! Human-readable rendering of expressions.
//!
//! Semigroup operations print their children in structural order joined by
//! the operator, with a `[n]` prefix for multiplicities above one:
//! `(x+[2]y)`. Binary operations print infix, `(a<b)`, and everything else
//! prints as a call, `?:(c, t, f)`.

use std::fmt;

use crate::expr::{Children, Expr, ExprNode, Operation};

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            ExprNode::Constant(n) => write!(f, "{n}"),
            ExprNode::Symbol(s) => write!(f, "{s}"),
            ExprNode::Operation(op) => write!(f, "{op}"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.op().tag();
        match self.children() {
            Children::Multiset(set) => {
                f.write_str("(")?;
                for (i, (child, count)) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(tag)?;
                    }
                    if count != 1 {
                        write!(f, "[{count}]")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
            Children::Ordered(list) if list.len() == 2 => {
                if tag.starts_with(char::is_alphabetic) {
                    write!(f, "({} {tag} {})", list[0], list[1])
                } else {
                    write!(f, "({}{tag}{})", list[0], list[1])
                }
            }
            Children::Unary(child) => write!(f, "{tag}({child})"),
            Children::Ordered(list) => {
                write!(f, "{tag}(")?;
                for (i, child) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Expr, Operator};

    #[test]
    fn test_display_forms() {
        let (x, y) = (Expr::symbol("x"), Expr::symbol("y"));
        let sum = Expr::operation(Operator::Add, [y.clone(), x.clone(), y.clone()]).unwrap();
        assert_eq!(sum.to_string(), "(x+[2]y)");
        assert_eq!(x.clone().cmp_lt(y.clone()).to_string(), "(x<y)");
        assert_eq!(x.clone().rol(Expr::int(3)).to_string(), "(x rol 3)");
        assert_eq!((!x.clone()).to_string(), "~(x)");
        assert_eq!(
            Expr::if_then_else(x, y, Expr::float(0.5)).to_string(),
            "?:(x, y, 0.5)"
        );
        assert_eq!(Expr::operation(Operator::Mul, []).unwrap().to_string(), "()");
    }
}
