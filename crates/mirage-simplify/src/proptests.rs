//! Property-based tests for the simplification engine.

#[cfg(test)]
mod tests {
    use mirage_core::eval::{self, DEFAULT_WORD_BITS};
    use mirage_core::{Children, Expr, ExprNode, Number, NumericError, Operator};
    use proptest::prelude::*;

    use crate::engine::Simplifier;
    use crate::error::SimplifyError;
    use crate::registry::RuleRegistry;

    const NAMES: [&str; 3] = ["a", "b", "c"];

    // Reference evaluation with symbols bound to integers.
    fn evaluate(expr: &Expr, env: &[i64; 3]) -> Result<Number, NumericError> {
        match expr.node() {
            ExprNode::Constant(value) => Ok(value.clone()),
            ExprNode::Symbol(symbol) => {
                let index = NAMES.iter().position(|name| *name == symbol.name()).unwrap();
                Ok(Number::from(env[index]))
            }
            ExprNode::Operation(node) => match node.children() {
                Children::Multiset(set) => {
                    let op = node.op();
                    let mut acc = eval::identity(op).ok_or(NumericError::NotFoldable(op))?;
                    for (child, count) in set.iter() {
                        acc = eval::accumulate(op, &acc, &evaluate(child, env)?, count)?;
                    }
                    Ok(acc)
                }
                Children::Unary(child) => eval::unary(node.op(), &evaluate(child, env)?),
                Children::Ordered(list) => match (node.op(), list.as_slice()) {
                    (Operator::Conditional, [cond, then, otherwise]) => {
                        if evaluate(cond, env)?.is_truthy() {
                            evaluate(then, env)
                        } else {
                            evaluate(otherwise, env)
                        }
                    }
                    (op, [lhs, rhs]) => eval::binary(
                        op,
                        &evaluate(lhs, env)?,
                        &evaluate(rhs, env)?,
                        DEFAULT_WORD_BITS,
                    ),
                    (op, _) => Err(NumericError::NotFoldable(op)),
                },
            },
        }
    }

    // Undefined constant operations are skipped; any other error fails.
    fn simplified(expr: &Expr) -> Result<Option<Expr>, TestCaseError> {
        let registry = RuleRegistry::with_default_rules();
        match Simplifier::with_registry(&registry).simplify(expr) {
            Ok(simple) => Ok(Some(simple)),
            Err(SimplifyError::UndefinedOperation { .. }) => Ok(None),
            Err(err) => Err(TestCaseError::fail(format!("{expr}: {err}"))),
        }
    }

    // Strategy for small integer constants
    fn constant() -> BoxedStrategy<Expr> {
        (-3i64..=3).prop_map(Expr::int).boxed()
    }

    // Strategy for symbols and small integer constants
    fn atom() -> BoxedStrategy<Expr> {
        prop_oneof![
            prop::sample::select(NAMES.to_vec()).prop_map(Expr::symbol),
            constant(),
        ]
        .boxed()
    }

    // Strategy for trees over integer operators; `logical` adds `&&` and `||`
    fn tree(leaf: BoxedStrategy<Expr>, logical: bool) -> impl Strategy<Value = Expr> {
        leaf.prop_recursive(4, 32, 3, move |inner| {
            let mut semigroups = vec![
                Operator::Add,
                Operator::Mul,
                Operator::BitAnd,
                Operator::BitOr,
                Operator::BitXor,
            ];
            if logical {
                semigroups.extend([Operator::And, Operator::Or]);
            }
            let binaries = vec![
                Operator::Eq,
                Operator::Ne,
                Operator::Lt,
                Operator::Le,
                Operator::FloorDiv,
                Operator::Mod,
            ];
            prop_oneof![
                (
                    prop::sample::select(semigroups),
                    prop::collection::vec(inner.clone(), 1..4)
                )
                    .prop_map(|(op, children)| Expr::operation(op, children).unwrap()),
                (
                    prop::sample::select(vec![Operator::BitNot, Operator::Not]),
                    inner.clone()
                )
                    .prop_map(|(op, child)| Expr::operation(op, [child]).unwrap()),
                (prop::sample::select(binaries), inner.clone(), inner.clone())
                    .prop_map(|(op, lhs, rhs)| Expr::operation(op, [lhs, rhs]).unwrap()),
                (inner.clone(), inner.clone(), inner)
                    .prop_map(|(cond, then, otherwise)| Expr::if_then_else(cond, then, otherwise)),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn simplify_is_idempotent(e in tree(atom(), true)) {
            let once = simplified(&e)?;
            prop_assume!(once.is_some());
            let once = once.unwrap();
            prop_assert_eq!(simplified(&once)?, Some(once));
        }

        #[test]
        fn simplify_is_deterministic(e in tree(atom(), true)) {
            prop_assert_eq!(simplified(&e)?, simplified(&e)?);
        }

        #[test]
        fn simplify_preserves_value(
            e in tree(atom(), false),
            env in prop::array::uniform3(-4i64..=4),
        ) {
            let simple = simplified(&e)?;
            prop_assume!(simple.is_some());
            let before = evaluate(&e, &env);
            prop_assume!(before.is_ok());
            let after = evaluate(&simple.unwrap(), &env);
            prop_assume!(after.is_ok());
            prop_assert_eq!(before.unwrap(), after.unwrap());
        }

        #[test]
        fn constant_trees_fold_to_their_value(e in tree(constant(), false)) {
            let simple = simplified(&e)?;
            prop_assume!(simple.is_some());
            let value = evaluate(&e, &[0; 3]);
            prop_assume!(value.is_ok());
            prop_assert_eq!(simple.unwrap(), Expr::from(value.unwrap()));
        }

        #[test]
        fn atoms_are_fixpoints(e in atom()) {
            prop_assert_eq!(simplified(&e)?, Some(e));
        }
    }
}
