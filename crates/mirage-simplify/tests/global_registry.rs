//! Installing a custom process-wide registry.
//!
//! Kept in its own test binary: the global registry can only be installed
//! once per process, before anything reads it.

use mirage_core::{Expr, Operation, Operator};
use mirage_simplify::registry;
use mirage_simplify::{simplify, Rule, RuleContext, RuleRegistry, SimplifyError, Trigger};

struct DropZeroShift;

impl Rule for DropZeroShift {
    fn name(&self) -> &'static str {
        "drop-zero-shift"
    }

    fn trigger(&self) -> Trigger {
        Trigger::AnyOf(&[Operator::Shr, Operator::Rol, Operator::Ror])
    }

    fn matches(&self, node: &Operation, _ctx: &RuleContext<'_>) -> bool {
        node.operands().is_some_and(|(_, amount)| amount.is_int(0))
    }

    fn rewrite(&self, node: &Operation, _ctx: &RuleContext<'_>) -> Result<Expr, SimplifyError> {
        Ok(node
            .operands()
            .map_or_else(|| Expr::from(node.clone()), |(value, _)| value.clone()))
    }
}

#[test]
fn test_install_freezes_the_global_registry() {
    let mut custom = RuleRegistry::with_default_rules();
    custom.register(DropZeroShift);
    let expected = custom.len();
    registry::install(custom).unwrap();

    assert_eq!(registry::global().len(), expected);
    assert!(registry::install(RuleRegistry::new()).is_err());

    let x = Expr::symbol("x");
    assert_eq!(simplify(&(x.clone() >> Expr::int(0))).unwrap(), x);
    assert_eq!(simplify(&x.clone().rol(Expr::int(0))).unwrap(), x);
}
